//! Icebreaker suggestions from an external text-generation service.

mod client;
mod types;

pub use client::{HttpIcebreakerClient, HttpIcebreakerConfig};
pub use types::{IcebreakerError, IcebreakerRequest, IcebreakerService, Suggestion};
