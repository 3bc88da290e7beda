//! Proximity tracking over successive presence snapshots.
//!
//! Keeps the set of near pairs and turns each snapshot into a single
//! batch of enter/exit events. Every unordered pair of online
//! participants is evaluated on each tick, so the cost is O(n²) in
//! occupancy; that is fine for rooms of tens of people and is the
//! known scaling limit.

mod tracker;
mod types;

pub use tracker::ProximityTracker;
pub use types::{ExitReason, PairKey, ProximityBatch, ProximityEvent, ProximityPair};
