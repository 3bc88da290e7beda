//! Scripted sessions.
//!
//! A scenario is a JSON document naming the local participant, how the
//! simulated collaborators behave, and a list of steps fed to a running
//! session one at a time. Every session event is collected as a line of
//! text so the run reads like a transcript.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use hallway_common::{AudioEngineState, Event, EventBus, HallwayError, Result, TrackKind};
use hallway_config::HallwayConfig;
use hallway_social::{
    sorted_roster, Collaborators, Gesture, IcebreakerService, InboundEvent, Participant,
    RosterEntry, Session, SessionRuntime, Snapshot,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::settings;
use crate::sim::{CannedIcebreaker, SimAudio, SimMedia, SimTransport};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub local: String,
    #[serde(default)]
    pub user_context: Option<String>,
    /// Initial engine state; `null` means the renderer has not built one.
    #[serde(default = "default_engine")]
    pub engine: Option<AudioEngineState>,
    #[serde(default)]
    pub missing_devices: Vec<TrackKind>,
    /// Replaces the configured icebreaker service with a fixed reply.
    #[serde(default)]
    pub icebreaker_reply: Option<String>,
    pub steps: Vec<Step>,
}

fn default_engine() -> Option<AudioEngineState> {
    Some(AudioEngineState::Suspended)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Snapshot(Vec<Participant>),
    Gesture(Gesture),
    Inbound(InboundEvent),
    Engine(AudioEngineState),
    WaitMs(u64),
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| HallwayError::Scenario(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// What a scenario run produced.
#[derive(Debug, Default)]
pub struct Transcript {
    pub lines: Vec<String>,
    /// `(event, payload)` pairs the transports broadcast.
    pub sent: Vec<(&'static str, String)>,
    /// Roster of the last accepted snapshot.
    pub roster: Vec<RosterEntry>,
}

/// Run `scenario` against a live session runtime.
///
/// `fallback` is used for icebreakers unless the scenario supplies a reply.
pub async fn run(
    scenario: Scenario,
    config: &HallwayConfig,
    fallback: Option<Arc<dyn IcebreakerService>>,
) -> Result<Transcript> {
    let mut session_config = settings::session_config(config, &scenario.local)?;
    if let Some(context) = &scenario.user_context {
        session_config.user_context = context.clone();
    }
    let local = session_config.local.clone();

    let bus = Arc::new(EventBus::default());
    let audio = SimAudio::new(scenario.engine);
    let engine_task = audio.listen(Arc::clone(&bus));
    let transport = SimTransport::new(local.clone());
    let icebreaker = match scenario.icebreaker_reply.clone() {
        Some(reply) => Some(CannedIcebreaker::new(Some(reply)) as Arc<dyn IcebreakerService>),
        None => fallback,
    };

    let session = Session::new(
        session_config,
        audio.clone(),
        SimMedia::new(scenario.missing_devices.clone()),
        Arc::clone(&bus),
    );
    let collaborators = Collaborators {
        presence: transport.clone(),
        chat: transport.clone(),
        icebreaker,
    };
    let poll = Duration::from_millis(u64::from(config.audio.poll_interval_ms.max(1)));
    let (handle, mut events) = SessionRuntime::spawn(session, collaborators, Arc::clone(&bus), poll);

    let collector = tokio::spawn(async move {
        let mut lines = Vec::new();
        while let Some(event) = events.recv().await {
            let line = event.to_string();
            info!(event = %line, "session event");
            lines.push(line);
        }
        lines
    });

    info!(local = %local, steps = scenario.steps.len(), "scenario started");
    let settle = Duration::from_millis(u64::from(config.proximity.tick_interval_ms.max(1)));
    let mut roster = Vec::new();

    for (index, step) in scenario.steps.into_iter().enumerate() {
        debug!(index, ?step, "scenario step");
        match step {
            Step::Snapshot(participants) => match Snapshot::new(participants) {
                Ok(snapshot) => {
                    roster = sorted_roster(&snapshot);
                    handle.publish_snapshot(snapshot);
                }
                Err(e) => {
                    warn!(index, error = %e, "invalid snapshot skipped");
                    continue;
                }
            },
            Step::Gesture(gesture) => handle.gesture(gesture).await,
            Step::Inbound(event) => handle.inbound(event).await,
            Step::Engine(state) => audio.report(state, &bus),
            Step::WaitMs(ms) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                continue;
            }
        }
        tokio::time::sleep(settle).await;
    }

    if handle.shutdown().await.is_none() {
        warn!("session did not shut down cleanly");
    }
    bus.publish(Event::Shutdown);
    let lines = collector.await.unwrap_or_default();
    if let Err(e) = engine_task.await {
        warn!(error = %e, "audio engine task failed");
    }

    info!(local = %local, events = lines.len(), "scenario finished");
    Ok(Transcript {
        lines,
        sent: transport.sent(),
        roster,
    })
}
