//! Runs a [`Session`] inside a single tokio task.
//!
//! The task is the only mutator. Snapshots arrive through a `watch` channel
//! so a slow tick coalesces whatever was published meanwhile; collaborator
//! calls are spawned and their results come back as messages, where they
//! are checked against the state at that point.

use std::sync::Arc;
use std::time::Duration;

use hallway_common::{CoordinationError, Event, EventBus};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::icebreaker::{IcebreakerService, Suggestion};
use crate::participant::{ParticipantId, Snapshot};
use crate::protocol::InboundEvent;
use crate::transport::{ChatTransport, PresenceTransport};

use super::facade::Session;
use super::types::{Gesture, Outbound, SessionEvent};

/// The collaborators the runtime calls out to.
#[derive(Clone)]
pub struct Collaborators {
    pub presence: Arc<dyn PresenceTransport>,
    pub chat: Arc<dyn ChatTransport>,
    /// `None` disables icebreakers; requests fail with a notice.
    pub icebreaker: Option<Arc<dyn IcebreakerService>>,
}

/// Handle to a running session task.
pub struct SessionHandle {
    snapshots: watch::Sender<Snapshot>,
    gestures: mpsc::Sender<Gesture>,
    inbound: mpsc::Sender<InboundEvent>,
    task: JoinHandle<Session>,
}

impl SessionHandle {
    /// Replace the current presence snapshot.
    pub fn publish_snapshot(&self, snapshot: Snapshot) {
        if self.snapshots.send(snapshot).is_err() {
            warn!("session task is gone; snapshot dropped");
        }
    }

    pub async fn gesture(&self, gesture: Gesture) {
        if self.gestures.send(gesture).await.is_err() {
            warn!("session task is gone; gesture dropped");
        }
    }

    pub async fn inbound(&self, event: InboundEvent) {
        if self.inbound.send(event).await.is_err() {
            warn!("session task is gone; inbound event dropped");
        }
    }

    /// Shut the session down and wait for the task to hand it back.
    pub async fn shutdown(self) -> Option<Session> {
        let _ = self.gestures.send(Gesture::Shutdown).await;
        drop(self.snapshots);
        match self.task.await {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "session task failed");
                None
            }
        }
    }
}

pub struct SessionRuntime;

impl SessionRuntime {
    /// Spawn the session task. Must be called inside a tokio runtime.
    pub fn spawn(
        session: Session,
        collaborators: Collaborators,
        bus: Arc<EventBus>,
        poll_interval: Duration,
    ) -> (SessionHandle, mpsc::Receiver<SessionEvent>) {
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());
        let (gesture_tx, gesture_rx) = mpsc::channel(64);
        let (inbound_tx, inbound_rx) = mpsc::channel(256);
        let (event_tx, event_rx) = mpsc::channel(256);

        let task = tokio::spawn(run(
            session,
            collaborators,
            bus.subscribe(),
            poll_interval,
            Channels {
                snapshots: snapshot_rx,
                gestures: gesture_rx,
                inbound: inbound_rx,
                events: event_tx,
            },
        ));

        let handle = SessionHandle {
            snapshots: snapshot_tx,
            gestures: gesture_tx,
            inbound: inbound_tx,
            task,
        };
        (handle, event_rx)
    }
}

struct Channels {
    snapshots: watch::Receiver<Snapshot>,
    gestures: mpsc::Receiver<Gesture>,
    inbound: mpsc::Receiver<InboundEvent>,
    events: mpsc::Sender<SessionEvent>,
}

type IcebreakerResult = (ParticipantId, Result<Suggestion, CoordinationError>);

async fn run(
    mut session: Session,
    collaborators: Collaborators,
    mut bus_rx: broadcast::Receiver<Event>,
    poll_interval: Duration,
    mut ch: Channels,
) -> Session {
    let (result_tx, mut result_rx) = mpsc::channel::<IcebreakerResult>(32);
    let (failure_tx, mut failure_rx) = mpsc::channel::<CoordinationError>(32);
    let mut poll = tokio::time::interval(poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(local = %session.local(), "session runtime started");

    loop {
        let mut stop = false;
        let events = tokio::select! {
            changed = ch.snapshots.changed() => match changed {
                Ok(()) => {
                    let snapshot = ch.snapshots.borrow_and_update().clone();
                    session.tick(snapshot)
                }
                Err(_) => {
                    stop = true;
                    session.shutdown()
                }
            },
            Some(gesture) = ch.gestures.recv() => {
                stop = gesture == Gesture::Shutdown;
                session.gesture(gesture)
            }
            Some(event) = ch.inbound.recv() => session.inbound(event),
            Some((remote, result)) = result_rx.recv() => session.icebreaker_resolved(&remote, result),
            Some(error) = failure_rx.recv() => session.report_failure(error),
            message = bus_rx.recv() => match message {
                Ok(Event::AudioStateChanged(state)) => session.audio_reported(Some(state)),
                Ok(Event::Shutdown) => {
                    stop = true;
                    session.shutdown()
                }
                Ok(_) => Vec::new(),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "intent bus lagged; polling audio");
                    session.poll_audio()
                }
                Err(broadcast::error::RecvError::Closed) => {
                    stop = true;
                    session.shutdown()
                }
            },
            _ = poll.tick() => session.poll_audio(),
        };

        for work in session.take_outbound() {
            dispatch(work, session.local(), &collaborators, &result_tx, &failure_tx);
        }
        for event in events {
            if ch.events.send(event).await.is_err() {
                debug!("no session event listener");
            }
        }
        if stop {
            break;
        }
    }

    info!(local = %session.local(), "session runtime stopped");
    session
}

fn dispatch(
    work: Outbound,
    local: &ParticipantId,
    collaborators: &Collaborators,
    results: &mpsc::Sender<IcebreakerResult>,
    failures: &mpsc::Sender<CoordinationError>,
) {
    match work {
        Outbound::RequestIcebreaker { remote, request } => {
            let service = collaborators.icebreaker.clone();
            let results = results.clone();
            tokio::spawn(async move {
                let result = match service {
                    Some(service) => service
                        .suggest(&request)
                        .await
                        .map_err(CoordinationError::from),
                    None => Err(CoordinationError::SuggestionFailed(
                        "icebreakers are disabled".into(),
                    )),
                };
                let _ = results.send((remote, result)).await;
            });
        }
        Outbound::SendKnock { to } => {
            let presence = Arc::clone(&collaborators.presence);
            let failures = failures.clone();
            tokio::spawn(async move {
                if let Err(e) = presence.send_knock(&to).await {
                    let _ = failures.send(e).await;
                }
            });
        }
        Outbound::AcknowledgeKnock { to } => {
            let presence = Arc::clone(&collaborators.presence);
            let failures = failures.clone();
            tokio::spawn(async move {
                if let Err(e) = presence.acknowledge_knock(&to).await {
                    let _ = failures.send(e).await;
                }
            });
        }
        Outbound::PostChat { message } => {
            let chat = Arc::clone(&collaborators.chat);
            let failures = failures.clone();
            tokio::spawn(async move {
                if let Err(e) = chat.post(&message.scope, &message).await {
                    let _ = failures.send(e).await;
                }
            });
        }
        Outbound::PublishPosition { position } => {
            let presence = Arc::clone(&collaborators.presence);
            let failures = failures.clone();
            let id = local.clone();
            tokio::spawn(async move {
                if let Err(e) = presence.publish_position(&id, position).await {
                    let _ = failures.send(e).await;
                }
            });
        }
    }
}
