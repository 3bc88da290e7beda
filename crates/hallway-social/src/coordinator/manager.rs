//! The coordinator state machine.

use std::collections::HashMap;

use hallway_common::CoordinationError;
use tracing::{debug, info};

use crate::icebreaker::{IcebreakerRequest, Suggestion};
use crate::participant::ParticipantId;
use crate::proximity::{ProximityBatch, ProximityEvent};

use super::types::{CoordinatorEvent, RelationshipState};

#[derive(Debug, Clone, Default)]
struct Relationship {
    state: RelationshipState,
    /// Tracked independently of `state`; a call survives moving apart.
    near: bool,
    suggestion_pending: bool,
    knock_outstanding: bool,
    inbound_knock: bool,
}

impl Relationship {
    fn is_idle(&self) -> bool {
        self.state == RelationshipState::Unaware
            && !self.near
            && !self.suggestion_pending
            && !self.knock_outstanding
            && !self.inbound_knock
    }
}

/// Relationship state machine for the local participant.
pub struct Coordinator {
    local: ParticipantId,
    user_context: String,
    relationships: HashMap<ParticipantId, Relationship>,
}

impl Coordinator {
    pub fn new(local: ParticipantId, user_context: impl Into<String>) -> Self {
        Self {
            local,
            user_context: user_context.into(),
            relationships: HashMap::new(),
        }
    }

    pub fn local(&self) -> &ParticipantId {
        &self.local
    }

    pub fn state(&self, remote: &ParticipantId) -> RelationshipState {
        self.relationships
            .get(remote)
            .map(|r| r.state)
            .unwrap_or_default()
    }

    pub fn is_near(&self, remote: &ParticipantId) -> bool {
        self.relationships.get(remote).is_some_and(|r| r.near)
    }

    pub fn suggestion_pending(&self, remote: &ParticipantId) -> bool {
        self.relationships
            .get(remote)
            .is_some_and(|r| r.suggestion_pending)
    }

    /// Remotes currently in the given state, sorted.
    pub fn in_state(&self, state: RelationshipState) -> Vec<ParticipantId> {
        let mut ids: Vec<_> = self
            .relationships
            .iter()
            .filter(|(_, r)| r.state == state)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// React to one tick of proximity changes.
    ///
    /// Pairs that do not involve the local participant are ignored.
    pub fn handle_batch(&mut self, batch: &ProximityBatch) -> Vec<CoordinatorEvent> {
        let mut out = Vec::new();
        for event in &batch.events {
            let Some(remote) = event.pair().other(&self.local).cloned() else {
                continue;
            };
            match event {
                ProximityEvent::Enter { .. } => self.entered(remote, &mut out),
                ProximityEvent::Exit { .. } => self.exited(remote, &mut out),
            }
        }
        out
    }

    /// Start an icebreaker request for `remote`.
    ///
    /// Returns the request the caller should send; the result comes back
    /// through [`resolve_icebreaker`](Self::resolve_icebreaker).
    pub fn begin_icebreaker(
        &mut self,
        remote: &ParticipantId,
        other_context: &str,
    ) -> Result<IcebreakerRequest, CoordinationError> {
        let rel = self
            .relationships
            .get_mut(remote)
            .filter(|r| r.state.is_approachable())
            .ok_or_else(|| CoordinationError::NotNearby(remote.to_string()))?;
        if rel.suggestion_pending {
            return Err(CoordinationError::SuggestionPending(remote.to_string()));
        }
        rel.suggestion_pending = true;
        debug!(remote = %remote, "icebreaker requested");

        Ok(IcebreakerRequest {
            user_context: self.user_context.clone(),
            other_user_context: other_context.to_string(),
        })
    }

    /// Apply an icebreaker result.
    ///
    /// A success that arrives after the remote left is dropped. A failure is
    /// returned for the caller to surface; the state never changes on failure.
    pub fn resolve_icebreaker(
        &mut self,
        remote: &ParticipantId,
        result: Result<Suggestion, CoordinationError>,
    ) -> Result<Vec<CoordinatorEvent>, CoordinationError> {
        if let Some(rel) = self.relationships.get_mut(remote) {
            rel.suggestion_pending = false;
        }
        let suggestion = result?;

        let mut out = Vec::new();
        let current = self.state(remote);
        if !current.is_approachable() {
            debug!(remote = %remote, state = %current, "late icebreaker dropped");
            self.prune(remote);
            return Ok(out);
        }
        self.transition(remote, RelationshipState::IcebreakerOffered, &mut out);
        out.push(CoordinatorEvent::IcebreakerSuggested {
            remote: remote.clone(),
            text: suggestion.conversation_starter,
        });
        Ok(out)
    }

    /// Knock on a nearby remote. The call opens once they acknowledge.
    pub fn knock(&mut self, remote: &ParticipantId) -> Result<CoordinatorEvent, CoordinationError> {
        let rel = self
            .relationships
            .get_mut(remote)
            .filter(|r| r.state.is_approachable())
            .ok_or_else(|| CoordinationError::NotNearby(remote.to_string()))?;
        rel.knock_outstanding = true;
        info!(remote = %remote, "knock sent");
        Ok(CoordinatorEvent::KnockSent {
            remote: remote.clone(),
        })
    }

    /// The remote accepted our knock.
    ///
    /// Ignored unless a knock to them is outstanding and they are still
    /// approachable; walking away withdraws the knock.
    pub fn knock_acknowledged(&mut self, remote: &ParticipantId) -> Vec<CoordinatorEvent> {
        let mut out = Vec::new();
        let Some(rel) = self.relationships.get_mut(remote) else {
            debug!(remote = %remote, "acknowledgement without a knock ignored");
            return out;
        };
        if !rel.knock_outstanding || !rel.state.is_approachable() {
            debug!(remote = %remote, state = %rel.state, "stale knock acknowledgement ignored");
            return out;
        }
        rel.knock_outstanding = false;
        self.enter_call(remote, &mut out);
        out
    }

    /// `remote` joined a call we are already in.
    pub fn joined_call(&mut self, remote: &ParticipantId) -> Vec<CoordinatorEvent> {
        let mut out = Vec::new();
        let rel = self.relationships.entry(remote.clone()).or_default();
        rel.knock_outstanding = false;
        rel.inbound_knock = false;
        let was_approachable = rel.state.is_approachable();
        self.transition(remote, RelationshipState::InCall, &mut out);
        if was_approachable {
            out.push(CoordinatorEvent::AffordanceHidden {
                remote: remote.clone(),
            });
        }
        out
    }

    /// A remote knocked on us.
    pub fn knock_received(&mut self, remote: &ParticipantId) -> Vec<CoordinatorEvent> {
        let rel = self.relationships.entry(remote.clone()).or_default();
        if rel.state == RelationshipState::InCall {
            return Vec::new();
        }
        rel.inbound_knock = true;
        info!(remote = %remote, "knock received");
        vec![CoordinatorEvent::KnockReceived {
            remote: remote.clone(),
        }]
    }

    /// Accept an inbound knock.
    pub fn accept_knock(
        &mut self,
        remote: &ParticipantId,
    ) -> Result<Vec<CoordinatorEvent>, CoordinationError> {
        let rel = self
            .relationships
            .get_mut(remote)
            .filter(|r| r.inbound_knock)
            .ok_or_else(|| CoordinationError::NoPendingKnock(remote.to_string()))?;
        rel.inbound_knock = false;
        let mut out = Vec::new();
        self.enter_call(remote, &mut out);
        Ok(out)
    }

    /// Opening the call for these remotes failed.
    pub fn call_rejected(&mut self, remotes: &[ParticipantId]) -> Vec<CoordinatorEvent> {
        self.leave_call(remotes)
    }

    /// The call with these remotes ended.
    pub fn call_ended(&mut self, remotes: &[ParticipantId]) -> Vec<CoordinatorEvent> {
        self.leave_call(remotes)
    }

    fn entered(&mut self, remote: ParticipantId, out: &mut Vec<CoordinatorEvent>) {
        let rel = self.relationships.entry(remote.clone()).or_default();
        rel.near = true;
        if rel.state == RelationshipState::Unaware {
            self.transition(&remote, RelationshipState::Nearby, out);
            out.push(CoordinatorEvent::AffordanceShown { remote });
        }
    }

    fn exited(&mut self, remote: ParticipantId, out: &mut Vec<CoordinatorEvent>) {
        let Some(rel) = self.relationships.get_mut(&remote) else {
            return;
        };
        rel.near = false;
        rel.knock_outstanding = false;
        if rel.state.is_approachable() {
            self.transition(&remote, RelationshipState::Unaware, out);
            out.push(CoordinatorEvent::AffordanceHidden {
                remote: remote.clone(),
            });
        }
        self.prune(&remote);
    }

    fn enter_call(&mut self, remote: &ParticipantId, out: &mut Vec<CoordinatorEvent>) {
        self.transition(remote, RelationshipState::InCall, out);
        out.push(CoordinatorEvent::CallIntent {
            remotes: vec![remote.clone()],
        });
    }

    fn leave_call(&mut self, remotes: &[ParticipantId]) -> Vec<CoordinatorEvent> {
        let mut out = Vec::new();
        for remote in remotes {
            if self.state(remote) != RelationshipState::InCall {
                continue;
            }
            if self.is_near(remote) {
                self.transition(remote, RelationshipState::Nearby, &mut out);
                out.push(CoordinatorEvent::AffordanceShown {
                    remote: remote.clone(),
                });
            } else {
                self.transition(remote, RelationshipState::Unaware, &mut out);
                self.prune(remote);
            }
        }
        out
    }

    fn transition(
        &mut self,
        remote: &ParticipantId,
        to: RelationshipState,
        out: &mut Vec<CoordinatorEvent>,
    ) {
        let rel = self.relationships.entry(remote.clone()).or_default();
        let from = rel.state;
        if from == to {
            return;
        }
        rel.state = to;
        debug!(remote = %remote, %from, %to, "relationship changed");
        out.push(CoordinatorEvent::StateChanged {
            remote: remote.clone(),
            from,
            to,
        });
    }

    fn prune(&mut self, remote: &ParticipantId) {
        if self.relationships.get(remote).is_some_and(Relationship::is_idle) {
            self.relationships.remove(remote);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proximity::{ExitReason, PairKey};

    fn me() -> ParticipantId {
        "me".into()
    }

    fn bob() -> ParticipantId {
        "bob".into()
    }

    fn coordinator() -> Coordinator {
        Coordinator::new(me(), "likes hiking")
    }

    fn enter(remote: &str) -> ProximityBatch {
        ProximityBatch {
            tick: 1,
            events: vec![ProximityEvent::Enter {
                pair: PairKey::new(me(), remote.into()),
                distance: 10.0,
            }],
            unchanged: 0,
        }
    }

    fn exit(remote: &str) -> ProximityBatch {
        ProximityBatch {
            tick: 2,
            events: vec![ProximityEvent::Exit {
                pair: PairKey::new(me(), remote.into()),
                reason: ExitReason::Distance,
            }],
            unchanged: 0,
        }
    }

    fn suggestion(text: &str) -> Result<Suggestion, CoordinationError> {
        Ok(Suggestion {
            conversation_starter: text.to_string(),
        })
    }

    #[test]
    fn enter_shows_affordance() {
        let mut c = coordinator();
        let events = c.handle_batch(&enter("bob"));
        assert!(events.contains(&CoordinatorEvent::AffordanceShown { remote: bob() }));
        assert_eq!(c.state(&bob()), RelationshipState::Nearby);
    }

    #[test]
    fn pairs_without_local_participant_are_ignored() {
        let mut c = coordinator();
        let batch = ProximityBatch {
            tick: 1,
            events: vec![ProximityEvent::Enter {
                pair: PairKey::new("x".into(), "y".into()),
                distance: 1.0,
            }],
            unchanged: 0,
        };
        assert!(c.handle_batch(&batch).is_empty());
        assert_eq!(c.state(&"x".into()), RelationshipState::Unaware);
    }

    #[test]
    fn exit_hides_affordance() {
        let mut c = coordinator();
        c.handle_batch(&enter("bob"));
        let events = c.handle_batch(&exit("bob"));
        assert!(events.contains(&CoordinatorEvent::AffordanceHidden { remote: bob() }));
        assert_eq!(c.state(&bob()), RelationshipState::Unaware);
        assert!(c.in_state(RelationshipState::Unaware).is_empty());
    }

    #[test]
    fn icebreaker_requires_nearby() {
        let mut c = coordinator();
        assert_eq!(
            c.begin_icebreaker(&bob(), "").unwrap_err(),
            CoordinationError::NotNearby("bob".into())
        );
    }

    #[test]
    fn icebreaker_builds_request_from_both_contexts() {
        let mut c = coordinator();
        c.handle_batch(&enter("bob"));
        let request = c.begin_icebreaker(&bob(), "plays chess").unwrap();
        assert_eq!(request.user_context, "likes hiking");
        assert_eq!(request.other_user_context, "plays chess");
    }

    #[test]
    fn second_icebreaker_for_same_remote_is_rejected_while_pending() {
        let mut c = coordinator();
        c.handle_batch(&enter("bob"));
        c.handle_batch(&enter("carol"));

        c.begin_icebreaker(&bob(), "").unwrap();
        assert_eq!(
            c.begin_icebreaker(&bob(), "").unwrap_err(),
            CoordinationError::SuggestionPending("bob".into())
        );
        assert!(c.begin_icebreaker(&"carol".into(), "").is_ok());

        c.resolve_icebreaker(&bob(), suggestion("hi")).unwrap();
        assert!(c.begin_icebreaker(&bob(), "").is_ok());
    }

    #[test]
    fn icebreaker_success_offers_suggestion() {
        let mut c = coordinator();
        c.handle_batch(&enter("bob"));
        c.begin_icebreaker(&bob(), "").unwrap();

        let events = c
            .resolve_icebreaker(&bob(), suggestion("Seen any good trails?"))
            .unwrap();
        assert!(events.contains(&CoordinatorEvent::IcebreakerSuggested {
            remote: bob(),
            text: "Seen any good trails?".into()
        }));
        assert_eq!(c.state(&bob()), RelationshipState::IcebreakerOffered);
        assert!(!c.suggestion_pending(&bob()));
    }

    #[test]
    fn icebreaker_failure_keeps_state() {
        let mut c = coordinator();
        c.handle_batch(&enter("bob"));
        c.begin_icebreaker(&bob(), "").unwrap();

        let err = c
            .resolve_icebreaker(&bob(), Err(CoordinationError::SuggestionFailed("503".into())))
            .unwrap_err();
        assert!(matches!(err, CoordinationError::SuggestionFailed(_)));
        assert_eq!(c.state(&bob()), RelationshipState::Nearby);
        assert!(!c.suggestion_pending(&bob()));
    }

    #[test]
    fn late_icebreaker_after_exit_is_dropped() {
        let mut c = coordinator();
        c.handle_batch(&enter("bob"));
        c.begin_icebreaker(&bob(), "").unwrap();
        c.handle_batch(&exit("bob"));

        let events = c.resolve_icebreaker(&bob(), suggestion("too late")).unwrap();
        assert!(events.is_empty());
        assert_eq!(c.state(&bob()), RelationshipState::Unaware);
    }

    #[test]
    fn knock_then_ack_requests_call() {
        let mut c = coordinator();
        c.handle_batch(&enter("bob"));
        assert_eq!(
            c.knock(&bob()).unwrap(),
            CoordinatorEvent::KnockSent { remote: bob() }
        );
        assert_eq!(c.state(&bob()), RelationshipState::Nearby);

        let events = c.knock_acknowledged(&bob());
        assert!(events.contains(&CoordinatorEvent::CallIntent {
            remotes: vec![bob()]
        }));
        assert_eq!(c.state(&bob()), RelationshipState::InCall);
    }

    #[test]
    fn ack_without_knock_is_ignored() {
        let mut c = coordinator();
        c.handle_batch(&enter("bob"));
        assert!(c.knock_acknowledged(&bob()).is_empty());
        assert_eq!(c.state(&bob()), RelationshipState::Nearby);
    }

    #[test]
    fn ack_after_walking_away_opens_no_call() {
        let mut c = coordinator();
        c.handle_batch(&enter("bob"));
        c.knock(&bob()).unwrap();
        c.handle_batch(&exit("bob"));

        assert!(c.knock_acknowledged(&bob()).is_empty());
        assert_eq!(c.state(&bob()), RelationshipState::Unaware);
        assert!(c.in_state(RelationshipState::Unaware).is_empty());
    }

    #[test]
    fn ack_for_knock_before_leaving_and_returning_is_ignored() {
        let mut c = coordinator();
        c.handle_batch(&enter("bob"));
        c.knock(&bob()).unwrap();
        c.handle_batch(&exit("bob"));
        c.handle_batch(&enter("bob"));

        assert!(c.knock_acknowledged(&bob()).is_empty());
        assert_eq!(c.state(&bob()), RelationshipState::Nearby);
    }

    #[test]
    fn joining_an_open_call_hides_affordances() {
        let mut c = coordinator();
        c.handle_batch(&enter("carol"));
        let carol: ParticipantId = "carol".into();

        let events = c.joined_call(&carol);
        assert!(events.contains(&CoordinatorEvent::AffordanceHidden {
            remote: carol.clone()
        }));
        assert_eq!(c.state(&carol), RelationshipState::InCall);
        assert!(matches!(c.knock(&carol), Err(CoordinationError::NotNearby(_))));

        c.call_ended(&[carol.clone()]);
        assert_eq!(c.state(&carol), RelationshipState::Nearby);
    }

    #[test]
    fn distant_joiner_returns_to_unaware_after_call() {
        let mut c = coordinator();
        let dave: ParticipantId = "dave".into();
        let events = c.joined_call(&dave);
        assert_eq!(
            events,
            vec![CoordinatorEvent::StateChanged {
                remote: dave.clone(),
                from: RelationshipState::Unaware,
                to: RelationshipState::InCall,
            }]
        );
        c.call_ended(&[dave.clone()]);
        assert_eq!(c.state(&dave), RelationshipState::Unaware);
        assert!(c.in_state(RelationshipState::Unaware).is_empty());
    }

    #[test]
    fn knock_requires_nearby() {
        let mut c = coordinator();
        assert!(matches!(
            c.knock(&bob()),
            Err(CoordinationError::NotNearby(_))
        ));
    }

    #[test]
    fn inbound_knock_can_be_accepted() {
        let mut c = coordinator();
        assert_eq!(
            c.accept_knock(&bob()).unwrap_err(),
            CoordinationError::NoPendingKnock("bob".into())
        );
        assert_eq!(
            c.knock_received(&bob()),
            vec![CoordinatorEvent::KnockReceived { remote: bob() }]
        );
        let events = c.accept_knock(&bob()).unwrap();
        assert!(events.contains(&CoordinatorEvent::CallIntent {
            remotes: vec![bob()]
        }));
        assert_eq!(c.state(&bob()), RelationshipState::InCall);
    }

    #[test]
    fn call_survives_moving_apart() {
        let mut c = coordinator();
        c.handle_batch(&enter("bob"));
        c.knock(&bob()).unwrap();
        c.knock_acknowledged(&bob());

        let events = c.handle_batch(&exit("bob"));
        assert!(events.is_empty());
        assert_eq!(c.state(&bob()), RelationshipState::InCall);

        c.call_ended(&[bob()]);
        assert_eq!(c.state(&bob()), RelationshipState::Unaware);
    }

    #[test]
    fn call_end_while_near_shows_affordance_again() {
        let mut c = coordinator();
        c.handle_batch(&enter("bob"));
        c.knock(&bob()).unwrap();
        c.knock_acknowledged(&bob());

        let events = c.call_ended(&[bob()]);
        assert!(events.contains(&CoordinatorEvent::AffordanceShown { remote: bob() }));
        assert_eq!(c.state(&bob()), RelationshipState::Nearby);
    }

    #[test]
    fn rejected_call_reverts_state() {
        let mut c = coordinator();
        c.knock_received(&bob());
        c.accept_knock(&bob()).unwrap();
        c.call_rejected(&[bob()]);
        assert_eq!(c.state(&bob()), RelationshipState::Unaware);
    }
}
