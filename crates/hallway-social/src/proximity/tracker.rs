//! The tracker: stored pair state plus per-tick evaluation.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::participant::{ParticipantId, Snapshot};
use crate::spatial::{classify, distance, Proximity, Thresholds};

use super::types::{ExitReason, PairKey, ProximityBatch, ProximityEvent, ProximityPair};

/// Maintains the set of near pairs across ticks.
pub struct ProximityTracker {
    thresholds: Thresholds,
    /// Only pairs currently classified as near are stored.
    pairs: HashMap<PairKey, ProximityPair>,
    tick: u64,
}

impl ProximityTracker {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            pairs: HashMap::new(),
            tick: 0,
        }
    }

    /// Evaluate a full snapshot and return this tick's events.
    ///
    /// Each pair is classified against its own stored state, so a pair
    /// hovering inside the hysteresis band produces no events.
    pub fn apply(&mut self, snapshot: &Snapshot) -> ProximityBatch {
        self.tick += 1;
        let online: Vec<_> = snapshot.online().collect();
        let mut still_near: HashSet<PairKey> = HashSet::with_capacity(self.pairs.len());
        let mut batch = ProximityBatch {
            tick: self.tick,
            ..Default::default()
        };

        for (i, first) in online.iter().enumerate() {
            for second in &online[i + 1..] {
                let key = PairKey::new(first.id.clone(), second.id.clone());
                let d = distance(first.position, second.position);
                let previous = self
                    .pairs
                    .get(&key)
                    .map(|p| p.state)
                    .unwrap_or(Proximity::Far);

                match (previous, classify(previous, d, self.thresholds)) {
                    (Proximity::Far, Proximity::Near) => {
                        trace!(pair = %key, distance = d, "pair entered proximity");
                        self.pairs.insert(
                            key.clone(),
                            ProximityPair {
                                key: key.clone(),
                                distance: d,
                                state: Proximity::Near,
                            },
                        );
                        still_near.insert(key.clone());
                        batch.events.push(ProximityEvent::Enter {
                            pair: key,
                            distance: d,
                        });
                    }
                    (Proximity::Near, Proximity::Near) => {
                        if let Some(pair) = self.pairs.get_mut(&key) {
                            pair.distance = d;
                        }
                        still_near.insert(key);
                        batch.unchanged += 1;
                    }
                    (Proximity::Near, Proximity::Far) => {
                        trace!(pair = %key, distance = d, "pair left proximity");
                        self.pairs.remove(&key);
                        batch.events.push(ProximityEvent::Exit {
                            pair: key,
                            reason: ExitReason::Distance,
                        });
                    }
                    (Proximity::Far, Proximity::Far) => {
                        batch.unchanged += 1;
                    }
                }
            }
        }

        // Pairs not evaluated this tick lost a participant.
        let mut gone: Vec<PairKey> = self
            .pairs
            .keys()
            .filter(|k| !still_near.contains(*k))
            .cloned()
            .collect();
        gone.sort();
        for key in gone {
            self.pairs.remove(&key);
            batch.events.push(ProximityEvent::Exit {
                pair: key,
                reason: ExitReason::Offline,
            });
        }

        if !batch.is_empty() {
            debug!(
                tick = batch.tick,
                events = batch.events.len(),
                near_pairs = self.pairs.len(),
                "proximity changed"
            );
        }
        batch
    }

    /// Drop every tracked pair, reporting each as an offline exit.
    pub fn clear(&mut self) -> Vec<ProximityEvent> {
        let mut keys: Vec<PairKey> = self.pairs.drain().map(|(k, _)| k).collect();
        keys.sort();
        keys.into_iter()
            .map(|pair| ProximityEvent::Exit {
                pair,
                reason: ExitReason::Offline,
            })
            .collect()
    }

    pub fn is_near(&self, a: &ParticipantId, b: &ParticipantId) -> bool {
        self.pairs
            .contains_key(&PairKey::new(a.clone(), b.clone()))
    }

    /// Participants currently near `id`, sorted.
    pub fn neighbours(&self, id: &ParticipantId) -> Vec<ParticipantId> {
        let mut out: Vec<ParticipantId> = self
            .pairs
            .keys()
            .filter_map(|k| k.other(id).cloned())
            .collect();
        out.sort();
        out
    }

    pub fn pairs(&self) -> impl Iterator<Item = &ProximityPair> {
        self.pairs.values()
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::Participant;

    fn tracker() -> ProximityTracker {
        ProximityTracker::new(Thresholds::new(50.0, 70.0).unwrap())
    }

    fn snap(people: &[(&str, f64, f64)]) -> Snapshot {
        Snapshot::new(
            people
                .iter()
                .map(|(id, x, y)| Participant::new(*id, *id, *x, *y))
                .collect(),
        )
        .unwrap()
    }

    fn key(a: &str, b: &str) -> PairKey {
        PairKey::new(a.into(), b.into())
    }

    #[test]
    fn pair_key_is_unordered() {
        assert_eq!(key("a", "b"), key("b", "a"));
        assert_eq!(key("b", "a").a().as_str(), "a");
        assert_eq!(key("a", "b").other(&"a".into()), Some(&"b".into()));
        assert_eq!(key("a", "b").other(&"c".into()), None);
    }

    #[test]
    fn enter_then_exit_by_distance() {
        let mut t = tracker();

        let batch = t.apply(&snap(&[("A", 0.0, 0.0), ("B", 45.0, 0.0)]));
        assert_eq!(
            batch.events,
            vec![ProximityEvent::Enter {
                pair: key("A", "B"),
                distance: 45.0
            }]
        );
        assert!(t.is_near(&"A".into(), &"B".into()));

        let batch = t.apply(&snap(&[("A", 0.0, 0.0), ("B", 100.0, 0.0)]));
        assert_eq!(
            batch.events,
            vec![ProximityEvent::Exit {
                pair: key("A", "B"),
                reason: ExitReason::Distance
            }]
        );
        assert_eq!(t.pair_count(), 0);
    }

    #[test]
    fn identical_ticks_never_re_emit() {
        let mut t = tracker();
        let s = snap(&[("A", 0.0, 0.0), ("B", 45.0, 0.0), ("C", 500.0, 0.0)]);

        assert_eq!(t.apply(&s).events.len(), 1);
        for _ in 0..5 {
            let batch = t.apply(&s);
            assert!(batch.is_empty());
            assert_eq!(batch.unchanged, 3);
        }
    }

    #[test]
    fn hysteresis_band_holds_state() {
        let mut t = tracker();
        t.apply(&snap(&[("A", 0.0, 0.0), ("B", 40.0, 0.0)]));

        for d in [55.0, 69.0, 70.0, 60.0] {
            let batch = t.apply(&snap(&[("A", 0.0, 0.0), ("B", d, 0.0)]));
            assert!(batch.is_empty(), "event at distance {d}");
        }
        assert!(t.is_near(&"A".into(), &"B".into()));

        let batch = t.apply(&snap(&[("A", 0.0, 0.0), ("B", 71.0, 0.0)]));
        assert_eq!(batch.events.len(), 1);

        // Back inside the band from far: no re-entry.
        for d in [69.0, 60.0, 50.0] {
            let batch = t.apply(&snap(&[("A", 0.0, 0.0), ("B", d, 0.0)]));
            assert!(batch.is_empty(), "re-entered at distance {d}");
        }
    }

    #[test]
    fn offline_participant_exits_pairs() {
        let mut t = tracker();
        t.apply(&snap(&[("A", 0.0, 0.0), ("B", 10.0, 0.0), ("C", 0.0, 10.0)]));
        assert_eq!(t.pair_count(), 3);

        let s = Snapshot::new(vec![
            Participant::new("A", "A", 0.0, 0.0),
            Participant::new("B", "B", 10.0, 0.0).offline(),
            Participant::new("C", "C", 0.0, 10.0),
        ])
        .unwrap();
        let batch = t.apply(&s);
        assert_eq!(
            batch.events,
            vec![
                ProximityEvent::Exit {
                    pair: key("A", "B"),
                    reason: ExitReason::Offline
                },
                ProximityEvent::Exit {
                    pair: key("B", "C"),
                    reason: ExitReason::Offline
                },
            ]
        );
        assert!(t.is_near(&"A".into(), &"C".into()));
    }

    #[test]
    fn missing_participant_exits_pairs() {
        let mut t = tracker();
        t.apply(&snap(&[("A", 0.0, 0.0), ("B", 10.0, 0.0)]));
        let batch = t.apply(&snap(&[("A", 0.0, 0.0)]));
        assert_eq!(
            batch.events,
            vec![ProximityEvent::Exit {
                pair: key("A", "B"),
                reason: ExitReason::Offline
            }]
        );
    }

    #[test]
    fn batch_mixes_enters_and_exits_for_shared_participant() {
        let mut t = tracker();
        t.apply(&snap(&[("A", 0.0, 0.0), ("B", 10.0, 0.0), ("C", 300.0, 0.0)]));

        // A walks from B to C in one tick.
        let batch = t.apply(&snap(&[("A", 290.0, 0.0), ("B", 10.0, 0.0), ("C", 300.0, 0.0)]));
        assert_eq!(batch.tick, 2);
        assert_eq!(batch.events.len(), 2);
        assert!(batch.events.contains(&ProximityEvent::Exit {
            pair: key("A", "B"),
            reason: ExitReason::Distance
        }));
        assert!(batch
            .events
            .iter()
            .any(|e| matches!(e, ProximityEvent::Enter { pair, .. } if *pair == key("A", "C"))));
    }

    #[test]
    fn neighbours_lists_near_participants() {
        let mut t = tracker();
        t.apply(&snap(&[("A", 0.0, 0.0), ("B", 10.0, 0.0), ("C", 0.0, 10.0), ("D", 900.0, 0.0)]));
        assert_eq!(
            t.neighbours(&"A".into()),
            vec![ParticipantId::from("B"), ParticipantId::from("C")]
        );
        assert!(t.neighbours(&"D".into()).is_empty());
    }

    #[test]
    fn clear_reports_every_pair() {
        let mut t = tracker();
        t.apply(&snap(&[("A", 0.0, 0.0), ("B", 10.0, 0.0)]));
        let exits = t.clear();
        assert_eq!(exits.len(), 1);
        assert_eq!(t.pair_count(), 0);
    }
}
