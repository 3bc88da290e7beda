//! Pure geometry over avatar positions: distance, hysteresis
//! classification and the distance-to-gain curve. No I/O.

use hallway_common::ConfigError;
use serde::{Deserialize, Serialize};

use crate::participant::Position;

/// Whether a pair is spatially close.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Proximity {
    #[default]
    Far,
    Near,
}

/// Euclidean distance in the 2D plane.
pub fn distance(a: Position, b: Position) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Two distinct thresholds forming a hysteresis band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    near: f64,
    far: f64,
}

impl Thresholds {
    /// `far` must be strictly greater than `near`, and both positive.
    pub fn new(near: f64, far: f64) -> Result<Self, ConfigError> {
        if !(near.is_finite() && far.is_finite()) || near <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "proximity thresholds must be positive (near = {near}, far = {far})"
            )));
        }
        if far <= near {
            return Err(ConfigError::ValidationError(format!(
                "far threshold {far} must exceed near threshold {near}"
            )));
        }
        Ok(Self { near, far })
    }

    pub fn near(&self) -> f64 {
        self.near
    }

    pub fn far(&self) -> f64 {
        self.far
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            near: 50.0,
            far: 70.0,
        }
    }
}

/// Classify `distance` given the pair's previous classification.
///
/// A far pair turns near only once the distance drops below `near`; a near
/// pair turns far only once it exceeds `far`. Anything inside the band
/// keeps the previous state.
pub fn classify(previous: Proximity, distance: f64, thresholds: Thresholds) -> Proximity {
    match previous {
        Proximity::Far if distance < thresholds.near => Proximity::Near,
        Proximity::Near if distance > thresholds.far => Proximity::Far,
        other => other,
    }
}

/// Linear roll-off from full gain to `floor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainCurve {
    pub full_gain_within: f64,
    pub silent_beyond: f64,
    pub floor: f64,
}

impl GainCurve {
    /// Non-finite distances get the floor.
    pub fn gain_at(&self, distance: f64) -> f64 {
        let floor = self.floor.clamp(0.0, 1.0);
        if !distance.is_finite() {
            return floor;
        }
        if distance <= self.full_gain_within {
            return 1.0;
        }
        if distance >= self.silent_beyond || self.silent_beyond <= self.full_gain_within {
            return floor;
        }
        let t = (distance - self.full_gain_within) / (self.silent_beyond - self.full_gain_within);
        1.0 - t * (1.0 - floor)
    }
}

impl Default for GainCurve {
    fn default() -> Self {
        Self {
            full_gain_within: 50.0,
            silent_beyond: 300.0,
            floor: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band() -> Thresholds {
        Thresholds::new(50.0, 70.0).unwrap()
    }

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(distance(Position::new(0.0, 0.0), Position::new(3.0, 4.0)), 5.0);
        assert_eq!(distance(Position::new(0.0, 0.0), Position::new(45.0, 0.0)), 45.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Position::new(-12.5, 8.0);
        let b = Position::new(30.0, -4.0);
        assert_eq!(distance(a, b), distance(b, a));
    }

    #[test]
    fn thresholds_require_a_band() {
        assert!(Thresholds::new(50.0, 50.0).is_err());
        assert!(Thresholds::new(70.0, 50.0).is_err());
        assert!(Thresholds::new(0.0, 50.0).is_err());
        assert!(Thresholds::new(f64::NAN, 50.0).is_err());
        assert!(Thresholds::new(50.0, 70.0).is_ok());
    }

    #[test]
    fn enters_below_near_threshold() {
        assert_eq!(classify(Proximity::Far, 40.0, band()), Proximity::Near);
        assert_eq!(classify(Proximity::Far, 50.0, band()), Proximity::Far);
    }

    #[test]
    fn stays_near_until_past_far_threshold() {
        let mut state = classify(Proximity::Far, 40.0, band());
        for d in [55.0, 65.0, 70.0] {
            state = classify(state, d, band());
            assert_eq!(state, Proximity::Near, "flipped at {d}");
        }
        assert_eq!(classify(state, 70.5, band()), Proximity::Far);
    }

    #[test]
    fn band_does_not_re_enter_from_far() {
        for d in [50.0, 55.0, 69.0] {
            assert_eq!(classify(Proximity::Far, d, band()), Proximity::Far);
        }
    }

    #[test]
    fn classify_is_idempotent_for_unchanged_distance() {
        for d in [10.0, 50.0, 60.0, 70.0, 90.0] {
            for start in [Proximity::Far, Proximity::Near] {
                let once = classify(start, d, band());
                assert_eq!(classify(once, d, band()), once);
            }
        }
    }

    #[test]
    fn gain_curve_rolls_off_linearly() {
        let curve = GainCurve {
            full_gain_within: 50.0,
            silent_beyond: 150.0,
            floor: 0.0,
        };
        assert_eq!(curve.gain_at(0.0), 1.0);
        assert_eq!(curve.gain_at(50.0), 1.0);
        assert!((curve.gain_at(100.0) - 0.5).abs() < 1e-9);
        assert_eq!(curve.gain_at(150.0), 0.0);
        assert_eq!(curve.gain_at(1_000.0), 0.0);
    }

    #[test]
    fn gain_curve_respects_floor() {
        let curve = GainCurve {
            full_gain_within: 0.0,
            silent_beyond: 100.0,
            floor: 0.2,
        };
        assert!((curve.gain_at(50.0) - 0.6).abs() < 1e-9);
        assert!((curve.gain_at(500.0) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn gain_curve_maps_non_finite_distance_to_floor() {
        let curve = GainCurve {
            full_gain_within: 50.0,
            silent_beyond: 300.0,
            floor: 0.2,
        };
        assert_eq!(curve.gain_at(f64::NAN), 0.2);
        assert_eq!(curve.gain_at(f64::INFINITY), 0.2);
        assert_eq!(curve.gain_at(f64::NEG_INFINITY), 0.2);
        assert_eq!(GainCurve::default().gain_at(f64::NAN), GainCurve::default().floor);
    }
}
