//! Normalises raw emotion/energy signals into a [`UserState`].

use crate::domain::models::user_state::{NEUTRAL_EMOTIONAL_ENERGY, NEUTRAL_ENERGY_LEVEL};
use crate::domain::models::{EngineWarning, UserState, UserStateSignal};

/// Maps a possibly partial signal to a clamped user state.
///
/// With a half-life configured the result is exponentially smoothed against
/// the previous turn's state: `alpha = 1 - 0.5^(1 / half_life)`, so a step
/// change in the signal is half absorbed after `half_life` turns. Without one
/// the mapping has no history.
#[derive(Debug, Clone, Default)]
pub struct UserStateAssessor {
    half_life_turns: Option<f64>,
}

impl UserStateAssessor {
    /// Create an assessor; `None` disables smoothing.
    pub fn new(half_life_turns: Option<f64>) -> Self {
        Self { half_life_turns }
    }

    /// Smoothing factor applied to each new observation.
    pub fn alpha(&self) -> f64 {
        self.half_life_turns
            .filter(|h| *h > 0.0)
            .map_or(1.0, |h| 1.0 - 0.5_f64.powf(1.0 / h))
    }

    /// Assess one turn's signal.
    pub fn assess(
        &self,
        signal: Option<&UserStateSignal>,
        previous: Option<UserState>,
    ) -> (UserState, Vec<EngineWarning>) {
        let mut warnings = Vec::new();

        let emotional_energy = normalise(
            signal.and_then(|s| s.emotional_energy),
            "emotional_energy",
            NEUTRAL_EMOTIONAL_ENERGY,
            (-1.0, 1.0),
            &mut warnings,
        );
        let energy_level = normalise(
            signal.and_then(|s| s.energy_level),
            "energy_level",
            NEUTRAL_ENERGY_LEVEL,
            (0.0, 1.0),
            &mut warnings,
        );
        let observed = UserState {
            emotional_energy,
            energy_level,
        };

        let state = match previous {
            Some(prev) if self.half_life_turns.is_some() => {
                let alpha = self.alpha();
                UserState {
                    emotional_energy: prev.emotional_energy
                        + alpha * (observed.emotional_energy - prev.emotional_energy),
                    energy_level: prev.energy_level + alpha * (observed.energy_level - prev.energy_level),
                }
            }
            _ => observed,
        };

        (state, warnings)
    }
}

fn normalise(
    raw: Option<f64>,
    field: &'static str,
    default: f64,
    (lo, hi): (f64, f64),
    warnings: &mut Vec<EngineWarning>,
) -> f64 {
    match raw {
        Some(value) if value.is_nan() => {
            warnings.push(EngineWarning::OutOfRange { field });
            default
        }
        Some(value) => {
            let clamped = value.clamp(lo, hi);
            if clamped != value {
                warnings.push(EngineWarning::OutOfRange { field });
            }
            clamped
        }
        None => {
            warnings.push(EngineWarning::MissingField {
                field,
                default: default.to_string(),
            });
            default
        }
    }
}
