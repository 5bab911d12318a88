//! Interviewee state used by the policy rules.

use serde::{Deserialize, Serialize};

/// Neutral valence used when the signal omits it.
pub const NEUTRAL_EMOTIONAL_ENERGY: f64 = 0.0;

/// Neutral energy used when the signal omits it.
pub const NEUTRAL_ENERGY_LEVEL: f64 = 0.5;

/// Raw, possibly partial signal from the emotion/energy estimator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStateSignal {
    /// Valence estimate, nominally in `[-1, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_energy: Option<f64>,

    /// Energy estimate, nominally in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_level: Option<f64>,
}

impl UserStateSignal {
    /// Signal with both fields present.
    pub fn new(emotional_energy: f64, energy_level: f64) -> Self {
        Self {
            emotional_energy: Some(emotional_energy),
            energy_level: Some(energy_level),
        }
    }
}

/// Normalised user state for one turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    /// Valence in `[-1, 1]`; drives tone.
    pub emotional_energy: f64,

    /// Energy in `[0, 1]`; drives continue/pause.
    pub energy_level: f64,
}

impl Default for UserState {
    fn default() -> Self {
        Self {
            emotional_energy: NEUTRAL_EMOTIONAL_ENERGY,
            energy_level: NEUTRAL_ENERGY_LEVEL,
        }
    }
}

/// Coarse reading of the user state used to key the tone table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateSign {
    /// Clearly positive valence.
    Positive,
    /// Neither clearly positive nor negative.
    Neutral,
    /// Clearly negative valence.
    Negative,
    /// Energy below the pause floor, whatever the valence.
    Depleted,
}

impl StateSign {
    /// All signs, for table checks.
    pub const ALL: [Self; 4] = [Self::Positive, Self::Neutral, Self::Negative, Self::Depleted];

    /// Valence magnitude below which the sign reads as neutral.
    pub const VALENCE_DEADBAND: f64 = 0.2;

    /// Classify a user state against the pause energy floor.
    pub fn of(state: &UserState, depleted_below: f64) -> Self {
        if state.energy_level < depleted_below {
            Self::Depleted
        } else if state.emotional_energy > Self::VALENCE_DEADBAND {
            Self::Positive
        } else if state.emotional_energy < -Self::VALENCE_DEADBAND {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_neutral() {
        let state = UserState::default();
        assert_eq!(state.emotional_energy, 0.0);
        assert_eq!(state.energy_level, 0.5);
    }

    #[test]
    fn test_state_sign() {
        let depleted = UserState { emotional_energy: 0.9, energy_level: 0.1 };
        assert_eq!(StateSign::of(&depleted, 0.2), StateSign::Depleted);

        let sad = UserState { emotional_energy: -0.6, energy_level: 0.7 };
        assert_eq!(StateSign::of(&sad, 0.2), StateSign::Negative);

        let flat = UserState { emotional_energy: 0.1, energy_level: 0.7 };
        assert_eq!(StateSign::of(&flat, 0.2), StateSign::Neutral);
    }

    #[test]
    fn test_partial_signal_parses() {
        let signal: UserStateSignal = serde_json::from_str(r#"{"energy_level": 0.3}"#).unwrap();
        assert_eq!(signal.energy_level, Some(0.3));
        assert!(signal.emotional_energy.is_none());
    }
}
