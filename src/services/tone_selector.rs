//! Static tone table keyed by (action, goal, user-state sign).

use crate::domain::errors::ConfigError;
use crate::domain::models::{
    GoalType, PrimaryAction, PrimaryTone, SecondaryTone, StateSign, ToneConstraint, ToneGuard,
};

/// Maps a decision to the tone the generation layer should use.
pub struct ToneSelector;

fn tone(
    primary_tone: PrimaryTone,
    secondary_tone: Option<SecondaryTone>,
    constraints: &[ToneGuard],
) -> ToneConstraint {
    ToneConstraint {
        primary_tone,
        secondary_tone,
        constraints: constraints.to_vec(),
    }
}

impl ToneSelector {
    /// Tone for a decision. Combinations outside the action's goal family
    /// get the conservative tone.
    pub fn select(action: PrimaryAction, goal: GoalType, sign: StateSign) -> ToneConstraint {
        use GoalType as G;
        use PrimaryTone as P;
        use SecondaryTone as S;
        use StateSign::{Depleted, Negative, Neutral, Positive};
        use ToneGuard as C;

        if !goal.is_valid_for(action) {
            return ToneConstraint::conservative();
        }

        match (goal, sign) {
            (G::ExtractEmotions, Negative | Depleted) => tone(
                P::EmpathicSupportive,
                Some(S::Patient),
                &[C::ValidateFeelings, C::AllowSilence],
            ),
            (G::ExtractEmotions, Positive) => tone(P::GentleWarm, None, &[C::ValidateFeelings]),
            (G::ExtractEmotions, Neutral) => tone(
                P::GentleWarm,
                Some(S::Patient),
                &[C::ValidateFeelings, C::AvoidLeading],
            ),

            (G::ExtractReflections, Negative | Depleted) => tone(
                P::ReflectiveContemplative,
                Some(S::Patient),
                &[C::ValidateFeelings, C::AllowSilence],
            ),
            (G::ExtractReflections, Positive | Neutral) => {
                tone(P::ReflectiveContemplative, Some(S::Patient), &[C::AllowSilence])
            }

            (G::ExtractDetails | G::ExtractSensory | G::ExtractCausality, Positive) => {
                tone(P::EncouragingWarm, None, &[C::AvoidLeading])
            }
            (G::ExtractDetails | G::ExtractSensory | G::ExtractCausality, Neutral) => {
                tone(P::CuriousInquiring, None, &[C::AvoidLeading])
            }
            (G::ExtractDetails | G::ExtractSensory | G::ExtractCausality, Negative | Depleted) => {
                tone(P::GentleWarm, Some(S::Patient), &[C::AvoidLeading, C::KeepBrief])
            }

            (
                G::ExplorePerson | G::ExploreLocation | G::ExploreTheme | G::ExplorePeriod,
                Positive,
            ) => tone(P::CuriousInquiring, Some(S::Playful), &[]),
            (
                G::ExplorePerson | G::ExploreLocation | G::ExploreTheme | G::ExplorePeriod,
                Neutral,
            ) => tone(P::CuriousInquiring, None, &[]),
            (
                G::ExplorePerson | G::ExploreLocation | G::ExploreTheme | G::ExplorePeriod,
                Negative | Depleted,
            ) => tone(P::GentleWarm, Some(S::Patient), &[C::KeepBrief]),

            (G::ResolveConflict, Negative | Depleted) => tone(
                P::EmpathicSupportive,
                Some(S::Patient),
                &[C::ValidateFeelings, C::NoJudgment],
            ),
            (G::ResolveConflict, Positive | Neutral) => {
                tone(P::GentleWarm, None, &[C::ValidateFeelings, C::NoJudgment])
            }

            (G::ConfirmUnderstanding, Negative | Depleted) => tone(
                P::RespectfulReverent,
                Some(S::Patient),
                &[C::NoJudgment, C::KeepBrief],
            ),
            (G::ConfirmUnderstanding, Positive | Neutral) => {
                tone(P::ProfessionalNeutral, None, &[C::NoJudgment, C::AvoidLeading])
            }

            (G::ReviewPeriod, Depleted) => {
                tone(P::RespectfulReverent, Some(S::Nostalgic), &[C::KeepBrief])
            }
            (G::ReviewPeriod, Positive | Neutral | Negative) => {
                tone(P::RespectfulReverent, Some(S::Nostalgic), &[])
            }

            (G::SynthesizeTheme, _) => {
                tone(P::ReflectiveContemplative, Some(S::Affirming), &[C::AllowSilence])
            }

            (G::SessionFarewell, Depleted) => tone(
                P::EmpathicSupportive,
                Some(S::Grateful),
                &[C::AllowSilence, C::KeepBrief],
            ),
            (G::SessionFarewell, Negative) => tone(
                P::GentleWarm,
                Some(S::Grateful),
                &[C::ValidateFeelings, C::KeepBrief],
            ),
            (G::SessionFarewell, Positive | Neutral) => {
                tone(P::GentleWarm, Some(S::Grateful), &[C::KeepBrief])
            }

            (G::FinalClosure, Negative | Depleted) => tone(
                P::RespectfulReverent,
                Some(S::Grateful),
                &[C::ValidateFeelings],
            ),
            (G::FinalClosure, Positive | Neutral) => {
                tone(P::RespectfulReverent, Some(S::Grateful), &[])
            }
        }
    }

    /// Check every action carries at least one goal and every goal maps
    /// back to its action.
    pub fn validate_table() -> Result<(), ConfigError> {
        for action in PrimaryAction::ALL {
            if action.goals().is_empty() {
                return Err(ConfigError::IncompleteTable(format!("{action} has no goals")));
            }
            for goal in action.goals() {
                if !goal.is_valid_for(action) {
                    return Err(ConfigError::IncompleteTable(format!(
                        "{goal} listed under {action} belongs to {}",
                        goal.family()
                    )));
                }
            }
        }
        Ok(())
    }
}
