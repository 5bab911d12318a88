//! Pause/resume state carried between interview sessions.

use serde::{Deserialize, Serialize};

/// Minimal state needed to resume an interview in a later session.
///
/// Created only on PAUSE_SESSION, consumed once at the start of the next
/// session, then superseded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Node the conversation was on when the session paused.
    pub last_discussed_node: Option<String>,

    /// Node to open the next session with.
    pub next_resume_node: Option<String>,

    /// Labels of nodes touched this session, in first-touch order.
    #[serde(default)]
    pub topics_covered_today: Vec<String>,

    /// Change in overall coverage since the session started.
    pub coverage_today: f64,

    /// Compact digest of the session.
    #[serde(default)]
    pub summary_today: String,
}

impl Checkpoint {
    /// Serialize for storage.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from storage.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Resume data taken out of a checkpoint at session start.
///
/// Holding a `ResumeSeed` means the checkpoint has been consumed; the seed is
/// itself spent on the first turn of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeSeed {
    /// Node to focus on first.
    pub resume_node: Option<String>,
    /// Node the previous session ended on.
    pub previous_node: Option<String>,
}

impl From<Checkpoint> for ResumeSeed {
    fn from(checkpoint: Checkpoint) -> Self {
        Self {
            resume_node: checkpoint.next_resume_node,
            previous_node: checkpoint.last_discussed_node,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let checkpoint = Checkpoint {
            last_discussed_node: Some("ev_wedding".to_string()),
            next_resume_node: Some("rel_sister".to_string()),
            topics_covered_today: vec!["Wedding".to_string(), "First job".to_string()],
            coverage_today: 0.125,
            summary_today: "2 topics".to_string(),
        };
        let json = checkpoint.to_json().unwrap();
        assert_eq!(Checkpoint::from_json(&json).unwrap(), checkpoint);
    }

    #[test]
    fn test_seed_takes_resume_node() {
        let seed = ResumeSeed::from(Checkpoint {
            last_discussed_node: Some("a".to_string()),
            next_resume_node: Some("b".to_string()),
            topics_covered_today: vec![],
            coverage_today: 0.0,
            summary_today: String::new(),
        });
        assert_eq!(seed.resume_node.as_deref(), Some("b"));
        assert_eq!(seed.previous_node.as_deref(), Some("a"));
    }
}
