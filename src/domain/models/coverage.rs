//! Coverage metrics derived from a graph snapshot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic dimension of biographical coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// When things happened.
    Time,
    /// Where things happened.
    Space,
    /// Who was involved.
    People,
    /// How it felt.
    Emotion,
    /// What it meant in hindsight.
    Reflection,
}

impl Dimension {
    /// All dimensions in canonical order.
    pub const ALL: [Self; 5] = [
        Self::Time,
        Self::Space,
        Self::People,
        Self::Emotion,
        Self::Reflection,
    ];

    /// Node slot that evidences this dimension.
    pub fn slot(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Space => "location",
            Self::People => "people",
            Self::Emotion => "emotion",
            Self::Reflection => "reflection",
        }
    }

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Space => "space",
            Self::People => "people",
            Self::Emotion => "emotion",
            Self::Reflection => "reflection",
        }
    }
}

/// Maximum value of [`CoverageMetrics::current_depth`].
pub const MAX_DEPTH: u8 = 5;

/// Completeness metrics for one turn.
///
/// Recomputed every turn from the snapshot; never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageMetrics {
    /// Weighted average of the dimension coverages, in `[0, 1]`.
    pub overall_coverage: f64,

    /// Coverage per dimension, each in `[0, 1]`.
    pub dimension_coverage: BTreeMap<Dimension, f64>,

    /// DEEP_DIVE actions already taken on the active node this session, capped at 5.
    pub current_depth: u8,
}

impl CoverageMetrics {
    /// Metrics with every value at zero.
    pub fn zero() -> Self {
        Self {
            overall_coverage: 0.0,
            dimension_coverage: Dimension::ALL.iter().map(|d| (*d, 0.0)).collect(),
            current_depth: 0,
        }
    }

    /// Coverage of a single dimension; missing entries read as zero.
    pub fn dimension(&self, dimension: Dimension) -> f64 {
        self.dimension_coverage.get(&dimension).copied().unwrap_or(0.0)
    }

    /// Lowest dimension coverage.
    pub fn min_dimension(&self) -> f64 {
        Dimension::ALL
            .iter()
            .map(|d| self.dimension(*d))
            .fold(f64::INFINITY, f64::min)
    }

    /// Clamp every value into its domain. Returns `true` if anything changed.
    pub fn clamp_in_place(&mut self) -> bool {
        let mut changed = false;
        let overall = sanitize_unit(self.overall_coverage);
        if overall != self.overall_coverage {
            self.overall_coverage = overall;
            changed = true;
        }
        for dimension in Dimension::ALL {
            let raw = self.dimension_coverage.get(&dimension).copied();
            let value = sanitize_unit(raw.unwrap_or(0.0));
            if raw != Some(value) {
                self.dimension_coverage.insert(dimension, value);
                changed = true;
            }
        }
        if self.current_depth > MAX_DEPTH {
            self.current_depth = MAX_DEPTH;
            changed = true;
        }
        changed
    }
}

impl Default for CoverageMetrics {
    fn default() -> Self {
        Self::zero()
    }
}

/// Map NaN to 0 and clamp to `[0, 1]`.
pub(crate) fn sanitize_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
