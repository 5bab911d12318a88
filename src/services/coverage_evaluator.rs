//! Coverage evaluation.
//!
//! Pure function of the snapshot: the same snapshot always yields the same
//! metrics.

use crate::domain::models::{
    CoverageMetrics, Dimension, DimensionWeights, EngineWarning, GraphSnapshot, MAX_DEPTH,
};

/// Derives [`CoverageMetrics`] from a graph snapshot.
#[derive(Debug, Clone, Default)]
pub struct CoverageEvaluator {
    weights: DimensionWeights,
}

impl CoverageEvaluator {
    /// Create an evaluator with the given dimension weights.
    pub fn new(weights: DimensionWeights) -> Self {
        Self { weights }
    }

    /// Compute metrics for `snapshot` with the active node at `current_depth`.
    ///
    /// A malformed snapshot yields zero metrics and a warning.
    pub fn evaluate(
        &self,
        snapshot: &GraphSnapshot,
        current_depth: u8,
    ) -> (CoverageMetrics, Vec<EngineWarning>) {
        let malformed: Vec<EngineWarning> = snapshot
            .validate()
            .into_iter()
            .filter(|issue| issue.is_malformed())
            .map(|issue| EngineWarning::MalformedSnapshot(issue.to_string()))
            .collect();
        if !malformed.is_empty() {
            return (CoverageMetrics::zero(), malformed);
        }

        let dimension_coverage = Dimension::ALL
            .iter()
            .map(|d| (*d, Self::dimension_coverage(snapshot, *d)))
            .collect();
        let mut metrics = CoverageMetrics {
            overall_coverage: 0.0,
            dimension_coverage,
            current_depth: current_depth.min(MAX_DEPTH),
        };
        metrics.overall_coverage = self.overall(&metrics);
        (metrics, Vec::new())
    }

    /// Accept caller-precomputed metrics, clamping anything out of range.
    pub fn normalize(
        &self,
        mut metrics: CoverageMetrics,
        current_depth: u8,
    ) -> (CoverageMetrics, Vec<EngineWarning>) {
        let mut warnings = Vec::new();
        if metrics.clamp_in_place() {
            warnings.push(EngineWarning::OutOfRange { field: "coverage" });
        }
        metrics.current_depth = current_depth.min(MAX_DEPTH);
        (metrics, warnings)
    }

    /// Coverage of one dimension.
    ///
    /// Relevant nodes expect the dimension's slot or carry its tag. A tagged
    /// node that does not expect the slot counts as covered.
    pub fn dimension_coverage(snapshot: &GraphSnapshot, dimension: Dimension) -> f64 {
        let slot = dimension.slot();
        let mut relevant = 0usize;
        let mut filled = 0usize;
        for node in &snapshot.nodes {
            let expects = node.node_type.expects_slot(slot);
            let tagged = node.dimension_tags.contains(&dimension);
            if !expects && !tagged {
                continue;
            }
            relevant += 1;
            if !expects || node.slot_filled(slot) {
                filled += 1;
            }
        }
        if relevant == 0 {
            0.0
        } else {
            filled as f64 / relevant as f64
        }
    }

    /// Weighted average of the dimension coverages.
    pub fn overall(&self, metrics: &CoverageMetrics) -> f64 {
        let (sum, total) = Dimension::ALL.iter().fold((0.0, 0.0), |(sum, total), d| {
            let w = self.weights.weight(*d);
            (sum + w * metrics.dimension(*d), total + w)
        });
        if total > 0.0 {
            (sum / total).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
