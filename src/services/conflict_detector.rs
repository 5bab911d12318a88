//! Detects contradictions between newly asserted facts and the graph.
//!
//! Near misses are never flagged: a gap of up to the configured tolerance
//! between two year ranges is treated as memory imprecision.

use tracing::debug;

use crate::domain::models::{
    AssertedFact, ConflictReport, ConflictSeverity, EdgeKind, EngineWarning, GraphSnapshot, Node,
    NodeType, TemporalAnchor,
};

/// Compares asserted facts with existing graph content.
#[derive(Debug, Clone)]
pub struct ConflictDetector {
    tolerance_years: i32,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ConflictDetector {
    /// Create a detector with the given temporal tolerance.
    pub fn new(tolerance_years: i32) -> Self {
        Self {
            tolerance_years: tolerance_years.max(0),
        }
    }

    /// Check every fact. Returns the first hard contradiction, or failing
    /// that the first soft ambiguity.
    pub fn detect(
        &self,
        facts: &[AssertedFact],
        snapshot: &GraphSnapshot,
    ) -> (Option<ConflictReport>, Vec<EngineWarning>) {
        let mut warnings = Vec::new();
        let mut soft: Option<ConflictReport> = None;

        for fact in facts {
            let Some(node) = snapshot.node(fact.node_id()) else {
                warnings.push(EngineWarning::UnknownFactNode(fact.node_id().to_string()));
                continue;
            };
            let Some(report) = self.check(fact, node, snapshot) else {
                continue;
            };
            debug!(node = %report.node_id, severity = ?report.severity, "conflict detected");
            match report.severity {
                ConflictSeverity::Hard => return (Some(report), warnings),
                ConflictSeverity::Soft => {
                    soft.get_or_insert(report);
                }
            }
        }

        (soft, warnings)
    }

    fn check(&self, fact: &AssertedFact, node: &Node, snapshot: &GraphSnapshot) -> Option<ConflictReport> {
        match fact {
            AssertedFact::Time {
                start_year,
                end_year,
                ..
            } => self.check_time(TemporalAnchor::new(*start_year, *end_year), node, snapshot),
            AssertedFact::Place { place, .. } => Self::check_place(place, node),
            AssertedFact::Person { person, .. } => self.check_person(person, node, snapshot),
        }
    }

    fn disjoint(&self, a: &TemporalAnchor, b: &TemporalAnchor) -> bool {
        a.gap_years(b) > i64::from(self.tolerance_years)
    }

    fn check_time(
        &self,
        claim: TemporalAnchor,
        node: &Node,
        snapshot: &GraphSnapshot,
    ) -> Option<ConflictReport> {
        let hard = |description: String| ConflictReport {
            severity: ConflictSeverity::Hard,
            node_id: node.id.clone(),
            description,
        };

        if let Some(existing) = &node.temporal_anchor {
            if self.disjoint(&claim, existing) {
                return Some(hard(format!(
                    "'{}' was placed in {}, but is now said to be {}",
                    node.label,
                    span(existing),
                    span(&claim)
                )));
            }
        }

        let ancestors = snapshot.ancestors_of(&node.id);
        for ancestor in &ancestors {
            if let Some(anchor) = &ancestor.temporal_anchor {
                if self.disjoint(&claim, anchor) {
                    return Some(hard(format!(
                        "'{}' is said to be {}, outside '{}' ({})",
                        node.label,
                        span(&claim),
                        ancestor.label,
                        span(anchor)
                    )));
                }
            }
        }

        // Siblings only stand in for the containing range when no ancestor
        // is anchored; inside an anchored chapter they may spread freely.
        if ancestors.iter().all(|a| a.temporal_anchor.is_none()) {
            if let Some((parent, siblings)) = Self::sibling_span(node, snapshot) {
                if self.disjoint(&claim, &siblings) {
                    return Some(hard(format!(
                        "'{}' is said to be {}, apart from the rest of '{}' ({})",
                        node.label,
                        span(&claim),
                        parent.label,
                        span(&siblings)
                    )));
                }
            }
        }

        for (other, kind) in snapshot.neighbours(&node.id) {
            if kind != EdgeKind::Temporal {
                continue;
            }
            if let Some(anchor) = &other.temporal_anchor {
                if self.disjoint(&claim, anchor) {
                    return Some(hard(format!(
                        "'{}' is said to be {}, but it happened alongside '{}' ({})",
                        node.label,
                        span(&claim),
                        other.label,
                        span(anchor)
                    )));
                }
            }
        }

        None
    }

    /// Range covered by the anchored same-type siblings of `node` under its
    /// containment parent.
    fn sibling_span<'a>(
        node: &Node,
        snapshot: &'a GraphSnapshot,
    ) -> Option<(&'a Node, TemporalAnchor)> {
        let parent = snapshot.parent_of(&node.id)?;
        let span = snapshot
            .children_of(&parent.id)
            .into_iter()
            .filter(|s| s.id != node.id && s.node_type == node.node_type)
            .filter_map(|s| s.temporal_anchor)
            .reduce(|a, b| {
                TemporalAnchor::new(a.start_year.min(b.start_year), a.end_year.max(b.end_year))
            })?;
        Some((parent, span))
    }

    fn check_place(place: &str, node: &Node) -> Option<ConflictReport> {
        let recorded = node.location.as_deref()?;
        if recorded.trim().eq_ignore_ascii_case(place.trim()) {
            return None;
        }
        Some(ConflictReport {
            severity: ConflictSeverity::Soft,
            node_id: node.id.clone(),
            description: format!(
                "'{}' was recorded in {recorded}, now mentioned in {place}",
                node.label
            ),
        })
    }

    fn check_person(&self, person: &str, node: &Node, snapshot: &GraphSnapshot) -> Option<ConflictReport> {
        let event = node.temporal_anchor?;
        let wanted = person.trim();
        let relationship = snapshot.nodes.iter().find(|n| {
            n.node_type == NodeType::Relationship
                && (n.id == wanted || n.label.trim().eq_ignore_ascii_case(wanted))
        })?;
        let known_from = relationship.temporal_anchor?;
        let lead = i64::from(known_from.start_year) - i64::from(event.end_year);
        if lead <= i64::from(self.tolerance_years) {
            return None;
        }
        Some(ConflictReport {
            severity: ConflictSeverity::Soft,
            node_id: node.id.clone(),
            description: format!(
                "'{}' is said to involve {}, who only appears from {}",
                node.label, relationship.label, known_from.start_year
            ),
        })
    }
}

fn span(anchor: &TemporalAnchor) -> String {
    if anchor.start_year == anchor.end_year {
        anchor.start_year.to_string()
    } else {
        format!("{}-{}", anchor.start_year, anchor.end_year)
    }
}
