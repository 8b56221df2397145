use serde::{Deserialize, Serialize};

use super::predicates::{PREDICATES, Predicate, PredicateId};
use crate::features::FeatureSet;

/// Normalized rule score and the rules that fired, in table order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicVerdict {
    pub score: f64,
    pub triggered: Vec<PredicateId>,
}

impl HeuristicVerdict {
    pub fn fired(&self, id: PredicateId) -> bool {
        self.triggered.contains(&id)
    }
}

/// Weighted rule table evaluated over a [`FeatureSet`].
#[derive(Debug, Clone)]
pub struct HeuristicScorer {
    predicates: Vec<Predicate>,
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self::with_predicates(PREDICATES.to_vec())
    }
}

impl HeuristicScorer {
    pub fn with_predicates(predicates: Vec<Predicate>) -> Self {
        Self { predicates }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Fired weight over total weight, in `[0, 1]`. An empty table (or one
    /// whose weights sum to zero) scores 0.
    pub fn score(&self, features: &FeatureSet) -> HeuristicVerdict {
        let total: f64 = self.predicates.iter().map(|p| p.weight.max(0.0)).sum();
        let mut fired_weight = 0.0;
        let mut triggered = Vec::new();

        for predicate in &self.predicates {
            if predicate.holds(features) {
                fired_weight += predicate.weight.max(0.0);
                triggered.push(predicate.id);
            }
        }

        let score = if total > 0.0 {
            (fired_weight / total).clamp(0.0, 1.0)
        } else {
            0.0
        };
        tracing::debug!(score, triggered = ?triggered, "heuristic verdict");
        HeuristicVerdict { score, triggered }
    }
}
