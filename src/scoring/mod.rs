//! Rule-based risk scoring over a [`FeatureSet`](crate::features::FeatureSet).

pub mod heuristic;
pub mod predicates;

pub use heuristic::{HeuristicScorer, HeuristicVerdict};
pub use predicates::{PREDICATES, Predicate, PredicateId};
