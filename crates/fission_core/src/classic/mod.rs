//! Classic (conduction-cooled) reactor model: evaluator and annealer.

pub mod evaluator;
pub mod search;

pub use evaluator::{canonicalize, ClassicEvaluation, ClassicEvaluator, ClassicMetrics};
pub use search::{LocalSearch, Phase};
