//! Overhaul (cluster-cooled, criticality driven) reactor model: evaluator,
//! value network and the staged trainer.

pub mod evaluator;
pub mod net;
pub mod trainer;

pub use evaluator::{canonicalize, OverhaulEvaluation, OverhaulEvaluator, OverhaulMetrics};
pub use net::ValueNet;
pub use trainer::StagedTrainer;
