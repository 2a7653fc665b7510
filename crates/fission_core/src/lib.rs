//! # Fission Core
//!
//! The search engine of the fission reactor planner.
//!
//! This crate contains the deterministic optimizer logic, including:
//! - 3D grids with mirror symmetry and placement budgets
//! - The classic (conduction cooled) evaluator and its annealing search
//! - The overhaul (cluster cooled) evaluator and its staged trainer
//! - Best-design tracking with immutable snapshots
//! - Runtime configuration, metrics collection and structured logging
//!
//! ## Architecture
//!
//! Both search strategies implement [`Strategy`]: a host constructs one
//! from validated settings, calls [`Strategy::advance`] in small batches and
//! polls [`Strategy::best`] between batches. All randomness comes from a
//! seeded `ChaCha8Rng`, so an interrupted run and an uninterrupted run of
//! the same length end in the same state.
//!
//! ## Example
//!
//! ```
//! use fission_core::classic::LocalSearch;
//! use fission_core::config::AnnealingConfig;
//! use fission_core::Strategy;
//! use fission_data::ClassicSettings;
//!
//! let settings = ClassicSettings::default();
//! let mut search = LocalSearch::new(&settings, &AnnealingConfig::default(), 42).unwrap();
//! for _ in 0..100 {
//!     search.advance();
//! }
//! let best = search.best().unwrap();
//! assert_eq!(best.data().len(), 125);
//! ```

/// Placement allowances debited by every tile on a grid
pub mod budget;
/// Classic evaluator and simulated annealing search
pub mod classic;
/// Runtime configuration for the search strategies
pub mod config;
/// Immutable design snapshots
pub mod design;
/// Dense 3D grids and mirror symmetry
pub mod grid;
/// Step counters and logging initialisation
pub mod metrics;
/// Overhaul evaluator, value network and staged trainer
pub mod overhaul;
/// Strategy trait, step results and the move generator
pub mod search;
/// Settings validation
pub mod settings;
/// Copy-on-improve best-design holder
pub mod tracker;

pub use config::PlannerConfig;
pub use design::{ClassicDesign, Design, OverhaulDesign};
pub use grid::{Grid, Mirror};
pub use metrics::{init_logging, init_logging_with_filter, Metrics};
pub use search::{Improvement, Stage, Strategy};
pub use settings::{SettingsError, Validate};
pub use tracker::BestTracker;
