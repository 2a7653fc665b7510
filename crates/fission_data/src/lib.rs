//! Core data structures for the fission reactor planner.
//!
//! Plain, serializable records shared by the engine and the I/O layer:
//! tile vocabularies for both reactor models, fuel definitions and the
//! settings records a host fills in before constructing an engine.

pub mod data;

pub use data::classic::{
    ClassicGoal, ClassicLimits, ClassicSettings, ClassicTile, Cooler, CoolerTable,
};
pub use data::geometry::{Coord, Symmetry};
pub use data::overhaul::{
    Fuel, HeatSink, ModeratorKind, OverhaulGoal, OverhaulSettings, OverhaulTile, PrimingSource,
    ReflectorKind, BLOCK_KINDS,
};

/// Placement limit value meaning "no limit".
pub const UNLIMITED: i32 = -1;
