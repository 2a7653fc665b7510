//! # Fission IO
//!
//! Persistence layer for the fission reactor planner.
//!
//! This crate provides:
//! - Structured error handling with custom error types
//! - JSON and TOML serialization helpers
//! - Validated settings files for both reactor models
//! - Planner JSON export and import of overhaul designs

/// Error types and result aliases for I/O operations
pub mod error;
/// Planner JSON documents for overhaul designs
pub mod export;
/// Validated serialization helpers for JSON and TOML
pub mod serialization;
/// Settings files chosen by extension
pub mod settings;

pub use error::{IoError, Result};
pub use export::{census, census_design, export_design, import_design, PlannerDocument};
pub use serialization::{from_json, from_toml, read_json_file, to_json_pretty, write_json_file};
pub use settings::{load_classic_settings, load_overhaul_settings, load_settings, parse_settings, SettingsFormat};
