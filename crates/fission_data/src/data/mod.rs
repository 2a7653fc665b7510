//! Reactor data definitions, split by model.

pub mod classic;
pub mod geometry;
pub mod overhaul;
