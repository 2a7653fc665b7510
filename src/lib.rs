//! # Fission Opt
//!
//! Host surface of the fission reactor planner.
//!
//! The search itself lives in `fission_core`; this crate wraps it for the
//! two hosts that drive it:
//! - [`engine::Engine`] and [`engine::Session`] for native callers and the CLI
//! - [`render`] for plain-text layer dumps of a design
//! - browser bindings on `wasm32`
//!
//! ## Example
//!
//! ```
//! use fission_core::PlannerConfig;
//! use fission_data::ClassicSettings;
//! use fission_opt_lib::engine::{Engine, Session};
//!
//! let settings = ClassicSettings {
//!     size_x: 3,
//!     size_y: 3,
//!     size_z: 3,
//!     ..ClassicSettings::default()
//! };
//! let engine = Engine::classic(&settings, &PlannerConfig::default()).unwrap();
//! let mut session = Session::new(engine);
//! session.run_tick();
//! let best = session.engine().best_classic().unwrap();
//! print!("{}", fission_opt_lib::render::layers(&**best));
//! ```

/// Engine facade and cooperative session loop
pub mod engine;
/// Text renderings of designs
pub mod render;

#[cfg(target_arch = "wasm32")]
mod wasm;

pub use engine::{Engine, EngineError, Session};

#[cfg(target_arch = "wasm32")]
pub use wasm::{ClassicSample, FissionOpt, OverhaulFissionOpt, OverhaulSample};
