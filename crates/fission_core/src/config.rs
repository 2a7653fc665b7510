//! Runtime configuration for the search strategies.
//!
//! The physical problem lives in the settings records of `fission_data`;
//! this module only holds knobs that shape how the search runs. Every
//! field has a default so a partial `planner.toml` is enough.
//!
//! ## Example `planner.toml`
//!
//! ```toml
//! seed = 7
//!
//! [annealing]
//! initial_temperature = 0.5
//! cooling_rate = 0.9999
//!
//! [trainer]
//! max_converge_rollout = 200000
//! mini_batch = 32
//! ```

use serde::{Deserialize, Serialize};

/// Schedule of the classic local search.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AnnealingConfig {
    pub initial_temperature: f64,
    /// Multiplier applied to the temperature after every step.
    pub cooling_rate: f64,
    pub min_temperature: f64,
    /// Steps without a phase-best improvement before a reheat.
    pub max_stagnation: u64,
    /// Weight of positive net heat during the heat-neutral phase.
    pub heat_penalty: f64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 0.5,
            cooling_rate: 0.9999,
            min_temperature: 1e-4,
            max_stagnation: 50_000,
            heat_penalty: 4.0,
        }
    }
}

/// Stage lengths and network shape of the staged trainer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrainerConfig {
    /// Non-improving collection steps that end the data-gathering half of
    /// the train stage.
    pub max_converge_train: u64,
    pub max_converge_infer: u64,
    pub max_converge_rollout: u64,
    pub penalty_update_period: u64,
    pub mini_batch: usize,
    pub epochs: usize,
    pub pool_capacity: usize,
    pub learning_rate: f64,
    pub hidden1: usize,
    pub hidden2: usize,
    /// One accepted layout in `trajectory_keep` is recorded for training.
    pub trajectory_keep: u32,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_converge_train: 10_976,
            max_converge_infer: 10_976,
            max_converge_rollout: 1_097_600,
            penalty_update_period: 10_976,
            mini_batch: 64,
            epochs: 2,
            pool_capacity: 200_000,
            learning_rate: 0.01,
            hidden1: 128,
            hidden2: 64,
            trajectory_keep: 10,
        }
    }
}

/// Batch sizing for host-driven interactive stepping.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct InteractiveConfig {
    pub min_batch: u64,
    /// Work budget per batch, divided by the reactor volume.
    pub scale: u64,
    /// Training iterations per interactive call.
    pub net_batch: u64,
    /// Steps that must pass between two best-design redraws.
    pub redraw_nagle: u64,
}

impl Default for InteractiveConfig {
    fn default() -> Self {
        Self {
            min_batch: 4096,
            scale: 327_680,
            net_batch: 4,
            redraw_nagle: 4096,
        }
    }
}

/// Top-level runtime configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PlannerConfig {
    pub seed: u64,
    pub annealing: AnnealingConfig,
    pub trainer: TrainerConfig,
    pub interactive: InteractiveConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            annealing: AnnealingConfig::default(),
            trainer: TrainerConfig::default(),
            interactive: InteractiveConfig::default(),
        }
    }
}

impl PlannerConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        let a = &self.annealing;
        anyhow::ensure!(
            a.initial_temperature > 0.0,
            "Initial temperature must be positive"
        );
        anyhow::ensure!(
            a.cooling_rate > 0.0 && a.cooling_rate <= 1.0,
            "Cooling rate must be in (0.0, 1.0]"
        );
        anyhow::ensure!(
            a.min_temperature > 0.0 && a.min_temperature <= a.initial_temperature,
            "Min temperature must be in (0.0, initial_temperature]"
        );
        anyhow::ensure!(a.max_stagnation > 0, "Max stagnation must be positive");
        anyhow::ensure!(a.heat_penalty >= 0.0, "Heat penalty must be non-negative");

        let t = &self.trainer;
        anyhow::ensure!(t.max_converge_train > 0, "Train stage length must be positive");
        anyhow::ensure!(t.max_converge_infer > 0, "Inference stage length must be positive");
        anyhow::ensure!(t.max_converge_rollout > 0, "Rollout stage length must be positive");
        anyhow::ensure!(
            t.penalty_update_period > 0,
            "Penalty update period must be positive"
        );
        anyhow::ensure!(t.mini_batch > 0, "Mini batch must be positive");
        anyhow::ensure!(t.epochs > 0, "Epochs must be positive");
        anyhow::ensure!(
            t.pool_capacity >= t.mini_batch,
            "Pool capacity must hold at least one mini batch"
        );
        anyhow::ensure!(
            t.learning_rate > 0.0 && t.learning_rate < 1.0,
            "Learning rate must be in (0.0, 1.0)"
        );
        anyhow::ensure!(t.hidden1 > 0 && t.hidden2 > 0, "Hidden layers must be non-empty");
        anyhow::ensure!(t.trajectory_keep > 0, "Trajectory keep must be positive");

        let i = &self.interactive;
        anyhow::ensure!(i.min_batch > 0, "Interactive min batch must be positive");
        anyhow::ensure!(i.scale > 0, "Interactive scale must be positive");
        anyhow::ensure!(i.net_batch > 0, "Interactive net batch must be positive");

        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// SHA-256 over every field, hex encoded.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.seed.to_le_bytes());
        hasher.update(format!("{:?}", self.annealing).as_bytes());
        hasher.update(format!("{:?}", self.trainer).as_bytes());
        hasher.update(format!("{:?}", self.interactive).as_bytes());
        hex::encode(hasher.finalize())
    }
}
