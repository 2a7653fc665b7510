//! Host-facing engine facade and the cooperative session loop.
//!
//! An [`Engine`] owns exactly one search strategy. A [`Session`] drives it in
//! bounded batches, the way a browser host yields back to its event loop
//! between frames, and can be paused without losing any search state.

use std::sync::Arc;

use fission_core::classic::LocalSearch;
use fission_core::overhaul::StagedTrainer;
use fission_core::{
    ClassicDesign, Improvement, Metrics, OverhaulDesign, PlannerConfig, SettingsError, Strategy,
};
use fission_data::{ClassicSettings, OverhaulSettings};
use thiserror::Error;

/// Classic steps run by one [`Engine::run_batch`] call.
pub const CLASSIC_BATCH: u64 = 1024;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// A running optimizer for one of the two reactor models.
pub enum Engine {
    LocalSearch(LocalSearch),
    StagedTrainer(StagedTrainer),
}

impl Engine {
    /// Builds a classic annealing engine from validated inputs.
    pub fn classic(settings: &ClassicSettings, config: &PlannerConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| EngineError::Config(e.to_string()))?;
        let search = LocalSearch::new(settings, &config.annealing, config.seed)?;
        tracing::info!(
            size = ?(settings.size_x, settings.size_y, settings.size_z),
            goal = ?settings.goal,
            seed = config.seed,
            "Classic engine started"
        );
        Ok(Engine::LocalSearch(search))
    }

    /// Builds an overhaul staged trainer from validated inputs.
    pub fn overhaul(settings: &OverhaulSettings, config: &PlannerConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| EngineError::Config(e.to_string()))?;
        let trainer = StagedTrainer::new(
            settings,
            &config.trainer,
            &config.interactive,
            config.seed,
        )?;
        tracing::info!(
            size = ?(settings.size_x, settings.size_y, settings.size_z),
            fuels = settings.fuels.len(),
            goal = ?settings.goal,
            seed = config.seed,
            "Overhaul engine started"
        );
        Ok(Engine::StagedTrainer(trainer))
    }

    /// One strategy step.
    pub fn advance(&mut self) -> Improvement {
        match self {
            Engine::LocalSearch(search) => search.advance(),
            Engine::StagedTrainer(trainer) => trainer.advance(),
        }
    }

    /// One host-sized batch: [`CLASSIC_BATCH`] classic steps, or one
    /// interactive call of the trainer.
    pub fn run_batch(&mut self) -> Improvement {
        match self {
            Engine::LocalSearch(search) => {
                let mut improvement = Improvement::None;
                for _ in 0..CLASSIC_BATCH {
                    improvement |= search.step();
                }
                improvement
            }
            Engine::StagedTrainer(trainer) => trainer.step_interactive(),
        }
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        match self {
            Engine::LocalSearch(search) => search.metrics(),
            Engine::StagedTrainer(trainer) => trainer.metrics(),
        }
    }

    #[must_use]
    pub fn steps(&self) -> u64 {
        self.metrics().steps()
    }

    #[must_use]
    pub fn best_classic(&self) -> Option<&Arc<ClassicDesign>> {
        match self {
            Engine::LocalSearch(search) => search.best(),
            Engine::StagedTrainer(_) => None,
        }
    }

    /// Best heat-neutral classic design.
    #[must_use]
    pub fn best_classic_no_net_heat(&self) -> Option<&Arc<ClassicDesign>> {
        match self {
            Engine::LocalSearch(search) => search.best_no_net_heat(),
            Engine::StagedTrainer(_) => None,
        }
    }

    #[must_use]
    pub fn best_overhaul(&self) -> Option<&Arc<OverhaulDesign>> {
        match self {
            Engine::LocalSearch(_) => None,
            Engine::StagedTrainer(trainer) => trainer.best(),
        }
    }

    #[must_use]
    pub fn as_local_search(&self) -> Option<&LocalSearch> {
        match self {
            Engine::LocalSearch(search) => Some(search),
            Engine::StagedTrainer(_) => None,
        }
    }

    #[must_use]
    pub fn as_staged_trainer(&self) -> Option<&StagedTrainer> {
        match self {
            Engine::LocalSearch(_) => None,
            Engine::StagedTrainer(trainer) => Some(trainer),
        }
    }

    pub fn as_staged_trainer_mut(&mut self) -> Option<&mut StagedTrainer> {
        match self {
            Engine::LocalSearch(_) => None,
            Engine::StagedTrainer(trainer) => Some(trainer),
        }
    }

    /// Releases the engine and returns its final counters.
    pub fn stop(self) -> Metrics {
        let metrics = self.metrics().clone();
        let model = match self {
            Engine::LocalSearch(_) => "classic",
            Engine::StagedTrainer(_) => "overhaul",
        };
        tracing::info!(
            model,
            steps = metrics.steps(),
            evaluations = metrics.evaluations(),
            improvements = metrics.improvements(),
            "Engine stopped"
        );
        metrics
    }
}

/// Cooperative run loop around an [`Engine`].
pub struct Session {
    engine: Engine,
    paused: bool,
    ticks: u64,
}

impl Session {
    /// A new session starts running.
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            paused: false,
            ticks: 0,
        }
    }

    /// Runs one batch; `None` while paused.
    pub fn run_tick(&mut self) -> Option<Improvement> {
        if self.paused {
            return None;
        }
        self.ticks += 1;
        Some(self.engine.run_batch())
    }

    pub fn pause(&mut self) {
        if !self.paused {
            tracing::debug!(steps = self.engine.steps(), "Session paused");
        }
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            tracing::debug!(steps = self.engine.steps(), "Session resumed");
        }
        self.paused = false;
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Batches run so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn stop(self) -> Metrics {
        self.engine.stop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fission_data::Fuel;

    fn small_classic() -> ClassicSettings {
        ClassicSettings {
            size_x: 3,
            size_y: 3,
            size_z: 3,
            ..ClassicSettings::default()
        }
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = ClassicSettings {
            size_x: 0,
            ..small_classic()
        };
        let result = Engine::classic(&settings, &PlannerConfig::default());
        assert!(matches!(result, Err(EngineError::Settings(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PlannerConfig::default();
        config.annealing.cooling_rate = 2.0;
        let result = Engine::classic(&small_classic(), &config);
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_classic_batch_size() {
        let mut engine = Engine::classic(&small_classic(), &PlannerConfig::default()).unwrap();
        engine.run_batch();
        assert_eq!(engine.steps(), CLASSIC_BATCH);
        assert!(engine.best_classic().is_some());
        assert!(engine.best_overhaul().is_none());
    }

    #[test]
    fn test_paused_session_keeps_state() {
        let engine = Engine::classic(&small_classic(), &PlannerConfig::default()).unwrap();
        let mut session = Session::new(engine);
        assert!(session.run_tick().is_some());
        session.pause();
        let steps = session.engine().steps();
        assert!(session.run_tick().is_none());
        assert_eq!(session.engine().steps(), steps);
        session.resume();
        assert!(session.run_tick().is_some());
        assert_eq!(session.ticks(), 2);
        assert_eq!(session.stop().steps(), 2 * CLASSIC_BATCH);
    }

    #[test]
    fn test_overhaul_engine_without_fuels() {
        let settings = OverhaulSettings::default();
        assert!(Engine::overhaul(&settings, &PlannerConfig::default()).is_err());

        let settings = OverhaulSettings {
            size_x: 3,
            size_y: 3,
            size_z: 3,
            fuels: vec![Fuel::new(0.9, 51, 216, true)],
            ..OverhaulSettings::default()
        };
        let engine = Engine::overhaul(&settings, &PlannerConfig::default()).unwrap();
        assert!(engine.as_staged_trainer().is_some());
        assert!(engine.best_overhaul().is_some());
    }
}
