use std::sync::Arc;

use fission_data::{OverhaulGoal, OverhaulSettings, OverhaulTile};
use ndarray::Array1;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::evaluator::{canonicalize, OverhaulEvaluation, OverhaulEvaluator, OverhaulMetrics};
use super::net::ValueNet;
use crate::budget::OverhaulBudget;
use crate::config::{InteractiveConfig, TrainerConfig};
use crate::design::{Design, OverhaulDesign};
use crate::grid::{Grid, Mirror};
use crate::metrics::Metrics;
use crate::search::{Improvement, MoveGenerator, Stage, Strategy};
use crate::settings::{self, Validate};
use crate::tracker::BestTracker;

/// Extra scalar features appended to the tile histogram.
pub const STATISTICAL_FEATURES: usize = 8;
const CONSTRAINTS: usize = 2;
const MIN_PENALTY: f64 = 0.001;

/// Maps tiles to flat identifiers without searching the cell table.
#[derive(Debug, Clone)]
struct TileCodec {
    cell_offsets: Vec<i32>,
    n_ids: usize,
}

impl TileCodec {
    fn new(settings: &OverhaulSettings) -> Self {
        let mut cell_offsets = Vec::with_capacity(settings.fuels.len());
        let mut next = 0;
        for fuel in &settings.fuels {
            cell_offsets.push(next);
            next += if fuel.self_priming { 1 } else { 4 };
        }
        Self {
            cell_offsets,
            n_ids: (OverhaulTile::CELL_BASE + next) as usize,
        }
    }

    fn encode(&self, tile: OverhaulTile) -> i32 {
        match tile {
            OverhaulTile::Air => OverhaulTile::AIR_ID,
            OverhaulTile::Cell { fuel, source } => {
                OverhaulTile::CELL_BASE
                    + self.cell_offsets[usize::from(fuel)]
                    + source.map_or(0, |s| s.index() as i32 + 1)
            }
            other => other
                .block_index()
                .map_or(OverhaulTile::AIR_ID, |i| i as i32),
        }
    }
}

#[derive(Debug, Clone)]
struct Sample {
    grid: Grid<OverhaulTile>,
    budget: OverhaulBudget,
    value: OverhaulEvaluation,
    /// Evaluation with every shield closed; only kept when controllable.
    shielded: Option<OverhaulMetrics>,
}

/// Staged optimizer for the overhaul model.
///
/// Every episode runs the same cycle. `Train` first hill-climbs on the
/// shaped fitness while recording a trajectory, then fits the value network
/// on the replay pool. `Inference` restarts and hill-climbs on the network's
/// prediction alone. `Rollout` continues from the inference result on the
/// shaped fitness and records another trajectory. The best feasible layout
/// by raw goal fitness is tracked across all stages.
pub struct StagedTrainer {
    settings: OverhaulSettings,
    config: TrainerConfig,
    interactive: InteractiveConfig,
    evaluator: OverhaulEvaluator,
    shielded_evaluator: Option<OverhaulEvaluator>,
    moves: MoveGenerator<OverhaulTile>,
    codec: TileCodec,
    rng: ChaCha8Rng,
    net: ValueNet,
    stage: Stage,
    fitting: bool,
    pending_fit: u64,
    episode: u64,
    iteration: u64,
    converge: u64,
    samples_seen: u64,
    penalty: [f64; CONSTRAINTS],
    has_feasible: [bool; CONSTRAINTS],
    has_infeasible: [bool; CONSTRAINTS],
    trajectory_buffer: Vec<Array1<f64>>,
    parent: Sample,
    parent_fitness: f64,
    local_best: f64,
    last_episode_best: Option<f64>,
    inference_failed: bool,
    best: BestTracker<OverhaulDesign>,
    best_changed: bool,
    redraw_nagle: u64,
    loss_history: Vec<f64>,
    loss_changed: bool,
    min_criticality: f64,
    min_heat: f64,
    max_output: f64,
    metrics: Metrics,
}

impl StagedTrainer {
    /// Validates `settings` and starts the first episode in [`Stage::Train`].
    pub fn new(
        settings: &OverhaulSettings,
        config: &TrainerConfig,
        interactive: &InteractiveConfig,
        seed: u64,
    ) -> settings::Result<Self> {
        settings.validate()?;
        let dims = (
            settings.size_x as usize,
            settings.size_y as usize,
            settings.size_z as usize,
        );
        let mut palette: Vec<OverhaulTile> = (0..fission_data::BLOCK_KINDS)
            .filter_map(OverhaulTile::from_block_index)
            .collect();
        palette.extend(
            settings
                .cell_types()
                .into_iter()
                .map(|(fuel, source)| OverhaulTile::Cell { fuel, source }),
        );
        let moves = MoveGenerator::new(
            Mirror::new(dims, settings.symmetry),
            palette,
            OverhaulTile::Air,
        );
        let codec = TileCodec::new(settings);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let net = ValueNet::new(codec.n_ids + STATISTICAL_FEATURES, config, &mut rng);
        let fuels = &settings.fuels;
        let min_criticality = fuels.iter().map(|f| f.criticality).min().unwrap_or(1).max(1);
        let min_heat = fuels.iter().map(|f| f.heat).min().unwrap_or(1).max(1);
        let max_output = fuels.iter().map(|f| f.heat).max().unwrap_or(1).max(1);

        let mut evaluator = OverhaulEvaluator::new(settings, false);
        let mut shielded_evaluator = settings
            .controllable
            .then(|| OverhaulEvaluator::new(settings, true));
        let empty = Grid::filled(dims, OverhaulTile::Air);
        let value = evaluator.evaluate(&empty);
        let shielded = shielded_evaluator
            .as_mut()
            .map(|e| e.evaluate(&empty).metrics);
        let parent = Sample {
            grid: empty,
            budget: OverhaulBudget::new(settings),
            value,
            shielded,
        };

        let mut trainer = Self {
            settings: settings.clone(),
            config: config.clone(),
            interactive: interactive.clone(),
            evaluator,
            shielded_evaluator,
            moves,
            codec,
            rng,
            net,
            stage: Stage::Train,
            fitting: false,
            pending_fit: 0,
            episode: 0,
            iteration: 0,
            converge: 0,
            samples_seen: 0,
            penalty: [1.0; CONSTRAINTS],
            has_feasible: [false; CONSTRAINTS],
            has_infeasible: [false; CONSTRAINTS],
            trajectory_buffer: Vec::new(),
            parent,
            parent_fitness: 0.0,
            local_best: 0.0,
            last_episode_best: None,
            inference_failed: false,
            best: BestTracker::new(),
            best_changed: true,
            redraw_nagle: 0,
            loss_history: Vec::new(),
            loss_changed: false,
            min_criticality: f64::from(min_criticality),
            min_heat: f64::from(min_heat),
            max_output: f64::from(max_output),
            metrics: Metrics::new(),
        };
        // the empty layout is always feasible and seeds the tracker
        let empty = trainer.parent.clone();
        trainer.consider_best(&empty);
        trainer.restart();
        let parent = trainer.parent.clone();
        trainer.consider_best(&parent);
        trainer.begin_trajectory();
        tracing::info!(
            size_x = settings.size_x,
            size_y = settings.size_y,
            size_z = settings.size_z,
            fuels = settings.fuels.len(),
            goal = ?settings.goal,
            controllable = settings.controllable,
            seed,
            "Overhaul staged trainer created"
        );
        Ok(trainer)
    }

    fn evaluate(&mut self, sample: &mut Sample) {
        sample.value = self.evaluator.evaluate(&sample.grid);
        sample.shielded = self
            .shielded_evaluator
            .as_mut()
            .map(|e| e.evaluate(&sample.grid).metrics);
        self.metrics.record_evaluation();
    }

    fn restart(&mut self) {
        let mut sample = self.parent.clone();
        sample.budget = OverhaulBudget::new(&self.settings);
        self.moves
            .randomize(&mut sample.grid, &mut sample.budget, &mut self.rng);
        self.evaluate(&mut sample);
        self.parent = sample;
    }

    fn feasibility(&self, s: &Sample) -> [bool; CONSTRAINTS] {
        [
            s.value.metrics.total_positive_net_heat == 0,
            s.shielded.is_none_or(|m| m.n_active_cells == 0),
        ]
    }

    fn is_feasible(&self, s: &Sample) -> bool {
        self.feasibility(s).iter().all(|f| *f)
    }

    fn infeasibility(&self, s: &Sample) -> [f64; CONSTRAINTS] {
        [
            s.value.metrics.total_positive_net_heat as f64 / self.min_heat,
            s.shielded.map_or(0.0, |m| f64::from(m.n_active_cells)),
        ]
    }

    /// Goal metric normalised by the fuel table.
    #[must_use]
    pub fn raw_fitness(&self, m: &OverhaulMetrics) -> f64 {
        match self.settings.goal {
            OverhaulGoal::Output => m.output / self.max_output,
            OverhaulGoal::FuelUse => m.fuel_use,
            OverhaulGoal::Efficiency => m.efficiency,
            OverhaulGoal::Irradiation => m.irradiator_flux as f64 / self.min_criticality,
        }
    }

    fn shaped_fitness(&self, s: &Sample) -> f64 {
        let m = &s.value.metrics;
        let crit = self.min_criticality;
        let mut result = self.raw_fitness(m);
        result += (m.total_raw_flux as f64).min(crit) / crit;
        result += (m.max_cell_flux as f64).min(crit) / crit;
        let infeasibility = self.infeasibility(s);
        for i in 0..CONSTRAINTS {
            result -= infeasibility[i] * self.penalty[i];
        }
        result
    }

    fn fitness(&self, s: &Sample) -> f64 {
        match self.stage {
            Stage::Inference => self.net.infer(&self.features(s)),
            Stage::Train | Stage::Rollout => self.shaped_fitness(s),
        }
    }

    /// Tile histogram over flat identifiers followed by
    /// [`STATISTICAL_FEATURES`] evaluation statistics.
    fn features(&self, s: &Sample) -> Array1<f64> {
        let volume = s.grid.volume() as f64;
        let mut f = Array1::<f64>::zeros(self.codec.n_ids + STATISTICAL_FEATURES);
        for (_, tile) in s.grid.iter() {
            f[self.codec.encode(tile) as usize] += 1.0 / volume;
        }
        let m = &s.value.metrics;
        let base = self.codec.n_ids;
        f[base] = m.output / self.max_output;
        f[base + 1] = m.efficiency;
        f[base + 2] = m.fuel_use / volume;
        f[base + 3] = m.irradiator_flux as f64 / self.min_criticality;
        f[base + 4] = f64::from(m.n_active_cells) / volume;
        f[base + 5] = m.total_positive_net_heat as f64 / self.min_heat;
        f[base + 6] = m.density;
        f[base + 7] = s.shielded.map_or(0.0, |m| f64::from(m.n_active_cells) / volume);
        f
    }

    fn consider_best(&mut self, s: &Sample) -> Improvement {
        if !self.is_feasible(s) {
            return Improvement::None;
        }
        let score = self.raw_fitness(&s.value.metrics);
        if !self.best.improves(score) {
            return Improvement::None;
        }
        let canonical = canonicalize(&s.grid, &s.value.removable);
        let metrics = self.evaluator.evaluate(&canonical).metrics;
        let codec = &self.codec;
        let design = Design::new(canonical, metrics, |t| codec.encode(t));
        self.best.offer(score, || design);
        self.best_changed = true;
        self.metrics.record_improvement();
        tracing::debug!(
            score,
            output = metrics.output,
            efficiency = metrics.efficiency,
            stage = %self.stage,
            "Overhaul best improved"
        );
        Improvement::Primary
    }

    fn begin_trajectory(&mut self) {
        self.net.new_trajectory();
        self.trajectory_buffer.clear();
        let features = self.features(&self.parent);
        self.net.append_trajectory(features);
        self.parent_fitness = self.fitness(&self.parent);
        self.local_best = if self.is_feasible(&self.parent) {
            self.parent_fitness
        } else {
            0.0
        };
        self.converge = 0;
    }

    fn begin_fit(&mut self) {
        let len = self.net.trajectory_len() as u64;
        self.net.finish_trajectory(self.local_best);
        self.trajectory_buffer.clear();
        let batch = self.config.mini_batch as u64;
        self.pending_fit = (len * self.config.epochs as u64).div_ceil(batch).max(1);
        self.fitting = true;
        self.converge = 0;
        tracing::info!(
            episode = self.episode,
            samples = len,
            pool = self.net.pool_len(),
            iterations = self.pending_fit,
            "Fitting value network"
        );
    }

    fn enter_inference(&mut self) {
        self.stage = Stage::Inference;
        self.fitting = false;
        self.iteration = 0;
        self.converge = 0;
        self.restart();
        self.parent_fitness = self.fitness(&self.parent);
        self.inference_failed = true;
        tracing::info!(episode = self.episode, stage = %self.stage, "Stage changed");
    }

    fn enter_rollout(&mut self) {
        self.stage = Stage::Rollout;
        self.iteration = 0;
        if self.inference_failed {
            self.restart();
        }
        self.begin_trajectory();
        tracing::info!(
            episode = self.episode,
            stage = %self.stage,
            inference_failed = self.inference_failed,
            "Stage changed"
        );
    }

    fn enter_train(&mut self) {
        let finished = self.local_best;
        self.net.finish_trajectory(finished);
        self.last_episode_best = Some(finished);
        self.episode += 1;
        self.stage = Stage::Train;
        self.fitting = false;
        self.iteration = 0;
        self.begin_trajectory();
        tracing::info!(
            episode = self.episode,
            local_best = finished,
            best = self.best.score().unwrap_or(0.0),
            "Episode finished"
        );
    }

    fn fit_once(&mut self) {
        if let Some(loss) = self.net.train(&mut self.rng) {
            self.loss_history.push(loss);
            self.loss_changed = true;
        }
        self.pending_fit -= 1;
    }

    fn update_penalties(&mut self) {
        for i in 0..CONSTRAINTS {
            if self.has_feasible[i] && !self.has_infeasible[i] {
                self.penalty[i] *= 0.5;
            } else if !self.has_feasible[i] && self.has_infeasible[i] {
                self.penalty[i] = (self.penalty[i] * 1.5).max(MIN_PENALTY);
            }
            self.has_feasible[i] = false;
            self.has_infeasible[i] = false;
        }
        tracing::trace!(heat = self.penalty[0], shield = self.penalty[1], "Penalties updated");
    }

    fn sample_once(&mut self) -> Improvement {
        let mut child = self.parent.clone();
        self.moves
            .mutate(&mut child.grid, &mut child.budget, &mut self.rng, |_, _| 1);
        self.evaluate(&mut child);
        let child_fitness = self.fitness(&child);
        let improvement = self.consider_best(&child);

        if child_fitness >= self.parent_fitness {
            if child_fitness > self.parent_fitness && self.stage == Stage::Inference {
                self.converge = 0;
                self.inference_failed = false;
            }
            if self.stage != Stage::Inference
                && self.rng.gen_range(0..self.config.trajectory_keep) == 0
            {
                let features = self.features(&child);
                self.trajectory_buffer.push(features);
            }
            self.parent = child;
            self.parent_fitness = child_fitness;
            self.metrics.record_accept();
        }

        if self.stage != Stage::Inference {
            let feasible = self.feasibility(&self.parent);
            if feasible.iter().all(|f| *f) && self.parent_fitness > self.local_best {
                self.local_best = self.parent_fitness;
                self.converge = 0;
                while let Some(features) = self.trajectory_buffer.pop() {
                    self.net.append_trajectory(features);
                }
            }
            for (i, ok) in feasible.iter().enumerate() {
                if *ok {
                    self.has_feasible[i] = true;
                } else {
                    self.has_infeasible[i] = true;
                }
            }
            self.samples_seen += 1;
            if self.samples_seen % self.config.penalty_update_period == 0 {
                self.update_penalties();
            }
            self.parent_fitness = self.fitness(&self.parent);
        }
        self.converge += 1;
        improvement
    }

    /// Advances by one sampling or fitting step.
    pub fn step(&mut self) -> Improvement {
        let improvement = match self.stage {
            Stage::Train if self.fitting => {
                if self.pending_fit > 0 {
                    self.fit_once();
                    Improvement::None
                } else {
                    self.enter_inference();
                    self.sample_once()
                }
            }
            Stage::Train if self.converge >= self.config.max_converge_train => {
                self.begin_fit();
                Improvement::None
            }
            Stage::Inference if self.converge >= self.config.max_converge_infer => {
                self.enter_rollout();
                self.sample_once()
            }
            Stage::Rollout if self.converge >= self.config.max_converge_rollout => {
                self.enter_train();
                self.sample_once()
            }
            _ => self.sample_once(),
        };
        self.iteration += 1;
        self.metrics
            .record_step(self.best.score().unwrap_or(f64::NEG_INFINITY));
        improvement
    }

    /// Steps in this interactive call for the current stage.
    #[must_use]
    pub fn interactive_batch(&self) -> u64 {
        let i = &self.interactive;
        match self.stage {
            Stage::Train if self.fitting => i.net_batch,
            Stage::Inference => i.net_batch * self.config.mini_batch as u64,
            _ => {
                let volume = self.parent.grid.volume() as u64;
                i.min_batch.min(i.scale.div_ceil(volume))
            }
        }
    }

    /// Runs one host-sized batch of steps.
    pub fn step_interactive(&mut self) -> Improvement {
        let mut improvement = Improvement::None;
        for _ in 0..self.interactive_batch() {
            improvement |= self.step();
            self.redraw_nagle += 1;
        }
        improvement
    }

    /// True once per redraw window after the best design changed.
    pub fn needs_redraw_best(&mut self) -> bool {
        let result = self.best_changed && self.redraw_nagle >= self.interactive.redraw_nagle;
        if result {
            self.best_changed = false;
            self.redraw_nagle = 0;
        }
        result
    }

    /// True when the loss history grew since the last call.
    pub fn needs_replot_loss(&mut self) -> bool {
        std::mem::take(&mut self.loss_changed)
    }

    #[must_use]
    pub fn loss_history(&self) -> &[f64] {
        &self.loss_history
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn episode(&self) -> u64 {
        self.episode
    }

    /// Best feasible shaped fitness reached by the last finished episode.
    #[must_use]
    pub fn last_episode_best(&self) -> Option<f64> {
        self.last_episode_best
    }

    #[must_use]
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Raw goal fitness of the held best design.
    #[must_use]
    pub fn best_score(&self) -> Option<f64> {
        self.best.score()
    }

    #[must_use]
    pub fn penalties(&self) -> [f64; CONSTRAINTS] {
        self.penalty
    }

    #[must_use]
    pub fn settings(&self) -> &OverhaulSettings {
        &self.settings
    }

    /// Current search position, for inspection.
    #[must_use]
    pub fn current(&self) -> &Grid<OverhaulTile> {
        &self.parent.grid
    }

    #[must_use]
    pub fn mirror(&self) -> &Mirror {
        self.moves.mirror()
    }
}

impl Strategy for StagedTrainer {
    type Design = OverhaulDesign;

    fn advance(&mut self) -> Improvement {
        self.step()
    }

    fn best(&self) -> Option<&Arc<OverhaulDesign>> {
        self.best.best()
    }

    fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsError;
    use fission_data::{Fuel, Symmetry};

    fn settings() -> OverhaulSettings {
        OverhaulSettings {
            size_x: 3,
            size_y: 3,
            size_z: 3,
            fuels: vec![Fuel::new(1.0, 30, 60, true), Fuel::new(0.9, 20, 40, false)],
            ..OverhaulSettings::default()
        }
    }

    fn quick() -> TrainerConfig {
        TrainerConfig {
            max_converge_train: 60,
            max_converge_infer: 60,
            max_converge_rollout: 120,
            penalty_update_period: 50,
            mini_batch: 4,
            epochs: 1,
            pool_capacity: 64,
            hidden1: 8,
            hidden2: 4,
            trajectory_keep: 2,
            ..TrainerConfig::default()
        }
    }

    #[test]
    fn test_empty_fuel_table_rejected() {
        let s = OverhaulSettings {
            fuels: Vec::new(),
            ..settings()
        };
        let err = StagedTrainer::new(&s, &quick(), &InteractiveConfig::default(), 1);
        assert!(matches!(err, Err(SettingsError::EmptyFuelList { .. })));
    }

    #[test]
    fn test_starts_in_train_with_a_best() {
        let t = StagedTrainer::new(&settings(), &quick(), &InteractiveConfig::default(), 1)
            .unwrap();
        assert_eq!(t.stage(), Stage::Train);
        assert_eq!(t.episode(), 0);
        assert!(t.best().is_some());
        assert!(t.loss_history().is_empty());
    }

    #[test]
    fn test_stage_cycle_never_skips_train() {
        let mut t = StagedTrainer::new(&settings(), &quick(), &InteractiveConfig::default(), 3)
            .unwrap();
        let mut prev = t.stage();
        let mut prev_episode = t.episode();
        let mut transitions = 0;
        for _ in 0..40_000 {
            t.step();
            let (stage, episode) = (t.stage(), t.episode());
            if stage != prev {
                transitions += 1;
                let expected = match prev {
                    Stage::Train => Stage::Inference,
                    Stage::Inference => Stage::Rollout,
                    Stage::Rollout => Stage::Train,
                };
                assert_eq!(stage, expected);
                assert_eq!(episode, prev_episode + u64::from(prev == Stage::Rollout));
            } else {
                assert_eq!(episode, prev_episode);
            }
            prev = stage;
            prev_episode = episode;
        }
        assert!(transitions >= 3);
        assert!(t.episode() >= 1);
        assert!(!t.loss_history().is_empty());
    }

    #[test]
    fn test_finished_episode_keeps_its_local_best() {
        let mut t = StagedTrainer::new(&settings(), &quick(), &InteractiveConfig::default(), 3)
            .unwrap();
        assert_eq!(t.last_episode_best(), None);
        for _ in 0..40_000 {
            let (before, episode) = (t.local_best, t.episode());
            t.step();
            if t.episode() > episode {
                assert_eq!(t.last_episode_best(), Some(before));
                return;
            }
        }
        panic!("no episode finished");
    }

    #[test]
    fn test_best_is_feasible_and_monotonic() {
        let mut t = StagedTrainer::new(&settings(), &quick(), &InteractiveConfig::default(), 5)
            .unwrap();
        let mut last = t.best_score().unwrap();
        for _ in 0..5_000 {
            let improvement = t.step();
            let now = t.best_score().unwrap();
            assert!(now >= last);
            assert_eq!(improvement.primary(), now > last);
            last = now;
        }
        let best = t.best().unwrap();
        assert_eq!(best.metrics().total_positive_net_heat, 0);
        assert!(best.metrics().efficiency >= 0.0 && best.metrics().efficiency <= 1.0);
        assert_eq!(best.data().len(), 27);
    }

    #[test]
    fn test_controllable_best_shuts_down() {
        let s = OverhaulSettings {
            controllable: true,
            ..settings()
        };
        let mut t = StagedTrainer::new(&s, &quick(), &InteractiveConfig::default(), 8).unwrap();
        for _ in 0..3_000 {
            t.step();
        }
        let best = t.best().unwrap();
        let mut shut = OverhaulEvaluator::new(&s, true);
        assert_eq!(shut.evaluate(best.grid()).metrics.n_active_cells, 0);
    }

    #[test]
    fn test_redraw_is_throttled() {
        let interactive = InteractiveConfig {
            min_batch: 16,
            redraw_nagle: 16,
            ..InteractiveConfig::default()
        };
        let mut t = StagedTrainer::new(&settings(), &quick(), &interactive, 2).unwrap();
        assert!(!t.needs_redraw_best());
        t.step_interactive();
        assert!(t.needs_redraw_best());
        assert!(!t.needs_redraw_best());
    }

    #[test]
    fn test_loss_replot_flag() {
        let mut t = StagedTrainer::new(&settings(), &quick(), &InteractiveConfig::default(), 4)
            .unwrap();
        let mut grown = false;
        for _ in 0..20_000 {
            t.step();
            if t.needs_replot_loss() {
                grown = true;
                assert!(!t.needs_replot_loss());
                break;
            }
        }
        assert!(grown);
    }

    #[test]
    fn test_symmetry_preserved() {
        let s = OverhaulSettings {
            symmetry: Symmetry::new(true, true, false),
            ..settings()
        };
        let mut t = StagedTrainer::new(&s, &quick(), &InteractiveConfig::default(), 6).unwrap();
        for _ in 0..1_000 {
            t.step();
            assert!(t.mirror().is_fixed_point(t.current()));
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = || {
            let mut t = StagedTrainer::new(&settings(), &quick(), &InteractiveConfig::default(), 11)
                .unwrap();
            for _ in 0..3_000 {
                t.step();
            }
            (t.best_score(), t.loss_history().to_vec(), t.stage(), t.iteration())
        };
        assert_eq!(run(), run());
    }
}
