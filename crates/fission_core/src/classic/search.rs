use std::sync::Arc;

use fission_data::{ClassicSettings, ClassicTile, Coord};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::evaluator::{canonicalize, ClassicEvaluation, ClassicEvaluator};
use crate::budget::{debit_grid, ClassicBudget};
use crate::config::AnnealingConfig;
use crate::design::{ClassicDesign, Design};
use crate::grid::{Grid, Mirror};
use crate::metrics::Metrics;
use crate::search::{Improvement, MoveGenerator, Strategy};
use crate::settings::{self, Validate};
use crate::tracker::BestTracker;

/// Pressure applied by the annealer between two reheats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unconstrained,
    /// Positive net heat is penalised.
    HeatNeutral,
}

impl Phase {
    fn index(self) -> usize {
        match self {
            Phase::Unconstrained => 0,
            Phase::HeatNeutral => 1,
        }
    }

    fn toggled(self) -> Self {
        match self {
            Phase::Unconstrained => Phase::HeatNeutral,
            Phase::HeatNeutral => Phase::Unconstrained,
        }
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    grid: Grid<ClassicTile>,
    budget: ClassicBudget,
    eval: ClassicEvaluation,
    fitness: f64,
}

/// Simulated annealing over classic layouts.
///
/// Tracks two optima: the best goal fitness overall, and the best goal
/// fitness among heat-neutral layouts.
pub struct LocalSearch {
    settings: ClassicSettings,
    config: AnnealingConfig,
    evaluator: ClassicEvaluator,
    moves: MoveGenerator<ClassicTile>,
    rng: ChaCha8Rng,
    parent: Candidate,
    parent_score: f64,
    temperature: f64,
    phase: Phase,
    phase_best: [Option<(Grid<ClassicTile>, f64)>; 2],
    stagnation: u64,
    best: BestTracker<ClassicDesign>,
    best_no_net_heat: BestTracker<ClassicDesign>,
    metrics: Metrics,
}

impl LocalSearch {
    /// Validates `settings` and seeds the first layout.
    pub fn new(
        settings: &ClassicSettings,
        config: &AnnealingConfig,
        seed: u64,
    ) -> settings::Result<Self> {
        settings.validate()?;
        let dims = (
            settings.size_x as usize,
            settings.size_y as usize,
            settings.size_z as usize,
        );
        let mirror = Mirror::new(dims, settings.symmetry);
        let mut moves = MoveGenerator::new(mirror, ClassicTile::placeable(), ClassicTile::Air);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut evaluator = ClassicEvaluator::new(settings);
        let mut grid = Grid::filled(dims, ClassicTile::Air);
        let mut budget = ClassicBudget::new(settings);
        moves.randomize(&mut grid, &mut budget, &mut rng);
        let eval = evaluator.evaluate(&grid);
        let fitness = eval.metrics.fitness(settings.goal, settings.fuel_base_heat);
        let parent = Candidate {
            grid,
            budget,
            eval,
            fitness,
        };

        let mut search = Self {
            settings: settings.clone(),
            config: config.clone(),
            evaluator,
            moves,
            rng,
            parent_score: 0.0,
            parent,
            temperature: config.initial_temperature,
            phase: Phase::Unconstrained,
            phase_best: [None, None],
            stagnation: 0,
            best: BestTracker::new(),
            best_no_net_heat: BestTracker::new(),
            metrics: Metrics::new(),
        };
        search.parent_score = search.score(&search.parent);
        let parent = search.parent.clone();
        search.offer(&parent);
        search.phase_best[0] = Some((parent.grid, search.parent_score));
        tracing::info!(
            size_x = settings.size_x,
            size_y = settings.size_y,
            size_z = settings.size_z,
            goal = ?settings.goal,
            seed,
            "Classic local search created"
        );
        Ok(search)
    }

    fn score(&self, c: &Candidate) -> f64 {
        match self.phase {
            Phase::Unconstrained => c.fitness,
            Phase::HeatNeutral => {
                let excess = c.eval.metrics.net_heat.max(0.0) / self.settings.fuel_base_heat;
                c.fitness - self.config.heat_penalty * excess
            }
        }
    }

    fn snapshot(&mut self, grid: &Grid<ClassicTile>, invalid: &[Coord]) -> ClassicDesign {
        let canonical = canonicalize(grid, invalid);
        let metrics = self.evaluator.evaluate(&canonical).metrics;
        Design::new(canonical, metrics, ClassicTile::id)
    }

    fn offer(&mut self, c: &Candidate) -> Improvement {
        let mut primary = false;
        let mut secondary = false;
        if self.best.improves(c.fitness) {
            let design = self.snapshot(&c.grid, &c.eval.invalid);
            primary = self.best.offer(c.fitness, || design);
        }
        if c.eval.metrics.is_heat_neutral() && self.best_no_net_heat.improves(c.fitness) {
            let design = self.snapshot(&c.grid, &c.eval.invalid);
            secondary = self.best_no_net_heat.offer(c.fitness, || design);
        }
        if primary || secondary {
            self.metrics.record_improvement();
            tracing::debug!(
                fitness = c.fitness,
                net_heat = c.eval.metrics.net_heat,
                primary,
                secondary,
                "Classic best improved"
            );
        }
        Improvement::from_flags(primary, secondary)
    }

    fn reheat(&mut self) {
        self.phase = self.phase.toggled();
        self.temperature = self.config.initial_temperature;
        self.stagnation = 0;
        let mut budget = ClassicBudget::new(&self.settings);
        let grid = match &self.phase_best[self.phase.index()] {
            Some((grid, _)) => {
                debit_grid(&mut budget, grid);
                grid.clone()
            }
            None => {
                let mut grid = self.parent.grid.clone();
                self.moves.randomize(&mut grid, &mut budget, &mut self.rng);
                grid
            }
        };
        let eval = self.evaluator.evaluate(&grid);
        self.metrics.record_evaluation();
        let fitness = eval
            .metrics
            .fitness(self.settings.goal, self.settings.fuel_base_heat);
        self.parent = Candidate {
            grid,
            budget,
            eval,
            fitness,
        };
        self.parent_score = self.score(&self.parent);
        let phase = self.phase.index();
        if self.phase_best[phase].is_none() {
            self.phase_best[phase] = Some((self.parent.grid.clone(), self.parent_score));
        }
        tracing::debug!(phase = ?self.phase, score = self.parent_score, "Annealer reheated");
    }

    /// One mutate-evaluate-accept step.
    pub fn step(&mut self) -> Improvement {
        let mut child = self.parent.clone();
        self.moves.mutate(
            &mut child.grid,
            &mut child.budget,
            &mut self.rng,
            |tile, (x, y, z)| {
                // extra weight for cells on odd parity sites keeps cell
                // patterns from shearing
                if tile == ClassicTile::Cell && (x + y + z) % 2 == 1 {
                    2
                } else {
                    1
                }
            },
        );
        child.eval = self.evaluator.evaluate(&child.grid);
        self.metrics.record_evaluation();
        child.fitness = child
            .eval
            .metrics
            .fitness(self.settings.goal, self.settings.fuel_base_heat);
        let improvement = self.offer(&child);

        let child_score = self.score(&child);
        let delta = child_score - self.parent_score;
        let accept = delta >= 0.0 || self.rng.gen::<f64>() < (delta / self.temperature).exp();

        let phase = self.phase.index();
        let phase_improved = self.phase_best[phase]
            .as_ref()
            .is_none_or(|(_, best)| child_score > *best);
        if phase_improved {
            self.phase_best[phase] = Some((child.grid.clone(), child_score));
            self.stagnation = 0;
        } else {
            self.stagnation += 1;
        }
        if accept {
            self.parent = child;
            self.parent_score = child_score;
            self.metrics.record_accept();
        }

        self.temperature =
            (self.temperature * self.config.cooling_rate).max(self.config.min_temperature);
        if self.stagnation >= self.config.max_stagnation {
            self.reheat();
        }
        self.metrics
            .record_step(self.best.score().unwrap_or(f64::NEG_INFINITY));
        improvement
    }

    #[must_use]
    pub fn best_no_net_heat(&self) -> Option<&Arc<ClassicDesign>> {
        self.best_no_net_heat.best()
    }

    #[must_use]
    pub fn best_score(&self) -> Option<f64> {
        self.best.score()
    }

    #[must_use]
    pub fn best_no_net_heat_score(&self) -> Option<f64> {
        self.best_no_net_heat.score()
    }

    #[must_use]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn settings(&self) -> &ClassicSettings {
        &self.settings
    }

    /// Current search position, for inspection.
    #[must_use]
    pub fn current(&self) -> &Grid<ClassicTile> {
        &self.parent.grid
    }

    #[must_use]
    pub fn mirror(&self) -> &Mirror {
        self.moves.mirror()
    }
}

impl Strategy for LocalSearch {
    type Design = ClassicDesign;

    fn advance(&mut self) -> Improvement {
        self.step()
    }

    fn best(&self) -> Option<&Arc<ClassicDesign>> {
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
    use fission_data::Symmetry;

    fn small() -> ClassicSettings {
        ClassicSettings {
            size_x: 3,
            size_y: 3,
            size_z: 3,
            ..ClassicSettings::default()
        }
    }

    #[test]
    fn test_zero_size_rejected() {
        let settings = ClassicSettings {
            size_x: 0,
            ..small()
        };
        let err = LocalSearch::new(&settings, &AnnealingConfig::default(), 1).err();
        match err {
            Some(SettingsError::NonPositive { field, .. }) => assert_eq!(field, "size_x"),
            other => panic!("expected a size error, got {other:?}"),
        }
    }

    #[test]
    fn test_initial_best_present() {
        let search = LocalSearch::new(&small(), &AnnealingConfig::default(), 1).unwrap();
        assert!(search.best().is_some());
        assert_eq!(search.steps(), 0);
    }

    #[test]
    fn test_best_never_decreases() {
        let mut search = LocalSearch::new(&small(), &AnnealingConfig::default(), 2).unwrap();
        let mut last = search.best_score().unwrap();
        let mut last_neutral = search.best_no_net_heat_score();
        for _ in 0..3000 {
            let improvement = search.step();
            let now = search.best_score().unwrap();
            assert!(now >= last);
            assert_eq!(improvement.primary(), now > last);
            last = now;
            let neutral = search.best_no_net_heat_score();
            if let (Some(a), Some(b)) = (last_neutral, neutral) {
                assert!(b >= a);
            }
            last_neutral = neutral;
        }
        assert_eq!(search.steps(), 3000);
    }

    #[test]
    fn test_neutral_snapshot_has_no_net_heat() {
        let mut search = LocalSearch::new(&small(), &AnnealingConfig::default(), 5).unwrap();
        for _ in 0..5000 {
            search.step();
        }
        if let Some(design) = search.best_no_net_heat() {
            assert!(design.metrics().net_heat <= 0.0);
            assert_eq!(design.metrics().duty_cycle, 1.0);
        }
    }

    #[test]
    fn test_reheat_toggles_phase() {
        let config = AnnealingConfig {
            max_stagnation: 10,
            ..AnnealingConfig::default()
        };
        let mut search = LocalSearch::new(&small(), &config, 9).unwrap();
        let mut seen_neutral = false;
        for _ in 0..2000 {
            search.step();
            seen_neutral |= search.phase() == Phase::HeatNeutral;
        }
        assert!(seen_neutral);
    }

    #[test]
    fn test_symmetric_search_stays_symmetric() {
        let settings = ClassicSettings {
            symmetry: Symmetry::new(true, true, true),
            ..small()
        };
        let mut search = LocalSearch::new(&settings, &AnnealingConfig::default(), 4).unwrap();
        for _ in 0..500 {
            search.step();
            assert!(search.mirror().is_fixed_point(search.current()));
        }
    }
}
