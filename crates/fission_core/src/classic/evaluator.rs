use fission_data::{ClassicGoal, ClassicSettings, ClassicTile, Coord, Cooler};

use crate::grid::{Grid, DIRECTIONS};

/// Longest moderator line that still links two cells.
pub const NEUTRON_REACH: usize = 4;
/// Power added by a moderator, per adjacent cell multiplier, over six faces.
pub const MODERATOR_POWER: f64 = 1.0;
/// Heat added by a moderator, per adjacent cell multiplier, over six faces.
pub const MODERATOR_HEAT: f64 = 2.0;

/// Scalar outcome of a classic layout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClassicMetrics {
    pub power_mult: f64,
    pub heat_mult: f64,
    pub cooling: f64,
    /// Number of cells.
    pub breed: u32,
    pub heat: f64,
    pub net_heat: f64,
    pub duty_cycle: f64,
    pub avg_mult: f64,
    pub power: f64,
    /// Power scaled by the duty cycle.
    pub effective_power: f64,
    pub avg_breed: f64,
    pub efficiency: f64,
}

impl ClassicMetrics {
    fn finish(&mut self, settings: &ClassicSettings) {
        self.heat = settings.fuel_base_heat * self.heat_mult;
        self.net_heat = self.heat - self.cooling;
        self.duty_cycle = if self.heat <= 0.0 || self.net_heat <= 0.0 {
            1.0
        } else {
            (self.cooling / self.heat).clamp(0.0, 1.0)
        };
        self.avg_mult = self.power_mult * self.duty_cycle;
        self.power = self.power_mult * settings.fuel_base_power;
        self.effective_power = self.power * self.duty_cycle;
        self.avg_breed = f64::from(self.breed) * self.duty_cycle;
        self.efficiency = if self.breed > 0 {
            self.power_mult / f64::from(self.breed)
        } else {
            1.0
        };
    }

    /// Objective value of these metrics under `goal`.
    #[must_use]
    pub fn fitness(&self, goal: ClassicGoal, fuel_base_heat: f64) -> f64 {
        match goal {
            ClassicGoal::Power => self.avg_mult,
            ClassicGoal::Breeder => {
                let spare = if self.net_heat < 0.0 {
                    -self.net_heat / (fuel_base_heat - self.net_heat)
                } else {
                    0.0
                };
                self.avg_breed + spare
            }
            ClassicGoal::Efficiency => (self.efficiency - 1.0) * self.duty_cycle,
        }
    }

    #[must_use]
    pub fn is_heat_neutral(&self) -> bool {
        self.net_heat <= 0.0
    }
}

/// Metrics plus the tiles that do nothing in this layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassicEvaluation {
    pub metrics: ClassicMetrics,
    pub invalid: Vec<Coord>,
}

/// Reachability of an active cooler from the casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Unknown,
    Reachable,
    Sealed,
}

fn cooler_kind(tile: ClassicTile) -> Option<Cooler> {
    match tile {
        ClassicTile::Passive(c) | ClassicTile::Active(c) => Some(c),
        _ => None,
    }
}

/// Reusable scratch space for scoring classic layouts.
#[derive(Debug, Clone)]
pub struct ClassicEvaluator {
    settings: ClassicSettings,
    mults: Grid<u32>,
    rules: Grid<Option<Cooler>>,
    active: Grid<bool>,
    in_line: Grid<bool>,
    access: Grid<Access>,
    seen: Grid<u32>,
    stamp: u32,
    queue: Vec<Coord>,
    component: Vec<Coord>,
}

impl ClassicEvaluator {
    /// `settings` must already be validated.
    #[must_use]
    pub fn new(settings: &ClassicSettings) -> Self {
        let dims = (
            settings.size_x as usize,
            settings.size_y as usize,
            settings.size_z as usize,
        );
        Self {
            settings: settings.clone(),
            mults: Grid::filled(dims, 0),
            rules: Grid::filled(dims, None),
            active: Grid::filled(dims, false),
            in_line: Grid::filled(dims, false),
            access: Grid::filled(dims, Access::Unknown),
            seen: Grid::filled(dims, 0),
            stamp: 0,
            queue: Vec::new(),
            component: Vec::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &ClassicSettings {
        &self.settings
    }

    /// True when the moderator line from `c` along `dir` ends in a cell
    /// within reach; marks the moderators of that line.
    fn count_line(&mut self, grid: &Grid<ClassicTile>, c: Coord, dir: usize) -> bool {
        let mut line = Vec::with_capacity(NEUTRON_REACH);
        let mut at = c;
        for _ in 0..=NEUTRON_REACH {
            let Some(next) = grid.neighbor(at, dir) else {
                return false;
            };
            match grid.get(next) {
                ClassicTile::Cell => {
                    for m in line {
                        self.in_line.set(m, true);
                    }
                    return true;
                }
                ClassicTile::Moderator => line.push(next),
                _ => return false,
            }
            at = next;
        }
        false
    }

    fn count_cells(grid: &Grid<ClassicTile>, c: Coord) -> usize {
        (0..6)
            .filter_map(|d| grid.neighbor(c, d))
            .filter(|&n| grid.get(n) == ClassicTile::Cell)
            .count()
    }

    fn is_active_moderator(&self, grid: &Grid<ClassicTile>, n: Coord) -> bool {
        grid.get(n) == ClassicTile::Moderator && self.active.get(n)
    }

    fn count_active_moderators(&self, grid: &Grid<ClassicTile>, c: Coord) -> usize {
        (0..6)
            .filter_map(|d| grid.neighbor(c, d))
            .filter(|&n| self.is_active_moderator(grid, n))
            .count()
    }

    fn is_active_cooler(&self, grid: &Grid<ClassicTile>, n: Option<Coord>, kind: Cooler) -> bool {
        n.is_some_and(|n| self.active.get(n) && cooler_kind(grid.get(n)) == Some(kind))
    }

    fn count_active_coolers(&self, grid: &Grid<ClassicTile>, c: Coord, kind: Cooler) -> usize {
        (0..6)
            .filter(|&d| self.is_active_cooler(grid, grid.neighbor(c, d), kind))
            .count()
    }

    fn is_corner(&self, grid: &Grid<ClassicTile>, c: Coord) -> bool {
        let (sx, sy, sz) = grid.dims();
        grid.casing_faces(c) == 3
            && (c.0 == 0 || c.0 == sx - 1)
            && (c.1 == 0 || c.1 == sy - 1)
            && (c.2 == 0 || c.2 == sz - 1)
    }

    /// An active cooler may only touch active coolers of its own kind and
    /// must reach the casing through air or its own kind.
    fn check_access(&mut self, grid: &Grid<ClassicTile>, c: Coord, kind: Cooler) -> bool {
        let compatible = (0..6).filter_map(|d| grid.neighbor(c, d)).all(|n| match grid.get(n) {
            ClassicTile::Active(other) => other == kind,
            _ => true,
        });
        if !compatible {
            return false;
        }
        match self.access.get(c) {
            Access::Reachable => return true,
            Access::Sealed => return false,
            Access::Unknown => {}
        }
        self.stamp += 1;
        self.queue.clear();
        self.component.clear();
        self.queue.push(c);
        self.seen.set(c, self.stamp);
        let mut reachable = false;
        while let Some(at) = self.queue.pop() {
            if grid.get(at) == ClassicTile::Active(kind) {
                self.component.push(at);
            }
            for d in 0..6 {
                let Some(n) = grid.neighbor(at, d) else {
                    reachable = true;
                    continue;
                };
                if self.seen.get(n) == self.stamp {
                    continue;
                }
                let tile = grid.get(n);
                if tile == ClassicTile::Air || tile == ClassicTile::Active(kind) {
                    self.seen.set(n, self.stamp);
                    self.queue.push(n);
                }
            }
            if reachable {
                break;
            }
        }
        let verdict = if reachable {
            Access::Reachable
        } else {
            Access::Sealed
        };
        for &m in &self.component {
            self.access.set(m, verdict);
        }
        reachable
    }

    /// Scores `grid`; tiles that contribute nothing are listed in `invalid`.
    pub fn evaluate(&mut self, grid: &Grid<ClassicTile>) -> ClassicEvaluation {
        let mut m = ClassicMetrics::default();
        let mut invalid = Vec::new();
        self.active.fill(false);
        self.in_line.fill(false);
        self.access.fill(Access::Unknown);
        let coords: Vec<Coord> = grid.iter().map(|(c, _)| c).collect();

        for &c in &coords {
            let tile = grid.get(c);
            self.mults.set(c, 0);
            self.rules.set(c, None);
            match tile {
                ClassicTile::Cell => {
                    let lines = (0..DIRECTIONS.len())
                        .filter(|&d| self.count_line(grid, c, d))
                        .count() as u32;
                    let mult = 1 + lines;
                    self.mults.set(c, mult);
                    m.breed += 1;
                    m.power_mult += f64::from(mult);
                    m.heat_mult += f64::from(mult * (mult + 1)) / 2.0;
                }
                ClassicTile::Passive(kind) => self.rules.set(c, Some(kind)),
                ClassicTile::Active(kind) => {
                    let ok = !self.settings.ensure_active_cooler_accessible
                        || self.check_access(grid, c, kind);
                    self.rules.set(c, ok.then_some(kind));
                }
                ClassicTile::Moderator | ClassicTile::Air => {}
            }
        }

        for &c in &coords {
            if grid.get(c) == ClassicTile::Moderator {
                let mult: u32 = (0..6)
                    .filter_map(|d| grid.neighbor(c, d))
                    .map(|n| self.mults.get(n))
                    .sum();
                if mult > 0 {
                    self.active.set(c, true);
                    m.power_mult += f64::from(mult) * (MODERATOR_POWER / 6.0);
                    m.heat_mult += f64::from(mult) * (MODERATOR_HEAT / 6.0);
                } else if !self.in_line.get(c) {
                    invalid.push(c);
                }
                continue;
            }
            let on = match self.rules.get(c) {
                Some(Cooler::Redstone) => Self::count_cells(grid, c) > 0,
                Some(Cooler::Lapis) => Self::count_cells(grid, c) > 0 && grid.casing_faces(c) > 0,
                Some(Cooler::Enderium) => self.is_corner(grid, c),
                Some(Cooler::Cryotheum) => Self::count_cells(grid, c) >= 2,
                _ => continue,
            };
            self.active.set(c, on);
        }

        for &c in &coords {
            let on = match self.rules.get(c) {
                Some(Cooler::Water) => {
                    Self::count_cells(grid, c) > 0 || self.count_active_moderators(grid, c) > 0
                }
                Some(Cooler::Quartz) => self.count_active_moderators(grid, c) > 0,
                Some(Cooler::Glowstone) => self.count_active_moderators(grid, c) >= 2,
                Some(Cooler::Helium) => {
                    self.count_active_coolers(grid, c, Cooler::Redstone) == 1
                        && grid.casing_faces(c) > 0
                }
                Some(Cooler::Emerald) => {
                    self.count_active_moderators(grid, c) > 0 && Self::count_cells(grid, c) > 0
                }
                Some(Cooler::Tin) => (0..3).any(|axis| {
                    self.is_active_cooler(grid, grid.neighbor(c, 2 * axis), Cooler::Lapis)
                        && self.is_active_cooler(grid, grid.neighbor(c, 2 * axis + 1), Cooler::Lapis)
                }),
                Some(Cooler::Magnesium) => {
                    self.count_active_moderators(grid, c) > 0 && grid.casing_faces(c) > 0
                }
                _ => continue,
            };
            self.active.set(c, on);
        }

        for &c in &coords {
            let on = match self.rules.get(c) {
                Some(Cooler::Gold) => {
                    self.count_active_coolers(grid, c, Cooler::Water) > 0
                        && self.count_active_coolers(grid, c, Cooler::Redstone) > 0
                }
                Some(Cooler::Diamond) => {
                    self.count_active_coolers(grid, c, Cooler::Water) > 0
                        && self.count_active_coolers(grid, c, Cooler::Quartz) > 0
                }
                Some(Cooler::Copper) => self.count_active_coolers(grid, c, Cooler::Glowstone) > 0,
                _ => continue,
            };
            self.active.set(c, on);
        }

        for &c in &coords {
            let tile = grid.get(c);
            let Some(kind) = cooler_kind(tile) else {
                continue;
            };
            if self.rules.get(c) == Some(Cooler::Iron) {
                let on = self.count_active_coolers(grid, c, Cooler::Gold) > 0;
                self.active.set(c, on);
            }
            if self.active.get(c) {
                let is_active_variant = matches!(tile, ClassicTile::Active(_));
                m.cooling += self.settings.cooling_rates.get(kind, is_active_variant);
            } else {
                invalid.push(c);
            }
        }

        m.finish(&self.settings);
        ClassicEvaluation {
            metrics: m,
            invalid,
        }
    }
}

/// Copy of `grid` with every listed tile replaced by air.
#[must_use]
pub fn canonicalize(grid: &Grid<ClassicTile>, invalid: &[Coord]) -> Grid<ClassicTile> {
    let mut out = grid.clone();
    for &c in invalid {
        out.set(c, ClassicTile::Air);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(dims: (i32, i32, i32)) -> ClassicSettings {
        ClassicSettings {
            size_x: dims.0,
            size_y: dims.1,
            size_z: dims.2,
            ..ClassicSettings::default()
        }
    }

    fn grid(dims: (i32, i32, i32)) -> Grid<ClassicTile> {
        Grid::filled(
            (dims.0 as usize, dims.1 as usize, dims.2 as usize),
            ClassicTile::Air,
        )
    }

    #[test]
    fn test_empty_reactor() {
        let s = settings((3, 3, 3));
        let mut eval = ClassicEvaluator::new(&s);
        let out = eval.evaluate(&grid((3, 3, 3)));
        assert_eq!(out.metrics.breed, 0);
        assert_eq!(out.metrics.power, 0.0);
        assert_eq!(out.metrics.duty_cycle, 1.0);
        assert_eq!(out.metrics.efficiency, 1.0);
        assert!(out.invalid.is_empty());
    }

    #[test]
    fn test_single_cell_heat_and_duty() {
        let s = settings((1, 1, 1));
        let mut eval = ClassicEvaluator::new(&s);
        let mut g = grid((1, 1, 1));
        g.set((0, 0, 0), ClassicTile::Cell);
        let m = eval.evaluate(&g).metrics;
        assert_eq!(m.breed, 1);
        assert_eq!(m.power_mult, 1.0);
        assert_eq!(m.heat_mult, 1.0);
        assert!((m.heat - s.fuel_base_heat).abs() < 1e-9);
        assert_eq!(m.cooling, 0.0);
        assert!(m.net_heat > 0.0);
        assert_eq!(m.duty_cycle, 0.0);
        assert_eq!(m.effective_power, 0.0);
    }

    #[test]
    fn test_moderator_line_links_cells() {
        let s = settings((1, 1, 4));
        let mut eval = ClassicEvaluator::new(&s);
        let mut g = grid((1, 1, 4));
        g.set((0, 0, 0), ClassicTile::Cell);
        g.set((0, 0, 1), ClassicTile::Moderator);
        g.set((0, 0, 2), ClassicTile::Moderator);
        g.set((0, 0, 3), ClassicTile::Cell);
        let out = eval.evaluate(&g);
        // each cell has multiplier 2, each moderator touches one cell
        assert_eq!(out.metrics.breed, 2);
        assert!((out.metrics.power_mult - (4.0 + 2.0 * 2.0 / 6.0)).abs() < 1e-9);
        assert!((out.metrics.heat_mult - (6.0 + 2.0 * 2.0 * 2.0 / 6.0)).abs() < 1e-9);
        assert!(out.invalid.is_empty());
    }

    #[test]
    fn test_lonely_moderator_is_invalid() {
        let s = settings((1, 1, 3));
        let mut eval = ClassicEvaluator::new(&s);
        let mut g = grid((1, 1, 3));
        g.set((0, 0, 0), ClassicTile::Moderator);
        let out = eval.evaluate(&g);
        assert_eq!(out.invalid, vec![(0, 0, 0)]);
    }

    #[test]
    fn test_cooler_tiers() {
        let s = settings((1, 1, 4));
        let mut eval = ClassicEvaluator::new(&s);
        let mut g = grid((1, 1, 4));
        g.set((0, 0, 0), ClassicTile::Cell);
        g.set((0, 0, 1), ClassicTile::Passive(Cooler::Water));
        g.set((0, 0, 2), ClassicTile::Passive(Cooler::Gold));
        g.set((0, 0, 3), ClassicTile::Passive(Cooler::Redstone));
        let out = eval.evaluate(&g);
        // redstone has no adjacent cell so gold is missing its redstone
        assert_eq!(out.invalid.len(), 2);
        assert!((out.metrics.cooling - s.cooling_rates.passive[Cooler::Water.index()]).abs() < 1e-9);
    }

    #[test]
    fn test_sealed_active_cooler_is_invalid() {
        let mut s = settings((3, 3, 3));
        s.ensure_active_cooler_accessible = true;
        let mut eval = ClassicEvaluator::new(&s);
        let mut g = Grid::filled((3, 3, 3), ClassicTile::Cell);
        g.set((1, 1, 1), ClassicTile::Active(Cooler::Redstone));
        let out = eval.evaluate(&g);
        assert!(out.invalid.contains(&(1, 1, 1)));

        s.ensure_active_cooler_accessible = false;
        let mut eval = ClassicEvaluator::new(&s);
        let out = eval.evaluate(&g);
        assert!(!out.invalid.contains(&(1, 1, 1)));
        assert!(out.metrics.cooling >= s.cooling_rates.active[Cooler::Redstone.index()]);
    }

    #[test]
    fn test_active_cooler_reaches_casing_through_air() {
        let mut s = settings((3, 3, 3));
        s.ensure_active_cooler_accessible = true;
        let mut eval = ClassicEvaluator::new(&s);
        let mut g = Grid::filled((3, 3, 3), ClassicTile::Cell);
        g.set((1, 1, 1), ClassicTile::Active(Cooler::Redstone));
        g.set((1, 1, 0), ClassicTile::Air);
        let out = eval.evaluate(&g);
        assert!(!out.invalid.contains(&(1, 1, 1)));
    }

    #[test]
    fn test_fitness_goals() {
        let m = ClassicMetrics {
            avg_mult: 3.0,
            avg_breed: 2.0,
            net_heat: -10.0,
            efficiency: 1.5,
            duty_cycle: 1.0,
            ..ClassicMetrics::default()
        };
        assert_eq!(m.fitness(ClassicGoal::Power, 10.0), 3.0);
        assert!((m.fitness(ClassicGoal::Breeder, 10.0) - 2.5).abs() < 1e-9);
        assert!((m.fitness(ClassicGoal::Efficiency, 10.0) - 0.5).abs() < 1e-9);
    }

    mod props {
        use super::*;
        use crate::budget::ClassicBudget;
        use crate::grid::Mirror;
        use crate::search::MoveGenerator;
        use fission_data::Symmetry;
        use proptest::prelude::*;
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(48))]

            #[test]
            fn test_random_layout_metrics_bounded(
                x in 1i32..6,
                y in 1i32..6,
                z in 1i32..6,
                seed in any::<u64>()
            ) {
                let s = settings((x, y, z));
                let dims = (x as usize, y as usize, z as usize);
                let mut moves = MoveGenerator::new(
                    Mirror::new(dims, Symmetry::none()),
                    ClassicTile::placeable(),
                    ClassicTile::Air,
                );
                let mut g = grid((x, y, z));
                let mut budget = ClassicBudget::new(&s);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                moves.randomize(&mut g, &mut budget, &mut rng);

                let m = ClassicEvaluator::new(&s).evaluate(&g).metrics;
                prop_assert!((0.0..=1.0).contains(&m.duty_cycle));
                prop_assert!(m.power >= 0.0 && m.power.is_finite());
                prop_assert!(m.cooling >= 0.0);
                prop_assert_eq!(m.breed as usize, g.count(|t| t == ClassicTile::Cell));
                prop_assert!(m.effective_power <= m.power + 1e-9);
            }
        }
    }
}
