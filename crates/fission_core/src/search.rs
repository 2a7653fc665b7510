//! Pieces shared by both search strategies: the step result, stage ids,
//! the strategy trait and the symmetric move generator.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

use fission_data::Coord;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::budget::Budget;
use crate::grid::{Grid, Mirror};
use crate::metrics::Metrics;

/// Which tracked optima improved during a step or batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Improvement {
    #[default]
    None,
    Primary,
    Secondary,
    Both,
}

impl Improvement {
    #[must_use]
    pub const fn from_flags(primary: bool, secondary: bool) -> Self {
        match (primary, secondary) {
            (false, false) => Improvement::None,
            (true, false) => Improvement::Primary,
            (false, true) => Improvement::Secondary,
            (true, true) => Improvement::Both,
        }
    }

    #[must_use]
    pub const fn primary(self) -> bool {
        matches!(self, Improvement::Primary | Improvement::Both)
    }

    #[must_use]
    pub const fn secondary(self) -> bool {
        matches!(self, Improvement::Secondary | Improvement::Both)
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Improvement::None)
    }

    /// Bit 0 for the primary optimum, bit 1 for the secondary one.
    #[must_use]
    pub const fn bits(self) -> u32 {
        (self.primary() as u32) | ((self.secondary() as u32) << 1)
    }
}

impl BitOr for Improvement {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self::from_flags(
            self.primary() || rhs.primary(),
            self.secondary() || rhs.secondary(),
        )
    }
}

impl BitOrAssign for Improvement {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

/// Phase of the staged trainer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Train,
    Inference,
    Rollout,
}

impl Stage {
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Stage::Train => 0,
            Stage::Inference => 1,
            Stage::Rollout => 2,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Train => "train",
            Stage::Inference => "inference",
            Stage::Rollout => "rollout",
        };
        f.write_str(name)
    }
}

/// A steppable optimizer.
pub trait Strategy {
    type Design;

    /// Runs one bounded unit of work.
    fn advance(&mut self) -> Improvement;

    /// Best snapshot under the primary objective.
    fn best(&self) -> Option<&Arc<Self::Design>>;

    fn metrics(&self) -> &Metrics;

    fn steps(&self) -> u64 {
        self.metrics().steps()
    }
}

/// Proposes symmetric single-orbit edits that respect a budget.
#[derive(Debug, Clone)]
pub struct MoveGenerator<T> {
    mirror: Mirror,
    coords: Vec<Coord>,
    palette: Vec<T>,
    air: T,
    scratch: Vec<T>,
}

impl<T: Copy + PartialEq> MoveGenerator<T> {
    /// `palette` lists every placeable tile except `air`.
    pub fn new(mirror: Mirror, palette: Vec<T>, air: T) -> Self {
        Self {
            coords: mirror.representatives(),
            mirror,
            palette,
            air,
            scratch: Vec::new(),
        }
    }

    #[must_use]
    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    /// Replaces the tile orbit at a random representative with a random
    /// allowed tile (air included) and returns the representative.
    ///
    /// `weight` returns how many times a tile is entered into the draw.
    pub fn mutate<B: Budget<T>, R: Rng>(
        &mut self,
        grid: &mut Grid<T>,
        budget: &mut B,
        rng: &mut R,
        weight: impl Fn(T, Coord) -> usize,
    ) -> Coord {
        let c = self.coords[rng.gen_range(0..self.coords.len())];
        let n = self.mirror.n_sym(c);
        budget.release(grid.get(c), n);
        self.scratch.clear();
        self.scratch.push(self.air);
        for &tile in &self.palette {
            if budget.allows(tile, n) {
                for _ in 0..weight(tile, c) {
                    self.scratch.push(tile);
                }
            }
        }
        let tile = self.scratch[rng.gen_range(0..self.scratch.len())];
        budget.take(tile, n);
        self.mirror.set_mirrored(grid, c, tile);
        c
    }

    /// Clears `grid` to air and fills orbits in random order with random
    /// allowed non-air tiles until nothing fits.
    pub fn randomize<B: Budget<T>, R: Rng>(
        &mut self,
        grid: &mut Grid<T>,
        budget: &mut B,
        rng: &mut R,
    ) {
        grid.fill(self.air);
        let mut order = self.coords.clone();
        order.shuffle(rng);
        for c in order {
            let n = self.mirror.n_sym(c);
            self.scratch.clear();
            self.scratch
                .extend(self.palette.iter().copied().filter(|t| budget.allows(*t, n)));
            if self.scratch.is_empty() {
                break;
            }
            let tile = self.scratch[rng.gen_range(0..self.scratch.len())];
            budget.take(tile, n);
            self.mirror.set_mirrored(grid, c, tile);
        }
    }
}
