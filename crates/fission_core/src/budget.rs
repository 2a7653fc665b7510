//! Remaining placement allowances.
//!
//! A budget starts from the settings limits and is debited by every tile
//! on the grid, so the move generator can only propose tiles that still
//! fit. Air is always free.

use fission_data::{ClassicSettings, ClassicTile, OverhaulSettings, OverhaulTile};

use crate::grid::Grid;

/// Remaining count of one limited resource; `None` is unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Allowance(Option<u32>);

impl Allowance {
    fn from_limit(limit: i32) -> Self {
        Self(u32::try_from(limit).ok())
    }

    fn allows(self, n: usize) -> bool {
        self.0.is_none_or(|left| left as usize >= n)
    }

    fn take(&mut self, n: usize) {
        if let Some(left) = self.0.as_mut() {
            *left = left.saturating_sub(n as u32);
        }
    }

    fn release(&mut self, n: usize) {
        if let Some(left) = self.0.as_mut() {
            *left += n as u32;
        }
    }
}

/// Placement accounting for one tile vocabulary.
pub trait Budget<T> {
    /// True when `n` more copies of `tile` fit.
    fn allows(&self, tile: T, n: usize) -> bool;
    fn take(&mut self, tile: T, n: usize);
    fn release(&mut self, tile: T, n: usize);
}

/// Rebuilds a budget from scratch by debiting every tile of `grid`.
pub fn debit_grid<T: Copy, B: Budget<T>>(budget: &mut B, grid: &Grid<T>) {
    for (_, tile) in grid.iter() {
        budget.take(tile, 1);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassicBudget {
    left: Vec<Allowance>,
}

impl ClassicBudget {
    #[must_use]
    pub fn new(settings: &ClassicSettings) -> Self {
        let left = ClassicTile::placeable()
            .into_iter()
            .map(|t| Allowance::from_limit(settings.limits.get(t)))
            .collect();
        Self { left }
    }
}

impl Budget<ClassicTile> for ClassicBudget {
    fn allows(&self, tile: ClassicTile, n: usize) -> bool {
        tile.limit_index()
            .is_none_or(|i| self.left[i].allows(n))
    }

    fn take(&mut self, tile: ClassicTile, n: usize) {
        if let Some(i) = tile.limit_index() {
            self.left[i].take(n);
        }
    }

    fn release(&mut self, tile: ClassicTile, n: usize) {
        if let Some(i) = tile.limit_index() {
            self.left[i].release(n);
        }
    }
}

/// Overhaul budgets track block kinds, fuels and priming sources
/// separately; a primed cell draws from both its fuel and its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverhaulBudget {
    blocks: Vec<Allowance>,
    fuels: Vec<Allowance>,
    sources: [Allowance; 3],
}

impl OverhaulBudget {
    #[must_use]
    pub fn new(settings: &OverhaulSettings) -> Self {
        Self {
            blocks: settings
                .limits
                .iter()
                .map(|l| Allowance::from_limit(*l))
                .collect(),
            fuels: settings
                .fuels
                .iter()
                .map(|f| Allowance::from_limit(f.limit))
                .collect(),
            sources: settings.source_limits.map(Allowance::from_limit),
        }
    }
}

impl Budget<OverhaulTile> for OverhaulBudget {
    fn allows(&self, tile: OverhaulTile, n: usize) -> bool {
        match tile {
            OverhaulTile::Air => true,
            OverhaulTile::Cell { fuel, source } => {
                self.fuels
                    .get(fuel as usize)
                    .is_some_and(|a| a.allows(n))
                    && source.is_none_or(|s| self.sources[s.index()].allows(n))
            }
            other => other
                .block_index()
                .and_then(|i| self.blocks.get(i))
                .is_some_and(|a| a.allows(n)),
        }
    }

    fn take(&mut self, tile: OverhaulTile, n: usize) {
        match tile {
            OverhaulTile::Air => {}
            OverhaulTile::Cell { fuel, source } => {
                if let Some(a) = self.fuels.get_mut(fuel as usize) {
                    a.take(n);
                }
                if let Some(s) = source {
                    self.sources[s.index()].take(n);
                }
            }
            other => {
                if let Some(a) = other.block_index().and_then(|i| self.blocks.get_mut(i)) {
                    a.take(n);
                }
            }
        }
    }

    fn release(&mut self, tile: OverhaulTile, n: usize) {
        match tile {
            OverhaulTile::Air => {}
            OverhaulTile::Cell { fuel, source } => {
                if let Some(a) = self.fuels.get_mut(fuel as usize) {
                    a.release(n);
                }
                if let Some(s) = source {
                    self.sources[s.index()].release(n);
                }
            }
            other => {
                if let Some(a) = other.block_index().and_then(|i| self.blocks.get_mut(i)) {
                    a.release(n);
                }
            }
        }
    }
}
