//! Immutable design snapshots handed to the host.

use fission_data::{ClassicTile, Coord, OverhaulTile};

use crate::classic::ClassicMetrics;
use crate::grid::Grid;
use crate::overhaul::OverhaulMetrics;

/// A layout frozen together with its metrics.
///
/// `data` is the flat identifier buffer in memory order; index it with
/// [`Design::stride`].
#[derive(Debug, Clone, PartialEq)]
pub struct Design<T, M> {
    grid: Grid<T>,
    data: Vec<i32>,
    metrics: M,
}

pub type ClassicDesign = Design<ClassicTile, ClassicMetrics>;
pub type OverhaulDesign = Design<OverhaulTile, OverhaulMetrics>;

impl<T: Copy, M> Design<T, M> {
    pub fn new(grid: Grid<T>, metrics: M, mut encode: impl FnMut(T) -> i32) -> Self {
        let data = grid.to_vec().into_iter().map(&mut encode).collect();
        Self {
            grid,
            data,
            metrics,
        }
    }

    #[must_use]
    pub fn grid(&self) -> &Grid<T> {
        &self.grid
    }

    #[must_use]
    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    #[must_use]
    pub fn data(&self) -> &[i32] {
        &self.data
    }

    #[must_use]
    pub fn shape(&self, axis: usize) -> usize {
        self.grid.shape(axis)
    }

    #[must_use]
    pub fn stride(&self, axis: usize) -> isize {
        self.grid.stride(axis)
    }

    #[must_use]
    pub fn dims(&self) -> Coord {
        self.grid.dims()
    }

    #[must_use]
    pub fn tile(&self, c: Coord) -> T {
        self.grid.get(c)
    }
}
