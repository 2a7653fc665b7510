//! Dense 3D tile grids and mirror symmetry.
//!
//! Consumers query shape and strides instead of assuming a memory order;
//! everything outside the interior counts as casing.

use fission_data::{Coord, Symmetry};
use ndarray::Array3;

/// Face directions in the order -x, +x, -y, +y, -z, +z.
pub const DIRECTIONS: [(isize, isize, isize); 6] = [
    (-1, 0, 0),
    (1, 0, 0),
    (0, -1, 0),
    (0, 1, 0),
    (0, 0, -1),
    (0, 0, 1),
];

/// A 3D array of tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    cells: Array3<T>,
}

impl<T: Copy> Grid<T> {
    #[must_use]
    pub fn filled(dims: Coord, value: T) -> Self {
        Self {
            cells: Array3::from_elem(dims, value),
        }
    }

    /// Builds a grid from a row-major buffer; `None` if the length is off.
    #[must_use]
    pub fn from_vec(dims: Coord, data: Vec<T>) -> Option<Self> {
        Array3::from_shape_vec(dims, data)
            .ok()
            .map(|cells| Self { cells })
    }

    #[must_use]
    pub fn dims(&self) -> Coord {
        self.cells.dim()
    }

    #[must_use]
    pub fn shape(&self, axis: usize) -> usize {
        self.cells.shape()[axis]
    }

    /// Distance in elements between neighbours along `axis`.
    #[must_use]
    pub fn stride(&self, axis: usize) -> isize {
        self.cells.strides()[axis]
    }

    #[must_use]
    pub fn volume(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn get(&self, c: Coord) -> T {
        self.cells[c]
    }

    pub fn set(&mut self, c: Coord, value: T) {
        self.cells[c] = value;
    }

    /// Signed lookup; `None` means casing.
    #[must_use]
    pub fn at(&self, x: isize, y: isize, z: isize) -> Option<T> {
        self.offset(x, y, z).map(|c| self.cells[c])
    }

    /// Converts signed coordinates into an interior coordinate.
    #[must_use]
    pub fn offset(&self, x: isize, y: isize, z: isize) -> Option<Coord> {
        let (sx, sy, sz) = self.dims();
        let inside = |v: isize, s: usize| v >= 0 && (v as usize) < s;
        (inside(x, sx) && inside(y, sy) && inside(z, sz)).then(|| (x as usize, y as usize, z as usize))
    }

    /// Neighbour of `c` in direction `dir`; `None` when it is casing.
    #[must_use]
    pub fn neighbor(&self, c: Coord, dir: usize) -> Option<Coord> {
        let (dx, dy, dz) = DIRECTIONS[dir];
        self.offset(c.0 as isize + dx, c.1 as isize + dy, c.2 as isize + dz)
    }

    /// Number of faces of `c` touching the casing.
    #[must_use]
    pub fn casing_faces(&self, c: Coord) -> usize {
        (0..6).filter(|&d| self.neighbor(c, d).is_none()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord, T)> + '_ {
        self.cells.indexed_iter().map(|(c, v)| (c, *v))
    }

    /// Tiles in memory order, matching [`Self::stride`].
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        match self.cells.as_slice_memory_order() {
            Some(slice) => slice.to_vec(),
            None => self.cells.iter().copied().collect(),
        }
    }

    #[must_use]
    pub fn map<U: Copy>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            cells: self.cells.map(f),
        }
    }

    pub fn count(&self, mut pred: impl FnMut(T) -> bool) -> usize {
        self.cells.iter().filter(|v| pred(**v)).count()
    }

    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }
}

/// Mirror symmetry over a fixed build volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mirror {
    dims: Coord,
    axes: [bool; 3],
}

impl Mirror {
    #[must_use]
    pub fn new(dims: Coord, symmetry: Symmetry) -> Self {
        Self {
            dims,
            axes: symmetry.axes(),
        }
    }

    fn sizes(&self) -> [usize; 3] {
        [self.dims.0, self.dims.1, self.dims.2]
    }

    /// Number of distinct positions written by one logical placement at `c`.
    #[must_use]
    pub fn n_sym(&self, c: Coord) -> usize {
        let pos = [c.0, c.1, c.2];
        let sizes = self.sizes();
        (0..3)
            .filter(|&a| self.axes[a] && pos[a] != sizes[a] - 1 - pos[a])
            .fold(1, |n, _| n * 2)
    }

    /// Every mirror image of `c`, `c` first, without duplicates.
    #[must_use]
    pub fn images(&self, c: Coord) -> Vec<Coord> {
        let sizes = self.sizes();
        let mut out = vec![[c.0, c.1, c.2]];
        for axis in 0..3 {
            if !self.axes[axis] {
                continue;
            }
            let reflected: Vec<[usize; 3]> = out
                .iter()
                .map(|p| {
                    let mut q = *p;
                    q[axis] = sizes[axis] - 1 - p[axis];
                    q
                })
                .filter(|q| !out.contains(q))
                .collect();
            out.extend(reflected);
        }
        out.into_iter().map(|p| (p[0], p[1], p[2])).collect()
    }

    /// One coordinate per mirror orbit: the upper half of each mirrored axis.
    #[must_use]
    pub fn representatives(&self) -> Vec<Coord> {
        let sizes = self.sizes();
        let start = |a: usize| if self.axes[a] { sizes[a] / 2 } else { 0 };
        let mut out = Vec::new();
        for x in start(0)..sizes[0] {
            for y in start(1)..sizes[1] {
                for z in start(2)..sizes[2] {
                    out.push((x, y, z));
                }
            }
        }
        out
    }

    /// Writes `value` to every image of `c` in one go.
    pub fn set_mirrored<T: Copy>(&self, grid: &mut Grid<T>, c: Coord, value: T) {
        for image in self.images(c) {
            grid.set(image, value);
        }
    }

    /// True when every mirrored axis maps the grid onto itself.
    #[must_use]
    pub fn is_fixed_point<T: Copy + PartialEq>(&self, grid: &Grid<T>) -> bool {
        grid.iter()
            .all(|(c, v)| self.images(c).into_iter().all(|i| grid.get(i) == v))
    }
}
