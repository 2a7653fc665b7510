use serde::{Deserialize, Serialize};

/// Interior coordinate `(x, y, z)`, zero-based.
pub type Coord = (usize, usize, usize);

/// Mirror flags, one per axis.
///
/// When an axis flag is set every accepted layout must be a fixed point of
/// the reflection `c -> size - 1 - c` along that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Symmetry {
    #[serde(default)]
    pub x: bool,
    #[serde(default)]
    pub y: bool,
    #[serde(default)]
    pub z: bool,
}

impl Symmetry {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            x: false,
            y: false,
            z: false,
        }
    }

    #[must_use]
    pub const fn new(x: bool, y: bool, z: bool) -> Self {
        Self { x, y, z }
    }

    /// Flags as an array indexed by axis.
    #[must_use]
    pub const fn axes(&self) -> [bool; 3] {
        [self.x, self.y, self.z]
    }
}
