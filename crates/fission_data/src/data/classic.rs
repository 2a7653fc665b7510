use serde::{Deserialize, Serialize};

use super::geometry::Symmetry;

/// Cooler kinds of the classic (conduction-cooled) reactor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Cooler {
    Water,
    Redstone,
    Quartz,
    Gold,
    Glowstone,
    Lapis,
    Diamond,
    Helium,
    Enderium,
    Cryotheum,
    Iron,
    Emerald,
    Copper,
    Tin,
    Magnesium,
}

impl Cooler {
    pub const COUNT: usize = 15;

    pub const ALL: [Cooler; Self::COUNT] = [
        Cooler::Water,
        Cooler::Redstone,
        Cooler::Quartz,
        Cooler::Gold,
        Cooler::Glowstone,
        Cooler::Lapis,
        Cooler::Diamond,
        Cooler::Helium,
        Cooler::Enderium,
        Cooler::Cryotheum,
        Cooler::Iron,
        Cooler::Emerald,
        Cooler::Copper,
        Cooler::Tin,
        Cooler::Magnesium,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Two-letter symbol used by text renderings.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Cooler::Water => "Wt",
            Cooler::Redstone => "Rs",
            Cooler::Quartz => "Qz",
            Cooler::Gold => "Au",
            Cooler::Glowstone => "Gs",
            Cooler::Lapis => "Lp",
            Cooler::Diamond => "Dm",
            Cooler::Helium => "He",
            Cooler::Enderium => "Ed",
            Cooler::Cryotheum => "Cr",
            Cooler::Iron => "Fe",
            Cooler::Emerald => "Em",
            Cooler::Copper => "Cu",
            Cooler::Tin => "Sn",
            Cooler::Magnesium => "Mg",
        }
    }
}

/// One grid cell of a classic reactor.
///
/// Active coolers follow the placement rule of their passive counterpart
/// but cool at the active rate and must stay reachable from the casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassicTile {
    Passive(Cooler),
    Active(Cooler),
    Cell,
    Moderator,
    Air,
}

impl ClassicTile {
    /// Number of tile kinds that carry a placement limit (everything but air).
    pub const LIMITED: usize = 2 * Cooler::COUNT + 2;
    /// Flat identifier of air in exported buffers.
    pub const AIR_ID: i32 = Self::LIMITED as i32;

    /// Every tile kind that can be placed, in identifier order.
    #[must_use]
    pub fn placeable() -> Vec<ClassicTile> {
        (0..Self::LIMITED).filter_map(Self::from_limit_index).collect()
    }

    /// Position of this tile in limit arrays; `None` for air.
    #[must_use]
    pub const fn limit_index(self) -> Option<usize> {
        match self {
            ClassicTile::Passive(c) => Some(c.index()),
            ClassicTile::Active(c) => Some(Cooler::COUNT + c.index()),
            ClassicTile::Cell => Some(2 * Cooler::COUNT),
            ClassicTile::Moderator => Some(2 * Cooler::COUNT + 1),
            ClassicTile::Air => None,
        }
    }

    #[must_use]
    pub fn from_limit_index(index: usize) -> Option<Self> {
        match index {
            i if i < Cooler::COUNT => Cooler::from_index(i).map(ClassicTile::Passive),
            i if i < 2 * Cooler::COUNT => Cooler::from_index(i - Cooler::COUNT).map(ClassicTile::Active),
            i if i == 2 * Cooler::COUNT => Some(ClassicTile::Cell),
            i if i == 2 * Cooler::COUNT + 1 => Some(ClassicTile::Moderator),
            _ => None,
        }
    }

    /// Flat identifier used by exported tile buffers.
    #[must_use]
    pub const fn id(self) -> i32 {
        match self.limit_index() {
            Some(i) => i as i32,
            None => Self::AIR_ID,
        }
    }

    #[must_use]
    pub fn from_id(id: i32) -> Option<Self> {
        if id == Self::AIR_ID {
            return Some(ClassicTile::Air);
        }
        usize::try_from(id).ok().and_then(Self::from_limit_index)
    }

    /// Three-character cell used by layer renderings.
    #[must_use]
    pub fn symbol(self) -> String {
        match self {
            ClassicTile::Passive(c) => format!(" {}", c.symbol()),
            ClassicTile::Active(c) => format!(">{}", c.symbol()),
            ClassicTile::Cell => " []".to_string(),
            ClassicTile::Moderator => " ##".to_string(),
            ClassicTile::Air => "   ".to_string(),
        }
    }
}

/// Optimization target of the classic model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClassicGoal {
    /// Duty-cycle weighted power.
    #[default]
    Power,
    /// Duty-cycle weighted cell count, rewarding spare cooling.
    Breeder,
    /// Power multiplier per cell.
    Efficiency,
}

impl ClassicGoal {
    #[must_use]
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(ClassicGoal::Power),
            1 => Some(ClassicGoal::Breeder),
            2 => Some(ClassicGoal::Efficiency),
            _ => None,
        }
    }
}

/// A value per cooler kind, split into passive and active variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoolerTable<T> {
    pub passive: [T; Cooler::COUNT],
    pub active: [T; Cooler::COUNT],
}

impl<T: Copy> CoolerTable<T> {
    #[must_use]
    pub const fn uniform(value: T) -> Self {
        Self {
            passive: [value; Cooler::COUNT],
            active: [value; Cooler::COUNT],
        }
    }

    #[must_use]
    pub fn get(&self, cooler: Cooler, active: bool) -> T {
        if active {
            self.active[cooler.index()]
        } else {
            self.passive[cooler.index()]
        }
    }
}

impl Default for CoolerTable<f64> {
    /// Stock cooling rates in H/t.
    fn default() -> Self {
        Self {
            passive: [
                20.0, 80.0, 80.0, 120.0, 120.0, 100.0, 120.0, 120.0, 140.0, 140.0, 60.0, 140.0,
                60.0, 80.0, 100.0,
            ],
            active: [
                50.0, 1000.0, 1500.0, 1750.0, 2000.0, 2250.0, 3500.0, 3300.0, 2750.0, 3250.0,
                1700.0, 2750.0, 1125.0, 1250.0, 2000.0,
            ],
        }
    }
}

/// Placement limits, `-1` meaning unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicLimits {
    pub coolers: CoolerTable<i32>,
    pub cell: i32,
    pub moderator: i32,
}

impl Default for ClassicLimits {
    fn default() -> Self {
        Self {
            coolers: CoolerTable {
                passive: [-1; Cooler::COUNT],
                active: [0; Cooler::COUNT],
            },
            cell: -1,
            moderator: -1,
        }
    }
}

impl ClassicLimits {
    /// Limit for a placeable tile; air is always unlimited.
    #[must_use]
    pub fn get(&self, tile: ClassicTile) -> i32 {
        match tile {
            ClassicTile::Passive(c) => self.coolers.passive[c.index()],
            ClassicTile::Active(c) => self.coolers.active[c.index()],
            ClassicTile::Cell => self.cell,
            ClassicTile::Moderator => self.moderator,
            ClassicTile::Air => -1,
        }
    }

    pub fn set(&mut self, tile: ClassicTile, limit: i32) {
        match tile {
            ClassicTile::Passive(c) => self.coolers.passive[c.index()] = limit,
            ClassicTile::Active(c) => self.coolers.active[c.index()] = limit,
            ClassicTile::Cell => self.cell = limit,
            ClassicTile::Moderator => self.moderator = limit,
            ClassicTile::Air => {}
        }
    }
}

/// Problem description for the classic model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassicSettings {
    pub size_x: i32,
    pub size_y: i32,
    pub size_z: i32,
    pub fuel_base_power: f64,
    pub fuel_base_heat: f64,
    #[serde(default)]
    pub cooling_rates: CoolerTable<f64>,
    #[serde(default)]
    pub limits: ClassicLimits,
    #[serde(default)]
    pub ensure_active_cooler_accessible: bool,
    #[serde(default)]
    pub goal: ClassicGoal,
    #[serde(default)]
    pub symmetry: Symmetry,
}

impl Default for ClassicSettings {
    fn default() -> Self {
        Self {
            size_x: 5,
            size_y: 5,
            size_z: 5,
            fuel_base_power: 682.105_263_158,
            fuel_base_heat: 56.842_105_263_2,
            cooling_rates: CoolerTable::default(),
            limits: ClassicLimits::default(),
            ensure_active_cooler_accessible: true,
            goal: ClassicGoal::Power,
            symmetry: Symmetry::none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_ids_roundtrip() {
        for id in 0..=ClassicTile::AIR_ID {
            let tile = ClassicTile::from_id(id).unwrap();
            assert_eq!(tile.id(), id);
        }
        assert!(ClassicTile::from_id(ClassicTile::AIR_ID + 1).is_none());
        assert!(ClassicTile::from_id(-1).is_none());
    }

    #[test]
    fn test_placeable_excludes_air() {
        let tiles = ClassicTile::placeable();
        assert_eq!(tiles.len(), ClassicTile::LIMITED);
        assert!(!tiles.contains(&ClassicTile::Air));
    }

    #[test]
    fn test_limits_get_set() {
        let mut limits = ClassicLimits::default();
        limits.set(ClassicTile::Active(Cooler::Helium), 4);
        assert_eq!(limits.get(ClassicTile::Active(Cooler::Helium)), 4);
        assert_eq!(limits.get(ClassicTile::Air), -1);
    }

    #[test]
    fn test_limits_are_eq() {
        fn assert_eq_impl<T: Eq>(_: &T) {}
        let mut limits = ClassicLimits::default();
        assert_eq_impl(&limits.coolers);
        assert_eq_impl(&limits);
        assert_eq!(limits, ClassicLimits::default());
        limits.set(ClassicTile::Passive(Cooler::Tin), 2);
        assert_ne!(limits, ClassicLimits::default());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&ClassicTile::Active(Cooler::Water)).unwrap();
        assert_eq!(json, r#"{"Active":"Water"}"#);
        assert_eq!(serde_json::to_string(&ClassicTile::Cell).unwrap(), r#""Cell""#);

        let settings = ClassicSettings::default();
        let back: ClassicSettings =
            serde_json::from_str(&serde_json::to_string(&settings).unwrap()).unwrap();
        assert_eq!(back, settings);
    }
}
