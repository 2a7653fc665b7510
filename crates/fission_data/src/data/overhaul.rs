use serde::{Deserialize, Serialize};

use super::geometry::Symmetry;

/// Heat sink kinds of the overhaul reactor, in block-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeatSink {
    Water,
    Iron,
    Redstone,
    Quartz,
    Obsidian,
    NetherBricks,
    Glowstone,
    Lapis,
    Gold,
    Prismarine,
    Slime,
    EndStone,
    Purpur,
    Diamond,
    Emerald,
    Copper,
    Tin,
    Lead,
    Boron,
    Lithium,
    Magnesium,
    Manganese,
    Aluminum,
    Silver,
    Fluorite,
    Villiaumite,
    Carobbiite,
    Arsenic,
    Nitrogen,
    Helium,
    Enderium,
    Cryotheum,
}

const SINK_COOLING: [u32; HeatSink::COUNT] = [
    55, 50, 85, 75, 70, 105, 100, 95, 110, 115, 145, 65, 90, 195, 190, 80, 120, 60, 165, 130, 125,
    150, 185, 170, 175, 160, 140, 135, 180, 200, 155, 205,
];

const SINK_SYMBOLS: [&str; HeatSink::COUNT] = [
    "Wt", "Fe", "Rs", "Qz", "Ob", "Nr", "Gs", "Lp", "Au", "Pm", "Sm", "En", "Pr", "Dm", "Em", "Cu",
    "Sn", "Pb", "B", "Li", "Mg", "Mn", "Al", "Ag", "Fl", "Vi", "Cb", "As", "N", "He", "Ed", "Cr",
];

const SINK_NAMES: [&str; HeatSink::COUNT] = [
    "Water",
    "Iron",
    "Redstone",
    "Quartz",
    "Obsidian",
    "Nether Bricks",
    "Glowstone",
    "Lapis",
    "Gold",
    "Prismarine",
    "Slime",
    "End Stone",
    "Purpur",
    "Diamond",
    "Emerald",
    "Copper",
    "Tin",
    "Lead",
    "Boron",
    "Lithium",
    "Magnesium",
    "Manganese",
    "Aluminum",
    "Silver",
    "Fluorite",
    "Villiaumite",
    "Carobbiite",
    "Arsenic",
    "Nitrogen",
    "Helium",
    "Enderium",
    "Cryotheum",
];

impl HeatSink {
    pub const COUNT: usize = 32;

    pub const ALL: [HeatSink; Self::COUNT] = [
        HeatSink::Water,
        HeatSink::Iron,
        HeatSink::Redstone,
        HeatSink::Quartz,
        HeatSink::Obsidian,
        HeatSink::NetherBricks,
        HeatSink::Glowstone,
        HeatSink::Lapis,
        HeatSink::Gold,
        HeatSink::Prismarine,
        HeatSink::Slime,
        HeatSink::EndStone,
        HeatSink::Purpur,
        HeatSink::Diamond,
        HeatSink::Emerald,
        HeatSink::Copper,
        HeatSink::Tin,
        HeatSink::Lead,
        HeatSink::Boron,
        HeatSink::Lithium,
        HeatSink::Magnesium,
        HeatSink::Manganese,
        HeatSink::Aluminum,
        HeatSink::Silver,
        HeatSink::Fluorite,
        HeatSink::Villiaumite,
        HeatSink::Carobbiite,
        HeatSink::Arsenic,
        HeatSink::Nitrogen,
        HeatSink::Helium,
        HeatSink::Enderium,
        HeatSink::Cryotheum,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Cooling in H/t when the sink is active.
    #[must_use]
    pub const fn cooling(self) -> u32 {
        SINK_COOLING[self.index()]
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        SINK_SYMBOLS[self.index()]
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        SINK_NAMES[self.index()]
    }

    /// Activation tier: a sink's rule only reads sinks of lower tiers.
    #[must_use]
    pub const fn tier(self) -> u8 {
        use HeatSink::*;
        match self {
            Water | Iron | Redstone | Glowstone | Lapis | EndStone | Magnesium | Manganese
            | Arsenic | Enderium | Cryotheum => 1,
            Quartz | Obsidian | Gold | Prismarine | Purpur | Copper | Tin | Lead | Villiaumite
            | Helium => 2,
            _ => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModeratorKind {
    Graphite,
    Beryllium,
    HeavyWater,
}

impl ModeratorKind {
    pub const ALL: [ModeratorKind; 3] = [
        ModeratorKind::Graphite,
        ModeratorKind::Beryllium,
        ModeratorKind::HeavyWater,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Flux contributed per block along a line.
    #[must_use]
    pub const fn flux(self) -> i32 {
        match self {
            ModeratorKind::Graphite => 10,
            ModeratorKind::Beryllium => 22,
            ModeratorKind::HeavyWater => 36,
        }
    }

    #[must_use]
    pub const fn efficiency(self) -> f64 {
        match self {
            ModeratorKind::Graphite => 1.1,
            ModeratorKind::Beryllium => 1.05,
            ModeratorKind::HeavyWater => 1.0,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ModeratorKind::Graphite => "Graphite",
            ModeratorKind::Beryllium => "Beryllium",
            ModeratorKind::HeavyWater => "Heavy Water",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            ModeratorKind::Graphite => "##",
            ModeratorKind::Beryllium => "==",
            ModeratorKind::HeavyWater => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReflectorKind {
    BerylliumCarbon,
    LeadSteel,
}

impl ReflectorKind {
    pub const ALL: [ReflectorKind; 2] = [ReflectorKind::BerylliumCarbon, ReflectorKind::LeadSteel];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn efficiency(self) -> f64 {
        match self {
            ReflectorKind::BerylliumCarbon => 0.5,
            ReflectorKind::LeadSteel => 0.25,
        }
    }

    /// Fraction of incoming flux sent back.
    #[must_use]
    pub const fn reflectivity(self) -> f64 {
        match self {
            ReflectorKind::BerylliumCarbon => 1.0,
            ReflectorKind::LeadSteel => 0.5,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ReflectorKind::BerylliumCarbon => "Beryllium-Carbon",
            ReflectorKind::LeadSteel => "Lead-Steel",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            ReflectorKind::BerylliumCarbon => "=)",
            ReflectorKind::LeadSteel => "-)",
        }
    }
}

/// External neutron source attached to a cell of a fuel that is not
/// self-priming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrimingSource {
    Californium,
    PoloniumBeryllium,
    RadiumBeryllium,
}

impl PrimingSource {
    pub const ALL: [PrimingSource; 3] = [
        PrimingSource::Californium,
        PrimingSource::PoloniumBeryllium,
        PrimingSource::RadiumBeryllium,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn efficiency(self) -> f64 {
        match self {
            PrimingSource::Californium => 0.9,
            PrimingSource::PoloniumBeryllium => 0.95,
            PrimingSource::RadiumBeryllium => 1.0,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PrimingSource::Californium => "Cf-252",
            PrimingSource::PoloniumBeryllium => "Po-Be",
            PrimingSource::RadiumBeryllium => "Ra-Be",
        }
    }

    #[must_use]
    pub const fn suffix(self) -> char {
        match self {
            PrimingSource::Californium => 'A',
            PrimingSource::PoloniumBeryllium => 'B',
            PrimingSource::RadiumBeryllium => 'C',
        }
    }
}

/// Number of block kinds carrying a per-kind placement limit.
pub const BLOCK_KINDS: usize = HeatSink::COUNT + 3 + 2 + 3;

/// One grid cell of an overhaul reactor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverhaulTile {
    HeatSink(HeatSink),
    Moderator(ModeratorKind),
    Reflector(ReflectorKind),
    Shield,
    Conductor,
    Irradiator,
    Air,
    Cell {
        fuel: u16,
        source: Option<PrimingSource>,
    },
}

impl OverhaulTile {
    pub const MODERATOR_BASE: usize = HeatSink::COUNT;
    pub const REFLECTOR_BASE: usize = Self::MODERATOR_BASE + 3;
    pub const SHIELD: usize = Self::REFLECTOR_BASE + 2;
    pub const CONDUCTOR: usize = Self::SHIELD + 1;
    pub const IRRADIATOR: usize = Self::CONDUCTOR + 1;
    pub const AIR_ID: i32 = BLOCK_KINDS as i32;
    /// First identifier of the cell range; cells follow in
    /// [`OverhaulSettings::cell_types`] order.
    pub const CELL_BASE: i32 = Self::AIR_ID + 1;

    /// Index into the per-kind limit table; `None` for air and cells.
    #[must_use]
    pub const fn block_index(self) -> Option<usize> {
        match self {
            OverhaulTile::HeatSink(h) => Some(h.index()),
            OverhaulTile::Moderator(m) => Some(Self::MODERATOR_BASE + m.index()),
            OverhaulTile::Reflector(r) => Some(Self::REFLECTOR_BASE + r.index()),
            OverhaulTile::Shield => Some(Self::SHIELD),
            OverhaulTile::Conductor => Some(Self::CONDUCTOR),
            OverhaulTile::Irradiator => Some(Self::IRRADIATOR),
            OverhaulTile::Air | OverhaulTile::Cell { .. } => None,
        }
    }

    #[must_use]
    pub fn from_block_index(index: usize) -> Option<Self> {
        match index {
            i if i < Self::MODERATOR_BASE => HeatSink::from_index(i).map(OverhaulTile::HeatSink),
            i if i < Self::REFLECTOR_BASE => ModeratorKind::ALL
                .get(i - Self::MODERATOR_BASE)
                .copied()
                .map(OverhaulTile::Moderator),
            i if i < Self::SHIELD => ReflectorKind::ALL
                .get(i - Self::REFLECTOR_BASE)
                .copied()
                .map(OverhaulTile::Reflector),
            Self::SHIELD => Some(OverhaulTile::Shield),
            Self::CONDUCTOR => Some(OverhaulTile::Conductor),
            Self::IRRADIATOR => Some(OverhaulTile::Irradiator),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_cell(self) -> bool {
        matches!(self, OverhaulTile::Cell { .. })
    }

    /// Display name for non-cell tiles.
    #[must_use]
    pub const fn block_name(self) -> &'static str {
        match self {
            OverhaulTile::HeatSink(h) => h.name(),
            OverhaulTile::Moderator(m) => m.name(),
            OverhaulTile::Reflector(r) => r.name(),
            OverhaulTile::Shield => "Boron-Silver",
            OverhaulTile::Conductor => "Conductor",
            OverhaulTile::Irradiator => "Irradiator",
            OverhaulTile::Air => "Air",
            OverhaulTile::Cell { .. } => "Cell",
        }
    }

    /// Short label used by layer renderings.
    #[must_use]
    pub fn symbol(self) -> String {
        match self {
            OverhaulTile::HeatSink(h) => h.symbol().to_string(),
            OverhaulTile::Moderator(m) => m.symbol().to_string(),
            OverhaulTile::Reflector(r) => r.symbol().to_string(),
            OverhaulTile::Shield => "<>".to_string(),
            OverhaulTile::Conductor => "[]".to_string(),
            OverhaulTile::Irradiator => "><".to_string(),
            OverhaulTile::Air => "..".to_string(),
            OverhaulTile::Cell { fuel, source } => {
                let mut label = (fuel + 1).to_string();
                if let Some(source) = source {
                    label.push(source.suffix());
                }
                label
            }
        }
    }
}

/// A fuel definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fuel {
    #[serde(default)]
    pub name: Option<String>,
    /// Output multiplier as a fraction in `(0, 1]`.
    pub efficiency: f64,
    #[serde(default = "unlimited")]
    pub limit: i32,
    pub criticality: i32,
    pub heat: i32,
    #[serde(default)]
    pub self_priming: bool,
}

impl Fuel {
    #[must_use]
    pub fn new(efficiency: f64, criticality: i32, heat: i32, self_priming: bool) -> Self {
        Self {
            name: None,
            efficiency,
            limit: -1,
            criticality,
            heat,
            self_priming,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: i32) -> Self {
        self.limit = limit;
        self
    }

    /// Name used in exports; unnamed fuels are numbered from one.
    #[must_use]
    pub fn display_name(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Fuel #{}", index + 1))
    }
}

fn unlimited() -> i32 {
    -1
}

fn default_limits() -> Vec<i32> {
    vec![-1; BLOCK_KINDS]
}

fn default_source_limits() -> [i32; 3] {
    [-1; 3]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverhaulGoal {
    #[default]
    Output,
    FuelUse,
    Efficiency,
    Irradiation,
}

impl OverhaulGoal {
    #[must_use]
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(OverhaulGoal::Output),
            1 => Some(OverhaulGoal::FuelUse),
            2 => Some(OverhaulGoal::Efficiency),
            3 => Some(OverhaulGoal::Irradiation),
            _ => None,
        }
    }
}

/// Problem description for the overhaul model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverhaulSettings {
    pub size_x: i32,
    pub size_y: i32,
    pub size_z: i32,
    pub fuels: Vec<Fuel>,
    /// Per block kind, indexed by [`OverhaulTile::block_index`].
    #[serde(default = "default_limits")]
    pub limits: Vec<i32>,
    #[serde(default = "default_source_limits")]
    pub source_limits: [i32; 3],
    #[serde(default)]
    pub goal: OverhaulGoal,
    #[serde(default)]
    pub controllable: bool,
    #[serde(default)]
    pub symmetry: Symmetry,
}

impl Default for OverhaulSettings {
    fn default() -> Self {
        Self {
            size_x: 5,
            size_y: 5,
            size_z: 5,
            fuels: Vec::new(),
            limits: default_limits(),
            source_limits: default_source_limits(),
            goal: OverhaulGoal::Output,
            controllable: false,
            symmetry: Symmetry::none(),
        }
    }
}

impl OverhaulSettings {
    /// Placeable cell variants: one per self-priming fuel, four otherwise.
    #[must_use]
    pub fn cell_types(&self) -> Vec<(u16, Option<PrimingSource>)> {
        let mut types = Vec::new();
        for (i, fuel) in self.fuels.iter().enumerate() {
            let i = i as u16;
            types.push((i, None));
            if !fuel.self_priming {
                types.extend(PrimingSource::ALL.iter().map(|s| (i, Some(*s))));
            }
        }
        types
    }

    /// Flat identifier of a tile; `None` for a cell of an unknown fuel.
    #[must_use]
    pub fn tile_id(&self, tile: OverhaulTile) -> Option<i32> {
        match tile {
            OverhaulTile::Air => Some(OverhaulTile::AIR_ID),
            OverhaulTile::Cell { fuel, source } => self
                .cell_types()
                .iter()
                .position(|t| *t == (fuel, source))
                .map(|p| OverhaulTile::CELL_BASE + p as i32),
            other => other.block_index().map(|i| i as i32),
        }
    }

    #[must_use]
    pub fn tile_from_id(&self, id: i32) -> Option<OverhaulTile> {
        if id == OverhaulTile::AIR_ID {
            return Some(OverhaulTile::Air);
        }
        if id >= OverhaulTile::CELL_BASE {
            let types = self.cell_types();
            return types
                .get((id - OverhaulTile::CELL_BASE) as usize)
                .map(|&(fuel, source)| OverhaulTile::Cell { fuel, source });
        }
        usize::try_from(id)
            .ok()
            .and_then(OverhaulTile::from_block_index)
    }
}
