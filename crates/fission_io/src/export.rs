//! Planner JSON export of overhaul designs.
//!
//! A document holds a version stamp, the interior dimensions and one
//! coordinate list per tile variant, grouped by category. Coordinates are
//! 1-based. Fuel cells are keyed by `"<fuel>;<needs priming>;<source>"`,
//! for example `"[OX] LEU-235;True;Cf-252"` or `"[OX] HEA-242;False;None"`.

use std::collections::BTreeMap;

use fission_core::{Grid, OverhaulDesign};
use fission_data::{
    Coord, HeatSink, ModeratorKind, OverhaulSettings, OverhaulTile, PrimingSource, ReflectorKind,
};
use serde::{Deserialize, Serialize};

use crate::error::{IoError, Result};

pub const SAVE_VERSION: SaveVersion = SaveVersion {
    major: 2,
    minor: 1,
    build: 0,
    revision: 0,
};

const NO_SOURCE: &str = "None";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SaveVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

/// A 1-based position.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "PascalCase")]
pub struct Point {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Point {
    fn from_coord((x, y, z): Coord) -> Self {
        Self {
            x: x as i32 + 1,
            y: y as i32 + 1,
            z: z as i32 + 1,
        }
    }

    fn to_coord(self, dims: Coord) -> Result<Coord> {
        let axis = |v: i32, n: usize| -> Result<usize> {
            usize::try_from(v - 1)
                .ok()
                .filter(|i| *i < n)
                .ok_or_else(|| IoError::validation(format!("coordinate {v} outside 1..={n}")))
        };
        Ok((axis(self.x, dims.0)?, axis(self.y, dims.1)?, axis(self.z, dims.2)?))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct PlannerData {
    pub interior_dimensions: Point,
    #[serde(default)]
    pub heat_sinks: BTreeMap<String, Vec<Point>>,
    #[serde(default)]
    pub moderators: BTreeMap<String, Vec<Point>>,
    #[serde(default)]
    pub reflectors: BTreeMap<String, Vec<Point>>,
    #[serde(default)]
    pub neutron_shields: BTreeMap<String, Vec<Point>>,
    #[serde(default)]
    pub irradiators: Vec<Point>,
    #[serde(default)]
    pub conductors: Vec<Point>,
    #[serde(default)]
    pub fuel_cells: BTreeMap<String, Vec<Point>>,
}

impl Default for Point {
    fn default() -> Self {
        Self { x: 1, y: 1, z: 1 }
    }
}

/// The persisted document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PlannerDocument {
    pub save_version: SaveVersion,
    /// Fingerprint of the runtime configuration that produced the design.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_fingerprint: Option<String>,
    pub data: PlannerData,
}

impl PlannerDocument {
    #[must_use]
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.config_fingerprint = Some(fingerprint.into());
        self
    }
}

fn bool_word(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

/// Key of a fuel cell variant.
#[must_use]
pub fn fuel_cell_key(settings: &OverhaulSettings, fuel: u16, source: Option<PrimingSource>) -> String {
    let index = usize::from(fuel);
    let (name, needs_priming) = settings.fuels.get(index).map_or_else(
        || (format!("Fuel #{}", index + 1), true),
        |f| (f.display_name(index), !f.self_priming),
    );
    let source = source.map_or(NO_SOURCE, PrimingSource::name);
    format!("{name};{};{source}", bool_word(needs_priming))
}

/// Category and variant name of a tile; `None` for air.
fn classify(settings: &OverhaulSettings, tile: OverhaulTile) -> Option<(&'static str, String)> {
    match tile {
        OverhaulTile::Air => None,
        OverhaulTile::HeatSink(k) => Some(("HeatSinks", k.name().to_string())),
        OverhaulTile::Moderator(k) => Some(("Moderators", k.name().to_string())),
        OverhaulTile::Reflector(k) => Some(("Reflectors", k.name().to_string())),
        OverhaulTile::Shield => Some(("NeutronShields", tile.block_name().to_string())),
        OverhaulTile::Irradiator => Some(("Irradiators", String::new())),
        OverhaulTile::Conductor => Some(("Conductors", String::new())),
        OverhaulTile::Cell { fuel, source } => {
            Some(("FuelCells", fuel_cell_key(settings, fuel, source)))
        }
    }
}

/// Builds the planner document for `design`.
#[must_use]
pub fn export_design(design: &OverhaulDesign, settings: &OverhaulSettings) -> PlannerDocument {
    let dims = design.dims();
    let mut data = PlannerData {
        interior_dimensions: Point {
            x: dims.0 as i32,
            y: dims.1 as i32,
            z: dims.2 as i32,
        },
        ..PlannerData::default()
    };
    for (c, tile) in design.grid().iter() {
        let Some((category, variant)) = classify(settings, tile) else {
            continue;
        };
        let p = Point::from_coord(c);
        let list = match category {
            "HeatSinks" => data.heat_sinks.entry(variant).or_default(),
            "Moderators" => data.moderators.entry(variant).or_default(),
            "Reflectors" => data.reflectors.entry(variant).or_default(),
            "NeutronShields" => data.neutron_shields.entry(variant).or_default(),
            "Irradiators" => &mut data.irradiators,
            "Conductors" => &mut data.conductors,
            _ => data.fuel_cells.entry(variant).or_default(),
        };
        list.push(p);
    }
    tracing::debug!(
        x = dims.0,
        y = dims.1,
        z = dims.2,
        fuel_cells = data.fuel_cells.values().map(Vec::len).sum::<usize>(),
        "Design exported"
    );
    PlannerDocument {
        save_version: SAVE_VERSION,
        config_fingerprint: None,
        data,
    }
}

fn parse_fuel_key(settings: &OverhaulSettings, key: &str) -> Result<OverhaulTile> {
    let mut parts = key.split(';');
    let (Some(name), Some(_), Some(source), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(IoError::validation(format!("malformed fuel cell key {key:?}")));
    };
    let fuel = (0..settings.fuels.len())
        .find(|&i| settings.fuels[i].display_name(i) == name)
        .ok_or_else(|| IoError::validation(format!("unknown fuel {name:?}")))?;
    let source = if source == NO_SOURCE {
        None
    } else {
        Some(
            PrimingSource::ALL
                .into_iter()
                .find(|s| s.name() == source)
                .ok_or_else(|| IoError::validation(format!("unknown source {source:?}")))?,
        )
    };
    Ok(OverhaulTile::Cell {
        fuel: fuel as u16,
        source,
    })
}

fn lookup<T: Copy>(all: &[T], name: &str, name_of: impl Fn(T) -> &'static str) -> Result<T> {
    all.iter()
        .copied()
        .find(|k| name_of(*k) == name)
        .ok_or_else(|| IoError::validation(format!("unknown block {name:?}")))
}

/// Rebuilds the grid described by `doc`.
pub fn import_design(doc: &PlannerDocument, settings: &OverhaulSettings) -> Result<Grid<OverhaulTile>> {
    let d = &doc.data;
    let dims_point = d.interior_dimensions;
    let dims = (
        usize::try_from(dims_point.x).unwrap_or(0),
        usize::try_from(dims_point.y).unwrap_or(0),
        usize::try_from(dims_point.z).unwrap_or(0),
    );
    if dims.0 == 0 || dims.1 == 0 || dims.2 == 0 {
        return Err(IoError::validation("interior dimensions must be positive"));
    }
    let mut grid = Grid::filled(dims, OverhaulTile::Air);
    let mut place = |tile: OverhaulTile, points: &[Point]| -> Result<()> {
        for p in points {
            let c = p.to_coord(dims)?;
            if grid.get(c) != OverhaulTile::Air {
                return Err(IoError::validation(format!(
                    "position ({}, {}, {}) listed twice",
                    p.x, p.y, p.z
                )));
            }
            grid.set(c, tile);
        }
        Ok(())
    };
    for (name, points) in &d.heat_sinks {
        place(OverhaulTile::HeatSink(lookup(&HeatSink::ALL, name, HeatSink::name)?), points)?;
    }
    for (name, points) in &d.moderators {
        let kind = lookup(&ModeratorKind::ALL, name, ModeratorKind::name)?;
        place(OverhaulTile::Moderator(kind), points)?;
    }
    for (name, points) in &d.reflectors {
        let kind = lookup(&ReflectorKind::ALL, name, ReflectorKind::name)?;
        place(OverhaulTile::Reflector(kind), points)?;
    }
    for points in d.neutron_shields.values() {
        place(OverhaulTile::Shield, points)?;
    }
    place(OverhaulTile::Irradiator, &d.irradiators)?;
    place(OverhaulTile::Conductor, &d.conductors)?;
    for (key, points) in &d.fuel_cells {
        place(parse_fuel_key(settings, key)?, points)?;
    }
    Ok(grid)
}

fn census_key(category: &str, variant: &str) -> String {
    if variant.is_empty() {
        category.to_string()
    } else {
        format!("{category}/{variant}")
    }
}

/// Tile count per `category/variant` as listed in a document.
#[must_use]
pub fn census(doc: &PlannerDocument) -> BTreeMap<String, usize> {
    let d = &doc.data;
    let mut out = BTreeMap::new();
    let groups = [
        ("HeatSinks", &d.heat_sinks),
        ("Moderators", &d.moderators),
        ("Reflectors", &d.reflectors),
        ("NeutronShields", &d.neutron_shields),
        ("FuelCells", &d.fuel_cells),
    ];
    for (category, map) in groups {
        for (variant, points) in map {
            if !points.is_empty() {
                *out.entry(census_key(category, variant)).or_insert(0) += points.len();
            }
        }
    }
    for (category, points) in [("Irradiators", &d.irradiators), ("Conductors", &d.conductors)] {
        if !points.is_empty() {
            out.insert(category.to_string(), points.len());
        }
    }
    out
}

/// Tile count per `category/variant` enumerated from a design's tile buffer.
#[must_use]
pub fn census_design(design: &OverhaulDesign, settings: &OverhaulSettings) -> BTreeMap<String, usize> {
    let mut out = BTreeMap::new();
    for &id in design.data() {
        let Some(tile) = settings.tile_from_id(id) else {
            continue;
        };
        if let Some((category, variant)) = classify(settings, tile) {
            *out.entry(census_key(category, &variant)).or_insert(0) += 1;
        }
    }
    out
}
