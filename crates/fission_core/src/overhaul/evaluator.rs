use fission_data::{
    Coord, HeatSink, ModeratorKind, OverhaulSettings, OverhaulTile, PrimingSource, ReflectorKind,
};

use crate::grid::Grid;

/// Longest moderator line between a cell and its partner.
pub const NEUTRON_REACH: usize = 4;
/// Efficiency contributed by an open shield on a moderator line.
pub const SHIELD_EFFICIENCY: f64 = 0.5;
/// Heat a functional shield gains per unit of flux crossing it.
pub const SHIELD_HEAT_PER_FLUX: i64 = 5;
/// Heat allowance before a cluster's output is scaled down.
pub const COOLING_LENIENCY: f64 = 10.0;
pub const SPARSITY_THRESHOLD: f64 = 0.75;
pub const MAX_SPARSITY_PENALTY: f64 = 0.5;

/// Scalar outcome of an overhaul layout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OverhaulMetrics {
    /// Coolant throughput of casing-connected clusters.
    pub output: f64,
    pub raw_output: f64,
    /// Output-weighted cell efficiency after the sparsity penalty, in `[0, 1]`.
    pub efficiency: f64,
    pub raw_efficiency: f64,
    /// Sum of flux over criticality across active cells.
    pub fuel_use: f64,
    pub irradiator_flux: i64,
    pub n_active_cells: u32,
    pub heat: i64,
    pub cooling: i64,
    pub total_positive_net_heat: i64,
    pub total_raw_flux: i64,
    pub max_cell_flux: i64,
    pub n_clusters: u32,
    pub n_functional_blocks: u32,
    pub density: f64,
    pub sparsity_penalty: f64,
}

/// Metrics plus the tiles canonicalization may drop.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverhaulEvaluation {
    pub metrics: OverhaulMetrics,
    pub removable: Vec<Coord>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FluxEdge {
    efficiency: f64,
    flux: i64,
    /// Moderators and open shields crossed before the end tile.
    length: usize,
    /// Receiving cell; the emitting cell itself when reflected.
    target: Option<usize>,
    reflected: bool,
}

#[derive(Debug, Clone)]
struct CellState {
    pos: Coord,
    fuel: usize,
    source: Option<PrimingSource>,
    source_blocked: bool,
    edges: [Option<FluxEdge>; 6],
    flux: i64,
    heat_mult: u32,
    edge_efficiency: f64,
    efficiency: f64,
    excluded: bool,
    propagated: bool,
    active: bool,
    cluster: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Air,
    Cell(usize),
    Moderator {
        kind: ModeratorKind,
        active: bool,
        functional: bool,
    },
    Reflector {
        kind: ReflectorKind,
        active: bool,
    },
    Shield {
        heat: i64,
        functional: bool,
    },
    Irradiator {
        flux: i64,
        active: bool,
    },
    Conductor,
    Sink {
        kind: HeatSink,
        active: bool,
    },
}

#[derive(Debug, Clone, Default)]
struct Cluster {
    heat: i64,
    cooling: i64,
    raw_output: f64,
    irradiator_flux: i64,
    casing: bool,
}

/// Reusable scratch space for scoring overhaul layouts.
///
/// With `shield_on` every neutron shield is closed, which is how the
/// controllable check is evaluated.
#[derive(Debug, Clone)]
pub struct OverhaulEvaluator {
    settings: OverhaulSettings,
    shield_on: bool,
    slots: Grid<Slot>,
    cluster_of: Grid<Option<usize>>,
    group_of: Grid<Option<usize>>,
    cells: Vec<CellState>,
    tiers: [Vec<Coord>; 3],
    stack: Vec<usize>,
    frontier: Vec<Coord>,
}

impl OverhaulEvaluator {
    /// `settings` must already be validated.
    #[must_use]
    pub fn new(settings: &OverhaulSettings, shield_on: bool) -> Self {
        let dims = (
            settings.size_x as usize,
            settings.size_y as usize,
            settings.size_z as usize,
        );
        Self {
            settings: settings.clone(),
            shield_on,
            slots: Grid::filled(dims, Slot::Air),
            cluster_of: Grid::filled(dims, None),
            group_of: Grid::filled(dims, None),
            cells: Vec::new(),
            tiers: [Vec::new(), Vec::new(), Vec::new()],
            stack: Vec::new(),
            frontier: Vec::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &OverhaulSettings {
        &self.settings
    }

    fn load(&mut self, grid: &Grid<OverhaulTile>) {
        self.cells.clear();
        for tier in &mut self.tiers {
            tier.clear();
        }
        for (c, tile) in grid.iter() {
            let slot = match tile {
                OverhaulTile::Air => Slot::Air,
                OverhaulTile::HeatSink(kind) => {
                    self.tiers[usize::from(kind.tier()) - 1].push(c);
                    Slot::Sink {
                        kind,
                        active: false,
                    }
                }
                OverhaulTile::Moderator(kind) => Slot::Moderator {
                    kind,
                    active: false,
                    functional: false,
                },
                OverhaulTile::Reflector(kind) => Slot::Reflector {
                    kind,
                    active: false,
                },
                OverhaulTile::Shield => Slot::Shield {
                    heat: 0,
                    functional: false,
                },
                OverhaulTile::Irradiator => Slot::Irradiator {
                    flux: 0,
                    active: false,
                },
                OverhaulTile::Conductor => Slot::Conductor,
                OverhaulTile::Cell { fuel, source } => {
                    self.cells.push(CellState {
                        pos: c,
                        fuel: usize::from(fuel),
                        source,
                        source_blocked: false,
                        edges: [None; 6],
                        flux: 0,
                        heat_mult: 0,
                        edge_efficiency: 0.0,
                        efficiency: 0.0,
                        excluded: false,
                        propagated: false,
                        active: false,
                        cluster: None,
                    });
                    Slot::Cell(self.cells.len() - 1)
                }
            };
            self.slots.set(c, slot);
            self.cluster_of.set(c, None);
            self.group_of.set(c, None);
        }
    }

    /// A priming source is blocked when every direction hits a cell, an
    /// irradiator or a fully reflecting reflector before the casing.
    fn check_source(&mut self, i: usize) {
        if self.cells[i].source.is_none() {
            return;
        }
        let start = self.cells[i].pos;
        for dir in 0..6 {
            let mut at = start;
            loop {
                let Some(next) = self.slots.neighbor(at, dir) else {
                    return;
                };
                let blocked = match self.slots.get(next) {
                    Slot::Reflector { kind, .. } => kind.reflectivity() >= 1.0,
                    Slot::Irradiator { .. } | Slot::Cell(_) => true,
                    _ => false,
                };
                if blocked {
                    break;
                }
                at = next;
            }
        }
        self.cells[i].source_blocked = true;
    }

    fn compute_edge(&self, i: usize, dir: usize) -> Option<FluxEdge> {
        let mut at = self.cells[i].pos;
        let mut efficiency = 0.0;
        let mut flux = 0i64;
        for length in 0..=NEUTRON_REACH {
            at = self.slots.neighbor(at, dir)?;
            match self.slots.get(at) {
                Slot::Moderator { kind, .. } => {
                    efficiency += kind.efficiency();
                    flux += i64::from(kind.flux());
                }
                Slot::Shield { .. } if !self.shield_on => efficiency += SHIELD_EFFICIENCY,
                Slot::Cell(j) if length > 0 => {
                    return Some(FluxEdge {
                        efficiency: efficiency / length as f64,
                        flux,
                        length,
                        target: Some(j),
                        reflected: false,
                    });
                }
                Slot::Irradiator { .. } if length > 0 => {
                    return Some(FluxEdge {
                        efficiency: 0.0,
                        flux,
                        length,
                        target: None,
                        reflected: false,
                    });
                }
                Slot::Reflector { kind, .. } if length > 0 && length <= NEUTRON_REACH / 2 => {
                    return Some(FluxEdge {
                        efficiency: kind.efficiency() * efficiency / length as f64,
                        flux: (2.0 * flux as f64 * kind.reflectivity()) as i64,
                        length,
                        target: Some(i),
                        reflected: true,
                    });
                }
                _ => return None,
            }
        }
        None
    }

    fn is_root(&self, cell: &CellState) -> bool {
        let fuel = &self.settings.fuels[cell.fuel];
        !cell.excluded && (fuel.self_priming || (cell.source.is_some() && !cell.source_blocked))
    }

    fn criticality(&self, i: usize) -> i64 {
        i64::from(self.settings.fuels[self.cells[i].fuel].criticality)
    }

    /// Pushes flux from every root until all remaining roots are critical.
    fn propagate_flux(&mut self) {
        loop {
            for cell in &mut self.cells {
                cell.flux = 0;
                cell.propagated = false;
            }
            let roots: Vec<usize> = (0..self.cells.len())
                .filter(|&i| self.is_root(&self.cells[i]))
                .collect();
            self.stack.clear();
            self.stack.extend(roots.iter().rev());
            while let Some(i) = self.stack.pop() {
                if self.cells[i].propagated {
                    continue;
                }
                self.cells[i].propagated = true;
                for dir in 0..6 {
                    let Some(edge) = self.cells[i].edges[dir] else {
                        continue;
                    };
                    let Some(t) = edge.target else {
                        continue;
                    };
                    self.cells[t].flux += edge.flux;
                    if self.cells[t].flux >= self.criticality(t) && !self.cells[t].propagated {
                        self.stack.push(t);
                    }
                }
            }
            let mut converged = true;
            for &r in &roots {
                if self.cells[r].flux < self.criticality(r) {
                    self.cells[r].excluded = true;
                    converged = false;
                }
            }
            if converged {
                break;
            }
        }
    }

    fn activate_flux(&mut self) {
        for i in 0..self.cells.len() {
            let active = self.cells[i].flux >= self.criticality(i);
            self.cells[i].active = active;
            if !active {
                continue;
            }
            let pos = self.cells[i].pos;
            for dir in 0..6 {
                let Some(edge) = self.cells[i].edges[dir] else {
                    continue;
                };
                self.cells[i].heat_mult += 1;
                self.cells[i].edge_efficiency += edge.efficiency;
                let mut at = pos;
                for step in 0..=edge.length {
                    let Some(next) = self.slots.neighbor(at, dir) else {
                        break;
                    };
                    at = next;
                    let slot = match self.slots.get(at) {
                        Slot::Moderator {
                            kind,
                            active,
                            functional: _,
                        } => Slot::Moderator {
                            kind,
                            active: active || step == 0,
                            functional: true,
                        },
                        Slot::Shield { heat, .. } => {
                            let gained = if edge.reflected || dir % 2 == 1 {
                                edge.flux * SHIELD_HEAT_PER_FLUX
                            } else {
                                0
                            };
                            Slot::Shield {
                                heat: heat + gained,
                                functional: true,
                            }
                        }
                        Slot::Irradiator { flux, .. } => Slot::Irradiator {
                            flux: flux + edge.flux,
                            active: true,
                        },
                        Slot::Reflector { kind, .. } => Slot::Reflector { kind, active: true },
                        other => other,
                    };
                    self.slots.set(at, slot);
                }
            }
        }
    }

    fn neighbors(&self, c: Coord) -> impl Iterator<Item = Slot> + '_ {
        (0..6).filter_map(move |d| self.slots.neighbor(c, d).map(|n| self.slots.get(n)))
    }

    fn adjacent_cells(&self, c: Coord) -> usize {
        self.neighbors(c)
            .filter(|s| matches!(s, Slot::Cell(i) if self.cells[*i].active))
            .count()
    }

    fn adjacent_moderators(&self, c: Coord) -> usize {
        self.neighbors(c)
            .filter(|s| matches!(s, Slot::Moderator { active: true, .. }))
            .count()
    }

    fn adjacent_reflectors(&self, c: Coord) -> usize {
        self.neighbors(c)
            .filter(|s| matches!(s, Slot::Reflector { active: true, .. }))
            .count()
    }

    fn adjacent_sinks(&self, c: Coord, want: HeatSink) -> usize {
        self.neighbors(c)
            .filter(|s| matches!(s, Slot::Sink { kind, active: true } if *kind == want))
            .count()
    }

    fn axial(&self, c: Coord, pred: impl Fn(Slot) -> bool) -> bool {
        (0..3).any(|axis| {
            [2 * axis, 2 * axis + 1].iter().all(|&d| {
                self.slots
                    .neighbor(c, d)
                    .is_some_and(|n| pred(self.slots.get(n)))
            })
        })
    }

    fn axial_sinks(&self, c: Coord, want: HeatSink) -> bool {
        self.axial(c, |s| matches!(s, Slot::Sink { kind, active: true } if kind == want))
    }

    fn axial_reflectors(&self, c: Coord) -> bool {
        self.axial(c, |s| matches!(s, Slot::Reflector { active: true, .. }))
    }

    fn sink_rule(&self, kind: HeatSink, c: Coord) -> bool {
        use HeatSink::*;
        let casing = self.slots.casing_faces(c) > 0;
        match kind {
            Water => self.adjacent_cells(c) > 0,
            Iron => self.adjacent_moderators(c) > 0,
            Redstone => self.adjacent_cells(c) > 0 && self.adjacent_moderators(c) > 0,
            Quartz => self.adjacent_sinks(c, Redstone) > 0,
            Obsidian => self.axial_sinks(c, Glowstone),
            NetherBricks => self.adjacent_sinks(c, Obsidian) > 0,
            Glowstone => self.adjacent_moderators(c) >= 2,
            Lapis => self.adjacent_cells(c) > 0 && casing,
            Gold => self.adjacent_sinks(c, Iron) >= 2,
            Prismarine => self.adjacent_sinks(c, Water) >= 2,
            Slime => self.adjacent_sinks(c, Water) == 1 && self.adjacent_sinks(c, Lead) >= 2,
            EndStone => self.adjacent_reflectors(c) > 0,
            Purpur => self.adjacent_sinks(c, Iron) == 1 && self.adjacent_sinks(c, EndStone) > 0,
            Diamond => self.adjacent_sinks(c, Gold) > 0 && self.adjacent_cells(c) > 0,
            Emerald => self.adjacent_sinks(c, Prismarine) > 0 && self.adjacent_moderators(c) > 0,
            Copper => self.adjacent_sinks(c, Water) > 0,
            Tin => self.axial_sinks(c, Lapis),
            Lead => self.adjacent_sinks(c, Iron) > 0,
            Boron => self.adjacent_sinks(c, Quartz) == 1 && casing,
            Lithium => {
                self.axial_sinks(c, Lead) && self.adjacent_sinks(c, Lead) == 2 && casing
            }
            Magnesium => self.adjacent_moderators(c) == 1 && casing,
            Manganese => self.adjacent_cells(c) >= 2,
            Aluminum => self.adjacent_sinks(c, Quartz) > 0 && self.adjacent_sinks(c, Lapis) > 0,
            Silver => self.adjacent_sinks(c, Glowstone) >= 2 && self.adjacent_sinks(c, Tin) > 0,
            Fluorite => self.adjacent_sinks(c, Gold) > 0 && self.adjacent_sinks(c, Prismarine) > 0,
            Villiaumite => {
                self.adjacent_sinks(c, EndStone) > 0 && self.adjacent_sinks(c, Redstone) > 0
            }
            Carobbiite => {
                self.adjacent_sinks(c, Copper) > 0 && self.adjacent_sinks(c, EndStone) > 0
            }
            Arsenic => self.axial_reflectors(c),
            Nitrogen => self.adjacent_sinks(c, Copper) >= 2 && self.adjacent_sinks(c, Purpur) > 0,
            Helium => self.adjacent_sinks(c, Redstone) == 2 && casing,
            Enderium => self.adjacent_moderators(c) >= 3,
            Cryotheum => self.adjacent_cells(c) >= 3,
        }
    }

    fn activate_sinks(&mut self) {
        for tier in 0..3 {
            for k in 0..self.tiers[tier].len() {
                let c = self.tiers[tier][k];
                if let Slot::Sink { kind, .. } = self.slots.get(c) {
                    let active = self.sink_rule(kind, c);
                    self.slots.set(c, Slot::Sink { kind, active });
                }
            }
        }
    }

    fn is_cluster_member(&self, slot: Slot) -> bool {
        match slot {
            Slot::Cell(i) => self.cells[i].active,
            Slot::Shield { functional, .. } => functional,
            Slot::Irradiator { active, .. } => active,
            Slot::Sink { active, .. } => active,
            _ => false,
        }
    }

    /// Labels conductor groups; returns whether each group touches the casing.
    fn form_conductor_groups(&mut self) -> Vec<bool> {
        let mut groups = Vec::new();
        let coords: Vec<Coord> = self.slots.iter().map(|(c, _)| c).collect();
        for start in coords {
            if self.slots.get(start) != Slot::Conductor || self.group_of.get(start).is_some() {
                continue;
            }
            let id = groups.len();
            let mut casing = false;
            self.frontier.clear();
            self.frontier.push(start);
            self.group_of.set(start, Some(id));
            while let Some(at) = self.frontier.pop() {
                for d in 0..6 {
                    match self.slots.neighbor(at, d) {
                        None => casing = true,
                        Some(n) => {
                            if self.slots.get(n) == Slot::Conductor && self.group_of.get(n).is_none() {
                                self.group_of.set(n, Some(id));
                                self.frontier.push(n);
                            }
                        }
                    }
                }
            }
            groups.push(casing);
        }
        groups
    }

    fn form_clusters(&mut self, groups: &[bool]) -> Vec<Cluster> {
        let mut clusters = Vec::new();
        let coords: Vec<Coord> = self.slots.iter().map(|(c, _)| c).collect();
        for start in coords {
            if !self.is_cluster_member(self.slots.get(start)) || self.cluster_of.get(start).is_some()
            {
                continue;
            }
            let id = clusters.len();
            let mut cluster = Cluster::default();
            self.frontier.clear();
            self.frontier.push(start);
            self.cluster_of.set(start, Some(id));
            while let Some(at) = self.frontier.pop() {
                match self.slots.get(at) {
                    Slot::Cell(i) => {
                        let cell = &mut self.cells[i];
                        cell.cluster = Some(id);
                        let fuel = &self.settings.fuels[cell.fuel];
                        cluster.heat += i64::from(fuel.heat) * i64::from(cell.heat_mult);
                    }
                    Slot::Shield { heat, .. } => cluster.heat += heat,
                    Slot::Irradiator { flux, .. } => cluster.irradiator_flux += flux,
                    Slot::Sink { kind, .. } => cluster.cooling += i64::from(kind.cooling()),
                    _ => {}
                }
                for d in 0..6 {
                    let Some(n) = self.slots.neighbor(at, d) else {
                        cluster.casing = true;
                        continue;
                    };
                    let slot = self.slots.get(n);
                    if slot == Slot::Conductor {
                        if let Some(g) = self.group_of.get(n) {
                            cluster.casing |= groups[g];
                        }
                    } else if self.is_cluster_member(slot) && self.cluster_of.get(n).is_none() {
                        self.cluster_of.set(n, Some(id));
                        self.frontier.push(n);
                    }
                }
            }
            clusters.push(cluster);
        }
        clusters
    }

    fn cell_efficiency(&self, cell: &CellState) -> f64 {
        if cell.heat_mult == 0 {
            return 0.0;
        }
        let fuel = &self.settings.fuels[cell.fuel];
        let positional = cell.edge_efficiency / f64::from(cell.heat_mult);
        let source = cell.source.map_or(1.0, PrimingSource::efficiency);
        let ratio = cell.flux as f64 / f64::from(fuel.criticality);
        let flux_efficiency = 1.0 / (1.0 + (2.0 * (ratio - 2.0)).exp());
        (fuel.efficiency * positional * source * flux_efficiency).clamp(0.0, 1.0)
    }

    fn is_functional(&self, slot: Slot) -> bool {
        match slot {
            Slot::Air => false,
            Slot::Cell(i) => self.cells[i].active,
            Slot::Moderator { functional, .. } => functional,
            Slot::Reflector { active, .. } => active,
            Slot::Shield { functional, .. } => functional,
            Slot::Irradiator { active, .. } => active,
            Slot::Conductor => true,
            Slot::Sink { active, .. } => active,
        }
    }

    /// Scores `grid`.
    pub fn evaluate(&mut self, grid: &Grid<OverhaulTile>) -> OverhaulEvaluation {
        self.load(grid);
        for i in 0..self.cells.len() {
            self.check_source(i);
            let mut edges = [None; 6];
            for (dir, edge) in edges.iter_mut().enumerate() {
                *edge = self.compute_edge(i, dir);
            }
            self.cells[i].edges = edges;
        }
        self.propagate_flux();
        self.activate_flux();
        self.activate_sinks();
        let groups = self.form_conductor_groups();
        let mut clusters = self.form_clusters(&groups);

        let mut m = OverhaulMetrics::default();
        for i in 0..self.cells.len() {
            let efficiency = self.cell_efficiency(&self.cells[i]);
            let cell = &mut self.cells[i];
            cell.efficiency = efficiency;
            m.total_raw_flux += cell.flux;
            m.max_cell_flux = m.max_cell_flux.max(cell.flux);
            if let (true, Some(id)) = (cell.active, cell.cluster) {
                let fuel = &self.settings.fuels[cell.fuel];
                let heat = f64::from(fuel.heat) * f64::from(cell.heat_mult);
                clusters[id].raw_output += heat * efficiency;
                m.n_active_cells += 1;
                m.fuel_use += cell.flux as f64 / f64::from(fuel.criticality);
            }
        }

        let mut weighted = 0.0;
        let mut weight = 0.0;
        let mut scales = Vec::with_capacity(clusters.len());
        for cluster in &clusters {
            let net = cluster.heat - cluster.cooling;
            m.heat += cluster.heat;
            m.cooling += cluster.cooling;
            m.total_positive_net_heat += net.max(0);
            let penalty = if cluster.cooling > 0 {
                ((cluster.heat as f64 + COOLING_LENIENCY) / cluster.cooling as f64).min(1.0)
            } else {
                1.0
            };
            let scale = if cluster.casing { penalty } else { 0.0 };
            scales.push(scale);
            m.raw_output += cluster.raw_output;
            m.output += cluster.raw_output * scale;
            if cluster.casing {
                m.irradiator_flux += cluster.irradiator_flux;
            }
        }
        for cell in self.cells.iter().filter(|c| c.active) {
            if let Some(id) = cell.cluster {
                let fuel = &self.settings.fuels[cell.fuel];
                let w = f64::from(fuel.heat) * f64::from(cell.heat_mult) * scales[id];
                weighted += w * cell.efficiency;
                weight += w;
            }
        }
        m.n_clusters = clusters.len() as u32;
        m.raw_efficiency = if weight > 0.0 { weighted / weight } else { 0.0 };

        let mut removable = Vec::new();
        for (c, slot) in self.slots.iter() {
            if self.is_functional(slot) {
                m.n_functional_blocks += 1;
            }
            match slot {
                Slot::Sink { active: false, .. } | Slot::Moderator { functional: false, .. } => {
                    removable.push(c);
                }
                _ => {}
            }
        }
        m.density = f64::from(m.n_functional_blocks) / self.slots.volume() as f64;
        m.sparsity_penalty = if m.density < SPARSITY_THRESHOLD {
            1.0 - MAX_SPARSITY_PENALTY * (1.0 - m.density / SPARSITY_THRESHOLD)
        } else {
            1.0
        };
        m.efficiency = (m.raw_efficiency * m.sparsity_penalty).clamp(0.0, 1.0);
        OverhaulEvaluation {
            metrics: m,
            removable,
        }
    }
}

/// Copy of `grid` with every listed tile replaced by air.
#[must_use]
pub fn canonicalize(grid: &Grid<OverhaulTile>, removable: &[Coord]) -> Grid<OverhaulTile> {
    let mut out = grid.clone();
    for &c in removable {
        out.set(c, OverhaulTile::Air);
    }
    out
}
