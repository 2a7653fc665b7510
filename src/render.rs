//! Plain-text renderings of designs, one block per layer along x.

use std::fmt::Write;

use fission_core::classic::ClassicMetrics;
use fission_core::overhaul::OverhaulMetrics;
use fission_core::Design;
use fission_data::{ClassicTile, OverhaulTile};

/// A tile that knows its short text label.
pub trait Glyph: Copy {
    fn glyph(self) -> String;
}

impl Glyph for ClassicTile {
    fn glyph(self) -> String {
        self.symbol()
    }
}

impl Glyph for OverhaulTile {
    fn glyph(self) -> String {
        // cells are labelled by fuel number, so widths vary
        format!("{:>4}", self.symbol())
    }
}

/// Layer-by-layer text of a design: a `Layer n` header, then one row per y
/// with one label per z.
#[must_use]
pub fn layers<T: Glyph, M>(design: &Design<T, M>) -> String {
    let (sx, sy, sz) = design.dims();
    let mut out = String::new();
    for x in 0..sx {
        let _ = writeln!(out, "Layer {}", x + 1);
        for y in 0..sy {
            for z in 0..sz {
                out.push_str(&design.tile((x, y, z)).glyph());
            }
            out.push('\n');
        }
    }
    out
}

#[must_use]
pub fn classic_summary(m: &ClassicMetrics) -> String {
    format!(
        "power={}\nheat={}\ncooling={}\nnetHeat={}\ndutyCycle={}\navgBreed={}\navgPower={}\n",
        m.power, m.heat, m.cooling, m.net_heat, m.duty_cycle, m.avg_breed, m.effective_power
    )
}

#[must_use]
pub fn overhaul_summary(m: &OverhaulMetrics) -> String {
    format!(
        "output={}\nfuelUse={}\nefficiency={}\nirradiatorFlux={}\nheat={}\ncooling={}\nactiveCells={}\nclusters={}\n",
        m.output,
        m.fuel_use,
        m.efficiency,
        m.irradiator_flux,
        m.heat,
        m.cooling,
        m.n_active_cells,
        m.n_clusters
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use fission_core::Grid;
    use fission_data::Cooler;

    #[test]
    fn test_classic_layers() {
        let mut grid = Grid::filled((2, 1, 2), ClassicTile::Air);
        grid.set((0, 0, 0), ClassicTile::Cell);
        grid.set((1, 0, 1), ClassicTile::Active(Cooler::Water));
        let design = Design::new(grid, ClassicMetrics::default(), ClassicTile::id);
        let text = layers(&design);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Layer 1", " []   ", "Layer 2", "   >Wt"]);
    }

    #[test]
    fn test_overhaul_cells_aligned() {
        let mut grid = Grid::filled((1, 1, 2), OverhaulTile::Air);
        grid.set(
            (0, 0, 0),
            OverhaulTile::Cell {
                fuel: 11,
                source: None,
            },
        );
        let design = Design::new(grid, OverhaulMetrics::default(), |_| 0);
        let text = layers(&design);
        assert_eq!(text.lines().nth(1), Some("  12  .."));
    }

    #[test]
    fn test_classic_summary_lines() {
        let text = classic_summary(&ClassicMetrics::default());
        assert!(text.starts_with("power=0\n"));
        assert_eq!(text.lines().count(), 7);
    }
}
