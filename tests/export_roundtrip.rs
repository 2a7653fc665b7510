mod common;

use common::{quick_config, OverhaulBuilder};
use fission_core::overhaul::OverhaulEvaluator;
use fission_io::{census, census_design, export_design, import_design, PlannerDocument};
use fission_opt_lib::engine::Engine;

fn trained_engine() -> Engine {
    let settings = OverhaulBuilder::new().with_size(4, 4, 3).build();
    let mut engine = Engine::overhaul(&settings, &quick_config(31)).unwrap();
    for _ in 0..150 {
        engine.run_batch();
    }
    engine
}

#[test]
fn test_best_design_survives_a_file_roundtrip() {
    let engine = trained_engine();
    let trainer = engine.as_staged_trainer().unwrap();
    let settings = trainer.settings();
    let best = engine.best_overhaul().unwrap();

    let doc = export_design(best, settings).with_fingerprint(quick_config(31).fingerprint());
    let path = std::env::temp_dir().join(format!("fission_opt_export_{}.json", std::process::id()));
    fission_io::write_json_file(&doc, &path).unwrap();
    let back: PlannerDocument = fission_io::read_json_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(back, doc);
    assert_eq!(back.config_fingerprint.as_deref().map(str::len), Some(64));
    let grid = import_design(&back, settings).unwrap();
    assert_eq!(&grid, best.grid());

    let metrics = OverhaulEvaluator::new(settings, false).evaluate(&grid).metrics;
    assert!((metrics.output - best.metrics().output).abs() < 1e-9);
    assert_eq!(census(&back), census_design(best, settings));
}

#[test]
fn test_dimensions_are_one_based() {
    let engine = trained_engine();
    let trainer = engine.as_staged_trainer().unwrap();
    let doc = export_design(engine.best_overhaul().unwrap(), trainer.settings());
    let dims = doc.data.interior_dimensions;
    assert_eq!((dims.x, dims.y, dims.z), (4, 4, 3));

    let every_point = doc
        .data
        .heat_sinks
        .values()
        .chain(doc.data.moderators.values())
        .chain(doc.data.reflectors.values())
        .chain(doc.data.neutron_shields.values())
        .chain(doc.data.fuel_cells.values())
        .flatten()
        .chain(doc.data.irradiators.iter())
        .chain(doc.data.conductors.iter());
    for p in every_point {
        assert!(p.x >= 1 && p.x <= dims.x);
        assert!(p.y >= 1 && p.y <= dims.y);
        assert!(p.z >= 1 && p.z <= dims.z);
    }
}
