mod common;

use common::{ClassicBuilder, OverhaulBuilder};
use fission_core::{PlannerConfig, SettingsError, Validate};
use fission_data::{ClassicGoal, Fuel};
use fission_io::{load_classic_settings, load_overhaul_settings, IoError};
use fission_opt_lib::engine::{Engine, EngineError};

fn repo_file(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(name)
}

#[test]
fn test_bundled_files_load() {
    let classic = load_classic_settings(repo_file("settings/classic.toml")).unwrap();
    assert_eq!(classic.goal, ClassicGoal::Power);
    assert!(classic.symmetry.x && classic.symmetry.y && classic.symmetry.z);

    let overhaul = load_overhaul_settings(repo_file("settings/overhaul.toml")).unwrap();
    assert_eq!(overhaul.fuels.len(), 2);
    assert!(overhaul.fuels[1].self_priming);

    let text = std::fs::read_to_string(repo_file("planner.toml")).unwrap();
    assert_eq!(PlannerConfig::from_toml(&text).unwrap(), PlannerConfig::default());
}

#[test]
fn test_errors_name_the_field() {
    let cases: Vec<(fission_data::ClassicSettings, &str)> = vec![
        (ClassicBuilder::new().with_size(0, 3, 3).build(), "size_x"),
        (
            ClassicBuilder::new().with(|s| s.fuel_base_heat = f64::NAN).build(),
            "fuel_base_heat",
        ),
        (ClassicBuilder::new().with(|s| s.limits.cell = -2).build(), "limits.cell"),
    ];
    for (settings, field) in cases {
        let err = settings.validate().unwrap_err();
        assert!(err.field().contains(field), "{err} should mention {field}");
    }
}

#[test]
fn test_bad_fuels_rejected() {
    let empty = OverhaulBuilder::new().with(|s| s.fuels.clear()).build();
    assert!(matches!(
        empty.validate(),
        Err(SettingsError::EmptyFuelList { .. })
    ));

    let bad_efficiency = OverhaulBuilder::new()
        .with(|s| s.fuels.push(Fuel::new(1.5, 10, 10, false)))
        .build();
    let err = bad_efficiency.validate().unwrap_err();
    assert!(err.field().starts_with("fuels[2]"));

    let short_limits = OverhaulBuilder::new().with(|s| s.limits.truncate(3)).build();
    assert!(matches!(
        short_limits.validate(),
        Err(SettingsError::WrongLength { .. })
    ));
}

#[test]
fn test_engine_refuses_invalid_settings() {
    let settings = OverhaulBuilder::new().with_size(3, -1, 3).build();
    let err = Engine::overhaul(&settings, &PlannerConfig::default()).err().unwrap();
    assert!(matches!(err, EngineError::Settings(_)));
}

#[test]
fn test_invalid_file_is_io_settings_error() {
    let path = std::env::temp_dir().join(format!("fission_opt_bad_{}.json", std::process::id()));
    std::fs::write(&path, r#"{"size_x": 3, "size_y": 3, "size_z": 3, "fuels": []}"#).unwrap();
    let result = load_overhaul_settings(&path);
    let _ = std::fs::remove_file(&path);
    assert!(matches!(
        result,
        Err(IoError::Settings(SettingsError::EmptyFuelList { .. }))
    ));
}
