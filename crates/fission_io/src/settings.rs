//! Settings files for both reactor models.
//!
//! The format follows the file extension: `.toml` for TOML, anything else
//! is read as JSON. Loaded settings are validated before they are returned.

use std::path::Path;

use fission_core::Validate;
use fission_data::{ClassicSettings, OverhaulSettings};
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::serialization::{from_json, from_toml, read_text};

/// Text encoding of a settings document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Json,
    Toml,
}

impl SettingsFormat {
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => SettingsFormat::Toml,
            _ => SettingsFormat::Json,
        }
    }
}

/// Parses and validates a settings document.
pub fn parse_settings<T>(text: &str, format: SettingsFormat) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    let settings: T = match format {
        SettingsFormat::Json => from_json(text)?,
        SettingsFormat::Toml => from_toml(text)?,
    };
    settings.validate()?;
    Ok(settings)
}

/// Reads, parses and validates a settings file.
pub fn load_settings<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned + Validate,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = read_text(path)?;
    let settings = parse_settings(&text, SettingsFormat::from_path(path)).inspect_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Settings rejected");
    })?;
    tracing::info!(path = %path.display(), "Settings loaded");
    Ok(settings)
}

pub fn load_classic_settings<P: AsRef<Path>>(path: P) -> Result<ClassicSettings> {
    load_settings(path)
}

pub fn load_overhaul_settings<P: AsRef<Path>>(path: P) -> Result<OverhaulSettings> {
    load_settings(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IoError;
    use fission_core::SettingsError;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            SettingsFormat::from_path(Path::new("reactor.toml")),
            SettingsFormat::Toml
        );
        assert_eq!(
            SettingsFormat::from_path(Path::new("reactor.json")),
            SettingsFormat::Json
        );
        assert_eq!(
            SettingsFormat::from_path(Path::new("reactor")),
            SettingsFormat::Json
        );
    }

    #[test]
    fn test_parse_overhaul_toml() {
        let text = r#"
size_x = 3
size_y = 3
size_z = 3
goal = "Efficiency"

[[fuels]]
name = "[OX] LEU-235"
efficiency = 0.97
criticality = 99
heat = 58
"#;
        let s: OverhaulSettings = parse_settings(text, SettingsFormat::Toml).unwrap();
        assert_eq!(s.fuels.len(), 1);
        assert!(!s.fuels[0].self_priming);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let text = r#"{"size_x": 0, "size_y": 3, "size_z": 3, "fuels": []}"#;
        let err = parse_settings::<OverhaulSettings>(text, SettingsFormat::Json).unwrap_err();
        assert!(matches!(
            err,
            IoError::Settings(SettingsError::NonPositive { .. })
        ));
    }

    #[test]
    fn test_load_keeps_settings_error() {
        let path = std::env::temp_dir().join(format!(
            "fission_io_zero_size_{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "size_x = 0\nsize_y = 3\nsize_z = 3\nfuel_base_power = 120.0\nfuel_base_heat = 18.0\n",
        )
        .unwrap();
        let result = load_classic_settings(&path);
        let _ = std::fs::remove_file(&path);
        match result {
            Err(IoError::Settings(e)) => assert_eq!(e.field(), "size_x"),
            other => panic!("expected a settings error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = load_classic_settings("/nonexistent/fission/classic.toml").unwrap_err();
        assert!(matches!(err, IoError::Context { .. }));
    }

    #[test]
    fn test_classic_json_defaults() {
        let text = r#"{"size_x": 4, "size_y": 4, "size_z": 4,
            "fuel_base_power": 120.0, "fuel_base_heat": 18.0}"#;
        let s: ClassicSettings = parse_settings(text, SettingsFormat::Json).unwrap();
        assert_eq!(s.size_x, 4);
        assert!(matches!(s.goal, fission_data::ClassicGoal::Power));
        assert_eq!(s.limits.cell, -1);
    }
}
