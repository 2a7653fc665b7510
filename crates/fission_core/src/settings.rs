//! Wholesale validation of settings records.
//!
//! Engines are only built from settings that pass [`Validate`]; a failure
//! names the offending field and nothing is allocated.

use fission_data::{ClassicSettings, Cooler, OverhaulSettings, BLOCK_KINDS};
use thiserror::Error;

/// Largest accepted edge length of the build volume.
pub const MAX_SIZE: i32 = 64;

/// Largest accepted number of fuel definitions.
pub const MAX_FUELS: usize = 1024;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: String, value: f64 },

    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} = {value} is not a limit (non-negative or -1 for unlimited)")]
    InvalidLimit { field: String, value: i32 },

    #[error("{field} must contain at least one fuel")]
    EmptyFuelList { field: String },

    #[error("{field} has {actual} entries, expected {expected}")]
    WrongLength {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("{field}: {reason}")]
    Unsupported { field: String, reason: String },
}

impl SettingsError {
    /// Path of the field that failed validation.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            SettingsError::NonPositive { field, .. }
            | SettingsError::OutOfRange { field, .. }
            | SettingsError::InvalidLimit { field, .. }
            | SettingsError::EmptyFuelList { field }
            | SettingsError::WrongLength { field, .. }
            | SettingsError::Unsupported { field, .. } => field,
        }
    }
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// A settings record that can be checked before an engine is built.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Rejects zero, negative, NaN and infinite values.
fn positive(field: impl Into<String>, value: f64) -> Result<()> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(SettingsError::NonPositive {
            field: field.into(),
            value,
        });
    }
    Ok(())
}

fn dimension(field: &str, value: i32) -> Result<()> {
    positive(field, f64::from(value))?;
    if value > MAX_SIZE {
        return Err(SettingsError::OutOfRange {
            field: field.to_string(),
            value: f64::from(value),
            min: 1.0,
            max: f64::from(MAX_SIZE),
        });
    }
    Ok(())
}

fn limit(field: impl Into<String>, value: i32) -> Result<()> {
    if value < -1 {
        return Err(SettingsError::InvalidLimit {
            field: field.into(),
            value,
        });
    }
    Ok(())
}

impl Validate for ClassicSettings {
    fn validate(&self) -> Result<()> {
        dimension("size_x", self.size_x)?;
        dimension("size_y", self.size_y)?;
        dimension("size_z", self.size_z)?;
        positive("fuel_base_power", self.fuel_base_power)?;
        positive("fuel_base_heat", self.fuel_base_heat)?;
        for cooler in Cooler::ALL {
            let i = cooler.index();
            positive(
                format!("cooling_rates.passive[{i}]"),
                self.cooling_rates.passive[i],
            )?;
            positive(
                format!("cooling_rates.active[{i}]"),
                self.cooling_rates.active[i],
            )?;
            limit(
                format!("limits.coolers.passive[{i}]"),
                self.limits.coolers.passive[i],
            )?;
            limit(
                format!("limits.coolers.active[{i}]"),
                self.limits.coolers.active[i],
            )?;
        }
        limit("limits.cell", self.limits.cell)?;
        limit("limits.moderator", self.limits.moderator)?;
        Ok(())
    }
}

impl Validate for OverhaulSettings {
    fn validate(&self) -> Result<()> {
        dimension("size_x", self.size_x)?;
        dimension("size_y", self.size_y)?;
        dimension("size_z", self.size_z)?;
        if self.fuels.is_empty() {
            return Err(SettingsError::EmptyFuelList {
                field: "fuels".to_string(),
            });
        }
        if self.fuels.len() > MAX_FUELS {
            return Err(SettingsError::Unsupported {
                field: "fuels".to_string(),
                reason: format!("at most {MAX_FUELS} fuels are supported"),
            });
        }
        for (i, fuel) in self.fuels.iter().enumerate() {
            positive(format!("fuels[{i}].efficiency"), fuel.efficiency)?;
            if fuel.efficiency > 1.0 {
                return Err(SettingsError::OutOfRange {
                    field: format!("fuels[{i}].efficiency"),
                    value: fuel.efficiency,
                    min: 0.0,
                    max: 1.0,
                });
            }
            positive(
                format!("fuels[{i}].criticality"),
                f64::from(fuel.criticality),
            )?;
            positive(format!("fuels[{i}].heat"), f64::from(fuel.heat))?;
            limit(format!("fuels[{i}].limit"), fuel.limit)?;
        }
        if self.limits.len() != BLOCK_KINDS {
            return Err(SettingsError::WrongLength {
                field: "limits".to_string(),
                expected: BLOCK_KINDS,
                actual: self.limits.len(),
            });
        }
        for (i, value) in self.limits.iter().enumerate() {
            limit(format!("limits[{i}]"), *value)?;
        }
        for (i, value) in self.source_limits.iter().enumerate() {
            limit(format!("source_limits[{i}]"), *value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fission_data::{ClassicTile, Fuel};

    fn overhaul() -> OverhaulSettings {
        OverhaulSettings {
            fuels: vec![Fuel::new(1.0, 102, 120, false)],
            ..OverhaulSettings::default()
        }
    }

    #[test]
    fn test_default_classic_validates() {
        assert!(ClassicSettings::default().validate().is_ok());
    }

    #[test]
    fn test_zero_size_rejected() {
        let settings = ClassicSettings {
            size_x: 0,
            ..ClassicSettings::default()
        };
        let err = settings.validate().unwrap_err();
        assert_eq!(err.field(), "size_x");
        assert!(matches!(err, SettingsError::NonPositive { .. }));
    }

    #[test]
    fn test_oversized_volume_rejected() {
        let settings = ClassicSettings {
            size_z: MAX_SIZE + 1,
            ..ClassicSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_nan_rate_rejected() {
        let mut settings = ClassicSettings::default();
        settings.cooling_rates.active[4] = f64::NAN;
        assert_eq!(
            settings.validate().unwrap_err().field(),
            "cooling_rates.active[4]"
        );
    }

    #[test]
    fn test_bad_limit_rejected() {
        let mut settings = ClassicSettings::default();
        settings.limits.set(ClassicTile::Moderator, -3);
        assert_eq!(settings.validate().unwrap_err().field(), "limits.moderator");
    }

    #[test]
    fn test_empty_fuels_rejected() {
        let settings = OverhaulSettings::default();
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::EmptyFuelList { .. })
        ));
    }

    #[test]
    fn test_fuel_fields_checked() {
        let mut settings = overhaul();
        assert!(settings.validate().is_ok());
        settings.fuels[0].efficiency = 1.25;
        assert_eq!(settings.validate().unwrap_err().field(), "fuels[0].efficiency");
        settings.fuels[0].efficiency = 0.5;
        settings.fuels[0].criticality = 0;
        assert_eq!(
            settings.validate().unwrap_err().field(),
            "fuels[0].criticality"
        );
    }

    #[test]
    fn test_limit_table_length() {
        let mut settings = overhaul();
        settings.limits.pop();
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::WrongLength { expected: 40, .. })
        ));
    }
}
