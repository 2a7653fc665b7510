//! Serialization utilities with robust error handling.
//!
//! JSON for designs and settings, TOML for hand-written settings files.

use crate::error::{IoError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serializes data to pretty-printed JSON.
pub fn to_json_pretty<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

/// Deserializes data from JSON string.
///
/// # Returns
/// Deserialized data on success, or `IoError::Validation` for blank input.
pub fn from_json<T>(json: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    if json.trim().is_empty() {
        return Err(IoError::validation("Empty JSON string"));
    }

    serde_json::from_str(json)
        .map_err(|e| IoError::serialization(format!("JSON deserialization failed: {}", e)))
}

/// Deserializes data from a TOML document.
pub fn from_toml<T>(text: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    if text.trim().is_empty() {
        return Err(IoError::validation("Empty TOML document"));
    }
    Ok(toml::from_str(text)?)
}

/// Writes pretty JSON to `path`.
pub fn write_json_file<T, P>(data: &T, path: P) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let json = to_json_pretty(data)?;
    std::fs::write(&path, json).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("writing JSON to {:?}", path.as_ref()))
    })?;
    Ok(())
}

/// Reads and deserializes JSON from `path`.
pub fn read_json_file<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let json = read_text(&path)?;
    from_json(&json)
}

pub(crate) fn read_text<P: AsRef<Path>>(path: P) -> Result<String> {
    std::fs::read_to_string(&path).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("reading {:?}", path.as_ref()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_json_file_roundtrip() {
        let data = TestData {
            name: "reactor".to_string(),
            value: 42,
        };
        let path = std::env::temp_dir().join(format!("fission_io_ser_{}.json", std::process::id()));
        write_json_file(&data, &path).unwrap();
        let restored: Result<TestData> = read_json_file(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(restored.unwrap(), data);
    }

    #[test]
    fn test_empty_inputs_fail() {
        assert!(from_json::<TestData>("").is_err());
        assert!(matches!(
            from_toml::<TestData>("  \n"),
            Err(IoError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_json_fails() {
        let result: Result<TestData> = from_json("{ invalid json");
        assert!(matches!(result, Err(IoError::Serialization(_))));
    }

    #[test]
    fn test_toml_parse() {
        let data: TestData = from_toml("name = \"toml\"\nvalue = 7\n").unwrap();
        assert_eq!(data.value, 7);
        assert!(matches!(
            from_toml::<TestData>("name = 3"),
            Err(IoError::Toml(_))
        ));
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = read_json_file::<TestData, _>("/nonexistent/fission/settings.json").unwrap_err();
        assert!(matches!(err, IoError::Context { .. }));
    }
}
