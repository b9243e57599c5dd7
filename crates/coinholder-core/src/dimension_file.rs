//! Dimension file serialization
//!
//! A dimension file is a RON map of parameter key to millimetres:
//!
//! ```ron
//! {
//!     "width": 50.0,
//!     "coinDiameter": 46.0,
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dimensions::{DimensionError, DimensionSet};

/// Raw contents of a dimension file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionFile {
    values: BTreeMap<String, f64>,
}

impl From<&DimensionSet> for DimensionFile {
    fn from(dims: &DimensionSet) -> Self {
        Self {
            values: dims.to_map().into_iter().collect(),
        }
    }
}

impl DimensionFile {
    /// Raw key → value entries, unknown keys included
    pub fn values(&self) -> &BTreeMap<String, f64> {
        &self.values
    }

    /// Set a single entry by key, without validation
    pub fn set(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), value);
    }

    /// Validate into a dimension set
    pub fn to_dimensions(&self) -> Result<DimensionSet, DimensionFileError> {
        let map: HashMap<String, f64> = self
            .values
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        Ok(DimensionSet::from_map(&map)?)
    }

    /// Save to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DimensionFileError> {
        let path = path.as_ref();
        let content = self.to_bytes()?;
        std::fs::write(path, content).map_err(|e| DimensionFileError::Io(e.to_string()))?;
        tracing::debug!("Wrote {} dimensions to {}", self.values.len(), path.display());
        Ok(())
    }

    /// Serialize to pretty-printed RON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, DimensionFileError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| DimensionFileError::Serialize(e.to_string()))?;
        Ok(content.into_bytes())
    }

    /// Load from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DimensionFileError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| DimensionFileError::Io(e.to_string()))?;
        Self::load_from_str(&content)
    }

    pub fn load_from_str(content: &str) -> Result<Self, DimensionFileError> {
        ron::from_str(content).map_err(|e| DimensionFileError::Deserialize(e.to_string()))
    }

    pub fn load_from_bytes(data: &[u8]) -> Result<Self, DimensionFileError> {
        let content = std::str::from_utf8(data)
            .map_err(|e| DimensionFileError::Deserialize(e.to_string()))?;
        Self::load_from_str(content)
    }
}

/// Dimension file errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum DimensionFileError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error(transparent)]
    Dimensions(#[from] DimensionError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimensions::Parameter;

    #[test]
    fn test_save_and_load() {
        let dims = DimensionSet::default()
            .with(Parameter::CoinDiameter, 40.0)
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holder.ron");

        DimensionFile::from(&dims).save(&path).unwrap();
        let loaded = DimensionFile::load(&path).unwrap().to_dimensions().unwrap();

        assert_eq!(loaded, dims);
    }

    #[test]
    fn test_load_from_str() {
        let text = r#"{
            "width": 50.0,
            "innerWidth": 38.0,
            "height": 6.0,
            "coinDiameter": 46.0,
            "coinThickness": 1.5,
            "pinDiagonalDistance": 4.6,
            "pinHoleDiameter": 1.5,
            "coinFillet": 0.75,
            "pinChamfer": 0.5,
            "pinBaseDiameter": 1.6,
            "pinDiameter": 1.4,
            "pinHeadHoleDiameter": 1.45,
            "screenThickness": 0.15,
        }"#;

        let file = DimensionFile::load_from_str(text).unwrap();
        assert_eq!(file.to_dimensions().unwrap(), DimensionSet::default());
    }

    #[test]
    fn test_missing_key_is_reported() {
        let mut file = DimensionFile::from(&DimensionSet::default());
        file.values.remove("height");

        let err = file.to_dimensions().unwrap_err();
        assert!(matches!(
            err,
            DimensionFileError::Dimensions(DimensionError::MissingParameter(ref key)) if key == "height"
        ));
    }

    #[test]
    fn test_bytes_round_trip() {
        let mut file = DimensionFile::from(&DimensionSet::default());
        file.set("width", 55.0);

        let bytes = file.to_bytes().unwrap();
        let loaded = DimensionFile::load_from_bytes(&bytes).unwrap();
        assert_eq!(loaded, file);
        assert_eq!(loaded.to_dimensions().unwrap().width(), 55.0);
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(
            DimensionFile::load_from_str("{ \"width\": }"),
            Err(DimensionFileError::Deserialize(_))
        ));
        assert!(matches!(
            DimensionFile::load("/nonexistent/holder.ron"),
            Err(DimensionFileError::Io(_))
        ));
    }
}
