//! Layout defaults
//!
//! Defaults applied to rows and columns when their props leave spacing or
//! flex unset. Can be loaded from TOML:
//!
//! ```toml
//! row_gap = 12.0
//! column_gap = 8.0
//! row_flex = 1.0
//! ```

use serde::Deserialize;

use crate::error::{LayoutError, Result};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal spacing between row children, in pixels
    pub row_gap: f32,
    /// Vertical spacing between column children, in pixels
    pub column_gap: f32,
    /// Flex factor of a row within its parent
    pub row_flex: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_gap: 10.0,
            column_gap: 10.0,
            row_flex: 1.0,
        }
    }
}

impl LayoutConfig {
    /// Parse a config; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| LayoutError::Config(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = LayoutConfig::from_toml_str("row_gap = 4.0").unwrap();
        assert_eq!(config.row_gap, 4.0);
        assert_eq!(config.column_gap, 10.0);
        assert_eq!(config.row_flex, 1.0);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(LayoutConfig::from_toml_str("").unwrap(), LayoutConfig::default());
    }

    #[test]
    fn test_bad_config_is_rejected() {
        let err = LayoutConfig::from_toml_str("row_gap = \"wide\"").unwrap_err();
        assert!(matches!(err, LayoutError::Config(_)));
    }
}
