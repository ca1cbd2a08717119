//! Application configuration file

use std::path::Path;

use anyhow::{Context, Result};
use lv_core::LinkedViewOptions;
use lv_data::ColumnNames;
use serde::{Deserialize, Serialize};

/// Settings read from `--config`; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Layout, marker and animation options
    pub view: LinkedViewOptions,

    /// Column names of the input tables
    pub columns: ColumnNames,

    /// Use the light theme
    pub light_theme: bool,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"view": {{"show_cells": true}}, "columns": {{"x": "tsne_1"}}}}"#).unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert!(config.view.show_cells);
        assert_eq!(config.view.scatter_size, 400.0);
        assert_eq!(config.columns.x, "tsne_1");
        assert_eq!(config.columns.y, "V2");
        assert!(!config.light_theme);
    }

    #[test]
    fn test_missing_config_names_the_file() {
        let err = AppConfig::load(Path::new("/nonexistent/linked.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/linked.json"));
    }
}
