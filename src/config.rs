//! Configuration loaded from `schemashift.toml`.
//!
//! ```toml
//! [diff]
//! rename_threshold = 0.5
//! replacement_threshold = 0.3
//! min_shared_columns = 3
//! min_overlap_ratio = 0.7
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::diff::DiffOptions;
use crate::error::{SchemaError, SchemaResult};

/// Project-local config file name.
pub const CONFIG_FILE: &str = "schemashift.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub diff: DiffOptions,
}

impl Config {
    /// Parse and validate a TOML document. Missing keys keep their defaults.
    pub fn from_toml(content: &str) -> SchemaResult<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| SchemaError::config(e.to_string()))?;
        config.diff.validate()?;
        Ok(config)
    }

    /// Load a config file.
    pub fn load(path: &Path) -> SchemaResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load `explicit` if given, else the first existing file among
    /// `./schemashift.toml` and `<config dir>/schemashift/config.toml`.
    /// Falls back to defaults when none exists.
    pub fn discover(explicit: Option<&Path>) -> SchemaResult<Self> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading config");
            return Self::load(path);
        }

        for candidate in search_paths() {
            if candidate.is_file() {
                debug!(path = %candidate.display(), "loading config");
                return Self::load(&candidate);
            }
        }

        Ok(Self::default())
    }
}

fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("schemashift").join("config.toml"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_toml("[diff]\nrename_threshold = 0.6\n").unwrap();
        assert_eq!(config.diff.rename_threshold, 0.6);
        assert_eq!(config.diff.replacement_threshold, 0.3);
        assert_eq!(config.diff.min_shared_columns, 3);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_out_of_range_threshold_is_rejected() {
        let err = Config::from_toml("[diff]\nmin_overlap_ratio = -0.1\n").unwrap_err();
        assert!(matches!(err, SchemaError::Config(_)));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = Config::from_toml("[diff\n").unwrap_err();
        assert!(matches!(err, SchemaError::Config(_)));
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[diff]\nmin_shared_columns = 5").unwrap();

        let config = Config::discover(Some(file.path())).unwrap();
        assert_eq!(config.diff.min_shared_columns, 5);
    }

    #[test]
    fn test_missing_explicit_file_is_io_error() {
        let err = Config::discover(Some(Path::new("/nonexistent/schemashift.toml"))).unwrap_err();
        assert!(matches!(err, SchemaError::Io(_)));
    }
}
