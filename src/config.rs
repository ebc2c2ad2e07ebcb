//! YAML configuration
//!
//! Every field is optional; anything left out keeps its default.
//!
//! ```yaml
//! simulation:
//!   repulsion_constant: 3200
//!   damping: 0.9
//! viewport:
//!   width: 1280
//!   height: 800
//! keywords:
//!   top_n: 20
//! layout:
//!   simulation_enabled: false
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::controller::LayoutSettings;
use crate::keywords::KeywordOptions;
use crate::simulation::{ParamError, SimulationParams, Viewport};

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid YAML for this schema
    #[error("parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The values parsed but cannot drive a simulation
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ParamError),
}

/// Layout selection options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Start physics as soon as a graph is built
    pub simulation_enabled: bool,

    /// Spoke radius for single-document layouts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radial_radius: Option<f64>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            simulation_enabled: true,
            radial_radius: None,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationParams,
    pub viewport: Viewport,
    pub keywords: KeywordOptions,
    pub layout: LayoutOptions,
}

impl Config {
    /// Parse and validate YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Check the physics parameters against the viewport
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate(&self.viewport)?;
        if let Some(radius) = self.layout.radial_radius {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(ParamError::NotPositive {
                    name: "layout.radial_radius",
                    value: radius,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Settings the controller builds layouts with
    pub fn layout_settings(&self) -> LayoutSettings {
        LayoutSettings {
            params: self.simulation,
            viewport: self.viewport,
            radial_radius: self.layout.radial_radius,
        }
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.layout.simulation_enabled);
        assert_eq!(config.keywords.top_n, 15);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_yaml_str(
            "simulation:\n  damping: 0.9\nviewport:\n  width: 1280\nkeywords:\n  top_n: 20\n",
        )
        .unwrap();

        assert_eq!(config.simulation.damping, 0.9);
        assert_eq!(config.simulation.repulsion_constant, 2800.0);
        assert_eq!(config.viewport.width, 1280.0);
        assert_eq!(config.viewport.height, 600.0);
        assert_eq!(config.keywords.top_n, 20);
        assert_eq!(config.keywords.min_length, 3);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let result = Config::from_yaml_str("simulation:\n  restitution: 2.0\n");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid(ParamError::Restitution(_)))
        ));

        let result = Config::from_yaml_str("layout:\n  radial_radius: -5\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let result = Config::from_yaml_str("simulation: [1, 2");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = Config::from_path(Path::new("does/not/exist.yaml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn reads_file_and_builds_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docgraph.yaml");
        fs::write(
            &path,
            "layout:\n  simulation_enabled: false\n  radial_radius: 120\n",
        )
        .unwrap();

        let config = Config::from_path(&path).unwrap();
        assert!(!config.layout.simulation_enabled);

        let settings = config.layout_settings();
        assert_eq!(settings.radial_radius, Some(120.0));
        assert_eq!(settings.viewport, Viewport::default());
    }

    #[test]
    fn yaml_roundtrip() {
        let config = Config::default();
        let yaml = config.to_yaml().unwrap();
        assert_eq!(Config::from_yaml_str(&yaml).unwrap(), config);
    }
}
