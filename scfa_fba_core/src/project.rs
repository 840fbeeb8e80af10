//! Project configuration (the run YAML) and the on-disk layout of a project
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default trace uptake for essential amino acids and vitamins
pub const DEFAULT_TRACE_UPTAKE: f64 = 0.01;

/// Run configuration, read from `data/inputs/project_config.yml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub project: ProjectSection,
    pub human_model: HumanModelSection,
    pub host_simulation: HostSimulation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSection {
    /// Expected dose conditions, the order is the order used in figures
    pub conditions: Vec<String>,
    /// Display labels for the conditions, same length as `conditions`
    #[serde(default)]
    pub condition_labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanModelSection {
    /// Network definition, relative to the project root
    pub sbml_path: PathBuf,
}

/// Nutrient availability of the simulated hepatocyte, all uptake magnitudes in
/// mmol/gDW/hr
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSimulation {
    pub oxygen_uptake: f64,
    pub glucose_uptake: f64,
    #[serde(default = "default_trace_uptake")]
    pub amino_acid_uptake: f64,
    #[serde(default = "default_trace_uptake")]
    pub vitamin_uptake: f64,
}

fn default_trace_uptake() -> f64 {
    DEFAULT_TRACE_UPTAKE
}

impl ProjectConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: ProjectConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|source| ConfigError::UnableToRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.project.conditions.is_empty() {
            return Err(ConfigError::NoConditions);
        }
        if let Some(labels) = &self.project.condition_labels {
            if labels.len() != self.project.conditions.len() {
                return Err(ConfigError::LabelCountMismatch {
                    conditions: self.project.conditions.len(),
                    labels: labels.len(),
                });
            }
        }
        let sim = &self.host_simulation;
        for (name, value) in [
            ("oxygen_uptake", sim.oxygen_uptake),
            ("glucose_uptake", sim.glucose_uptake),
            ("amino_acid_uptake", sim.amino_acid_uptake),
            ("vitamin_uptake", sim.vitamin_uptake),
        ] {
            if !value.is_finite() || value < 0. {
                return Err(ConfigError::InvalidUptake {
                    name: name.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }

    /// Display label for each configured condition, in configured order
    pub fn labels(&self) -> Vec<String> {
        match &self.project.condition_labels {
            Some(labels) => labels.clone(),
            None => self.project.conditions.clone(),
        }
    }
}

/// File locations of a project
#[derive(Debug, Clone, PartialEq)]
pub struct Paths {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub scfa_csv: PathBuf,
    pub results: PathBuf,
    pub figs_dir: PathBuf,
    pub tables_dir: PathBuf,
}

impl Paths {
    /// Standard layout under `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let inputs = root.join("data").join("inputs");
        Paths {
            config_path: inputs.join("project_config.yml"),
            scfa_csv: inputs.join("scfa_inputs.csv"),
            results: root.join("results"),
            figs_dir: root.join("outputs").join("figs"),
            tables_dir: root.join("outputs").join("tables"),
            root,
        }
    }

    pub fn with_config(mut self, config_path: PathBuf) -> Self {
        self.config_path = config_path;
        self
    }

    pub fn with_scfa_csv(mut self, scfa_csv: PathBuf) -> Self {
        self.scfa_csv = scfa_csv;
        self
    }

    /// Create the output directories if they are missing
    pub fn create_dirs(&self) -> Result<(), ConfigError> {
        for dir in [&self.results, &self.figs_dir, &self.tables_dir] {
            fs::create_dir_all(dir).map_err(|source| ConfigError::UnableToCreate {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Network definition named by the configuration
    pub fn model_path(&self, config: &ProjectConfig) -> PathBuf {
        self.root.join(&config.human_model.sbml_path)
    }

    pub fn canonical_inputs(&self) -> PathBuf {
        self.results.join("scfa_inputs_canonical.csv")
    }

    pub fn host_fluxes(&self) -> PathBuf {
        self.results.join("host_fluxes_by_condition.csv")
    }

    pub fn merged(&self) -> PathBuf {
        self.results.join("merged_dose_scfa_host.csv")
    }
}

/// Errors in the project configuration or layout
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to read configuration {path}")]
    UnableToRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unable to create directory {path}")]
    UnableToCreate {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid configuration")]
    Yaml(#[from] serde_yaml::Error),
    #[error("project.conditions is empty")]
    NoConditions,
    #[error("project.condition_labels has {labels} entries but there are {conditions} conditions")]
    LabelCountMismatch { conditions: usize, labels: usize },
    #[error("host_simulation.{name} must be a non-negative number, got {value}")]
    InvalidUptake { name: String, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
project:
  conditions: [StachysDose_Low, StachysDose_Mid, StachysDose_High]
  condition_labels: [Low, Mid, High]
human_model:
  sbml_path: data/models/Recon3D.xml.gz
host_simulation:
  oxygen_uptake: 20
  glucose_uptake: 1.5
"#;

    #[test]
    fn read_config() {
        let config = ProjectConfig::from_yaml_str(CONFIG).unwrap();
        assert_eq!(config.project.conditions.len(), 3);
        assert_eq!(config.labels(), vec!["Low", "Mid", "High"]);
        assert_eq!(
            config.human_model.sbml_path,
            PathBuf::from("data/models/Recon3D.xml.gz")
        );
        assert!((config.host_simulation.oxygen_uptake - 20.).abs() < 1e-25);
        assert!((config.host_simulation.glucose_uptake - 1.5).abs() < 1e-25);
        // trace uptakes fall back to their defaults
        assert!((config.host_simulation.amino_acid_uptake - 0.01).abs() < 1e-25);
        assert!((config.host_simulation.vitamin_uptake - 0.01).abs() < 1e-25);
    }

    #[test]
    fn labels_default_to_conditions() {
        let yaml = CONFIG.replace("  condition_labels: [Low, Mid, High]\n", "");
        let config = ProjectConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(config.labels(), config.project.conditions);
    }

    #[test]
    fn bad_configs() {
        let missing_glucose = CONFIG.replace("  glucose_uptake: 1.5\n", "");
        assert!(matches!(
            ProjectConfig::from_yaml_str(&missing_glucose),
            Err(ConfigError::Yaml(_))
        ));
        let labels = CONFIG.replace("[Low, Mid, High]", "[Low, Mid]");
        assert!(matches!(
            ProjectConfig::from_yaml_str(&labels),
            Err(ConfigError::LabelCountMismatch {
                conditions: 3,
                labels: 2
            })
        ));
        let negative = CONFIG.replace("oxygen_uptake: 20", "oxygen_uptake: -1");
        assert!(matches!(
            ProjectConfig::from_yaml_str(&negative),
            Err(ConfigError::InvalidUptake { .. })
        ));
    }

    #[test]
    fn project_layout() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::new(dir.path());
        assert_eq!(
            paths.config_path,
            dir.path().join("data/inputs/project_config.yml")
        );
        paths.create_dirs().unwrap();
        assert!(paths.results.is_dir());
        assert!(paths.figs_dir.is_dir());
        assert!(paths.tables_dir.is_dir());
        let config = ProjectConfig::from_yaml_str(CONFIG).unwrap();
        assert_eq!(
            paths.model_path(&config),
            dir.path().join("data/models/Recon3D.xml.gz")
        );
        let moved = paths.with_scfa_csv(PathBuf::from("doses.csv"));
        assert_eq!(moved.scfa_csv, PathBuf::from("doses.csv"));
    }
}
