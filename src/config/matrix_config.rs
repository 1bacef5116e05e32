use crate::domain::model::Combination;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_identifier, validate_non_empty_list, validate_non_empty_string, validate_path,
    validate_subset, validate_unique, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File the runner looks for next to where it is started.
pub const DEFAULT_MATRIX_CONFIG: &str = "matrix.toml";

pub const DEFAULT_FRAMEWORKS: [&str; 16] = [
    "annoy",
    "catboost",
    "fastai",
    "gensim",
    "keras",
    "lightgbm",
    "onnx",
    "prophet",
    "pyspark",
    "pytorch",
    "pytorch-lightning",
    "sklearn",
    "skorch",
    "tensorflow",
    "transformers",
    "xgboost",
];

pub const DEFAULT_BACKENDS: [&str; 1] = ["filesystem"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixConfig {
    #[serde(default)]
    pub program: ProgramConfig,
    #[serde(default)]
    pub matrix: MatrixLists,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub working_directory: Option<String>,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            command: "python".to_string(),
            args: vec!["main.py".to_string()],
            working_directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixLists {
    pub frameworks: Vec<String>,
    pub backends: Vec<String>,
}

impl Default for MatrixLists {
    fn default() -> Self {
        Self {
            frameworks: DEFAULT_FRAMEWORKS.iter().map(|s| s.to_string()).collect(),
            backends: DEFAULT_BACKENDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            program: ProgramConfig::default(),
            matrix: MatrixLists::default(),
            monitoring: None,
        }
    }
}

impl MatrixConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        super::load_toml(path, "matrix_toml_parsing")
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        super::parse_toml(content, "matrix_toml_parsing")
    }

    /// Loads `path` when it exists, otherwise the built-in defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("📁 Loading matrix configuration from: {}", path.display());
            Self::from_file(path)
        } else {
            tracing::debug!("No {} found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Outer loop over frameworks, inner loop over backends.
    pub fn combinations(&self) -> Vec<Combination> {
        self.matrix
            .frameworks
            .iter()
            .flat_map(|framework| {
                self.matrix.backends.iter().map(move |backend| Combination {
                    framework: framework.clone(),
                    backend: backend.clone(),
                })
            })
            .collect()
    }

    /// Keeps only the requested frameworks and backends, in configured
    /// order. An empty request leaves that list untouched.
    pub fn restrict(&mut self, frameworks: &[String], backends: &[String]) -> Result<()> {
        if !frameworks.is_empty() {
            validate_subset("frameworks", frameworks, &self.matrix.frameworks)?;
            self.matrix.frameworks.retain(|f| frameworks.contains(f));
        }
        if !backends.is_empty() {
            validate_subset("backends", backends, &self.matrix.backends)?;
            self.matrix.backends.retain(|b| backends.contains(b));
        }
        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for MatrixConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("program.command", &self.program.command)?;
        if let Some(dir) = &self.program.working_directory {
            validate_path("program.working_directory", dir)?;
        }

        validate_non_empty_list("matrix.frameworks", &self.matrix.frameworks)?;
        validate_non_empty_list("matrix.backends", &self.matrix.backends)?;
        for framework in &self.matrix.frameworks {
            validate_identifier("matrix.frameworks", framework)?;
        }
        for backend in &self.matrix.backends {
            validate_identifier("matrix.backends", backend)?;
        }
        validate_unique("matrix.frameworks", &self.matrix.frameworks)?;
        validate_unique("matrix.backends", &self.matrix.backends)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_matrix_config() {
        let config = MatrixConfig::from_toml_str(
            r#"
[program]
command = "python3"
args = ["main.py"]
working_directory = "examples/examples-by-ml-library"

[matrix]
frameworks = ["sklearn", "xgboost"]
backends = ["filesystem", "aws"]
"#,
        )
        .unwrap();

        assert_eq!(config.program.command, "python3");
        assert_eq!(config.matrix.frameworks.len(), 2);
        assert!(config.validate().is_ok());
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = MatrixConfig::from_toml_str("").unwrap();
        assert_eq!(config.program.command, "python");
        assert_eq!(config.matrix.backends, vec!["filesystem".to_string()]);
        assert_eq!(config.matrix.frameworks.len(), DEFAULT_FRAMEWORKS.len());
    }

    #[test]
    fn test_combinations_order() {
        let mut config = MatrixConfig::default();
        config.matrix.frameworks = vec!["a".to_string(), "b".to_string()];
        config.matrix.backends = vec!["x".to_string(), "y".to_string(), "z".to_string()];

        let pairs: Vec<(String, String)> = config
            .combinations()
            .into_iter()
            .map(|c| (c.framework, c.backend))
            .collect();
        let expected: Vec<(String, String)> = [
            ("a", "x"),
            ("a", "y"),
            ("a", "z"),
            ("b", "x"),
            ("b", "y"),
            ("b", "z"),
        ]
        .iter()
        .map(|(f, b)| (f.to_string(), b.to_string()))
        .collect();
        assert_eq!(pairs, expected);
    }

    #[test]
    fn test_restrict_keeps_configured_order() {
        let mut config = MatrixConfig::default();
        config
            .restrict(&["xgboost".to_string(), "keras".to_string()], &[])
            .unwrap();
        assert_eq!(config.matrix.frameworks, vec!["keras".to_string(), "xgboost".to_string()]);
        assert_eq!(config.matrix.backends, vec!["filesystem".to_string()]);

        assert!(config.restrict(&[], &["gcloud".to_string()]).is_err());
    }

    #[test]
    fn test_validation_rejects_duplicates_and_empty_lists() {
        let mut config = MatrixConfig::default();
        config.matrix.backends = vec![];
        assert!(config.validate().is_err());

        let mut config = MatrixConfig::default();
        config.matrix.frameworks = vec!["sklearn".to_string(), "sklearn".to_string()];
        assert!(config.validate().is_err());
    }
}
