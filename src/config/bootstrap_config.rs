use crate::utils::error::Result;
use crate::utils::validation::{validate_identifier, validate_non_empty_string, validate_path, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File the bootstrap reads from the project directory.
pub const DEFAULT_BOOTSTRAP_CONFIG: &str = "bootstrap.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BootstrapConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub installer: InstallerConfig,
    #[serde(default)]
    pub project: ProjectConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub version: String,
    /// Runtime/environment manager used for every step.
    #[serde(default = "default_manager")]
    pub manager: String,
}

fn default_manager() -> String {
    "pyenv".to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            version: "3.8.12".to_string(),
            manager: default_manager(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallerConfig {
    pub program: String,
    #[serde(default = "default_upgrade")]
    pub upgrade: Vec<String>,
}

fn default_upgrade() -> Vec<String> {
    ["pip", "setuptools", "wheel"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            program: "pip".to_string(),
            upgrade: default_upgrade(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Where manifests are discovered and the editable install runs.
    pub directory: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
        }
    }
}

impl BootstrapConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        super::load_toml(path, "bootstrap_toml_parsing")
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        super::parse_toml(content, "bootstrap_toml_parsing")
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("📁 Loading bootstrap configuration from: {}", path.display());
            Self::from_file(path)
        } else {
            tracing::debug!("No {} found, using defaults", path.display());
            Ok(Self::default())
        }
    }
}

impl Validate for BootstrapConfig {
    fn validate(&self) -> Result<()> {
        validate_identifier("runtime.version", &self.runtime.version)?;
        validate_non_empty_string("runtime.manager", &self.runtime.manager)?;
        validate_non_empty_string("installer.program", &self.installer.program)?;
        validate_path("project.directory", &self.project.directory)?;
        Ok(())
    }
}
