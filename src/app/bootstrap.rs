use crate::config::bootstrap_config::BootstrapConfig;
use crate::core::manifest::{discover_manifests, Manifest};
use crate::domain::model::Invocation;
use crate::domain::ports::CommandRunner;
use crate::utils::error::{ModelStoreError, Result};
use crate::utils::validation::validate_identifier;
use std::path::{Path, PathBuf};

/// One command of the environment setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub name: String,
    pub invocation: Invocation,
}

/// Prepares a fresh isolated environment for the project: runtime,
/// environment, packaging tools, every manifest, then the project itself.
pub struct Bootstrap<R: CommandRunner> {
    config: BootstrapConfig,
    env_name: String,
    runner: R,
}

impl<R: CommandRunner> Bootstrap<R> {
    pub fn new(config: BootstrapConfig, env_name: impl Into<String>, runner: R) -> Result<Self> {
        let env_name = env_name.into();
        validate_identifier("environment", &env_name)?;
        Ok(Self {
            config,
            env_name,
            runner,
        })
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn project_dir(&self) -> &Path {
        Path::new(&self.config.project.directory)
    }

    /// Discovers and parses every manifest in the project directory.
    pub fn load_manifests(&self) -> Result<Vec<Manifest>> {
        let manifests = discover_manifests(self.project_dir())?
            .into_iter()
            .map(Manifest::from_file)
            .collect::<Result<Vec<_>>>()?;
        for manifest in &manifests {
            if let Some(path) = &manifest.path {
                tracing::debug!(
                    "📄 {} pins {} packages",
                    path.display(),
                    manifest.len()
                );
            }
        }
        Ok(manifests)
    }

    fn step(&self, name: impl Into<String>, program: &str, args: &[&str]) -> Step {
        Step {
            name: name.into(),
            invocation: Invocation {
                label: self.env_name.clone(),
                program: program.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
                working_directory: Some(self.config.project.directory.clone()),
            },
        }
    }

    /// Installer commands run inside the activated environment.
    fn install_step(&self, name: impl Into<String>, args: &[&str]) -> Step {
        let mut full = vec!["exec", self.config.installer.program.as_str(), "install"];
        full.extend_from_slice(args);
        self.step(name, &self.config.runtime.manager, &full)
    }

    pub fn plan(&self, manifests: &[PathBuf]) -> Vec<Step> {
        let manager = self.config.runtime.manager.as_str();
        let version = self.config.runtime.version.as_str();
        let env = self.env_name.as_str();

        let mut steps = vec![
            self.step(
                format!("install runtime {version}"),
                manager,
                &["install", "--skip-existing", version],
            ),
            self.step(
                format!("remove environment {env}"),
                manager,
                &["virtualenv-delete", "-f", env],
            ),
            self.step(
                format!("create environment {env}"),
                manager,
                &["virtualenv", version, env],
            ),
            self.step(format!("activate environment {env}"), manager, &["local", env]),
        ];

        let mut upgrade = vec!["--upgrade"];
        upgrade.extend(self.config.installer.upgrade.iter().map(String::as_str));
        steps.push(self.install_step("upgrade packaging tools", &upgrade));

        for manifest in manifests {
            // Steps run inside the project directory.
            let file = manifest
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| manifest.display().to_string());
            steps.push(self.install_step(format!("install {file}"), &["-r", file.as_str()]));
        }

        steps.push(self.install_step("install project (editable)", &["-e", "."]));
        steps
    }

    /// Runs every step in order and returns the names of those completed.
    /// The first failing step aborts the run.
    pub async fn run(&self) -> Result<Vec<String>> {
        let manifests: Vec<PathBuf> = self
            .load_manifests()?
            .into_iter()
            .filter_map(|m| m.path)
            .collect();
        let steps = self.plan(&manifests);
        let total = steps.len();
        let mut completed = Vec::with_capacity(total);

        for (index, step) in steps.into_iter().enumerate() {
            tracing::info!("🔧 [{}/{}] {}", index + 1, total, step.name);
            let outcome = self.runner.run(&step.invocation).await?;
            if !outcome.is_success() {
                tracing::error!("❌ Step '{}' failed (exit code {:?})", step.name, outcome.code);
                return Err(ModelStoreError::StepFailed {
                    step: step.name,
                    code: outcome.code,
                });
            }
            completed.push(step.name);
        }

        tracing::info!("✅ Environment '{}' is ready", self.env_name);
        Ok(completed)
    }
}
