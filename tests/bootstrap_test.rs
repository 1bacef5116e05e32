use anyhow::Result;
use async_trait::async_trait;
use modelstore::domain::model::{Invocation, Outcome};
use modelstore::domain::ports::CommandRunner;
use modelstore::{Bootstrap, BootstrapConfig, ModelStoreError};
use std::sync::Mutex;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingRunner {
    calls: Mutex<Vec<String>>,
    fail_when: Option<(&'static str, i32)>,
}

impl RecordingRunner {
    fn failing_when(needle: &'static str, code: i32) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_when: Some((needle, code)),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, invocation: &Invocation) -> modelstore::Result<Outcome> {
        let line = invocation.command_line();
        self.calls.lock().unwrap().push(line.clone());
        match self.fail_when {
            Some((needle, code)) if line.contains(needle) => Ok(Outcome::failure(code)),
            _ => Ok(Outcome::success()),
        }
    }
}

fn project_with_manifests(manifests: &[(&str, &str)]) -> Result<(TempDir, BootstrapConfig)> {
    let dir = TempDir::new()?;
    for (name, content) in manifests {
        std::fs::write(dir.path().join(name), content)?;
    }
    std::fs::write(dir.path().join("setup.py"), "")?;

    let mut config = BootstrapConfig::from_toml_str("[runtime]\nversion = \"3.8.12\"\n")?;
    config.project.directory = dir.path().display().to_string();
    Ok((dir, config))
}

#[tokio::test]
async fn test_runs_all_steps_in_order() -> Result<()> {
    let (_dir, config) = project_with_manifests(&[
        ("requirements.txt", "boto3==1.21.40\n"),
        ("requirements-dev0.txt", "pytest==7.1.1  # tests\nnumpy>=1.19; python_version < '3.10'\n"),
    ])?;
    let bootstrap = Bootstrap::new(config, "modelstore-dev", RecordingRunner::default())?;

    let completed = bootstrap.run().await?;
    assert_eq!(completed.len(), 8);

    let calls = bootstrap.runner().calls();
    assert_eq!(
        calls,
        vec![
            "pyenv install --skip-existing 3.8.12",
            "pyenv virtualenv-delete -f modelstore-dev",
            "pyenv virtualenv 3.8.12 modelstore-dev",
            "pyenv local modelstore-dev",
            "pyenv exec pip install --upgrade pip setuptools wheel",
            "pyenv exec pip install -r requirements-dev0.txt",
            "pyenv exec pip install -r requirements.txt",
            "pyenv exec pip install -e .",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_steps_run_in_project_directory() -> Result<()> {
    let (dir, config) = project_with_manifests(&[])?;
    let bootstrap = Bootstrap::new(config, "env", RecordingRunner::default())?;

    let plan = bootstrap.plan(&[]);
    assert_eq!(plan.len(), 6);
    let expected = dir.path().display().to_string();
    assert!(plan
        .iter()
        .all(|step| step.invocation.working_directory.as_deref() == Some(expected.as_str())));
    Ok(())
}

#[tokio::test]
async fn test_stops_at_first_failing_step() -> Result<()> {
    let (_dir, config) = project_with_manifests(&[("requirements.txt", "boto3==1.21.40\n")])?;
    let bootstrap = Bootstrap::new(
        config,
        "modelstore-dev",
        RecordingRunner::failing_when("virtualenv 3.8.12", 5),
    )?;

    let err = bootstrap.run().await.unwrap_err();
    assert!(matches!(err, ModelStoreError::StepFailed { code: Some(5), .. }));
    assert_eq!(err.exit_code(), 5);

    // install, delete, create; nothing after the failure
    assert_eq!(bootstrap.runner().calls().len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_invalid_manifest_aborts_before_any_step() -> Result<()> {
    let (_dir, config) = project_with_manifests(&[("requirements.txt", "boto3\n")])?;
    let bootstrap = Bootstrap::new(config, "modelstore-dev", RecordingRunner::default())?;

    let err = bootstrap.run().await.unwrap_err();
    assert!(matches!(err, ModelStoreError::ManifestParseError { line: 1, .. }));
    assert!(bootstrap.runner().calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_environment_name_is_required() -> Result<()> {
    let (_dir, config) = project_with_manifests(&[])?;
    assert!(Bootstrap::new(config.clone(), "", RecordingRunner::default()).is_err());
    assert!(Bootstrap::new(config, "two words", RecordingRunner::default()).is_err());
    Ok(())
}
