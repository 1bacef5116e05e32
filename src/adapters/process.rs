use crate::domain::model::{Invocation, Outcome};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{ModelStoreError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// Spawns real child processes. Output goes straight to the terminal.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<Outcome> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &invocation.working_directory {
            command.current_dir(dir);
        }

        tracing::debug!("$ {}", invocation.command_line());
        let status = command
            .status()
            .await
            .map_err(|source| ModelStoreError::SpawnError {
                program: invocation.program.clone(),
                source,
            })?;

        Ok(Outcome {
            code: status.code(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> Invocation {
        Invocation {
            label: "test".to_string(),
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            working_directory: None,
        }
    }

    #[tokio::test]
    async fn test_exit_codes_are_reported() {
        let runner = ProcessRunner::new();
        assert!(runner.run(&shell("exit 0")).await.unwrap().is_success());
        assert_eq!(runner.run(&shell("exit 3")).await.unwrap().code, Some(3));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let runner = ProcessRunner::new();
        let invocation = Invocation {
            label: "missing".to_string(),
            program: "definitely-not-a-real-program-4f1c".to_string(),
            args: Vec::new(),
            working_directory: None,
        };
        let err = runner.run(&invocation).await.unwrap_err();
        assert!(matches!(err, ModelStoreError::SpawnError { .. }));
    }
}
