use anyhow::Result;
use async_trait::async_trait;
use modelstore::domain::model::{Invocation, Outcome};
use modelstore::domain::ports::CommandRunner;
use modelstore::{MatrixConfig, MatrixRunner, ModelStoreError};
use std::sync::Mutex;

/// Records every invocation and fails the one at `fail_at` with `code`.
#[derive(Default)]
struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    fail_at: Option<(usize, i32)>,
}

impl RecordingRunner {
    fn failing_at(index: usize, code: i32) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_at: Some((index, code)),
        }
    }

    fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, invocation: &Invocation) -> modelstore::Result<Outcome> {
        let mut calls = self.calls.lock().unwrap();
        let index = calls.len();
        calls.push(invocation.clone());
        match self.fail_at {
            Some((at, code)) if at == index => Ok(Outcome::failure(code)),
            _ => Ok(Outcome::success()),
        }
    }
}

fn test_config() -> Result<MatrixConfig> {
    Ok(MatrixConfig::from_toml_str(
        r#"
[program]
command = "python"
args = ["main.py"]
working_directory = "examples/examples-by-ml-library"

[matrix]
frameworks = ["sklearn", "xgboost", "keras"]
backends = ["filesystem", "aws"]
"#,
    )?)
}

fn pair(invocation: &Invocation) -> (String, String) {
    let value_after = |flag: &str| {
        let index = invocation.args.iter().position(|a| a == flag).unwrap();
        invocation.args[index + 1].clone()
    };
    (value_after("--ml-framework"), value_after("--modelstore-in"))
}

#[tokio::test]
async fn test_runs_every_combination_in_order() -> Result<()> {
    let runner = MatrixRunner::new(test_config()?, RecordingRunner::default());

    let results = runner.run_all().await?;
    assert_eq!(results.len(), 6);

    let calls = runner.runner().calls();
    assert_eq!(calls.len(), 6);
    let pairs: Vec<(String, String)> = calls.iter().map(pair).collect();
    let expected: Vec<(String, String)> = [
        ("sklearn", "filesystem"),
        ("sklearn", "aws"),
        ("xgboost", "filesystem"),
        ("xgboost", "aws"),
        ("keras", "filesystem"),
        ("keras", "aws"),
    ]
    .iter()
    .map(|(f, b)| (f.to_string(), b.to_string()))
    .collect();
    assert_eq!(pairs, expected);
    Ok(())
}

#[tokio::test]
async fn test_invocation_shape() -> Result<()> {
    let runner = MatrixRunner::new(test_config()?, RecordingRunner::default());
    runner.run_all().await?;

    let first = &runner.runner().calls()[0];
    assert_eq!(first.program, "python");
    assert_eq!(
        first.args,
        vec![
            "main.py",
            "--modelstore-in",
            "filesystem",
            "--ml-framework",
            "sklearn"
        ]
    );
    assert_eq!(
        first.working_directory.as_deref(),
        Some("examples/examples-by-ml-library")
    );
    Ok(())
}

#[tokio::test]
async fn test_stops_at_first_failure() -> Result<()> {
    let runner = MatrixRunner::new(test_config()?, RecordingRunner::failing_at(2, 42));

    let err = runner.run_all().await.unwrap_err();
    match &err {
        ModelStoreError::InvocationFailed {
            framework,
            backend,
            code,
        } => {
            assert_eq!(framework, "xgboost");
            assert_eq!(backend, "filesystem");
            assert_eq!(*code, Some(42));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.exit_code(), 42);

    // Nothing runs after the failing invocation.
    assert_eq!(runner.runner().calls().len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_signal_termination_exits_non_zero() -> Result<()> {
    struct KilledRunner;

    #[async_trait]
    impl CommandRunner for KilledRunner {
        async fn run(&self, _invocation: &Invocation) -> modelstore::Result<Outcome> {
            Ok(Outcome { code: None })
        }
    }

    let runner = MatrixRunner::new(test_config()?, KilledRunner);
    let err = runner.run_all().await.unwrap_err();
    assert_eq!(err.exit_code(), 1);
    Ok(())
}

#[tokio::test]
async fn test_restricted_matrix() -> Result<()> {
    let mut config = test_config()?;
    config.restrict(&["keras".to_string()], &["aws".to_string()])?;
    let runner = MatrixRunner::new(config, RecordingRunner::default());

    let plan = runner.plan();
    assert_eq!(plan.len(), 1);
    assert_eq!(pair(&plan[0]), ("keras".to_string(), "aws".to_string()));

    runner.run_all().await?;
    assert_eq!(runner.runner().calls().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_execution_summary() -> Result<()> {
    let runner = MatrixRunner::new(test_config()?, RecordingRunner::default());
    let results = runner.run_all().await?;

    let summary = MatrixRunner::<RecordingRunner>::get_execution_summary(&results);
    assert_eq!(summary["total_runs"], 6);
    assert_eq!(summary["runs"][0], "sklearn/filesystem");
    Ok(())
}
