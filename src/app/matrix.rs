use crate::config::matrix_config::MatrixConfig;
use crate::domain::model::{Combination, Invocation};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{ModelStoreError, Result};
use crate::utils::monitor::ProcessMonitor;
use std::time::{Duration, Instant};

pub const BACKEND_FLAG: &str = "--modelstore-in";
pub const FRAMEWORK_FLAG: &str = "--ml-framework";

/// Result of one successful example invocation.
#[derive(Debug, Clone)]
pub struct CombinationResult {
    pub combination: Combination,
    pub duration: Duration,
}

/// Runs the example program once per `(framework, backend)` pair, in
/// order, stopping at the first failure.
pub struct MatrixRunner<R: CommandRunner> {
    config: MatrixConfig,
    runner: R,
    monitor: Option<ProcessMonitor>,
}

impl<R: CommandRunner> MatrixRunner<R> {
    pub fn new(config: MatrixConfig, runner: R) -> Self {
        Self {
            config,
            runner,
            monitor: None,
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = enabled.then(|| ProcessMonitor::new(true));
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn invocation_for(&self, combination: &Combination) -> Invocation {
        let mut args = self.config.program.args.clone();
        args.extend([
            BACKEND_FLAG.to_string(),
            combination.backend.clone(),
            FRAMEWORK_FLAG.to_string(),
            combination.framework.clone(),
        ]);
        Invocation {
            label: format!("{}/{}", combination.framework, combination.backend),
            program: self.config.program.command.clone(),
            args,
            working_directory: self.config.program.working_directory.clone(),
        }
    }

    /// Every invocation the run would make, in order.
    pub fn plan(&self) -> Vec<Invocation> {
        self.config
            .combinations()
            .iter()
            .map(|c| self.invocation_for(c))
            .collect()
    }

    pub async fn run_all(&self) -> Result<Vec<CombinationResult>> {
        let combinations = self.config.combinations();
        let total = combinations.len();
        let mut results = Vec::with_capacity(total);

        if let Some(monitor) = &self.monitor {
            monitor.log_stats("Matrix run started");
        }

        for (index, combination) in combinations.into_iter().enumerate() {
            let invocation = self.invocation_for(&combination);
            tracing::info!(
                "⏱️  [{}/{}] Running: framework={} backend={}",
                index + 1,
                total,
                combination.framework,
                combination.backend
            );

            let start_time = Instant::now();
            let outcome = self.runner.run(&invocation).await.map_err(|e| {
                tracing::error!("❌ Could not start {}: {}", invocation.label, e);
                e
            })?;

            if !outcome.is_success() {
                tracing::error!(
                    "❌ Failed: framework={} backend={} (exit code {:?})",
                    combination.framework,
                    combination.backend,
                    outcome.code
                );
                return Err(ModelStoreError::InvocationFailed {
                    framework: combination.framework,
                    backend: combination.backend,
                    code: outcome.code,
                });
            }

            let duration = start_time.elapsed();
            tracing::info!(
                "✅ Finished: framework={} backend={} ({:?})",
                combination.framework,
                combination.backend,
                duration
            );
            if let Some(monitor) = &self.monitor {
                monitor.log_stats(&invocation.label);
            }
            results.push(CombinationResult {
                combination,
                duration,
            });
        }

        if let Some(monitor) = &self.monitor {
            monitor.log_final_stats();
        }
        Ok(results)
    }

    pub fn get_execution_summary(results: &[CombinationResult]) -> serde_json::Value {
        let total_duration: Duration = results.iter().map(|r| r.duration).sum();
        serde_json::json!({
            "total_runs": results.len(),
            "total_duration_ms": total_duration.as_millis() as u64,
            "runs": results
                .iter()
                .map(|r| format!("{}/{}", r.combination.framework, r.combination.backend))
                .collect::<Vec<_>>(),
        })
    }
}
