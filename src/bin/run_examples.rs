use clap::Parser;
use modelstore::config::matrix_config::DEFAULT_MATRIX_CONFIG;
use modelstore::utils::logger;
use modelstore::utils::validation::Validate;
use modelstore::{MatrixConfig, MatrixRunner, ProcessRunner};

#[derive(Parser)]
#[command(name = "run-examples")]
#[command(about = "Run the example program for every ML framework and storage backend")]
struct Args {
    /// Path to the matrix configuration file
    #[arg(short, long, default_value = DEFAULT_MATRIX_CONFIG)]
    config: String,

    /// Run only these frameworks (comma-separated)
    #[arg(long, value_delimiter = ',')]
    frameworks: Vec<String>,

    /// Run only these backends (comma-separated)
    #[arg(long, value_delimiter = ',')]
    backends: Vec<String>,

    /// Show the invocations without running them
    #[arg(long)]
    dry_run: bool,

    /// Log resource usage between runs
    #[arg(long, conflicts_with = "no_monitor")]
    monitor: bool,

    /// Disable resource logging even when the config enables it
    #[arg(long)]
    no_monitor: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn monitor_enabled(&self, config: &MatrixConfig) -> bool {
        !self.no_monitor && (self.monitor || config.monitoring_enabled())
    }
}

fn load_config(args: &Args) -> modelstore::Result<MatrixConfig> {
    let mut config = MatrixConfig::load_or_default(&args.config)?;
    config.restrict(&args.frameworks, &args.backends)?;
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logger::init_logger(args.verbose, args.json_logs);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Matrix configuration is invalid: {}", e);
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    let monitor_enabled = args.monitor_enabled(&config);
    let runner = MatrixRunner::new(config, ProcessRunner::new()).with_monitoring(monitor_enabled);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be executed");
        for (index, invocation) in runner.plan().iter().enumerate() {
            println!("{:>3}. {}", index + 1, invocation.command_line());
        }
        return;
    }

    match runner.run_all().await {
        Ok(results) => {
            let summary = MatrixRunner::<ProcessRunner>::get_execution_summary(&results);
            tracing::info!("📊 Summary: {}", summary);
            println!("✅ All {} example runs succeeded", results.len());
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitored_config() -> MatrixConfig {
        MatrixConfig::from_toml_str("[monitoring]\nenabled = true\n").unwrap()
    }

    #[test]
    fn test_monitor_is_a_flag() {
        let args = Args::try_parse_from(["run_examples", "--monitor", "--dry-run"]).unwrap();
        assert!(args.monitor);
        assert!(args.dry_run);
        assert!(args.monitor_enabled(&MatrixConfig::from_toml_str("").unwrap()));
    }

    #[test]
    fn test_monitor_defaults_to_config() {
        let args = Args::try_parse_from(["run_examples"]).unwrap();
        assert!(args.monitor_enabled(&monitored_config()));
        assert!(!args.monitor_enabled(&MatrixConfig::from_toml_str("").unwrap()));
    }

    #[test]
    fn test_no_monitor_overrides_config() {
        let args = Args::try_parse_from(["run_examples", "--no-monitor"]).unwrap();
        assert!(!args.monitor_enabled(&monitored_config()));
        assert!(Args::try_parse_from(["run_examples", "--monitor", "--no-monitor"]).is_err());
    }

    #[test]
    fn test_comma_separated_restrictions() {
        let args =
            Args::try_parse_from(["run_examples", "--frameworks", "sklearn,keras", "--backends", "aws"])
                .unwrap();
        assert_eq!(args.frameworks, vec!["sklearn", "keras"]);
        assert_eq!(args.backends, vec!["aws"]);
    }
}
