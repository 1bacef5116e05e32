use clap::Parser;
use modelstore::config::bootstrap_config::DEFAULT_BOOTSTRAP_CONFIG;
use modelstore::utils::logger;
use modelstore::utils::validation::Validate;
use modelstore::{Bootstrap, BootstrapConfig, ProcessRunner};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bootstrap")]
#[command(about = "Create a fresh development environment and install every manifest")]
struct Args {
    /// Name of the environment to (re)create
    env_name: String,

    /// Path to the bootstrap configuration file
    #[arg(short, long, default_value = DEFAULT_BOOTSTRAP_CONFIG)]
    config: PathBuf,

    /// Override the runtime version from the configuration
    #[arg(long)]
    runtime_version: Option<String>,

    /// Show the steps without running them
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

async fn run(args: Args) -> modelstore::Result<()> {
    let mut config = BootstrapConfig::load_or_default(&args.config)?;
    if let Some(version) = args.runtime_version {
        config.runtime.version = version;
    }
    config.validate()?;

    let bootstrap = Bootstrap::new(config, args.env_name, ProcessRunner::new())?;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be executed");
        let manifests: Vec<PathBuf> = bootstrap
            .load_manifests()?
            .into_iter()
            .filter_map(|m| m.path)
            .collect();
        for (index, step) in bootstrap.plan(&manifests).iter().enumerate() {
            println!("{:>3}. {}: {}", index + 1, step.name, step.invocation.command_line());
        }
        return Ok(());
    }

    bootstrap.run().await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}
