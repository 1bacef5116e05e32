use clap::{Parser, Subcommand};
use modelstore::utils::logger;
use modelstore::{AnyStorage, BlobStorage, ModelStoreError, StoreOptions};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "modelstore")]
#[command(about = "Version, tag and fetch model artifacts in blob storage")]
struct Cli {
    #[command(flatten)]
    store: StoreOptions,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload an archive as a new model version
    Upload {
        domain: String,
        archive: PathBuf,
        #[arg(long)]
        model_type: Option<String>,
    },
    /// Download a model archive (latest in the domain by default)
    Download {
        domain: String,
        #[arg(long)]
        model_id: Option<String>,
        #[arg(long, default_value = ".")]
        output: PathBuf,
    },
    /// Print a model's meta-data
    Get { domain: String, model_id: String },
    ListDomains,
    ListModels {
        domain: String,
        #[arg(long)]
        state: Option<String>,
    },
    ListStates,
    CreateState { state_name: String },
    SetState {
        domain: String,
        model_id: String,
        state_name: String,
    },
    UnsetState {
        domain: String,
        model_id: String,
        state_name: String,
    },
    /// Delete a model's archive and meta-data
    Delete {
        domain: String,
        model_id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

async fn execute(store: &BlobStorage<AnyStorage>, command: Command) -> modelstore::Result<()> {
    match command {
        Command::Upload {
            domain,
            archive,
            model_type,
        } => {
            let meta = store.register(&domain, &archive, model_type).await?;
            println!("{}", serde_json::to_string_pretty(&meta)?);
        }
        Command::Download {
            domain,
            model_id,
            output,
        } => {
            let path = store.download(&output, &domain, model_id.as_deref()).await?;
            println!("📁 Downloaded to: {}", path.display());
        }
        Command::Get { domain, model_id } => {
            let meta = store.get_meta_data(&domain, &model_id).await?;
            println!("{}", serde_json::to_string_pretty(&meta)?);
        }
        Command::ListDomains => print_lines(&store.list_domains().await?),
        Command::ListModels { domain, state } => {
            print_lines(&store.list_models(&domain, state.as_deref()).await?)
        }
        Command::ListStates => print_lines(&store.list_model_states().await?),
        Command::CreateState { state_name } => store.create_model_state(&state_name).await?,
        Command::SetState {
            domain,
            model_id,
            state_name,
        } => store.set_model_state(&domain, &model_id, &state_name).await?,
        Command::UnsetState {
            domain,
            model_id,
            state_name,
        } => {
            store
                .unset_model_state(&domain, &model_id, &state_name)
                .await?
        }
        Command::Delete {
            domain,
            model_id,
            yes,
        } => {
            if !yes {
                let message = format!("Delete model from domain={domain} with model_id={model_id}?");
                let confirmed = inquire::Confirm::new(&message)
                    .with_default(false)
                    .prompt()
                    .map_err(|e| ModelStoreError::ConfigError {
                        message: format!("Prompt failed: {e}"),
                    })?;
                if !confirmed {
                    tracing::info!("Aborting; not deleting model");
                    return Ok(());
                }
            }
            store.delete_model(&domain, &model_id).await?;
            println!("🗑️  Deleted {}={}", domain, model_id);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose, cli.json_logs);
    tracing::debug!("CLI config: {:?}", cli);

    let result = match cli.store.open().await {
        Ok(store) => execute(&store, cli.command).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        tracing::error!("❌ {}", e);
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}
