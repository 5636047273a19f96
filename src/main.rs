use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use model_registrar::{Backoff, Config, Registrar, RegistryBackend};

#[derive(Parser)]
struct Cli {
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Handle a single event and print the response.
    Invoke {
        /// Event JSON file; reads stdin when absent or `-`.
        #[arg(short, long)]
        event: Option<PathBuf>,
    },
    /// Serve invocations over HTTP.
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .init();

    // load configuration
    let config = Config::load(cli.config_file.as_deref())?;

    // initialize registry client
    let registry = match &config.registry {
        RegistryBackend::SageMaker(cfg) => cfg.new_registry().await?,
    };
    let registrar = Registrar::new(
        registry,
        Backoff::from(&config.retry),
        config.descriptions.clone(),
    );

    match cli.command {
        Command::Invoke { event } => {
            let mut s = String::new();
            match event {
                Some(path) if path.as_os_str() != "-" => {
                    File::open(path)?.read_to_string(&mut s)?;
                }
                _ => {
                    std::io::stdin().read_to_string(&mut s)?;
                }
            }
            let event: serde_json::Value = serde_json::from_str(&s)?;
            let response = registrar.handle_request(event).await?;
            println!("{}", serde_json::to_string(&response)?);
        }
        Command::Serve => {
            model_registrar::http::serve(Arc::new(registrar), config.listen).await?;
        }
    }

    Ok(())
}
