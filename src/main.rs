use std::path::PathBuf;

use clap::Parser;
use shopsim::{run, RunOptions};

/// Simulated shopping service with latency and failure injection.
#[derive(Debug, Parser)]
#[command(name = "shopping-app", version)]
struct Cli {
    /// Address to listen on (overrides LISTEN_ADDR)
    #[arg(long)]
    addr: Option<String>,

    /// YAML file with chaos overrides, watched for changes (overrides CHAOS_CONFIG_PATH)
    #[arg(long)]
    chaos_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    run(RunOptions {
        addr: cli.addr,
        chaos_config: cli.chaos_config,
    })
    .await
}
