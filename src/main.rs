use clap::Parser;
use tracing_subscriber::EnvFilter;

use clopidogrel_advisor::cli::{self, Cli};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let output = cli::run(cli).await?;
    println!("{output}");
    Ok(())
}
