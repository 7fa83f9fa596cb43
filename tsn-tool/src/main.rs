use anyhow::{Context, Result};
use std::{env, path::PathBuf};
use structopt::StructOpt;
use tsn_tool::{config::Config, Command};

#[derive(Debug, Clone, StructOpt)]
/// Inspect a temporal segment network dataset
struct Args {
    #[structopt(long, default_value = "tsn.json5")]
    /// configuration file
    pub config_file: PathBuf,
    #[structopt(subcommand)]
    pub command: Command,
}

#[tokio::main]
pub async fn main() -> Result<()> {
    // setup logging
    let filters = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();

    // parse arguments
    let Args {
        config_file,
        command,
    } = Args::from_args();
    let config = Config::open(&config_file)
        .with_context(|| format!("failed to load config file '{}'", config_file.display()))?;

    tsn_tool::start(config, command).await?;

    Ok(())
}
