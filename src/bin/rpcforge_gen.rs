use clap::Parser;
use rpcforge::cli::{run_cli, Cli};
use rpcforge::logging::{init_logging, LogConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut log_config = LogConfig::from_env();
    if cli.verbose {
        log_config = log_config.verbose();
    }
    let _guard = init_logging(&log_config)?;
    run_cli(cli).await
}
