use anyhow::Result;
use clap::Parser;

mod args;
mod cmd;
mod keys;
mod output;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = args::Cli::parse();
    output::init_logging(cli.json_logs);

    cmd::dispatch(cli).await
}
