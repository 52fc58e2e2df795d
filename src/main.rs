use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use git_ingest::cli::{run_mcp_server, run_read, run_tree, Args, Command};
use git_ingest::{Config, Ingestor};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    args.apply_overrides(&mut config);

    // stdout carries the MCP transport, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.log_filter(&config))),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let ingestor = Ingestor::from_config(&config);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => run_mcp_server(ingestor).await?,
        Command::Tree { repo_url, json } => run_tree(&ingestor, &repo_url, json).await?,
        Command::Read {
            repo_url,
            paths,
            json,
        } => run_read(&ingestor, &repo_url, &paths, json).await?,
    }

    Ok(())
}
