use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::OutputConfig;
use crate::config::Config;

#[derive(Args)]
pub struct ServeArgs {
    /// Directory holding the sterne config (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// HTTP port (defaults to server.port from the config)
    #[arg(long)]
    port: Option<u16>,
}

pub async fn run(args: ServeArgs, _output: OutputConfig) -> Result<()> {
    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("Invalid path: {}", args.path.display()))?;

    let port = match args.port {
        Some(port) => port,
        None => {
            let config_path = Config::config_path(&root);
            if config_path.exists() {
                Config::load(&config_path)?.server.port
            } else {
                Config::default().server.port
            }
        }
    };

    crate::http::run_server(root, port).await
}
