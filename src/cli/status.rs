use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::OutputConfig;
use crate::config::Config;

#[derive(Args)]
pub struct StatusArgs {
    /// Directory holding the sterne config (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,
}

#[derive(Serialize)]
struct StatusOutput {
    status: String,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    table_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_stars: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    track_log: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key_resolved: Option<bool>,
}

pub async fn run(args: StatusArgs, output: OutputConfig) -> Result<()> {
    // Thin-client mode: report remote facade health
    if let Some(ref server_url) = output.server {
        return run_remote(output.clone(), server_url).await;
    }

    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("Invalid path: {}", args.path.display()))?;

    let config_path = Config::config_path(&root);
    if !config_path.exists() {
        if output.json {
            let json_output = StatusOutput {
                status: "not_initialized".to_string(),
                path: root.display().to_string(),
                base_id: None,
                table_id: None,
                max_stars: None,
                track_log: None,
                api_key_resolved: None,
            };
            println!("{}", serde_json::to_string_pretty(&json_output)?);
        } else if !output.quiet {
            println!(
                "{} Sterne not initialized in {}",
                "!".yellow(),
                root.display()
            );
            println!("Run `sterne init` to initialize.");
        }
        return Ok(());
    }

    let config = Config::load(&config_path).context("Failed to load configuration")?;
    let key_resolved = config.airtable.resolve_api_key().is_some();

    if output.json {
        let json_output = StatusOutput {
            status: "ready".to_string(),
            path: config_path.display().to_string(),
            base_id: Some(config.airtable.base_id.clone()),
            table_id: Some(config.airtable.table_id.clone()),
            max_stars: Some(config.ratings.max_stars),
            track_log: Some(config.ratings.track_log),
            api_key_resolved: Some(key_resolved),
        };
        println!("{}", serde_json::to_string_pretty(&json_output)?);
    } else if !output.quiet {
        println!("{} Sterne status for {}", "✓".green(), root.display());
        println!();
        println!(
            "  Base/table: {} / {}",
            or_unset(&config.airtable.base_id),
            or_unset(&config.airtable.table_id)
        );
        println!(
            "  Max stars:  {}",
            config.ratings.max_stars.to_string().cyan()
        );
        println!(
            "  Change log: {}",
            if config.ratings.track_log {
                "on".green()
            } else {
                "off".yellow()
            }
        );
        println!(
            "  Debounce:   {} ms",
            config.search.debounce_ms.to_string().cyan()
        );
        println!(
            "  API key:    {}",
            if key_resolved {
                "resolved".green()
            } else {
                "not resolved".red()
            }
        );
    }

    Ok(())
}

fn or_unset(value: &str) -> colored::ColoredString {
    if value.is_empty() {
        "(unset)".red()
    } else {
        value.cyan()
    }
}

/// Report health via the remote facade.
async fn run_remote(output: OutputConfig, server_url: &str) -> Result<()> {
    use crate::http::client::Client;

    let client = Client::new(server_url);
    let resp = client.status().await?;

    if output.json {
        let json_output = StatusOutput {
            status: resp.status,
            path: server_url.to_string(),
            base_id: None,
            table_id: None,
            max_stars: Some(resp.max_stars),
            track_log: Some(resp.track_log),
            api_key_resolved: None,
        };
        println!("{}", serde_json::to_string_pretty(&json_output)?);
    } else if !output.quiet {
        println!("{} Sterne status via {}", "✓".green(), server_url);
        println!();
        println!("  Status:     {}", resp.status.green());
        println!("  Table:      {}", resp.table.cyan());
        println!("  Max stars:  {}", resp.max_stars.to_string().cyan());
        println!(
            "  Change log: {}",
            if resp.track_log {
                "on".green()
            } else {
                "off".yellow()
            }
        );
        println!(
            "  Debounce:   {} ms",
            resp.debounce_ms.to_string().cyan()
        );
        println!(
            "  Status msg: {} ms",
            resp.status_clear_ms.to_string().cyan()
        );
    }

    Ok(())
}
