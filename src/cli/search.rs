use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::OutputConfig;
use crate::airtable::Airtable;
use crate::config::Config;
use crate::types::PersonRecord;

#[derive(Args)]
pub struct SearchArgs {
    /// Free-text name query
    query: String,

    /// Directory holding the sterne config (defaults to current directory)
    #[arg(long, default_value = ".")]
    path: PathBuf,
}

/// JSON output format for search results
#[derive(Serialize)]
struct SearchOutput {
    query: String,
    count: usize,
    results: Vec<PersonRecord>,
}

pub async fn run(args: SearchArgs, output: OutputConfig) -> Result<()> {
    let records = if let Some(ref server_url) = output.server {
        // Thin-client mode: proxy through remote facade
        crate::http::client::Client::new(server_url)
            .search(&args.query)
            .await?
    } else {
        let root = args
            .path
            .canonicalize()
            .with_context(|| format!("Invalid path: {}", args.path.display()))?;

        let config_path = Config::config_path(&root);
        if !config_path.exists() {
            bail!(
                "Sterne not initialized in {}. Run `sterne init` first.",
                root.display()
            );
        }

        let config = Config::load(&config_path).context("Failed to load configuration")?;
        let store = Airtable::new(&config).context("Failed to build Airtable client")?;
        store.search(&args.query).await.context("Search failed")?
    };

    if output.json {
        let json_output = SearchOutput {
            query: args.query,
            count: records.len(),
            results: records,
        };
        println!("{}", serde_json::to_string_pretty(&json_output)?);
    } else if !output.quiet {
        print_human_output(&args.query, &records, output.verbose);
    }

    Ok(())
}

fn print_human_output(query: &str, records: &[PersonRecord], verbose: bool) {
    if records.is_empty() {
        println!("{} No match for: {}", "!".yellow(), query.cyan());
        println!("Use {} to add a new entry.", "sterne rate <name> --create".cyan());
        return;
    }

    println!(
        "{} Found {} candidates for: {}",
        "✓".green(),
        records.len(),
        query.cyan()
    );
    println!();

    for (i, record) in records.iter().enumerate() {
        println!(
            "{}. {} · {} Sterne",
            (i + 1).to_string().bold(),
            record.fields.display_name().blue(),
            record.fields.stars.to_string().yellow()
        );

        if verbose {
            println!("   id: {}", record.id.dimmed());
            if let Some(ref short_id) = record.fields.short_id {
                println!("   ref: {}", short_id.dimmed());
            }
            if let Some(ref log) = record.fields.log {
                for line in log.lines().take(3) {
                    println!("   {}", line.dimmed());
                }
            }
        }
    }
}
