use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::OutputConfig;
use crate::config::Config;

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Overwrite existing configuration
    #[arg(long)]
    force: bool,
}

#[derive(Serialize)]
struct InitOutput {
    status: String,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<String>,
}

pub async fn run(args: InitArgs, output: OutputConfig) -> Result<()> {
    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("Invalid path: {}", args.path.display()))?;

    let data_dir = Config::data_dir(&root);
    let config_path = Config::config_path(&root);

    // Check if already initialized
    if config_path.exists() && !args.force {
        if output.json {
            let json_output = InitOutput {
                status: "already_initialized".to_string(),
                path: data_dir.display().to_string(),
                config: Some(config_path.display().to_string()),
            };
            println!("{}", serde_json::to_string_pretty(&json_output)?);
        } else {
            bail!(
                "Sterne already initialized in {}. Use --force to reinitialize.",
                data_dir.display()
            );
        }
        return Ok(());
    }

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

    let config = Config::default();
    config.save(&config_path)?;

    if output.verbose && !output.quiet && !output.json {
        println!("  Creating config: {}", config_path.display());
    }

    // Add .sterne to .gitignore if it exists — the config may end up
    // holding a literal API token
    let gitignore_path = root.join(".gitignore");
    if gitignore_path.exists() {
        let content = std::fs::read_to_string(&gitignore_path)?;
        if !content.contains(".sterne") {
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(&gitignore_path)?;
            use std::io::Write;
            writeln!(file, "\n# Sterne configuration\n.sterne/")?;

            if output.verbose && !output.quiet && !output.json {
                println!("  Updated .gitignore");
            }
        }
    }

    if output.json {
        let json_output = InitOutput {
            status: "initialized".to_string(),
            path: data_dir.display().to_string(),
            config: Some(config_path.display().to_string()),
        };
        println!("{}", serde_json::to_string_pretty(&json_output)?);
    } else if !output.quiet {
        println!(
            "{} Sterne initialized in {}",
            "✓".green(),
            data_dir.display()
        );
        println!("  Config: {}", config_path.display());
        println!("\nNext steps:");
        println!(
            "  set {} in the config, export {}",
            "airtable.base_id / airtable.table_id".cyan(),
            "AIRTABLE_TOKEN".cyan()
        );
        println!("  {} to find a person", "sterne search <name>".cyan());
        println!("  {} to run the facade", "sterne serve".cyan());
    }

    Ok(())
}
