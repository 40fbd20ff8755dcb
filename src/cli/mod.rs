mod completions;
mod init;
mod rate;
mod search;
mod serve;
mod status;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sterne")]
#[command(about = "Search-and-rate service backed by an Airtable base")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Show detailed progress
    #[arg(long, global = true)]
    verbose: bool,

    /// Proxy through a remote sterne facade instead of calling Airtable
    #[arg(long, global = true, value_name = "URL")]
    server: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize sterne configuration in a directory
    Init(init::InitArgs),

    /// Search people by name
    Search(search::SearchArgs),

    /// Rate a person (create the record if needed)
    Rate(rate::RateArgs),

    /// Run the HTTP facade
    Serve(serve::ServeArgs),

    /// Show configuration and facade health
    Status(status::StatusArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let output = OutputConfig {
            json: self.json,
            quiet: self.quiet,
            verbose: self.verbose,
            server: self.server,
        };

        match self.command {
            Commands::Init(args) => init::run(args, output).await,
            Commands::Search(args) => search::run(args, output).await,
            Commands::Rate(args) => rate::run(args, output).await,
            Commands::Serve(args) => serve::run(args, output).await,
            Commands::Status(args) => status::run(args, output).await,
            Commands::Completions(args) => {
                completions::run(args);
                Ok(())
            }
        }
    }
}

/// Output configuration passed to all commands
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
    pub verbose: bool,
    /// Remote facade URL for thin-client mode
    pub server: Option<String>,
}
