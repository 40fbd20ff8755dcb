use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::OutputConfig;
use crate::airtable::Airtable;
use crate::config::Config;
use crate::http::client::Client;
use crate::session::{SearchView, Selection, Session};
use crate::types::PersonRecord;

#[derive(Args)]
pub struct RateArgs {
    /// Person to rate, e.g. "Anna Muster". Matched like the search box;
    /// the rating is applied when exactly one candidate matches.
    query: Option<String>,

    /// Target a record directly by its Airtable id
    #[arg(long, conflicts_with = "query")]
    id: Option<String>,

    /// Set an absolute rating (clamped to the configured maximum)
    #[arg(long, short = 's', conflicts_with_all = ["up", "down"])]
    stars: Option<u32>,

    /// Raise the rating by one
    #[arg(long, conflicts_with = "down")]
    up: bool,

    /// Lower the rating by one
    #[arg(long)]
    down: bool,

    /// Create a new record when nothing matches the query
    #[arg(long)]
    create: bool,

    /// Directory holding the sterne config (defaults to current directory)
    #[arg(long, default_value = ".")]
    path: PathBuf,
}

#[derive(Serialize)]
struct RateOutput {
    action: String,
    record: PersonRecord,
}

/// Where saves go: straight to Airtable, or through a remote facade.
enum Backend {
    Local(Airtable),
    Remote(Client),
}

impl Backend {
    async fn search(&self, query: &str) -> Result<Vec<PersonRecord>> {
        match self {
            Backend::Local(store) => store.search(query).await.context("Search failed"),
            Backend::Remote(client) => client.search(query).await,
        }
    }

    /// By-id read. The facade exposes no by-id lookup, so remote mode
    /// returns `None` and callers fall back to an absolute rating.
    async fn get(&self, id: &str) -> Result<Option<PersonRecord>> {
        match self {
            Backend::Local(store) => Ok(Some(store.get(id).await.context("Lookup failed")?)),
            Backend::Remote(_) => Ok(None),
        }
    }

    async fn create(&self, first: &str, last: &str, stars: u32) -> Result<PersonRecord> {
        match self {
            Backend::Local(store) => store
                .create_person(first, last, stars)
                .await
                .context("Create failed"),
            Backend::Remote(client) => client.create(first, last, stars).await,
        }
    }

    async fn update(&self, id: &str, stars: u32) -> Result<PersonRecord> {
        match self {
            Backend::Local(store) => store
                .update_rating(id, stars)
                .await
                .context("Update failed"),
            Backend::Remote(client) => client.update(id, stars).await,
        }
    }
}

pub async fn run(args: RateArgs, output: OutputConfig) -> Result<()> {
    let (backend, max_stars, revert_on_failure) = if let Some(ref server_url) = output.server {
        let client = Client::new(server_url);
        let status = client.status().await?;
        (Backend::Remote(client), status.max_stars, false)
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
        (
            Backend::Local(store),
            config.ratings.max_stars,
            config.client.revert_on_failure,
        )
    };

    let mut session = Session::new(max_stars, revert_on_failure);

    if let Some(ref id) = args.id {
        select_by_id(&mut session, &backend, id, &args).await?;
    } else {
        let Some(ref query) = args.query else {
            bail!("Give a name to search for, or a record via --id.");
        };
        select_by_query(&mut session, &backend, query, &args, &output).await?;
    }

    let was_new = matches!(session.selection(), Some(Selection::New { .. }));

    // Apply the edit; a step beyond the bound is a no-op and triggers no save
    let changed = if let Some(stars) = args.stars {
        session.set_stars(stars)
    } else if args.up {
        session.increment()
    } else if args.down {
        session.decrement()
    } else {
        false
    };

    // Only a fresh create has something to persist without an edit
    if !changed && !was_new {
        if output.json {
            println!(r#"{{"action": "unchanged"}}"#);
        } else if !output.quiet {
            println!("{} Nothing to save (rating unchanged).", "·".dimmed());
        }
        return Ok(());
    }

    let request = session.begin_save().context("Nothing selected to save")?;

    let result = match request.record_id.as_deref() {
        Some(id) => backend.update(id, request.stars).await,
        None => {
            backend
                .create(&request.first_name, &request.last_name, request.stars)
                .await
        }
    };

    let record = match result {
        Ok(record) => {
            // Adopt the datastore-assigned id; a later edit in the same
            // process would target update, never a duplicate create
            session.save_succeeded(record.clone());
            record
        }
        Err(err) => {
            session.save_failed();
            return Err(err);
        }
    };

    let action = if was_new { "created" } else { "updated" };
    if output.json {
        let json_output = RateOutput {
            action: action.to_string(),
            record,
        };
        println!("{}", serde_json::to_string_pretty(&json_output)?);
    } else if !output.quiet {
        println!(
            "{} {} {} · {} Sterne",
            "✓".green(),
            if was_new { "Created" } else { "Updated" },
            record.fields.display_name().blue(),
            record.fields.stars.to_string().yellow()
        );
        if output.verbose {
            println!("  id: {}", record.id.dimmed());
        }
    }

    Ok(())
}

async fn select_by_id(
    session: &mut Session,
    backend: &Backend,
    id: &str,
    args: &RateArgs,
) -> Result<()> {
    match backend.get(id).await? {
        Some(record) => session.select_record(record),
        None => {
            // No baseline rating available for a relative edit
            if args.stars.is_none() {
                bail!(
                    "--up/--down need a local config to read the current rating; \
                     use --stars together with --server"
                );
            }
            // Unknown baseline: the absolute set must always be written
            session.select_unrated(id.to_string());
        }
    }
    Ok(())
}

async fn select_by_query(
    session: &mut Session,
    backend: &Backend,
    query: &str,
    args: &RateArgs,
    output: &OutputConfig,
) -> Result<()> {
    let Some(seq) = session.begin_search(query) else {
        bail!("Query must not be empty.");
    };
    let records = backend.search(query).await?;
    session.apply_results(seq, records);

    match session.view().clone() {
        SearchView::Results(records) if records.len() == 1 => {
            session.select(0);
            Ok(())
        }
        SearchView::Results(records) => {
            if !output.quiet && !output.json {
                println!(
                    "{} {} candidates match {}:",
                    "!".yellow(),
                    records.len(),
                    query.cyan()
                );
                for record in &records {
                    println!(
                        "  {} · {} Sterne · --id {}",
                        record.fields.display_name().blue(),
                        record.fields.stars,
                        record.id.dimmed()
                    );
                }
            }
            bail!("Ambiguous match; pick one with --id.")
        }
        SearchView::NoMatch => {
            if !args.create {
                bail!("No match for '{query}'. Pass --create to add a new entry.");
            }
            session.start_new(query);
            Ok(())
        }
        _ => bail!("Search produced no usable result."),
    }
}
