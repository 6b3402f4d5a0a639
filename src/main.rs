//! ChatNoir front end command line client
//!
//! This is the main entry point for the application.

use anyhow::{Context, Result};
use chatnoir_frontend::{
    common::{abbreviate_url, ABBREVIATION},
    config::Settings,
    QueryParams, RequestOptions, SearchModel, Session,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "chatnoir-frontend", version, about = "Search the ChatNoir API from the terminal")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "CHATNOIR_SETTINGS_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a search and print the results
    Search {
        /// Query text
        query: Option<String>,
        /// Index to search, may be given more than once
        #[arg(short, long)]
        index: Vec<String>,
        /// 1-based result page
        #[arg(short, long)]
        page: Option<String>,
        /// Results per page
        #[arg(long)]
        page_size: Option<u32>,
        /// Take query, index and page from a URL query string
        #[arg(long, value_name = "QS")]
        query_string: Option<String>,
        /// Print the raw API response as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the indices available for searching
    Indices,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    info!("Starting chatnoir-frontend v{}", chatnoir_frontend::VERSION);

    let settings = load_settings(cli.config)?;
    info!("Using backend {}", settings.backend.address);

    let session = Session::connect(&settings)
        .await
        .context("Failed to set up backend session")?;

    match cli.command {
        Command::Search {
            query,
            index,
            page,
            page_size,
            query_string,
            json,
        } => {
            let mut params = query_string
                .as_deref()
                .map(QueryParams::parse)
                .unwrap_or_default();
            if let Some(query) = query {
                params.q = Some(query);
            }
            if !index.is_empty() {
                params.index = Some(index.into());
            }
            if let Some(page) = page {
                params.p = Some(page);
            }

            let mut model = SearchModel::from_settings(&settings.search);
            model.init_state(&session).await?;
            model.update_from_query_string(&params);
            if let Some(size) = page_size {
                model = model.with_page_size(size);
            }

            if json {
                let response = model.search(&session, RequestOptions::new()).await?;
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                model
                    .search_and_update(&session, RequestOptions::new())
                    .await?;
                print_results(&model);
            }
        }
        Command::Indices => {
            for index in session.available_indices().await? {
                let marker = if index.selected { "*" } else { " " };
                println!("{} {:<20} {}", marker, index.id, index.name);
            }
        }
    }

    Ok(())
}

/// Load settings from file or use defaults
fn load_settings(explicit: Option<PathBuf>) -> Result<Settings> {
    if let Some(path) = explicit {
        info!("Loading settings from: {}", path.display());
        let mut settings = Settings::from_file(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        settings.merge_env();
        return Ok(settings);
    }

    // Check for settings file in various locations
    let paths = [
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
        dirs::config_dir()
            .map(|p| p.join("chatnoir-frontend/settings.yml"))
            .unwrap_or_default(),
    ];

    for path in paths.iter() {
        if path.is_file() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    // Use defaults
    info!("No settings file found, using defaults");
    let mut settings = Settings::default();
    settings.merge_env();
    Ok(settings)
}

/// Print one block per hit plus a pagination footer
fn print_results(model: &SearchModel) {
    let Some(ref response) = model.response else {
        return;
    };

    if let Some(total) = response.meta.total_results {
        println!("About {} results\n", total);
    }

    for hit in &response.results {
        let title = hit.get("title").and_then(|v| v.as_str()).unwrap_or("(untitled)");
        let url = hit
            .get("targetUri")
            .or_else(|| hit.get("url"))
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let display_url = abbreviate_url(url, 3, 40, ABBREVIATION).unwrap_or_else(|_| url.to_string());

        println!("{}", title);
        println!("  {}", display_url);
        if let Some(snippet) = hit.get("snippet").and_then(|v| v.as_str()) {
            println!("  {}", snippet);
        }
        println!();
    }

    println!("Page {} of {}", model.page, model.max_page());
    if model.page < model.max_page() {
        let next = model.clone().with_page(i64::from(model.page) + 1);
        println!("Next: ?{}", next.to_query_string());
    }
}
