//! quarry-fetch: Pull records from the upstream APIs and export them
//!
//! Usage:
//!   # Corporate registry lookups (token from flag or QUARRY_REGISTRY_TOKEN)
//!   quarry-fetch registry 7010401001556 7011001029649
//!
//!   # Web search (credentials from flags or QUARRY_SEARCH_KEY / QUARRY_SEARCH_ENGINE)
//!   quarry-fetch search "acme corp fraud" --pages 2
//!
//! Raw responses land under <data-dir>/response/, flattened CSV tables
//! under <data-dir>/result/, both with a YYYYMMDD stamp in the name.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use quarry::export;
use quarry::fetch::{RegistryClient, RegistryConfig, SearchClient, SearchConfig};
use quarry::flatten::{Flattener, Table};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

/// Columns extracted from a registry record by default.
const REGISTRY_PATHS: &[&str] = &[
    "corporate_number",
    "name",
    "location",
    "employee_number",
    "capital_stock_summary.capital_stock",
    "date_of_establishment",
    "company_url",
    "business_summary",
];

/// Columns extracted from a search result by default. The keyword is
/// injected into each item before flattening so it rides along as a column.
const SEARCH_PATHS: &[&str] = &["keyword", "title", "link", "snippet"];

#[derive(Parser, Debug)]
#[command(name = "quarry-fetch")]
#[command(about = "Fetch records from the upstream APIs and export them as tables", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Base directory for response snapshots and result tables
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Override the default key-paths (comma-separated)
    #[arg(long, short = 'p')]
    paths: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up companies in the corporate registry by 13-digit number
    Registry {
        /// Corporate numbers to look up
        #[arg(value_name = "NUMBER", required = true)]
        numbers: Vec<String>,

        /// Registry API token (falls back to QUARRY_REGISTRY_TOKEN)
        #[arg(long)]
        api_token: Option<String>,

        /// Sleep between lookups, in milliseconds
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
    },

    /// Run web searches and tabulate the result entries
    Search {
        /// Keywords to search for, one table section per keyword
        #[arg(value_name = "KEYWORD", required = true)]
        keywords: Vec<String>,

        /// Search API key (falls back to QUARRY_SEARCH_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// Search engine id (falls back to QUARRY_SEARCH_ENGINE)
        #[arg(long)]
        engine_id: Option<String>,

        /// Result pages to fetch per keyword
        #[arg(long, default_value_t = 1)]
        pages: u32,

        /// Results per page (the API caps this at 10)
        #[arg(long, default_value_t = 10)]
        per_page: u32,

        /// Result language restriction
        #[arg(long, default_value = "lang_ja")]
        language: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Registry {
            ref numbers,
            ref api_token,
            interval_ms,
        } => run_registry(&args, numbers, api_token.as_deref(), interval_ms),
        Command::Search {
            ref keywords,
            ref api_key,
            ref engine_id,
            pages,
            per_page,
            ref language,
        } => run_search(
            &args,
            keywords,
            api_key.as_deref(),
            engine_id.as_deref(),
            pages,
            per_page,
            language,
        ),
    }
}

fn run_registry(
    args: &Args,
    numbers: &[String],
    api_token: Option<&str>,
    interval_ms: u64,
) -> Result<()> {
    let config = RegistryConfig {
        api_token: credential(api_token, "QUARRY_REGISTRY_TOKEN", "registry API token")?,
        request_interval: Duration::from_millis(interval_ms),
        ..RegistryConfig::default()
    };
    let client = RegistryClient::new(config)?;

    let items = client.fetch_all(numbers);
    if items.is_empty() {
        bail!("no registry records could be fetched");
    }

    let snapshot = export::write_snapshot(
        &items,
        args.data_dir.join("response"),
        &export::dated_filename("registry_response", "json"),
    )?;
    println!("snapshot: {}", snapshot.display());

    let flattener = flattener_for(args, REGISTRY_PATHS)?;
    let table = flattener.table(&items);
    write_result(args, &table, "registry_result")
}

fn run_search(
    args: &Args,
    keywords: &[String],
    api_key: Option<&str>,
    engine_id: Option<&str>,
    pages: u32,
    per_page: u32,
    language: &str,
) -> Result<()> {
    let config = SearchConfig {
        api_key: credential(api_key, "QUARRY_SEARCH_KEY", "search API key")?,
        engine_id: credential(engine_id, "QUARRY_SEARCH_ENGINE", "search engine id")?,
        page_limit: pages,
        per_page,
        language: language.to_string(),
        ..SearchConfig::default()
    };
    let client = SearchClient::new(config)?;
    let flattener = flattener_for(args, SEARCH_PATHS)?;

    let mut combined: Option<Table> = None;

    for keyword in keywords {
        let items = client.search(keyword);

        export::write_snapshot(
            &items,
            args.data_dir.join("response"),
            &export::dated_filename("search_response", "json"),
        )?;

        let tagged = tag_keyword(items, keyword);
        let table = flattener.table(&tagged);
        match combined.as_mut() {
            Some(all) => all.append(table),
            None => combined = Some(table),
        }
    }

    let table = combined.unwrap_or_else(|| flattener.table(&[]));
    if table.is_empty() {
        bail!("no search results could be fetched");
    }
    write_result(args, &table, "search_result")
}

/// Resolve a credential from a flag, then the environment.
fn credential(flag: Option<&str>, env_var: &str, what: &str) -> Result<String> {
    if let Some(value) = flag {
        return Ok(value.to_string());
    }
    std::env::var(env_var).with_context(|| format!("{} not set (tried ${})", what, env_var))
}

fn flattener_for(args: &Args, defaults: &[&str]) -> Result<Flattener> {
    let paths: Vec<String> = match &args.paths {
        Some(raw) => raw.split(',').map(|s| s.trim().to_string()).collect(),
        None => defaults.iter().map(|s| s.to_string()).collect(),
    };
    Flattener::new(&paths).context("Invalid key-path")
}

/// Attach the originating keyword to each result item so it can be
/// extracted like any other column.
fn tag_keyword(items: Vec<Value>, keyword: &str) -> Vec<Value> {
    items
        .into_iter()
        .map(|mut item| {
            if let Value::Object(map) = &mut item {
                map.insert("keyword".to_string(), Value::String(keyword.to_string()));
            }
            item
        })
        .collect()
}

fn write_result(args: &Args, table: &Table, prefix: &str) -> Result<()> {
    let path = args
        .data_dir
        .join("result")
        .join(export::dated_filename(prefix, "csv"));
    export::write_table_to_path(table, &path)?;
    println!("result: {} ({} rows)", path.display(), table.rows().len());
    Ok(())
}
