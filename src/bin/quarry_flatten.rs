//! quarry-flatten: Flatten nested JSON into a table via dotted key-paths
//!
//! Usage:
//!   # Flatten a JSON array file to CSV on stdout
//!   quarry-flatten results.json --paths title,snippet,pagemap.cse_image.0.src
//!
//!   # Read NDJSON from stdin, write JSON lines
//!   cat items.jsonl | quarry-flatten --ndjson --paths id,name --format jsonl
//!
//!   # Write to a file
//!   quarry-flatten results.json --paths title,link -o table.csv

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use quarry::export;
use quarry::flatten::Flattener;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read, Write};

#[derive(Parser, Debug)]
#[command(name = "quarry-flatten")]
#[command(about = "Flatten nested JSON into a table via dotted key-paths", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Comma-separated key-paths to extract, in column order
    #[arg(long, short = 'p', required = true)]
    paths: String,

    /// Treat input as newline-delimited JSON (one item per line)
    #[arg(long)]
    ndjson: bool,

    /// Output file (stdout if omitted)
    #[arg(long, short = 'o')]
    output: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "csv")]
    format: Format,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Jsonl,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let paths: Vec<String> = args
        .paths
        .split(',')
        .map(|s| s.trim().to_string())
        .collect();
    let flattener = Flattener::new(&paths).context("Invalid key-path")?;

    let items = read_items(args.input.as_deref(), args.ndjson)?;
    let table = flattener.table(&items);

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create {}", path))?,
        ),
        None => Box::new(std::io::stdout()),
    };

    match args.format {
        Format::Csv => export::write_table(&table, writer)?,
        Format::Jsonl => export::write_table_jsonl(&table, writer)?,
    }

    Ok(())
}

/// Read items from a file or stdin.
///
/// Tries SIMD parsing of the whole input first (a top-level array becomes
/// one item per element, anything else a single item), falling back to
/// line-by-line serde_json for NDJSON or when SIMD parsing fails.
fn read_items(input: Option<&str>, ndjson: bool) -> Result<Vec<Value>> {
    let mut content = Vec::new();
    match input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("Failed to open {}", path))?;
            BufReader::new(file).read_to_end(&mut content)?;
        }
        None => {
            std::io::stdin().read_to_end(&mut content)?;
        }
    }

    if ndjson {
        return parse_lines(&content);
    }

    match simd_json::to_owned_value(&mut content.clone()) {
        Ok(simd_json::OwnedValue::Array(arr)) => {
            let mut items = Vec::with_capacity(arr.len());
            for elem in arr.iter() {
                let json_str = simd_json::to_string(elem)?;
                items.push(serde_json::from_str(&json_str)?);
            }
            Ok(items)
        }
        Ok(elem) => {
            let json_str = simd_json::to_string(&elem)?;
            Ok(vec![serde_json::from_str(&json_str)?])
        }
        Err(_) => parse_lines(&content),
    }
}

fn parse_lines(content: &[u8]) -> Result<Vec<Value>> {
    let content_str = String::from_utf8_lossy(content);
    let mut items = Vec::new();
    for line in content_str.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value =
            serde_json::from_str(line).context("Failed to parse JSON line")?;
        items.push(value);
    }
    Ok(items)
}
