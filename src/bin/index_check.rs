//! Offline sanity check for a similarity index bundle.
//!
//! Loads the bundle with the same validation the server applies at startup and prints what it
//! found, so a freshly exported index can be verified before deploying it.
use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use reportqa::{config::DEFAULT_VECTORSTORE_PATH, index::VectorIndex, logging};

#[derive(Parser)]
#[command(
    name = "index-check",
    about = "Validate a vector index bundle and print its summary"
)]
struct Cli {
    /// Bundle directory containing index.json.
    #[arg(long, default_value = DEFAULT_VECTORSTORE_PATH)]
    path: PathBuf,
    /// Fail unless the bundle was built with this embedding dimension.
    #[arg(long)]
    expected_dimension: Option<usize>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    logging::init_cli_tracing();
    let cli = Cli::parse();

    let index = VectorIndex::load(&cli.path, cli.expected_dimension)
        .with_context(|| format!("failed to load index from {}", cli.path.display()))?;
    let summary = index.summary();
    let metadata_keys: BTreeSet<&str> = index
        .chunks()
        .iter()
        .flat_map(|chunk| chunk.metadata.keys().map(String::as_str))
        .collect();

    println!("path:       {}", cli.path.display());
    println!("chunks:     {}", summary.chunks);
    println!("dimension:  {}", summary.dimension);
    println!("sha256:     {}", summary.digest);
    println!(
        "metadata:   {}",
        if metadata_keys.is_empty() {
            "(none)".to_string()
        } else {
            metadata_keys.into_iter().collect::<Vec<_>>().join(", ")
        }
    );
    Ok(())
}
