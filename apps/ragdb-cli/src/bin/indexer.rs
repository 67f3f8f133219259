use std::{env, path::PathBuf, process};

use ragdb_cli::{init_tracing, Registry};
use ragdb_core::config::Settings;
use ragdb_ingest::discover_sources;
use ragdb_vector::VectorStore;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let settings = Settings::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;

    let args: Vec<String> = env::args().skip(1).collect();
    let mut clear_first = false;
    let mut data_dir: Option<PathBuf> = None;
    let mut limit: Option<usize> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--clear" | "-c" => clear_first = true,
            "--limit" => {
                if let Some(n) = args.get(i + 1).and_then(|v| v.parse::<usize>().ok()) {
                    limit = Some(n);
                    i += 1;
                } else {
                    eprintln!("Error: --limit requires a number");
                    process::exit(1);
                }
            }
            other if !other.starts_with('-') => data_dir = Some(PathBuf::from(other)),
            _ => {}
        }
        i += 1;
    }
    let data_dir = data_dir.unwrap_or_else(|| settings.data_dir.clone());

    println!("ragdb indexer");
    println!("=============");
    println!("Data directory: {}", data_dir.display());
    println!("Index: {} (table '{}')", settings.index_dir.display(), settings.table);

    let registry = Registry::open(settings)?;
    if clear_first {
        println!("Clearing existing index...");
        registry.store.clear()?;
    }

    let extractor = ragdb_ingest::FileExtractor::new();
    let mut sources = discover_sources(&data_dir, &extractor);
    if sources.is_empty() {
        println!("No documents found under {}.", data_dir.display());
        return Ok(());
    }
    if let Some(limit) = limit {
        if sources.len() > limit {
            sources.truncate(limit);
            println!("Limited to first {limit} documents");
        }
    }
    println!("Found {} documents", sources.len());

    let summary = registry.pipeline()?.run(&sources)?;

    println!();
    println!("Indexing complete");
    println!("  Documents: {}", summary.processed_documents);
    println!("  Chunks committed: {}", summary.chunks_committed);
    if summary.chunks_committed < summary.chunks_generated {
        println!(
            "  WARNING: {} of {} generated chunks were not committed",
            summary.chunks_generated - summary.chunks_committed,
            summary.chunks_generated
        );
    }
    println!("  Throughput: {:.1} docs/min", summary.docs_per_minute);
    println!("  Duration: {:.1}s", summary.elapsed_seconds);

    if summary.failed_documents > 0 {
        println!();
        println!("Failed documents ({}):", summary.failed_documents);
        for (filename, error) in &summary.failed_files {
            println!("  - {filename}: {error}");
        }
    }

    let stats = registry.store.stats()?;
    println!();
    println!("Index now holds {} documents", stats.document_count);
    Ok(())
}
