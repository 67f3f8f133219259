use std::{env, process, str::FromStr};

use ragdb_cli::{init_tracing, Registry};
use ragdb_core::config::Settings;
use ragdb_core::types::SearchMode;

const SNIPPET_CHARS: usize = 500;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let settings = Settings::load()?;

    let args: Vec<String> = env::args().skip(1).collect();
    let mut query: Option<String> = None;
    let mut mode = SearchMode::Hybrid;
    let mut limit = 5usize;
    let mut rerank = false;
    let mut show_expansion = false;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--mode" | "-m" => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("Error: --mode requires semantic|bm25|hybrid");
                    process::exit(1);
                };
                match SearchMode::from_str(value) {
                    Ok(m) => mode = m,
                    Err(e) => {
                        eprintln!("Error: {e}");
                        process::exit(1);
                    }
                }
                i += 1;
            }
            "--limit" | "-l" => {
                if let Some(n) = args.get(i + 1).and_then(|v| v.parse::<usize>().ok()) {
                    limit = n;
                    i += 1;
                } else {
                    eprintln!("Error: --limit requires a number");
                    process::exit(1);
                }
            }
            "--rerank" | "-r" => rerank = true,
            "--expand" | "-e" => show_expansion = true,
            other if !other.starts_with('-') => query = Some(other.to_string()),
            _ => {}
        }
        i += 1;
    }
    let Some(query) = query else {
        eprintln!("Usage: ragdb-search '<query>' [--mode semantic|bm25|hybrid] [--limit N] [--rerank] [--expand]");
        process::exit(1);
    };

    let registry = Registry::open(settings)?;
    let engine = registry.engine();

    if show_expansion {
        let terms = engine.expand_query(&query)?;
        println!("Expanded terms: {}", terms.expanded().join(", "));
    }

    let mut results = engine.search(&query, mode, limit)?;
    if rerank {
        results = engine.rerank(&query, results)?;
    }

    println!();
    println!("Search results for \"{query}\" ({mode} mode)");
    println!();
    if results.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    for result in &results {
        let doc = result.document();
        let source = doc.metadata().get("source").map_or("unknown", String::as_str);
        let snippet: String = if doc.content().chars().count() > SNIPPET_CHARS {
            let cut: String = doc.content().chars().take(SNIPPET_CHARS).collect();
            format!("{cut}...")
        } else {
            doc.content().to_string()
        };
        println!("Result {} (score: {:.2})", result.rank() + 1, result.score());
        println!("Source: {source}");
        println!("{snippet}");
        println!();
    }
    Ok(())
}
