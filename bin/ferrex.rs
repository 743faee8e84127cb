use anyhow::Result;
use clap::Parser;
use ferrex::config::{DEFAULT_INDEX_TIMEOUT_SECS, DEFAULT_MAX_RESULTS};
use ferrex::{EngineConfig, ProcessingEngine};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "ferrex")]
#[command(about = "Parallel file indexing & keyword search engine", long_about = None)]
struct Args {
    /// Number of indexing worker threads (defaults to CPU count)
    #[arg(long, env = "FERREX_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Maximum number of search results to return
    #[arg(long, env = "FERREX_MAX_RESULTS", default_value_t = DEFAULT_MAX_RESULTS)]
    max_results: usize,

    /// Seconds to wait for an indexing pass before giving up
    #[arg(long, env = "FERREX_INDEX_TIMEOUT_SECS", default_value_t = DEFAULT_INDEX_TIMEOUT_SECS)]
    index_timeout_secs: u64,

    /// Folder to index before entering the interactive shell
    #[arg(long, env = "FERREX_INDEX")]
    index: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Starting Ferrex v{}", ferrex::VERSION);

    let mut config = EngineConfig::default()
        .with_max_results(args.max_results)
        .with_index_timeout_secs(args.index_timeout_secs);
    if let Some(threads) = args.worker_threads {
        config = config.with_worker_threads(threads);
    }

    info!("Engine configuration:");
    info!("  Worker threads: {}", config.worker_threads);
    info!("  Max results: {}", config.max_results);
    info!("  Index timeout: {}s", config.index_timeout_secs);

    let engine = ProcessingEngine::new(config);

    if let Some(root) = &args.index {
        run_index(&engine, root);
    }

    println!("Type 'help' for available commands.");

    let stdin = io::stdin();
    let mut input = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;

        input.clear();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };

        match command {
            "quit" | "exit" => break,
            "index" => {
                let rest: Vec<&str> = parts.collect();
                if rest.len() != 1 {
                    println!("Invalid index command. Usage: index <folderPath>");
                    continue;
                }
                run_index(&engine, Path::new(rest[0]));
            }
            "search" => {
                let terms: Vec<&str> = parts.collect();
                if terms.is_empty() {
                    println!("Invalid search command. Usage: search <term1> <term2> ...");
                    continue;
                }
                run_search(&engine, &terms);
            }
            "stats" => print_stats(&engine),
            "help" => print_help(),
            _ => println!("unrecognized command!"),
        }
    }

    Ok(())
}

fn run_index(engine: &ProcessingEngine, root: &Path) {
    match engine.index_files(root) {
        Ok(outcome) => {
            println!(
                "Indexing completed in {:.2} seconds. Total bytes read: {}",
                outcome.elapsed.as_secs_f64(),
                outcome.total_bytes_read
            );
            if !outcome.failures.is_empty() {
                println!("Failed to process {} file(s).", outcome.failures.len());
                for failure in &outcome.failures {
                    warn!(
                        path = %failure.path.display(),
                        error = %failure.error,
                        "indexing failure"
                    );
                }
            }
        }
        Err(e) => println!("Indexing failed: {}", e),
    }
}

fn run_search(engine: &ProcessingEngine, terms: &[&str]) {
    match engine.search_files(terms) {
        Ok(outcome) => {
            println!(
                "Search completed in {:.2} seconds.",
                outcome.elapsed.as_secs_f64()
            );
            println!("Top {} search results:", engine.config().max_results);
            for hit in &outcome.hits {
                println!("{} (Frequency: {})", hit.path.display(), hit.frequency);
            }
        }
        Err(e) => println!("Search failed: {}", e),
    }
}

fn print_stats(engine: &ProcessingEngine) {
    let store = engine.store();
    println!("Documents: {}", store.document_count());
    println!("Terms: {}", store.term_count());
    println!("Postings: {}", store.posting_count());
}

fn print_help() {
    println!("Available commands:");
    println!("  index <folderPath>            index every file under a folder");
    println!("  search <term1> <term2> ...    search indexed files by keyword");
    println!("  stats                         show index size counters");
    println!("  help                          show this help");
    println!("  quit                          exit the shell");
}
