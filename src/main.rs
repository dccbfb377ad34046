use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, info, warn};

use seqsearch::input::{is_dna, parse_keywords, read_text};
use seqsearch::{
    tree_graph, CompressedSuffixTrie, ErrorBudget, Matches, PatternTrie, SearchConfig, TreeView,
    DEFAULT_MAX_STATES, DEFAULT_SENTINEL,
};

/// Exact and approximate keyword search over a DNA text.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Text file to index (plain lines, FASTA or FASTQ, optionally .gz)
    #[arg(long)]
    file: String,

    /// Comma separated keywords
    #[arg(long)]
    keywords: String,

    /// Maximum number of errors per match
    #[arg(long, allow_negative_numbers = true)]
    k: i64,

    /// Sentinel appended to the text before building the suffix trie
    #[arg(long, default_value_t = DEFAULT_SENTINEL)]
    sentinel: char,

    /// Maximum traversal states per search call
    #[arg(long, default_value_t = DEFAULT_MAX_STATES)]
    max_states: usize,

    /// Disable state memoization in the approximate suffix search
    #[arg(long)]
    no_memo: bool,

    /// Worker threads for searching keywords in the suffix trie
    #[arg(long, default_value_t = num_cpus::get())]
    threads: usize,

    /// Print match positions, not only counts
    #[arg(long)]
    positions: bool,

    /// Write the keyword trie as a JSON node/edge list
    #[arg(long)]
    keyword_graph_json: Option<String>,

    /// Write the compressed suffix trie as a JSON node/edge list
    #[arg(long)]
    suffix_graph_json: Option<String>,

    /// Verbose/info output (default: quiet)
    #[arg(long, short = 'v', alias = "info")]
    verbose: bool,

    /// Debug output
    #[arg(long)]
    debug: bool,

    /// Trace output
    #[arg(long)]
    trace: bool,
}

/// Search results of one run, per index.
#[derive(Debug)]
struct Report {
    keyword_hits: Matches,
    suffix_hits: Vec<(String, Vec<usize>)>,
}

fn main() {
    let args = Args::parse();
    let log_level = if args.trace {
        "trace"
    } else if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "error"
    };
    env_logger::Builder::new().parse_filters(log_level).init();

    match run(&args) {
        Ok(report) => debug!(
            "{} keywords hit in the keyword trie, {} patterns searched in the suffix trie",
            report.keyword_hits.len(),
            report.suffix_hits.len()
        ),
        Err(error) => {
            eprintln!("Search failed: {error:?}");
            std::process::exit(1);
        }
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn write_graph(tree: &impl TreeView, path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let graph = tree_graph(tree);
    let mut file = File::create(path).with_context(|| format!("Failed to create {path}"))?;
    writeln!(file, "{}", graph.to_json_pretty()?)?;
    info!("Tree graph with {} nodes written to {}", graph.nodes.len(), path);
    Ok(())
}

fn run(args: &Args) -> Result<Report> {
    let max_errors = ErrorBudget::try_from(args.k)?.get();
    let config = SearchConfig {
        sentinel: args.sentinel,
        max_states: args.max_states,
        memoize: !args.no_memo,
    };

    let text = read_text(Path::new(&args.file))
        .with_context(|| format!("Failed to read text from {}", args.file))?;
    let mut keywords = parse_keywords(&args.keywords);
    if keywords.is_empty() {
        bail!("No keywords given");
    }
    if !is_dna(&text) {
        warn!("Text contains symbols outside the DNA alphabet");
    }
    info!("text: {} ({} chars)", args.file, text.chars().count());
    debug!("keywords: {:?}, k = {}", keywords, max_errors);

    let start = Instant::now();
    let keyword_trie = PatternTrie::build_with_config(&keywords, config);
    let build_ms = elapsed_ms(start);
    println!("[KeywordTrie] build time: {build_ms:.4} ms");

    if let Some(path) = &args.keyword_graph_json {
        write_graph(&keyword_trie, path)?;
    }

    let start = Instant::now();
    let keyword_hits = keyword_trie.search_all(&text, max_errors)?;
    let search_ms = elapsed_ms(start);
    println!("[KeywordTrie] matches:");
    for (word, positions) in &keyword_hits {
        println!("'{word}' found {} times", positions.len());
        if args.positions {
            println!("  {positions:?}");
        }
    }
    println!("[KeywordTrie] search time: {search_ms:.4} ms");
    println!("[KeywordTrie] total time: {:.4} ms\n", build_ms + search_ms);

    let start = Instant::now();
    let suffix_trie = CompressedSuffixTrie::build_with_config(&text, config)?;
    let build_ms = elapsed_ms(start);
    println!("[SuffixTrie] build time: {build_ms:.4} ms");

    if let Some(path) = &args.suffix_graph_json {
        write_graph(&suffix_trie, path)?;
    }

    keywords.sort();
    #[cfg(feature = "parallel")]
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads.max(1))
        .build()
        .context("Failed to start search thread pool")?;
    #[cfg(not(feature = "parallel"))]
    debug!("Built without the parallel feature; ignoring --threads {}", args.threads);

    let start = Instant::now();
    #[cfg(feature = "parallel")]
    let results =
        pool.install(|| suffix_trie.search_approx_many(keywords.as_slice(), max_errors))?;
    #[cfg(not(feature = "parallel"))]
    let results = suffix_trie.search_approx_many(keywords.as_slice(), max_errors)?;
    let search_ms = elapsed_ms(start);

    println!("[SuffixTrie] matches:");
    for (pattern, positions) in keywords.iter().zip(&results) {
        println!("'{pattern}' found {} times", positions.len());
        if args.positions {
            println!("  {positions:?}");
        }
    }
    println!("[SuffixTrie] search time: {search_ms:.4} ms");
    println!("[SuffixTrie] total time: {:.4} ms", build_ms + search_ms);

    Ok(Report {
        keyword_hits,
        suffix_hits: keywords.into_iter().zip(results).collect(),
    })
}
