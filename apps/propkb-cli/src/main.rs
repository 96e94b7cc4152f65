use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use propkb_core::analysis::RfpAnalysis;
use propkb_core::config::{Config, KbSettings};
use propkb_core::corpus::{read_file_content, CorpusLoader};
use propkb_core::pricing::extract_prices;
use propkb_core::segment::segment_rfp;
use propkb_core::types::SearchResult;
use propkb_hybrid::KnowledgeBase;

mod cli;

use cli::{Cli, Command, QueryArgs};

const PREVIEW_CHARS: usize = 200;

fn init_tracing(verbose: u8) {
    let filter = match (std::env::var("RUST_LOG"), verbose) {
        (Ok(env), _) => EnvFilter::new(env),
        (Err(_), 0) => EnvFilter::new("info"),
        (Err(_), 1) => EnvFilter::new("debug"),
        (Err(_), _) => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn settings_from(cli: &Cli) -> Result<KbSettings> {
    let config = Config::load().context("loading configuration")?;
    let mut settings = config.settings()?;
    if let Some(dir) = &cli.dir {
        settings.directory = dir.to_string_lossy().into_owned();
    }
    if cli.fake_embeddings {
        settings.embedding.use_fake = true;
    }
    Ok(settings)
}

fn open(settings: KbSettings) -> Result<KnowledgeBase> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    spinner.set_message(format!("indexing {}", settings.corpus_dir().display()));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let kb = KnowledgeBase::open(settings);
    spinner.finish_and_clear();
    Ok(kb?)
}

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > PREVIEW_CHARS {
        format!("{}...", flat.chars().take(PREVIEW_CHARS).collect::<String>())
    } else {
        flat
    }
}

fn print_results(results: &[SearchResult]) {
    if results.is_empty() {
        println!("No results.");
        return;
    }
    for (rank, r) in results.iter().enumerate() {
        println!("{}. [{:.3}] {} :: {}", rank + 1, r.score, r.entry.source_name, r.entry.section_name);
        println!("   {}", preview(&r.entry.content));
    }
}

fn print_list(title: &str, items: &[String]) {
    println!("{title}:");
    if items.is_empty() {
        println!("  (none)");
    }
    for item in items {
        println!("  {item}");
    }
}

fn print_analysis(path: &Path) -> Result<()> {
    let text = read_file_content(path).with_context(|| format!("reading {}", path.display()))?;
    let sections = segment_rfp(&text);
    info!(file = %path.display(), sections = sections.len(), "segmented RFP");
    println!("Sections:");
    for (name, body) in &sections {
        println!("  {name} ({} chars)", body.len());
    }

    let report = RfpAnalysis::scan(&text);
    print_list("Required sections", &report.required_sections);
    print_list("Mandatory criteria", &report.mandatory_criteria);
    print_list("Deliverables", &report.deliverables);
    print_list("Deadlines", &report.deadlines);
    println!("Evaluation weights:");
    for (name, weight) in &report.weighted_criteria {
        println!("  {weight:>3}%  {name}");
    }
    Ok(())
}

fn query_k(kb: &KnowledgeBase, args: &QueryArgs) -> usize {
    args.k.unwrap_or(kb.settings().retrieval.default_k)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let settings = settings_from(&cli)?;

    match &cli.command {
        Command::Ingest => {
            let kb = open(settings)?;
            info!(dir = %kb.corpus_dir().display(), "ingest complete");
            println!("Indexed {} sections from {}", kb.len(), kb.corpus_dir().display());
            println!("Distinct section names: {}", kb.section_names()?.len());
        }
        Command::Search(args) => {
            let kb = open(settings)?;
            let results = kb.hybrid_search(&args.text(), query_k(&kb, args))?;
            print_results(&results);
        }
        Command::MultiHop(args) => {
            let kb = open(settings)?;
            let results = kb.multi_hop_search(&args.text(), query_k(&kb, args))?;
            print_results(&results);
        }
        Command::Sections { top } => {
            let kb = open(settings)?;
            for name in kb.common_section_names(top.unwrap_or(usize::MAX))? {
                println!("{name}");
            }
        }
        Command::Section { name } => {
            let kb = open(settings)?;
            let entries = kb.section_documents(name)?;
            if entries.is_empty() {
                println!("No sections named {name:?}.");
            }
            for entry in entries {
                println!("== {} ({})", entry.source_name, entry.metadata.client_industry);
                println!("{}\n", entry.content);
            }
        }
        Command::Prices => {
            // raw files only, no index
            let loader = CorpusLoader::new(settings.extensions.clone(), settings.max_depth);
            for price in extract_prices(&settings.corpus_dir(), &loader) {
                println!("{price}");
            }
        }
        Command::Analyze { file } => print_analysis(file)?,
    }
    Ok(())
}
