mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cairn::config::CairnConfig;

#[derive(Parser)]
#[command(name = "cairn", version, about = "Semantic knowledge base — store entries, search by meaning")]
struct Cli {
    /// Owner scope for all operations (defaults to the configured owner)
    #[arg(long, global = true)]
    owner: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store a new knowledge entry
    Add {
        title: String,
        content: String,
        /// Category: routine, project, goal, calendar, insight, general
        #[arg(long = "type")]
        entry_type: Option<String>,
        /// Free-text label; repeat for multiple tags
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Provenance label
        #[arg(long)]
        source: Option<String>,
        /// Stored relevance score in [0.0, 1.0]
        #[arg(long)]
        relevance: Option<f64>,
    },
    /// Search entries by semantic similarity
    Search {
        query: String,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
        /// Minimum similarity for a hit
        #[arg(long)]
        threshold: Option<f64>,
        /// Restrict to one category
        #[arg(long = "type")]
        entry_type: Option<String>,
    },
    /// Show a single entry by id (records the access)
    Show { id: String },
    /// Update fields on an existing entry
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long = "type")]
        entry_type: Option<String>,
        /// Replace the tag list; repeat for multiple tags
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        relevance: Option<f64>,
    },
    /// Delete an entry permanently
    Rm { id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level and owner default)
    let config = CairnConfig::load()?;

    // Log to stderr so stdout stays clean for command output.
    let filter = EnvFilter::try_new(&config.cli.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let owner = cli
        .owner
        .unwrap_or_else(|| config.cli.default_owner.clone());

    match cli.command {
        Command::Add {
            title,
            content,
            entry_type,
            tags,
            source,
            relevance,
        } => cli::add(&config, &owner, title, content, entry_type, tags, source, relevance),
        Command::Search {
            query,
            limit,
            threshold,
            entry_type,
        } => cli::search(&config, &owner, &query, limit, threshold, entry_type),
        Command::Show { id } => cli::show(&config, &owner, &id),
        Command::Edit {
            id,
            title,
            content,
            entry_type,
            tags,
            source,
            relevance,
        } => cli::edit(&config, &owner, &id, title, content, entry_type, tags, source, relevance),
        Command::Rm { id } => cli::rm(&config, &owner, &id),
    }
}
