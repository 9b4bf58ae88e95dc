use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use config::{AppConfig, ConfigOverrides, EmbedMode};
use render::{print_stdout, AskOutput};
use session::Session;
use std::path::PathBuf;

mod chat;
mod config;
mod offline;
mod ollama;
mod render;
mod session;

#[derive(Parser)]
#[command(name = "docrag")]
#[command(about = "Ask questions about a folder of documents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file (default: ./docrag.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override embedding backend in this process
    #[arg(long, global = true, value_enum)]
    embed_mode: Option<EmbedMode>,

    /// Folder holding the documents to index
    #[arg(long, global = true)]
    docs: Option<PathBuf>,

    /// Fragment store file
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the documents folder (only when the store is empty, unless --force)
    Index(IndexArgs),

    /// Answer a single question
    Ask(AskArgs),

    /// Interactive question-answer session
    Chat,

    /// Fragment count and indexed documents
    Stats,

    /// List indexed documents
    Docs,

    /// Per-document summary of pages, frequent terms and a sample
    Topics,
}

#[derive(Args)]
struct IndexArgs {
    /// Discard the existing store and index everything again
    #[arg(long)]
    force: bool,
}

#[derive(Args)]
struct AskArgs {
    /// Question to answer
    question: String,

    /// Output JSON instead of streamed text
    #[arg(long)]
    json: bool,
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON parsing
    if matches!(&cli.command, Commands::Ask(args) if args.json) {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // reqwest connection pooling is noisy below warn
    if !cli.verbose {
        builder.filter_module("hyper_util", log::LevelFilter::Warn);
        builder.filter_module("reqwest", log::LevelFilter::Warn);
    }
    builder.target(env_logger::Target::Stderr).init();

    let overrides = ConfigOverrides {
        embed_mode: cli.embed_mode,
        docs_dir: cli.docs.clone(),
        store_path: cli.store.clone(),
    };
    let config = AppConfig::resolve(cli.config.as_deref(), &overrides)
        .context("Failed to load configuration")?;
    log::debug!(
        "Embedding mode {}, docs {}, store {}",
        config.models.embedding_mode.as_str(),
        config.paths.docs_dir.display(),
        config.paths.store_path.display()
    );

    match cli.command {
        Commands::Index(args) => run_index(args, config).await?,
        Commands::Ask(args) => run_ask(args, config).await?,
        Commands::Chat => chat::run(&Session::open(config).await?).await?,
        Commands::Stats => print_stdout(&chat::stats(&Session::open(config).await?).await?)?,
        Commands::Docs => print_stdout(&chat::docs(&Session::open(config).await?).await?)?,
        Commands::Topics => print_stdout(&chat::topics(&Session::open(config).await?).await?)?,
    }

    Ok(())
}

async fn run_index(args: IndexArgs, config: AppConfig) -> Result<()> {
    if args.force {
        let backends = session::Backends::from_config(&config)?;
        let stats = session::rebuild_index(&config, backends.embedder).await?;
        return print_stdout(&render::index_summary(&stats));
    }

    let session = Session::open(config).await?;
    match &session.built {
        Some(stats) => print_stdout(&render::index_summary(stats)),
        None => print_stdout(&format!(
            "Store already holds {} fragments (use --force to rebuild)",
            session.store.len()
        )),
    }
}

async fn run_ask(args: AskArgs, config: AppConfig) -> Result<()> {
    let session = Session::open(config).await?;

    if args.json {
        let answer = session.assistant.ask(&args.question).await?;
        let output = AskOutput::collect(&args.question, answer).await?;
        return print_stdout(&serde_json::to_string_pretty(&output)?);
    }

    chat::answer(&session, &args.question).await
}
