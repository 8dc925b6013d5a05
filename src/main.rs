use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use tg_ner_corpus::config::{CollectorConfig, LabelerConfig, PreprocessConfig};
use tg_ner_corpus::labeler::{self, ConsoleDecisions};
use tg_ner_corpus::normalize::Normalizer;
use tg_ner_corpus::preprocess;

/// Build a token-classification corpus from Telegram channels.
#[derive(Debug, Parser)]
#[command(name = "tg-ner-corpus", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scrape channel history into a CSV table.
    Collect(CollectArgs),
    /// Clean and tokenize the scraped messages.
    Preprocess(PreprocessArgs),
    /// Label tokens interactively.
    Label(LabelArgs),
}

#[derive(Debug, Args)]
#[cfg_attr(not(feature = "telegram"), allow(dead_code))]
struct CollectArgs {
    /// Channel usernames to scrape (e.g. @shageronlinestore).
    #[arg(required = true)]
    channels: Vec<String>,

    #[arg(short, long, default_value = CollectorConfig::DEFAULT_OUTPUT)]
    output: PathBuf,

    #[arg(long, default_value = CollectorConfig::DEFAULT_MEDIA_DIR)]
    media_dir: PathBuf,

    /// Download photos attached to messages.
    #[arg(long)]
    download_media: bool,

    /// Maximum messages per channel.
    #[arg(long, default_value_t = CollectorConfig::DEFAULT_MESSAGE_LIMIT)]
    limit: usize,
}

#[derive(Debug, Args)]
struct PreprocessArgs {
    #[arg(short, long)]
    input: Option<PathBuf>,

    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Character filter: `amharic` or `allow-list`.
    #[arg(long, default_value = "allow-list")]
    normalizer: Normalizer,
}

#[derive(Debug, Args)]
struct LabelArgs {
    #[arg(short, long)]
    input: Option<PathBuf>,

    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Messages sampled per channel; smaller channels are skipped.
    #[arg(long)]
    per_channel: Option<usize>,

    /// Save after this many completed messages.
    #[arg(long)]
    checkpoint_every: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Collect(args) => collect(args).await,
        Command::Preprocess(args) => run_preprocess(args),
        Command::Label(args) => label(args),
    }
}

#[cfg(feature = "telegram")]
async fn collect(args: CollectArgs) -> anyhow::Result<()> {
    use tg_ner_corpus::collector::Collector;
    use tg_ner_corpus::collector::telegram::TelegramSource;

    let mut config = CollectorConfig::from_env()?;
    config.output_path = args.output;
    config.media_dir = args.media_dir;
    config.download_media = args.download_media;
    config.message_limit = args.limit;

    eprintln!("📡 Collecting {} channel(s)", args.channels.len());
    eprintln!("   Output: {}", config.output_path.display());
    if config.download_media {
        eprintln!("   Photos: {}", config.media_dir.display());
    }

    let source = TelegramSource::connect(&config).await?;
    let summary = Collector::new(config, source).run(&args.channels).await?;
    eprintln!(
        "✅ Scraped {} messages from {} channel(s)",
        summary.messages, summary.channels
    );
    Ok(())
}

#[cfg(not(feature = "telegram"))]
async fn collect(args: CollectArgs) -> anyhow::Result<()> {
    // Validate credentials anyway so a misconfigured .env shows up early.
    CollectorConfig::from_env()?;
    anyhow::bail!(
        "cannot collect {} channel(s): built without the `telegram` feature \
         (rebuild with `--features telegram`)",
        args.channels.len()
    )
}

fn run_preprocess(args: PreprocessArgs) -> anyhow::Result<()> {
    let defaults = PreprocessConfig::default();
    let config = PreprocessConfig {
        input_path: args.input.unwrap_or(defaults.input_path),
        output_path: args.output.unwrap_or(defaults.output_path),
        normalizer: args.normalizer,
    };

    let summary = preprocess::run(&config)?;
    eprintln!(
        "✅ Preprocessed {} rows ({} with tokens) → {}",
        summary.rows,
        summary.with_tokens,
        config.output_path.display()
    );
    Ok(())
}

fn label(args: LabelArgs) -> anyhow::Result<()> {
    let defaults = LabelerConfig::default();
    let config = LabelerConfig {
        input_path: args.input.unwrap_or(defaults.input_path),
        output_path: args.output.unwrap_or(defaults.output_path),
        per_channel_limit: args.per_channel.unwrap_or(defaults.per_channel_limit),
        checkpoint_every: args.checkpoint_every.unwrap_or(defaults.checkpoint_every),
        seed: args.seed.unwrap_or(defaults.seed),
    };

    eprintln!(
        "🏷️  Labeling {} → {}",
        config.input_path.display(),
        config.output_path.display()
    );
    let mut console = ConsoleDecisions::stdio();
    let summary = labeler::label_file(&config, &mut console)?;

    eprintln!(
        "✅ {} labeled, {} skipped{}",
        summary.completed,
        summary.skipped,
        if summary.terminated_early {
            " (stopped early)"
        } else {
            ""
        }
    );
    Ok(())
}
