//! raglens evaluation runner
//!
//! Run a golden test set through retrieval and score it.
//!
//! Usage:
//!   cargo run --bin raglens-eval -- --test-set tests/fixtures/golden_test_set.json
//!   cargo run --bin raglens-eval -- run --provider custom --top-k 5 --json
//!   cargo run --bin raglens-eval -- history --limit 5
//!   cargo run --bin raglens-eval -- providers

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use raglens_core::defaults::{
    GOLDEN_TEST_SET, HISTORY_DISPLAY_LIMIT, HISTORY_PATH, SETTINGS_PATH, TOP_K_MAX,
};
use raglens_core::logging::{COLLECTION, COMPONENT, EVALUATOR, PATH, SUBSYSTEM, TOP_K};
use raglens_core::{AnswerGenerator, Retriever, Settings};
use raglens_eval::{
    connect_retriever, EvalHistory, EvalReport, EvalRunner, EvaluatorFactory, ExtractiveAnswer,
    StaticRetriever,
};
use tracing::field::display;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "raglens-eval")]
#[command(author, version, about = "Retrieval quality evaluation for raglens")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a golden test set (default)
    Run(RunArgs),

    /// Show recent evaluation runs
    History {
        /// History log to read
        #[arg(long, default_value = HISTORY_PATH)]
        history: PathBuf,

        /// Number of runs to show
        #[arg(short, long, default_value_t = HISTORY_DISPLAY_LIMIT)]
        limit: usize,
    },

    /// List registered evaluator providers
    Providers,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Golden test set (.json or .jsonl)
    #[arg(short, long, default_value = GOLDEN_TEST_SET)]
    test_set: PathBuf,

    /// Results retrieved per query (default from settings)
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Collection to search (default from settings)
    #[arg(short, long)]
    collection: Option<String>,

    /// Evaluator provider; forces evaluation on
    #[arg(short, long)]
    provider: Option<String>,

    /// Settings file
    #[arg(long, default_value = SETTINGS_PATH)]
    config: PathBuf,

    /// Recorded results (JSON object of query to chunks) used instead of
    /// the search service
    #[arg(long)]
    results: Option<PathBuf>,

    /// Build an extractive answer for each query
    #[arg(long)]
    generate_answers: bool,

    /// History log to append to
    #[arg(long, default_value = HISTORY_PATH)]
    history: PathBuf,

    /// Do not append the report to the history log
    #[arg(long)]
    no_history: bool,

    /// Print the report as JSON instead of a text summary
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_tracing();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Run(cli.run)) {
        Commands::Run(args) => cmd_run(args).await,
        Commands::History { history, limit } => cmd_history(&history, limit),
        Commands::Providers => {
            for name in EvaluatorFactory::new().list_providers() {
                println!("{}", name);
            }
            Ok(())
        }
    }
}

/// Install the tracing subscriber.
///
/// Environment variables:
///   LOG_FORMAT - "json" or "text" (default: "text")
///   LOG_FILE   - path to log file (optional, daily rotation)
///   RUST_LOG   - standard env filter (default: "raglens_eval=info,raglens_core=info")
///
/// Console logs go to stderr so `--json` output stays parseable.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "raglens_eval=info,raglens_core=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(ref path) = log_file {
        let path = Path::new(path);
        let file_dir = path.parent().unwrap_or(Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("raglens-eval.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
        None
    }
}

async fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let mut settings = Settings::load(&args.config)
        .with_context(|| format!("loading settings from {}", args.config.display()))?;
    if let Some(provider) = &args.provider {
        settings = settings.with_evaluation_override(provider.as_str());
    }

    let top_k = args.top_k.unwrap_or(settings.retrieval.top_k);
    if top_k == 0 || top_k > TOP_K_MAX {
        bail!("--top-k must be between 1 and {}, got {}", TOP_K_MAX, top_k);
    }
    let collection = args
        .collection
        .clone()
        .unwrap_or_else(|| settings.retrieval.collection.clone());

    let evaluator = EvaluatorFactory::new()
        .create_from_settings(&settings)
        .context("creating evaluator")?;

    let retriever: Option<Arc<dyn Retriever>> = match &args.results {
        Some(path) => Some(Arc::new(StaticRetriever::from_file(path)?)),
        None => connect_retriever(&settings),
    };
    let generator: Option<Arc<dyn AnswerGenerator>> = if args.generate_answers {
        Some(Arc::new(ExtractiveAnswer::default()))
    } else {
        None
    };

    let runner = EvalRunner::new(evaluator)
        .with_retriever(retriever)
        .with_generator(generator);

    info!(
        { SUBSYSTEM } = "eval",
        { COMPONENT } = "cli",
        { PATH } = display(args.test_set.display()),
        { EVALUATOR } = runner.evaluator_name(),
        { TOP_K } = top_k,
        { COLLECTION } = collection.as_str(),
        "Running evaluation"
    );
    let report = runner
        .run(&args.test_set, top_k, Some(collection.as_str()))
        .await
        .with_context(|| format!("running test set {}", args.test_set.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.to_map())?);
    } else {
        print_report(&report, &args.test_set);
    }

    if !args.no_history {
        let history = EvalHistory::new(&args.history);
        history
            .append(&report)
            .with_context(|| format!("appending to history {}", args.history.display()))?;
        if !args.json {
            println!("Saved to history: {}", args.history.display());
        }
    }

    Ok(())
}

fn print_report(report: &EvalReport, test_set: &Path) {
    println!("═══════════════════════════════════════════════════════════════");
    println!("raglens Evaluation");
    println!("═══════════════════════════════════════════════════════════════");
    println!("Test set: {}", test_set.display());
    println!();
    println!("{}", report.text_summary());
    println!();
}

fn cmd_history(path: &Path, limit: usize) -> anyhow::Result<()> {
    let entries = EvalHistory::new(path)
        .recent(limit)
        .with_context(|| format!("reading history {}", path.display()))?;

    if entries.is_empty() {
        println!("No evaluation history at {}", path.display());
        return Ok(());
    }

    println!("═══════════════════════════════════════════════════════════════");
    println!("Evaluation History (last {})", entries.len());
    println!("═══════════════════════════════════════════════════════════════");
    for entry in entries.iter().rev() {
        let metrics = entry
            .report
            .aggregate_metrics
            .iter()
            .map(|(name, value)| format!("{}={:.4}", name, value))
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "{}  {:<12} {:>4} queries  {:>9.1} ms  {}",
            entry.timestamp,
            entry.report.evaluator_name,
            entry.report.query_count,
            entry.report.total_elapsed_ms,
            metrics
        );
    }
    Ok(())
}
