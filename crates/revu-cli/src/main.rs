//! revu - automated code review from the command line

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use revu_agent::{GeminiProvider, Orchestrator};
use revu_core::tools::commit::{self, CommitType};
use revu_core::{analyze, quality::DEFAULT_LANGUAGE, Grade, ReviewConfig, ToolRegistry};

/// Automated code review driven by a generative model
#[derive(Parser)]
#[command(name = "revu", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Review uncommitted changes in a repository
    Review {
        /// Repository to review
        #[arg(default_value = ".")]
        dir: String,

        /// Override the default review prompt
        #[arg(short, long)]
        prompt: Option<String>,

        /// Filename for the persisted markdown report
        #[arg(short, long, default_value = "code-review.md")]
        report: String,
    },

    /// Score a single file offline with the quality heuristic
    Analyze {
        /// File to score
        file: PathBuf,

        /// Source language (defaults to typescript)
        #[arg(short, long)]
        language: Option<String>,

        /// Print the raw JSON report
        #[arg(long)]
        json: bool,
    },

    /// Generate a conventional commit message offline
    CommitMessage {
        /// Description of the changes
        changes: String,

        /// Commit type (feat, fix, docs, style, refactor, test, chore)
        #[arg(short = 't', long, default_value = "chore")]
        commit_type: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ReviewConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ReviewConfig::default(),
    };

    match cli.command {
        Commands::Review {
            dir,
            prompt,
            report,
        } => run_review(config, &dir, prompt, &report).await,
        Commands::Analyze {
            file,
            language,
            json,
        } => run_analyze(&file, language.as_deref(), json),
        Commands::CommitMessage {
            changes,
            commit_type,
        } => run_commit_message(&changes, &commit_type),
    }
}

async fn run_review(
    config: ReviewConfig,
    dir: &str,
    prompt: Option<String>,
    report: &str,
) -> anyhow::Result<()> {
    let api_key = std::env::var("GEMINI_API_KEY")
        .context("GEMINI_API_KEY is not set (put it in the environment or a .env file)")?;

    let provider = Arc::new(GeminiProvider::new(api_key, config.model.clone()));
    let registry = ToolRegistry::standard(&config);
    let orchestrator = Orchestrator::new(provider, registry, config);

    let prompt = prompt.unwrap_or_else(|| {
        format!(
            "Review the code changes in '{dir}', make your reviews and suggestions \
             file by file. After the review, generate a commit message for the \
             changes and write the review to a markdown file called '{report}'."
        )
    });

    let (tx, mut rx) = mpsc::channel(64);
    let printer = tokio::spawn(async move {
        let mut stdout = std::io::stdout();
        while let Some(chunk) = rx.recv().await {
            let _ = write!(stdout, "{chunk}");
            let _ = stdout.flush();
        }
    });

    let summary = orchestrator.run(&prompt, tx).await?;
    printer.await.ok();

    println!();
    println!(
        "{} {:?} after {} step(s), {} tool call(s)",
        "session finished:".green().bold(),
        summary.termination,
        summary.steps_executed,
        summary.tool_calls
    );
    Ok(())
}

fn run_analyze(file: &Path, language: Option<&str>, json: bool) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let report = analyze(&source, language.unwrap_or(DEFAULT_LANGUAGE));

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let grade = match report.grade {
        Grade::A => "A".green().bold(),
        Grade::B => "B".cyan().bold(),
        Grade::C => "C".yellow().bold(),
        Grade::D => "D".red().bold(),
    };

    println!("{} {}", file.display().to_string().bold(), grade);
    println!("  overall:         {:>4.1}", report.overall_score);
    println!("  readability:     {:>4.1}", report.breakdown.readability);
    println!("  maintainability: {:>4.1}", report.breakdown.maintainability);
    println!("  security:        {:>4.1}", report.breakdown.security);
    println!("  performance:     {:>4.1}", report.breakdown.performance);
    println!(
        "  lines: {} total, {} non-empty, {} comments",
        report.metrics.total_lines, report.metrics.non_empty_lines, report.metrics.comment_lines
    );

    if !report.suggestions.is_empty() {
        println!("{}", "suggestions:".bold());
        for suggestion in &report.suggestions {
            println!("  - {suggestion}");
        }
    }
    Ok(())
}

fn run_commit_message(changes: &str, commit_type: &str) -> anyhow::Result<()> {
    let commit_type: CommitType = commit_type
        .parse()
        .map_err(|e: revu_core::CoreError| anyhow::anyhow!(e))?;
    let message = commit::generate(changes, commit_type);

    println!("{}", message.message.bold());
    println!();
    println!("{}", message.full_message);
    Ok(())
}
