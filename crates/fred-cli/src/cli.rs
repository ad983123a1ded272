//! Argument parsing
//!
//! Flags override the matching `FRED_AGENT_*` environment variables, which in
//! turn override the built-in defaults.

use clap::{Args, Parser, Subcommand, ValueEnum};
use fred_utils::LogFormat;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "fred-qa", version)]
#[command(about = "Answer macroeconomic questions with FRED data", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Chat backend
    #[arg(long, value_enum, env = "FRED_AGENT_PROVIDER", default_value_t = ProviderKind::Ollama, global = true)]
    pub provider: ProviderKind,

    /// Model name, overriding FRED_AGENT_MODEL
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Scraped indicator metadata (JSON array)
    #[arg(long, env = "FRED_METADATA_PATH", default_value = "output.json", global = true)]
    pub metadata: PathBuf,

    /// Log output format
    #[arg(long, env = "FRED_LOG_FORMAT", default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    /// Local Ollama server (`/api/chat`)
    Ollama,
    /// OpenAI-compatible endpoint (`/chat/completions`)
    Openai,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Answer one question, or start an interactive session when none is given
    Ask(AskArgs),
    /// Fetch one series with fallback and print its analysis
    Fetch(FetchArgs),
    /// Analyze a saved FRED observations response
    Analyze(AnalyzeArgs),
    /// Score the plan step against labelled questions
    Eval(EvalArgs),
}

/// Orchestrator tunables shared by `ask` and `eval`
#[derive(Debug, Clone, Args)]
pub struct AgentArgs {
    /// Tool-call count at which results switch to compact summaries
    #[arg(long)]
    pub compact_threshold: Option<usize>,

    /// Fetch attempts per series, including the first
    #[arg(long)]
    pub fallback_attempts: Option<u32>,

    /// Fetch series one after another instead of concurrently
    #[arg(long)]
    pub sequential: bool,

    /// Per-question timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Args)]
pub struct AskArgs {
    /// Question to answer; omit for an interactive session
    pub question: Option<String>,

    /// Print the full outcome as JSON instead of just the answer
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub agent: AgentArgs,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// FRED series id, e.g. UNRATE
    pub series_id: String,

    /// Start date (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    pub start: String,

    /// End date (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    pub end: String,

    /// Fetch attempts, including the first
    #[arg(long, default_value_t = 2)]
    pub attempts: u32,

    /// Print the detailed summary instead of the compact one
    #[arg(long)]
    pub detailed: bool,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// JSON file holding a FRED `series/observations` response
    pub file: PathBuf,

    /// Series id, used to look up the reporting frequency
    #[arg(long)]
    pub series_id: Option<String>,

    /// Print the detailed summary instead of the full analysis
    #[arg(long)]
    pub detailed: bool,

    /// Trailing points in the detailed summary
    #[arg(long, default_value_t = 12)]
    pub recent_points: usize,
}

#[derive(Debug, Args)]
pub struct EvalArgs {
    /// Fixture file of labelled questions
    #[arg(default_value = "files/test_cases.json")]
    pub fixtures: PathBuf,

    /// Only run the first N cases
    #[arg(long)]
    pub limit: Option<usize>,

    /// Where to write the JSON report
    #[arg(long, default_value = "files/evaluation_results.json")]
    pub output: PathBuf,

    /// Date tolerance in days for the date-range axis
    #[arg(long, default_value_t = 30)]
    pub tolerance_days: u32,

    #[command(flatten)]
    pub agent: AgentArgs,
}
