//! Tool-calling orchestration for FRED question answering
//!
//! A question goes through two model turns. In the plan turn the model picks
//! series and date ranges through the `get_fred_data` tool; the orchestrator
//! repairs the dates, fetches each series (widening the range when it comes
//! back empty), attaches analytics and sends everything back for the final
//! answer.
//!
//! ```no_run
//! use std::sync::Arc;
//! use fred_agent::{AgentConfig, ToolOrchestrator};
//! use fred_data::{FredClient, MetadataCatalog};
//! use fred_llm::providers::OllamaProvider;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Arc::new(MetadataCatalog::load("output.json")?);
//! let orchestrator = ToolOrchestrator::new(
//!     Arc::new(OllamaProvider::new()?),
//!     Arc::new(FredClient::from_env()?),
//!     catalog,
//!     AgentConfig::from_env()?,
//! );
//! let outcome = orchestrator.process_question("What's the current unemployment rate?").await?;
//! println!("{}", outcome.final_answer);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dates;
pub mod error;
pub mod fallback;
pub mod fetcher;
pub mod orchestrator;
pub mod prompts;
pub mod series;
pub mod shaping;
pub mod tool;

pub use config::{AgentConfig, AgentConfigBuilder};
pub use dates::{DATE_FORMAT, DateRange, DateRangeResolver, parse_date};
pub use error::{AgentError, Result};
pub use fallback::RetrievalFallbackController;
pub use fetcher::{FetchSeries, SeriesFetcher};
pub use orchestrator::{
    NO_RESPONSE, OrchestratorState, QuestionFailure, QuestionOutcome, ToolOrchestrator, ToolPlan,
};
pub use series::{FetchStatus, SeriesResult};
pub use shaping::{AnalysisPayload, ResultMode, ShapedResult, ToolPayload};
pub use tool::{GET_FRED_DATA, ToolCall, fred_data_tool};
