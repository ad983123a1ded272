//! Two-turn question answering: plan, fetch, finalize

use crate::error::{AgentError, Result};
use crate::prompts::system_prompt;
use crate::shaping::{ResultMode, ShapedResult, shape_results};
use crate::tool::{GET_FRED_DATA, fred_data_tool};
use crate::{
    AgentConfig, DateRangeResolver, FetchSeries, RetrievalFallbackController, SeriesFetcher,
    SeriesResult, ToolCall,
};
use chrono::{Local, NaiveDate};
use fred_data::{DataSource, MetadataCatalog};
use fred_llm::{CompletionRequest, LLMProvider, Message, TokenUsage};
use futures::future::join_all;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Final answer used when the model's closing turn is empty
pub const NO_RESPONSE: &str = "No response generated";

/// Where a question is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    AwaitingModelPlan,
    HasToolCalls,
    DirectAnswer,
    ResultsGathered,
    FinalAnswer,
    Error,
}

impl OrchestratorState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::DirectAnswer | Self::FinalAnswer | Self::Error)
    }

    fn advance(&mut self, next: Self) {
        debug!(from = %self, to = %next, "State transition");
        *self = next;
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AwaitingModelPlan => "awaiting_model_plan",
            Self::HasToolCalls => "has_tool_calls",
            Self::DirectAnswer => "direct_answer",
            Self::ResultsGathered => "results_gathered",
            Self::FinalAnswer => "final_answer",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// The model's reply to the plan turn
#[derive(Debug, Clone)]
pub struct ToolPlan {
    /// Assistant message, replayed verbatim in the finalize turn
    pub message: Message,
    /// Parsed invocations in emission order
    pub calls: Vec<ToolCall>,
    pub usage: TokenUsage,
}

impl ToolPlan {
    pub fn is_direct(&self) -> bool {
        self.calls.is_empty()
    }

    /// The model's own text when it chose not to call tools
    pub fn direct_answer(&self) -> Option<&str> {
        if self.is_direct() {
            self.message.text()
        } else {
            None
        }
    }
}

/// A question that reached a terminal answer
#[derive(Debug, Clone, Serialize)]
pub struct QuestionOutcome {
    pub question: String,
    pub tool_calls: Vec<ToolCall>,
    /// Index-aligned with `tool_calls`
    pub results: Vec<SeriesResult>,
    /// Absent for direct answers
    pub mode: Option<ResultMode>,
    pub final_answer: String,
    pub state: OrchestratorState,
    pub elapsed: Duration,
    pub usage: TokenUsage,
}

/// A question aborted by a model-level failure
#[derive(Debug, Clone, Error, Serialize)]
#[error("{error}")]
pub struct QuestionFailure {
    pub question: String,
    pub error: String,
    /// Last state reached before the failure
    pub phase: OrchestratorState,
    pub elapsed: Duration,
}

/// Drives the plan/fetch/finalize exchange for one question at a time
///
/// Per-series problems (bad ids, transport errors, empty ranges) are folded
/// into the tool results; only failures talking to the model abort.
pub struct ToolOrchestrator {
    provider: Arc<dyn LLMProvider>,
    controller: RetrievalFallbackController,
    catalog: Arc<MetadataCatalog>,
    resolver: DateRangeResolver,
    config: AgentConfig,
}

impl ToolOrchestrator {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        source: Arc<dyn DataSource>,
        catalog: Arc<MetadataCatalog>,
        config: AgentConfig,
    ) -> Self {
        let fetcher = SeriesFetcher::new(source, Arc::clone(&catalog))
            .with_analytics(config.analytics.clone());
        Self::with_fetcher(provider, Arc::new(fetcher), catalog, config)
    }

    /// Use a custom single-attempt fetcher
    pub fn with_fetcher(
        provider: Arc<dyn LLMProvider>,
        fetcher: Arc<dyn FetchSeries>,
        catalog: Arc<MetadataCatalog>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            controller: RetrievalFallbackController::new(fetcher)
                .with_widen_days(config.widen_days),
            catalog,
            resolver: DateRangeResolver::new(config.default_window_days),
            config,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn resolver(&self) -> &DateRangeResolver {
        &self.resolver
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    fn system_prompt(&self, today: NaiveDate) -> Result<String> {
        system_prompt(
            &self.catalog.indicator_guide(),
            self.config.default_window_days,
            today,
        )
    }

    fn request(&self, system: &str, messages: Vec<Message>) -> CompletionRequest {
        CompletionRequest::builder(&self.config.model)
            .messages(messages)
            .system(system)
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .tool(fred_data_tool())
            .build()
    }

    /// Run the plan turn alone, without fetching anything
    pub async fn extract_tool_calls(&self, question: &str, today: NaiveDate) -> Result<ToolPlan> {
        let system = self.system_prompt(today)?;
        self.plan(question, &system).await
    }

    async fn plan(&self, question: &str, system: &str) -> Result<ToolPlan> {
        info!(
            model = %self.config.model,
            provider = self.provider.name(),
            "Requesting tool plan"
        );
        let response = self
            .provider
            .complete(self.request(system, vec![Message::user(question)]))
            .await?;

        if response.message.content.is_none() {
            return Err(AgentError::ModelProtocol(
                "No message in model response".to_string(),
            ));
        }

        let calls: Vec<ToolCall> = response
            .message
            .tool_uses()
            .iter()
            .map(|tool_use| {
                if tool_use.name != GET_FRED_DATA {
                    warn!(tool = tool_use.name, "Unknown tool name, treating as get_fred_data");
                }
                ToolCall::from_tool_use(tool_use)
            })
            .collect();

        info!(
            tool_calls = calls.len(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Tool plan received"
        );
        for call in &calls {
            debug!(
                call_id = %call.call_id,
                series_id = call.series_id().unwrap_or("<missing>"),
                start_date = %call.start_date,
                end_date = %call.end_date,
                "Planned tool call"
            );
        }

        Ok(ToolPlan {
            message: response.message,
            calls,
            usage: response.usage,
        })
    }

    /// Resolve dates and fetch every call; results keep call order
    pub async fn execute_tool_calls(
        &self,
        calls: &[ToolCall],
        use_fallback: bool,
        today: NaiveDate,
    ) -> Vec<SeriesResult> {
        let attempts = if use_fallback {
            self.config.fallback_attempts
        } else {
            1
        };
        let tasks = calls
            .iter()
            .map(|call| self.execute_call(call, attempts, today));

        if self.config.parallel_fetch {
            join_all(tasks).await
        } else {
            let mut results = Vec::with_capacity(calls.len());
            for task in tasks {
                results.push(task.await);
            }
            results
        }
    }

    async fn execute_call(&self, call: &ToolCall, attempts: u32, today: NaiveDate) -> SeriesResult {
        let range = self
            .resolver
            .resolve(&call.start_date, &call.end_date, today);

        let Some(series_id) = call.series_id() else {
            warn!(call_id = %call.call_id, "Tool call without series_id");
            return SeriesResult::failed("", "", range, "No series_id provided");
        };

        info!(call_id = %call.call_id, series_id, range = %range, "Executing tool call");
        self.controller
            .fetch_with_fallback(series_id, range, attempts)
            .await
    }

    /// Answer `question` using the host clock for "today"
    pub async fn process_question(
        &self,
        question: &str,
    ) -> std::result::Result<QuestionOutcome, QuestionFailure> {
        self.process_question_on(question, Local::now().date_naive())
            .await
    }

    /// Answer `question` as of `today`
    pub async fn process_question_on(
        &self,
        question: &str,
        today: NaiveDate,
    ) -> std::result::Result<QuestionOutcome, QuestionFailure> {
        let started = Instant::now();
        let mut state = OrchestratorState::AwaitingModelPlan;

        match self.run(question, today, &mut state, started).await {
            Ok(outcome) => {
                info!(
                    state = %outcome.state,
                    tool_calls = outcome.tool_calls.len(),
                    elapsed_ms = outcome.elapsed.as_millis() as u64,
                    "Question answered"
                );
                Ok(outcome)
            }
            Err(e) => {
                let phase = state;
                state.advance(OrchestratorState::Error);
                warn!(error = %e, phase = %phase, "Question failed");
                Err(QuestionFailure {
                    question: question.to_string(),
                    error: e.to_string(),
                    phase,
                    elapsed: started.elapsed(),
                })
            }
        }
    }

    async fn run(
        &self,
        question: &str,
        today: NaiveDate,
        state: &mut OrchestratorState,
        started: Instant,
    ) -> Result<QuestionOutcome> {
        info!(question, %today, "Processing question");
        let system = self.system_prompt(today)?;
        let plan = self.plan(question, &system).await?;
        let mut usage = plan.usage;

        if plan.is_direct() {
            state.advance(OrchestratorState::DirectAnswer);
            return Ok(QuestionOutcome {
                question: question.to_string(),
                final_answer: plan.message.text().unwrap_or_default().to_string(),
                tool_calls: Vec::new(),
                results: Vec::new(),
                mode: None,
                state: *state,
                elapsed: started.elapsed(),
                usage,
            });
        }

        state.advance(OrchestratorState::HasToolCalls);
        let results = self.execute_tool_calls(&plan.calls, true, today).await;
        state.advance(OrchestratorState::ResultsGathered);

        let mode = ResultMode::for_call_count(plan.calls.len(), self.config.compact_threshold);
        debug!(?mode, calls = plan.calls.len(), "Shaping tool results");
        let shaped = shape_results(
            &plan.calls,
            &results,
            mode,
            &self.config.detail_options(),
            question,
        )?;

        let mut messages = vec![Message::user(question), plan.message];
        messages.extend(shaped.into_iter().map(ShapedResult::into_message));

        let response = self
            .provider
            .complete(self.request(&system, messages))
            .await?;
        usage += response.usage;

        let ignored = response.message.tool_uses().len();
        if ignored > 0 {
            warn!(ignored, "Ignoring tool calls in the final turn");
        }

        let final_answer = response
            .message
            .text()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or(NO_RESPONSE)
            .to_string();
        state.advance(OrchestratorState::FinalAnswer);

        Ok(QuestionOutcome {
            question: question.to_string(),
            tool_calls: plan.calls,
            results,
            mode: Some(mode),
            final_answer,
            state: *state,
            elapsed: started.elapsed(),
            usage,
        })
    }
}
