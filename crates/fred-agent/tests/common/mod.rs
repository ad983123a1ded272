//! Scripted collaborators for orchestrator tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Months, NaiveDate};
use fred_data::{DataError, DataSource, IndicatorMetadata, MetadataCatalog, Observation, ObservationQuery};
use fred_llm::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message, Role,
    StopReason, TokenUsage,
};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub enum Step {
    Reply(CompletionResponse),
    Fail(String),
}

/// Replays canned replies in order and records every request
#[derive(Default)]
pub struct ScriptedProvider {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> fred_llm::Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request);
        match self.steps.lock().unwrap().pop_front() {
            Some(Step::Reply(response)) => Ok(response),
            Some(Step::Fail(message)) => Err(LLMError::RequestFailed(message)),
            None => Err(LLMError::RequestFailed("script exhausted".to_string())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn usage() -> TokenUsage {
    TokenUsage {
        input_tokens: 10,
        output_tokens: 5,
    }
}

pub fn text_reply(text: &str) -> Step {
    Step::Reply(CompletionResponse {
        message: Message::assistant(text),
        stop_reason: StopReason::EndTurn,
        usage: usage(),
    })
}

/// Assistant reply carrying `get_fred_data` calls with the given arguments
pub fn tool_reply(calls: &[Value]) -> Step {
    let blocks = calls
        .iter()
        .enumerate()
        .map(|(i, input)| ContentBlock::ToolUse {
            id: format!("call_{i}"),
            name: "get_fred_data".to_string(),
            input: input.clone(),
        })
        .collect();
    Step::Reply(CompletionResponse {
        message: Message::from_blocks(Role::Assistant, blocks),
        stop_reason: StopReason::ToolUse,
        usage: usage(),
    })
}

/// Assistant reply whose message carries no content at all
pub fn empty_reply() -> Step {
    Step::Reply(CompletionResponse {
        message: Message {
            role: Role::Assistant,
            content: None,
        },
        stop_reason: StopReason::EndTurn,
        usage: usage(),
    })
}

pub fn call(series_id: &str, start: &str, end: &str) -> Value {
    json!({"series_id": series_id, "start_date": start, "end_date": end})
}

/// In-memory FRED: serves stored observations inside the requested range
#[derive(Default)]
pub struct FakeSource {
    series: HashMap<String, Vec<Observation>>,
    queries: Mutex<Vec<ObservationQuery>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monthly values starting at `start`
    pub fn with_monthly(mut self, series_id: &str, start: NaiveDate, values: &[f64]) -> Self {
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let date = start + Months::new(i as u32);
                Observation::new(date.format("%Y-%m-%d").to_string(), v.to_string())
            })
            .collect();
        self.series.insert(series_id.to_string(), observations);
        self
    }

    pub fn queries(&self) -> Vec<ObservationQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataSource for FakeSource {
    async fn get_observations(&self, query: &ObservationQuery) -> fred_data::Result<Vec<Observation>> {
        self.queries.lock().unwrap().push(query.clone());
        let Some(observations) = self.series.get(&query.series_id) else {
            return Err(DataError::Status {
                status: 400,
                body: "Bad Request. The series does not exist.".to_string(),
            });
        };
        Ok(observations
            .iter()
            .filter(|o| {
                NaiveDate::parse_from_str(&o.date, "%Y-%m-%d")
                    .is_ok_and(|d| d >= query.start && d <= query.end)
            })
            .cloned()
            .collect())
    }
}

pub fn catalog() -> Arc<MetadataCatalog> {
    let entry = |series: &str, indicator: &str, period: &str| IndicatorMetadata {
        series: series.to_string(),
        indicator: indicator.to_string(),
        period: period.to_string(),
        category: None,
    };
    Arc::new(MetadataCatalog::from_entries(vec![
        entry("GDP", "Gross Domestic Product", "Quarterly"),
        entry("UNRATE", "Civilian Unemployment Rate", "Monthly"),
        entry("CPIAUCSL", "Consumer Price Index for All Urban Consumers", "Monthly"),
    ]))
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Tool-result payloads of a finalize request, in message order
pub fn tool_contents(request: &CompletionRequest) -> Vec<(String, String)> {
    request
        .messages
        .iter()
        .flat_map(|m| {
            m.tool_results()
                .into_iter()
                .map(|(id, content)| (id.to_string(), content.to_string()))
        })
        .collect()
}

/// JSON part of a tool result, without any trailing reminder
pub fn payload(content: &str) -> Value {
    let body = content.split("\n\n").next().unwrap();
    serde_json::from_str(body).unwrap()
}
