//! Subcommand handlers

use crate::app;
use crate::cli::{AnalyzeArgs, AskArgs, EvalArgs, FetchArgs, GlobalArgs};
use anyhow::{Context, Result, bail};
use chrono::Local;
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use fred_agent::{
    AgentConfig, DateRangeResolver, RetrievalFallbackController, SeriesFetcher, ToolOrchestrator,
};
use fred_analytics::{DetailOptions, TimeSeriesAnalyzer};
use fred_data::ObservationsResponse;
use fred_eval::{AccuracyScorer, EvaluationReport, EvaluationRunner, GroupSummary, load_test_cases};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

pub async fn ask(global: &GlobalArgs, args: AskArgs) -> Result<()> {
    let orchestrator = app::orchestrator(global, &args.agent)?;
    match &args.question {
        Some(question) => answer(&orchestrator, question, args.json).await,
        None => repl(&orchestrator, args.json).await,
    }
}

async fn answer(orchestrator: &ToolOrchestrator, question: &str, json: bool) -> Result<()> {
    let timeout = orchestrator.config().question_timeout;
    let outcome = tokio::time::timeout(timeout, orchestrator.process_question(question))
        .await
        .with_context(|| format!("no answer within {}s", timeout.as_secs()))?;

    match outcome {
        Ok(outcome) => {
            debug!(
                input_tokens = outcome.usage.input_tokens,
                output_tokens = outcome.usage.output_tokens,
                "Token usage"
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", outcome.final_answer);
            }
            Ok(())
        }
        Err(failure) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&failure)?);
            }
            Err(failure.into())
        }
    }
}

async fn repl(orchestrator: &ToolOrchestrator, json: bool) -> Result<()> {
    println!("Ask about the economy. Type 'exit' to quit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }
        if let Err(e) = answer(orchestrator, question, json).await {
            eprintln!("Error: {e:#}");
        }
    }
    Ok(())
}

pub async fn fetch(global: &GlobalArgs, args: FetchArgs) -> Result<()> {
    let config = AgentConfig::builder().with_env()?.build()?;
    let fetcher = SeriesFetcher::new(app::data_source()?, app::catalog(global)?)
        .with_analytics(config.analytics.clone());
    let controller =
        RetrievalFallbackController::new(Arc::new(fetcher)).with_widen_days(config.widen_days);

    let today = Local::now().date_naive();
    let range = DateRangeResolver::new(config.default_window_days).resolve(
        &args.start,
        &args.end,
        today,
    );
    let result = controller
        .fetch_with_fallback(&args.series_id, range, args.attempts)
        .await;

    if let Some(error) = result.error() {
        bail!("{error}");
    }

    println!(
        "{} ({}): {} observations, {}, attempt {}",
        result.series_id,
        result.indicator_name,
        result.observations().len(),
        result.range,
        result.attempts
    );
    match result.analysis() {
        Some(summary) if args.detailed => {
            let detailed = summary.detailed(&config.detail_options());
            println!("{}", serde_json::to_string_pretty(&detailed)?);
        }
        Some(summary) => println!("{}", serde_json::to_string_pretty(&summary.compact())?),
        None => println!("No observations in range"),
    }
    Ok(())
}

pub fn analyze(global: &GlobalArgs, args: &AnalyzeArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let response: ObservationsResponse = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {} as a FRED observations response", args.file.display()))?;

    let frequency = match &args.series_id {
        Some(series_id) => match app::catalog(global) {
            Ok(catalog) => catalog.lookup(series_id).and_then(|m| m.frequency()),
            Err(e) => {
                warn!(error = %e, "Metadata unavailable, analyzing without a frequency");
                None
            }
        },
        None => None,
    };

    let summary = TimeSeriesAnalyzer::new(&response.observations)?
        .with_frequency(frequency)
        .summarize()?;

    if args.detailed {
        let options = DetailOptions {
            recent_points: args.recent_points,
            include_full_timeseries: false,
        };
        println!("{}", serde_json::to_string_pretty(&summary.detailed(&options))?);
    } else {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

pub async fn eval(global: &GlobalArgs, args: EvalArgs) -> Result<()> {
    let cases = load_test_cases(&args.fixtures)?;
    let orchestrator = Arc::new(app::orchestrator(global, &args.agent)?);
    let scorer = AccuracyScorer::new(args.tolerance_days, *orchestrator.resolver());

    let report = EvaluationRunner::new(orchestrator)
        .with_scorer(scorer)
        .with_limit(args.limit)
        .run(&cases, Local::now().date_naive())
        .await;

    report.export(&args.output)?;
    print_report(&report);
    println!("Results written to {}", args.output.display());
    Ok(())
}

fn print_report(report: &EvaluationReport) {
    let summary = &report.summary;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Group",
        "Tests",
        "Passed",
        "Series ID",
        "Date Range",
        "Overall",
    ]);
    for (name, group) in [
        ("Tool-call", &summary.tool_call),
        ("Non-tool-call", &summary.non_tool_call),
        ("All", &summary.overall),
    ] {
        table.add_row(group_row(name, group));
    }
    println!("{table}");

    let failed: Vec<_> = report.results.iter().filter(|r| !r.success).collect();
    if !failed.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec!["ID", "Question", "Error"]);
        for result in failed {
            table.add_row(vec![
                result.question_id.to_string(),
                result.question.clone(),
                result.error.clone().unwrap_or_default(),
            ]);
        }
        println!("{table}");
    }
}

fn group_row(name: &str, group: &GroupSummary) -> Vec<String> {
    vec![
        name.to_string(),
        group.tests.to_string(),
        group.passed.to_string(),
        score(group.avg_series_id_score),
        score(group.avg_date_range_score),
        score(group.avg_overall_score),
    ]
}

fn score(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}
