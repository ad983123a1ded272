//! Prompt text rendered with MiniJinja
//!
//! Templates are rendered per question so the date the model sees is always
//! the current one.

use crate::Result;
use crate::dates::DATE_FORMAT;
use chrono::NaiveDate;
use minijinja::Environment;
use minijinja::value::Value;
use serde::Serialize;

const SYSTEM_TEMPLATE: &str = r#"You are an economic data assistant with access to FRED API. Available indicators:
{{ guide }}
Note: (M)=Monthly, (Q)=Quarterly, (W)=Weekly, (D)=Daily, (Y)=Yearly

When asked about economic data, use the get_fred_data function with the appropriate series_id.

IMPORTANT:
1. Always specify start_date and end_date based on the user's question, in YYYY-MM-DD format. Never use relative dates like "-2y".
2. If no time period is specified, use the most recent {{ window_days }} days.
3. If you only need today's or the most recent value, use today minus {{ window_days }} days as start date and today as end date.
4. Today is {{ today }}."#;

const REMINDER_TEMPLATE: &str = r#"Reminder: the original question was "{{ question }}"

Data retrieved for this question:
{% for d in datasets -%}
{{ loop.index }}. {{ d.series_id }}: {{ d.indicator }}{% if d.failed %} (no data retrieved){% endif %}
{% endfor %}
Answer the original question using ALL of the datasets above:
1. Cover every indicator listed, not only the last one.
2. Quote concrete values and dates from the analysis.
3. Compare the indicators when the question asks how they relate.
4. Say plainly when a dataset failed or returned no data.
5. Stay focused on what was asked."#;

/// One line of the closing reminder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderEntry {
    pub series_id: String,
    pub indicator: String,
    pub failed: bool,
}

#[derive(Serialize)]
struct SystemVars<'a> {
    guide: &'a str,
    window_days: u64,
    today: String,
}

#[derive(Serialize)]
struct ReminderVars<'a> {
    question: &'a str,
    datasets: &'a [ReminderEntry],
}

fn render(template: &str, vars: impl Serialize) -> Result<String> {
    let env = Environment::new();
    Ok(env.render_str(template, Value::from_serialize(vars))?)
}

/// Plan-turn system prompt
pub fn system_prompt(guide: &str, window_days: u64, today: NaiveDate) -> Result<String> {
    render(
        SYSTEM_TEMPLATE,
        SystemVars {
            guide: guide.trim_end(),
            window_days,
            today: today.format(DATE_FORMAT).to_string(),
        },
    )
}

/// Restates the question and lists every dataset fetched
pub fn reminder(question: &str, datasets: &[ReminderEntry]) -> Result<String> {
    render(REMINDER_TEMPLATE, ReminderVars { question, datasets })
}
