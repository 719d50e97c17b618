use crate::chat::ChatClient;
use crate::judge::JudgeConfig;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

const SUMMARY_TIMEOUT: Duration = Duration::from_secs(20);
const SUMMARY_SYSTEM_PROMPT: &str = "You are a precise evaluation summarizer.";
const RECENT_LOG_SAMPLE: usize = 50;
const LOG_MESSAGE_PREVIEW: usize = 200;

/// Generates a short free-form assessment of one task run.
///
/// Uses the same chat endpoint as the judge when configured; otherwise (or on
/// any failure) returns a deterministic summary built from the metrics.
pub struct EvaluationSummarizer {
    chat: Option<ChatClient>,
}

impl EvaluationSummarizer {
    pub fn new(config: JudgeConfig) -> Self {
        let chat = config.api_key.and_then(|api_key| {
            match ChatClient::new(config.api_base, api_key, config.model) {
                Ok(client) => Some(client),
                Err(reason) => {
                    warn!("summarizer client unavailable: {}", reason);
                    None
                }
            }
        });
        Self { chat }
    }

    /// Summarize a run from its metrics document and recent log entries.
    ///
    /// `logs` are raw log documents with `timestamp`, `level` and `message`
    /// fields; only the most recent entries are sampled into the prompt.
    pub fn summarize(&self, metrics: &Value, logs: &[Value]) -> String {
        let Some(chat) = &self.chat else {
            return fallback_summary(metrics);
        };

        let sample: Vec<String> = logs
            .iter()
            .rev()
            .take(RECENT_LOG_SAMPLE)
            .rev()
            .map(format_log_line)
            .collect();

        let prompt = format!(
            "You are an evaluator of an autonomous agent. Summarize the agent's performance, \
             correctness, autonomy behavior, and notable events.\n\
             Metrics: {}\n\
             Recent logs:\n{}\n\
             Provide a concise, objective assessment.",
            metrics,
            sample.join("\n")
        );

        match chat.complete(SUMMARY_SYSTEM_PROMPT, &prompt, 0.2, 300, SUMMARY_TIMEOUT) {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => fallback_summary(metrics),
            Err(reason) => {
                warn!("summary call failed, using fallback: {}", reason);
                fallback_summary(metrics)
            }
        }
    }
}

fn format_log_line(log: &Value) -> String {
    let timestamp = log.get("timestamp").and_then(Value::as_str).unwrap_or("-");
    let level = log.get("level").and_then(Value::as_str).unwrap_or("info");
    let message = log
        .get("message")
        .map(|m| match m {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_default();
    let preview: String = message.chars().take(LOG_MESSAGE_PREVIEW).collect();
    format!("[{}] {}: {}", timestamp, level, preview)
}

fn fallback_summary(metrics: &Value) -> String {
    let get = |key: &str| metrics.get(key).and_then(Value::as_f64).unwrap_or(0.0);
    format!(
        "Evaluation summary based on heuristics: completion_time={}s, errors={}, retries={}, \
         dependency_requests={}, api_calls={}.",
        get("completion_time_s"),
        get("error_count"),
        get("retry_count"),
        get("human_or_agent_requests"),
        get("total_api_calls"),
    )
}
