use crate::chat::ChatClient;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::time::Duration;
use tracing::warn;

const CORRECTNESS_TIMEOUT: Duration = Duration::from_secs(30);

const CORRECTNESS_SYSTEM_PROMPT: &str =
    "You are a precise correctness evaluator. Respond with only a number between 0.0 and 1.0.";

/// Endpoint configuration for the external judge.
///
/// A missing API key is not an error: the judge degrades to its local
/// heuristic and everything keeps working.
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl JudgeConfig {
    /// Read endpoint settings from `TRACEVAL_API_BASE`, `TRACEVAL_API_KEY`
    /// and `TRACEVAL_MODEL`.
    pub fn from_env() -> Self {
        Self {
            api_base: std::env::var("TRACEVAL_API_BASE")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            api_key: std::env::var("TRACEVAL_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            model: std::env::var("TRACEVAL_MODEL")
                .unwrap_or_else(|_| "gpt-5-reasoning".to_string()),
        }
    }

    /// Configuration with no endpoint at all (heuristic-only mode).
    pub fn unconfigured() -> Self {
        Self {
            api_base: String::new(),
            api_key: None,
            model: String::new(),
        }
    }
}

/// Outcome of one correctness evaluation.
///
/// `Scored` comes from the external judge; `Degraded` carries the heuristic
/// score plus the reason the external path was not used. Both hold a value
/// in [0, 1], so callers that only need the number use [`Judgment::value`].
#[derive(Debug, Clone, PartialEq)]
pub enum Judgment {
    Scored(f64),
    Degraded { score: f64, reason: String },
}

impl Judgment {
    pub fn value(&self) -> f64 {
        match self {
            Judgment::Scored(score) => *score,
            Judgment::Degraded { score, .. } => *score,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Judgment::Degraded { .. })
    }
}

enum Mode {
    External(ChatClient),
    Heuristic,
}

/// Scores how well a final output satisfies an initial request.
///
/// Total by construction: every failure path lands in the keyword/length
/// heuristic, so `evaluate` always returns and never errors.
pub struct CorrectnessJudge {
    mode: Mode,
}

impl CorrectnessJudge {
    pub fn new(config: JudgeConfig) -> Self {
        let mode = match config.api_key {
            Some(api_key) => match ChatClient::new(config.api_base, api_key, config.model) {
                Ok(client) => Mode::External(client),
                Err(reason) => {
                    warn!("judge client unavailable, using heuristic: {}", reason);
                    Mode::Heuristic
                }
            },
            None => Mode::Heuristic,
        };
        Self { mode }
    }

    /// Judge with no external endpoint.
    pub fn heuristic() -> Self {
        Self {
            mode: Mode::Heuristic,
        }
    }

    /// Confidence in [0, 1] that `final_output` satisfies `initial_request`.
    pub fn evaluate(&self, initial_request: &str, final_output: &str) -> Judgment {
        if initial_request.trim().is_empty() || final_output.trim().is_empty() {
            return Judgment::Degraded {
                score: 0.0,
                reason: "empty request or output".to_string(),
            };
        }

        match &self.mode {
            Mode::External(client) => {
                match external_score(client, initial_request, final_output) {
                    Ok(score) => Judgment::Scored(score),
                    Err(reason) => {
                        warn!("external judge failed, using heuristic: {}", reason);
                        Judgment::Degraded {
                            score: heuristic_correctness(initial_request, final_output),
                            reason,
                        }
                    }
                }
            }
            Mode::Heuristic => Judgment::Degraded {
                score: heuristic_correctness(initial_request, final_output),
                reason: "no judge endpoint configured".to_string(),
            },
        }
    }
}

fn external_score(
    client: &ChatClient,
    initial_request: &str,
    final_output: &str,
) -> Result<f64, String> {
    let prompt = correctness_prompt(initial_request, final_output);
    let content = client.complete(
        CORRECTNESS_SYSTEM_PROMPT,
        &prompt,
        0.1,
        10,
        CORRECTNESS_TIMEOUT,
    )?;

    parse_score(&content).ok_or_else(|| {
        let preview: String = content.chars().take(50).collect();
        format!("unparsable judge response: '{}'", preview)
    })
}

fn correctness_prompt(initial_request: &str, final_output: &str) -> String {
    format!(
        "You are an evaluator assessing how well an agent's output aligns with the original request.\n\n\
         Original Request:\n{initial_request}\n\n\
         Agent's Final Output:\n{final_output}\n\n\
         Evaluate how correctly the final output addresses and fulfills the original request.\n\n\
         Scoring Guidelines (use a DECIMAL between 0.0 and 1.0, NOT a percentage):\n\
         - 1.0 (perfect): Output fully addresses the request with complete accuracy\n\
         - 0.8-0.9 (excellent): Output addresses most of the request with minor gaps\n\
         - 0.6-0.7 (good): Output addresses the core request but may have some issues\n\
         - 0.4-0.5 (fair): Output partially addresses the request with notable gaps\n\
         - 0.2-0.3 (poor): Output has some relevance but misses key requirements\n\
         - 0.0-0.1 (very poor): Output has little or no relevance to the request\n\n\
         Important: Be lenient - if the output makes a reasonable attempt to address the request, \
         even if imperfect, give it at least 0.3. Only use very low scores (0.0-0.2) if the output \
         is completely unrelated or shows no understanding of the request.\n\n\
         Respond with ONLY a decimal number between 0.0 and 1.0 (e.g., 0.75, not 75 or 75%). \
         Do not include any explanation, just the number."
    )
}

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+(?:\.[0-9]+)?)").expect("valid number pattern"));

/// Parse a judge response into a score in [0, 1].
///
/// Tries a direct decimal parse, then the first numeric substring (handles
/// "score: 0.8", "75%", and similar). Values above 1 are read as
/// percentages and divided by 100 before clamping.
pub fn parse_score(content: &str) -> Option<f64> {
    let raw = match content.trim().parse::<f64>() {
        Ok(value) => value,
        Err(_) => NUMBER_RE
            .captures(content)?
            .get(1)?
            .as_str()
            .parse::<f64>()
            .ok()?,
    };

    let score = if raw > 1.0 { raw / 100.0 } else { raw };
    Some(score.clamp(0.0, 1.0))
}

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did",
        "will", "would", "should", "could", "may", "might", "must", "can",
    ]
    .into_iter()
    .collect()
});

fn meaningful_tokens(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|word| word.len() > 2 && !STOP_WORDS.contains(*word))
        .map(str::to_string)
        .collect()
}

/// Keyword-overlap and length heuristic used whenever the external judge is
/// unavailable or fails.
pub fn heuristic_correctness(initial_request: &str, final_output: &str) -> f64 {
    if initial_request.is_empty() {
        return if final_output.is_empty() { 0.0 } else { 0.3 };
    }
    if final_output.is_empty() {
        return 0.0;
    }

    let request_tokens = meaningful_tokens(initial_request);
    let output_tokens = meaningful_tokens(final_output);

    if request_tokens.is_empty() {
        return 0.4;
    }

    let common = request_tokens.intersection(&output_tokens).count();
    let keyword_ratio = common as f64 / request_tokens.len() as f64;

    let request_len = initial_request.len() as f64;
    let output_len = final_output.len() as f64;
    let min_output_len = (request_len * 0.2).max(10.0);

    let length_factor = if output_len < min_output_len {
        0.3
    } else {
        let length_ratio = (output_len / request_len.max(1.0)).min(1.0);
        1.0 - (1.0 - length_ratio) * 0.3
    };

    let mut score = 0.7 * keyword_ratio + 0.3 * length_factor;
    if common > 0 {
        score = score.max(0.3);
    }
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inputs_score_zero() {
        let judge = CorrectnessJudge::heuristic();
        assert_eq!(judge.evaluate("", "anything").value(), 0.0);
        assert_eq!(judge.evaluate("anything", "").value(), 0.0);
        assert_eq!(judge.evaluate("   ", "\t").value(), 0.0);
    }

    #[test]
    fn non_empty_pair_is_in_unit_range() {
        let judge = CorrectnessJudge::heuristic();
        let judgment = judge.evaluate(
            "open the settings page and enable dark mode",
            "Dark mode has been enabled from the settings page.",
        );
        let score = judgment.value();
        assert!((0.0..=1.0).contains(&score), "score out of range: {score}");
        assert!(judgment.is_degraded());
    }

    #[test]
    fn overlap_floors_the_heuristic_at_0_3() {
        // One shared keyword out of many, short output: without the floor
        // this would land well below 0.3.
        let score = heuristic_correctness(
            "download quarterly revenue spreadsheet crunch numbers compare against forecast",
            "spreadsheet",
        );
        assert_eq!(score, 0.3);
    }

    #[test]
    fn unrelated_output_scores_below_floor() {
        let score = heuristic_correctness("install the printer driver", "sunny");
        assert!(score < 0.3, "no overlap must not be floored: {score}");
    }

    #[test]
    fn stop_word_only_request_gets_baseline() {
        assert_eq!(heuristic_correctness("do it", "some output text"), 0.4);
    }

    #[test]
    fn parse_score_direct_decimal() {
        assert_eq!(parse_score("0.75"), Some(0.75));
        assert_eq!(parse_score(" 0.3 "), Some(0.3));
        assert_eq!(parse_score("1.0"), Some(1.0));
    }

    #[test]
    fn parse_score_percentage_correction() {
        assert_eq!(parse_score("75"), Some(0.75));
        assert_eq!(parse_score("75%"), Some(0.75));
        assert_eq!(parse_score("score: 2"), Some(0.02));
    }

    #[test]
    fn parse_score_embedded_number() {
        assert_eq!(parse_score("I'd rate this 0.85 overall"), Some(0.85));
    }

    #[test]
    fn parse_score_garbage_is_none() {
        assert_eq!(parse_score("excellent work"), None);
        assert_eq!(parse_score(""), None);
    }

    #[test]
    fn judge_without_key_degrades_with_reason() {
        let judge = CorrectnessJudge::new(JudgeConfig::unconfigured());
        match judge.evaluate("list the files", "files listed") {
            Judgment::Degraded { reason, .. } => {
                assert_eq!(reason, "no judge endpoint configured")
            }
            Judgment::Scored(_) => panic!("expected degraded judgment"),
        }
    }
}
