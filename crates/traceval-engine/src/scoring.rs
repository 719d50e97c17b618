use crate::judge::CorrectnessJudge;
use serde::{Deserialize, Serialize};
use traceval_types::{
    clamp01, round4, status_is_terminal, MetricsSnapshot, ProgressEntry, ScoreReport,
};

/// Everything the engine needs to score one finished task.
///
/// Deserializes straight from a stored task document; anything missing
/// falls back to its default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationInput {
    pub metrics: MetricsSnapshot,
    pub progress: Vec<ProgressEntry>,
    pub initial_request: Option<String>,
    pub final_output: Option<String>,
    pub task_status: Option<String>,
}

// Sub-score weights. Correctness dominates; the rest split the remainder
// across run-behavior dimensions.
const WEIGHT_CORRECTNESS: f64 = 0.35;
const WEIGHT_EFFICIENCY: f64 = 0.15;
const WEIGHT_QUALITY: f64 = 0.15;
const WEIGHT_STABILITY: f64 = 0.10;
const WEIGHT_AUTONOMY: f64 = 0.15;
const WEIGHT_RESOURCE: f64 = 0.10;

const COMPLETION_FLOOR: f64 = 0.3;

/// Multi-factor scoring engine.
///
/// Combines run metrics, the correctness judgment, and policy penalties into
/// one bounded report. Never errors: missing metrics are zeros, malformed
/// progress values contribute nothing, and the judge is total.
pub struct ScoringEngine {
    judge: Option<CorrectnessJudge>,
}

impl ScoringEngine {
    pub fn new(judge: CorrectnessJudge) -> Self {
        Self { judge: Some(judge) }
    }

    /// Engine with no judge attached; correctness comes from the local
    /// progress/error heuristic.
    pub fn without_judge() -> Self {
        Self { judge: None }
    }

    /// Produce the score report for one task evaluation.
    pub fn score(&self, input: &EvaluationInput) -> ScoreReport {
        let m = &input.metrics;

        let raw_correctness = self.correctness(input);
        let correctness = apply_completion_floor(raw_correctness, task_completed(input));

        let efficiency = clamp01(
            0.4 * inverse(m.completion_time_s / 300.0)
                + 0.3 * inverse(m.total_api_calls / 50.0)
                + 0.3 * inverse(m.retry_count),
        );
        let quality = clamp01(0.6 * inverse(m.error_count) + 0.4 * inverse(m.retry_count));
        let stability = clamp01(
            0.5 * inverse(m.error_count) + 0.5 * inverse(m.completion_time_s / 600.0),
        );
        let autonomy = clamp01(inverse(m.human_or_agent_requests));
        let resource_efficiency = clamp01(
            0.5 * inverse(m.memory_usage_mb / 1024.0) + 0.5 * inverse(m.cpu_usage_percent / 100.0),
        );

        let dependency_penalty = (0.05 * m.human_or_agent_requests).min(0.3);
        let error_penalty = (0.05 * m.error_count).min(0.3);
        let timeout_penalty = 0.0; // reserved

        let weighted = WEIGHT_CORRECTNESS * correctness
            + WEIGHT_EFFICIENCY * efficiency
            + WEIGHT_QUALITY * quality
            + WEIGHT_STABILITY * stability
            + WEIGHT_AUTONOMY * autonomy
            + WEIGHT_RESOURCE * resource_efficiency;

        let mut final_score =
            (weighted - dependency_penalty - error_penalty - timeout_penalty).max(0.0);

        let cost_penalty = if m.cost_usd > 0.0 {
            (m.cost_usd / 10.0).min(0.1)
        } else {
            0.0
        };
        final_score = (final_score - cost_penalty).max(0.0);

        let mut report = ScoreReport::default();
        for (name, value) in [
            ("correctness", correctness),
            ("efficiency", efficiency),
            ("quality", quality),
            ("stability", stability),
            ("autonomy", autonomy),
            ("resource_efficiency", resource_efficiency),
            ("final_score", final_score),
        ] {
            report.scores.insert(name.to_string(), round4(value));
        }
        for (name, value) in [
            ("dependency_penalty", dependency_penalty),
            ("error_penalty", error_penalty),
            ("timeout_penalty", timeout_penalty),
            ("cost_penalty", cost_penalty),
        ] {
            report.penalties.insert(name.to_string(), round4(value));
        }
        report
    }

    fn correctness(&self, input: &EvaluationInput) -> f64 {
        let request = input.initial_request.as_deref().unwrap_or("");
        let output = input.final_output.as_deref().unwrap_or("");

        if let Some(judge) = &self.judge {
            if !request.trim().is_empty() && !output.trim().is_empty() {
                return judge.evaluate(request, output).value();
            }
        }

        progress_heuristic(input)
    }
}

/// Correctness fallback when no judge is attached or request/output are
/// missing: blend the latest progress ratio with an inverse error term.
fn progress_heuristic(input: &EvaluationInput) -> f64 {
    let mut progress_ratio = 0.0;
    if let Some(last) = input.progress.last() {
        progress_ratio = last.ratio().unwrap_or(0.0);
        if last.is_terminal() {
            progress_ratio = 1.0;
        }
    }
    clamp01(0.9 * progress_ratio + 0.1 * inverse(input.metrics.error_count))
}

fn task_completed(input: &EvaluationInput) -> bool {
    let by_progress = input
        .progress
        .last()
        .map(ProgressEntry::is_terminal)
        .unwrap_or(false);
    let by_status = input
        .task_status
        .as_deref()
        .map(status_is_terminal)
        .unwrap_or(false);
    by_progress || by_status
}

/// Policy: a task that ran to completion is never scored as a near-total
/// failure, whatever the output-quality judgment said.
fn apply_completion_floor(correctness: f64, completed: bool) -> f64 {
    if completed && correctness < COMPLETION_FLOOR {
        COMPLETION_FLOOR
    } else {
        correctness
    }
}

fn inverse(x: f64) -> f64 {
    1.0 / (1.0 + x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input_with_metrics(metrics: MetricsSnapshot) -> EvaluationInput {
        EvaluationInput {
            metrics,
            ..Default::default()
        }
    }

    #[test]
    fn default_input_yields_complete_report() {
        let report = ScoringEngine::without_judge().score(&EvaluationInput::default());
        for name in [
            "correctness",
            "efficiency",
            "quality",
            "stability",
            "autonomy",
            "resource_efficiency",
            "final_score",
        ] {
            let value = report.score(name).expect(name);
            assert!((0.0..=1.0).contains(&value), "{name} out of range: {value}");
        }
        for name in [
            "dependency_penalty",
            "error_penalty",
            "timeout_penalty",
            "cost_penalty",
        ] {
            assert!(report.penalty(name).is_some(), "missing penalty {name}");
        }
    }

    #[test]
    fn completion_floor_raises_low_correctness() {
        let engine = ScoringEngine::without_judge();
        let input = EvaluationInput {
            // Zero progress ratio with one error keeps raw correctness low,
            // but the terminal status triggers the floor.
            metrics: MetricsSnapshot {
                error_count: 20.0,
                ..Default::default()
            },
            progress: vec![ProgressEntry::new("done", Some(json!(0)))],
            ..Default::default()
        };
        // Terminal progress status forces the ratio to 1.0, so the floor is
        // irrelevant here: 0.9 * 1.0 + 0.1 / 21.
        let report = engine.score(&input);
        assert_eq!(report.score("correctness"), Some(0.9048));

        let input = EvaluationInput {
            metrics: MetricsSnapshot {
                error_count: 20.0,
                ..Default::default()
            },
            progress: vec![ProgressEntry::new("running", Some(json!(0)))],
            task_status: Some("completed".to_string()),
            ..Default::default()
        };
        let report = engine.score(&input);
        assert_eq!(report.score("correctness"), Some(COMPLETION_FLOOR));
    }

    #[test]
    fn error_count_strictly_degrades_quality_and_stability() {
        let engine = ScoringEngine::without_judge();
        let mut previous_quality = f64::INFINITY;
        let mut previous_stability = f64::INFINITY;
        let mut previous_error_penalty = -1.0;

        for errors in [0.0, 1.0, 2.0, 4.0] {
            let report = engine.score(&input_with_metrics(MetricsSnapshot {
                error_count: errors,
                ..Default::default()
            }));
            let quality = report.score("quality").unwrap();
            let stability = report.score("stability").unwrap();
            let error_penalty = report.penalty("error_penalty").unwrap();

            assert!(quality < previous_quality);
            assert!(stability < previous_stability);
            assert!(error_penalty > previous_error_penalty);

            previous_quality = quality;
            previous_stability = stability;
            previous_error_penalty = error_penalty;
        }
    }

    #[test]
    fn penalties_are_capped() {
        let report = ScoringEngine::without_judge().score(&input_with_metrics(MetricsSnapshot {
            error_count: 100.0,
            human_or_agent_requests: 100.0,
            cost_usd: 50.0,
            ..Default::default()
        }));
        assert_eq!(report.penalty("error_penalty"), Some(0.3));
        assert_eq!(report.penalty("dependency_penalty"), Some(0.3));
        assert_eq!(report.penalty("cost_penalty"), Some(0.1));
        assert!(report.final_score() >= 0.0);
    }

    #[test]
    fn clean_successful_run_scores_above_0_6() {
        let engine = ScoringEngine::without_judge();
        let input = EvaluationInput {
            metrics: MetricsSnapshot {
                completion_time_s: 120.0,
                total_api_calls: 10.0,
                memory_usage_mb: 256.0,
                cpu_usage_percent: 20.0,
                ..Default::default()
            },
            progress: vec![ProgressEntry::new("success", Some(json!(1)))],
            ..Default::default()
        };
        let report = engine.score(&input);
        assert_eq!(report.score("correctness"), Some(1.0));
        assert!(
            report.final_score() > 0.6,
            "final score too low: {}",
            report.final_score()
        );
    }

    #[test]
    fn zero_cost_incurs_no_cost_penalty() {
        let report = ScoringEngine::without_judge().score(&EvaluationInput::default());
        assert_eq!(report.penalty("cost_penalty"), Some(0.0));
    }

    #[test]
    fn judge_is_used_when_request_and_output_present() {
        let engine = ScoringEngine::new(CorrectnessJudge::heuristic());
        let input = EvaluationInput {
            initial_request: Some("rename the report file".to_string()),
            final_output: Some("renamed the report file as requested".to_string()),
            ..Default::default()
        };
        let report = engine.score(&input);
        // The keyword heuristic sees full overlap; the progress heuristic
        // would have produced 0.1 from the empty progress trail.
        assert!(report.score("correctness").unwrap() > 0.5);
    }

    #[test]
    fn malformed_progress_contributes_nothing() {
        let engine = ScoringEngine::without_judge();
        let input = EvaluationInput {
            progress: vec![ProgressEntry::new("running", Some(json!({"pct": 50})))],
            ..Default::default()
        };
        let report = engine.score(&input);
        // 0.9 * 0 + 0.1 * 1/(1+0)
        assert_eq!(report.score("correctness"), Some(0.1));
    }
}
