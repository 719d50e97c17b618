// Engine layer - correctness judgment and multi-factor scoring.
// Pure evaluation logic; the only outbound call is the judge's bounded
// chat-completion request, and every failure there degrades to a local
// heuristic instead of propagating.

mod chat;
pub mod judge;
pub mod scoring;
pub mod summary;

pub use judge::{CorrectnessJudge, JudgeConfig, Judgment};
pub use scoring::{EvaluationInput, ScoringEngine};
pub use summary::EvaluationSummarizer;
