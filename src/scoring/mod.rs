//! Scoring engine: deterministic, rule-based transcript evaluation.
//!
//! The scorer is intentionally a transparent, reproducible heuristic: named
//! keyword sets over the trainee's side of the transcript, a rudeness gate,
//! and fixed arithmetic. It is not, and does not try to be, an ML classifier.

pub mod engine;
pub mod keywords;
pub mod report;

pub use engine::{evaluate, is_passing, score_label, EvaluationResult, PASS_THRESHOLD};
