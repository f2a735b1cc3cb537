//! Quiz answer grading shared by the coordinator and the HTTP layer.
//!
//! Grading is deliberately deterministic: normalized string equality for
//! correctness, and a difficulty-scaled score with a bounded time penalty.

use crate::config::QuizConfig;
use crate::util::normalize_answer;

/// Result of grading one submitted answer.
#[derive(Clone, Debug)]
pub struct AnswerVerdict {
  pub correct: bool,
  pub score_delta: i64,
  pub session_score: i64,
  pub correct_answer: String,
}

/// Normalized exact comparison; the same rule survival uses for guesses.
pub fn is_correct_answer(expected: &str, given: &str) -> bool {
  !expected.trim().is_empty() && normalize_answer(expected) == normalize_answer(given)
}

/// Points for one answer. Wrong answers score zero; correct answers earn a
/// difficulty-scaled base minus a time penalty, floored so a slow correct
/// answer still beats a wrong one.
pub fn score_delta(cfg: &QuizConfig, difficulty: u8, correct: bool, time_taken_secs: f32) -> i64 {
  if !correct {
    return 0;
  }
  let base = cfg.base_points * i64::from(difficulty);
  let penalty = (time_taken_secs.max(0.0).round() as i64) * cfg.time_penalty_per_sec;
  (base - penalty).max(base / 4)
}
