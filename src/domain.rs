//! Domain models used by the backend: facts, questions, sessions, ratings,
//! match outcomes, and survival rounds.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::util::slug;

/// Sports with a registered question generator. Anything else is `InvalidSport`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
  Football,
  Basketball,
  Tennis,
}

impl Sport {
  pub const ALL: [Sport; 3] = [Sport::Football, Sport::Basketball, Sport::Tennis];

  pub fn from_key(key: &str) -> Option<Sport> {
    match key.trim().to_lowercase().as_str() {
      "football" | "soccer" => Some(Sport::Football),
      "basketball" => Some(Sport::Basketball),
      "tennis" => Some(Sport::Tennis),
      _ => None,
    }
  }

  pub fn key(&self) -> &'static str {
    match self {
      Sport::Football => "football",
      Sport::Basketball => "basketball",
      Sport::Tennis => "tennis",
    }
  }
}

/// Category of a trivia fact. Decides the prompt template and how distractor
/// candidates are ranked for closeness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactCategory {
  /// Numeric career totals: goals, titles, points, aces.
  CareerStat,
  /// Years of debuts, finals, transfers, records.
  LandmarkYear,
  /// Player identities: who scored / won / partnered.
  PlayerLink,
}

impl FactCategory {
  pub fn key(&self) -> &'static str {
    match self {
      FactCategory::CareerStat => "career_stat",
      FactCategory::LandmarkYear => "landmark_year",
      FactCategory::PlayerLink => "player_link",
    }
  }
}

/// Typed fact value; the kind also selects the distractor strategy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactValue {
  Number(f64),
  Year(i32),
  Name(String),
}

impl FactValue {
  /// Human-readable form used for answers and options.
  pub fn display(&self) -> String {
    match self {
      FactValue::Number(n) => {
        if n.fract() == 0.0 { format!("{}", *n as i64) } else { format!("{:.1}", n) }
      }
      FactValue::Year(y) => y.to_string(),
      FactValue::Name(n) => n.clone(),
    }
  }
}

/// Immutable atomic trivia datum loaded from the corpus.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Fact {
  pub subject: String,
  pub category: FactCategory,
  /// Short phrase completing the prompt template, e.g. "score in league play".
  pub detail: String,
  pub value: FactValue,
  pub sport: Sport,
  /// 0.0 = common knowledge, 1.0 = obscure. Drives selection weight and difficulty.
  pub rarity: f32,
}

impl Fact {
  /// Stable content-derived question id, so per-session exclusion sets are
  /// meaningful across calls. Fallback questions use a disjoint `fallback:` space.
  pub fn question_id(&self) -> String {
    format!(
      "{}:{}:{}",
      self.sport.key(),
      self.category.key(),
      slug(&format!("{} {}", self.subject, self.detail))
    )
  }
}

/// A multiple-choice question as served to a session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
  pub id: String,
  pub prompt: String,
  pub category: FactCategory,
  pub correct_answer: String,
  /// Exactly one correct option among `k` normalized-distinct options.
  pub options: Vec<String>,
  /// 1 (easy) ..= 5 (hard).
  pub difficulty: u8,
  pub sport: Sport,
  pub created_at: DateTime<Utc>,
}

/// In-memory per-session quiz state. Never serialized; the TTL deadline is a
/// monotonic instant.
#[derive(Clone, Debug)]
pub struct QuizSession {
  pub session_id: String,
  pub sport: Sport,
  pub started_at: DateTime<Utc>,
  pub deadline: Instant,
  /// Grows monotonically; the no-repeat guarantee checks against this.
  pub asked_question_ids: HashSet<String>,
  /// Issued questions retained for grading, keyed by question id.
  pub issued: HashMap<String, Question>,
  pub score: i64,
}

impl QuizSession {
  pub fn is_expired(&self, now: Instant) -> bool {
    now >= self.deadline
  }
}

/// Competitive mode a rating belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
  Quiz,
  Survival,
}

impl GameMode {
  pub fn from_key(key: &str) -> Option<GameMode> {
    match key.trim().to_lowercase().as_str() {
      "quiz" => Some(GameMode::Quiz),
      "survival" => Some(GameMode::Survival),
      _ => None,
    }
  }

  pub fn key(&self) -> &'static str {
    match self {
      GameMode::Quiz => "quiz",
      GameMode::Survival => "survival",
    }
  }
}

/// Per-(entity, sport, mode) skill record. Seeded on first match, mutated
/// atomically per match, never deleted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Rating {
  pub entity_id: String,
  pub sport: Sport,
  pub mode: GameMode,
  pub elo_value: f64,
  pub games_played: u32,
  pub wins: u32,
  pub losses: u32,
  pub best_score: i64,
  pub updated_at: DateTime<Utc>,
}

/// Result of a finished match from player A's perspective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResultKind {
  WinA,
  WinB,
  Draw,
}

impl MatchResultKind {
  /// Actual score for the Elo update (A's perspective).
  pub fn actual_a(&self) -> f64 {
    match self {
      MatchResultKind::WinA => 1.0,
      MatchResultKind::Draw => 0.5,
      MatchResultKind::WinB => 0.0,
    }
  }
}

/// Completed-match record consumed once by the rating engine.
/// `player_b = None` is a solo quiz scored against the configured par rating.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchOutcome {
  pub player_a: String,
  pub player_b: Option<String>,
  pub score_a: i64,
  pub score_b: i64,
  pub result: MatchResultKind,
  pub sport: Sport,
  pub mode: GameMode,
  pub timestamp: DateTime<Utc>,
}

/// Lifecycle of a survival round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
  Active,
  RoundComplete,
  GameOver,
}

/// One survival guessing round. The candidate pool is keyed by normalized
/// canonical name; `consumed_names` is always a subset of the pool keys.
#[derive(Clone, Debug)]
pub struct SurvivalRound {
  pub round_id: String,
  pub sport: Sport,
  /// Idle-TTL deadline, refreshed on every guess like a quiz session's.
  pub deadline: Instant,
  pub initials: String,
  pub players: [String; 2],
  /// normalized canonical -> display form
  pub candidate_pool: HashMap<String, String>,
  /// normalized alias -> normalized canonical
  pub alias_index: HashMap<String, String>,
  pub consumed_names: HashSet<String>,
  pub lives: [u8; 2],
  /// Correct guesses per player across the whole game; used as match score.
  pub tallies: [u32; 2],
  /// Index into `players` of whoever guesses next.
  pub turn: usize,
  pub state: RoundState,
}

impl SurvivalRound {
  pub fn is_expired(&self, now: Instant) -> bool {
    now >= self.deadline
  }
}

/// Canonical player entry from the corpus: definitive name plus accepted
/// alternate spellings and the metadata distractor clustering needs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerRecord {
  pub canonical: String,
  #[serde(default)]
  pub aliases: Vec<String>,
  pub position: String,
  pub nationality: String,
  /// First professional year; used for era clustering.
  pub era_start: i32,
  pub sport: Sport,
}
