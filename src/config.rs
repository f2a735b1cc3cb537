//! Loading application configuration (tunables + optional fact bank) from TOML.
//!
//! See `AppConfig` for the expected schema. Every boundary the rating and
//! session engines depend on (TTL, retry bound, K tiers, tier bands, lives)
//! lives here rather than as in-code constants.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Fact, FactCategory, FactValue, Sport};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub quiz: QuizConfig,
  #[serde(default)]
  pub elo: EloConfig,
  #[serde(default)]
  pub survival: SurvivalConfig,
  /// Optional extra facts merged into the corpus at startup.
  #[serde(default)]
  pub facts: Vec<FactCfg>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct QuizConfig {
  pub session_ttl_secs: u64,
  /// Options per question, correct answer included.
  pub option_count: usize,
  /// Bounded retry count before degrading to the fallback pool.
  pub max_generation_retries: usize,
  pub base_points: i64,
  pub time_penalty_per_sec: i64,
}

impl Default for QuizConfig {
  fn default() -> Self {
    Self {
      session_ttl_secs: 900,
      option_count: 4,
      max_generation_retries: 5,
      base_points: 100,
      time_penalty_per_sec: 2,
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
pub struct EloConfig {
  /// Rating assigned on an entity's first match.
  pub seed_rating: f64,
  /// K while `games_played < provisional_games`, then `k_standard`.
  pub k_provisional: f64,
  pub k_standard: f64,
  pub provisional_games: u32,
  /// Opponent rating for solo quiz matches.
  pub par_rating: f64,
  /// Ascending bands; an elo value maps to the last band whose `min` it reaches.
  pub tiers: Vec<TierBand>,
}

impl Default for EloConfig {
  fn default() -> Self {
    Self {
      seed_rating: 1200.0,
      k_provisional: 40.0,
      k_standard: 24.0,
      provisional_games: 10,
      par_rating: 1200.0,
      tiers: vec![
        TierBand { min: 0.0, name: "Bronze".into() },
        TierBand { min: 1200.0, name: "Silver".into() },
        TierBand { min: 1400.0, name: "Gold".into() },
        TierBand { min: 1600.0, name: "Platinum".into() },
        TierBand { min: 1800.0, name: "Diamond".into() },
      ],
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
pub struct TierBand {
  pub min: f64,
  pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SurvivalConfig {
  pub lives_per_player: u8,
  /// Rounds idle longer than this are expired like quiz sessions.
  pub round_ttl_secs: u64,
}

impl Default for SurvivalConfig {
  fn default() -> Self {
    Self { lives_per_player: 3, round_ttl_secs: 1800 }
  }
}

impl AppConfig {
  /// Repair out-of-range tunables instead of refusing to start.
  /// `option_count` below 2 would leave no room for a single distractor.
  pub fn sanitized(mut self) -> Self {
    if self.quiz.option_count < 2 {
      error!(target: "quiz", option_count = self.quiz.option_count, "option_count must be at least 2; using the default");
      self.quiz.option_count = QuizConfig::default().option_count;
    }
    self
  }
}

/// Fact entry accepted in TOML configuration.
/// Exactly one of `number` / `year` / `name` should be filled.
#[derive(Clone, Debug, Deserialize)]
pub struct FactCfg {
  pub sport: String,
  pub category: FactCategory,
  pub subject: String,
  pub detail: String,
  #[serde(default)] pub number: Option<f64>,
  #[serde(default)] pub year: Option<i32>,
  #[serde(default)] pub name: Option<String>,
  #[serde(default)] pub rarity: Option<f32>,
}

impl FactCfg {
  /// Validate a bank entry into a `Fact`; `None` means the entry is skipped.
  pub fn into_fact(self) -> Option<Fact> {
    let sport = match Sport::from_key(&self.sport) {
      Some(s) => s,
      None => {
        error!(target: "quiz", sport = %self.sport, subject = %self.subject, "Skipping bank fact: unknown sport.");
        return None;
      }
    };
    let value = match (self.number, self.year, self.name) {
      (Some(n), None, None) => FactValue::Number(n),
      (None, Some(y), None) => FactValue::Year(y),
      (None, None, Some(n)) if !n.trim().is_empty() => FactValue::Name(n),
      _ => {
        error!(target: "quiz", subject = %self.subject, "Skipping bank fact: exactly one of number/year/name required.");
        return None;
      }
    };
    Some(Fact {
      subject: self.subject,
      category: self.category,
      detail: self.detail,
      value,
      sport,
      rarity: self.rarity.unwrap_or(0.5).clamp(0.0, 1.0),
    })
  }
}

/// Attempt to load `AppConfig` from APP_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("APP_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "sportsquiz_backend", %path, "Loaded app config (TOML)");
        Some(cfg.sanitized())
      }
      Err(e) => {
        error!(target: "sportsquiz_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "sportsquiz_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_sane() {
    let cfg = AppConfig::default();
    assert_eq!(cfg.quiz.option_count, 4);
    assert_eq!(cfg.quiz.max_generation_retries, 5);
    assert_eq!(cfg.elo.seed_rating, 1200.0);
    assert!(cfg.elo.k_provisional > cfg.elo.k_standard);
    assert!(!cfg.elo.tiers.is_empty());
  }

  #[test]
  fn bank_fact_requires_exactly_one_value() {
    let ok = FactCfg {
      sport: "football".into(),
      category: FactCategory::LandmarkYear,
      subject: "Leicester City".into(),
      detail: "win the Premier League".into(),
      number: None,
      year: Some(2016),
      name: None,
      rarity: Some(0.7),
    };
    assert!(ok.into_fact().is_some());

    let both = FactCfg {
      sport: "football".into(),
      category: FactCategory::CareerStat,
      subject: "x".into(),
      detail: "y".into(),
      number: Some(1.0),
      year: Some(2000),
      name: None,
      rarity: None,
    };
    assert!(both.into_fact().is_none());
  }

  #[test]
  fn degenerate_option_count_is_repaired() {
    let cfg: AppConfig = toml::from_str(
      r#"
      [quiz]
      session_ttl_secs = 900
      option_count = 0
      max_generation_retries = 5
      base_points = 100
      time_penalty_per_sec = 2
      "#,
    )
    .expect("parse");
    let cfg = cfg.sanitized();
    assert_eq!(cfg.quiz.option_count, QuizConfig::default().option_count);
  }

  #[test]
  fn toml_sections_are_optional() {
    let cfg: AppConfig = toml::from_str(
      r#"
      [quiz]
      session_ttl_secs = 60
      option_count = 5
      max_generation_retries = 3
      base_points = 50
      time_penalty_per_sec = 1

      [[facts]]
      sport = "tennis"
      category = "career_stat"
      subject = "Rafael Nadal"
      detail = "win at Roland Garros"
      number = 14.0
      "#,
    )
    .expect("parse");
    assert_eq!(cfg.quiz.option_count, 5);
    assert_eq!(cfg.elo.seed_rating, 1200.0); // default section
    assert_eq!(cfg.facts.len(), 1);
  }
}
