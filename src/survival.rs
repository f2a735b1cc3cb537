//! Two-player survival mode: name players matching sampled initials until
//! someone runs out of lives.
//!
//! Rounds are turn-based. A guess is correct only when its normalized form
//! (or a registered alias) resolves to an unconsumed pool name; naming an
//! already-consumed player costs a life like any other miss. Lives and
//! tallies carry across rounds of the same game; a finished game is fed to
//! the rating engine exactly once. Idle rounds expire on the same
//! lazy-check-plus-sweep scheme as quiz sessions.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::seq::SliceRandom;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::SurvivalConfig;
use crate::corpus::PlayerCorpus;
use crate::domain::{GameMode, MatchOutcome, MatchResultKind, RoundState, Sport, SurvivalRound};
use crate::elo::EloRatingEngine;
use crate::error::QuizError;
use crate::util::{name_initials, normalize_answer};

/// What one guess did to the round, as reported back to the guesser.
#[derive(Clone, Debug)]
pub struct GuessOutcome {
  pub correct: bool,
  pub message: String,
  pub remaining_lives: u8,
  pub state: RoundState,
  pub remaining_names: usize,
  pub winner: Option<String>,
}

pub struct SurvivalMatchEngine {
  rounds: RwLock<HashMap<String, SurvivalRound>>,
  corpus: Arc<dyn PlayerCorpus>,
  cfg: SurvivalConfig,
  elo: Arc<EloRatingEngine>,
}

impl SurvivalMatchEngine {
  pub fn new(corpus: Arc<dyn PlayerCorpus>, cfg: SurvivalConfig, elo: Arc<EloRatingEngine>) -> Self {
    Self { rounds: RwLock::new(HashMap::new()), corpus, cfg, elo }
  }

  fn ttl(&self) -> Duration {
    Duration::from_secs(self.cfg.round_ttl_secs)
  }

  /// Pick uniformly among the initials groups with at least two names, so
  /// both players get a shot before the pool can drain. Fails only when no
  /// such group exists in the corpus.
  fn sample_pool(
    &self,
    sport: Sport,
  ) -> Result<(String, HashMap<String, String>, HashMap<String, String>), QuizError> {
    let players = self.corpus.players(sport);
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, p) in players.iter().enumerate() {
      groups.entry(name_initials(&p.canonical)).or_default().push(i);
    }
    let viable: Vec<(String, Vec<usize>)> =
      groups.into_iter().filter(|(_, members)| members.len() >= 2).collect();

    let mut rng = rand::thread_rng();
    let Some((initials, members)) = viable.choose(&mut rng) else {
      warn!(target: "survival", sport = sport.key(), players = players.len(), "No initials shared by two or more players");
      return Err(QuizError::EmptyCandidatePool(String::new()));
    };

    let mut pool = HashMap::new();
    let mut aliases = HashMap::new();
    for &i in members {
      let p = &players[i];
      let canon = normalize_answer(&p.canonical);
      for alias in &p.aliases {
        aliases.insert(normalize_answer(alias), canon.clone());
      }
      pool.insert(canon, p.canonical.clone());
    }
    Ok((initials.clone(), pool, aliases))
  }

  #[instrument(level = "info", skip(self))]
  pub async fn start_round(
    &self,
    sport_key: &str,
    player_a: &str,
    player_b: &str,
  ) -> Result<SurvivalRound, QuizError> {
    let sport = Sport::from_key(sport_key)
      .ok_or_else(|| QuizError::InvalidSport(sport_key.to_string()))?;
    if player_a.trim().is_empty() || player_b.trim().is_empty() {
      return Err(QuizError::InvalidOutcome("both player ids are required".into()));
    }
    if player_a == player_b {
      return Err(QuizError::InvalidOutcome("a player cannot face themselves".into()));
    }

    let (initials, candidate_pool, alias_index) = self.sample_pool(sport)?;
    let round = SurvivalRound {
      round_id: Uuid::new_v4().to_string(),
      sport,
      deadline: Instant::now() + self.ttl(),
      initials: initials.clone(),
      players: [player_a.to_string(), player_b.to_string()],
      candidate_pool,
      alias_index,
      consumed_names: HashSet::new(),
      lives: [self.cfg.lives_per_player; 2],
      tallies: [0; 2],
      turn: 0,
      state: RoundState::Active,
    };
    self.rounds.write().await.insert(round.round_id.clone(), round.clone());
    info!(target: "survival", round_id = %round.round_id, sport = sport.key(), %initials, pool = round.candidate_pool.len(), "Survival round started");
    Ok(round)
  }

  /// Resolve a guess to a normalized pool key, via alias if needed.
  fn resolve<'a>(round: &'a SurvivalRound, guess_norm: &'a str) -> Option<&'a str> {
    if round.candidate_pool.contains_key(guess_norm) {
      return Some(guess_norm);
    }
    round
      .alias_index
      .get(guess_norm)
      .filter(|canon| round.candidate_pool.contains_key(*canon))
      .map(|canon| canon.as_str())
  }

  /// Fetch a round for mutation, removing it when the idle TTL has passed.
  fn live_round<'a>(
    rounds: &'a mut HashMap<String, SurvivalRound>,
    round_id: &str,
    now: Instant,
  ) -> Result<&'a mut SurvivalRound, QuizError> {
    let expired = match rounds.get(round_id) {
      None => return Err(QuizError::RoundNotFound(round_id.to_string())),
      Some(r) => r.is_expired(now),
    };
    if expired {
      rounds.remove(round_id);
      return Err(QuizError::RoundExpired(round_id.to_string()));
    }
    // Re-borrow mutably; the entry is known to exist and be live.
    rounds
      .get_mut(round_id)
      .ok_or_else(|| QuizError::RoundNotFound(round_id.to_string()))
  }

  #[instrument(level = "info", skip(self, guess))]
  pub async fn submit_guess(
    &self,
    round_id: &str,
    player: &str,
    guess: &str,
  ) -> Result<GuessOutcome, QuizError> {
    let finished: Option<MatchOutcome>;
    let outcome;
    {
      let mut rounds = self.rounds.write().await;
      let now = Instant::now();
      let round = Self::live_round(&mut rounds, round_id, now)?;
      if round.state != RoundState::Active {
        return Err(QuizError::RoundNotActive);
      }
      let idx = round
        .players
        .iter()
        .position(|p| p == player)
        .ok_or_else(|| QuizError::UnknownPlayer(player.to_string()))?;
      if idx != round.turn {
        return Err(QuizError::OutOfTurn);
      }

      let guess_norm = normalize_answer(guess);
      let (correct, message) = match Self::resolve(round, &guess_norm) {
        Some(canon) if !round.consumed_names.contains(canon) => {
          let canon = canon.to_string();
          let display = round.candidate_pool[&canon].clone();
          round.consumed_names.insert(canon);
          round.tallies[idx] += 1;
          (true, format!("Correct: {}", display))
        }
        Some(canon) => {
          let display = round.candidate_pool[canon].clone();
          (false, format!("{} was already named this round", display))
        }
        None => (false, format!("No {} player with initials {} matches that", round.sport.key(), round.initials)),
      };

      if !correct {
        round.lives[idx] = round.lives[idx].saturating_sub(1);
        if round.lives[idx] == 0 {
          round.state = RoundState::GameOver;
        }
      }
      if round.state == RoundState::Active
        && round.consumed_names.len() == round.candidate_pool.len()
      {
        round.state = RoundState::RoundComplete;
      }
      round.turn = 1 - round.turn;
      round.deadline = now + self.ttl();

      let winner = match round.state {
        RoundState::GameOver => Some(round.players[1 - idx].clone()),
        _ => None,
      };
      finished = winner.as_ref().map(|w| MatchOutcome {
        player_a: round.players[0].clone(),
        player_b: Some(round.players[1].clone()),
        score_a: i64::from(round.tallies[0]),
        score_b: i64::from(round.tallies[1]),
        result: if *w == round.players[0] { MatchResultKind::WinA } else { MatchResultKind::WinB },
        sport: round.sport,
        mode: GameMode::Survival,
        timestamp: Utc::now(),
      });

      info!(target: "survival", %round_id, %player, %correct, state = ?round.state, remaining = round.candidate_pool.len() - round.consumed_names.len(), "Guess processed");
      outcome = GuessOutcome {
        correct,
        message,
        remaining_lives: round.lives[idx],
        state: round.state,
        remaining_names: round.candidate_pool.len() - round.consumed_names.len(),
        winner,
      };
    }

    // Rating update happens after the round lock is released; the round is
    // already marked GameOver, so a second submission cannot double-record.
    if let Some(record) = finished {
      self.elo.record_match(record).await?;
    }
    Ok(outcome)
  }

  /// Continue a completed round with a fresh pool. Lives, tallies and turn
  /// carry over; only the name pool resets.
  #[instrument(level = "info", skip(self))]
  pub async fn next_round(&self, round_id: &str) -> Result<SurvivalRound, QuizError> {
    let mut rounds = self.rounds.write().await;
    let now = Instant::now();
    let round = Self::live_round(&mut rounds, round_id, now)?;
    if round.state != RoundState::RoundComplete {
      return Err(QuizError::RoundNotActive);
    }

    let (initials, candidate_pool, alias_index) = self.sample_pool(round.sport)?;
    round.initials = initials;
    round.candidate_pool = candidate_pool;
    round.alias_index = alias_index;
    round.consumed_names = HashSet::new();
    round.state = RoundState::Active;
    round.deadline = now + self.ttl();
    info!(target: "survival", %round_id, initials = %round.initials, pool = round.candidate_pool.len(), "Next survival round started");
    Ok(round.clone())
  }

  /// Drop a finished round once both clients have seen the result.
  pub async fn end_round(&self, round_id: &str) -> bool {
    self.rounds.write().await.remove(round_id).is_some()
  }

  /// Remove idle-expired rounds; returns how many were dropped.
  pub async fn sweep_expired(&self) -> usize {
    let mut rounds = self.rounds.write().await;
    let now = Instant::now();
    let before = rounds.len();
    rounds.retain(|_, r| !r.is_expired(now));
    let removed = before - rounds.len();
    if removed > 0 {
      info!(target: "survival", removed, remaining = rounds.len(), "Swept expired rounds");
    }
    removed
  }

  #[cfg(test)]
  pub async fn round_count(&self) -> usize {
    self.rounds.read().await.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::EloConfig;
  use crate::corpus::SeedCorpus;
  use crate::domain::PlayerRecord;
  use crate::elo::LeaderboardPeriod;

  fn football_player(canonical: &str, aliases: &[&str]) -> PlayerRecord {
    PlayerRecord {
      canonical: canonical.into(),
      aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
      position: "midfielder".into(),
      nationality: "n/a".into(),
      era_start: 2000,
      sport: Sport::Football,
    }
  }

  fn engine_over(players: Vec<PlayerRecord>, cfg: SurvivalConfig) -> SurvivalMatchEngine {
    let corpus = Arc::new(SeedCorpus::from_parts(vec![], players));
    let elo = Arc::new(EloRatingEngine::new(EloConfig::default()));
    SurvivalMatchEngine::new(corpus, cfg, elo)
  }

  /// Every player shares the initials "LM", so the pool contents are fully
  /// deterministic.
  fn engine_with(lives: u8) -> SurvivalMatchEngine {
    let players = vec![
      football_player("Lionel Messi", &["Leo Messi"]),
      football_player("Luka Modrić", &["Luka Modric"]),
      football_player("Lothar Matthäus", &["Lothar Matthaus"]),
    ];
    engine_over(players, SurvivalConfig { lives_per_player: lives, ..SurvivalConfig::default() })
  }

  #[tokio::test]
  async fn guesses_match_aliases_and_diacritic_free_spellings() {
    let engine = engine_with(3);
    let round = engine.start_round("football", "ann", "ben").await.expect("round");
    assert_eq!(round.initials, "LM");
    assert_eq!(round.candidate_pool.len(), 3);

    let first = engine.submit_guess(&round.round_id, "ann", "luka modric").await.expect("guess");
    assert!(first.correct, "{}", first.message);
    assert_eq!(first.remaining_names, 2);

    let second = engine.submit_guess(&round.round_id, "ben", "Leo Messi").await.expect("guess");
    assert!(second.correct, "{}", second.message);
  }

  #[tokio::test]
  async fn one_viable_initials_group_among_many_singletons_always_starts() {
    // 14 players, exactly two of whom share initials. Selection works over
    // initials groups, so every start must find the lone viable pair.
    let mut players = vec![
      football_player("Lionel Messi", &[]),
      football_player("Luka Modrić", &[]),
    ];
    for name in [
      "Cristiano Ronaldo",
      "Neymar Silva",
      "Kylian Mbappé",
      "Manuel Neuer",
      "Hugo Lloris",
      "Sergio Ramos",
      "Virgil van Dijk",
      "Zlatan Ibrahimović",
      "Thomas Müller",
      "Andrés Iniesta",
      "Gareth Bale",
      "Erling Haaland",
    ] {
      players.push(football_player(name, &[]));
    }
    let engine = engine_over(players, SurvivalConfig::default());

    for i in 0..200 {
      let round = engine
        .start_round("football", "ann", "ben")
        .await
        .unwrap_or_else(|e| panic!("start {} failed despite a viable pool: {}", i, e));
      assert_eq!(round.initials, "LM");
      assert_eq!(round.candidate_pool.len(), 2);
    }
  }

  #[tokio::test]
  async fn consumed_names_cost_a_life_with_a_distinct_message() {
    let engine = engine_with(3);
    let round = engine.start_round("football", "ann", "ben").await.expect("round");

    engine.submit_guess(&round.round_id, "ann", "Lionel Messi").await.expect("guess");
    let dup = engine.submit_guess(&round.round_id, "ben", "Leo Messi").await.expect("guess");
    assert!(!dup.correct);
    assert!(dup.message.contains("already named"), "got: {}", dup.message);
    assert_eq!(dup.remaining_lives, 2);
  }

  #[tokio::test]
  async fn turn_order_is_enforced_and_alternates_on_misses_too() {
    let engine = engine_with(3);
    let round = engine.start_round("football", "ann", "ben").await.expect("round");

    let err = engine.submit_guess(&round.round_id, "ben", "Lionel Messi").await.unwrap_err();
    assert!(matches!(err, QuizError::OutOfTurn));

    let miss = engine.submit_guess(&round.round_id, "ann", "nobody at all").await.expect("guess");
    assert!(!miss.correct);
    // A miss still passes the turn.
    let next = engine.submit_guess(&round.round_id, "ben", "Lionel Messi").await.expect("guess");
    assert!(next.correct);

    let err = engine.submit_guess(&round.round_id, "carl", "x").await.unwrap_err();
    assert!(matches!(err, QuizError::UnknownPlayer(_)));
  }

  #[tokio::test]
  async fn exhausting_the_pool_completes_the_round_and_carries_lives() {
    let engine = engine_with(3);
    let round = engine.start_round("football", "ann", "ben").await.expect("round");

    engine.submit_guess(&round.round_id, "ann", "Lionel Messi").await.expect("g");
    engine.submit_guess(&round.round_id, "ben", "nope").await.expect("g");
    engine.submit_guess(&round.round_id, "ann", "Luka Modrić").await.expect("g");
    let last = engine.submit_guess(&round.round_id, "ben", "Lothar Matthäus").await.expect("g");
    assert_eq!(last.state, RoundState::RoundComplete);
    assert_eq!(last.remaining_names, 0);

    let err = engine.submit_guess(&round.round_id, "ann", "x").await.unwrap_err();
    assert!(matches!(err, QuizError::RoundNotActive));

    let next = engine.next_round(&round.round_id).await.expect("next round");
    assert_eq!(next.state, RoundState::Active);
    assert!(next.consumed_names.is_empty());
    // ben's earlier miss is still paid for.
    assert_eq!(next.lives, [3, 2]);
    assert_eq!(next.tallies, [2, 1]);
  }

  #[tokio::test]
  async fn running_out_of_lives_ends_the_game_and_records_the_match() {
    let engine = engine_with(1);
    let round = engine.start_round("football", "ann", "ben").await.expect("round");

    let out = engine.submit_guess(&round.round_id, "ann", "not a player").await.expect("guess");
    assert_eq!(out.state, RoundState::GameOver);
    assert_eq!(out.remaining_lives, 0);
    assert_eq!(out.winner.as_deref(), Some("ben"));

    let board = engine
      .elo
      .get_leaderboard(Sport::Football, GameMode::Survival, LeaderboardPeriod::AllTime, 10)
      .await;
    assert_eq!(board.len(), 2);
    assert_eq!(board[0].entity_id, "ben");
    assert!(board[0].elo_value > board[1].elo_value);

    let err = engine.submit_guess(&round.round_id, "ben", "Lionel Messi").await.unwrap_err();
    assert!(matches!(err, QuizError::RoundNotActive));
    assert!(engine.end_round(&round.round_id).await);
  }

  #[tokio::test]
  async fn idle_rounds_expire_and_get_swept() {
    let players = vec![
      football_player("Lionel Messi", &[]),
      football_player("Luka Modrić", &[]),
    ];
    let engine = engine_over(players, SurvivalConfig { round_ttl_secs: 0, lives_per_player: 3 });
    let round = engine.start_round("football", "ann", "ben").await.expect("round");

    let err = engine.submit_guess(&round.round_id, "ann", "Lionel Messi").await.unwrap_err();
    assert!(matches!(err, QuizError::RoundExpired(_)));
    // Lazy removal already happened; a second access is a plain miss.
    let err = engine.submit_guess(&round.round_id, "ann", "Lionel Messi").await.unwrap_err();
    assert!(matches!(err, QuizError::RoundNotFound(_)));

    engine.start_round("football", "ann", "ben").await.expect("round");
    engine.start_round("football", "cara", "dan").await.expect("round");
    assert_eq!(engine.sweep_expired().await, 2);
    assert_eq!(engine.round_count().await, 0);
  }

  #[tokio::test]
  async fn corpus_without_shared_initials_cannot_start_a_round() {
    let no_pairs = vec![
      football_player("Lionel Messi", &[]),
      football_player("Cristiano Ronaldo", &[]),
      football_player("Neymar Silva", &[]),
    ];
    let engine = engine_over(no_pairs, SurvivalConfig::default());
    let err = engine.start_round("football", "ann", "ben").await.unwrap_err();
    assert!(matches!(err, QuizError::EmptyCandidatePool(_)));

    let empty = engine_over(vec![], SurvivalConfig::default());
    let err = empty.start_round("football", "ann", "ben").await.unwrap_err();
    assert!(matches!(err, QuizError::EmptyCandidatePool(_)));
  }

  #[tokio::test]
  async fn players_must_be_distinct_and_sport_known() {
    let engine = engine_with(3);
    let err = engine.start_round("football", "ann", "ann").await.unwrap_err();
    assert!(matches!(err, QuizError::InvalidOutcome(_)));
    let err = engine.start_round("cricket", "ann", "ben").await.unwrap_err();
    assert!(matches!(err, QuizError::InvalidSport(_)));
  }
}
