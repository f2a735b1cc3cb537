//! Elo rating engine: logistic expected score, configurable K tiering,
//! zero-sum two-player updates, leaderboards, and tier bands.
//!
//! Mutation is serialized per (entity, sport, mode) key through per-key
//! mutexes; distinct keys update independently. Two-player updates take both
//! locks in sorted key order.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument};

use crate::config::EloConfig;
use crate::domain::{GameMode, MatchOutcome, Rating, Sport};
use crate::error::QuizError;

/// Identity of one rating row.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RatingKey {
    pub entity_id: String,
    pub sport: Sport,
    pub mode: GameMode,
}

/// Time window for leaderboard queries, filtering on `updated_at`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardPeriod {
    AllTime,
    Monthly,
    Weekly,
}

impl LeaderboardPeriod {
    pub fn from_key(key: &str) -> Option<LeaderboardPeriod> {
        match key.trim().to_lowercase().as_str() {
            "" | "all" | "all_time" => Some(LeaderboardPeriod::AllTime),
            "monthly" | "month" => Some(LeaderboardPeriod::Monthly),
            "weekly" | "week" => Some(LeaderboardPeriod::Weekly),
            _ => None,
        }
    }

    fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            LeaderboardPeriod::AllTime => None,
            LeaderboardPeriod::Monthly => Some(now - Duration::days(30)),
            LeaderboardPeriod::Weekly => Some(now - Duration::days(7)),
        }
    }
}

pub struct EloRatingEngine {
    cfg: EloConfig,
    ratings: RwLock<HashMap<RatingKey, Arc<Mutex<Rating>>>>,
}

/// Expected score for a rating against an opponent rating.
fn expected_score(rating: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent - rating) / 400.0))
}

impl EloRatingEngine {
    pub fn new(cfg: EloConfig) -> Self {
        Self { cfg, ratings: RwLock::new(HashMap::new()) }
    }

    /// K-factor by provisional status; boundaries come from configuration.
    fn k_for(&self, games_played: u32) -> f64 {
        if games_played < self.cfg.provisional_games {
            self.cfg.k_provisional
        } else {
            self.cfg.k_standard
        }
    }

    fn fresh_rating(&self, key: &RatingKey) -> Rating {
        Rating {
            entity_id: key.entity_id.clone(),
            sport: key.sport,
            mode: key.mode,
            elo_value: self.cfg.seed_rating,
            games_played: 0,
            wins: 0,
            losses: 0,
            best_score: 0,
            updated_at: Utc::now(),
        }
    }

    /// Per-key lock handle, created at the seed rating on first sight.
    async fn handle(&self, key: &RatingKey) -> Arc<Mutex<Rating>> {
        let mut map = self.ratings.write().await;
        map.entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(self.fresh_rating(key))))
            .clone()
    }

    /// Apply one completed match. Returns the updated rating(s); the second
    /// slot is `None` for solo quiz matches scored against the par rating.
    #[instrument(level = "info", skip(self, outcome), fields(player_a = %outcome.player_a, sport = outcome.sport.key(), mode = outcome.mode.key()))]
    pub async fn record_match(
        &self,
        outcome: MatchOutcome,
    ) -> Result<(Rating, Option<Rating>), QuizError> {
        let actual_a = outcome.result.actual_a();
        let key_a = RatingKey {
            entity_id: outcome.player_a.clone(),
            sport: outcome.sport,
            mode: outcome.mode,
        };

        let Some(player_b) = outcome.player_b.clone() else {
            // Solo quiz: same formula against a fixed par opponent.
            let handle = self.handle(&key_a).await;
            let mut rating = handle.lock().await;
            let expected = expected_score(rating.elo_value, self.cfg.par_rating);
            let delta = self.k_for(rating.games_played) * (actual_a - expected);
            rating.elo_value += delta;
            apply_tally(&mut rating, actual_a, outcome.score_a);
            info!(target: "elo", entity = %rating.entity_id, elo = %format!("{:.1}", rating.elo_value), delta = %format!("{:+.1}", delta), "Solo match recorded");
            return Ok((rating.clone(), None));
        };

        if player_b == outcome.player_a {
            return Err(QuizError::InvalidOutcome("a player cannot face themselves".into()));
        }
        let key_b = RatingKey { entity_id: player_b, sport: outcome.sport, mode: outcome.mode };

        let handle_a = self.handle(&key_a).await;
        let handle_b = self.handle(&key_b).await;

        // Sorted acquisition order keeps concurrent two-player updates
        // deadlock-free regardless of who is listed first.
        let a_first = key_a <= key_b;
        let (first, second) = if a_first { (&handle_a, &handle_b) } else { (&handle_b, &handle_a) };
        let mut guard_one = first.lock().await;
        let mut guard_two = second.lock().await;
        let (rating_a, rating_b) = if a_first {
            (&mut *guard_one, &mut *guard_two)
        } else {
            (&mut *guard_two, &mut *guard_one)
        };

        let expected_a = expected_score(rating_a.elo_value, rating_b.elo_value);
        // A shared match K keeps the update zero-sum; the less-experienced
        // player's tier decides it.
        let k = self.k_for(rating_a.games_played.min(rating_b.games_played));
        let delta = k * (actual_a - expected_a);
        rating_a.elo_value += delta;
        rating_b.elo_value -= delta;
        apply_tally(rating_a, actual_a, outcome.score_a);
        apply_tally(rating_b, 1.0 - actual_a, outcome.score_b);
        info!(target: "elo", player_a = %rating_a.entity_id, player_b = %rating_b.entity_id, delta = %format!("{:+.1}", delta), "Match recorded");
        Ok((rating_a.clone(), Some(rating_b.clone())))
    }

    /// Ratings for one (sport, mode) ordered by elo descending, ties broken by
    /// games_played descending then entity_id ascending — a stable total order.
    pub async fn get_leaderboard(
        &self,
        sport: Sport,
        mode: GameMode,
        period: LeaderboardPeriod,
        limit: usize,
    ) -> Vec<Rating> {
        let handles: Vec<Arc<Mutex<Rating>>> = {
            let map = self.ratings.read().await;
            map.iter()
                .filter(|(k, _)| k.sport == sport && k.mode == mode)
                .map(|(_, v)| v.clone())
                .collect()
        };

        let cutoff = period.cutoff(Utc::now());
        let mut entries = Vec::with_capacity(handles.len());
        for handle in handles {
            let rating = handle.lock().await.clone();
            if cutoff.map_or(true, |c| rating.updated_at >= c) {
                entries.push(rating);
            }
        }
        entries.sort_by(|a, b| {
            b.elo_value
                .total_cmp(&a.elo_value)
                .then(b.games_played.cmp(&a.games_played))
                .then(a.entity_id.cmp(&b.entity_id))
        });
        entries.truncate(limit);
        entries
    }

    /// Pure mapping from elo value to the configured tier band name.
    pub fn tier_for(&self, elo_value: f64) -> &str {
        let mut name = self.cfg.tiers.first().map(|t| t.name.as_str()).unwrap_or("Unranked");
        for band in &self.cfg.tiers {
            if elo_value >= band.min {
                name = &band.name;
            }
        }
        name
    }
}

fn apply_tally(rating: &mut Rating, actual: f64, score: i64) {
    rating.games_played += 1;
    if actual > 0.5 {
        rating.wins += 1;
    } else if actual < 0.5 {
        rating.losses += 1;
    }
    rating.best_score = rating.best_score.max(score);
    rating.updated_at = Utc::now();
}
