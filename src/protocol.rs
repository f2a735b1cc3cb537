//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! `QuestionOut` deliberately omits the correct answer; grading happens
//! server-side against the issued question.

use serde::{Deserialize, Serialize};

use crate::domain::{FactCategory, Question, Rating, RoundState, Sport, SurvivalRound};
use crate::logic::AnswerVerdict;
use crate::survival::GuessOutcome;

#[derive(Debug, Deserialize)]
pub struct CreateSessionIn {
    pub sport: String,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionOut {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionOut {
    #[serde(rename = "questionId")]
    pub question_id: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub category: FactCategory,
    pub difficulty: u8,
    pub sport: Sport,
}

impl From<&Question> for QuestionOut {
    fn from(q: &Question) -> Self {
        Self {
            question_id: q.id.clone(),
            prompt: q.prompt.clone(),
            options: q.options.clone(),
            category: q.category,
            difficulty: q.difficulty,
            sport: q.sport,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NextQuestionIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "questionId")]
    pub question_id: String,
    pub answer: String,
    #[serde(rename = "timeTakenSecs", default)]
    pub time_taken_secs: f32,
}

#[derive(Debug, Serialize)]
pub struct AnswerOut {
    pub correct: bool,
    #[serde(rename = "scoreDelta")]
    pub score_delta: i64,
    #[serde(rename = "sessionScore")]
    pub session_score: i64,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
}

impl From<AnswerVerdict> for AnswerOut {
    fn from(v: AnswerVerdict) -> Self {
        Self {
            correct: v.correct,
            score_delta: v.score_delta,
            session_score: v.session_score,
            correct_answer: v.correct_answer,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EndSessionIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct EndSessionOut {
    pub ended: bool,
}

/// A finished match as reported by a client or the survival engine.
#[derive(Debug, Deserialize)]
pub struct MatchIn {
    #[serde(rename = "playerA")]
    pub player_a: String,
    #[serde(rename = "playerB", default)]
    pub player_b: Option<String>,
    #[serde(rename = "scoreA", default)]
    pub score_a: i64,
    #[serde(rename = "scoreB", default)]
    pub score_b: i64,
    /// "win_a" | "win_b" | "draw"
    pub result: String,
    pub sport: String,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RatingOut {
    #[serde(rename = "entityId")]
    pub entity_id: String,
    pub sport: Sport,
    pub mode: String,
    pub elo: f64,
    pub tier: String,
    #[serde(rename = "gamesPlayed")]
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    #[serde(rename = "bestScore")]
    pub best_score: i64,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl RatingOut {
    pub fn from_rating(r: &Rating, tier: &str) -> Self {
        Self {
            entity_id: r.entity_id.clone(),
            sport: r.sport,
            mode: r.mode.key().to_string(),
            elo: r.elo_value,
            tier: tier.to_string(),
            games_played: r.games_played,
            wins: r.wins,
            losses: r.losses,
            best_score: r.best_score,
            updated_at: r.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MatchOut {
    #[serde(rename = "playerA")]
    pub player_a: RatingOut,
    #[serde(rename = "playerB")]
    pub player_b: Option<RatingOut>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub sport: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardOut {
    pub entries: Vec<RatingOut>,
}

#[derive(Debug, Deserialize)]
pub struct SurvivalStartIn {
    pub sport: String,
    #[serde(rename = "playerA")]
    pub player_a: String,
    #[serde(rename = "playerB")]
    pub player_b: String,
}

#[derive(Debug, Serialize)]
pub struct SurvivalRoundOut {
    #[serde(rename = "roundId")]
    pub round_id: String,
    pub sport: Sport,
    pub initials: String,
    pub players: [String; 2],
    #[serde(rename = "poolSize")]
    pub pool_size: usize,
    #[serde(rename = "remainingNames")]
    pub remaining_names: usize,
    pub lives: [u8; 2],
    pub tallies: [u32; 2],
    #[serde(rename = "turnPlayer")]
    pub turn_player: String,
    pub state: RoundState,
}

impl From<&SurvivalRound> for SurvivalRoundOut {
    fn from(r: &SurvivalRound) -> Self {
        Self {
            round_id: r.round_id.clone(),
            sport: r.sport,
            initials: r.initials.clone(),
            players: r.players.clone(),
            pool_size: r.candidate_pool.len(),
            remaining_names: r.candidate_pool.len() - r.consumed_names.len(),
            lives: r.lives,
            tallies: r.tallies,
            turn_player: r.players[r.turn].clone(),
            state: r.state,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RoundIdIn {
    #[serde(rename = "roundId")]
    pub round_id: String,
}

#[derive(Debug, Serialize)]
pub struct RoundEndOut {
    pub ended: bool,
}

#[derive(Debug, Deserialize)]
pub struct GuessIn {
    #[serde(rename = "roundId")]
    pub round_id: String,
    pub player: String,
    pub guess: String,
}

#[derive(Debug, Serialize)]
pub struct GuessOut {
    pub correct: bool,
    pub message: String,
    #[serde(rename = "remainingLives")]
    pub remaining_lives: u8,
    #[serde(rename = "remainingNames")]
    pub remaining_names: usize,
    pub state: RoundState,
    pub winner: Option<String>,
}

impl From<GuessOutcome> for GuessOut {
    fn from(g: GuessOutcome) -> Self {
        Self {
            correct: g.correct,
            message: g.message,
            remaining_lives: g.remaining_lives,
            remaining_names: g.remaining_names,
            state: g.state,
            winner: g.winner,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub status: &'static str,
    pub service: &'static str,
}
