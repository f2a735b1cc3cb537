//! HTTP endpoint handlers. These are thin wrappers that forward to the
//! engines; every error maps to a status code through `QuizError`.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use tracing::{info, instrument};

use crate::domain::{GameMode, MatchOutcome, MatchResultKind, Sport};
use crate::elo::LeaderboardPeriod;
use crate::error::QuizError;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> Json<HealthOut> {
  Json(HealthOut { status: "ok", service: env!("CARGO_PKG_NAME") })
}

#[instrument(level = "info", skip(state, body), fields(sport = %body.sport))]
pub async fn http_create_session(
  State(state): State<AppState>,
  Json(body): Json<CreateSessionIn>,
) -> Result<Json<CreateSessionOut>, QuizError> {
  let session_id = state.coordinator.create_session(&body.sport).await?;
  Ok(Json(CreateSessionOut { session_id }))
}

#[instrument(level = "info", skip(state, body), fields(session_id = %body.session_id))]
pub async fn http_next_question(
  State(state): State<AppState>,
  Json(body): Json<NextQuestionIn>,
) -> Result<Json<QuestionOut>, QuizError> {
  let question = state.coordinator.next_question(&body.session_id).await?;
  Ok(Json(QuestionOut::from(&question)))
}

#[instrument(level = "info", skip(state, body), fields(session_id = %body.session_id, question_id = %body.question_id))]
pub async fn http_submit_answer(
  State(state): State<AppState>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerOut>, QuizError> {
  let verdict = state
    .coordinator
    .submit_answer(&body.session_id, &body.question_id, &body.answer, body.time_taken_secs)
    .await?;
  Ok(Json(AnswerOut::from(verdict)))
}

#[instrument(level = "info", skip(state, body), fields(session_id = %body.session_id))]
pub async fn http_end_session(
  State(state): State<AppState>,
  Json(body): Json<EndSessionIn>,
) -> Result<Json<EndSessionOut>, QuizError> {
  let ended = state.coordinator.end_session(&body.session_id).await;
  Ok(Json(EndSessionOut { ended }))
}

fn parse_sport(key: &str) -> Result<Sport, QuizError> {
  Sport::from_key(key).ok_or_else(|| QuizError::InvalidSport(key.to_string()))
}

fn parse_mode(key: Option<&str>) -> Result<GameMode, QuizError> {
  match key {
    None => Ok(GameMode::Quiz),
    Some(k) => GameMode::from_key(k)
      .ok_or_else(|| QuizError::InvalidOutcome(format!("unknown game mode: '{}'", k))),
  }
}

#[instrument(level = "info", skip(state, body), fields(player_a = %body.player_a, result = %body.result))]
pub async fn http_record_match(
  State(state): State<AppState>,
  Json(body): Json<MatchIn>,
) -> Result<Json<MatchOut>, QuizError> {
  let result = match body.result.trim().to_lowercase().as_str() {
    "win_a" => MatchResultKind::WinA,
    "win_b" => MatchResultKind::WinB,
    "draw" => MatchResultKind::Draw,
    other => return Err(QuizError::InvalidOutcome(format!("unknown result: '{}'", other))),
  };
  let outcome = MatchOutcome {
    player_a: body.player_a,
    player_b: body.player_b,
    score_a: body.score_a,
    score_b: body.score_b,
    result,
    sport: parse_sport(&body.sport)?,
    mode: parse_mode(body.mode.as_deref())?,
    timestamp: Utc::now(),
  };
  let (rating_a, rating_b) = state.elo.record_match(outcome).await?;
  info!(target: "elo", player_a = %rating_a.entity_id, "HTTP match recorded");
  Ok(Json(MatchOut {
    player_a: RatingOut::from_rating(&rating_a, state.elo.tier_for(rating_a.elo_value)),
    player_b: rating_b
      .as_ref()
      .map(|r| RatingOut::from_rating(r, state.elo.tier_for(r.elo_value))),
  }))
}

#[instrument(level = "info", skip(state, q), fields(sport = %q.sport))]
pub async fn http_leaderboard(
  State(state): State<AppState>,
  Query(q): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardOut>, QuizError> {
  let sport = parse_sport(&q.sport)?;
  let mode = parse_mode(q.mode.as_deref())?;
  let period = match q.period.as_deref() {
    None => LeaderboardPeriod::AllTime,
    Some(p) => LeaderboardPeriod::from_key(p)
      .ok_or_else(|| QuizError::InvalidOutcome(format!("unknown period: '{}'", p)))?,
  };
  let limit = q.limit.unwrap_or(10).min(100);
  let entries = state
    .elo
    .get_leaderboard(sport, mode, period, limit)
    .await
    .iter()
    .map(|r| RatingOut::from_rating(r, state.elo.tier_for(r.elo_value)))
    .collect();
  Ok(Json(LeaderboardOut { entries }))
}

#[instrument(level = "info", skip(state, body), fields(sport = %body.sport))]
pub async fn http_start_survival(
  State(state): State<AppState>,
  Json(body): Json<SurvivalStartIn>,
) -> Result<Json<SurvivalRoundOut>, QuizError> {
  let round = state.survival.start_round(&body.sport, &body.player_a, &body.player_b).await?;
  Ok(Json(SurvivalRoundOut::from(&round)))
}

#[instrument(level = "info", skip(state, body), fields(round_id = %body.round_id))]
pub async fn http_next_survival_round(
  State(state): State<AppState>,
  Json(body): Json<RoundIdIn>,
) -> Result<Json<SurvivalRoundOut>, QuizError> {
  let round = state.survival.next_round(&body.round_id).await?;
  Ok(Json(SurvivalRoundOut::from(&round)))
}

#[instrument(level = "info", skip(state, body), fields(round_id = %body.round_id))]
pub async fn http_end_survival_round(
  State(state): State<AppState>,
  Json(body): Json<RoundIdIn>,
) -> Result<Json<RoundEndOut>, QuizError> {
  let ended = state.survival.end_round(&body.round_id).await;
  Ok(Json(RoundEndOut { ended }))
}

#[instrument(level = "info", skip(state, body), fields(round_id = %body.round_id, player = %body.player))]
pub async fn http_submit_guess(
  State(state): State<AppState>,
  Json(body): Json<GuessIn>,
) -> Result<Json<GuessOut>, QuizError> {
  let outcome = state.survival.submit_guess(&body.round_id, &body.player, &body.guess).await?;
  Ok(Json(GuessOut::from(outcome)))
}
