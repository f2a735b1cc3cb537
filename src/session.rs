//! Session-scoped quiz coordination: per-session question history, a
//! no-repeat guarantee, bounded retries with fallback degradation, and TTL
//! expiry (lazy check-on-access plus a periodic sweep).

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::QuizConfig;
use crate::domain::{Question, QuizSession, Sport};
use crate::error::QuizError;
use crate::logic::{is_correct_answer, score_delta, AnswerVerdict};
use crate::question::{FallbackQuestionPool, GeneratorRegistry};

pub struct QuizSessionCoordinator {
    sessions: RwLock<HashMap<String, QuizSession>>,
    registry: GeneratorRegistry,
    fallback: FallbackQuestionPool,
    cfg: QuizConfig,
}

impl QuizSessionCoordinator {
    pub fn new(registry: GeneratorRegistry, cfg: QuizConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            registry,
            fallback: FallbackQuestionPool::new(),
            cfg,
        }
    }

    fn ttl(&self) -> Duration {
        Duration::from_secs(self.cfg.session_ttl_secs)
    }

    #[instrument(level = "info", skip(self))]
    pub async fn create_session(&self, sport_key: &str) -> Result<String, QuizError> {
        let sport = Sport::from_key(sport_key)
            .filter(|s| self.registry.get(*s).is_some())
            .ok_or_else(|| QuizError::InvalidSport(sport_key.to_string()))?;

        let session_id = Uuid::new_v4().to_string();
        let session = QuizSession {
            session_id: session_id.clone(),
            sport,
            started_at: Utc::now(),
            deadline: Instant::now() + self.ttl(),
            asked_question_ids: HashSet::new(),
            issued: HashMap::new(),
            score: 0,
        };
        self.sessions.write().await.insert(session_id.clone(), session);
        info!(target: "quiz", %session_id, sport = sport.key(), "Session created");
        Ok(session_id)
    }

    /// Validate the session (lazy expiry removal) and snapshot what generation
    /// needs, so the corpus work below runs outside the lock.
    async fn snapshot(&self, session_id: &str) -> Result<(Sport, HashSet<String>), QuizError> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        match sessions.get(session_id) {
            None => Err(QuizError::SessionNotFound(session_id.to_string())),
            Some(s) if s.is_expired(now) => {
                sessions.remove(session_id);
                Err(QuizError::SessionExpired(session_id.to_string()))
            }
            Some(s) => Ok((s.sport, s.asked_question_ids.clone())),
        }
    }

    /// Next unseen question for the session. Retries generation up to the
    /// configured bound with a growing exclusion set, then degrades to the
    /// fallback pool; `ExhaustedContent` is fatal for this request only.
    #[instrument(level = "info", skip(self))]
    pub async fn next_question(&self, session_id: &str) -> Result<Question, QuizError> {
        // Commit races with a concurrent call for the same session are rare;
        // two passes are plenty.
        for _pass in 0..2 {
            let (sport, mut exclude) = self.snapshot(session_id).await?;
            let generator = self
                .registry
                .get(sport)
                .ok_or_else(|| QuizError::InvalidSport(sport.key().to_string()))?;

            let mut candidate = None;
            for _attempt in 0..self.cfg.max_generation_retries {
                match generator.generate(&exclude)? {
                    Some(q) if !exclude.contains(&q.id) => {
                        candidate = Some(q);
                        break;
                    }
                    // Generator proposed something we already served: grow the
                    // exclusion set so it cannot loop on the same fact.
                    Some(q) => {
                        exclude.insert(q.id);
                    }
                    None => break,
                }
            }

            let (question, from_fallback) = match candidate {
                Some(q) => (q, false),
                None => {
                    warn!(target: "quiz", %session_id, sport = sport.key(), "Sport pool exhausted; degrading to fallback pool");
                    match self.fallback.next(&exclude) {
                        Some(q) => (q, true),
                        None => return Err(QuizError::ExhaustedContent),
                    }
                }
            };

            // Commit phase: re-validate under the write lock so neither the
            // TTL sweep nor a concurrent call can slip a repeat past us.
            let mut sessions = self.sessions.write().await;
            let now = Instant::now();
            let session = match sessions.get_mut(session_id) {
                None => return Err(QuizError::SessionNotFound(session_id.to_string())),
                Some(s) if s.is_expired(now) => {
                    sessions.remove(session_id);
                    return Err(QuizError::SessionExpired(session_id.to_string()));
                }
                Some(s) => s,
            };
            if session.asked_question_ids.contains(&question.id) {
                continue; // lost the race; rebuild from the fresh history
            }
            session.asked_question_ids.insert(question.id.clone());
            session.issued.insert(question.id.clone(), question.clone());
            session.deadline = now + self.ttl();
            info!(target: "quiz", %session_id, question_id = %question.id, fallback = from_fallback, "Question issued");
            return Ok(question);
        }
        Err(QuizError::ExhaustedContent)
    }

    /// Grade an answer against a question previously issued to this session.
    /// Each issued question is graded at most once; the grade consumes it, so
    /// replaying a known-correct answer cannot farm score.
    #[instrument(level = "info", skip(self, answer))]
    pub async fn submit_answer(
        &self,
        session_id: &str,
        question_id: &str,
        answer: &str,
        time_taken_secs: f32,
    ) -> Result<AnswerVerdict, QuizError> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        let session = match sessions.get_mut(session_id) {
            None => return Err(QuizError::SessionNotFound(session_id.to_string())),
            Some(s) if s.is_expired(now) => {
                sessions.remove(session_id);
                return Err(QuizError::SessionExpired(session_id.to_string()));
            }
            Some(s) => s,
        };
        let question = session
            .issued
            .remove(question_id)
            .ok_or_else(|| QuizError::QuestionNotFound(question_id.to_string()))?;

        let correct = is_correct_answer(&question.correct_answer, answer);
        let delta = score_delta(&self.cfg, question.difficulty, correct, time_taken_secs);
        let correct_answer = question.correct_answer;
        session.score += delta;
        session.deadline = now + self.ttl();
        info!(target: "quiz", %session_id, %question_id, %correct, score_delta = delta, "Answer graded");
        Ok(AnswerVerdict { correct, score_delta: delta, session_score: session.score, correct_answer })
    }

    /// Idempotent teardown.
    #[instrument(level = "info", skip(self))]
    pub async fn end_session(&self, session_id: &str) -> bool {
        let existed = self.sessions.write().await.remove(session_id).is_some();
        info!(target: "quiz", %session_id, %existed, "Session ended");
        existed
    }

    /// Remove TTL-expired sessions; returns how many were dropped.
    /// Safe against in-flight `next_question`: its commit phase re-validates.
    pub async fn sweep_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        let removed = before - sessions.len();
        if removed > 0 {
            info!(target: "quiz", removed, remaining = sessions.len(), "Swept expired sessions");
        }
        removed
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::SeedCorpus;
    use crate::domain::{Fact, FactCategory, FactValue};
    use crate::seeds::fallback_questions;
    use std::sync::Arc;

    fn number_fact(i: usize) -> Fact {
        Fact {
            subject: format!("club-{}", i),
            category: FactCategory::CareerStat,
            detail: "league titles".into(),
            value: FactValue::Number(100.0 + 7.0 * i as f64),
            sport: Sport::Football,
            rarity: 0.5,
        }
    }

    fn coordinator_with(facts: Vec<Fact>, ttl_secs: u64) -> QuizSessionCoordinator {
        let corpus = Arc::new(SeedCorpus::from_parts(facts, vec![]));
        let cfg = QuizConfig { session_ttl_secs: ttl_secs, ..QuizConfig::default() };
        let registry = GeneratorRegistry::with_defaults(corpus, cfg.option_count);
        QuizSessionCoordinator::new(registry, cfg)
    }

    #[tokio::test]
    async fn unknown_sport_is_rejected_at_entry() {
        let coordinator = coordinator_with(vec![number_fact(0)], 900);
        let err = coordinator.create_session("cricket").await.unwrap_err();
        assert!(matches!(err, QuizError::InvalidSport(_)));
    }

    #[tokio::test]
    async fn twenty_fact_corpus_never_repeats_a_question() {
        // Exactly 20 football facts: the 21st request must be a fallback
        // question or ExhaustedContent, never a duplicate.
        let coordinator = coordinator_with((0..20).map(number_fact).collect(), 900);
        let session_id = coordinator.create_session("football").await.expect("session");

        let mut seen = HashSet::new();
        for _ in 0..20 {
            let q = coordinator.next_question(&session_id).await.expect("question");
            assert!(seen.insert(q.id.clone()), "repeated id {}", q.id);
            assert!(!q.id.starts_with("fallback:"), "fell back too early: {}", q.id);
        }

        // Sport pool drained: the transition to fallback is observable via the
        // disjoint id space, and fallback ids never repeat either.
        let fallback_total = fallback_questions().len();
        for _ in 0..fallback_total {
            let q = coordinator.next_question(&session_id).await.expect("fallback question");
            assert!(q.id.starts_with("fallback:"), "expected fallback, got {}", q.id);
            assert!(seen.insert(q.id.clone()), "repeated fallback id {}", q.id);
        }

        let err = coordinator.next_question(&session_id).await.unwrap_err();
        assert!(matches!(err, QuizError::ExhaustedContent));
        // The failure is fatal for the request only; the session survives.
        assert_eq!(coordinator.session_count().await, 1);
    }

    #[tokio::test]
    async fn expired_session_is_removed_on_access() {
        let coordinator = coordinator_with(vec![number_fact(0)], 0);
        let session_id = coordinator.create_session("football").await.expect("session");

        let err = coordinator.next_question(&session_id).await.unwrap_err();
        assert!(matches!(err, QuizError::SessionExpired(_)));

        // Lazy removal already happened; a second access is a plain miss.
        let err = coordinator.next_question(&session_id).await.unwrap_err();
        assert!(matches!(err, QuizError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn end_session_is_idempotent() {
        let coordinator = coordinator_with(vec![number_fact(0)], 900);
        let session_id = coordinator.create_session("football").await.expect("session");
        assert!(coordinator.end_session(&session_id).await);
        assert!(!coordinator.end_session(&session_id).await);
    }

    #[tokio::test]
    async fn answers_are_graded_against_issued_questions() {
        let coordinator = coordinator_with((0..5).map(number_fact).collect(), 900);
        let session_id = coordinator.create_session("football").await.expect("session");
        let q = coordinator.next_question(&session_id).await.expect("question");

        let verdict = coordinator
            .submit_answer(&session_id, &q.id, &q.correct_answer, 3.0)
            .await
            .expect("verdict");
        assert!(verdict.correct);
        assert!(verdict.score_delta > 0);
        assert_eq!(verdict.session_score, verdict.score_delta);

        let q2 = coordinator.next_question(&session_id).await.expect("question");
        let wrong = coordinator
            .submit_answer(&session_id, &q2.id, "definitely not it", 3.0)
            .await
            .expect("verdict");
        assert!(!wrong.correct);
        assert_eq!(wrong.score_delta, 0);
        assert_eq!(wrong.session_score, verdict.session_score);

        let err = coordinator
            .submit_answer(&session_id, "no-such-question", "x", 0.0)
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::QuestionNotFound(_)));
    }

    #[tokio::test]
    async fn grading_consumes_the_question_so_score_cannot_be_farmed() {
        let coordinator = coordinator_with((0..5).map(number_fact).collect(), 900);
        let session_id = coordinator.create_session("football").await.expect("session");
        let q = coordinator.next_question(&session_id).await.expect("question");

        let first = coordinator
            .submit_answer(&session_id, &q.id, &q.correct_answer, 1.0)
            .await
            .expect("verdict");
        assert!(first.correct);

        // Replaying the same known-correct answer must be rejected outright.
        let err = coordinator
            .submit_answer(&session_id, &q.id, &q.correct_answer, 1.0)
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::QuestionNotFound(_)));

        // And the session score is unchanged by the replay attempt.
        let q2 = coordinator.next_question(&session_id).await.expect("question");
        let after = coordinator
            .submit_answer(&session_id, &q2.id, "not it", 1.0)
            .await
            .expect("verdict");
        assert_eq!(after.session_score, first.session_score);
    }

    #[tokio::test]
    async fn sweep_drops_only_expired_sessions() {
        let coordinator = coordinator_with(vec![number_fact(0)], 0);
        coordinator.create_session("football").await.expect("a");
        coordinator.create_session("tennis").await.expect("b");
        assert_eq!(coordinator.sweep_expired().await, 2);
        assert_eq!(coordinator.session_count().await, 0);
    }
}
