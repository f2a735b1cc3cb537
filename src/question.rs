//! Per-sport question generation and the static fallback pool.
//!
//! Generation is a strategy table: one shared-interface generator per sport,
//! chosen at session creation. A generator returns `Ok(None)` — not an error —
//! when its corpus cannot satisfy the exclusion set, which tells the
//! coordinator to degrade to the fallback pool.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use tracing::warn;

use crate::corpus::PlayerCorpus;
use crate::distractor::DistractorGenerator;
use crate::domain::{Fact, FactCategory, FactValue, Question, Sport};
use crate::error::QuizError;
use crate::seeds::fallback_questions;
use crate::util::fill_template;

pub trait QuestionGenerator: Send + Sync {
  fn sport(&self) -> Sport;

  /// Build a question whose id is not in `exclude_ids`.
  /// `None` when the sport corpus cannot satisfy the exclusion set.
  fn generate(&self, exclude_ids: &HashSet<String>) -> Result<Option<Question>, QuizError>;
}

/// Prompt templates per sport and category. The wording varies per sport so
/// the quiz does not read like a single fill-in form.
fn prompt_template(sport: Sport, category: FactCategory) -> &'static str {
  match (sport, category) {
    (Sport::Football, FactCategory::CareerStat) => "How many {detail} did {subject} record?",
    (Sport::Football, FactCategory::LandmarkYear) => "In which year did {subject} {detail}?",
    (Sport::Football, FactCategory::PlayerLink) => "Which player {detail}?",
    (Sport::Basketball, FactCategory::CareerStat) => "How many {detail} did {subject} total?",
    (Sport::Basketball, FactCategory::LandmarkYear) => "In what year did {subject} {detail}?",
    (Sport::Basketball, FactCategory::PlayerLink) => "Which player {detail}?",
    (Sport::Tennis, FactCategory::CareerStat) => "How many {detail} did {subject} collect?",
    (Sport::Tennis, FactCategory::LandmarkYear) => "In which year did {subject} {detail}?",
    (Sport::Tennis, FactCategory::PlayerLink) => "Which player {detail}?",
  }
}

/// Corpus-backed generator shared by all sports; the registry instantiates
/// one per sport key.
pub struct CorpusQuestionGenerator {
  sport: Sport,
  corpus: Arc<dyn PlayerCorpus>,
  distractors: DistractorGenerator,
  option_count: usize,
}

impl CorpusQuestionGenerator {
  pub fn new(sport: Sport, corpus: Arc<dyn PlayerCorpus>, option_count: usize) -> Self {
    let distractors = DistractorGenerator::new(corpus.clone());
    Self { sport, corpus, distractors, option_count }
  }

  fn build_question(&self, fact: &Fact) -> Result<Question, QuizError> {
    let correct = fact.value.display();
    let mut options = self.distractors.generate(fact, self.option_count - 1)?;
    options.push(correct.clone());
    options.shuffle(&mut rand::thread_rng());

    let prompt = fill_template(
      prompt_template(self.sport, fact.category),
      &[("subject", &fact.subject), ("detail", &fact.detail)],
    );

    Ok(Question {
      id: fact.question_id(),
      prompt,
      category: fact.category,
      correct_answer: correct,
      difficulty: estimate_difficulty(fact, &options),
      options,
      sport: self.sport,
      created_at: Utc::now(),
    })
  }
}

impl QuestionGenerator for CorpusQuestionGenerator {
  fn sport(&self) -> Sport {
    self.sport
  }

  fn generate(&self, exclude_ids: &HashSet<String>) -> Result<Option<Question>, QuizError> {
    let mut viable: Vec<Fact> = self
      .corpus
      .lookup_facts(self.sport, None)
      .into_iter()
      .filter(|f| !exclude_ids.contains(&f.question_id()))
      .collect();

    let mut rng = rand::thread_rng();
    while !viable.is_empty() {
      // Weight toward rare facts so obscure material surfaces before the
      // session exhausts the common tier.
      let weights: Vec<f32> = viable.iter().map(|f| 1.0 + 2.0 * f.rarity).collect();
      let idx = match WeightedIndex::new(&weights) {
        Ok(dist) => dist.sample(&mut rng),
        Err(_) => 0,
      };
      let fact = viable.swap_remove(idx);

      match self.build_question(&fact) {
        Ok(q) => return Ok(Some(q)),
        Err(QuizError::InsufficientCategoryData { category, needed }) => {
          // Invariant violation for this fact only: discard it and try another
          // rather than returning a partially filled question.
          warn!(target: "quiz", sport = self.sport.key(), subject = %fact.subject, %category, needed, "Discarding fact: distractor padding exhausted");
          continue;
        }
        Err(e) => return Err(e),
      }
    }
    Ok(None)
  }
}

/// Difficulty 1..=5 from fact rarity plus how tightly the options cluster.
fn estimate_difficulty(fact: &Fact, options: &[String]) -> u8 {
  let base = 1 + (fact.rarity * 3.0).round() as i32;
  let bonus = match &fact.value {
    FactValue::Number(c) => {
      let scale = c.abs().max(1.0);
      let tight = options
        .iter()
        .filter_map(|o| o.parse::<f64>().ok())
        .filter(|v| v != c)
        .any(|v| (v - c).abs() / scale <= 0.12);
      tight as i32
    }
    FactValue::Year(c) => {
      let tight = options
        .iter()
        .filter_map(|o| o.parse::<i32>().ok())
        .filter(|y| y != c)
        .any(|y| (y - c).abs() <= 2);
      tight as i32
    }
    FactValue::Name(_) => 0,
  };
  (base + bonus).clamp(1, 5) as u8
}

/// Strategy table mapping sport key to its generator; built once at startup.
pub struct GeneratorRegistry {
  by_sport: HashMap<Sport, Arc<dyn QuestionGenerator>>,
}

impl GeneratorRegistry {
  pub fn with_defaults(corpus: Arc<dyn PlayerCorpus>, option_count: usize) -> Self {
    let mut by_sport: HashMap<Sport, Arc<dyn QuestionGenerator>> = HashMap::new();
    for sport in Sport::ALL {
      by_sport.insert(
        sport,
        Arc::new(CorpusQuestionGenerator::new(sport, corpus.clone(), option_count)),
      );
    }
    Self { by_sport }
  }

  pub fn get(&self, sport: Sport) -> Option<Arc<dyn QuestionGenerator>> {
    self.by_sport.get(&sport).cloned()
  }
}

/// Fixed, hand-curated backstop used when sport-specific generation is
/// exhausted or misconfigured. Ids are disjoint from every sport pool.
pub struct FallbackQuestionPool {
  questions: Vec<Question>,
}

impl FallbackQuestionPool {
  pub fn new() -> Self {
    Self { questions: fallback_questions() }
  }

  /// First unserved fallback question, options reshuffled per serve.
  pub fn next(&self, exclude_ids: &HashSet<String>) -> Option<Question> {
    let mut q = self.questions.iter().find(|q| !exclude_ids.contains(&q.id))?.clone();
    q.options.shuffle(&mut rand::thread_rng());
    q.created_at = Utc::now();
    Some(q)
  }
}

impl Default for FallbackQuestionPool {
  fn default() -> Self {
    Self::new()
  }
}
