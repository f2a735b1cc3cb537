//! Context-aware wrong-answer ("distractor") generation.
//!
//! Naive random sampling yields trivially wrong options that defeat the
//! quiz's challenge, so candidates are restricted to the same sport and
//! category, ranked by closeness to the correct value (numeric distance for
//! stats, same era for years, position/nationality cluster for players), and
//! sampled closest tier first — widening only when a tier runs dry. A static
//! pad tier guarantees the requested count in practice.

use std::collections::HashSet;
use std::sync::Arc;

use rand::seq::SliceRandom;

use crate::corpus::PlayerCorpus;
use crate::domain::{Fact, FactValue};
use crate::error::QuizError;
use crate::seeds::{pad_player_names, NUMBER_PAD_OFFSETS, YEAR_PAD_OFFSETS};
use crate::util::normalize_answer;

#[derive(Clone)]
pub struct DistractorGenerator {
  corpus: Arc<dyn PlayerCorpus>,
}

impl DistractorGenerator {
  pub fn new(corpus: Arc<dyn PlayerCorpus>) -> Self {
    Self { corpus }
  }

  /// Produce exactly `count` unique wrong options for `fact`, none equal
  /// (normalized) to the correct answer or each other.
  pub fn generate(&self, fact: &Fact, count: usize) -> Result<Vec<String>, QuizError> {
    let tiers = match &fact.value {
      FactValue::Number(n) => self.number_tiers(fact, *n),
      FactValue::Year(y) => self.year_tiers(fact, *y),
      FactValue::Name(name) => self.name_tiers(fact, name),
    };

    let correct_norm = normalize_answer(&fact.value.display());
    let mut rng = rand::thread_rng();
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<String> = Vec::with_capacity(count);

    for tier in tiers {
      if out.len() >= count {
        break;
      }
      let mut tier = tier;
      tier.shuffle(&mut rng);
      for cand in tier {
        if out.len() >= count {
          break;
        }
        let norm = normalize_answer(&cand);
        if norm.is_empty() || norm == correct_norm || !seen.insert(norm) {
          continue;
        }
        out.push(cand);
      }
    }

    if out.len() < count {
      return Err(QuizError::InsufficientCategoryData {
        category: fact.category.key().to_string(),
        needed: count,
      });
    }
    Ok(out)
  }

  /// Numeric stats: tier by relative distance to the correct value, then a
  /// synthesized pad tier from static offsets.
  fn number_tiers(&self, fact: &Fact, correct: f64) -> Vec<Vec<String>> {
    let scale = correct.abs().max(1.0);
    let mut near = vec![];
    let mut mid = vec![];
    let mut far = vec![];
    for other in self.corpus.lookup_facts(fact.sport, Some(fact.category)) {
      if let FactValue::Number(v) = other.value {
        let rel = (v - correct).abs() / scale;
        let display = format_like(correct, v);
        if rel <= 0.15 {
          near.push(display);
        } else if rel <= 0.40 {
          mid.push(display);
        } else {
          far.push(display);
        }
      }
    }
    let pad = NUMBER_PAD_OFFSETS
      .iter()
      .map(|off| format_like(correct, correct * (1.0 + off)))
      .collect();
    vec![near, mid, far, pad]
  }

  /// Years: same half-decade, same decade, same era, everything else, then
  /// nearest-first static offsets.
  fn year_tiers(&self, fact: &Fact, correct: i32) -> Vec<Vec<String>> {
    let mut tiers: Vec<Vec<String>> = vec![vec![], vec![], vec![], vec![]];
    for other in self.corpus.lookup_facts(fact.sport, Some(fact.category)) {
      if let FactValue::Year(y) = other.value {
        let d = (y - correct).abs();
        let idx = if d <= 2 { 0 } else if d <= 5 { 1 } else if d <= 10 { 2 } else { 3 };
        tiers[idx].push(y.to_string());
      }
    }
    tiers.push(YEAR_PAD_OFFSETS.iter().map(|off| (correct + off).to_string()).collect());
    tiers
  }

  /// Player names: cluster by position and nationality around the correct
  /// player, then the per-sport pad list.
  fn name_tiers(&self, fact: &Fact, correct: &str) -> Vec<Vec<String>> {
    let players = self.corpus.players(fact.sport);
    let correct_norm = normalize_answer(correct);
    let anchor = players
      .iter()
      .find(|p| normalize_answer(&p.canonical) == correct_norm)
      .cloned();

    let mut tiers: Vec<Vec<String>> = vec![vec![], vec![], vec![], vec![]];
    for p in &players {
      if normalize_answer(&p.canonical) == correct_norm {
        continue;
      }
      let idx = match &anchor {
        Some(a) => {
          let same_pos = normalize_answer(&p.position) == normalize_answer(&a.position);
          let same_nat = normalize_answer(&p.nationality) == normalize_answer(&a.nationality);
          match (same_pos, same_nat) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
          }
        }
        // Unknown anchor: every corpus player is equally plausible.
        None => 0,
      };
      tiers[idx].push(p.canonical.clone());
    }
    tiers.push(pad_player_names(fact.sport).iter().map(|n| (*n).to_string()).collect());
    tiers
  }
}

/// Format a candidate number the way the correct answer is formatted, so the
/// options column looks homogeneous.
fn format_like(correct: f64, v: f64) -> String {
  if correct.fract() == 0.0 {
    format!("{}", v.round() as i64)
  } else {
    format!("{:.1}", v)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::corpus::SeedCorpus;
  use crate::domain::{FactCategory, Sport};

  fn year_fact(subject: &str, year: i32) -> Fact {
    Fact {
      subject: subject.into(),
      category: FactCategory::LandmarkYear,
      detail: "do the thing".into(),
      value: FactValue::Year(year),
      sport: Sport::Football,
      rarity: 0.5,
    }
  }

  fn generator_over(facts: Vec<Fact>) -> DistractorGenerator {
    DistractorGenerator::new(Arc::new(SeedCorpus::from_parts(facts, vec![])))
  }

  #[test]
  fn distractors_are_unique_and_never_the_answer() {
    let fact = year_fact("a", 1986);
    let gen = generator_over(vec![fact.clone()]);
    for _ in 0..20 {
      let out = gen.generate(&fact, 3).expect("distractors");
      assert_eq!(out.len(), 3);
      let mut norms: Vec<String> = out.iter().map(|o| normalize_answer(o)).collect();
      norms.sort();
      norms.dedup();
      assert_eq!(norms.len(), 3, "duplicate distractor in {:?}", out);
      assert!(!out.contains(&"1986".to_string()));
    }
  }

  #[test]
  fn padding_guarantees_count_when_category_is_empty() {
    // Single fact in the whole corpus: every distractor must come from padding.
    let fact = Fact {
      subject: "solo".into(),
      category: FactCategory::CareerStat,
      detail: "career points".into(),
      value: FactValue::Number(250.0),
      sport: Sport::Basketball,
      rarity: 0.5,
    };
    let gen = generator_over(vec![fact.clone()]);
    let out = gen.generate(&fact, 3).expect("padded distractors");
    assert_eq!(out.len(), 3);
  }

  #[test]
  fn closest_year_tier_is_exhausted_first() {
    let fact = year_fact("anchor", 2000);
    let gen = generator_over(vec![
      fact.clone(),
      year_fact("n1", 1999),
      year_fact("n2", 2001),
      year_fact("n3", 2002),
      year_fact("far1", 1950),
      year_fact("far2", 1960),
    ]);
    for _ in 0..10 {
      let out = gen.generate(&fact, 3).expect("distractors");
      let mut got: Vec<&str> = out.iter().map(|s| s.as_str()).collect();
      got.sort();
      assert_eq!(got, vec!["1999", "2001", "2002"]);
    }
  }

  #[test]
  fn name_distractors_prefer_same_cluster() {
    let corpus = SeedCorpus::new(vec![]);
    let gen = DistractorGenerator::new(Arc::new(corpus));
    let fact = Fact {
      subject: "2014 World Cup final".into(),
      category: FactCategory::PlayerLink,
      detail: "scored the winner".into(),
      value: FactValue::Name("Mario Götze".into()),
      sport: Sport::Football,
      rarity: 0.4,
    };
    // Seed corpus has enough midfielder/German neighbours to cover three
    // names without padding; none of them may be the correct answer.
    let out = gen.generate(&fact, 3).expect("distractors");
    assert_eq!(out.len(), 3);
    assert!(!out.iter().any(|o| normalize_answer(o) == normalize_answer("Mario Götze")));
  }

  #[test]
  fn insufficient_data_only_past_the_pad_list() {
    let fact = year_fact("a", 1990);
    let gen = generator_over(vec![fact.clone()]);
    // Pad list holds 12 year offsets; asking for more than it can supply
    // must fail loudly instead of returning a short set.
    let err = gen.generate(&fact, 40).unwrap_err();
    assert!(matches!(err, QuizError::InsufficientCategoryData { .. }));
  }
}
