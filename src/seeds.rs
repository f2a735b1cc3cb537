//! Seed data and small utilities related to default content.
//!
//! Everything here is hand-curated: the built-in fact corpus, the canonical
//! player records used by survival and name distractors, the fallback
//! question pool, and the pad lists that guarantee distractor counts.

use chrono::Utc;

use crate::domain::{Fact, FactCategory, FactValue, PlayerRecord, Question, Sport};

fn fact_num(sport: Sport, subject: &str, detail: &str, n: f64, rarity: f32) -> Fact {
  Fact {
    subject: subject.into(),
    category: FactCategory::CareerStat,
    detail: detail.into(),
    value: FactValue::Number(n),
    sport,
    rarity,
  }
}

fn fact_year(sport: Sport, subject: &str, detail: &str, y: i32, rarity: f32) -> Fact {
  Fact {
    subject: subject.into(),
    category: FactCategory::LandmarkYear,
    detail: detail.into(),
    value: FactValue::Year(y),
    sport,
    rarity,
  }
}

fn fact_name(sport: Sport, subject: &str, detail: &str, name: &str, rarity: f32) -> Fact {
  Fact {
    subject: subject.into(),
    category: FactCategory::PlayerLink,
    detail: detail.into(),
    value: FactValue::Name(name.into()),
    sport,
    rarity,
  }
}

fn player(
  sport: Sport,
  canonical: &str,
  aliases: &[&str],
  position: &str,
  nationality: &str,
  era_start: i32,
) -> PlayerRecord {
  PlayerRecord {
    canonical: canonical.into(),
    aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
    position: position.into(),
    nationality: nationality.into(),
    era_start,
    sport,
  }
}

/// Built-in fact corpus. Large enough that each sport can serve a full quiz
/// without external config, small enough to stay reviewable.
pub fn seed_facts() -> Vec<Fact> {
  use Sport::*;
  vec![
    // -------- football --------
    fact_num(Football, "Lionel Messi", "league goals for Barcelona", 474.0, 0.3),
    fact_num(Football, "Cristiano Ronaldo", "Champions League goals", 140.0, 0.2),
    fact_num(Football, "Robert Lewandowski", "goals in his record Bundesliga season", 41.0, 0.5),
    fact_num(Football, "Pelé", "goals in official matches", 757.0, 0.6),
    fact_num(Football, "Gerd Müller", "Bundesliga goals", 365.0, 0.7),
    fact_year(Football, "Brazil", "win their fifth World Cup", 2002, 0.2),
    fact_year(Football, "Leicester City", "win the Premier League", 2016, 0.4),
    fact_year(Football, "Zinedine Zidane", "play his final World Cup", 2006, 0.5),
    fact_year(Football, "Diego Maradona", "score the 'Hand of God' goal", 1986, 0.3),
    fact_year(Football, "Arsenal", "finish a Premier League season unbeaten", 2004, 0.5),
    fact_name(Football, "2014 World Cup final", "scored the winning goal in the 2014 World Cup final", "Mario Götze", 0.4),
    fact_name(Football, "2018 World Cup", "captained France to the 2018 World Cup title", "Hugo Lloris", 0.6),
    fact_name(Football, "2018 Champions League final", "scored an overhead kick in the 2018 Champions League final", "Gareth Bale", 0.5),
    // -------- basketball --------
    fact_num(Basketball, "Wilt Chamberlain", "points in his record NBA game", 100.0, 0.3),
    fact_num(Basketball, "Kareem Abdul-Jabbar", "regular-season NBA points", 38387.0, 0.5),
    fact_num(Basketball, "Stephen Curry", "three-pointers in the 2015-16 season", 402.0, 0.6),
    fact_num(Basketball, "Bill Russell", "NBA championships as a player", 11.0, 0.4),
    fact_year(Basketball, "the Chicago Bulls", "complete their second three-peat", 1998, 0.4),
    fact_year(Basketball, "the Golden State Warriors", "win 73 regular-season games", 2016, 0.4),
    fact_year(Basketball, "Michael Jordan", "first retire from the NBA", 1993, 0.5),
    fact_name(Basketball, "2011 NBA Finals", "was named Finals MVP in 2011", "Dirk Nowitzki", 0.5),
    fact_name(Basketball, "2003 NBA draft", "was drafted first overall in 2003", "LeBron James", 0.3),
    fact_name(Basketball, "1997 flu game", "played the famous 'flu game' in the 1997 Finals", "Michael Jordan", 0.4),
    // -------- tennis --------
    fact_num(Tennis, "Rafael Nadal", "French Open singles titles", 14.0, 0.2),
    fact_num(Tennis, "Roger Federer", "Grand Slam singles titles", 20.0, 0.2),
    fact_num(Tennis, "Serena Williams", "Grand Slam singles titles", 23.0, 0.3),
    fact_num(Tennis, "Novak Djokovic", "year-end number one finishes", 8.0, 0.6),
    fact_year(Tennis, "Roger Federer", "win his first Wimbledon title", 2003, 0.4),
    fact_year(Tennis, "Rod Laver", "complete his second calendar Grand Slam", 1969, 0.7),
    fact_year(Tennis, "Andy Murray", "end Britain's 77-year Wimbledon wait", 2013, 0.4),
    fact_name(Tennis, "2019 Wimbledon final", "won the longest Wimbledon singles final", "Novak Djokovic", 0.5),
    fact_name(Tennis, "2018 US Open final", "beat Serena Williams in the 2018 US Open final", "Naomi Osaka", 0.4),
  ]
}

/// Canonical player records: names + aliases for survival validation,
/// position/nationality/era for distractor clustering.
pub fn seed_players() -> Vec<PlayerRecord> {
  use Sport::*;
  vec![
    player(Football, "Lionel Messi", &["Leo Messi"], "Forward", "Argentina", 2004),
    player(Football, "Cristiano Ronaldo", &["CR7"], "Forward", "Portugal", 2002),
    player(Football, "Neymar", &["Neymar Jr"], "Forward", "Brazil", 2009),
    player(Football, "Kylian Mbappé", &["Kylian Mbappe"], "Forward", "France", 2015),
    player(Football, "Luka Modrić", &["Luka Modric"], "Midfielder", "Croatia", 2003),
    player(Football, "Manuel Neuer", &[], "Goalkeeper", "Germany", 2006),
    player(Football, "Mario Götze", &["Mario Goetze"], "Midfielder", "Germany", 2009),
    player(Football, "Hugo Lloris", &[], "Goalkeeper", "France", 2005),
    player(Football, "Sergio Ramos", &[], "Defender", "Spain", 2004),
    player(Football, "Virgil van Dijk", &[], "Defender", "Netherlands", 2011),
    player(Football, "Zlatan Ibrahimović", &["Zlatan", "Zlatan Ibrahimovic"], "Forward", "Sweden", 1999),
    player(Football, "Thomas Müller", &["Thomas Muller"], "Forward", "Germany", 2008),
    player(Football, "Andrés Iniesta", &["Andres Iniesta"], "Midfielder", "Spain", 2002),
    player(Football, "Gareth Bale", &[], "Forward", "Wales", 2006),
    player(Basketball, "Michael Jordan", &["MJ"], "Guard", "USA", 1984),
    player(Basketball, "LeBron James", &["King James"], "Forward", "USA", 2003),
    player(Basketball, "Stephen Curry", &["Steph Curry"], "Guard", "USA", 2009),
    player(Basketball, "Kevin Durant", &["KD"], "Forward", "USA", 2007),
    player(Basketball, "Dirk Nowitzki", &[], "Forward", "Germany", 1998),
    player(Basketball, "Kareem Abdul-Jabbar", &[], "Center", "USA", 1969),
    player(Basketball, "Shaquille O'Neal", &["Shaq"], "Center", "USA", 1992),
    player(Basketball, "Tim Duncan", &[], "Forward", "USA", 1997),
    player(Basketball, "Kobe Bryant", &[], "Guard", "USA", 1996),
    player(Basketball, "Giannis Antetokounmpo", &["Greek Freak"], "Forward", "Greece", 2013),
    player(Basketball, "Magic Johnson", &[], "Guard", "USA", 1979),
    player(Basketball, "Larry Bird", &[], "Forward", "USA", 1979),
    player(Tennis, "Roger Federer", &[], "Right-handed", "Switzerland", 1998),
    player(Tennis, "Rafael Nadal", &["Rafa"], "Left-handed", "Spain", 2001),
    player(Tennis, "Novak Djokovic", &["Nole"], "Right-handed", "Serbia", 2003),
    player(Tennis, "Andy Murray", &[], "Right-handed", "Great Britain", 2005),
    player(Tennis, "Serena Williams", &[], "Right-handed", "USA", 1995),
    player(Tennis, "Venus Williams", &[], "Right-handed", "USA", 1994),
    player(Tennis, "Naomi Osaka", &[], "Right-handed", "Japan", 2013),
    player(Tennis, "Maria Sharapova", &[], "Right-handed", "Russia", 2001),
    player(Tennis, "Pete Sampras", &[], "Right-handed", "USA", 1988),
    player(Tennis, "Stan Wawrinka", &[], "Right-handed", "Switzerland", 2002),
  ]
}

fn fallback(
  n: usize,
  sport: Sport,
  category: FactCategory,
  prompt: &str,
  correct: &str,
  wrong: [&str; 3],
  difficulty: u8,
) -> Question {
  let mut options: Vec<String> = wrong.iter().map(|w| (*w).to_string()).collect();
  options.push(correct.to_string());
  Question {
    id: format!("fallback:{}", n),
    prompt: prompt.into(),
    category,
    correct_answer: correct.into(),
    options,
    difficulty,
    sport,
    created_at: Utc::now(),
  }
}

/// Fixed, hand-curated backstop questions. Ids live in the `fallback:` space,
/// disjoint from any sport pool, so no collision with generated ids is possible.
pub fn fallback_questions() -> Vec<Question> {
  vec![
    fallback(
      1,
      Sport::Football,
      FactCategory::PlayerLink,
      "Which national team has won the most World Cup titles?",
      "Brazil",
      ["Germany", "Italy", "Argentina"],
      1,
    ),
    fallback(
      2,
      Sport::Football,
      FactCategory::LandmarkYear,
      "In which year was the first FIFA World Cup held?",
      "1930",
      ["1926", "1934", "1938"],
      2,
    ),
    fallback(
      3,
      Sport::Basketball,
      FactCategory::CareerStat,
      "How many points is a standard free throw worth?",
      "1",
      ["2", "3", "4"],
      1,
    ),
    fallback(
      4,
      Sport::Basketball,
      FactCategory::PlayerLink,
      "Which player is nicknamed 'His Airness'?",
      "Michael Jordan",
      ["Kobe Bryant", "LeBron James", "Magic Johnson"],
      1,
    ),
    fallback(
      5,
      Sport::Tennis,
      FactCategory::CareerStat,
      "How many Grand Slam tournaments are played each season?",
      "4",
      ["3", "5", "6"],
      1,
    ),
    fallback(
      6,
      Sport::Tennis,
      FactCategory::LandmarkYear,
      "In which year did the Open Era of tennis begin?",
      "1968",
      ["1958", "1972", "1978"],
      2,
    ),
  ]
}

/// Relative offsets applied to a correct numeric value when the category runs
/// out of real candidates. Asymmetric so rounded results rarely collide.
pub const NUMBER_PAD_OFFSETS: &[f64] = &[
  -0.08, 0.09, -0.17, 0.18, -0.26, 0.27, -0.35, 0.36, -0.44, 0.45, -0.53, 0.54,
];

/// Year offsets used to pad year distractors, nearest first.
pub const YEAR_PAD_OFFSETS: &[i32] = &[-1, 1, -2, 2, -3, 3, -4, 4, -6, 6, -8, 8];

/// Per-sport pad names for player distractors: plausible, era-appropriate,
/// deliberately not part of the seed corpus so padding adds variety.
pub fn pad_player_names(sport: Sport) -> &'static [&'static str] {
  match sport {
    Sport::Football => &[
      "Ferenc Puskás",
      "Michel Platini",
      "George Best",
      "Roberto Baggio",
      "Paolo Maldini",
      "Rivaldo",
      "Kaká",
      "Didier Drogba",
      "Samuel Eto'o",
      "Francesco Totti",
    ],
    Sport::Basketball => &[
      "Charles Barkley",
      "Karl Malone",
      "John Stockton",
      "Allen Iverson",
      "Dwyane Wade",
      "Chris Paul",
      "James Harden",
      "Scottie Pippen",
      "Patrick Ewing",
      "Reggie Miller",
    ],
    Sport::Tennis => &[
      "Björn Borg",
      "John McEnroe",
      "Ivan Lendl",
      "Jimmy Connors",
      "Boris Becker",
      "Stefan Edberg",
      "Andre Agassi",
      "Jim Courier",
      "Michael Chang",
      "Goran Ivanišević",
    ],
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn seed_fact_ids_are_unique() {
    let facts = seed_facts();
    let ids: HashSet<String> = facts.iter().map(|f| f.question_id()).collect();
    assert_eq!(ids.len(), facts.len());
  }

  #[test]
  fn every_sport_has_facts_and_players() {
    let facts = seed_facts();
    let players = seed_players();
    for sport in Sport::ALL {
      assert!(facts.iter().any(|f| f.sport == sport), "no facts for {:?}", sport);
      assert!(players.iter().any(|p| p.sport == sport), "no players for {:?}", sport);
    }
  }

  #[test]
  fn fallback_ids_are_disjoint_from_generated_space() {
    for q in fallback_questions() {
      assert!(q.id.starts_with("fallback:"));
      assert!(q.options.contains(&q.correct_answer));
      assert_eq!(q.options.len(), 4);
    }
  }
}
