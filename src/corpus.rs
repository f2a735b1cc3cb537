//! Read-only player/fact corpus behind a trait.
//!
//! The routing layer treats the corpus as an external collaborator, so the
//! engines only ever see `dyn PlayerCorpus`. The default implementation is
//! seed-backed with an optional config bank merged in at startup.

use std::collections::HashMap;

use tracing::info;

use crate::domain::{Fact, FactCategory, PlayerRecord, Sport};
use crate::seeds::{seed_facts, seed_players};
use crate::util::name_initials;

pub trait PlayerCorpus: Send + Sync {
    /// Facts for one sport, optionally restricted to a category.
    fn lookup_facts(&self, sport: Sport, category: Option<FactCategory>) -> Vec<Fact>;

    /// All canonical player records for a sport.
    fn players(&self, sport: Sport) -> Vec<PlayerRecord>;

    /// Players whose canonical-name initials match exactly (folded, uppercase).
    fn names_with_initials(&self, sport: Sport, initials: &str) -> Vec<PlayerRecord> {
        let wanted = initials.trim().to_uppercase();
        self.players(sport)
            .into_iter()
            .filter(|p| name_initials(&p.canonical) == wanted)
            .collect()
    }
}

/// In-memory corpus built from the seed tables plus any config bank facts.
pub struct SeedCorpus {
    facts: Vec<Fact>,
    players: Vec<PlayerRecord>,
}

impl SeedCorpus {
    pub fn new(extra_facts: Vec<Fact>) -> Self {
        let mut facts = seed_facts();
        facts.extend(extra_facts);
        let players = seed_players();

        // Inventory summary by sport/category.
        let mut count: HashMap<(Sport, FactCategory), usize> = HashMap::new();
        for f in &facts {
            *count.entry((f.sport, f.category)).or_insert(0) += 1;
        }
        for ((sport, category), n) in count {
            info!(target: "quiz", sport = sport.key(), category = category.key(), facts = n, "Startup corpus inventory");
        }

        Self { facts, players }
    }

    /// Corpus built from explicit data; used by tests and custom deployments.
    pub fn from_parts(facts: Vec<Fact>, players: Vec<PlayerRecord>) -> Self {
        Self { facts, players }
    }
}

impl PlayerCorpus for SeedCorpus {
    fn lookup_facts(&self, sport: Sport, category: Option<FactCategory>) -> Vec<Fact> {
        self.facts
            .iter()
            .filter(|f| f.sport == sport && category.map_or(true, |c| f.category == c))
            .cloned()
            .collect()
    }

    fn players(&self, sport: Sport) -> Vec<PlayerRecord> {
        self.players.iter().filter(|p| p.sport == sport).cloned().collect()
    }
}
