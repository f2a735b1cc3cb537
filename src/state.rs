//! Shared application state assembled once at startup and cloned per request.

use std::sync::Arc;

use crate::config::{load_app_config_from_env, AppConfig};
use crate::corpus::{PlayerCorpus, SeedCorpus};
use crate::elo::EloRatingEngine;
use crate::question::GeneratorRegistry;
use crate::session::QuizSessionCoordinator;
use crate::survival::SurvivalMatchEngine;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub coordinator: Arc<QuizSessionCoordinator>,
    pub elo: Arc<EloRatingEngine>,
    pub survival: Arc<SurvivalMatchEngine>,
}

impl AppState {
    /// Build from APP_CONFIG_PATH (falling back to defaults) with the
    /// seed corpus plus any config bank facts.
    pub fn new() -> Self {
        let config = load_app_config_from_env().unwrap_or_default();
        let extra_facts = config.facts.iter().cloned().filter_map(|f| f.into_fact()).collect();
        let corpus: Arc<dyn PlayerCorpus> = Arc::new(SeedCorpus::new(extra_facts));
        Self::with_parts(config, corpus)
    }

    /// Explicit wiring; tests inject their own corpus and tunables here.
    pub fn with_parts(config: AppConfig, corpus: Arc<dyn PlayerCorpus>) -> Self {
        let config = config.sanitized();
        let registry = GeneratorRegistry::with_defaults(corpus.clone(), config.quiz.option_count);
        let coordinator = Arc::new(QuizSessionCoordinator::new(registry, config.quiz.clone()));
        let elo = Arc::new(EloRatingEngine::new(config.elo.clone()));
        let survival =
            Arc::new(SurvivalMatchEngine::new(corpus, config.survival.clone(), elo.clone()));
        Self { config: Arc::new(config), coordinator, elo, survival }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
