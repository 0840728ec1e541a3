//! Polyglot: Telegram translation assistant.
//! Library root: module wiring and service startup.

pub mod bot;
pub mod catalog;
pub mod config;
pub mod error;
pub mod format;
pub mod metrics;
pub mod preferences;
pub mod stats;
pub mod translate;

use std::sync::Arc;
use std::time::Duration;

use teloxide::Bot;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use bot::BotState;
use config::BotConfig;
use error::BotError;
use metrics::MetricsRegistry;
use preferences::{InMemoryPreferenceStore, PreferenceRecord};
use stats::UsageTracker;
use translate::cache::TranslationCache;
use translate::zai::ZaiClient;
use translate::TranslationService;

/// Build every component from `config` and serve updates until Ctrl-C.
pub async fn run(config: BotConfig) -> Result<(), BotError> {
    info!(
        model = %config.completion.model,
        max_message_length = config.max_message_length,
        stats_enabled = config.stats_enabled,
        "polyglot starting"
    );

    let metrics = Arc::new(MetricsRegistry::new());
    let shutdown = CancellationToken::new();

    let client = ZaiClient::new(&config.completion)?;

    let cache = TranslationCache::new(
        config.cache_capacity,
        Duration::from_secs(config.cache_ttl_secs),
    );
    if cache.is_none() {
        info!("translation cache disabled");
    }

    let translator = TranslationService::new(
        Arc::new(client),
        cache,
        Arc::clone(&metrics),
        shutdown.clone(),
    )
    .with_limits(config.max_message_length, config.max_output_tokens);

    let defaults = PreferenceRecord::with_language(&config.default_language).unwrap_or_else(|e| {
        warn!(error = %e, "default language rejected, using built-in defaults");
        PreferenceRecord::default()
    });

    let bot = Bot::new(&config.telegram_token);
    let state = Arc::new(BotState {
        preferences: Arc::new(InMemoryPreferenceStore::new(defaults)),
        usage: UsageTracker::new(config.stats_enabled),
        translator,
        metrics,
        config,
    });

    bot::run_dispatcher(bot, state).await;

    shutdown.cancel();
    info!("polyglot stopped");
    Ok(())
}
