//! Translation pipeline: length guard, request building, completion gateway,
//! result caching and latency metrics.

pub mod cache;
pub mod prompt;
pub mod zai;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::metrics::{metric_names, MetricsRegistry};
use crate::preferences::PreferenceRecord;
use cache::TranslationCache;

/// Default ceiling for generated output units.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4000;

/// Default input limit, in characters.
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 4000;

/// Everything the completion service needs for one translation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub system_instruction: String,
    pub user_instruction: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
}

/// Outcome of a successful translation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslateResult {
    pub request_id: String,
    pub translated_text: String,
    pub cached: bool,
    pub elapsed_ms: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TranslateError {
    #[error("text too long: {actual} characters, limit is {max}")]
    TooLong { max: usize, actual: usize },
    /// Runtime failure of the completion call; carries a human-readable cause.
    #[error("{0}")]
    Gateway(String),
    #[error("completion client not initialized: {0}")]
    Uninitialized(String),
    #[error("translation cancelled")]
    Cancelled,
}

/// Adapter over an external completion service. One attempt per call.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn translate(&self, request: &CompletionRequest) -> Result<String, TranslateError>;

    fn name(&self) -> &str;
}

/// Reject `text` when it is longer than `max` characters. Returns the length.
pub fn check_length(text: &str, max: usize) -> Result<usize, TranslateError> {
    let actual = text.chars().count();
    if actual > max {
        return Err(TranslateError::TooLong { max, actual });
    }
    Ok(actual)
}

pub struct TranslationService {
    gateway: Arc<dyn CompletionGateway>,
    cache: Option<TranslationCache>,
    metrics: Arc<MetricsRegistry>,
    shutdown: CancellationToken,
    max_message_length: usize,
    max_output_tokens: u32,
}

impl TranslationService {
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        cache: Option<TranslationCache>,
        metrics: Arc<MetricsRegistry>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            gateway,
            cache,
            metrics,
            shutdown,
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    pub fn with_limits(mut self, max_message_length: usize, max_output_tokens: u32) -> Self {
        self.max_message_length = max_message_length;
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn max_message_length(&self) -> usize {
        self.max_message_length
    }

    pub fn check_length(&self, text: &str) -> Result<usize, TranslateError> {
        check_length(text, self.max_message_length)
    }

    /// Guard, build, then send one request. Nothing is sent for oversized input.
    pub async fn translate(
        &self,
        text: &str,
        preferences: &PreferenceRecord,
    ) -> Result<TranslateResult, TranslateError> {
        self.check_length(text)?;

        let request_id = uuid::Uuid::new_v4().to_string();
        let request = prompt::build_request(text, preferences, self.max_output_tokens);
        let start = Instant::now();

        let cache_key = self.cache.as_ref().map(|_| TranslationCache::compute_key(&request));
        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            if let Some(hit) = cache.get(key) {
                debug!(request_id = %request_id, "translation cache hit");
                return Ok(TranslateResult {
                    request_id,
                    translated_text: hit,
                    cached: true,
                    elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
                });
            }
        }

        if self.shutdown.is_cancelled() {
            return Err(TranslateError::Cancelled);
        }

        let span = self.metrics.span(metric_names::GATEWAY_CALL);
        let outcome = tokio::select! {
            res = self.gateway.translate(&request) => res,
            _ = self.shutdown.cancelled() => Err(TranslateError::Cancelled),
        };

        match outcome {
            Ok(translated_text) => {
                span.finish();
                if let (Some(cache), Some(key)) = (&self.cache, cache_key) {
                    cache.insert(key, translated_text.clone());
                }
                let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                self.metrics
                    .record(metric_names::TRANSLATE_TOTAL, elapsed_ms * 1000.0);
                info!(
                    request_id = %request_id,
                    gateway = self.gateway.name(),
                    elapsed_ms,
                    "translation complete"
                );
                Ok(TranslateResult {
                    request_id,
                    translated_text,
                    cached: false,
                    elapsed_ms,
                })
            }
            Err(e) => {
                self.metrics
                    .record(metric_names::GATEWAY_ERROR, span.elapsed_us());
                warn!(request_id = %request_id, gateway = self.gateway.name(), error = %e, "translation failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Gateway double that records every request it receives.
    pub(crate) struct MockGateway {
        reply: Result<String, TranslateError>,
        delay: Option<Duration>,
        pub calls: AtomicUsize,
        pub last_request: parking_lot::Mutex<Option<CompletionRequest>>,
    }

    impl MockGateway {
        pub(crate) fn replying(reply: Result<String, TranslateError>) -> Self {
            Self {
                reply,
                delay: None,
                calls: AtomicUsize::new(0),
                last_request: parking_lot::Mutex::new(None),
            }
        }

        fn stalled() -> Self {
            Self {
                delay: Some(Duration::from_secs(3600)),
                ..Self::replying(Ok(String::new()))
            }
        }
    }

    #[async_trait]
    impl CompletionGateway for MockGateway {
        async fn translate(&self, request: &CompletionRequest) -> Result<String, TranslateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock() = Some(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.reply.clone()
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    fn service(gateway: Arc<MockGateway>, cache: Option<TranslationCache>) -> TranslationService {
        TranslationService::new(
            gateway,
            cache,
            Arc::new(MetricsRegistry::new()),
            CancellationToken::new(),
        )
    }

    #[test]
    fn length_guard_reports_limit_and_actual() {
        let text = "a".repeat(4001);
        assert_eq!(
            check_length(&text, 4000),
            Err(TranslateError::TooLong {
                max: 4000,
                actual: 4001
            })
        );
        assert_eq!(check_length(&"a".repeat(4000), 4000), Ok(4000));
    }

    #[test]
    fn length_guard_counts_characters_not_bytes() {
        assert_eq!(check_length("Xin chào thế giới", 17), Ok(17));
    }

    #[tokio::test]
    async fn oversized_text_never_reaches_gateway() {
        let gateway = Arc::new(MockGateway::replying(Ok("unused".into())));
        let svc = service(Arc::clone(&gateway), None);

        let err = svc
            .translate(&"x".repeat(4001), &PreferenceRecord::default())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            TranslateError::TooLong {
                max: 4000,
                actual: 4001
            }
        );
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn default_preferences_scenario() {
        let gateway = Arc::new(MockGateway::replying(Ok("Xin chào thế giới".into())));
        let svc = service(Arc::clone(&gateway), None);

        let result = svc
            .translate("Hello world", &PreferenceRecord::default())
            .await
            .unwrap();

        assert_eq!(result.translated_text, "Xin chào thế giới");
        assert!(!result.cached);
        let sent = gateway.last_request.lock().clone().unwrap();
        assert!(sent.user_instruction.ends_with("Hello world"));
        assert_eq!(
            sent.system_instruction,
            crate::catalog::get_style("professional").unwrap().system_instruction
        );
        assert_eq!(sent.temperature, 0.3);
        assert_eq!(sent.max_output_tokens, DEFAULT_MAX_OUTPUT_TOKENS);
    }

    #[tokio::test]
    async fn gateway_failure_is_passed_through() {
        let gateway = Arc::new(MockGateway::replying(Err(TranslateError::Gateway(
            "upstream 503".into(),
        ))));
        let svc = service(Arc::clone(&gateway), None);

        let err = svc
            .translate("Hello", &PreferenceRecord::default())
            .await
            .unwrap_err();
        assert_eq!(err, TranslateError::Gateway("upstream 503".into()));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn identical_requests_hit_the_cache() {
        let gateway = Arc::new(MockGateway::replying(Ok("Bonjour".into())));
        let cache = TranslationCache::new(8, Duration::from_secs(60));
        let svc = service(Arc::clone(&gateway), cache);
        let prefs = PreferenceRecord::with_language("fr").unwrap();

        let first = svc.translate("Hello", &prefs).await.unwrap();
        let second = svc.translate("Hello", &prefs).await.unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(second.translated_text, "Bonjour");
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);

        let warmer = PreferenceRecord {
            temperature: 0.8,
            ..prefs
        };
        svc.translate("Hello", &warmer).await.unwrap();
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let gateway = Arc::new(MockGateway::replying(Err(TranslateError::Gateway(
            "boom".into(),
        ))));
        let cache = TranslationCache::new(8, Duration::from_secs(60));
        let svc = service(Arc::clone(&gateway), cache);
        let prefs = PreferenceRecord::default();

        assert!(svc.translate("Hello", &prefs).await.is_err());
        assert!(svc.translate("Hello", &prefs).await.is_err());
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn shutdown_aborts_in_flight_call() {
        let gateway = Arc::new(MockGateway::stalled());
        let shutdown = CancellationToken::new();
        let svc = Arc::new(TranslationService::new(
            gateway.clone(),
            None,
            Arc::new(MetricsRegistry::new()),
            shutdown.clone(),
        ));

        let task = {
            let svc = Arc::clone(&svc);
            tokio::spawn(async move { svc.translate("Hello", &PreferenceRecord::default()).await })
        };
        while gateway.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        shutdown.cancel();

        assert_eq!(task.await.unwrap(), Err(TranslateError::Cancelled));
    }

    #[tokio::test]
    async fn configured_limits_apply() {
        let gateway = Arc::new(MockGateway::replying(Ok("ok".into())));
        let svc = service(Arc::clone(&gateway), None).with_limits(5, 128);

        assert!(matches!(
            svc.translate("toolong", &PreferenceRecord::default()).await,
            Err(TranslateError::TooLong { max: 5, actual: 7 })
        ));
        svc.translate("short", &PreferenceRecord::default()).await.unwrap();
        let sent = gateway.last_request.lock().clone().unwrap();
        assert_eq!(sent.max_output_tokens, 128);
    }
}
