//! In-memory LRU cache of completed translations with TTL.
//! Key: blake3 hash of the full completion request, so any preference that
//! changes the request also changes the key.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;

use super::CompletionRequest;

struct CacheEntry {
    translated_text: String,
    inserted_at: Instant,
}

pub struct TranslationCache {
    inner: Mutex<LruCache<[u8; 32], CacheEntry>>,
    ttl: Duration,
}

impl TranslationCache {
    /// Returns `None` for a zero capacity, which disables caching.
    pub fn new(capacity: usize, ttl: Duration) -> Option<Self> {
        let capacity = NonZeroUsize::new(capacity)?;
        Some(Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl,
        })
    }

    /// Hash every field that shapes the completion, so any change misses.
    pub fn compute_key(request: &CompletionRequest) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(request.system_instruction.as_bytes());
        hasher.update(b"|");
        hasher.update(request.user_instruction.as_bytes());
        hasher.update(b"|");
        hasher.update(&request.temperature.to_bits().to_le_bytes());
        hasher.update(b"|");
        hasher.update(&request.max_output_tokens.to_le_bytes());
        *hasher.finalize().as_bytes()
    }

    /// Look up a cached translation. Returns None if absent or expired.
    pub fn get(&self, key: &[u8; 32]) -> Option<String> {
        let mut cache = self.inner.lock();
        if let Some(entry) = cache.get(key) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.translated_text.clone());
            }
            cache.pop(key);
        }
        None
    }

    /// Store a successful translation, evicting the least recently used entry when full.
    pub fn insert(&self, key: [u8; 32], translated_text: String) {
        let mut cache = self.inner.lock();
        cache.put(
            key,
            CacheEntry {
                translated_text,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Entries currently held, expired ones included until they are next read.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str, temperature: f64) -> CompletionRequest {
        CompletionRequest {
            system_instruction: "sys".into(),
            user_instruction: text.into(),
            temperature,
            max_output_tokens: 4000,
        }
    }

    #[test]
    fn zero_capacity_disables_cache() {
        assert!(TranslationCache::new(0, Duration::from_secs(1)).is_none());
    }

    #[test]
    fn key_depends_on_every_request_field() {
        let base = TranslationCache::compute_key(&request("hi", 0.3));
        assert_eq!(base, TranslationCache::compute_key(&request("hi", 0.3)));
        assert_ne!(base, TranslationCache::compute_key(&request("hi", 0.4)));
        assert_ne!(base, TranslationCache::compute_key(&request("hello", 0.3)));
        let mut longer = request("hi", 0.3);
        longer.max_output_tokens = 10;
        assert_ne!(base, TranslationCache::compute_key(&longer));
    }

    #[test]
    fn hit_then_expiry() {
        let cache = TranslationCache::new(4, Duration::from_millis(30)).unwrap();
        let key = TranslationCache::compute_key(&request("hi", 0.3));
        cache.insert(key, "xin chào".into());
        assert_eq!(cache.get(&key).as_deref(), Some("xin chào"));

        std::thread::sleep(Duration::from_millis(60));
        assert_eq!(cache.get(&key), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn least_recently_used_entry_is_evicted() {
        let cache = TranslationCache::new(2, Duration::from_secs(60)).unwrap();
        let keys: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|t| TranslationCache::compute_key(&request(t, 0.3)))
            .collect();
        cache.insert(keys[0], "A".into());
        cache.insert(keys[1], "B".into());
        cache.get(&keys[0]);
        cache.insert(keys[2], "C".into());

        assert_eq!(cache.get(&keys[1]), None);
        assert_eq!(cache.get(&keys[0]).as_deref(), Some("A"));
        assert_eq!(cache.len(), 2);
    }
}
