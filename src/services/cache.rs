//! In-process TTL result cache.
//!
//! One cache instance per value type, shared across handlers. Entries expire
//! lazily: an expired entry is evicted on the `get` that observes it, there
//! is no background sweeper. Concurrent misses for the same key are not
//! coalesced; both callers recompute and the later `put` wins, which is
//! harmless because entries are derived data.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::db::models::Language;

/// Identity of one cacheable request, prior to key rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    CityLookup,
    CoordinatesLookup,
    Search,
}

impl RequestKind {
    fn as_str(&self) -> &'static str {
        match self {
            RequestKind::CityLookup => "city-lookup",
            RequestKind::CoordinatesLookup => "coordinates-lookup",
            RequestKind::Search => "search",
        }
    }
}

/// Cache-key fingerprint for a resolved request. Language is always part of
/// the key so the two bulletin languages never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub kind: RequestKind,
    pub identity: String,
    pub language: Language,
}

impl Fingerprint {
    pub fn city(city_id: i64, language: Language) -> Self {
        Self {
            kind: RequestKind::CityLookup,
            identity: city_id.to_string(),
            language,
        }
    }

    /// Coordinates are rounded to four decimals (~11 m) so that
    /// indistinguishable query points share an entry.
    pub fn coordinates(latitude: f64, longitude: f64, language: Language) -> Self {
        Self {
            kind: RequestKind::CoordinatesLookup,
            identity: format!("{:.4}:{:.4}", latitude, longitude),
            language,
        }
    }

    /// `prefix` should already be accent-folded and lowercased so that
    /// equivalent searches share an entry.
    pub fn search(prefix: &str, language: Language) -> Self {
        Self {
            kind: RequestKind::Search,
            identity: prefix.to_string(),
            language,
        }
    }

    pub fn render(&self) -> String {
        format!("{}.{}.{}", self.kind.as_str(), self.identity, self.language)
    }
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// TTL'd key/value store behind an `RwLock`. Values are cloned out, so `V`
/// should be cheap to clone or wrapped in `Arc` by the caller.
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, Entry<V>>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn put(&self, key: String, value: V) {
        self.put_at(key, value, Instant::now());
    }

    /// Clock-injected lookup. An entry whose deadline has passed is removed
    /// here rather than waiting for overwrite.
    fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            match entries.get(key) {
                Some(entry) if now < entry.expires_at => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        // Expired: upgrade to a write lock and evict.
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.get(key) {
            if now < entry.expires_at {
                // Refreshed by a concurrent put between the two locks.
                return Some(entry.value.clone());
            }
            entries.remove(key);
        }
        None
    }

    fn put_at(&self, key: String, value: V, now: Instant) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key,
            Entry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_render() {
        let fp = Fingerprint::city(42, Language::En);
        assert_eq!(fp.render(), "city-lookup.42.en");

        let fp = Fingerprint::coordinates(45.42, -75.69, Language::Fr);
        assert_eq!(fp.render(), "coordinates-lookup.45.4200:-75.6900.fr");

        let fp = Fingerprint::search("mont", Language::Fr);
        assert_eq!(fp.render(), "search.mont.fr");
    }

    #[test]
    fn test_language_always_in_key() {
        let en = Fingerprint::city(42, Language::En).render();
        let fr = Fingerprint::city(42, Language::Fr).render();
        assert_ne!(en, fr);
    }

    #[test]
    fn test_hit_within_ttl() {
        let cache: TtlCache<String> = TtlCache::new(Duration::from_secs(120));
        let t0 = Instant::now();

        cache.put_at("k".to_string(), "v".to_string(), t0);
        assert_eq!(
            cache.get_at("k", t0 + Duration::from_secs(119)),
            Some("v".to_string())
        );
    }

    #[test]
    fn test_miss_after_ttl() {
        let cache: TtlCache<String> = TtlCache::new(Duration::from_secs(120));
        let t0 = Instant::now();

        cache.put_at("k".to_string(), "v".to_string(), t0);
        assert_eq!(cache.get_at("k", t0 + Duration::from_secs(120)), None);
        // The expired entry is gone, not just hidden.
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_put_resets_deadline() {
        let cache: TtlCache<String> = TtlCache::new(Duration::from_secs(120));
        let t0 = Instant::now();

        cache.put_at("k".to_string(), "v1".to_string(), t0);
        cache.put_at("k".to_string(), "v2".to_string(), t0 + Duration::from_secs(100));

        // 150s after the first put, but only 50s after the refresh.
        assert_eq!(
            cache.get_at("k", t0 + Duration::from_secs(150)),
            Some("v2".to_string())
        );
    }

    #[test]
    fn test_unknown_key_misses() {
        let cache: TtlCache<String> = TtlCache::new(Duration::from_secs(120));
        assert_eq!(cache.get("nope"), None);
    }

    #[test]
    fn test_independent_ttls_per_cache() {
        let short: TtlCache<u32> = TtlCache::new(Duration::from_secs(10));
        let long: TtlCache<u32> = TtlCache::new(Duration::from_secs(300));
        let t0 = Instant::now();

        short.put_at("k".to_string(), 1, t0);
        long.put_at("k".to_string(), 2, t0);

        let later = t0 + Duration::from_secs(60);
        assert_eq!(short.get_at("k", later), None);
        assert_eq!(long.get_at("k", later), Some(2));
    }
}
