use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// In-memory cache for model answers. Keys hash the full prompt context, so
/// a re-extracted graph produces new keys and stale answers are never served.
pub struct AnswerCache {
    answers: Arc<DashMap<String, String>>,
    max_entries: usize,
}

impl AnswerCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            answers: Arc::new(DashMap::new()),
            max_entries,
        }
    }

    pub fn key(parts: &[&str]) -> String {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.answers.get(key).map(|r| r.value().clone())
    }

    pub fn set(&self, key: String, value: String) {
        if self.answers.len() >= self.max_entries {
            // Simple eviction: clear 25% when full
            let to_remove: Vec<_> = self
                .answers
                .iter()
                .take(self.max_entries / 4)
                .map(|r| r.key().clone())
                .collect();
            for key in to_remove {
                self.answers.remove(&key);
            }
        }
        self.answers.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let cache = AnswerCache::new(10);
        let key = AnswerCache::key(&["article-1", "who?"]);
        cache.set(key.clone(), "answer".to_string());
        assert_eq!(cache.get(&key), Some("answer".to_string()));
    }

    #[test]
    fn different_contexts_produce_different_keys() {
        let a = AnswerCache::key(&["article-1", "graph-v1", "who?"]);
        let b = AnswerCache::key(&["article-1", "graph-v2", "who?"]);
        assert_ne!(a, b);
    }

    #[test]
    fn eviction_keeps_the_cache_bounded() {
        let cache = AnswerCache::new(8);
        for i in 0..20 {
            cache.set(format!("key-{}", i), "v".to_string());
        }
        assert!(cache.len() <= 8);
    }
}
