//! Embedding cache
//!
//! Keeps vectors for texts already seen so repeated queries skip the provider.
//! The cache is bounded; once full, the least recently used text is evicted.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use async_trait::async_trait;
use lru::LruCache;

use super::{non_blank, EmbeddingProvider};
use crate::error::{RetrievalError, Result};

/// Default number of cached vectors
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Caching wrapper around any embedding provider
///
/// Only texts missing from the cache reach the inner provider, in one call.
pub struct CachedEmbedder<P> {
    inner: P,
    cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl<P: EmbeddingProvider> CachedEmbedder<P> {
    pub fn new(inner: P) -> Self {
        Self::with_capacity(inner, DEFAULT_CACHE_CAPACITY)
    }

    /// Cache holding at most `capacity` vectors; zero falls back to the default
    pub fn with_capacity(inner: P, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Get cache size
    pub fn cache_size(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Maximum number of cached vectors
    pub fn capacity(&self) -> usize {
        self.cache.lock().map(|c| c.cap().get()).unwrap_or(0)
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    fn lookup(&self, items: &[String]) -> Vec<Option<Vec<f32>>> {
        match self.cache.lock() {
            Ok(mut cache) => items.iter().map(|text| cache.get(text).cloned()).collect(),
            Err(_) => vec![None; items.len()],
        }
    }
}

#[async_trait]
impl<P: EmbeddingProvider> EmbeddingProvider for CachedEmbedder<P> {
    async fn embed(&self, texts: &[String], batch_size: usize) -> Result<Vec<Vec<f32>>> {
        let items = non_blank(texts);
        let mut results = self.lookup(&items);

        let uncached: Vec<usize> = results
            .iter()
            .enumerate()
            .filter(|(_, cached)| cached.is_none())
            .map(|(i, _)| i)
            .collect();

        if !uncached.is_empty() {
            let uncached_texts: Vec<String> = uncached.iter().map(|&i| items[i].clone()).collect();
            let fresh = self.inner.embed(&uncached_texts, batch_size).await?;
            if fresh.len() != uncached_texts.len() {
                return Err(RetrievalError::shape(format!(
                    "provider returned {} vectors for {} texts",
                    fresh.len(),
                    uncached_texts.len()
                )));
            }

            if let Ok(mut cache) = self.cache.lock() {
                for (&idx, vector) in uncached.iter().zip(fresh.iter()) {
                    cache.put(items[idx].clone(), vector.clone());
                }
            }
            for (&idx, vector) in uncached.iter().zip(fresh) {
                results[idx] = Some(vector);
            }
            log::debug!(
                "Embedding cache: {} hits, {} misses",
                items.len() - uncached.len(),
                uncached.len()
            );
        }

        Ok(results.into_iter().flatten().collect())
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Embeds a text as `[len, call number]` and records what it was asked for
    #[derive(Default)]
    struct CountingEmbedder {
        calls: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl EmbeddingProvider for CountingEmbedder {
        async fn embed(&self, texts: &[String], _batch_size: usize) -> Result<Vec<Vec<f32>>> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(texts.to_vec());
            let call = calls.len() as f32;
            Ok(texts.iter().map(|t| vec![t.len() as f32, call]).collect())
        }

        fn model_name(&self) -> &str {
            "counting"
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cache_hits_skip_inner_provider() {
        tokio_test::block_on(async {
            let cached = CachedEmbedder::new(CountingEmbedder::default());

            let first = cached.embed(&strings(&["aa", "bbb"]), 4).await.unwrap();
            assert_eq!(first, vec![vec![2.0, 1.0], vec![3.0, 1.0]]);

            let second = cached.embed(&strings(&["c", "bbb", "aa"]), 4).await.unwrap();
            assert_eq!(second, vec![vec![1.0, 2.0], vec![3.0, 1.0], vec![2.0, 1.0]]);

            let calls = cached.inner().calls.lock().unwrap().clone();
            assert_eq!(calls, vec![strings(&["aa", "bbb"]), strings(&["c"])]);
            assert_eq!(cached.cache_size(), 3);
        });
    }

    #[test]
    fn test_clear_cache_forces_reembedding() {
        tokio_test::block_on(async {
            let cached = CachedEmbedder::new(CountingEmbedder::default());
            cached.embed(&strings(&["aa"]), 4).await.unwrap();
            cached.clear_cache();
            assert_eq!(cached.cache_size(), 0);

            let again = cached.embed(&strings(&["aa"]), 4).await.unwrap();
            assert_eq!(again, vec![vec![2.0, 2.0]]);
            assert_eq!(cached.model_name(), "counting");
        });
    }

    #[test]
    fn test_blank_texts_are_dropped() {
        tokio_test::block_on(async {
            let cached = CachedEmbedder::new(CountingEmbedder::default());
            let out = cached.embed(&strings(&[" ", "aa", ""]), 4).await.unwrap();
            assert_eq!(out.len(), 1);
        });
    }

    #[test]
    fn test_cache_is_bounded() {
        tokio_test::block_on(async {
            let cached = CachedEmbedder::with_capacity(CountingEmbedder::default(), 2);
            cached.embed(&strings(&["a", "bb", "ccc"]), 4).await.unwrap();
            assert_eq!(cached.cache_size(), 2);
            assert_eq!(cached.capacity(), 2);

            // "a" was evicted first, so only it goes back to the provider
            cached.embed(&strings(&["ccc", "a"]), 4).await.unwrap();
            let calls = cached.inner().calls.lock().unwrap().clone();
            assert_eq!(calls.last().unwrap(), &strings(&["a"]));
            assert_eq!(cached.cache_size(), 2);
        });
    }

    #[test]
    fn test_zero_capacity_uses_default() {
        let cached = CachedEmbedder::with_capacity(CountingEmbedder::default(), 0);
        assert_eq!(cached.capacity(), DEFAULT_CACHE_CAPACITY);
    }
}
