//! Memoizing wrapper around another provider.

use std::task::Poll;

use hashbrown::HashMap;

use crate::{AssetError, AssetProvider, MeshHandle};

/// Caches every resolved lookup, successes and `NotFound` alike, so each id
/// reaches the inner provider until it first resolves and never again.
#[derive(Debug)]
pub struct CachingAssetProvider<P> {
    inner: P,
    cache: HashMap<String, Result<MeshHandle, AssetError>>,
    hits: u64,
    misses: u64,
}

impl<P: AssetProvider> CachingAssetProvider<P> {
    /// Wrap a provider.
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups forwarded to the inner provider.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Number of cached ids.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Drop all cached results.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: AssetProvider> AssetProvider for CachingAssetProvider<P> {
    fn poll_mesh(&mut self, id: &str) -> Poll<Result<MeshHandle, AssetError>> {
        if let Some(result) = self.cache.get(id) {
            self.hits += 1;
            return Poll::Ready(result.clone());
        }
        self.misses += 1;
        match self.inner.poll_mesh(id) {
            Poll::Ready(result) => {
                if let Err(err) = &result {
                    tracing::debug!(%err, "caching failed asset lookup");
                }
                self.cache.insert(id.to_string(), result.clone());
                Poll::Ready(result)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn begin_frame(&mut self) {
        self.inner.begin_frame();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CatalogAssetProvider;

    #[test]
    fn test_second_lookup_hits_cache() {
        let mut provider =
            CachingAssetProvider::new(CatalogAssetProvider::with_placeholders(["tree_pine"]));
        assert!(provider.poll_mesh("tree_pine").is_ready());
        assert!(provider.poll_mesh("tree_pine").is_ready());
        assert_eq!(provider.misses(), 1);
        assert_eq!(provider.hits(), 1);
    }

    #[test]
    fn test_not_found_is_cached() {
        let mut provider = CachingAssetProvider::new(CatalogAssetProvider::new());
        for _ in 0..3 {
            assert!(matches!(
                provider.poll_mesh("missing"),
                Poll::Ready(Err(AssetError::NotFound(_)))
            ));
        }
        assert_eq!(provider.misses(), 1);
        assert_eq!(provider.cached(), 1);
    }

    #[test]
    fn test_pending_is_not_cached() {
        let inner = CatalogAssetProvider::with_placeholders(["rock"]).with_latency(1);
        let mut provider = CachingAssetProvider::new(inner);
        assert!(provider.poll_mesh("rock").is_pending());
        assert_eq!(provider.cached(), 0);
        provider.begin_frame();
        assert!(provider.poll_mesh("rock").is_ready());
        // Once cached, latency no longer applies.
        assert!(provider.poll_mesh("rock").is_ready());
        assert_eq!(provider.inner().frame(), 1);
    }

    #[test]
    fn test_boxed_provider() {
        let boxed: Box<dyn AssetProvider> =
            Box::new(CatalogAssetProvider::with_placeholders(["a"]));
        let mut provider = CachingAssetProvider::new(boxed);
        assert!(provider.poll_mesh("a").is_ready());
    }
}
