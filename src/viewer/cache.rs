//! LRU cache for rendered pages, keyed by page and scale

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use super::types::RenderedPage;

/// Cache key for rendered pages
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Page number (1-indexed)
    pub page: u32,
    /// Scale factor (stored as millionths for stable hashing)
    pub scale_millionths: u32,
}

impl CacheKey {
    #[must_use]
    pub fn new(page: u32, scale: f32) -> Self {
        Self {
            page,
            scale_millionths: (scale * 1_000_000.0) as u32,
        }
    }
}

/// LRU cache for rendered page data
pub struct PageCache {
    cache: LruCache<CacheKey, Arc<RenderedPage>>,
}

impl PageCache {
    /// Create a new cache with the given capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or_else(|| NonZeroUsize::new(1).expect("1 is non-zero")),
            ),
        }
    }

    /// Get a cached page, promoting it in the LRU order
    #[must_use]
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<RenderedPage>> {
        self.cache.get(key).cloned()
    }

    /// Check if a key is in the cache without promoting it
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.cache.contains(key)
    }

    /// Insert a page into the cache, returning an Arc to the data
    pub fn insert(&mut self, key: CacheKey, data: RenderedPage) -> Arc<RenderedPage> {
        let arc = Arc::new(data);
        self.cache.put(key, arc.clone());
        arc
    }

    /// Clear all cached pages
    pub fn invalidate_all(&mut self) {
        self.cache.clear();
    }

    /// Number of cached pages
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::ImageData;
    use super::*;

    fn test_page() -> RenderedPage {
        RenderedPage {
            image: ImageData {
                pixels: vec![0; 12],
                width_px: 2,
                height_px: 2,
            },
            fragments: vec![],
        }
    }

    #[test]
    fn insert_and_get() {
        let mut cache = PageCache::new(4);
        let key = CacheKey::new(1, 1.0);

        cache.insert(key.clone(), test_page());

        assert!(cache.contains(&key));
        assert!(cache.get(&key).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn same_page_at_different_scales_coexists() {
        let mut cache = PageCache::new(4);
        cache.insert(CacheKey::new(1, 1.0), test_page());
        cache.insert(CacheKey::new(1, 1.5), test_page());

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&CacheKey::new(1, 1.0)));
        assert!(cache.contains(&CacheKey::new(1, 1.5)));
    }

    #[test]
    fn lru_eviction() {
        let mut cache = PageCache::new(2);
        for page in 1..=3 {
            cache.insert(CacheKey::new(page, 1.0), test_page());
        }

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&CacheKey::new(1, 1.0)));
        assert!(cache.contains(&CacheKey::new(2, 1.0)));
        assert!(cache.contains(&CacheKey::new(3, 1.0)));
    }

    #[test]
    fn invalidate_all() {
        let mut cache = PageCache::new(4);
        for page in 1..=3 {
            cache.insert(CacheKey::new(page, 1.0), test_page());
        }

        cache.invalidate_all();
        assert!(cache.is_empty());
    }
}
