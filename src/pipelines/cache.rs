use crate::error::{PipelineError, Result};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub trait ModelOptions {
    fn cache_key(&self) -> String;
}

// Entries are STRONG references: a model loaded once stays resident until the
// process exits. There is no eviction and no reload.
type CacheStorage = HashMap<(TypeId, String), Box<dyn Any + Send + Sync>>;

pub struct ModelCache {
    cache: Mutex<CacheStorage>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn storage(&self) -> MutexGuard<'_, CacheStorage> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the cached model for `key`, running `loader` only on the first request.
    ///
    /// The lock is held while loading so concurrent first callers share one load.
    pub fn get_or_create<M, F>(&self, key: &str, loader: F) -> Result<Arc<M>>
    where
        M: Send + Sync + 'static,
        F: FnOnce() -> Result<M>,
    {
        let cache_key = (TypeId::of::<M>(), key.to_string());
        let mut cache = self.storage();

        if let Some(boxed) = cache.get(&cache_key) {
            return boxed.downcast_ref::<Arc<M>>().cloned().ok_or_else(|| {
                PipelineError::Unexpected(format!("Model cache entry '{key}' has the wrong type"))
            });
        }

        tracing::debug!(key, "model cache miss, loading");
        let model = Arc::new(loader()?);
        cache.insert(cache_key, Box::new(Arc::clone(&model)));

        Ok(model)
    }

    pub fn contains<M: 'static>(&self, key: &str) -> bool {
        self.storage()
            .contains_key(&(TypeId::of::<M>(), key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.storage().len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage().is_empty()
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_MODEL_CACHE: once_cell::sync::Lazy<ModelCache> =
    once_cell::sync::Lazy::new(ModelCache::new);

pub fn global_cache() -> &'static ModelCache {
    &GLOBAL_MODEL_CACHE
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TestModel {
        id: String,
    }

    #[test]
    fn test_cache_returns_same_instance() {
        let cache = ModelCache::new();
        let model1 = cache
            .get_or_create::<TestModel, _>("test", || {
                Ok(TestModel {
                    id: "original".into(),
                })
            })
            .unwrap();
        let model2 = cache
            .get_or_create::<TestModel, _>("test", || Ok(TestModel { id: "new".into() }))
            .unwrap();
        assert_eq!(model2.id, "original");
        assert!(Arc::ptr_eq(&model1, &model2));
    }

    #[test]
    fn test_loader_runs_once() {
        let cache = ModelCache::new();
        let loads = AtomicUsize::new(0);
        for _ in 0..5 {
            cache
                .get_or_create::<TestModel, _>("k", || {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(TestModel { id: "x".into() })
                })
                .unwrap();
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_entry_survives_handle_drop() {
        let cache = ModelCache::new();
        let model = cache
            .get_or_create::<TestModel, _>("k", || Ok(TestModel { id: "kept".into() }))
            .unwrap();
        drop(model);
        assert!(cache.contains::<TestModel>("k"));
        let again = cache
            .get_or_create::<TestModel, _>("k", || Ok(TestModel { id: "reloaded".into() }))
            .unwrap();
        assert_eq!(again.id, "kept");
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let cache = ModelCache::new();
        let err = cache
            .get_or_create::<TestModel, _>("k", || {
                Err(PipelineError::Download("offline".into()))
            })
            .err()
            .expect("load should fail");
        assert!(matches!(err, PipelineError::Download(_)));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_different_keys_independent() {
        let cache = ModelCache::new();

        let model1 = cache
            .get_or_create::<TestModel, _>("key1", || Ok(TestModel { id: "first".into() }))
            .unwrap();

        let model2 = cache
            .get_or_create::<TestModel, _>("key2", || {
                Ok(TestModel {
                    id: "second".into(),
                })
            })
            .unwrap();

        assert_eq!(model1.id, "first");
        assert_eq!(model2.id, "second");
        assert_eq!(cache.len(), 2);
    }
}
