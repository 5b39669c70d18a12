//! Memoization for generation calls
//!
//! Successful results are cached per operation, keyed by the full argument
//! tuple. Failures are never cached. Each wrapper owns its tables, so two
//! sessions with separate wrappers never see each other's results. Every
//! table is bounded and evicts its least recently used entry.

use super::{GenerationClient, GenerationError};
use crate::llm::ImageData;
use async_trait::async_trait;
use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use tokio::sync::Mutex;

/// Entries kept per operation for one session
pub const MAX_ENTRIES_PER_OPERATION: usize = 32;

/// One operation's result table
struct Memo<K, V> {
    entries: Mutex<LruCache<K, V>>,
}

impl<K: Eq + Hash, V: Clone> Memo<K, V> {
    fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    async fn get(&self, key: &K) -> Option<V> {
        self.entries.lock().await.get(key).cloned()
    }

    async fn insert(&self, key: K, value: V) {
        self.entries.lock().await.put(key, value);
    }

    async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

type RequestKey = (String, String);

/// Memoizing wrapper around any [`GenerationClient`]
pub struct CachedGenerator<G> {
    inner: G,
    questions: Memo<RequestKey, String>,
    recipes: Memo<RequestKey, String>,
    images: Memo<String, Option<ImageData>>,
}

impl<G: GenerationClient> CachedGenerator<G> {
    pub fn new(inner: G) -> Self {
        Self::with_capacity(inner, MAX_ENTRIES_PER_OPERATION)
    }

    /// Bound each operation's table to `capacity` entries (at least one)
    pub fn with_capacity(inner: G, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            questions: Memo::new(capacity),
            recipes: Memo::new(capacity),
            images: Memo::new(capacity),
        }
    }

    /// Drop every cached result
    pub async fn invalidate_all(&self) {
        self.questions.clear().await;
        self.recipes.clear().await;
        self.images.clear().await;
    }

    /// Number of cached results across all operations
    pub async fn cached_entries(&self) -> usize {
        self.questions.len().await + self.recipes.len().await + self.images.len().await
    }
}

fn request_key(ingredients: &str, preferences: &str) -> RequestKey {
    (ingredients.to_string(), preferences.to_string())
}

#[async_trait]
impl<G: GenerationClient> GenerationClient for CachedGenerator<G> {
    async fn generate_clarifying_questions(
        &self,
        ingredients: &str,
        preferences: &str,
    ) -> Result<String, GenerationError> {
        let key = request_key(ingredients, preferences);
        if let Some(hit) = self.questions.get(&key).await {
            tracing::debug!(op = "questions", "Generation cache hit");
            return Ok(hit);
        }
        let text = self
            .inner
            .generate_clarifying_questions(ingredients, preferences)
            .await?;
        self.questions.insert(key, text.clone()).await;
        Ok(text)
    }

    async fn generate_recipe(
        &self,
        ingredients: &str,
        preferences: &str,
    ) -> Result<String, GenerationError> {
        let key = request_key(ingredients, preferences);
        if let Some(hit) = self.recipes.get(&key).await {
            tracing::debug!(op = "recipe", "Generation cache hit");
            return Ok(hit);
        }
        let text = self.inner.generate_recipe(ingredients, preferences).await?;
        self.recipes.insert(key, text.clone()).await;
        Ok(text)
    }

    async fn generate_dish_image(
        &self,
        dish_name: &str,
    ) -> Result<Option<ImageData>, GenerationError> {
        let key = dish_name.to_string();
        if let Some(hit) = self.images.get(&key).await {
            tracing::debug!(op = "image", "Generation cache hit");
            return Ok(hit);
        }
        let image = self.inner.generate_dish_image(dish_name).await?;
        self.images.insert(key, image.clone()).await;
        Ok(image)
    }
}
