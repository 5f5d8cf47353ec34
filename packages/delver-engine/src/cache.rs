//! Bounded embedding caches.
//!
//! Both caches key on a blake3 digest of the first [`KEY_PREFIX_CHARS`]
//! characters of the input text; the transformation cache additionally mixes a
//! transform identifier into the digest. Lookup and insertion use the same
//! truncation rule, otherwise hits would silently miss.
//!
//! Eviction is FIFO by insertion order, not LRU: exceeding the configured
//! maximum removes exactly the single oldest-inserted entry. Callers must not
//! assume recency protects hot entries.

use std::collections::VecDeque;

use ahash::AHashMap;

/// Only this many leading characters participate in the cache key.
pub const KEY_PREFIX_CHARS: usize = 2_000;

type Digest = [u8; 32];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CacheStats {
	pub size: usize,
	pub hits: u64,
	pub misses: u64,
	pub hit_rate: f64,
}

#[derive(Debug)]
struct BoundedFifo {
	entries: AHashMap<Digest, Vec<f32>>,
	order: VecDeque<Digest>,
	max_entries: usize,
	hits: u64,
	misses: u64,
}
impl BoundedFifo {
	fn new(max_entries: usize) -> Self {
		Self {
			entries: AHashMap::new(),
			order: VecDeque::new(),
			max_entries,
			hits: 0,
			misses: 0,
		}
	}

	fn get(&mut self, key: Digest) -> Option<Vec<f32>> {
		let hit = self.entries.get(&key).cloned();

		if hit.is_some() {
			self.hits += 1;
		}

		hit
	}

	fn set(&mut self, key: Digest, vector: Vec<f32>) {
		// Misses are counted per insertion, not per failed lookup, to keep
		// hit-rate figures comparable with the original tool.
		self.misses += 1;

		if self.entries.insert(key, vector).is_none() {
			self.order.push_back(key);
		}
		if self.entries.len() > self.max_entries
			&& let Some(oldest) = self.order.pop_front()
		{
			self.entries.remove(&oldest);
		}
	}

	fn stats(&self) -> CacheStats {
		let total = self.hits + self.misses;
		let hit_rate = if total > 0 { self.hits as f64 / total as f64 } else { 0.0 };

		CacheStats { size: self.entries.len(), hits: self.hits, misses: self.misses, hit_rate }
	}
}

/// Memoizes text-to-vector lookups.
#[derive(Debug)]
pub struct EmbeddingCache {
	inner: BoundedFifo,
}
impl EmbeddingCache {
	pub fn new(max_entries: usize) -> Self {
		Self { inner: BoundedFifo::new(max_entries) }
	}

	pub fn get(&mut self, text: &str) -> Option<Vec<f32>> {
		self.inner.get(text_digest(text))
	}

	pub fn set(&mut self, text: &str, vector: Vec<f32>) {
		self.inner.set(text_digest(text), vector);
	}

	pub fn stats(&self) -> CacheStats {
		self.inner.stats()
	}
}

/// Memoizes (text, transform) to vector lookups for preference-steered
/// embeddings.
#[derive(Debug)]
pub struct TransformationCache {
	inner: BoundedFifo,
}
impl TransformationCache {
	pub fn new(max_entries: usize) -> Self {
		Self { inner: BoundedFifo::new(max_entries) }
	}

	pub fn get(&mut self, text: &str, transform_id: &str) -> Option<Vec<f32>> {
		self.inner.get(transformed_digest(text, transform_id))
	}

	pub fn set(&mut self, text: &str, transform_id: &str, vector: Vec<f32>) {
		self.inner.set(transformed_digest(text, transform_id), vector);
	}

	pub fn stats(&self) -> CacheStats {
		self.inner.stats()
	}
}

fn text_digest(text: &str) -> Digest {
	blake3::hash(crate::truncate_chars(text, KEY_PREFIX_CHARS).as_bytes()).into()
}

fn transformed_digest(text: &str, transform_id: &str) -> Digest {
	let mut hasher = blake3::Hasher::new();

	hasher.update(crate::truncate_chars(text, KEY_PREFIX_CHARS).as_bytes());
	hasher.update(&[0]);
	hasher.update(transform_id.as_bytes());

	hasher.finalize().into()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn set_then_get_round_trips() {
		let mut cache = EmbeddingCache::new(4);

		cache.set("hello", vec![1.0, 2.0]);

		assert_eq!(cache.get("hello"), Some(vec![1.0, 2.0]));
		assert_eq!(cache.get("other"), None);
	}

	#[test]
	fn keys_ignore_text_past_the_prefix() {
		let mut cache = EmbeddingCache::new(4);
		let long_a = format!("{}tail-one", "x".repeat(KEY_PREFIX_CHARS));
		let long_b = format!("{}tail-two", "x".repeat(KEY_PREFIX_CHARS));

		cache.set(&long_a, vec![0.5]);

		assert_eq!(cache.get(&long_b), Some(vec![0.5]));
	}

	#[test]
	fn evicts_exactly_the_oldest_entry() {
		let mut cache = EmbeddingCache::new(2);

		cache.set("first", vec![1.0]);
		cache.set("second", vec![2.0]);
		cache.set("third", vec![3.0]);

		assert_eq!(cache.stats().size, 2);
		assert_eq!(cache.get("first"), None);
		assert_eq!(cache.get("second"), Some(vec![2.0]));
		assert_eq!(cache.get("third"), Some(vec![3.0]));
	}

	#[test]
	fn fifo_eviction_ignores_recency() {
		let mut cache = EmbeddingCache::new(2);

		cache.set("first", vec![1.0]);
		cache.set("second", vec![2.0]);
		// Touching "first" must not protect it; this is FIFO, not LRU.
		let _ = cache.get("first");
		cache.set("third", vec![3.0]);

		assert_eq!(cache.get("first"), None);
	}

	#[test]
	fn stats_count_hits_and_insertions() {
		let mut cache = EmbeddingCache::new(4);

		assert_eq!(cache.get("missing"), None);

		cache.set("key", vec![1.0]);

		let _ = cache.get("key");
		let _ = cache.get("key");

		let stats = cache.stats();

		assert_eq!(stats.hits, 2);
		assert_eq!(stats.misses, 1);
		assert!((stats.hit_rate - 2.0 / 3.0).abs() < 1e-9);
	}

	#[test]
	fn redundant_set_still_counts_a_miss() {
		let mut cache = EmbeddingCache::new(4);

		cache.set("key", vec![1.0]);
		cache.set("key", vec![1.0]);

		let stats = cache.stats();

		assert_eq!(stats.size, 1);
		assert_eq!(stats.misses, 2);
	}

	#[test]
	fn transformation_cache_separates_transforms() {
		let mut cache = TransformationCache::new(4);

		cache.set("text", "transform-a", vec![1.0]);
		cache.set("text", "transform-b", vec![2.0]);

		assert_eq!(cache.get("text", "transform-a"), Some(vec![1.0]));
		assert_eq!(cache.get("text", "transform-b"), Some(vec![2.0]));
		assert_eq!(cache.get("text", "transform-c"), None);
	}
}
