//! Deterministic collaborators for engine tests.
//!
//! The bag-of-words embedder hashes each word into a fixed bucket and
//! unit-normalizes the counts, so texts sharing vocabulary really do score
//! higher cosine similarity than unrelated texts. No network, no randomness.

use std::sync::Arc;

use ahash::AHashMap;
use color_eyre::eyre::eyre;
use serde_json::Map;

use delver_config::{
	Cache, Chunking, Compression, Config, EmbeddingProviderConfig, FetchProviderConfig, Priority,
	Providers as ProvidersConfig, Results, Service,
};
use delver_engine::{BoxFuture, DelverEngine, EmbeddingProvider, FetchProvider, Providers};

/// Embeds text as unit-normalized hashed word counts.
pub struct BagOfWordsEmbedder {
	pub dimensions: usize,
}
impl BagOfWordsEmbedder {
	pub fn new(dimensions: usize) -> Self {
		Self { dimensions }
	}

	pub fn embed_text(&self, text: &str) -> Vec<f32> {
		let mut vector = vec![0.0_f32; self.dimensions];

		for word in text.split_whitespace() {
			let cleaned =
				word.chars().filter(char::is_ascii_alphanumeric).collect::<String>().to_lowercase();

			if cleaned.is_empty() {
				continue;
			}

			let digest = blake3::hash(cleaned.as_bytes());
			let bucket = u64::from_le_bytes(
				digest.as_bytes()[..8].try_into().unwrap_or([0; 8]),
			) as usize % self.dimensions;

			vector[bucket] += 1.0;
		}

		let norm = vector.iter().map(|value| value * value).sum::<f32>().sqrt();

		if norm > 0.0 {
			for value in &mut vector {
				*value /= norm;
			}
		}

		vector
	}
}
impl EmbeddingProvider for BagOfWordsEmbedder {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(texts.iter().map(|text| self.embed_text(text)).collect()) })
	}
}

/// Always errors, for exercising degradation paths.
pub struct FailingEmbedder;
impl EmbeddingProvider for FailingEmbedder {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async { Err(eyre!("embedding provider unavailable")) })
	}
}

/// Serves canned pages by URL; unknown URLs error like a failed request.
#[derive(Default)]
pub struct CannedFetcher {
	pages: AHashMap<String, String>,
}
impl CannedFetcher {
	pub fn with_page(mut self, url: &str, body: &str) -> Self {
		self.pages.insert(url.to_string(), body.to_string());

		self
	}
}
impl FetchProvider for CannedFetcher {
	fn fetch<'a>(
		&'a self,
		_cfg: &'a FetchProviderConfig,
		url: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(async move {
			self.pages.get(url).cloned().ok_or_else(|| eyre!("no canned page for {url}"))
		})
	}
}

/// A configuration with the stock defaults and the given embedding dimension.
pub fn test_config(dimensions: u32) -> Config {
	Config {
		service: Service { log_level: "warn".to_string() },
		providers: ProvidersConfig {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://localhost:0".to_string(),
				api_key: "unused".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "bag-of-words".to_string(),
				dimensions,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			fetch: FetchProviderConfig {
				timeout_ms: 1_000,
				user_agent: "delver-testkit".to_string(),
			},
		},
		chunking: Chunking { level: 2 },
		compression: Compression {
			level: 4,
			local_influence_radius: 3,
			query_weight: 0.5,
			followup_weight: 0.5,
			steer_by_preferences: true,
		},
		results: Results {
			per_query: 3,
			extra_per_query: 3,
			repeats_before_expansion: 3,
			max_result_tokens: 4_000,
			repeat_window_factor: 0.95,
			relevancy_snippet_length: 2_000,
		},
		priority: Priority {
			domains: String::new(),
			keywords: String::new(),
			domain_multiplier: 1.3,
			keyword_multiplier_per_match: 1.1,
			max_keyword_multiplier: 2.0,
		},
		cache: Cache { embedding_max_entries: 512, transformation_max_entries: 256 },
	}
}

/// An engine wired to the deterministic embedder and an empty canned fetcher.
pub fn test_engine(dimensions: u32) -> DelverEngine {
	test_engine_with_fetcher(dimensions, CannedFetcher::default())
}

pub fn test_engine_with_fetcher(dimensions: u32, fetcher: CannedFetcher) -> DelverEngine {
	let providers = Providers::new(
		Arc::new(BagOfWordsEmbedder::new(dimensions as usize)),
		Arc::new(fetcher),
	);

	DelverEngine::with_providers(test_config(dimensions), providers)
}

/// An engine whose embedding provider always fails, for degradation tests.
pub fn failing_engine(dimensions: u32) -> DelverEngine {
	let providers = Providers::new(Arc::new(FailingEmbedder), Arc::new(CannedFetcher::default()));

	DelverEngine::with_providers(test_config(dimensions), providers)
}
