use ahash::AHashMap;

use delver_config::Config;
use delver_domain::{Pdv, ResearchDimensions, TrajectoryAccumulator, UrlUsage, tokens};

use crate::cache::{EmbeddingCache, TransformationCache};

/// All mutable state for one research session.
///
/// The engine never keeps hidden globals: every stateful entity (caches, URL
/// counters, trajectory, preferences, dimension coverage) lives here and is
/// passed by reference into each engine call. Concurrent sessions must use
/// independent instances; dropping the session is the teardown.
pub struct SessionState {
	pub embedding_cache: EmbeddingCache,
	pub transformation_cache: TransformationCache,
	pub url_usage: AHashMap<String, UrlUsage>,
	pub trajectory: TrajectoryAccumulator,
	pub preferences: Pdv,
	pub dimensions: Option<ResearchDimensions>,
	/// Set when the session's current source is PDF-extracted text, which
	/// carries no reliable paragraph structure.
	pub pdf_source: bool,
}
impl SessionState {
	pub fn new(cfg: &Config) -> Self {
		Self {
			embedding_cache: EmbeddingCache::new(cfg.cache.embedding_max_entries as usize),
			transformation_cache: TransformationCache::new(
				cfg.cache.transformation_max_entries as usize,
			),
			url_usage: AHashMap::new(),
			trajectory: TrajectoryAccumulator::new(cfg.providers.embedding.dimensions as usize),
			preferences: Pdv::inert(),
			dimensions: None,
			pdf_source: false,
		}
	}

	pub fn usage_mut(&mut self, url: &str) -> &mut UrlUsage {
		self.url_usage.entry(url.to_string()).or_default()
	}

	/// Times this URL's content was previously selected into the corpus.
	pub fn repeat_count(&self, url: &str) -> u32 {
		self.url_usage.get(url).map(|usage| usage.selected).unwrap_or(0)
	}

	/// Records that a URL's content entered the research corpus. The first
	/// selection also captures the full body and its token estimate so later
	/// repeats can slide a window over it.
	pub fn record_selection(&mut self, url: &str, content: &str) {
		let total_tokens = tokens::estimate_tokens(content) as u32;
		let usage = self.usage_mut(url);

		if usage.selected == 0 {
			usage.total_tokens = total_tokens;
			usage.full_text = Some(content.to_string());
		}

		usage.selected += 1;
	}
}
