//! Semantic retrieval-and-compression engine.
//!
//! The engine turns raw text and an embedding function into compact,
//! relevance-ranked, budget-respecting representations. Every operation takes
//! an explicit [`SessionState`] so concurrent research sessions stay isolated,
//! and every scoring path degrades to a documented fallback instead of
//! surfacing an error to the orchestration layer.

pub mod cache;
pub mod session;
pub mod transform;

mod budget;
mod compress;
mod embed;
mod pdv;
mod rank;
mod repeat;

pub use cache::{CacheStats, EmbeddingCache, TransformationCache};
pub use session::SessionState;

use std::{future::Future, pin::Pin, sync::Arc};

use delver_config::{Config, EmbeddingProviderConfig, FetchProviderConfig};
use delver_providers::{embedding, fetch};

pub use delver_domain::{Pdv, ResearchDimensions, SearchResult, TrajectoryAccumulator, UrlUsage};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait FetchProvider
where
	Self: Send + Sync,
{
	fn fetch<'a>(
		&'a self,
		cfg: &'a FetchProviderConfig,
		url: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub fetch: Arc<dyn FetchProvider>,
}

pub struct DelverEngine {
	pub cfg: Config,
	pub providers: Providers,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl FetchProvider for DefaultProviders {
	fn fetch<'a>(
		&'a self,
		cfg: &'a FetchProviderConfig,
		url: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(fetch::fetch(cfg, url))
	}
}

impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, fetch: Arc<dyn FetchProvider>) -> Self {
		Self { embedding, fetch }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);
		Self { embedding: provider.clone(), fetch: provider }
	}
}

/// Installs a global tracing subscriber honoring `service.log_level`.
/// Intended for the orchestration layer's bootstrap; later calls are no-ops.
pub fn init_tracing(cfg: &Config) {
	let filter = tracing_subscriber::EnvFilter::new(cfg.service.log_level.clone());
	let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

impl DelverEngine {
	pub fn new(cfg: Config) -> Self {
		Self { cfg, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers }
	}

	/// Opens a fresh session sized for this engine's configuration.
	pub fn open_session(&self) -> SessionState {
		SessionState::new(&self.cfg)
	}

	/// Folds one research cycle's query and result embeddings into the
	/// session trajectory.
	pub fn add_cycle(
		&self,
		session: &mut SessionState,
		query_vecs: &[Vec<f32>],
		result_vecs: &[Vec<f32>],
		weight: f32,
	) {
		session.trajectory.add_cycle(query_vecs, result_vecs, weight);
	}

	/// Unit vector summarizing where discovered content is drifting relative
	/// to the queries that produced it, or `None` before the first cycle.
	pub fn trajectory(&self, session: &SessionState) -> Option<Vec<f32>> {
		session.trajectory.trajectory()
	}
}

/// Char-boundary-safe prefix of at most `max_chars` characters.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
	match text.char_indices().nth(max_chars) {
		Some((idx, _)) => &text[..idx],
		None => text,
	}
}
