use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub providers: Providers,
	pub chunking: Chunking,
	pub compression: Compression,
	pub results: Results,
	pub priority: Priority,
	pub cache: Cache,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub fetch: FetchProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct FetchProviderConfig {
	pub timeout_ms: u64,
	pub user_agent: String,
}

#[derive(Debug, Deserialize)]
pub struct Chunking {
	/// 0 keeps the whole text as one chunk, 1 splits phrases, 2 sentences,
	/// 3 paragraphs, and 4+ joins `level - 2` consecutive paragraphs per chunk.
	pub level: u32,
}

#[derive(Debug, Deserialize)]
pub struct Compression {
	/// 1 (keep 90%) through 10 (keep 10%); unknown levels fall back to 50%.
	pub level: u32,
	pub local_influence_radius: u32,
	pub query_weight: f32,
	pub followup_weight: f32,
	pub steer_by_preferences: bool,
}

#[derive(Debug, Deserialize)]
pub struct Results {
	pub per_query: u32,
	pub extra_per_query: u32,
	pub repeats_before_expansion: u32,
	pub max_result_tokens: u32,
	pub repeat_window_factor: f32,
	pub relevancy_snippet_length: u32,
}

#[derive(Debug, Deserialize)]
pub struct Priority {
	/// Whitespace- or comma-separated domain fragments matched against result URLs.
	pub domains: String,
	/// Whitespace-separated keywords; quote multi-word phrases.
	pub keywords: String,
	pub domain_multiplier: f32,
	pub keyword_multiplier_per_match: f32,
	pub max_keyword_multiplier: f32,
}

#[derive(Debug, Deserialize)]
pub struct Cache {
	pub embedding_max_entries: u32,
	pub transformation_max_entries: u32,
}
