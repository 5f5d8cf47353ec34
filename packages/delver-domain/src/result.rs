use serde::{Deserialize, Serialize};

/// Candidate produced by the search collaborator. The ranker writes
/// `similarity` in place; the compressor fills `tokens` once content is sized.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SearchResult {
	pub title: String,
	pub url: String,
	pub snippet: String,
	#[serde(default)]
	pub similarity: Option<f32>,
	#[serde(default)]
	pub repeat_count: Option<u32>,
	#[serde(default)]
	pub tokens: Option<u32>,
}
impl SearchResult {
	pub fn new(title: impl Into<String>, url: impl Into<String>, snippet: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			url: url.into(),
			snippet: snippet.into(),
			similarity: None,
			repeat_count: None,
			tokens: None,
		}
	}
}

/// Per-URL counters kept for the lifetime of a research session.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct UrlUsage {
	/// Times this URL appeared in a candidate batch.
	pub considered: u32,
	/// Times this URL's content was selected into the research corpus.
	pub selected: u32,
	/// Token estimate of the full content, recorded on first selection.
	pub total_tokens: u32,
	/// Full body retained so later windows can slide over it.
	pub full_text: Option<String>,
}

/// Externally supplied orthogonal research-dimension basis plus the running
/// coverage of each dimension. The engine only updates `coverage`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ResearchDimensions {
	pub eigenvectors: Vec<Vec<f32>>,
	pub coverage: Vec<f32>,
}
