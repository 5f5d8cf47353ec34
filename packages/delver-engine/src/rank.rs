//! Result relevance ranking.
//!
//! Candidates are scored by cosine similarity of their snippet against the
//! (optionally preference-steered) query embedding, boosted by configured
//! domain and keyword priorities, capped, and penalized for URLs already
//! selected this session. Selection also feeds the per-dimension coverage
//! bookkeeping when a coverage basis is active.

use regex::Regex;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

use delver_domain::{SearchResult, vector};

use crate::{DelverEngine, SessionState, transform, truncate_chars};

/// Snippets at or below this length cannot be scored meaningfully.
const MIN_SNIPPET_CHARS: usize = 100;

/// Only this many leading characters feed vocabulary detection and coverage
/// embeddings.
const ANALYSIS_PREFIX_CHARS: usize = 2_000;

const VOCABULARY_MIN_WORDS: usize = 150;
const VOCABULARY_UNIQUE_RATIO: f64 = 0.98;
/// Forced similarity for degenerate word-list content.
const VOCABULARY_FLOOR: f32 = 0.01;
/// Neutral-low similarity when the snippet cannot be embedded.
const UNEMBEDDABLE_SCORE: f32 = 0.1;
const SIMILARITY_CEILING: f32 = 0.99;

/// Coverage per dimension saturates here before rescaling to [0, 1].
const COVERAGE_SATURATION: f32 = 3.0;

static KEYWORD_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#"'([^']+)'|"([^"]+)"|(\S+)"#).expect("valid literal regex"));

impl DelverEngine {
	/// Keeps the highest-scoring results, up to the per-query quota plus an
	/// expansion bonus earned by heavily repeated URLs. Returns the input
	/// unchanged when it already fits the base quota.
	///
	/// The outline and summary embeddings are part of the call contract for
	/// the orchestration layer but do not participate in scoring.
	pub async fn select_top(
		&self,
		session: &mut SessionState,
		results: Vec<SearchResult>,
		query_vec: &[f32],
		_outline_vec: &[f32],
		_summary_vec: Option<&[f32]>,
	) -> Vec<SearchResult> {
		let per_query = self.cfg.results.per_query as usize;

		if results.len() <= per_query {
			return results;
		}

		let expansion_threshold = self.cfg.results.repeats_before_expansion;
		let expanded = session
			.url_usage
			.values()
			.filter(|usage| usage.selected >= expansion_threshold)
			.count()
			.min(self.cfg.results.extra_per_query as usize);
		let target = per_query + expanded;

		// Steering moves the query once; every snippet is compared against the
		// same steered vector.
		let effective_query = if session.preferences.is_active() {
			transform::steer_query(query_vec, &session.preferences)
		} else {
			query_vec.to_vec()
		};

		let priority_domains = parse_domains(&self.cfg.priority.domains);
		let priority_keywords = parse_keywords(&self.cfg.priority.keywords);

		let mut results = results;
		let mut scored: Vec<(usize, f32)> = Vec::with_capacity(results.len());

		for idx in 0..results.len() {
			if !results[idx].url.is_empty() {
				session.usage_mut(&results[idx].url).considered += 1;
			}

			let score = self
				.score_candidate(
					session,
					&mut results[idx],
					&effective_query,
					&priority_domains,
					&priority_keywords,
				)
				.await;

			results[idx].similarity = Some(score);
			scored.push((idx, score));
		}

		scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

		let mut slots: Vec<Option<SearchResult>> = results.into_iter().map(Some).collect();
		let selected: Vec<SearchResult> =
			scored.iter().take(target).filter_map(|&(idx, _)| slots[idx].take()).collect();

		tracing::info!(selected = selected.len(), candidates = slots.len(), "Ranked search results.");

		self.update_dimension_coverage(session, &selected).await;

		selected
	}

	async fn score_candidate(
		&self,
		session: &mut SessionState,
		result: &mut SearchResult,
		query_vec: &[f32],
		priority_domains: &[String],
		priority_keywords: &[String],
	) -> f32 {
		let min_snippet = self.cfg.results.relevancy_snippet_length as usize;
		let mut snippet = result.snippet.clone();

		// Thin search-engine snippets score unreliably; pull a fuller preview
		// from the source before judging relevance.
		if snippet.chars().count() < min_snippet && !result.url.is_empty() {
			match self.providers.fetch.fetch(&self.cfg.providers.fetch, &result.url).await {
				Ok(preview) if !preview.is_empty() =>
					snippet = truncate_chars(&preview, min_snippet).to_string(),
				Ok(_) => (),
				Err(err) => {
					tracing::warn!(url = %result.url, error = %err, "Snippet fetch failed.");
				},
			}
		}

		if snippet.chars().count() <= MIN_SNIPPET_CHARS {
			return 0.0;
		}
		if is_vocabulary_list(&snippet) {
			tracing::warn!(url = %result.url, "Penalizing likely vocabulary-list content.");

			return VOCABULARY_FLOOR;
		}

		let Some(embedding) = self.embedding(session, &snippet).await else {
			return UNEMBEDDABLE_SCORE;
		};
		let mut similarity = vector::cosine_similarity(&embedding, query_vec);

		if !priority_domains.is_empty() && !result.url.is_empty() {
			let url_lower = result.url.to_lowercase();

			if priority_domains.iter().any(|domain| url_lower.contains(domain)) {
				similarity *= self.cfg.priority.domain_multiplier;
			}
		}
		if !priority_keywords.is_empty() {
			let snippet_lower = snippet.to_lowercase();
			let matches =
				priority_keywords.iter().filter(|keyword| snippet_lower.contains(*keyword)).count();

			if matches > 0 {
				let multiplier = self
					.cfg
					.priority
					.keyword_multiplier_per_match
					.powi(matches as i32)
					.min(self.cfg.priority.max_keyword_multiplier);

				similarity *= multiplier;
			}
		}

		similarity = similarity.min(SIMILARITY_CEILING);

		// Penalty applies after the ceiling, so repeat-heavy URLs can still
		// drop below fresh ones.
		let repeats = session.repeat_count(&result.url);

		if repeats > 0 {
			similarity *= (1.0 - 0.1 * repeats as f32).max(0.5);
		}

		similarity
	}

	/// Projects each selected result onto the active coverage basis and folds
	/// the similarity-weighted magnitude into per-dimension coverage. No-op
	/// without an active basis.
	async fn update_dimension_coverage(
		&self,
		session: &mut SessionState,
		selected: &[SearchResult],
	) {
		if session.dimensions.is_none() {
			return;
		}

		let mut contributions: Vec<(Vec<f32>, f32)> = Vec::with_capacity(selected.len());

		for result in selected {
			let content = truncate_chars(&result.snippet, ANALYSIS_PREFIX_CHARS);

			if content.is_empty() {
				continue;
			}

			let quality = 0.5 + result.similarity.unwrap_or(0.0) * 0.5;

			if let Some(embedding) = self.embedding(session, content).await {
				contributions.push((embedding, quality));
			}
		}

		if contributions.is_empty() {
			return;
		}

		let Some(dims) = session.dimensions.as_mut() else {
			return;
		};

		for (embedding, quality) in &contributions {
			for (i, eigenvector) in dims.eigenvectors.iter().enumerate() {
				if i >= dims.coverage.len() {
					break;
				}

				let contribution = vector::dot(embedding, eigenvector).abs() * quality;

				// Diminishing returns as a dimension fills up.
				dims.coverage[i] += contribution * (1.0 - dims.coverage[i] / 2.0);
			}
		}

		for value in &mut dims.coverage {
			*value = value.min(COVERAGE_SATURATION) / COVERAGE_SATURATION;
		}
	}
}

/// Word lists (glossaries, index pages, keyword-stuffed spam) embed near
/// everything; detect them by a near-total unique-word ratio.
fn is_vocabulary_list(snippet: &str) -> bool {
	let prefix = truncate_chars(snippet, ANALYSIS_PREFIX_CHARS).to_lowercase();
	let words: Vec<&str> = prefix.unicode_words().collect();

	if words.len() <= VOCABULARY_MIN_WORDS {
		return false;
	}

	let unique: ahash::AHashSet<&str> = words.iter().copied().collect();

	unique.len() as f64 / words.len() as f64 > VOCABULARY_UNIQUE_RATIO
}

fn parse_domains(raw: &str) -> Vec<String> {
	raw.replace(',', " ")
		.split_whitespace()
		.map(|domain| domain.trim().to_lowercase())
		.filter(|domain| !domain.is_empty())
		.collect()
}

/// Splits a keyword list on whitespace, honoring single- or double-quoted
/// multi-word phrases.
fn parse_keywords(raw: &str) -> Vec<String> {
	KEYWORD_RE
		.captures_iter(raw)
		.filter_map(|capture| {
			capture
				.get(1)
				.or_else(|| capture.get(2))
				.or_else(|| capture.get(3))
				.map(|keyword| keyword.as_str().to_lowercase())
		})
		.filter(|keyword| !keyword.is_empty())
		.collect()
}
