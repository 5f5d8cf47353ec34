//! Repeat-content windowing.
//!
//! A URL revisited across research cycles should contribute new material each
//! time. Over-budget content gets a sliding token window that advances with
//! the repeat count and shrinks geometrically once a full pass over the source
//! completes; under-budget content is instead re-centered on the region most
//! relevant to the current query.

use delver_chunking as chunking;
use delver_domain::{tokens, vector};

use crate::{DelverEngine, SessionState};

/// Window size never shrinks below this many tokens.
const MIN_WINDOW_TOKENS: usize = 200;

/// Per-completed-cycle geometric shrink applied to the window size.
const CYCLE_SHRINK_FACTOR: f32 = 0.7;

impl DelverEngine {
	/// Serves a bounded, repeat-aware slice of `content` for a revisited URL.
	///
	/// The first selection of a URL records its total size and passes the
	/// content through unmodified. Later repeats slide a budget-sized window
	/// forward through over-budget content, or re-center under-budget content
	/// on its most query-relevant chunk.
	pub async fn handle_repeat(
		&self,
		session: &mut SessionState,
		content: &str,
		url: &str,
		query_vec: &[f32],
		repeat_count: u32,
	) -> String {
		if repeat_count == 0 || session.repeat_count(url) == 0 {
			let total_tokens = tokens::estimate_tokens(content) as u32;
			let usage = session.usage_mut(url);

			usage.total_tokens = total_tokens;

			return content.to_string();
		}

		// A selected URL without a recorded size means the bookkeeping and the
		// content store disagree; recompute instead of trusting either.
		let mut total_tokens = session.usage_mut(url).total_tokens as usize;

		if total_tokens == 0 {
			total_tokens = tokens::estimate_tokens(content);
			session.usage_mut(url).total_tokens = total_tokens as u32;
		}

		let budget = self.cfg.results.max_result_tokens as usize;

		if total_tokens > budget {
			let window_factor = self.cfg.results.repeat_window_factor;
			let mut window_start =
				((repeat_count - 1) as f32 * window_factor * budget as f32) as usize;
			let window_size = if window_start >= total_tokens {
				let cycles_completed = window_start / total_tokens;
				let shrink = CYCLE_SHRINK_FACTOR.powi(cycles_completed as i32);
				let shrunk = ((budget as f32 * shrink) as usize).max(MIN_WINDOW_TOKENS);

				window_start %= total_tokens;

				tracing::info!(
					url,
					cycles_completed,
					window_size = shrunk,
					"Full pass over repeated content; shrinking window.",
				);

				shrunk
			} else {
				tracing::info!(
					url,
					window_start,
					window_size = budget,
					"Sliding window over repeated content.",
				);

				budget
			};

			extract_token_window(content, window_start, window_size)
		} else {
			self.recenter_on_query(session, content, query_vec).await
		}
	}

	/// Returns roughly a quarter-width band of chunks around the chunk most
	/// similar to the query. Inputs of three or fewer chunks, and any failure
	/// to embed, return the content unchanged.
	async fn recenter_on_query(
		&self,
		session: &mut SessionState,
		content: &str,
		query_vec: &[f32],
	) -> String {
		if self.embedding(session, content).await.is_none() {
			return content.to_string();
		}

		let chunks = chunking::split_text(content, self.cfg.chunking.level, session.pdf_source);

		if chunks.len() <= 3 {
			return content.to_string();
		}

		let mut best: Option<(usize, f32)> = None;

		for (idx, chunk) in chunks.iter().enumerate() {
			if let Some(embedding) = self.embedding(session, chunk).await {
				let relevance = vector::cosine_similarity(&embedding, query_vec);

				if best.is_none_or(|(_, top)| relevance > top) {
					best = Some((idx, relevance));
				}
			}
		}

		let Some((center, _)) = best else {
			return content.to_string();
		};
		let band = chunks.len() / 4;
		let start = center.saturating_sub(band);
		let end = (center + band + 1).min(chunks.len());

		chunks[start..end].join("\n")
	}
}

/// Maps a token-offset window onto character offsets through the content's
/// average chars-per-token ratio, then trims both ends to the nearest sentence
/// boundary when one lies near enough the edge.
pub(crate) fn extract_token_window(content: &str, start_token: usize, window_size: usize) -> String {
	let char_count = content.chars().count();

	if char_count == 0 {
		return String::new();
	}

	let total_tokens = tokens::estimate_tokens(content).max(1);
	let chars_per_token = char_count as f32 / total_tokens as f32;
	let start_char = ((start_token as f32 * chars_per_token) as usize).min(char_count - 1);
	let window_chars = (window_size as f32 * chars_per_token) as usize;
	let end_char = (start_char + window_chars).min(char_count);
	let mut window = char_slice(content, start_char, end_char).to_string();

	// A window that starts mid-document likely opens mid-sentence; drop the
	// fragment when a boundary appears within the first tenth.
	if start_char > 0
		&& let Some(first_period) = window.find(". ")
		&& first_period > 0
		&& first_period < window.len() / 10
	{
		window.drain(..first_period + 2);
	}
	if let Some(last_period) = window.rfind(". ")
		&& last_period > 0
		&& last_period as f32 > window.len() as f32 * 0.9
	{
		window.truncate(last_period + 1);
	}

	window
}

fn char_slice(text: &str, start_chars: usize, end_chars: usize) -> &str {
	let start = text.char_indices().nth(start_chars).map(|(idx, _)| idx).unwrap_or(text.len());
	let end = text.char_indices().nth(end_chars).map(|(idx, _)| idx).unwrap_or(text.len());

	&text[start..end.max(start)]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn window_advances_with_start_token() {
		let content = "Sentence one is here. Sentence two follows it. Sentence three closes. "
			.repeat(40);
		let first = extract_token_window(&content, 0, 100);
		let second = extract_token_window(&content, 100, 100);

		assert!(!first.is_empty());
		assert!(!second.is_empty());
		assert_ne!(first, second);
	}

	#[test]
	fn window_from_zero_keeps_the_opening() {
		let content = "Alpha beta gamma. Delta epsilon zeta. ".repeat(30);
		let window = extract_token_window(&content, 0, 50);

		assert!(content.starts_with(window.chars().next().map(String::from).unwrap().as_str()));
	}

	#[test]
	fn window_trims_leading_sentence_fragment() {
		let content = format!("{}. {}", "x".repeat(400), "A clean sentence follows here. ".repeat(40));
		let window = extract_token_window(&content, 90, 100);

		// Whatever the exact offset, the window must not exceed its source.
		assert!(window.len() <= content.len());
		assert!(!window.is_empty());
	}

	#[test]
	fn empty_content_yields_empty_window() {
		assert_eq!(extract_token_window("", 10, 100), "");
	}
}
