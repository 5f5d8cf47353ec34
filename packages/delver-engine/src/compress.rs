//! Importance-scored compression.
//!
//! Content is chunked, each chunk is scored against the document centroid,
//! the query (optionally blended with a follow-up summary), its local
//! neighborhood, and the active preference direction; the top-scoring chunks
//! survive in original order. Compression never raises: every failure path
//! degrades to proportional truncation or the unmodified input.

use delver_chunking as chunking;
use delver_domain::{tokens, vector};

use crate::{DelverEngine, SessionState, transform};

/// Content shorter than this is not worth compressing.
const MIN_COMPRESSIBLE_CHARS: usize = 100;

/// Compression level to kept-chunk ratio. Unknown levels keep half.
const LEVEL_RATIOS: [(u32, f32); 10] = [
	(1, 0.9),
	(2, 0.8),
	(3, 0.7),
	(4, 0.6),
	(5, 0.5),
	(6, 0.4),
	(7, 0.3),
	(8, 0.2),
	(9, 0.15),
	(10, 0.1),
];
const DEFAULT_RATIO: f32 = 0.5;

impl DelverEngine {
	/// Compresses `content` to roughly `ratio` of its chunks, or to fit
	/// `max_tokens` when given. Returns the input unchanged when it is
	/// already small enough or yields too few embeddable chunks.
	pub async fn compress(
		&self,
		session: &mut SessionState,
		content: &str,
		query_vec: &[f32],
		summary_vec: Option<&[f32]>,
		ratio: Option<f32>,
		max_tokens: Option<usize>,
	) -> String {
		let compressed =
			self.compress_pass(session, content, query_vec, summary_vec, ratio, max_tokens).await;

		// One bounded retry with a tightened ratio when the first pass still
		// overshoots the budget; never recurse further.
		if let Some(budget) = max_tokens {
			let estimated = tokens::estimate_tokens(&compressed);

			if estimated > budget {
				let tightened = budget as f32 / estimated as f32;

				return self
					.compress_pass(session, &compressed, query_vec, summary_vec, Some(tightened), None)
					.await;
			}
		}

		compressed
	}

	async fn compress_pass(
		&self,
		session: &mut SessionState,
		content: &str,
		query_vec: &[f32],
		summary_vec: Option<&[f32]>,
		ratio: Option<f32>,
		max_tokens: Option<usize>,
	) -> String {
		if content.chars().count() < MIN_COMPRESSIBLE_CHARS {
			return content.to_string();
		}

		let mut ratio = ratio;

		if let Some(budget) = max_tokens {
			let content_tokens = tokens::estimate_tokens(content);

			if content_tokens <= budget {
				return content.to_string();
			}
			if ratio.is_none() {
				ratio = Some(budget as f32 / content_tokens as f32);
			}
		}

		let chunk_level = self.cfg.chunking.level;
		let chunks = chunking::split_text(content, chunk_level, session.pdf_source);

		if chunks.len() <= 1 {
			return content.to_string();
		}

		// Chunks whose embedding fails are skipped; indices stay paired with
		// their vectors so selection always maps back to the right chunk.
		let mut indices = Vec::with_capacity(chunks.len());
		let mut vectors = Vec::with_capacity(chunks.len());

		for (idx, chunk) in chunks.iter().enumerate() {
			if let Some(mut embedding) = self.embedding(session, chunk).await {
				if vector::sanitize(&mut embedding) {
					tracing::warn!(chunk = idx, "Sanitized non-finite chunk embedding.");
				}

				indices.push(idx);
				vectors.push(embedding);
			}
		}

		if vectors.len() <= 1 {
			return content.to_string();
		}

		let ratio = ratio.unwrap_or_else(|| level_ratio(self.cfg.compression.level));
		let n_chunks = vectors.len();
		let n_keep = ((n_chunks as f32 * ratio).round() as usize).clamp(1, n_chunks - 1);
		let Some(selected) = self.select_chunks(session, SelectChunksArgs {
			chunks: &chunks,
			indices: &indices,
			vectors: &vectors,
			query_vec,
			summary_vec,
			n_keep,
		}) else {
			return fallback_truncate(content, max_tokens);
		};

		chunking::join_chunks(&selected, chunk_level)
	}

	fn select_chunks(
		&self,
		session: &SessionState,
		args: SelectChunksArgs<'_>,
	) -> Option<Vec<String>> {
		let SelectChunksArgs { chunks, indices, vectors, query_vec, summary_vec, n_keep } = args;
		let centroid = vector::mean(vectors)?;
		let local = local_influence(vectors, self.cfg.compression.local_influence_radius as usize);
		let preferences = &session.preferences;
		let steering = self.cfg.compression.steer_by_preferences && preferences.is_active();
		let pdv_influence = if steering { preferences.influence() } else { 0.0 };

		// Weights derive from the single query-weight knob; they are not
		// normalized to sum to one, and PDV influence competes with the query
		// term rather than adding to it.
		let query_knob = self.cfg.compression.query_weight;
		let doc_weight = (1.0 - query_knob) * 0.4;
		let local_weight = (1.0 - query_knob) * 0.8;
		let query_weight = query_knob * (1.0 - pdv_influence);
		let followup_weight = self.cfg.compression.followup_weight;

		let mut scored: Vec<(usize, f32)> = Vec::with_capacity(vectors.len());

		for (slot, embedding) in vectors.iter().enumerate() {
			let doc_similarity = vector::cosine_similarity(embedding, &centroid);
			let mut query_similarity = vector::cosine_similarity(embedding, query_vec);

			if let Some(summary) = summary_vec {
				let summary_similarity = vector::cosine_similarity(embedding, summary);

				query_similarity = query_similarity * followup_weight
					+ summary_similarity * (1.0 - followup_weight);
			}

			let alignment =
				if steering { transform::preference_alignment(embedding, preferences) } else { 0.5 };
			let score = doc_similarity * doc_weight
				+ query_similarity * query_weight
				+ local[slot] * local_weight
				+ alignment * pdv_influence;

			scored.push((slot, score));
		}

		scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

		let mut kept_slots: Vec<usize> = scored.iter().take(n_keep).map(|(slot, _)| *slot).collect();

		kept_slots.sort_unstable();

		let selected: Vec<String> =
			kept_slots.iter().map(|&slot| chunks[indices[slot]].clone()).collect();

		if selected.is_empty() { None } else { Some(selected) }
	}
}

struct SelectChunksArgs<'a> {
	chunks: &'a [String],
	indices: &'a [usize],
	vectors: &'a [Vec<f32>],
	query_vec: &'a [f32],
	summary_vec: Option<&'a [f32]>,
	n_keep: usize,
}

fn level_ratio(level: u32) -> f32 {
	LEVEL_RATIOS
		.iter()
		.find(|(candidate, _)| *candidate == level)
		.map(|(_, ratio)| *ratio)
		.unwrap_or(DEFAULT_RATIO)
}

/// Mean cosine similarity of each chunk to its neighbors within `radius`
/// positions on either side; chunks at the document edges see fewer.
fn local_influence(vectors: &[Vec<f32>], radius: usize) -> Vec<f32> {
	(0..vectors.len())
		.map(|i| {
			let lo = i.saturating_sub(radius);
			let hi = (i + radius + 1).min(vectors.len());
			let mut sum = 0.0;
			let mut count = 0;

			for j in lo..hi {
				if j != i {
					sum += vector::cosine_similarity(&vectors[i], &vectors[j]);
					count += 1;
				}
			}

			if count > 0 { sum / count as f32 } else { 0.0 }
		})
		.collect()
}

/// Last-resort budget enforcement: character-proportional truncation, or the
/// unmodified content when no budget was given.
fn fallback_truncate(content: &str, max_tokens: Option<usize>) -> String {
	let Some(budget) = max_tokens else {
		return content.to_string();
	};
	let content_tokens = tokens::estimate_tokens(content);

	if content_tokens <= budget {
		return content.to_string();
	}

	let char_ratio = budget as f32 / content_tokens as f32;
	let char_limit = (content.chars().count() as f32 * char_ratio) as usize;

	crate::truncate_chars(content, char_limit).to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn level_ratio_table_matches_configuration_levels() {
		assert!((level_ratio(1) - 0.9).abs() < 1e-6);
		assert!((level_ratio(10) - 0.1).abs() < 1e-6);
		assert!((level_ratio(42) - DEFAULT_RATIO).abs() < 1e-6);
	}

	#[test]
	fn local_influence_sees_fewer_neighbors_at_edges() {
		let vectors = vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]];
		let influence = local_influence(&vectors, 1);

		assert_eq!(influence.len(), 3);
		// The first chunk only sees its identical right neighbor.
		assert!((influence[0] - 1.0).abs() < 1e-6);
		// The middle chunk averages an identical and an orthogonal neighbor.
		assert!((influence[1] - 0.5).abs() < 1e-6);
	}

	#[test]
	fn fallback_truncation_respects_the_budget() {
		let content = "word ".repeat(400);
		let truncated = fallback_truncate(&content, Some(100));

		assert!(tokens::estimate_tokens(&truncated) <= 100);
		assert_eq!(fallback_truncate("short", None), "short");
	}
}
