//! Splits raw document text into ordered semantic units.
//!
//! Granularity is a small integer level: 0 keeps the whole text, 1 splits
//! phrases, 2 sentences, 3 paragraphs, and 4+ joins `level - 2` consecutive
//! paragraphs per chunk. Splitting is purely lexical and deterministic; chunks
//! are trimmed and never empty.

const PHRASE_TERMINATORS: &[char] = &[',', ';', ':'];
const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?'];

/// Splits `text` at the given granularity level.
///
/// PDF-extracted text carries no reliable paragraph structure, so `pdf` makes
/// sentence-level splitting run over the whole text instead of per paragraph.
pub fn split_text(text: &str, level: u32, pdf: bool) -> Vec<String> {
	match level {
		0 => {
			if text.trim().is_empty() {
				Vec::new()
			} else {
				vec![text.to_string()]
			}
		},
		1 => paragraphs_of(text)
			.flat_map(|paragraph| split_after(paragraph, PHRASE_TERMINATORS))
			.collect(),
		2 =>
			if pdf {
				split_after(text, SENTENCE_TERMINATORS)
			} else {
				paragraphs_of(text)
					.flat_map(|paragraph| split_after(paragraph, SENTENCE_TERMINATORS))
					.collect()
			},
		3 => paragraphs_of(text).map(str::to_string).collect(),
		_ => {
			let paragraphs: Vec<&str> = paragraphs_of(text).collect();
			let per_chunk = (level - 2) as usize;

			paragraphs.chunks(per_chunk).map(|group| group.join("\n")).collect()
		},
	}
}

/// Re-joins selected chunks with level-appropriate separators: phrases are
/// space-joined, sentences are terminator-normalized then space-joined, and
/// coarser levels are newline-joined.
pub fn join_chunks(chunks: &[String], level: u32) -> String {
	match level {
		1 => chunks.join(" "),
		2 => {
			let sentences: Vec<String> = chunks
				.iter()
				.map(|sentence| {
					if sentence.ends_with(['.', '!', '?', ':', ';']) {
						sentence.clone()
					} else {
						format!("{sentence}.")
					}
				})
				.collect();

			sentences.join(" ")
		},
		_ => chunks.join("\n"),
	}
}

fn paragraphs_of(text: &str) -> impl Iterator<Item = &str> {
	text.split('\n').map(str::trim).filter(|paragraph| !paragraph.is_empty())
}

/// Splits wherever one of `terminators` is immediately followed by
/// whitespace, keeping the terminator with the preceding fragment.
fn split_after(text: &str, terminators: &[char]) -> Vec<String> {
	let mut fragments = Vec::new();
	let mut start = 0;
	let mut after_terminator = false;

	for (idx, ch) in text.char_indices() {
		if after_terminator && ch.is_whitespace() {
			let fragment = text[start..idx].trim();

			if !fragment.is_empty() {
				fragments.push(fragment.to_string());
			}

			start = idx;
		}

		after_terminator = terminators.contains(&ch);
	}

	let tail = text[start..].trim();

	if !tail.is_empty() {
		fragments.push(tail.to_string());
	}

	fragments
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = "First sentence. Second sentence! Third one?\nAnother paragraph here.";

	#[test]
	fn level_zero_keeps_whole_text() {
		assert_eq!(split_text(SAMPLE, 0, false), vec![SAMPLE.to_string()]);
		assert!(split_text("   \n  ", 0, false).is_empty());
	}

	#[test]
	fn level_one_splits_phrases_on_clause_punctuation() {
		let chunks = split_text("alpha, beta; gamma: delta", 1, false);

		assert_eq!(chunks, vec!["alpha,", "beta;", "gamma:", "delta"]);
	}

	#[test]
	fn level_two_splits_sentences_per_paragraph() {
		let chunks = split_text(SAMPLE, 2, false);

		assert_eq!(chunks, vec![
			"First sentence.",
			"Second sentence!",
			"Third one?",
			"Another paragraph here.",
		]);
	}

	#[test]
	fn pdf_mode_ignores_paragraph_structure() {
		let text = "Broken.\nacross lines. Next sentence.";
		let chunks = split_text(text, 2, true);

		assert_eq!(chunks, vec!["Broken.", "across lines.", "Next sentence."]);
	}

	#[test]
	fn level_three_returns_paragraphs() {
		let chunks = split_text("one\n\n  two  \nthree", 3, false);

		assert_eq!(chunks, vec!["one", "two", "three"]);
	}

	#[test]
	fn level_five_groups_three_paragraphs_per_chunk() {
		let chunks = split_text("a\nb\nc\nd", 5, false);

		assert_eq!(chunks, vec!["a\nb\nc", "d"]);
	}

	#[test]
	fn splitting_is_deterministic_and_lossless_on_non_whitespace() {
		for level in 0..=6 {
			let first = split_text(SAMPLE, level, false);
			let second = split_text(SAMPLE, level, false);

			assert_eq!(first, second);
			assert!(first.iter().all(|chunk| !chunk.trim().is_empty()));

			let original: String = SAMPLE.chars().filter(|c| !c.is_whitespace()).collect();
			let rejoined: String =
				first.concat().chars().filter(|c| !c.is_whitespace()).collect();

			assert_eq!(original, rejoined, "level {level} lost characters");
		}
	}

	#[test]
	fn sentence_join_normalizes_terminators() {
		let chunks = vec!["Ends with period.".to_string(), "No terminator".to_string()];

		assert_eq!(join_chunks(&chunks, 2), "Ends with period. No terminator.");
	}

	#[test]
	fn abbreviation_mid_sentence_still_splits_on_whitespace() {
		let chunks = split_text("See e.g. the docs. Done.", 2, false);

		assert_eq!(chunks, vec!["See e.g.", "the docs.", "Done."]);
	}
}
