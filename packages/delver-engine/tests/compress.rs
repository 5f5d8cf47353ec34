use delver_chunking::split_text;
use delver_domain::tokens;
use delver_testkit::{failing_engine, test_engine};

const DIMENSIONS: u32 = 64;

fn numbered_sentences(count: usize) -> (String, Vec<String>) {
	let sentences: Vec<String> =
		(0..count).map(|i| format!("Topic {i} covers subject{i} and detail{i}.")).collect();

	(sentences.join(" "), sentences)
}

#[tokio::test]
async fn half_ratio_keeps_exactly_half_in_original_order() {
	let engine = test_engine(DIMENSIONS);
	let mut session = engine.open_session();
	let (content, sentences) = numbered_sentences(20);
	let query = engine.embedding(&mut session, "subject research").await.expect("query embeds");
	let compressed =
		engine.compress(&mut session, &content, &query, None, Some(0.5), None).await;
	let kept = split_text(&compressed, 2, false);

	assert_eq!(kept.len(), 10);

	// Survivors must be a subsequence of the input sentences.
	let mut last_index = None;

	for sentence in &kept {
		let index = sentences
			.iter()
			.position(|original| original == sentence)
			.expect("kept sentence should come from the input");

		if let Some(previous) = last_index {
			assert!(index > previous, "kept sentences out of original order");
		}

		last_index = Some(index);
	}
}

#[tokio::test]
async fn short_content_is_returned_unchanged() {
	let engine = test_engine(DIMENSIONS);
	let mut session = engine.open_session();
	let query = engine.embedding(&mut session, "anything").await.expect("query embeds");
	let short = "Too short to bother with.";

	assert_eq!(engine.compress(&mut session, short, &query, None, Some(0.2), None).await, short);
}

#[tokio::test]
async fn content_within_budget_is_returned_unchanged() {
	let engine = test_engine(DIMENSIONS);
	let mut session = engine.open_session();
	let (content, _) = numbered_sentences(20);
	let query = engine.embedding(&mut session, "anything").await.expect("query embeds");
	let budget = tokens::estimate_tokens(&content) + 10;
	let compressed =
		engine.compress(&mut session, &content, &query, None, None, Some(budget)).await;

	assert_eq!(compressed, content);
}

#[tokio::test]
async fn budget_compression_shrinks_oversized_content() {
	let engine = test_engine(DIMENSIONS);
	let mut session = engine.open_session();
	let (content, _) = numbered_sentences(200);
	let query = engine.embedding(&mut session, "subject research").await.expect("query embeds");
	let original_tokens = tokens::estimate_tokens(&content);
	let budget = original_tokens / 4;
	let compressed =
		engine.compress(&mut session, &content, &query, None, None, Some(budget)).await;
	let compressed_tokens = tokens::estimate_tokens(&compressed);

	assert!(compressed_tokens < original_tokens);
	// Best-effort budget enforcement lands within ten percent of the target.
	assert!(
		compressed_tokens <= budget + budget / 10,
		"estimated {compressed_tokens} tokens against a budget of {budget}",
	);
	assert!(!compressed.is_empty());
}

#[tokio::test]
async fn query_relevant_chunk_survives_aggressive_compression() {
	let engine = test_engine(DIMENSIONS);
	let mut session = engine.open_session();
	let content = "Gardening requires patient watering schedules and compost. \
		Quantum qubits exhibit entanglement and superposition effects. \
		Medieval castles used drawbridges over defensive moats. \
		Sourdough fermentation depends on wild yeast cultures.";
	let query =
		engine.embedding(&mut session, "quantum qubits entanglement").await.expect("query embeds");
	let compressed =
		engine.compress(&mut session, content, &query, None, Some(0.25), None).await;

	assert!(compressed.contains("qubits"));
	assert!(!compressed.contains("Sourdough"));
}

#[tokio::test]
async fn unembeddable_content_is_returned_unchanged() {
	let engine = failing_engine(DIMENSIONS);
	let mut session = engine.open_session();
	let (content, _) = numbered_sentences(20);
	let query = vec![0.5; DIMENSIONS as usize];
	let compressed =
		engine.compress(&mut session, &content, &query, None, Some(0.5), None).await;

	assert_eq!(compressed, content);
}
