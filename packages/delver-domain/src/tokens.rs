/// Cheap token estimate at roughly four characters per token.
///
/// Empty text estimates to zero; any non-empty text estimates to at least one
/// token so budget arithmetic never divides by zero.
pub fn estimate_tokens(text: &str) -> usize {
	if text.is_empty() {
		return 0;
	}

	(text.chars().count() / 4).max(1)
}
