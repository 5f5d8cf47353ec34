use std::time::Duration;

use color_eyre::Result;
use reqwest::Client;

/// Fetches a page body as text. Extraction, retry, and backoff policy belong
/// to the caller; this is the thinnest possible transport.
pub async fn fetch(cfg: &delver_config::FetchProviderConfig, url: &str) -> Result<String> {
	let client = Client::builder()
		.timeout(Duration::from_millis(cfg.timeout_ms))
		.user_agent(cfg.user_agent.clone())
		.build()?;
	let res = client.get(url).send().await?;
	let body = res.error_for_status()?.text().await?;

	Ok(body)
}
