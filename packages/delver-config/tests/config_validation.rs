use toml::Value;

use delver_config::{Config, Error};

const SAMPLE_CONFIG_TOML: &str = r#"
[service]
log_level = "info"

[providers.embedding]
provider_id = "openai"
api_base = "http://localhost:9000"
api_key = "test-key"
path = "/v1/embeddings"
model = "text-embedding-3-small"
dimensions = 1536
timeout_ms = 30000
default_headers = {}

[providers.fetch]
timeout_ms = 20000
user_agent = "delver/0.1"

[chunking]
level = 2

[compression]
level = 4
local_influence_radius = 3
query_weight = 0.5
followup_weight = 0.5
steer_by_preferences = true

[results]
per_query = 3
extra_per_query = 3
repeats_before_expansion = 3
max_result_tokens = 4000
repeat_window_factor = 0.95
relevancy_snippet_length = 2000

[priority]
domains = ""
keywords = ""
domain_multiplier = 1.3
keyword_multiplier_per_match = 1.1
max_keyword_multiplier = 2.0

[cache]
embedding_max_entries = 100000
transformation_max_entries = 25000
"#;

fn sample_with<F>(edit: F) -> String
where
	F: FnOnce(&mut toml::Table),
{
	let mut value: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample.");
	let root = value.as_table_mut().expect("Sample config must be a table.");

	edit(root);

	toml::to_string(&value).expect("Failed to render sample config.")
}

fn parse(raw: &str) -> Config {
	toml::from_str(raw).expect("Failed to deserialize config.")
}

#[test]
fn accepts_sample_config() {
	let cfg = parse(SAMPLE_CONFIG_TOML);

	assert!(delver_config::validate(&cfg).is_ok());
}

#[test]
fn rejects_zero_embedding_dimensions() {
	let raw = sample_with(|root| {
		root["providers"]["embedding"]
			.as_table_mut()
			.unwrap()
			.insert("dimensions".to_string(), Value::Integer(0));
	});
	let cfg = parse(&raw);

	assert!(matches!(delver_config::validate(&cfg), Err(Error::Validation { .. })));
}

#[test]
fn rejects_empty_api_key() {
	let raw = sample_with(|root| {
		root["providers"]["embedding"]
			.as_table_mut()
			.unwrap()
			.insert("api_key".to_string(), Value::String("   ".to_string()));
	});
	let cfg = parse(&raw);

	assert!(matches!(delver_config::validate(&cfg), Err(Error::Validation { .. })));
}

#[test]
fn rejects_query_weight_out_of_range() {
	let raw = sample_with(|root| {
		root["compression"]
			.as_table_mut()
			.unwrap()
			.insert("query_weight".to_string(), Value::Float(1.5));
	});
	let cfg = parse(&raw);

	assert!(matches!(delver_config::validate(&cfg), Err(Error::Validation { .. })));
}

#[test]
fn rejects_window_factor_above_one() {
	let raw = sample_with(|root| {
		root["results"]
			.as_table_mut()
			.unwrap()
			.insert("repeat_window_factor".to_string(), Value::Float(1.25));
	});
	let cfg = parse(&raw);

	assert!(matches!(delver_config::validate(&cfg), Err(Error::Validation { .. })));
}

#[test]
fn rejects_sub_unit_priority_multiplier() {
	let raw = sample_with(|root| {
		root["priority"]
			.as_table_mut()
			.unwrap()
			.insert("domain_multiplier".to_string(), Value::Float(0.8));
	});
	let cfg = parse(&raw);

	assert!(matches!(delver_config::validate(&cfg), Err(Error::Validation { .. })));
}

#[test]
fn rejects_zero_cache_bound() {
	let raw = sample_with(|root| {
		root["cache"]
			.as_table_mut()
			.unwrap()
			.insert("embedding_max_entries".to_string(), Value::Integer(0));
	});
	let cfg = parse(&raw);

	assert!(matches!(delver_config::validate(&cfg), Err(Error::Validation { .. })));
}
