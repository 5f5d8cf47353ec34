mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Cache, Chunking, Compression, Config, EmbeddingProviderConfig, FetchProviderConfig, Priority,
	Providers, Results, Service,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.api_key must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.fetch.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.fetch.timeout_ms must be greater than zero.".to_string(),
		});
	}

	for (label, weight) in [
		("compression.query_weight", cfg.compression.query_weight),
		("compression.followup_weight", cfg.compression.followup_weight),
	] {
		if !weight.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if !(0.0..=1.0).contains(&weight) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}

	if cfg.results.per_query == 0 {
		return Err(Error::Validation {
			message: "results.per_query must be greater than zero.".to_string(),
		});
	}
	if cfg.results.max_result_tokens == 0 {
		return Err(Error::Validation {
			message: "results.max_result_tokens must be greater than zero.".to_string(),
		});
	}
	if !cfg.results.repeat_window_factor.is_finite()
		|| cfg.results.repeat_window_factor <= 0.0
		|| cfg.results.repeat_window_factor > 1.0
	{
		return Err(Error::Validation {
			message: "results.repeat_window_factor must be in the range (0.0, 1.0].".to_string(),
		});
	}
	if cfg.results.relevancy_snippet_length == 0 {
		return Err(Error::Validation {
			message: "results.relevancy_snippet_length must be greater than zero.".to_string(),
		});
	}

	for (label, multiplier) in [
		("priority.domain_multiplier", cfg.priority.domain_multiplier),
		("priority.keyword_multiplier_per_match", cfg.priority.keyword_multiplier_per_match),
		("priority.max_keyword_multiplier", cfg.priority.max_keyword_multiplier),
	] {
		if !multiplier.is_finite() {
			return Err(Error::Validation {
				message: format!("{label} must be a finite number."),
			});
		}
		if multiplier < 1.0 {
			return Err(Error::Validation { message: format!("{label} must be 1.0 or greater.") });
		}
	}

	if cfg.cache.embedding_max_entries == 0 {
		return Err(Error::Validation {
			message: "cache.embedding_max_entries must be greater than zero.".to_string(),
		});
	}
	if cfg.cache.transformation_max_entries == 0 {
		return Err(Error::Validation {
			message: "cache.transformation_max_entries must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.priority.domains = cfg.priority.domains.trim().to_string();
	cfg.priority.keywords = cfg.priority.keywords.trim().to_string();
}
