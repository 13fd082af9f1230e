use crate::models::ScoringWeights;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub oracle: OracleSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    /// Candidates scoring at or below this are dropped from results
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f64,
    /// Upper bound on the candidate set handed to the ranker
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            score_threshold: default_score_threshold(),
            candidate_limit: default_candidate_limit(),
        }
    }
}

fn default_score_threshold() -> f64 { 0.15 }
fn default_candidate_limit() -> usize { 100 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_keyword_weight")]
    pub keyword: f64,
    #[serde(default = "default_location_weight")]
    pub location: f64,
    #[serde(default = "default_semantic_weight")]
    pub semantic: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            keyword: default_keyword_weight(),
            location: default_location_weight(),
            semantic: default_semantic_weight(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            keyword: config.keyword,
            location: config.location,
            semantic: config.semantic,
        }
    }
}

fn default_keyword_weight() -> f64 { 0.4 }
fn default_location_weight() -> f64 { 0.3 }
fn default_semantic_weight() -> f64 { 0.3 }

#[derive(Debug, Clone, Deserialize)]
pub struct OracleSettings {
    #[serde(default = "default_oracle_endpoint")]
    pub endpoint: String,
    /// Empty key means the oracle is unavailable and the engine runs on
    /// lexical signals alone
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_oracle_model")]
    pub model: String,
    #[serde(default = "default_oracle_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_cache_size")]
    pub cache_size: u64,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            endpoint: default_oracle_endpoint(),
            api_key: String::new(),
            model: default_oracle_model(),
            timeout_secs: default_oracle_timeout(),
            cache_size: default_cache_size(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_oracle_endpoint() -> String { "https://api.openai.com/v1".to_string() }
fn default_oracle_model() -> String { "gpt-3.5-turbo".to_string() }
fn default_oracle_timeout() -> u64 { 30 }
fn default_cache_size() -> u64 { 1000 }
fn default_cache_ttl() -> u64 { 300 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with BIZMATCH_)
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., BIZMATCH_ORACLE__API_KEY -> oracle.api_key
            .add_source(
                Environment::with_prefix("BIZMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("BIZMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Initialize tracing output from logging settings
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging(settings: &LoggingSettings) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.format == "pretty" {
        let _ = subscriber.pretty().try_init();
    } else {
        let _ = subscriber.try_init();
    }
}
