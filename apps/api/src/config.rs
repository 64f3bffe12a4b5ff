use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::feedback::{
    FeedbackSettings, DEFAULT_API_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, MAX_RETRIES_LIMIT,
};
use crate::scoring::fusion::FusionConfig;
use crate::scoring::normalizer::NormalizationModel;

/// Which text the feedback generator receives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedbackInput {
    /// Extracted text as uploaded, with punctuation and structure intact.
    #[default]
    Original,
    /// The lemmatized text used for scoring.
    Normalized,
}

impl FromStr for FeedbackInput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" => Ok(Self::Original),
            "normalized" => Ok(Self::Normalized),
            other => Err(format!(
                "unknown feedback input '{other}' (expected 'original' or 'normalized')"
            )),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every value has a default; invalid values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub normalization_model: NormalizationModel,
    pub fusion: FusionConfig,
    pub feedback: FeedbackSettings,
    pub feedback_input: FeedbackInput,
    pub max_upload_bytes: usize,
    pub bulk_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            rust_log: "info".to_string(),
            normalization_model: NormalizationModel::default(),
            fusion: FusionConfig::default(),
            feedback: FeedbackSettings::default(),
            feedback_input: FeedbackInput::default(),
            max_upload_bytes: 10 * 1024 * 1024,
            bulk_concurrency: 4,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let fusion = FusionConfig {
            weight_lexical: parse_or(&lookup, "WEIGHT_LEXICAL", defaults.fusion.weight_lexical)?,
            weight_semantic: parse_or(
                &lookup,
                "WEIGHT_SEMANTIC",
                defaults.fusion.weight_semantic,
            )?,
            high_threshold: parse_or(&lookup, "HIGH_THRESHOLD", defaults.fusion.high_threshold)?,
            medium_threshold: parse_or(
                &lookup,
                "MEDIUM_THRESHOLD",
                defaults.fusion.medium_threshold,
            )?,
        };
        fusion
            .validate()
            .map_err(|e| anyhow!("Invalid scoring configuration: {e}"))?;

        let feedback = FeedbackSettings {
            api_url: lookup("FEEDBACK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_key: lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
            model: lookup("FEEDBACK_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: parse_or(&lookup, "FEEDBACK_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            timeout: Duration::from_secs(parse_or(&lookup, "FEEDBACK_TIMEOUT_SECS", 30u64)?),
            max_retries: parse_or(&lookup, "FEEDBACK_MAX_RETRIES", 2u32)?,
            ..defaults.feedback
        };
        if feedback.max_retries > MAX_RETRIES_LIMIT {
            return Err(anyhow!(
                "FEEDBACK_MAX_RETRIES must be at most {MAX_RETRIES_LIMIT}, got {}",
                feedback.max_retries
            ));
        }

        let bulk_concurrency = parse_or(&lookup, "BULK_CONCURRENCY", defaults.bulk_concurrency)?;
        if bulk_concurrency == 0 {
            return Err(anyhow!("BULK_CONCURRENCY must be at least 1"));
        }

        Ok(Config {
            port: parse_or(&lookup, "PORT", defaults.port)?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            normalization_model: parse_or(
                &lookup,
                "NORMALIZATION_MODEL",
                defaults.normalization_model,
            )?,
            fusion,
            feedback,
            feedback_input: parse_or(&lookup, "FEEDBACK_INPUT", defaults.feedback_input)?,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            bulk_concurrency,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_env_is_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.normalization_model, NormalizationModel::English);
        assert_eq!(config.fusion.weight_lexical, 0.5);
        assert_eq!(config.fusion.weight_semantic, 0.5);
        assert_eq!(config.fusion.high_threshold, 75.0);
        assert_eq!(config.fusion.medium_threshold, 50.0);
        assert_eq!(config.feedback.max_tokens, 300);
        assert_eq!(config.feedback.model, "gpt-4o-mini");
        assert!(config.feedback.api_key.is_none());
        assert_eq!(config.feedback_input, FeedbackInput::Original);
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = config_from(&[
            ("PORT", "9090"),
            ("WEIGHT_LEXICAL", "0.6"),
            ("WEIGHT_SEMANTIC", "0.4"),
            ("HIGH_THRESHOLD", "80"),
            ("FEEDBACK_MAX_TOKENS", "500"),
            ("FEEDBACK_TIMEOUT_SECS", "5"),
            ("OPENAI_API_KEY", "sk-test"),
            ("NORMALIZATION_MODEL", "lowercase"),
            ("FEEDBACK_INPUT", "normalized"),
        ])
        .unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.fusion.weight_lexical, 0.6);
        assert_eq!(config.fusion.high_threshold, 80.0);
        assert_eq!(config.feedback.max_tokens, 500);
        assert_eq!(config.feedback.timeout, Duration::from_secs(5));
        assert_eq!(config.feedback.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.normalization_model, NormalizationModel::Lowercase);
        assert_eq!(config.feedback_input, FeedbackInput::Normalized);
    }

    #[test]
    fn test_blank_api_key_is_treated_as_missing() {
        let config = config_from(&[("OPENAI_API_KEY", "  ")]).unwrap();
        assert!(config.feedback.api_key.is_none());
    }

    #[test]
    fn test_invalid_number_fails_with_key_in_message() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(format!("{err:#}").contains("PORT"));
    }

    #[test]
    fn test_inverted_thresholds_fail() {
        let err = config_from(&[("HIGH_THRESHOLD", "40"), ("MEDIUM_THRESHOLD", "60")]).unwrap_err();
        assert!(err.to_string().contains("Invalid scoring configuration"));
    }

    #[test]
    fn test_zero_bulk_concurrency_fails() {
        assert!(config_from(&[("BULK_CONCURRENCY", "0")]).is_err());
    }

    #[test]
    fn test_feedback_retries_are_capped() {
        let config = config_from(&[("FEEDBACK_MAX_RETRIES", "10")]).unwrap();
        assert_eq!(config.feedback.max_retries, 10);

        let err = config_from(&[("FEEDBACK_MAX_RETRIES", "40")]).unwrap_err();
        assert!(err.to_string().contains("FEEDBACK_MAX_RETRIES"));
    }
}
