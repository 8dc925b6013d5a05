//! Configuration types.

use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::normalize::Normalizer;

/// Collector configuration: Telegram credentials plus output locations.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Telegram API identifier (`TG_API_ID`).
    pub api_id: i32,
    /// Telegram API hash (`TG_API_HASH`).
    pub api_hash: SecretString,
    /// Phone number of the account used for scraping.
    pub phone: String,
    /// CSV file the collected rows are written to.
    pub output_path: PathBuf,
    /// Directory downloaded photos are stored in.
    pub media_dir: PathBuf,
    /// Whether to download photos attached to messages.
    pub download_media: bool,
    /// Maximum messages fetched per channel.
    pub message_limit: usize,
    /// File the authorized session is persisted to between runs.
    pub session_file: PathBuf,
}

impl CollectorConfig {
    pub const DEFAULT_OUTPUT: &'static str = "data/raw/telegram_data.csv";
    pub const DEFAULT_MEDIA_DIR: &'static str = "data/raw/photos";
    pub const DEFAULT_MESSAGE_LIMIT: usize = 10_000;
    pub const DEFAULT_SESSION_FILE: &'static str = "scraping_session.session";

    /// Build a config from explicit credentials, with default paths.
    pub fn new(api_id: i32, api_hash: SecretString, phone: impl Into<String>) -> Self {
        Self {
            api_id,
            api_hash,
            phone: phone.into(),
            output_path: PathBuf::from(Self::DEFAULT_OUTPUT),
            media_dir: PathBuf::from(Self::DEFAULT_MEDIA_DIR),
            download_media: false,
            message_limit: Self::DEFAULT_MESSAGE_LIMIT,
            session_file: PathBuf::from(Self::DEFAULT_SESSION_FILE),
        }
    }

    /// Load credentials from the process environment, reading a local
    /// `.env` file first if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Ignoring unreadable .env file: {e}");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` uses the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_id = lookup("TG_API_ID")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("TG_API_ID".into()))?;
        let api_id = raw_id
            .trim()
            .parse::<i32>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "TG_API_ID".into(),
                message: e.to_string(),
            })?;

        let api_hash = lookup("TG_API_HASH")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("TG_API_HASH".into()))?;

        let phone = lookup("TG_PHONE")
            .or_else(|| lookup("phone"))
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("TG_PHONE".into()))?;

        let mut config = Self::new(api_id, SecretString::from(api_hash), phone.trim());
        if let Some(dir) = lookup("TG_SESSION_FILE").filter(|v| !v.is_empty()) {
            config.session_file = PathBuf::from(dir);
        }
        Ok(config)
    }
}

/// Labeling session configuration.
#[derive(Debug, Clone)]
pub struct LabelerConfig {
    /// Preprocessed message table to sample from.
    pub input_path: PathBuf,
    /// Tag-per-line output file.
    pub output_path: PathBuf,
    /// Messages sampled per channel (`L`).
    pub per_channel_limit: usize,
    /// Completed messages between checkpoints (`K`).
    pub checkpoint_every: usize,
    /// Seed for the per-channel sample.
    pub seed: u64,
}

impl Default for LabelerConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("data/processed/preprocessed_messages.csv"),
            output_path: PathBuf::from("data/conll/labeled_data.txt"),
            per_channel_limit: 10,
            checkpoint_every: 5,
            seed: 42,
        }
    }
}

impl LabelerConfig {
    /// Reject limits that would make the session meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.per_channel_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "per_channel_limit".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.checkpoint_every == 0 {
            return Err(ConfigError::InvalidValue {
                key: "checkpoint_every".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Preprocessing stage configuration.
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub normalizer: Normalizer,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(CollectorConfig::DEFAULT_OUTPUT),
            output_path: PathBuf::from("data/processed/preprocessed_messages.csv"),
            normalizer: Normalizer::AllowList,
        }
    }
}

impl FromStr for Normalizer {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "amharic" => Ok(Self::Amharic),
            "allow-list" | "allowlist" => Ok(Self::AllowList),
            other => Err(ConfigError::InvalidValue {
                key: "normalizer".into(),
                message: format!("unknown variant '{other}' (expected amharic or allow-list)"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn collector_config_reads_credentials() {
        let config = CollectorConfig::from_lookup(lookup_from(&[
            ("TG_API_ID", "12345"),
            ("TG_API_HASH", "abcdef"),
            ("TG_PHONE", "+251900000000"),
        ]))
        .unwrap();

        assert_eq!(config.api_id, 12345);
        assert_eq!(config.api_hash.expose_secret(), "abcdef");
        assert_eq!(config.phone, "+251900000000");
        assert!(!config.download_media);
        assert_eq!(config.message_limit, 10_000);
        assert_eq!(config.media_dir, PathBuf::from("data/raw/photos"));
    }

    #[test]
    fn collector_config_accepts_legacy_phone_key() {
        let config = CollectorConfig::from_lookup(lookup_from(&[
            ("TG_API_ID", "1"),
            ("TG_API_HASH", "h"),
            ("phone", "+1000"),
        ]))
        .unwrap();
        assert_eq!(config.phone, "+1000");
    }

    #[test]
    fn collector_config_missing_hash() {
        let err = CollectorConfig::from_lookup(lookup_from(&[
            ("TG_API_ID", "1"),
            ("TG_PHONE", "+1000"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "TG_API_HASH"));
    }

    #[test]
    fn collector_config_rejects_non_numeric_id() {
        let err = CollectorConfig::from_lookup(lookup_from(&[
            ("TG_API_ID", "abc"),
            ("TG_API_HASH", "h"),
            ("TG_PHONE", "+1000"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "TG_API_ID"));
    }

    #[test]
    fn collector_config_debug_hides_hash() {
        let config = CollectorConfig::new(1, SecretString::from("super-secret"), "+1");
        assert!(!format!("{config:?}").contains("super-secret"));
    }

    #[test]
    fn labeler_defaults() {
        let config = LabelerConfig::default();
        assert_eq!(config.per_channel_limit, 10);
        assert_eq!(config.checkpoint_every, 5);
        assert_eq!(config.seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn labeler_rejects_zero_limits() {
        let config = LabelerConfig {
            checkpoint_every: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = LabelerConfig {
            per_channel_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn normalizer_from_str() {
        assert_eq!("amharic".parse::<Normalizer>().unwrap(), Normalizer::Amharic);
        assert_eq!("Allow-List".parse::<Normalizer>().unwrap(), Normalizer::AllowList);
        assert!("latin".parse::<Normalizer>().is_err());
    }
}
