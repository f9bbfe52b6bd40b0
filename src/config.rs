use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::{MAX_QUESTIONS, MIN_QUESTIONS};
use crate::session::quiz::QuizMode;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_vocab_path")]
    pub vocab_path: String,
    #[serde(default = "default_ledger_path")]
    pub ledger_path: String,
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    #[serde(default = "default_category")]
    pub default_category: String,
    #[serde(default)]
    pub mode: QuizMode,
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub speech: SpeechConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_speech_enabled")]
    pub enabled: bool,
    #[serde(default = "default_speech_command")]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_vocab_path() -> String {
    "vocab.csv".to_string()
}
fn default_ledger_path() -> String {
    "wrong_words.csv".to_string()
}
fn default_categories() -> Vec<String> {
    ["四级", "六级", "雅思"].iter().map(|c| c.to_string()).collect()
}
fn default_category() -> String {
    "四级".to_string()
}
fn default_question_count() -> usize {
    10
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_speech_enabled() -> bool {
    true
}
fn default_speech_command() -> Option<String> {
    if cfg!(target_os = "macos") {
        Some("say".to_string())
    } else if cfg!(target_os = "linux") {
        Some("espeak".to_string())
    } else {
        None
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: default_speech_enabled(),
            command: default_speech_command(),
            args: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vocab_path: default_vocab_path(),
            ledger_path: default_ledger_path(),
            categories: default_categories(),
            default_category: default_category(),
            mode: QuizMode::default(),
            question_count: default_question_count(),
            theme: default_theme(),
            log_level: default_log_level(),
            speech: SpeechConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            Self::from_toml(&content)
        } else {
            Ok(Config::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.normalize();
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cihui")
            .join("config.toml")
    }

    pub fn log_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cihui")
            .join("logs")
    }

    pub fn vocab_path(&self) -> PathBuf {
        PathBuf::from(&self.vocab_path)
    }

    pub fn ledger_path(&self) -> PathBuf {
        PathBuf::from(&self.ledger_path)
    }

    /// Pull hand-edited values back into range.
    pub fn normalize(&mut self) {
        self.question_count = self.question_count.clamp(MIN_QUESTIONS, MAX_QUESTIONS);
        if !self.categories.is_empty() && !self.categories.contains(&self.default_category) {
            self.default_category = self.categories[0].clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.vocab_path, "vocab.csv");
        assert_eq!(config.ledger_path, "wrong_words.csv");
        assert_eq!(config.categories, vec!["四级", "六级", "雅思"]);
        assert_eq!(config.question_count, 10);
        assert_eq!(config.mode, QuizMode::EnglishToChinese);
        assert!(config.speech.enabled);
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let config = Config::from_toml(
            r#"
            mode = "chinese_to_english"
            question_count = 25

            [speech]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(config.mode, QuizMode::ChineseToEnglish);
        assert_eq!(config.question_count, 25);
        assert!(!config.speech.enabled);
        assert_eq!(config.theme, "catppuccin-mocha");
    }

    #[test]
    fn out_of_range_count_is_clamped() {
        let config = Config::from_toml("question_count = 500").unwrap();
        assert_eq!(config.question_count, 50);
        let config = Config::from_toml("question_count = 0").unwrap();
        assert_eq!(config.question_count, 1);
    }

    #[test]
    fn unknown_default_category_falls_back_to_first() {
        let config = Config::from_toml(
            r#"
            categories = ["雅思", "托福"]
            default_category = "四级"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_category, "雅思");
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(Config::from_toml("question_count = \"many\"").is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = Config::from_toml(&text).unwrap();
        assert_eq!(parsed.default_category, config.default_category);
        assert_eq!(parsed.mode, config.mode);
    }
}
