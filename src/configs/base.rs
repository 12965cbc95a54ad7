use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::configs::*;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
  pub logging: Option<LoggingConfig>,
  #[serde(default)]
  pub bot: BotConfig,
  #[serde(default)]
  pub prompts: PromptsConfig,
  #[serde(default)]
  pub llm: Option<LlmConfig>,
  #[serde(default)]
  pub ytdlp: YtDlpConfig,
}

use crate::common::types::AnyResult;

impl Config {
  pub fn load() -> AnyResult<Self> {
    let config_path = if Path::new("config.toml").exists() {
      "config.toml"
    } else if Path::new("config.default.toml").exists() {
      "config.default.toml"
    } else {
      crate::log_println!("No config.toml found, using defaults");
      return Ok(Self::default());
    };

    Self::load_from(config_path)
  }

  pub fn load_from(path: impl AsRef<Path>) -> AnyResult<Self> {
    let path = path.as_ref();
    crate::log_println!("Loading configuration from: {}", path.display());

    let config_str = std::fs::read_to_string(path)?;
    if config_str.trim().is_empty() {
      return Err(format!("{} is empty", path.display()).into());
    }

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  #[test]
  fn test_load_applies_defaults() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
      file,
      r#"
[logging]
level = "debug"

[bot]
extrapolation = "themes"
queue_priority = "user_first"

[llm]
model = "local-model"
base_url = "http://localhost:11434/v1"
"#
    )
    .expect("write config");

    let config = Config::load_from(file.path()).expect("config loads");

    assert_eq!(config.logging.and_then(|l| l.level).as_deref(), Some("debug"));
    assert!(config.bot.extrapolate_when_empty);
    assert_eq!(config.bot.extrapolation, ExtrapolationMode::Themes);
    assert_eq!(config.bot.queue_priority, QueuePriority::UserFirst);
    assert_eq!(config.bot.failure_budget, 5);
    assert_eq!(config.bot.extrapolation_lookback, 10);
    assert!(!config.prompts.song_suggestion.is_empty());

    let llm = config.llm.expect("llm section");
    assert_eq!(llm.model, "local-model");
    assert_eq!(llm.timeout_secs, 30);
    assert_eq!(config.ytdlp.binary, "yt-dlp");
  }

  #[test]
  fn test_disabled_extrapolation_starts_in_none() {
    let config: Config = toml::from_str("[bot]\nextrapolate_when_empty = false\n").expect("parse");
    assert_eq!(config.bot.initial_extrapolation(), ExtrapolationMode::None);
    assert!(config.llm.is_none());
  }

  #[test]
  fn test_empty_file_is_rejected() {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    assert!(Config::load_from(file.path()).is_err());
  }
}
