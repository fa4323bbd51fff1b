use crate::error::{AltTextError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    /// OpenAI互換APIのベースURL
    pub api_base_url: String,
    /// 2ステップ方式のStep1（画像説明）モデル
    pub description_model: String,
    /// alt生成モデル
    pub alt_text_model: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
    pub default_delay_seconds: f64,
    /// プロンプトに含めるコンテキストの最大文字数
    pub max_context_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: "https://api.openai.com/v1".into(),
            description_model: "gpt-4o-mini".into(),
            alt_text_model: "gpt-4o".into(),
            temperature: 0.3,
            timeout_seconds: 120,
            default_delay_seconds: 1.0,
            max_context_chars: 12_000,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AltTextError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("wp-alt-text").join("config.json"))
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(AltTextError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_models() {
        let config = Config::default();
        assert_eq!(config.description_model, "gpt-4o-mini");
        assert_eq!(config.alt_text_model, "gpt-4o");
        assert!((config.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"alt_text_model": "gpt-4.1"}"#).unwrap();
        assert_eq!(config.alt_text_model, "gpt-4.1");
        assert_eq!(config.description_model, "gpt-4o-mini");
        assert_eq!(config.max_context_chars, 12_000);
    }
}
