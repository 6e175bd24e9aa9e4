use crate::error::{TarotError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// APIキーを渡す環境変数
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
/// 写真1枚のBase64が収まるサイズ
pub const DEFAULT_BODY_LIMIT: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub bind: String,
    pub body_limit_bytes: usize,
    /// ビルド済みWebアプリのディレクトリ
    pub static_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            bind: DEFAULT_BIND.into(),
            body_limit_bytes: DEFAULT_BODY_LIMIT,
            static_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &std::path::Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| TarotError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("tarot-reading").join("config.json"))
    }

    /// APIキーを取得（環境変数を優先）
    pub fn api_key(&self) -> Result<String> {
        Self::resolve_api_key(std::env::var(API_KEY_ENV).ok(), self.api_key.as_deref())
    }

    fn resolve_api_key(env_value: Option<String>, stored: Option<&str>) -> Result<String> {
        env_value
            .filter(|key| !key.trim().is_empty())
            .or_else(|| stored.filter(|key| !key.trim().is_empty()).map(str::to_string))
            .ok_or(TarotError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }
}
