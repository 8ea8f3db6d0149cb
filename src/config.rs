use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://ws.audioscrobbler.com/2.0/";
pub const DEFAULT_PLACEHOLDER_PATH: &str = "./static/temp.gif";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub default_user: String,
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_placeholder_path")]
    pub placeholder_path: PathBuf,
    #[serde(default)]
    pub lastfm: LastFmConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastFmConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_placeholder_path() -> PathBuf {
    PathBuf::from(DEFAULT_PLACEHOLDER_PATH)
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7860
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_user: String::new(),
            debug: false,
            placeholder_path: default_placeholder_path(),
            lastfm: LastFmConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for LastFmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl LastFmConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_ref().is_some_and(|s| !s.trim().is_empty())
    }
}

impl Config {
    /// 환경 변수 값으로 설정을 덮어쓴다. `lookup`은 테스트에서 가짜 환경을 주입하기 위한 것이다.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("LASTFM_API_KEY").filter(|v| !v.is_empty()) {
            self.lastfm.api_key = Some(key);
        }
        if let Some(url) = lookup("LASTFM_BASE_URL").filter(|v| !v.is_empty()) {
            self.lastfm.base_url = url;
        }
        if let Some(user) = lookup("LASTFM_DEFAULT_USER").filter(|v| !v.is_empty()) {
            self.default_user = user;
        }
        if let Some(debug) = lookup("PASTFM_DEBUG") {
            self.debug = matches!(debug.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }
}

fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".config")
        .join("pastfm")
        .join("config.toml")
}

fn parse_config(content: &str) -> Config {
    match toml::from_str(content) {
        Ok(cfg) => cfg,
        Err(e) => {
            // 로거는 설정을 읽은 뒤에 초기화되므로 직접 출력한다
            eprintln!("경고: 설정 파일을 해석할 수 없어 기본값을 사용합니다: {}", e);
            Config::default()
        }
    }
}

/// 설정 파일을 읽고 환경 변수 덮어쓰기를 적용한다.
/// 파일이 없거나 읽을 수 없으면 기본값을 쓴다.
pub fn load_config() -> Config {
    let path = config_path();
    let mut config = if !path.exists() {
        Config::default()
    } else {
        match std::fs::read_to_string(&path) {
            Ok(content) => parse_config(&content),
            Err(_) => Config::default(),
        }
    };
    config.apply_env_overrides(|name| std::env::var(name).ok());
    config
}

pub fn save_config(config: &Config) -> Result<()> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("설정 디렉토리를 만들 수 없습니다: {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content)
        .with_context(|| format!("설정 파일을 저장할 수 없습니다: {}", path.display()))?;
    Ok(())
}
