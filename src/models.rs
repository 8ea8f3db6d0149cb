use std::fmt;

use anyhow::{bail, Result};
use serde::Serialize;

use crate::config::Config;

/// 한 번의 조회에 쓰이는 불변 파라미터.
#[derive(Clone, PartialEq, Eq)]
pub struct TrackQuery {
    pub username: String,
    pub api_key: String,
    pub base_url: String,
}

impl TrackQuery {
    /// 설정값으로 조회 파라미터를 만든다. `user`가 주어지면 기본 사용자 대신 쓴다.
    pub fn from_config(config: &Config, user: Option<&str>) -> Result<Self> {
        let username = user
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(config.default_user.trim());
        if username.is_empty() {
            bail!("사용자 이름이 없습니다. --user 옵션이나 default_user 설정을 지정하세요");
        }

        let api_key = match config.lastfm.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key.trim(),
            _ => bail!("Last.fm API 키가 설정되지 않았습니다. 먼저 'pastfm config'를 실행하세요"),
        };

        Ok(Self {
            username: username.to_string(),
            api_key: api_key.to_string(),
            base_url: config.lastfm.base_url.clone(),
        })
    }
}

impl fmt::Debug for TrackQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackQuery")
            .field("username", &self.username)
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// 화면에 내보내는 정규화된 트랙 상태. 원격 API의 원본 구조는 여기로 새지 않는다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackStatus {
    pub song: String,
    pub artist: String,
    #[serde(rename = "thumbnail")]
    pub thumbnail_base64: Option<String>,
    #[serde(rename = "url")]
    pub track_url: String,
    pub is_playing: bool,
}

impl TrackStatus {
    pub fn display_song(&self) -> &str {
        if self.song.is_empty() {
            "알 수 없음"
        } else {
            &self.song
        }
    }

    pub fn display_artist(&self) -> &str {
        if self.artist.is_empty() {
            "알 수 없음"
        } else {
            &self.artist
        }
    }

    pub fn summary(&self) -> String {
        let state = if self.is_playing { "재생 중" } else { "최근 재생" };
        format!("{} - {} [{}]", self.display_artist(), self.display_song(), state)
    }
}
