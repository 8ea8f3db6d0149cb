use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ResolveError;
use crate::models::TrackQuery;

pub const RECENT_TRACKS_METHOD: &str = "user.getRecentTracks";

/// `user.getRecentTracks` 응답의 최상위 구조.
/// 오류 응답은 `{"error": 6, "message": "..."}` 형태로 온다.
#[derive(Debug, Deserialize)]
struct RecentTracksResponse {
    recenttracks: Option<RecentTracks>,
    error: Option<i64>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecentTracks {
    /// 첫 레코드만 해석한다. 나머지 레코드의 형식은 조회 결과에 영향을 주지 않는다.
    #[serde(default)]
    track: Option<OneOrMany<Value>>,
}

/// 기록이 하나뿐이면 배열 대신 객체 하나가 온다.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// 정규화 전의 트랙 레코드.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTrackRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artist: Option<RawArtist>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_images")]
    pub image: Option<Vec<RawImage>>,
    #[serde(rename = "@attr", default)]
    pub attr: Option<RawTrackAttr>,
}

/// 아티스트 필드. extended 모드에서는 객체, 일반 모드에서는 문자열이다.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawArtist {
    Plain(String),
    Structured {
        #[serde(default)]
        name: Option<String>,
        #[serde(rename = "#text", default)]
        text: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawImage {
    #[serde(default)]
    pub size: Option<String>,
    #[serde(rename = "#text", default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTrackAttr {
    /// 문자열 "true"만 재생 중으로 본다. 값 타입이 섞여 와도 파싱이 깨지지 않도록 Value로 받는다.
    #[serde(default)]
    pub nowplaying: Option<Value>,
}

/// `image`가 배열이 아니면 이미지가 없는 것으로 본다. 배열 안의 해석할 수 없는 항목은 건너뛴다.
fn lenient_images<'de, D>(deserializer: D) -> Result<Option<Vec<RawImage>>, D::Error>
where
    D: Deserializer<'de>,
{
    let images = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    };
    Ok(Some(images))
}

impl RawTrackRecord {
    pub fn song(&self) -> String {
        self.name.clone().unwrap_or_default()
    }

    pub fn track_url(&self) -> String {
        self.url.clone().unwrap_or_default()
    }

    /// 아티스트 이름. 객체면 `name`, 없으면 `#text`, 둘 다 없으면 빈 문자열.
    pub fn artist_name(&self) -> String {
        match &self.artist {
            Some(RawArtist::Plain(name)) => name.clone(),
            Some(RawArtist::Structured { name, text }) => name
                .as_deref()
                .filter(|n| !n.is_empty())
                .or(text.as_deref())
                .unwrap_or_default()
                .to_string(),
            None => String::new(),
        }
    }

    pub fn is_now_playing(&self) -> bool {
        matches!(
            self.attr.as_ref().and_then(|a| a.nowplaying.as_ref()),
            Some(Value::String(flag)) if flag == "true"
        )
    }

    /// 이미지 목록을 뒤에서부터 훑어 처음 나오는 비어있지 않은 URL을 고른다.
    /// 큰 해상도가 뒤쪽에 온다고 가정한다.
    pub fn image_url(&self) -> String {
        self.selected_image()
            .and_then(|img| img.url.clone())
            .unwrap_or_default()
    }

    pub fn selected_image(&self) -> Option<&RawImage> {
        self.image
            .iter()
            .flatten()
            .rev()
            .find(|img| img.url.as_deref().is_some_and(|u| !u.is_empty()))
    }
}

/// 최근 재생 트랙 조회 URL을 만든다. 파라미터는 삽입 순서를 유지한다.
pub fn build_recent_tracks_url(query: &TrackQuery, extended: bool) -> Result<String, ResolveError> {
    let mut params: Vec<(&str, &str)> = vec![
        ("method", RECENT_TRACKS_METHOD),
        ("user", query.username.as_str()),
        ("api_key", query.api_key.as_str()),
        ("format", "json"),
        ("limit", "1"),
    ];
    if extended {
        params.push(("extended", "1"));
    }

    let url = reqwest::Url::parse_with_params(&query.base_url, &params).map_err(|e| {
        ResolveError::InvalidUrl {
            base: query.base_url.clone(),
            reason: e.to_string(),
        }
    })?;

    Ok(url.to_string())
}

/// 응답 본문에서 첫 번째(가장 최근) 트랙을 꺼낸다. 목록이 없거나 비어있으면 `EmptyResult`.
pub fn parse_current_track(body: &[u8]) -> Result<RawTrackRecord, ResolveError> {
    let resp: RecentTracksResponse = serde_json::from_slice(body)?;

    if let Some(code) = resp.error {
        return Err(ResolveError::Api {
            code,
            message: resp.message.unwrap_or_default(),
        });
    }

    let first = resp
        .recenttracks
        .and_then(|r| r.track)
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or(ResolveError::EmptyResult)?;

    Ok(serde_json::from_value(first)?)
}
