//! 테스트 공용 헬퍼와 가짜 HTTP 소스.
//!
//! 네트워크 없이 Last.fm 응답과 이미지 다운로드를 흉내 낸다.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{json, Value};
use tempfile::TempDir;

use crate::error::ResolveError;
use crate::models::TrackQuery;
use crate::sources::HttpSource;

/// 배포되는 플레이스홀더 이미지와 같은 바이트.
pub const PLACEHOLDER_GIF: &[u8] = include_bytes!("../static/temp.gif");

pub const BASE_URL: &str = "https://ws.audioscrobbler.com/2.0/";

/// URL별로 미리 정해 둔 응답을 돌려주는 HTTP 소스.
/// 등록되지 않은 URL은 전송 실패로 처리한다.
#[derive(Default)]
pub struct FakeHttp {
    responses: HashMap<String, Result<Vec<u8>, u16>>,
    calls: AtomicUsize,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: &str, body: &[u8]) -> Self {
        self.responses.insert(url.to_string(), Ok(body.to_vec()));
        self
    }

    pub fn with_json(self, url: &str, body: &Value) -> Self {
        let bytes = body.to_string().into_bytes();
        self.with_body(url, &bytes)
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(url.to_string(), Err(status));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HttpSource for FakeHttp {
    fn get(&self, url: &str) -> Result<Vec<u8>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(ResolveError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(ResolveError::Transport {
                url: url.to_string(),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "연결이 거부되었습니다",
                )),
            }),
        }
    }
}

/// 임시 디렉토리에 플레이스홀더 이미지를 쓴다. TempDir은 테스트 동안 살아 있어야 한다.
pub fn write_placeholder() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("임시 디렉토리 생성 실패");
    let path = dir.path().join("temp.gif");
    std::fs::write(&path, PLACEHOLDER_GIF).expect("플레이스홀더 쓰기 실패");
    (dir, path)
}

pub fn query(user: &str) -> TrackQuery {
    TrackQuery {
        username: user.to_string(),
        api_key: "KEY".to_string(),
        base_url: BASE_URL.to_string(),
    }
}

/// 조회 파라미터에 대응하는 최근 재생 트랙 요청 URL.
pub fn lookup_url(user: &str) -> String {
    format!(
        "{}?method=user.getRecentTracks&user={}&api_key=KEY&format=json&limit=1&extended=1",
        BASE_URL, user
    )
}

/// extended 모드 형태의 트랙 레코드 하나.
pub fn extended_track(name: &str, artist: &str, image: &str, now_playing: bool) -> Value {
    let mut track = json!({
        "name": name,
        "artist": {"name": artist, "url": format!("https://www.last.fm/music/{}", artist)},
        "url": format!("https://www.last.fm/music/{}/_/{}", artist, name),
        "image": [
            {"size": "small", "#text": ""},
            {"size": "medium", "#text": ""},
            {"size": "large", "#text": ""},
            {"size": "extralarge", "#text": image}
        ]
    });
    if now_playing {
        track["@attr"] = json!({"nowplaying": "true"});
    }
    track
}

pub fn recent_tracks(tracks: Vec<Value>) -> Value {
    json!({"recenttracks": {"track": tracks, "@attr": {"user": "alice", "total": "1"}}})
}
