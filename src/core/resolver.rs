use std::path::{Path, PathBuf};

use crate::core::artwork;
use crate::error::ResolveError;
use crate::models::{TrackQuery, TrackStatus};
use crate::sources::lastfm::{self, RawTrackRecord};
use crate::sources::{redact_api_key, HttpSource};

/// 사용자의 현재(또는 마지막) 재생 트랙을 조회해 `TrackStatus`로 정규화한다.
///
/// 호출 사이에 상태를 남기지 않으며, 매번 원격 API를 다시 호출한다.
/// 한 번의 조회에 최대 두 번(트랙 조회, 앨범 아트) 순차적으로 요청한다.
pub struct TrackStatusResolver<H> {
    http: H,
    placeholder_path: PathBuf,
}

impl<H: HttpSource> TrackStatusResolver<H> {
    pub fn new(http: H, placeholder_path: impl Into<PathBuf>) -> Self {
        Self {
            http,
            placeholder_path: placeholder_path.into(),
        }
    }

    pub fn placeholder_path(&self) -> &Path {
        &self.placeholder_path
    }

    /// 플레이스홀더 이미지를 읽을 수 있는지 확인한다. 서버 시작 시 배포 점검용.
    pub fn check_placeholder(&self) -> Result<(), ResolveError> {
        artwork::load_placeholder(&self.placeholder_path).map(|_| ())
    }

    /// 트랙 상태를 조회한다. 실패하면 error 로그를 남기고 `None`을 반환한다.
    pub fn resolve_current_track(&self, query: &TrackQuery) -> Option<TrackStatus> {
        match self.try_resolve(query) {
            Ok(status) => Some(status),
            Err(ResolveError::EmptyResult) => {
                log::error!("API 응답에 트랙이 없습니다 (user={})", query.username);
                None
            }
            Err(e) if e.is_transport() => {
                log::error!("Last.fm 요청에 실패했습니다 (user={}): {}", query.username, e);
                None
            }
            Err(e) => {
                log::error!("트랙 정보를 처리하지 못했습니다 (user={}): {}", query.username, e);
                None
            }
        }
    }

    /// 트랙 상태를 조회한다. 실패 종류를 그대로 돌려준다.
    /// 앨범 아트 실패는 조회 실패로 보지 않고 썸네일만 비운다.
    pub fn try_resolve(&self, query: &TrackQuery) -> Result<TrackStatus, ResolveError> {
        let url = lastfm::build_recent_tracks_url(query, true)?;
        log::info!("Last.fm 조회: {}", redact_api_key(&url));

        let body = self.http.get(&url)?;
        log::debug!("Last.fm 응답: {}", String::from_utf8_lossy(&body));

        let track = lastfm::parse_current_track(&body)?;

        Ok(self.normalize(&track))
    }

    fn normalize(&self, track: &RawTrackRecord) -> TrackStatus {
        let image_url = track.image_url();
        if let Some(size) = track.selected_image().and_then(|img| img.size.as_deref()) {
            log::debug!("앨범 아트 선택: {} ({})", image_url, size);
        }

        TrackStatus {
            song: track.song(),
            artist: track.artist_name(),
            thumbnail_base64: artwork::thumbnail_base64(
                &self.http,
                &image_url,
                &self.placeholder_path,
            ),
            track_url: track.track_url(),
            is_playing: track.is_now_playing(),
        }
    }
}
