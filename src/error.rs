use std::path::PathBuf;

use thiserror::Error;

/// 최근 재생 트랙 조회 과정에서 발생하는 오류.
///
/// `Transport`, `Status`, `Api`는 원격 호출 실패,
/// `MalformedResponse`와 `EmptyResult`는 응답 내용 문제,
/// `AssetUnavailable`은 배포 결함(플레이스홀더 이미지 누락)을 나타낸다.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("요청 URL을 만들 수 없습니다 ({base}): {reason}")]
    InvalidUrl { base: String, reason: String },

    #[error("HTTP 요청에 실패했습니다 ({url}): {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP {status} 응답을 받았습니다 ({url})")]
    Status { url: String, status: u16 },

    #[error("Last.fm API 오류 {code}: {message}")]
    Api { code: i64, message: String },

    #[error("응답 형식이 올바르지 않습니다: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("응답 본문이 비어 있습니다 ({url})")]
    EmptyBody { url: String },

    #[error("최근 재생 트랙이 없습니다")]
    EmptyResult,

    #[error("플레이스홀더 이미지를 읽을 수 없습니다 ({}): {source}", .path.display())]
    AssetUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResolveError {
    /// 원격 호출 자체가 실패한 경우인지 여부.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ResolveError::Transport { .. } | ResolveError::Status { .. } | ResolveError::Api { .. }
        )
    }
}
