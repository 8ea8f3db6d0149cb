use std::path::Path;

use base64::Engine;

use crate::error::ResolveError;
use crate::sources::{redact_api_key, HttpSource};

pub fn encode(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}

/// 로컬 플레이스홀더 이미지를 읽어 base64로 인코딩한다.
/// 파일이 없거나 비어 있으면 배포 결함이므로 `AssetUnavailable`을 반환한다.
pub fn load_placeholder(path: &Path) -> Result<String, ResolveError> {
    let data = std::fs::read(path).map_err(|source| ResolveError::AssetUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    if data.is_empty() {
        return Err(ResolveError::AssetUnavailable {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "빈 파일입니다"),
        });
    }

    Ok(encode(&data))
}

/// 원격 이미지를 내려받아 base64로 인코딩한다.
pub fn fetch_remote<H: HttpSource>(http: &H, url: &str) -> Result<String, ResolveError> {
    let data = http.get(url)?;
    if data.is_empty() {
        return Err(ResolveError::EmptyBody {
            url: redact_api_key(url),
        });
    }
    Ok(encode(&data))
}

/// 트랙 썸네일을 만든다.
///
/// - URL이 비어 있으면 플레이스홀더 이미지를 쓴다.
/// - 원격 이미지를 가져오지 못하면 `None` (플레이스홀더로 대체하지 않는다).
/// - 플레이스홀더를 읽지 못하면 배포 결함으로 error 로그를 남기고 `None`.
pub fn thumbnail_base64<H: HttpSource>(http: &H, url: &str, placeholder: &Path) -> Option<String> {
    if url.is_empty() {
        return match load_placeholder(placeholder) {
            Ok(encoded) => Some(encoded),
            Err(e) => {
                log::error!("배포 오류: 플레이스홀더 이미지가 없습니다. {}", e);
                None
            }
        };
    }

    match fetch_remote(http, url) {
        Ok(encoded) => Some(encoded),
        Err(e) => {
            log::warn!("앨범 아트를 가져오지 못했습니다: {}", e);
            None
        }
    }
}

/// 이미지 바이너리의 매직 바이트로 MIME 타입을 판별한다.
pub fn detect_mime_type(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "image/png"
    } else if data.starts_with(b"GIF8") {
        "image/gif"
    } else if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

/// base64 문자열의 앞부분만 디코딩하여 MIME 타입을 판별한다.
pub fn detect_mime_type_base64(encoded: &str) -> &'static str {
    // 16글자 = 12바이트, 매직 바이트 판별에 충분하다
    let prefix = encoded.get(..16).unwrap_or(encoded);
    match base64::engine::general_purpose::STANDARD.decode(prefix) {
        Ok(head) => detect_mime_type(&head),
        Err(_) => "image/jpeg",
    }
}
