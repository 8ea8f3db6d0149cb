pub mod http;
pub mod lastfm;

use crate::error::ResolveError;

/// 원격 자원을 바이트로 가져오는 HTTP 소스 트레이트.
/// 실제 구현은 reqwest 블로킹 클라이언트이며, 테스트에서는 가짜 구현을 주입한다.
pub trait HttpSource {
    /// URL에 GET 요청을 보내 2xx 응답 본문을 반환한다.
    /// 전송 실패나 2xx가 아닌 응답은 오류로 반환한다.
    fn get(&self, url: &str) -> Result<Vec<u8>, ResolveError>;
}

impl<T: HttpSource + ?Sized> HttpSource for &T {
    fn get(&self, url: &str) -> Result<Vec<u8>, ResolveError> {
        (**self).get(url)
    }
}

/// 로그와 오류 메시지에 API 키가 남지 않도록 `api_key` 쿼리 값을 가린다.
pub fn redact_api_key(url: &str) -> String {
    let Some(start) = url.find("api_key=").map(|i| i + "api_key=".len()) else {
        return url.to_string();
    };
    let end = url[start..].find('&').map_or(url.len(), |i| start + i);
    format!("{}***{}", &url[..start], &url[end..])
}
