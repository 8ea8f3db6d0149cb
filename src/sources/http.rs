use std::time::Duration;

use anyhow::{Context, Result};

use crate::error::ResolveError;
use crate::sources::{redact_api_key, HttpSource};

/// 원격 호출 하나당 허용하는 최대 시간.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("pastfm/", env!("CARGO_PKG_VERSION"));

/// reqwest 블로킹 클라이언트 기반 HTTP 소스.
/// 상태를 갖지 않으므로 여러 스레드에서 공유해도 된다.
pub struct BlockingHttp {
    client: reqwest::blocking::Client,
}

impl BlockingHttp {
    /// 새 클라이언트를 생성한다. 타임아웃과 User-Agent 헤더를 설정한다.
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("HTTP 클라이언트 생성에 실패했습니다")?;

        Ok(Self { client })
    }
}

impl HttpSource for BlockingHttp {
    fn get(&self, url: &str) -> Result<Vec<u8>, ResolveError> {
        let transport = |e: reqwest::Error| ResolveError::Transport {
            url: redact_api_key(url),
            source: Box::new(e.without_url()),
        };

        let resp = self.client.get(url).send().map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ResolveError::Status {
                url: redact_api_key(url),
                status: status.as_u16(),
            });
        }

        let bytes = resp.bytes().map_err(transport)?;
        Ok(bytes.to_vec())
    }
}
