use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::config::Config;
use crate::core::resolver::TrackStatusResolver;
use crate::core::widget;
use crate::models::TrackQuery;
use crate::sources::http::BlockingHttp;
use crate::sources::HttpSource;

const CLIENT_READ_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_HEADER_LINES: usize = 100;
const MAX_REQUEST_BYTES: u64 = 8 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    fn new(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self::new(status, "text/plain; charset=utf-8", body)
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            204 => "No Content",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "Internal Server Error",
        }
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        write!(out, "HTTP/1.1 {} {}\r\n", self.status, self.reason())?;
        if self.status != 204 {
            write!(out, "Content-Type: {}\r\n", self.content_type)?;
        }
        write!(out, "Content-Length: {}\r\n", self.body.len())?;
        write!(out, "Cache-Control: no-store\r\nConnection: close\r\n\r\n")?;
        out.write_all(&self.body)?;
        out.flush()
    }
}

/// 요청 대상(`/path?a=b`)을 경로와 디코딩된 쿼리 파라미터로 나눈다.
pub fn split_target(target: &str) -> (&str, HashMap<String, String>) {
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let params = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(k), decode_component(v))
        })
        .collect();
    (path, params)
}

fn decode_component(s: &str) -> String {
    let spaced = s.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// 위젯 HTTP 라우팅. 요청마다 새로 조회하며 결과를 캐시하지 않는다.
pub struct WidgetServer<H> {
    resolver: TrackStatusResolver<H>,
    config: Config,
}

impl<H: HttpSource> WidgetServer<H> {
    pub fn new(resolver: TrackStatusResolver<H>, config: Config) -> Self {
        Self { resolver, config }
    }

    pub fn route(&self, method: &str, target: &str) -> Response {
        if method != "GET" {
            return Response::text(405, "method not allowed");
        }

        let (path, params) = split_target(target);
        match path {
            "/health" => Response::text(200, "ok"),
            "/" | "/widget" => {
                let query = match self.query_for(&params) {
                    Ok(q) => q,
                    Err(e) => return Response::text(400, &format!("{:#}", e)),
                };
                let status = self.resolver.resolve_current_track(&query);
                Response::new(200, "text/html; charset=utf-8", widget::render_card(status.as_ref()))
            }
            "/api/now-playing" => {
                let query = match self.query_for(&params) {
                    Ok(q) => q,
                    Err(e) => return Response::text(400, &format!("{:#}", e)),
                };
                match self.resolver.resolve_current_track(&query) {
                    Some(status) => match serde_json::to_vec(&status) {
                        Ok(body) => Response::new(200, "application/json", body),
                        Err(e) => {
                            log::error!("응답 직렬화에 실패했습니다: {}", e);
                            Response::text(500, "internal error")
                        }
                    },
                    None => Response::new(204, "", Vec::new()),
                }
            }
            _ => Response::text(404, "not found"),
        }
    }

    fn query_for(&self, params: &HashMap<String, String>) -> Result<TrackQuery> {
        TrackQuery::from_config(&self.config, params.get("user").map(String::as_str))
    }

    /// 연결 하나를 처리한다. 요청 줄과 헤더만 읽고 본문은 무시한다.
    pub fn handle_connection(&self, stream: TcpStream) -> Result<()> {
        stream.set_read_timeout(Some(CLIENT_READ_TIMEOUT))?;

        let request_line = read_request_head(stream.try_clone()?)?;
        let mut parts = request_line.as_deref().unwrap_or_default().split_whitespace();
        let response = match (parts.next(), parts.next()) {
            (Some(method), Some(target)) => {
                log::debug!("{} {}", method, target);
                self.route(method, target)
            }
            _ => Response::text(400, "bad request"),
        };

        let mut stream = stream;
        response.write_to(&mut stream)?;
        Ok(())
    }
}

/// 요청 줄을 읽고 헤더는 버린다. 요청 머리는 `MAX_REQUEST_BYTES`를 넘을 수 없다.
/// 크기 제한에 걸리거나 줄이 끝나지 않았거나 헤더가 너무 많으면 `None`.
fn read_request_head<R: Read>(source: R) -> std::io::Result<Option<String>> {
    let mut reader = BufReader::new(source.take(MAX_REQUEST_BYTES));

    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    if !request_line.ends_with('\n') {
        return Ok(None);
    }

    for _ in 0..MAX_HEADER_LINES {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            // 헤더 끝 전에 연결이 닫혔어도 제한에 걸린 게 아니면 요청 줄은 유효하다
            let exhausted = reader.get_ref().limit() == 0;
            return Ok((!exhausted).then_some(request_line));
        }
        if !line.ends_with('\n') {
            return Ok(None);
        }
        if line.trim().is_empty() {
            return Ok(Some(request_line));
        }
    }

    Ok(None)
}

/// 위젯 서버를 띄운다. 연결마다 스레드 하나를 쓴다.
pub fn serve(config: Config, host: &str, port: u16) -> Result<()> {
    if !config.lastfm.is_configured() {
        bail!("Last.fm API 키가 설정되지 않았습니다. 먼저 'pastfm config'를 실행하세요");
    }

    let resolver = TrackStatusResolver::new(BlockingHttp::new()?, &config.placeholder_path);
    resolver
        .check_placeholder()
        .context("배포 오류: 플레이스홀더 이미지를 확인하세요")?;
    log::debug!("플레이스홀더: {}", resolver.placeholder_path().display());

    let listener = TcpListener::bind((host, port))
        .with_context(|| format!("{}:{}에 바인딩할 수 없습니다", host, port))?;
    log::info!("위젯 서버 시작: http://{}:{}/", host, port);

    let app = Arc::new(WidgetServer::new(resolver, config));
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let app = Arc::clone(&app);
                thread::spawn(move || {
                    if let Err(e) = app.handle_connection(stream) {
                        log::debug!("요청 처리 실패: {:#}", e);
                    }
                });
            }
            Err(e) => log::warn!("연결 수락 실패: {}", e),
        }
    }

    Ok(())
}
