use anyhow::Result;
use base64::Engine;
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};
use dialoguer::{Confirm, Input};

use crate::config::{self, Config};
use crate::core::artwork;
use crate::core::resolver::TrackStatusResolver;
use crate::models::{TrackQuery, TrackStatus};
use crate::server;
use crate::sources::http::BlockingHttp;

#[derive(Parser)]
#[command(name = "pastfm", about = "Last.fm 최근 재생 트랙 위젯")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 현재(또는 마지막) 재생 트랙 표시
    Now {
        /// 조회할 Last.fm 사용자 (기본: default_user 설정)
        #[arg(long)]
        user: Option<String>,
        /// JSON으로 출력
        #[arg(long)]
        json: bool,
    },
    /// 위젯 HTTP 서버 실행
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Last.fm 자격증명과 기본 사용자 설정
    Config,
}

pub fn run(cli: Cli, cfg: Config) -> Result<()> {
    match cli.command {
        Some(Commands::Now { user, json }) => cmd_now(&cfg, user.as_deref(), json),
        Some(Commands::Serve { host, port }) => {
            let host = host.unwrap_or_else(|| cfg.server.host.clone());
            let port = port.unwrap_or(cfg.server.port);
            server::serve(cfg, &host, port)
        }
        Some(Commands::Config) => cmd_config(cfg),
        None => {
            println!("사용법: pastfm <명령어>");
            println!("자세한 정보는 pastfm --help를 실행하세요.");
            Ok(())
        }
    }
}

fn cmd_now(cfg: &Config, user: Option<&str>, json: bool) -> Result<()> {
    let query = TrackQuery::from_config(cfg, user)?;
    let resolver = TrackStatusResolver::new(BlockingHttp::new()?, &cfg.placeholder_path);

    let status = resolver.resolve_current_track(&query);

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    match status {
        Some(track) => println!("{}", status_table(&track)),
        None => println!("{}: 재생 정보를 가져올 수 없습니다.", query.username),
    }
    Ok(())
}

fn status_table(track: &TrackStatus) -> Table {
    let thumbnail = match &track.thumbnail_base64 {
        Some(encoded) => match base64::engine::general_purpose::STANDARD.decode(encoded) {
            Ok(data) => format!("{}, {} bytes", artwork::detect_mime_type(&data), data.len()),
            Err(_) => format!("base64 {}자 (해석 불가)", encoded.len()),
        },
        None => "-".to_string(),
    };

    let mut table = Table::new();
    table.set_header(vec!["항목", "값"]);
    table.add_row(vec![Cell::new("상태"), Cell::new(track.summary())]);
    table.add_row(vec![Cell::new("제목"), Cell::new(track.display_song())]);
    table.add_row(vec![Cell::new("아티스트"), Cell::new(track.display_artist())]);
    table.add_row(vec![Cell::new("URL"), Cell::new(&track.track_url)]);
    table.add_row(vec![Cell::new("썸네일"), Cell::new(thumbnail)]);
    table
}

fn cmd_config(mut cfg: Config) -> Result<()> {
    println!("Last.fm API 설정");
    println!("(API 키는 https://www.last.fm/api/account/create 에서 발급받으세요)\n");

    let current_key = cfg.lastfm.api_key.clone().unwrap_or_default();
    let api_key: String = Input::new()
        .with_prompt("API Key")
        .with_initial_text(current_key)
        .interact_text()?;

    let default_user: String = Input::new()
        .with_prompt("기본 사용자")
        .with_initial_text(cfg.default_user.clone())
        .allow_empty(true)
        .interact_text()?;

    let base_url: String = Input::new()
        .with_prompt("API URL")
        .with_initial_text(cfg.lastfm.base_url.clone())
        .interact_text()?;

    let debug = Confirm::new()
        .with_prompt("디버그 로그를 켤까요?")
        .default(cfg.debug)
        .interact()?;

    cfg.lastfm.api_key = Some(api_key.trim().to_string());
    cfg.lastfm.base_url = base_url.trim().to_string();
    cfg.default_user = default_user.trim().to_string();
    cfg.debug = debug;

    config::save_config(&cfg)?;
    println!("\n설정이 저장되었습니다!");
    Ok(())
}
