use crate::core::artwork::detect_mime_type_base64;
use crate::models::TrackStatus;

/// HTML 텍스트/속성 값에 쓸 수 있도록 특수 문자를 이스케이프한다.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// 썸네일을 `data:` URI로 만든다.
pub fn thumbnail_data_uri(encoded: &str) -> String {
    format!("data:{};base64,{}", detect_mime_type_base64(encoded), encoded)
}

/// `http`/`https` URL만 링크로 쓴다.
fn is_web_link(url: &str) -> bool {
    reqwest::Url::parse(url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

/// 트랙 상태 카드 HTML. `None`이면 재생 정보 없음 카드를 그린다.
pub fn render_card(status: Option<&TrackStatus>) -> String {
    let body = match status {
        Some(track) => {
            let image = match &track.thumbnail_base64 {
                Some(encoded) => format!(
                    r#"<img class="art" src="{}" alt="album art">"#,
                    thumbnail_data_uri(encoded)
                ),
                None => r#"<div class="art empty"></div>"#.to_string(),
            };
            let badge = if track.is_playing {
                r#"<span class="badge playing">Now playing</span>"#
            } else {
                r#"<span class="badge">Last played</span>"#
            };
            let song = if is_web_link(&track.track_url) {
                format!(
                    r#"<a class="song" href="{}">{}</a>"#,
                    escape_html(&track.track_url),
                    escape_html(&track.song)
                )
            } else {
                format!(r#"<span class="song">{}</span>"#, escape_html(&track.song))
            };
            format!(
                r#"<div class="card">{image}<div class="info">{badge}{song}<div class="artist">{artist}</div></div></div>"#,
                image = image,
                badge = badge,
                song = song,
                artist = escape_html(&track.artist),
            )
        }
        None => r#"<div class="card idle"><div class="info"><span class="badge">Nothing playing</span></div></div>"#
            .to_string(),
    };

    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>pastfm</title><style>{}</style></head><body>{}</body></html>\n",
        STYLE, body
    )
}

const STYLE: &str = "body{margin:0;font-family:sans-serif;background:transparent}\
.card{display:flex;gap:12px;align-items:center;padding:12px;border-radius:8px;background:#1e1e1e;color:#eee;max-width:420px}\
.art{width:64px;height:64px;border-radius:4px;object-fit:cover;background:#333}\
.badge{display:block;font-size:11px;text-transform:uppercase;color:#999}\
.badge.playing{color:#d51007}\
.song{display:block;color:#fff;font-weight:bold;text-decoration:none}\
.artist{color:#bbb}";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artwork::encode;
    use crate::test_utils::PLACEHOLDER_GIF;

    fn status() -> TrackStatus {
        TrackStatus {
            song: "Rock & Roll <Suicide>".to_string(),
            artist: "David \"Ziggy\" Bowie".to_string(),
            thumbnail_base64: Some(encode(PLACEHOLDER_GIF)),
            track_url: "https://www.last.fm/music/a?b=1&c=2".to_string(),
            is_playing: true,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href='x'>&</a>"), "&lt;a href=&#39;x&#39;&gt;&amp;&lt;/a&gt;");
        assert_eq!(escape_html("아이유"), "아이유");
    }

    #[test]
    fn test_card_escapes_fields() {
        let html = render_card(Some(&status()));
        assert!(html.contains("Rock &amp; Roll &lt;Suicide&gt;"));
        assert!(html.contains("David &quot;Ziggy&quot; Bowie"));
        assert!(html.contains("href=\"https://www.last.fm/music/a?b=1&amp;c=2\""));
        assert!(html.contains("Now playing"));
    }

    #[test]
    fn test_card_links_only_web_urls() {
        for url in [
            "javascript:alert(1)",
            " JavaScript:alert(1)",
            "data:text/html,<script>alert(1)</script>",
            "//evil.example/x",
            "",
        ] {
            let mut track = status();
            track.track_url = url.to_string();
            let html = render_card(Some(&track));
            assert!(!html.contains("href="), "{url}");
            assert!(html.contains(r#"<span class="song">Rock &amp; Roll &lt;Suicide&gt;</span>"#));
        }

        let mut track = status();
        track.track_url = "http://www.last.fm/music/x".to_string();
        assert!(render_card(Some(&track)).contains(r#"href="http://www.last.fm/music/x""#));
    }

    #[test]
    fn test_card_inlines_thumbnail() {
        let html = render_card(Some(&status()));
        assert!(html.contains(&format!("src=\"data:image/gif;base64,{}\"", encode(PLACEHOLDER_GIF))));
    }

    #[test]
    fn test_card_without_thumbnail() {
        let mut track = status();
        track.thumbnail_base64 = None;
        track.is_playing = false;
        let html = render_card(Some(&track));
        assert!(!html.contains("<img"));
        assert!(html.contains("art empty"));
        assert!(html.contains("Last played"));
    }

    #[test]
    fn test_idle_card() {
        let html = render_card(None);
        assert!(html.contains("Nothing playing"));
        assert!(!html.contains("<img"));
    }
}
