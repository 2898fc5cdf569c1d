//! HTML rendering of the catalog.
//!
//! Both the live page and the static site render through here. The pages
//! only read the catalog and the registry.

use chrono::{DateTime, Utc};

use crate::catalog::{Catalog, CatalogError, VideoRecord};
use crate::registry::ChannelRegistry;

/// Videos listed per channel card.
pub const VIDEOS_PER_CARD: usize = 5;

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0 auto;max-width:1200px;padding:1rem;color:#222}\
.stats{display:flex;gap:2rem;margin:1rem 0}.stat-number{font-size:1.5rem;font-weight:bold;display:block}\
.channels-grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(280px,1fr));gap:1rem}\
.channel-card{border:1px solid #ddd;border-radius:6px;padding:1rem}.channel-url,.video-meta,.more{color:#666;font-size:.85rem}\
.video-item{padding:.4rem 0;border-top:1px solid #eee}pre{background:#f6f8fa;padding:1rem;overflow:auto}";

/// Compact view count: `1.2M`, `15K`, `999`.
pub fn format_views(views: u64) -> String {
    if views >= 1_000_000 {
        format!("{:.1}M", views as f64 / 1_000_000.0)
    } else if views >= 1_000 {
        format!("{:.0}K", views as f64 / 1_000.0)
    } else {
        views.to_string()
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// Shorten `https://www.youtube.com/@name` to `@name`.
pub fn short_handle(reference: &str) -> &str {
    reference
        .strip_prefix("https://www.youtube.com/")
        .filter(|rest| rest.starts_with('@'))
        .unwrap_or(reference)
}

fn category_label(category: &str) -> String {
    match category {
        "ingles" => "English".to_string(),
        "espanol" => "Español".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title)
    )
}

fn render_video(video: &VideoRecord) -> String {
    let title = if video.title.is_empty() {
        "Untitled"
    } else {
        video.title.as_str()
    };
    let views = video
        .view_count
        .map(|v| format!("{} views", format_views(v)))
        .unwrap_or_default();
    let uploaded = video.upload_date.as_deref().unwrap_or("N/A");

    format!(
        "<div class=\"video-item\"><a href=\"{}\">{}</a>\
<div class=\"video-meta\"><span>{}</span> <span>{}</span></div></div>\n",
        escape_html(&video.url),
        escape_html(title),
        views,
        escape_html(uploaded)
    )
}

fn render_channel(name: &str, reference: &str, videos: &[VideoRecord]) -> String {
    let mut card = format!(
        "<div class=\"channel-card\">\n<div class=\"channel-name\"><strong>{}</strong></div>\n\
<div class=\"channel-url\"><a href=\"{}\">{}</a></div>\n<div class=\"videos-info\">{} recent videos</div>\n",
        escape_html(name),
        escape_html(reference),
        escape_html(short_handle(reference)),
        videos.len()
    );

    for video in videos.iter().take(VIDEOS_PER_CARD) {
        card.push_str(&render_video(video));
    }
    if videos.len() > VIDEOS_PER_CARD {
        card.push_str(&format!(
            "<div class=\"more\">and {} more videos</div>\n",
            videos.len() - VIDEOS_PER_CARD
        ));
    }

    card.push_str("</div>\n");
    card
}

/// Render the catalog overview page.
///
/// Sections and cards follow the registry; catalog entries for channels
/// that are not registered are not shown. Empty categories are skipped.
pub fn render_index(
    catalog: &Catalog,
    registry: &ChannelRegistry,
    generated_at: DateTime<Utc>,
) -> String {
    let stats = catalog.stats();
    let mut body = format!(
        "<h1>Board game videos</h1>\n<p>Last update: {}</p>\n<div class=\"stats\">\n\
<div><span class=\"stat-number\">{}</span>channels</div>\n\
<div><span class=\"stat-number\">{}</span>recent videos</div>\n",
        generated_at.format("%d/%m/%Y %H:%M"),
        registry.channel_count(),
        stats.videos
    );
    for category in registry.categories() {
        let count = registry.channels(category).map_or(0, |c| c.len());
        body.push_str(&format!(
            "<div><span class=\"stat-number\">{count}</span>{} channels</div>\n",
            escape_html(&category_label(category))
        ));
    }
    body.push_str("</div>\n<main>\n");

    for category in registry.categories() {
        let Some(channels) = registry.channels(category).filter(|c| !c.is_empty()) else {
            continue;
        };

        body.push_str(&format!(
            "<section class=\"language-section\">\n<h2>{} channels</h2>\n<div class=\"channels-grid\">\n",
            escape_html(&category_label(category))
        ));
        for (name, reference) in channels {
            let videos = catalog.channel(category, name).unwrap_or_default();
            body.push_str(&render_channel(name, reference, videos));
        }
        body.push_str("</div>\n</section>\n");
    }

    body.push_str(
        "</main>\n<footer><a href=\"data.html\">Raw data</a> | <a href=\"videos.json\">videos.json</a></footer>\n",
    );
    page("Board game videos", &body)
}

/// Render the raw catalog document as a page.
pub fn render_data_page(catalog: &Catalog) -> Result<String, CatalogError> {
    let json = serde_json::to_string_pretty(catalog)?;
    let body = format!(
        "<h1>Catalog data</h1>\n<p><a href=\"index.html\">Back</a> | <a href=\"videos.json\">Download</a></p>\n<pre>{}</pre>\n",
        escape_html(&json)
    );
    Ok(page("Catalog data", &body))
}
