// src/services/feed.rs

//! RSS 2.0 feed rendering for the catalog.

use chrono::{DateTime, Utc};

use crate::models::{FeedConfig, NormalizedBook};
use crate::utils::text::xml_escape;

const GENERATOR: &str = concat!("shinsho-finder ", env!("CARGO_PKG_VERSION"));

/// Most recently discovered books first, truncated to `max_items`.
pub fn latest_books(books: &[NormalizedBook], max_items: usize) -> Vec<&NormalizedBook> {
    let mut sorted: Vec<&NormalizedBook> = books.iter().collect();
    sorted.sort_by(|a, b| b.discovered_at.cmp(&a.discovered_at));
    sorted.truncate(max_items);
    sorted
}

/// Render the catalog as an RSS 2.0 document.
pub fn render_feed(books: &[NormalizedBook], config: &FeedConfig, now: DateTime<Utc>) -> String {
    let items = latest_books(books, config.max_items);

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<rss version=\"2.0\" xmlns:atom=\"http://www.w3.org/2005/Atom\">\n");
    out.push_str("  <channel>\n");
    push_element(&mut out, 4, "title", &config.title);
    push_element(&mut out, 4, "link", &config.site_url);
    push_element(&mut out, 4, "description", &config.description);
    out.push_str(&format!(
        "    <atom:link href=\"{}\" rel=\"self\" type=\"application/rss+xml\"/>\n",
        xml_escape(&config.feed_url)
    ));
    push_element(&mut out, 4, "language", &config.language);
    push_element(&mut out, 4, "generator", GENERATOR);
    push_element(&mut out, 4, "lastBuildDate", &now.to_rfc2822());
    push_element(&mut out, 4, "pubDate", &now.to_rfc2822());
    push_element(&mut out, 4, "ttl", &config.ttl_minutes.to_string());

    for book in items {
        render_item(&mut out, book);
    }

    out.push_str("  </channel>\n");
    out.push_str("</rss>\n");
    out
}

fn render_item(out: &mut String, book: &NormalizedBook) {
    out.push_str("    <item>\n");
    push_element(out, 6, "title", &book.title);
    push_element(out, 6, "description", &item_description(book));
    push_element(out, 6, "link", &book.marketplace_url(None));
    out.push_str(&format!(
        "      <guid isPermaLink=\"false\">{}</guid>\n",
        xml_escape(&book.isbn13)
    ));
    push_element(out, 6, "pubDate", &book.discovered_at.to_rfc2822());
    push_element(out, 6, "isbn", &book.isbn13);
    push_element(out, 6, "isbn10", &book.isbn10);
    push_element(out, 6, "series", &book.series);
    push_element(out, 6, "author", &book.author);
    push_element(out, 6, "publisher", &book.publisher);
    out.push_str("    </item>\n");
}

/// HTML body of an item. Values are escaped here; the whole fragment is
/// escaped again when written into the XML document.
fn item_description(book: &NormalizedBook) -> String {
    let mut html = String::new();

    if !book.cover_image_url.is_empty() {
        html.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\" style=\"max-width: 200px; float: left; margin-right: 15px;\"/>\n\n",
            xml_escape(&book.cover_image_url),
            xml_escape(&book.title)
        ));
    }

    let fields = [
        ("著者", &book.author),
        ("出版社", &book.publisher),
        ("シリーズ", &book.series),
        ("ISBN", &book.isbn13),
        ("発売日", &book.published_date),
    ];
    for (label, value) in fields {
        html.push_str(&format!(
            "<p><strong>{label}:</strong> {}</p>\n",
            xml_escape(value)
        ));
    }

    if !book.page_count.is_empty() {
        html.push_str(&format!(
            "<p><strong>ページ数:</strong> {}ページ</p>\n",
            xml_escape(&book.page_count)
        ));
    }
    if !book.description.is_empty() {
        html.push_str(&format!(
            "<h4>内容紹介</h4>\n<p>{}</p>\n",
            xml_escape(&book.description)
        ));
    }
    if !book.table_of_contents.is_empty() {
        html.push_str(&format!(
            "<h4>目次</h4>\n<pre>{}</pre>\n",
            xml_escape(&book.table_of_contents)
        ));
    }
    if !book.author_bio.is_empty() {
        html.push_str(&format!(
            "<h4>著者略歴</h4>\n<p>{}</p>\n",
            xml_escape(&book.author_bio)
        ));
    }

    html.push_str("<div style=\"clear: both;\"></div>");
    html
}

fn push_element(out: &mut String, indent: usize, name: &str, value: &str) {
    out.push_str(&format!(
        "{:indent$}<{name}>{}</{name}>\n",
        "",
        xml_escape(value)
    ));
}
