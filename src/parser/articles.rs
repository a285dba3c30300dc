use std::sync::LazyLock;

use regex::Regex;

use super::description::{self, HIGHLIGHT_MARKER, LOCATION_MARKER};

static ARTICLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<article\b[^>]*\bid="property-(\d+)"[^>]*>(.*?)</article>"#).unwrap()
});
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<h2[^>]*>(.*?)</h2>").unwrap());
static SPECS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Especificaciones:\s*(?:</strong>)?\s*(?:<br\s*/?>)?(.*?)(?:<div|</div>)").unwrap()
});
static DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Descripción:\s*(?:</strong>)?\s*(?:<br\s*/?>)?(.*?)</div>").unwrap()
});
static HIGHLIGHT_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="property-unique"[^>]*>.*?<p>(.*?)</p>"#).unwrap()
});
static LOCATION_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="property-location"[^>]*>.*?<p>(.*?)</p>"#).unwrap()
});
static IMAGES_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div[^>]*class="property-images"[^>]*>(.*?)</div>"#).unwrap()
});
static IMG_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img\b[^>]*?\ssrc="([^"]+)""#).unwrap());
static REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Referencia:\s*</strong>\s*([\w-]+)").unwrap());
static LINK_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a\b[^>]*?\shref="([^"]+)""#).unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Fields pulled out of one listing container, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawArticle {
    pub id: String,
    pub title: String,
    pub specs_line: String,
    pub description: String,
    pub images: Vec<String>,
    /// Source site slug from a `Referencia:` block, empty when absent.
    pub reference: String,
    /// Anchor targets in the container, in document order.
    pub links: Vec<String>,
}

/// Find every listing container in document order and extract its fields.
///
/// Missing fields come back empty; a container is never dropped.
pub fn extract_articles(html: &str) -> Vec<RawArticle> {
    ARTICLE_RE
        .captures_iter(html)
        .map(|caps| extract_article(&caps[1], &caps[2]))
        .collect()
}

fn extract_article(id: &str, body: &str) -> RawArticle {
    let body = COMMENT_RE.replace_all(body, "");

    let title = TITLE_RE
        .captures(&body)
        .map(|c| clean_text(&c[1]))
        .unwrap_or_default();

    let specs_line = SPECS_RE
        .captures(&body)
        .map(|c| clean_text(&c[1]))
        .unwrap_or_default();

    RawArticle {
        id: id.to_string(),
        title,
        specs_line,
        description: extract_description(&body),
        images: extract_images(&body),
        reference: REFERENCE_RE
            .captures(&body)
            .map(|c| c[1].to_string())
            .unwrap_or_default(),
        links: LINK_HREF_RE
            .captures_iter(&body)
            .map(|c| decode_entities(&c[1]))
            .collect(),
    }
}

fn extract_description(body: &str) -> String {
    let mut text = DESCRIPTION_RE
        .captures(body)
        .map(|c| clean_text(&c[1]))
        .unwrap_or_default();

    // Catalogs rendered by this tool carry the highlight and location
    // sections in their own blocks.
    if !text.contains(HIGHLIGHT_MARKER) && !text.contains(LOCATION_MARKER) {
        let highlight = block_text(&HIGHLIGHT_BLOCK_RE, body);
        let location = block_text(&LOCATION_BLOCK_RE, body);
        if !highlight.is_empty() || !location.is_empty() {
            text = description::join(&text, &highlight, &location);
        }
    }
    text
}

fn block_text(re: &Regex, body: &str) -> String {
    re.captures(body)
        .map(|c| clean_text(&c[1]))
        .unwrap_or_default()
}

fn extract_images(body: &str) -> Vec<String> {
    let scope = IMAGES_BLOCK_RE
        .captures(body)
        .and_then(|c| c.get(1))
        .map_or(body, |m| m.as_str());

    IMG_SRC_RE
        .captures_iter(scope)
        .map(|c| decode_entities(&c[1]))
        .collect()
}

/// Strip tags, decode common entities, collapse whitespace.
pub fn clean_text(fragment: &str) -> String {
    let stripped = TAG_RE.replace_all(fragment, " ");
    let decoded = decode_entities(&stripped);
    WS_RE.replace_all(decoded.trim(), " ").to_string()
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
