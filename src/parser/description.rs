use std::sync::LazyLock;

use regex::Regex;

pub const HIGHLIGHT_MARKER: &str = "¿Qué lo hace único?:";
pub const LOCATION_MARKER: &str = "Ubicación:";

static HIGHLIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"¿Qué (?:lo|la) hace únic[oa]\?:?").unwrap());
static LOCATION_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Ubicación:").unwrap());
static LOCATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Ubicación:\s*([^.]*)\.").unwrap());

/// A description split at its highlight and location markers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptionSections {
    pub narrative: String,
    pub highlight: String,
    pub location: String,
}

/// Split `description` into narrative / highlight / location.
///
/// Text before the first marker is the narrative. The highlight runs up to
/// the location marker if one follows it.
pub fn split(description: &str) -> DescriptionSections {
    let highlight = HIGHLIGHT_RE.find(description);
    let location = LOCATION_MARKER_RE
        .find_iter(description)
        .find(|m| highlight.map_or(true, |h| m.start() >= h.end()));

    let narrative_end = match (highlight, location) {
        (Some(h), _) => h.start(),
        (None, Some(l)) => l.start(),
        (None, None) => description.len(),
    };

    let highlight_text = highlight.map(|h| {
        let end = location.map_or(description.len(), |l| l.start());
        description[h.end()..end].trim().to_string()
    });
    let location_text = location.map(|l| description[l.end()..].trim().to_string());

    DescriptionSections {
        narrative: description[..narrative_end].trim().to_string(),
        highlight: highlight_text.unwrap_or_default(),
        location: location_text.unwrap_or_default(),
    }
}

/// Text following `Ubicación:` up to the first sentence terminator.
/// Empty when no terminator follows the marker.
pub fn location(description: &str) -> String {
    LOCATION_RE
        .captures(description)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default()
}

/// Inverse of `split`: re-attach the sections behind their canonical markers.
pub fn join(narrative: &str, highlight: &str, location: &str) -> String {
    let mut parts = Vec::new();
    if !narrative.is_empty() {
        parts.push(narrative.to_string());
    }
    if !highlight.is_empty() {
        parts.push(format!("{} {}", HIGHLIGHT_MARKER, highlight));
    }
    if !location.is_empty() {
        parts.push(format!("{} {}", LOCATION_MARKER, location));
    }
    parts.join(" ")
}
