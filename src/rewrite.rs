use std::sync::LazyLock;

use clap::ValueEnum;
use regex::{NoExpand, Regex};
use tracing::{debug, warn};

use crate::config::Settings;
use crate::parser::ListingRecord;
use crate::render::{escape_html, metadata_comment};

static OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<article\b[^>]*\bid="property-(\d+)"[^>]*>"#).unwrap());
static METADATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\s*<!--\s*RAG_METADATA:.*?-->").unwrap());
static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)\s*(?:<div[^>]*class="property-ref"[^>]*>.*?</div>|<p>\s*<strong>Referencia:</strong>.*?</p>)"#,
    )
    .unwrap()
});
static CTA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"(?s)<a\b[^>]*(?:class="property-url"|href="#")[^>]*>.*?</a>"##).unwrap()
});

const CLOSE_TAG: &str = "</article>";

/// What to do with each listing's call-to-action link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CtaMode {
    /// Point the link at the listing's canonical URL.
    Canonical,
    /// Replace the link with a placeholder carrying the location.
    Location,
    /// Leave the link alone.
    Keep,
}

#[derive(Debug, Clone, Copy)]
pub struct RewriteOptions {
    pub cta: CtaMode,
    pub strip_reference: bool,
    pub inject_metadata: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RewriteReport {
    pub rewritten: usize,
    pub skipped: usize,
}

/// Apply the enabled edits inside each record's own container.
///
/// Markup outside the containers is preserved byte for byte. Containers that
/// are missing or whose id appears more than once are skipped.
pub fn rewrite_document(
    html: &str,
    records: &[ListingRecord],
    opts: &RewriteOptions,
    settings: &Settings,
) -> (String, RewriteReport) {
    let mut doc = html.to_string();
    let mut report = RewriteReport::default();

    for record in records {
        let Some(range) = locate_container(&doc, &record.id) else {
            warn!("Container for listing {} not found or ambiguous, skipping", record.id);
            report.skipped += 1;
            continue;
        };
        let rewritten = rewrite_container(&doc[range.clone()], record, opts, settings);
        doc.replace_range(range, &rewritten);
        report.rewritten += 1;
        debug!("Rewrote listing {} ({})", record.id, record.slug);
    }

    (doc, report)
}

/// Byte range from the container's opening tag through its `</article>`.
fn locate_container(doc: &str, id: &str) -> Option<std::ops::Range<usize>> {
    let mut opens = OPEN_RE
        .captures_iter(doc)
        .filter(|c| &c[1] == id)
        .filter_map(|c| c.get(0));
    let open = opens.next()?;
    if opens.next().is_some() {
        return None;
    }
    let end = doc[open.end()..].find(CLOSE_TAG)? + open.end() + CLOSE_TAG.len();
    Some(open.start()..end)
}

fn rewrite_container(
    region: &str,
    record: &ListingRecord,
    opts: &RewriteOptions,
    settings: &Settings,
) -> String {
    let mut out = METADATA_RE.replace_all(region, "").into_owned();

    if opts.strip_reference {
        out = REFERENCE_RE.replace_all(&out, "").into_owned();
    }

    if let Some(link) = call_to_action(record, opts.cta) {
        out = CTA_RE.replacen(&out, 1, NoExpand(&link)).into_owned();
    }

    if opts.inject_metadata {
        let at = out
            .find("</h2>")
            .map(|i| i + "</h2>".len())
            .or_else(|| out.find('>').map(|i| i + 1))
            .unwrap_or(0);
        out.insert_str(at, &format!("\n\n        {}", metadata_comment(record, settings)));
    }

    out
}

fn call_to_action(record: &ListingRecord, mode: CtaMode) -> Option<String> {
    match mode {
        CtaMode::Keep => None,
        CtaMode::Canonical => Some(format!(
            "<a href=\"{}\" class=\"property-url\" target=\"_blank\">Ver Detalles Completos →</a>",
            escape_html(&record.original_url)
        )),
        CtaMode::Location if record.location.is_empty() => None,
        CtaMode::Location => {
            let location = escape_html(&record.location);
            Some(format!(
                "<a href=\"#\" class=\"property-url\" data-location=\"{}\">📍 {}</a>",
                location, location
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::process_document;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    fn run(html: &str, opts: &RewriteOptions) -> (String, RewriteReport) {
        let settings = Settings::default();
        let records = process_document(html, &settings.listing_url_template);
        rewrite_document(html, &records, opts, &settings)
    }

    fn all_options() -> Vec<RewriteOptions> {
        let mut out = Vec::new();
        for cta in [CtaMode::Canonical, CtaMode::Location, CtaMode::Keep] {
            for strip_reference in [true, false] {
                for inject_metadata in [true, false] {
                    out.push(RewriteOptions { cta, strip_reference, inject_metadata });
                }
            }
        }
        out
    }

    #[test]
    fn idempotent_on_catalog() {
        let html = fixture("catalog");
        for opts in all_options() {
            let (once, _) = run(&html, &opts);
            let (twice, _) = run(&once, &opts);
            assert_eq!(once, twice, "not idempotent with {:?}", opts);
        }
    }

    #[test]
    fn canonical_links_and_cleanup() {
        let opts = RewriteOptions { cta: CtaMode::Canonical, strip_reference: true, inject_metadata: false };
        let (out, report) = run(&fixture("catalog"), &opts);

        assert_eq!(report, RewriteReport { rewritten: 4, skipped: 0 });
        assert!(out.contains(
            r#"<a href="https://www.vivla.com/es/listings/casa-colonial-merida" class="property-url" target="_blank">"#
        ));
        assert!(out.contains(r#"<a href="https://www.vivla.com/es/listings/villa-progreso""#));
        // no reference and no listing link: falls back to the title slug
        assert!(out.contains(r#"<a href="https://www.vivla.com/es/listings/departamento-en-chicxulub-puerto""#));
        assert!(!out.contains("Referencia:"));
        assert!(!out.contains("property-ref"));
        assert!(!out.contains("RAG_METADATA"));
        assert!(!out.contains("casa-colonial-en-merida-centro\""));
    }

    #[test]
    fn source_link_survives_reference_removal() {
        let opts = RewriteOptions { cta: CtaMode::Canonical, strip_reference: true, inject_metadata: false };
        let (once, _) = run(&fixture("catalog"), &opts);
        let (twice, _) = run(&once, &opts);
        for slug in ["casa-colonial-merida", "villa-progreso", "terreno-sisal"] {
            let link = format!("href=\"https://www.vivla.com/es/listings/{}\"", slug);
            assert_eq!(twice.matches(&link).count(), 1, "{}", slug);
        }
    }

    #[test]
    fn location_placeholder() {
        let opts = RewriteOptions { cta: CtaMode::Location, strip_reference: false, inject_metadata: false };
        let (out, _) = run(&fixture("catalog"), &opts);

        assert!(out.contains(
            r##"<a href="#" class="property-url" data-location="Centro Histórico de Mérida">📍 Centro Histórico de Mérida</a>"##
        ));
        assert!(out.contains(r#"data-location="Sisal""#));
        // listing 3 has no location; its link is untouched
        assert!(out.contains(r##"<a href="#" class="property-url">Ver Detalles Completos →</a>"##));
        assert!(out.contains("Referencia:"));
    }

    #[test]
    fn metadata_injected_once_per_listing() {
        let opts = RewriteOptions { cta: CtaMode::Keep, strip_reference: false, inject_metadata: true };
        let (once, _) = run(&fixture("catalog"), &opts);
        let (twice, _) = run(&once, &opts);
        assert_eq!(twice.matches("RAG_METADATA").count(), 4);
        assert!(twice.contains(r#"title="Departamento en Chicxulub Puerto""#));
        assert!(!twice.contains("Borrador"));
    }

    #[test]
    fn markup_outside_containers_untouched() {
        let html = fixture("catalog");
        let opts = RewriteOptions { cta: CtaMode::Canonical, strip_reference: true, inject_metadata: true };
        let (out, _) = run(&html, &opts);

        let head = |s: &str| s[..s.find("<article").unwrap()].to_string();
        let tail = |s: &str| s[s.rfind("</article>").unwrap()..].to_string();
        assert_eq!(head(&out), head(&html));
        assert_eq!(tail(&out), tail(&html));
        assert_eq!(out.matches("\n    <hr>\n").count(), html.matches("\n    <hr>\n").count());
    }

    #[test]
    fn duplicate_and_missing_containers_skipped() {
        let html = r##"<article class="property" id="property-1"><h2>A</h2><a href="#" class="property-url">x</a></article>
<article class="property" id="property-1"><h2>B</h2><a href="#" class="property-url">y</a></article>"##;
        let records = vec![
            ListingRecord { id: "1".into(), original_url: "https://e.com/a".into(), ..Default::default() },
            ListingRecord { id: "99".into(), ..Default::default() },
        ];
        let opts = RewriteOptions { cta: CtaMode::Canonical, strip_reference: true, inject_metadata: true };
        let (out, report) = rewrite_document(html, &records, &opts, &Settings::default());
        assert_eq!(out, html);
        assert_eq!(report, RewriteReport { rewritten: 0, skipped: 2 });
    }

    #[test]
    fn replacement_text_is_literal() {
        let html = r##"<article class="property" id="property-1"><h2>A</h2><a href="#" class="property-url">x</a></article>"##;
        let records = vec![ListingRecord {
            id: "1".into(),
            location: "Lote $1 y $2".into(),
            ..Default::default()
        }];
        let opts = RewriteOptions { cta: CtaMode::Location, strip_reference: false, inject_metadata: false };
        let (out, _) = rewrite_document(html, &records, &opts, &Settings::default());
        assert!(out.contains(r#"data-location="Lote $1 y $2""#));
    }
}
