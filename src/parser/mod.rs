pub mod articles;
pub mod description;
pub mod record;
pub mod slug;
pub mod specs;

pub use record::ListingRecord;

/// HTML document → listing records, in document order.
pub fn process_document(html: &str, url_template: &str) -> Vec<ListingRecord> {
    articles::extract_articles(html)
        .into_iter()
        .map(|raw| record::assemble(raw, url_template))
        .collect()
}

// ── Tests ──
