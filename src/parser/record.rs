use serde::{Deserialize, Serialize};

use super::articles::RawArticle;
use super::description;
use super::slug::slugify_or;
use super::specs::{self, ParsedSpecs};

/// One normalized listing, as persisted in the JSON record set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingRecord {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub specs: Vec<String>,
    pub description: String,
    pub images: Vec<String>,
    pub location: String,
    pub original_url: String,
}

impl ListingRecord {
    pub fn parsed_specs(&self) -> ParsedSpecs {
        specs::parse(&self.specs)
    }

    pub fn sections(&self) -> description::DescriptionSections {
        description::split(&self.description)
    }
}

/// Default slug when the title yields nothing.
pub fn fallback_slug(id: &str) -> String {
    format!("property-{}", id)
}

/// Substitute `{slug}` into a URL template.
pub fn listing_url(template: &str, slug: &str) -> String {
    template.replace("{slug}", slug)
}

/// Inverse of `listing_url`: the slug a URL carries under `template`.
pub fn slug_from_url<'a>(template: &str, url: &'a str) -> Option<&'a str> {
    let (prefix, suffix) = template.split_once("{slug}")?;
    let slug = url.strip_prefix(prefix)?.strip_suffix(suffix)?;
    (!slug.is_empty() && !slug.contains(['/', '?', '#'])).then_some(slug)
}

/// Slug the source site knows the listing by. A `Referencia:` block wins
/// over an existing link to the listing URL.
fn source_slug<'a>(raw: &'a RawArticle, url_template: &str) -> Option<&'a str> {
    if !raw.reference.is_empty() {
        return Some(raw.reference.as_str());
    }
    raw.links
        .iter()
        .find_map(|href| slug_from_url(url_template, href))
}

/// Build the canonical record for one extracted article. Never fails.
pub fn assemble(raw: RawArticle, url_template: &str) -> ListingRecord {
    let slug = slugify_or(&raw.title, || fallback_slug(&raw.id));
    let location = description::location(&raw.description);
    let original_url = listing_url(
        url_template,
        source_slug(&raw, url_template).unwrap_or(&slug),
    );

    ListingRecord {
        specs: specs::tokenize(&raw.specs_line),
        id: raw.id,
        slug,
        title: raw.title,
        description: raw.description,
        images: raw.images,
        location,
        original_url,
    }
}
