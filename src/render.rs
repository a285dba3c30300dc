use chrono::{DateTime, SecondsFormat, Utc};
use clap::ValueEnum;

use crate::config::Settings;
use crate::parser::ListingRecord;

const STYLE: &str = r#"        body { font-family: Arial, sans-serif; line-height: 1.6; max-width: 1200px; margin: 0 auto; padding: 20px; }
        .property { margin-bottom: 40px; padding: 20px; border: 1px solid #ddd; border-radius: 8px; }
        .property h2 { color: #2c3e50; margin-top: 0; }
        .property-meta { color: #7f8c8d; font-size: 0.9em; margin-bottom: 10px; }
        .property-quick-ref { background: #fff8e1; border-left: 3px solid #f39c12; padding: 8px 15px; margin: 8px 0; font-size: 0.85em; word-break: break-all; }
        .property-rag-images-index { background: #f0fff4; border-left: 3px solid #27ae60; padding: 10px 15px; margin: 10px 0; font-size: 0.85em; word-break: break-all; }
        .property-images { display: flex; gap: 10px; margin: 15px 0; flex-wrap: wrap; }
        .property-images img { max-width: 300px; height: auto; border-radius: 4px; }
        .property-specs { background: #f8f9fa; padding: 15px; border-radius: 4px; margin: 15px 0; }
        .specs-detail { display: flex; gap: 20px; flex-wrap: wrap; margin-top: 10px; }
        .spec-item { background: #fff; padding: 6px 12px; border-radius: 4px; border: 1px solid #e0e0e0; font-size: 0.9em; }
        .property-content { margin: 15px 0; }
        .property-unique { background: #fffbf0; border-left: 3px solid #b8965a; padding: 12px 15px; margin: 15px 0; border-radius: 0 4px 4px 0; }
        .property-location { background: #f0f7ff; border-left: 3px solid #3498db; padding: 12px 15px; margin: 15px 0; border-radius: 0 4px 4px 0; }
        .property-url { display: inline-block; margin-top: 10px; padding: 8px 16px; background: #b8965a; color: white; text-decoration: none; border-radius: 4px; font-weight: bold; }
        .property-url:hover { background: #9a7a45; }
        .summary-box { background: #f8f9fa; padding: 20px; border-radius: 8px; margin-bottom: 30px; }"#;

const DIVIDER: &str = "\n    <hr>\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// Browsable catalog.
    Plain,
    /// Catalog with per-listing metadata for a retrieval agent.
    Rag,
}

pub struct CatalogOptions<'a> {
    pub variant: Variant,
    pub generated_at: DateTime<Utc>,
    pub settings: &'a Settings,
}

/// Render the full catalog document. Output depends only on the inputs.
pub fn render_catalog(records: &[ListingRecord], opts: &CatalogOptions) -> String {
    let settings = opts.settings;
    let title = match opts.variant {
        Variant::Plain => escape_html(&settings.catalog.title),
        Variant::Rag => format!("{} (RAG)", escape_html(&settings.catalog.title)),
    };
    let articles = records
        .iter()
        .map(|r| render_article(r, opts))
        .collect::<Vec<_>>()
        .join(DIVIDER);

    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{style}
    </style>
</head>
<body>
    <h1>{title}</h1>

    <div class="summary-box">
        <p><strong>Total de propiedades:</strong> {count}</p>
        <p><strong>Última actualización:</strong> {generated}</p>
        <p><strong>Fuente:</strong> {source}</p>
        <p><strong>Destinos:</strong> {localities}</p>
    </div>
    <hr>
{articles}
</body>
</html>
"#,
        title = title,
        style = STYLE,
        count = records.len(),
        generated = opts.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        source = escape_html(&settings.site_base_url),
        localities = escape_html(&settings.catalog.localities.join(", ")),
        articles = articles,
    )
}

fn render_article(record: &ListingRecord, opts: &CatalogOptions) -> String {
    let settings = opts.settings;
    let parsed = record.parsed_specs();
    let sections = record.sections();
    let site_url = escape_html(&settings.site_url(&record.slug));
    let title = escape_html(&record.title);
    let display = escape_html(&parsed.display());

    let mut out = String::new();
    out.push_str(&format!(
        "\n    <article class=\"property\" id=\"property-{}\">\n        <h2>{}</h2>\n",
        escape_html(&record.id),
        title
    ));

    if opts.variant == Variant::Rag {
        out.push_str(&format!("\n        {}\n", metadata_comment(record, settings)));
    }

    out.push_str(&format!(
        r#"
        <div class="property-meta">
            <strong>ID:</strong> {id} |
            <strong>Slug:</strong> {slug} |
            <strong>Specs:</strong> {display} |
            <strong>URL:</strong> {url} |
            <strong>Categoría:</strong> inmobiliaria
        </div>
"#,
        id = escape_html(&record.id),
        slug = escape_html(&record.slug),
        display = display,
        url = site_url,
    ));

    if opts.variant == Variant::Rag {
        out.push_str(&render_image_index(record));
    }

    let images = record
        .images
        .iter()
        .enumerate()
        .map(|(i, src)| {
            format!(
                "            <img src=\"{}\" alt=\"{} - Imagen {}\" loading=\"lazy\">",
                escape_html(src),
                title,
                i + 1
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut spec_items: Vec<String> = parsed
        .extra_flags
        .iter()
        .map(|flag| format!("<span class=\"spec-item\">{}</span>", escape_html(flag)))
        .collect();
    if let Some(v) = &parsed.bedrooms {
        spec_items.push(spec_item("🛏 Dormitorios:", v, ""));
    }
    if let Some(v) = &parsed.bathrooms {
        spec_items.push(spec_item("🚿 Baños:", v, ""));
    }
    if let Some(v) = &parsed.area_sqm {
        spec_items.push(spec_item("📐 Superficie:", v, " m²"));
    }
    if let Some(v) = &parsed.price {
        spec_items.push(spec_item("💰 Precio:", v, " €"));
    }

    out.push_str(&format!(
        r#"
        <div class="property-images">
{images}
        </div>

        <div class="property-specs">
            <strong>📋 Especificaciones:</strong><br>
            {specs_line}
            <div class="specs-detail">
            {spec_items}
            </div>
        </div>

        <div class="property-content">
            <strong>📝 Descripción:</strong><br>
            <p>{narrative}</p>
        </div>
"#,
        images = images,
        specs_line = escape_html(&record.specs.join(" | ")),
        spec_items = spec_items.join("\n            "),
        narrative = escape_html(&sections.narrative),
    ));

    if !sections.highlight.is_empty() {
        out.push_str(&format!(
            r#"
        <div class="property-unique">
            <strong>✨ ¿Qué lo hace único?</strong><br>
            <p>{}</p>
        </div>
"#,
            escape_html(&sections.highlight)
        ));
    }
    if !sections.location.is_empty() {
        out.push_str(&format!(
            r#"
        <div class="property-location">
            <strong>📍 Ubicación:</strong><br>
            <p>{}</p>
        </div>
"#,
            escape_html(&sections.location)
        ));
    }

    out.push_str(&format!(
        "\n        <a href=\"{}\" class=\"property-url\" target=\"_blank\">Ver propiedad →</a>\n    </article>",
        site_url
    ));
    out
}

fn render_image_index(record: &ListingRecord) -> String {
    let image = |i: usize| escape_html(record.images.get(i).map_or("", String::as_str));
    let index = record
        .images
        .iter()
        .enumerate()
        .map(|(i, src)| format!("image_{}: {}", i + 1, escape_html(src)))
        .collect::<Vec<_>>()
        .join(" | ");

    format!(
        r#"
        <div class="property-quick-ref">
            IMAGEN_1: {} |
            IMAGEN_2: {} |
            IMAGEN_3: {}
        </div>

        <div class="property-rag-images-index">
            <strong>🖼 URLs de imágenes:</strong><br>
            {}
        </div>
"#,
        image(0),
        image(1),
        image(2),
        index
    )
}

fn spec_item(label: &str, value: &str, unit: &str) -> String {
    format!(
        "<span class=\"spec-item\"><strong>{}</strong> {}{}</span>",
        label,
        escape_html(value),
        unit
    )
}

/// `<!-- RAG_METADATA: key="value" | ... -->` for one record.
pub fn metadata_comment(record: &ListingRecord, settings: &Settings) -> String {
    let parsed = record.parsed_specs();
    let image = |i: usize| record.images.get(i).map_or("", String::as_str);
    let url = settings.site_url(&record.slug);
    let specs = parsed.display();
    let summary = parsed.summary();
    let count = record.images.len().to_string();
    let fields: [(&str, &str); 9] = [
        ("title", record.title.as_str()),
        ("url", url.as_str()),
        ("slug", record.slug.as_str()),
        ("specs", specs.as_str()),
        ("summary", summary.as_str()),
        ("image", image(0)),
        ("image_2", image(1)),
        ("image_3", image(2)),
        ("images_count", count.as_str()),
    ];
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, comment_value(v)))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("<!-- RAG_METADATA: {} -->", body)
}

fn comment_value(v: &str) -> String {
    let mut escaped = escape_html(v);
    while escaped.contains("--") {
        escaped = escaped.replace("--", "- -");
    }
    escaped
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
