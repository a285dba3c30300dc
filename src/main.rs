mod config;
mod error;
mod parser;
mod render;
mod rewrite;
mod store;

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use config::Settings;
use parser::ListingRecord;
use render::{CatalogOptions, Variant};
use rewrite::{CtaMode, RewriteOptions};

#[derive(Parser)]
#[command(name = "listing_catalog", about = "Property catalog extractor and renderer")]
struct Cli {
    /// Settings file (TOML); defaults apply to every missing key
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract listings from an HTML catalog into the JSON record set
    Extract {
        /// Source HTML catalog
        input: PathBuf,
        /// Record set path (default: paths.records)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Rewrite an HTML catalog in place and refresh the JSON record set
    Rewrite {
        /// HTML catalog to rewrite
        input: PathBuf,
        /// Call-to-action link handling
        #[arg(long, value_enum, default_value = "canonical")]
        cta: CtaMode,
        /// Keep "Referencia" blocks
        #[arg(long)]
        keep_reference: bool,
        /// Insert a fresh RAG_METADATA comment per listing
        #[arg(long)]
        inject_metadata: bool,
        /// Record set path (default: paths.records)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Render a catalog from the JSON record set
    Render {
        /// Record set path (default: paths.records)
        #[arg(short, long)]
        records: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "plain")]
        variant: Variant,
        /// Output path (default: paths.catalog or paths.rag_catalog)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Generation timestamp, RFC 3339 (default: now)
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Extract, save the record set, and render both catalog variants
    Build {
        /// Source HTML catalog
        input: PathBuf,
    },
    /// Show counts over a persisted record set
    Stats {
        /// Record set path (default: paths.records)
        #[arg(short, long)]
        records: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Extract { input, out } => {
            let html = store::read_input(&input)?;
            let records = extract_records(&html, &settings)?;
            ExtractCounts::from_records(&records).print();

            let out = out.unwrap_or_else(|| settings.paths.records.clone());
            let bytes = store::save_records(&out, &records)?;
            print_written(&out, bytes);
            Ok(())
        }
        Commands::Rewrite {
            input,
            cta,
            keep_reference,
            inject_metadata,
            out,
        } => {
            // Whole document in memory before the in-place write.
            let html = store::read_input(&input)?;
            let records = parser::process_document(&html, &settings.listing_url_template);
            ExtractCounts::from_records(&records).print();

            let opts = RewriteOptions {
                cta,
                strip_reference: !keep_reference,
                inject_metadata,
            };
            let (rewritten, report) = rewrite::rewrite_document(&html, &records, &opts, &settings);
            println!(
                "Rewrote {} listings ({} skipped).",
                report.rewritten, report.skipped
            );

            let out = out.unwrap_or_else(|| settings.paths.records.clone());
            let bytes = store::save_records(&out, &records)?;
            print_written(&out, bytes);
            let bytes = store::write_artifact(&input, &rewritten)?;
            print_written(&input, bytes);
            Ok(())
        }
        Commands::Render {
            records,
            variant,
            out,
            timestamp,
        } => {
            let path = records.unwrap_or_else(|| settings.paths.records.clone());
            let records = store::load_records(&path)?;
            let generated_at = parse_timestamp(timestamp.as_deref())?;
            let out = out.unwrap_or_else(|| default_catalog_path(&settings, variant));
            render_to(&out, &records, variant, generated_at, &settings)?;
            Ok(())
        }
        Commands::Build { input } => {
            let html = store::read_input(&input)?;
            let records = extract_records(&html, &settings)?;
            ExtractCounts::from_records(&records).print();

            let bytes = store::save_records(&settings.paths.records, &records)?;
            print_written(&settings.paths.records, bytes);

            let generated_at = Utc::now();
            for variant in [Variant::Plain, Variant::Rag] {
                let out = default_catalog_path(&settings, variant);
                render_to(&out, &records, variant, generated_at, &settings)?;
            }
            Ok(())
        }
        Commands::Stats { records } => {
            let path = records.unwrap_or_else(|| settings.paths.records.clone());
            let records = store::load_records(&path)?;
            ExtractCounts::from_records(&records).print();
            println!("Listings with status flags: {}", count_flagged(&records));
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Extraction + assembly with a progress bar over listings.
fn extract_records(html: &str, settings: &Settings) -> anyhow::Result<Vec<ListingRecord>> {
    let articles = parser::articles::extract_articles(html);
    info!("Found {} listing containers", articles.len());

    let pb = ProgressBar::new(articles.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );

    let mut records = Vec::with_capacity(articles.len());
    for raw in articles {
        records.push(parser::record::assemble(raw, &settings.listing_url_template));
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(records)
}

fn render_to(
    out: &Path,
    records: &[ListingRecord],
    variant: Variant,
    generated_at: DateTime<Utc>,
    settings: &Settings,
) -> anyhow::Result<()> {
    let html = render::render_catalog(
        records,
        &CatalogOptions {
            variant,
            generated_at,
            settings,
        },
    );
    let bytes = store::write_artifact(out, &html)?;
    println!("Rendered {} listings ({:?}).", records.len(), variant);
    print_written(out, bytes);
    Ok(())
}

fn default_catalog_path(settings: &Settings, variant: Variant) -> PathBuf {
    match variant {
        Variant::Plain => settings.paths.catalog.clone(),
        Variant::Rag => settings.paths.rag_catalog.clone(),
    }
}

fn parse_timestamp(value: Option<&str>) -> error::Result<DateTime<Utc>> {
    match value {
        Some(s) => Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

struct ExtractCounts {
    listings: usize,
    without_title: usize,
    without_images: usize,
    without_specs: usize,
    without_location: usize,
}

impl ExtractCounts {
    fn from_records(records: &[ListingRecord]) -> Self {
        let count = |f: fn(&ListingRecord) -> bool| records.iter().filter(|r| f(r)).count();
        ExtractCounts {
            listings: records.len(),
            without_title: count(|r| r.title.is_empty()),
            without_images: count(|r| r.images.is_empty()),
            without_specs: count(|r| r.specs.is_empty()),
            without_location: count(|r| r.location.is_empty()),
        }
    }

    fn print(&self) {
        println!(
            "Processed {} listings: {} without title, {} without images, {} without specs, {} without location.",
            self.listings,
            self.without_title,
            self.without_images,
            self.without_specs,
            self.without_location,
        );
    }
}

/// Listings carrying a known status flag such as VENDIDO.
fn count_flagged(records: &[ListingRecord]) -> usize {
    records
        .iter()
        .filter(|r| r.parsed_specs().status_flags().next().is_some())
        .count()
}

fn print_written(path: &Path, bytes: u64) {
    println!("  {} ({:.1} KB)", path.display(), bytes as f64 / 1024.0);
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
