use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

/// Pipeline settings. Every key is optional in the settings file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// External listing URL; `{slug}` is replaced per record.
    pub listing_url_template: String,
    /// Base of the public property site; catalogs link to `{site_base_url}/{slug}`.
    pub site_base_url: String,
    pub catalog: CatalogSettings,
    pub paths: PathSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub title: String,
    pub localities: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub records: PathBuf,
    pub catalog: PathBuf,
    pub rag_catalog: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listing_url_template: "https://www.vivla.com/es/listings/{slug}".to_string(),
            site_base_url: "https://realestate-viviendas.vercel.app".to_string(),
            catalog: CatalogSettings::default(),
            paths: PathSettings::default(),
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            title: "Catálogo de Propiedades - Yucatán".to_string(),
            localities: [
                "Mérida",
                "Progreso",
                "Chicxulub Puerto",
                "Chelem",
                "Telchac Puerto",
                "Sisal",
                "Celestún",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            records: PathBuf::from("data/properties.json"),
            catalog: PathBuf::from("data/rag/catalog.html"),
            rag_catalog: PathBuf::from("data/rag/catalog-rag.html"),
        }
    }
}

impl Settings {
    /// Defaults, overlaid with the settings file when one is given.
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        let Some(path) = path else {
            return Ok(Settings::default());
        };
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize::<Settings>()?;
        Ok(settings)
    }

    /// Public page of a listing on the property site.
    pub fn site_url(&self, slug: &str) -> String {
        format!("{}/{}", self.site_base_url.trim_end_matches('/'), slug)
    }
}
