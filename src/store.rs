use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::parser::ListingRecord;

/// Read the whole source document into memory.
pub fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::MissingInput {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_records(path: &Path) -> Result<Vec<ListingRecord>> {
    let text = fs::read_to_string(path).map_err(|source| Error::MissingInput {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<ListingRecord> = serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Replace the persisted record set wholesale. Returns bytes written.
pub fn save_records(path: &Path, records: &[ListingRecord]) -> Result<u64> {
    let json = serde_json::to_string_pretty(records).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let bytes = write_artifact(path, &json)?;
    info!("Saved {} records to {}", records.len(), path.display());
    Ok(bytes)
}

/// One whole-file write, creating parent directories. Returns bytes written.
pub fn write_artifact(path: &Path, content: &str) -> Result<u64> {
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, content).map_err(io_err)?;
    Ok(content.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> ListingRecord {
        ListingRecord {
            id: id.into(),
            slug: format!("casa-{}", id),
            title: format!("Casa {}", id),
            specs: vec!["2".into(), "Dormitorios".into()],
            images: vec!["a.jpg".into()],
            ..Default::default()
        }
    }

    #[test]
    fn save_replaces_previous_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/data/properties.json");

        save_records(&path, &[record("1"), record("2"), record("3")]).unwrap();
        save_records(&path, &[record("9")]).unwrap();

        let loaded = load_records(&path).unwrap();
        assert_eq!(loaded, vec![record("9")]);
    }

    #[test]
    fn missing_input_error() {
        let err = read_input(Path::new("/nonexistent/catalog.html")).unwrap_err();
        assert!(matches!(err, Error::MissingInput { .. }));
        assert!(err.to_string().contains("/nonexistent/catalog.html"));
    }

    #[test]
    fn corrupt_record_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("properties.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_records(&path), Err(Error::Json { .. })));
    }

    #[test]
    fn artifact_size_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        let bytes = write_artifact(&path, "<p>ñ</p>").unwrap();
        assert_eq!(bytes, fs::metadata(&path).unwrap().len());
    }
}
