//! # Sidecar Storage
//!
//! A sidecar is a YAML file written next to its dataset, named by
//! appending `.yml` to the dataset's full file name
//! (`parcels.shp` → `parcels.shp.yml`).

use std::path::{Path, PathBuf};

use geometa_core::document::yaml_to_json_value;
use geometa_core::{Document, GeometaError, StaleDocumentError};
use serde_json::Value;

/// Extension appended to a dataset path to name its sidecar.
pub const SIDECAR_EXTENSION: &str = "yml";

/// Sidecar path for `dataset`.
pub fn sidecar_path(dataset: &Path) -> PathBuf {
    let mut name = dataset.as_os_str().to_owned();
    name.push(".");
    name.push(SIDECAR_EXTENSION);
    PathBuf::from(name)
}

/// Reads and writes one sidecar file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarStore {
    path: PathBuf,
}

impl SidecarStore {
    /// A store for an explicit sidecar path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store for the sidecar of `dataset`.
    pub fn for_dataset(dataset: impl AsRef<Path>) -> Self {
        Self::new(sidecar_path(dataset.as_ref()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the existing sidecar, if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`StaleDocumentError`] when the file exists but cannot be
    /// read or parsed. A missing file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<Value>, StaleDocumentError> {
        let shown = self.path.display().to_string();
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StaleDocumentError::Unreadable {
                    path: shown,
                    reason: e.to_string(),
                })
            }
        };
        let unparsable = |reason: String| StaleDocumentError::Unparsable {
            path: shown.clone(),
            reason,
        };
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&content).map_err(|e| unparsable(e.to_string()))?;
        let value = yaml_to_json_value(&yaml).map_err(unparsable)?;
        tracing::debug!(path = %shown, "loaded existing sidecar");
        Ok(Some(value))
    }

    /// Write `document` as YAML, replacing any existing sidecar.
    ///
    /// # Errors
    ///
    /// Returns [`GeometaError::Io`] or [`GeometaError::Serialization`].
    pub fn save(&self, document: &Document) -> Result<(), GeometaError> {
        let yaml = document.to_yaml_string()?;
        std::fs::write(&self.path, yaml)?;
        tracing::info!(path = %self.path.display(), "wrote sidecar");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sidecar_path_appends_extension() {
        assert_eq!(
            sidecar_path(Path::new("/data/parcels.shp")),
            PathBuf::from("/data/parcels.shp.yml")
        );
        assert_eq!(sidecar_path(Path::new("dem")), PathBuf::from("dem.yml"));
    }

    #[test]
    fn missing_sidecar_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SidecarStore::for_dataset(dir.path().join("absent.csv"));
        assert_eq!(store.load(), Ok(None));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SidecarStore::for_dataset(dir.path().join("table.csv"));
        let doc = Document::new(json!({
            "mcf": {"version": "1.0"},
            "content_info": {"attributes": [{"name": "id", "nodata": "NaN"}]}
        }));
        store.save(&doc).unwrap();
        assert!(store.path().ends_with("table.csv.yml"));
        assert_eq!(store.load().unwrap(), Some(doc.into_value()));
    }

    #[test]
    fn unparsable_sidecar_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let store = SidecarStore::new(dir.path().join("bad.yml"));
        std::fs::write(store.path(), "mcf: [unclosed\n").unwrap();
        assert!(matches!(
            store.load(),
            Err(StaleDocumentError::Unparsable { .. })
        ));
    }

    #[test]
    fn directory_in_place_of_sidecar_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let store = SidecarStore::new(dir.path());
        assert!(matches!(
            store.load(),
            Err(StaleDocumentError::Unreadable { .. })
        ));
    }
}
