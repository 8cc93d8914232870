//! JSON document persistence for the InMemory backend.
//!
//! Each collection is one JSON array in its own file. A missing file is
//! created as `[]`; a file that cannot be parsed is read as empty. Writes
//! go to a sibling temporary file which is then renamed over the document.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{Error, Result, backend::errors::BackendError};

/// File name of the item collection inside the data directory.
pub const ITEMS_FILE: &str = "items.json";
/// File name of the element collection inside the data directory.
pub const ELEMENTS_FILE: &str = "elements.json";

/// Locations of the two collection documents.
#[derive(Debug, Clone)]
pub(crate) struct Documents {
    pub(crate) dir: PathBuf,
    pub(crate) items: PathBuf,
    pub(crate) elements: PathBuf,
}

impl Documents {
    pub(crate) fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            items: dir.join(ITEMS_FILE),
            elements: dir.join(ELEMENTS_FILE),
            dir,
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> Error {
    BackendError::FileIo {
        path: path.display().to_string(),
        source,
    }
    .into()
}

/// Loads one collection document, creating it as `[]` if it does not exist.
pub(crate) async fn load_document<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => match serde_json::from_str(&json) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable document, treating as empty");
                Ok(Vec::new())
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "creating empty document");
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| io_error(parent, e))?;
            }
            tokio::fs::write(path, "[]")
                .await
                .map_err(|e| io_error(path, e))?;
            Ok(Vec::new())
        }
        Err(e) => Err(io_error(path, e)),
    }
}

/// Rewrites a whole collection document.
pub(crate) async fn save_document<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)
        .map_err(|e| -> Error { BackendError::SerializationFailed { source: e }.into() })?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, json)
        .await
        .map_err(|e| io_error(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| io_error(path, e))
}
