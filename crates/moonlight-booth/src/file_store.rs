//! On-disk [`ArtifactStore`] keeping one file per key.

use moonlight_booth_core::{ArtifactStore, BoothError, CoreResult};

use std::{
    fs,
    io::{ErrorKind, Write},
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use tracing::{debug, instrument};

/// Blob store rooted at a cache directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store rooted at `dir`. The directory is created on [`ArtifactStore::open`].
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.blob"))
    }
}

#[track_caller]
fn cache_error(action: &str, path: &Path, e: std::io::Error) -> BoothError {
    BoothError::Cache {
        reason: format!("Failed to {action} {}: {e}", path.display()),
        location: ErrorLocation::from(Location::caller()),
    }
}

impl ArtifactStore for FileStore {
    #[instrument(skip(self), fields(dir = ?self.dir))]
    fn open(&self) -> CoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| cache_error("create", &self.dir, e))?;
        debug!("File store ready");
        Ok(())
    }

    fn get(&self, key: &str) -> CoreResult<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(cache_error("read", &path, e)),
        }
    }

    fn put(&self, key: &str, bytes: &[u8]) -> CoreResult<()> {
        let path = self.path_for(key);
        let temp_path = path.with_extension("blob.tmp");

        let mut temp_file =
            fs::File::create(&temp_path).map_err(|e| cache_error("create", &temp_path, e))?;
        temp_file
            .write_all(bytes)
            .map_err(|e| cache_error("write", &temp_path, e))?;
        temp_file
            .sync_all()
            .map_err(|e| cache_error("sync", &temp_path, e))?;
        fs::rename(&temp_path, &path).map_err(|e| cache_error("replace", &path, e))?;

        debug!(key, bytes = bytes.len(), "Blob written");
        Ok(())
    }
}
