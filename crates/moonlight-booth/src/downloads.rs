//! Writes finished artifacts to the downloads directory.

use crate::AppResult;

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use tracing::{info, instrument, warn};

/// Download target.
#[derive(Debug, Clone)]
pub struct Downloads {
    dir: PathBuf,
    open_after_save: bool,
}

impl Downloads {
    /// Downloads into `dir`, optionally opening each file afterwards.
    pub fn new(dir: impl Into<PathBuf>, open_after_save: bool) -> Self {
        Self {
            dir: dir.into(),
            open_after_save,
        }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `bytes` as `filename` and returns the full path.
    ///
    /// The file is written under a temporary name and renamed into place,
    /// so a partially written download is never visible.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub fn save(&self, filename: &str, bytes: &[u8]) -> AppResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let path = self.dir.join(filename);
        let temp_path = self.dir.join(format!(".{filename}.part"));

        let mut file = fs::File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&temp_path, &path)?;

        info!(path = ?path, "Download saved");

        if self.open_after_save
            && let Err(e) = open::that(&path)
        {
            warn!(path = ?path, error = %e, "Could not open download");
        }

        Ok(path)
    }
}
