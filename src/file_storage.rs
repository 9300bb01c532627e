// File-per-entry storage backend

use crate::storage::{Storage, validate_key};
use eyre::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const CURRENT_VERSION: u32 = 1;

/// Stores every entry as `{key}.json` in one directory.
///
/// Writes go to a temporary file that is renamed over the entry while an
/// exclusive lock on `{key}.lock` is held, so readers never see half an entry.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Open or create a file store rooted at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create storage directory")?;

        let storage = Self { base_path };
        storage.write_version()?;
        Ok(storage)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn write_version(&self) -> Result<()> {
        let version_path = self.base_path.join(".version");
        if !version_path.exists() {
            fs::write(version_path, CURRENT_VERSION.to_string()).context("Failed to write version file")?;
        }
        Ok(())
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{}.json", key)))
    }

    fn lock(&self, key: &str) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.base_path.join(format!("{}.lock", key)))
            .context("Failed to open lock file")?;

        file.lock_exclusive().context("Failed to acquire file lock")?;
        Ok(file)
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        let tmp_path = self.base_path.join(format!("{}.json.tmp", key));

        // Lock is released when the guard file is dropped
        let _guard = self.lock(key)?;

        let mut file = File::create(&tmp_path).context("Failed to create temporary entry file")?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, &path).context("Failed to replace entry file")?;

        debug!(key, bytes = value.len(), "set_item: entry written");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        let _guard = self.lock(key)?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}
