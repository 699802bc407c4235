use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::{CacheError, Result};

/// Byte storage with per-entry expiry.
///
/// Expired entries read as absent and are evicted on access.
pub trait BlobStore {
    fn save(&mut self, key: &str, bytes: &[u8], expiry: Duration) -> Result<()>;
    fn load(&mut self, key: &str) -> Result<Option<Vec<u8>>>;
    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Longer expiries are clamped to this.
const MAX_EXPIRY: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

fn expires_at(expiry: Duration) -> SystemTime {
    let now = SystemTime::now();
    now.checked_add(expiry.min(MAX_EXPIRY)).unwrap_or(now)
}

fn is_expired(expires_at: SystemTime) -> bool {
    SystemTime::now() >= expires_at
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, (Vec<u8>, SystemTime)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BlobStore for MemoryStore {
    fn save(&mut self, key: &str, bytes: &[u8], expiry: Duration) -> Result<()> {
        self.entries
            .insert(key.to_owned(), (bytes.to_vec(), expires_at(expiry)));
        Ok(())
    }

    fn load(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        let Some((bytes, expires_at)) = self.entries.get(key) else {
            return Ok(None);
        };
        if is_expired(*expires_at) {
            self.entries.remove(key);
            return Ok(None);
        }
        Ok(Some(bytes.clone()))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

const HEADER_LEN: usize = 8;

/// One file per key inside a directory.
///
/// Each file starts with the expiry time as big-endian milliseconds since the Unix epoch,
/// followed by the stored bytes.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Uses `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl BlobStore for FileStore {
    fn save(&mut self, key: &str, bytes: &[u8], expiry: Duration) -> Result<()> {
        let millis = expires_at(expiry)
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        let mut contents = Vec::with_capacity(HEADER_LEN + bytes.len());
        contents.extend_from_slice(&millis.to_be_bytes());
        contents.extend_from_slice(bytes);
        fs::write(self.path_for(key), contents)?;
        Ok(())
    }

    fn load(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        let contents = match fs::read(self.path_for(key)) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let Some((header, bytes)) = contents.split_first_chunk::<HEADER_LEN>() else {
            return Err(CacheError::Corrupt(key.to_owned()));
        };
        let expires_at = UNIX_EPOCH + Duration::from_millis(u64::from_be_bytes(*header));
        if is_expired(expires_at) {
            adebug!(key, "FileStore: evicting expired entry");
            self.remove(key)?;
            return Ok(None);
        }
        Ok(Some(bytes.to_vec()))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
