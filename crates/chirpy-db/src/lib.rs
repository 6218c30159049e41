pub mod document;
pub mod error;
pub mod queries;

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

pub use document::Document;
pub use error::StoreError;

pub type Result<T> = std::result::Result<T, StoreError>;

/// JSON document store. One mutex covers the whole file; every read or
/// read-modify-write cycle runs through a [`DocumentFile`] holding it.
#[derive(Clone)]
pub struct Store {
    file: Arc<Mutex<PathBuf>>,
}

/// Exclusive handle on the document file. The lock is released when it drops.
pub struct DocumentFile {
    path: OwnedMutexGuard<PathBuf>,
}

impl Store {
    /// Open the document at `path`, creating an empty one if the file is missing.
    /// An existing file is decoded immediately so corruption surfaces here.
    pub fn open(path: &Path) -> Result<Self> {
        if path.exists() {
            read_document(path)?;
        } else {
            write_document(path, &Document::default())?;
        }

        info!("Document store opened at {}", path.display());
        Ok(Self {
            file: Arc::new(Mutex::new(path.to_path_buf())),
        })
    }

    /// Block the current thread until the file is free.
    /// Must not be called from inside the async runtime; use [`Store::run`] there.
    pub fn lock(&self) -> DocumentFile {
        DocumentFile {
            path: self.file.clone().blocking_lock_owned(),
        }
    }

    /// Run a store call on the blocking pool.
    ///
    /// `timeout` bounds only the wait for the lock. Once the lock is held the
    /// call runs to completion, even if the caller is dropped, and its real
    /// outcome is returned: a write that reached disk is never reported as failed.
    pub async fn run<F, T>(&self, timeout: Duration, f: F) -> Result<T>
    where
        F: FnOnce(&DocumentFile) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = tokio::time::timeout(timeout, self.file.clone().lock_owned())
            .await
            .map_err(|_| StoreError::Timeout(timeout))?;
        let file = DocumentFile { path };

        tokio::task::spawn_blocking(move || f(&file))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

impl DocumentFile {
    /// Read the current document.
    pub fn load(&self) -> Result<Document> {
        read_document(&self.path)
    }

    /// Replace the document wholesale.
    pub fn write(&self, doc: &Document) -> Result<()> {
        write_document(&self.path, doc)
    }

    /// Replace the document with an empty one.
    pub fn reset(&self) -> Result<()> {
        self.write(&Document::default())?;
        warn!("Document store reset");
        Ok(())
    }

    pub fn with_document<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Document) -> Result<T>,
    {
        let doc = self.load()?;
        f(&doc)
    }

    /// Load, mutate, write. Nothing is written if `f` fails, so the durable
    /// state is either the old document or the new one.
    pub fn with_document_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Document) -> Result<T>,
    {
        let mut doc = self.load()?;
        let out = f(&mut doc)?;
        self.write(&doc)?;
        Ok(out)
    }
}

fn read_document(path: &Path) -> Result<Document> {
    let bytes = fs::read(path).map_err(|e| StoreError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Write to a sibling temp file, then rename over the target.
fn write_document(path: &Path, doc: &Document) -> Result<()> {
    let bytes = serde_json::to_vec(doc).map_err(StoreError::Encode)?;

    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut file = fs::File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
    file.write_all(&bytes).map_err(|e| StoreError::io(&tmp, e))?;
    file.sync_all().map_err(|e| StoreError::io(&tmp, e))?;
    drop(file);

    fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))
}
