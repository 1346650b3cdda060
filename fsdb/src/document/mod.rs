// Document I/O - read/write JSON documents stored one per file

use crate::error::{FsdbError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A loaded document with its location and raw content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub id: String,
    pub content: Vec<u8>,
    pub modified_at: DateTime<Utc>,
}

/// Reject ids that would resolve outside of their collection directory.
pub fn validate_id(id: &str) -> Result<()> {
    let escapes = id == "." || id == ".." || id.contains(|c: char| c == '/' || c == '\\');
    if id.is_empty() || escapes {
        return Err(FsdbError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Read the document `id` stored in `dir`, including its modification time.
pub fn read(dir: &Path, id: &str) -> Result<Document> {
    validate_id(id)?;
    read_path(dir.join(id), id.to_string())
}

pub(crate) fn read_path(path: PathBuf, id: String) -> Result<Document> {
    let metadata = std::fs::metadata(&path)?;
    let content = std::fs::read(&path)?;
    Ok(Document {
        path,
        id,
        content,
        modified_at: metadata.modified()?.into(),
    })
}

/// Read the document `id` stored in `dir` and decode it into `T`.
pub fn load<T: DeserializeOwned>(dir: &Path, id: &str) -> Result<T> {
    validate_id(id)?;
    let content = std::fs::read(dir.join(id))?;
    decode(&content)
}

/// Write `content` to `path`, creating any missing parent directories.
pub fn write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Write `content` as document `id` inside `dir`.
pub fn write_in(dir: &Path, id: &str, content: &[u8]) -> Result<()> {
    validate_id(id)?;
    write(&dir.join(id), content)
}

/// Serialize a value into document content (pretty-printed JSON).
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(value)?)
}

/// Deserialize document content.
pub fn decode<T: DeserializeOwned>(content: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(content)?)
}
