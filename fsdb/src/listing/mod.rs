// Directory listings and traversal for generated collections.
//
// Listings are advisory: a missing or unreadable directory yields an empty
// result and a warning. Traversal feeds record handlers and propagates every
// storage failure instead.

use crate::document::{self, Document};
use crate::error::Result;
use std::fs::{DirEntry, ReadDir};
use std::iter::FusedIterator;
use std::path::Path;

/// Names of the subdirectories of `dir`, sorted.
pub fn list_folders(dir: &Path) -> Vec<String> {
    list_entries(dir, EntryKind::Folder)
}

/// Names of the documents (non-directory entries) of `dir`, sorted.
pub fn list_documents(dir: &Path) -> Vec<String> {
    list_entries(dir, EntryKind::Document)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Folder,
    Document,
}

fn list_entries(dir: &Path, kind: EntryKind) -> Vec<String> {
    match scan_entries(dir, kind) {
        Ok(names) => names,
        Err(e) => {
            log::warn!("Failed to scan {kind:?} entries in {}: {e}", dir.display());
            Vec::new()
        }
    }
}

fn scan_entries(dir: &Path, kind: EntryKind) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let is_dir = entry.file_type()?.is_dir();
        if is_dir != (kind == EntryKind::Folder) {
            continue;
        }
        if let Some(name) = utf8_name(&entry) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Ids must round-trip to the same file, so names that are not UTF-8 are
/// skipped.
fn utf8_name(entry: &DirEntry) -> Option<String> {
    match entry.file_name().into_string() {
        Ok(name) => Some(name),
        Err(_) => {
            log::warn!("Skipping non UTF-8 entry {}", entry.path().display());
            None
        }
    }
}

/// Lazily read every document in `dir`.
///
/// Fails up front if the directory cannot be opened. The returned iterator
/// yields at most one error, after which it is exhausted.
pub fn documents(dir: &Path) -> Result<Documents> {
    Ok(Documents {
        entries: std::fs::read_dir(dir)?,
        failed: false,
    })
}

/// Iterator returned by [`documents`].
#[derive(Debug)]
pub struct Documents {
    entries: ReadDir,
    failed: bool,
}

impl Documents {
    fn next_document(&mut self) -> Option<Result<Document>> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e.into())),
            };
            match entry.file_type() {
                Ok(file_type) if file_type.is_dir() => continue,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            let Some(id) = utf8_name(&entry) else {
                continue;
            };
            return Some(document::read_path(entry.path(), id));
        }
    }
}

impl Iterator for Documents {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.next_document()?;
        self.failed = item.is_err();
        Some(item)
    }
}

impl FusedIterator for Documents {}
