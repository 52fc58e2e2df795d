use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::error::ReadError;
use crate::types::{FileContent, FileContentResult};

/// How far into a file to look for NUL bytes
const BINARY_SNIFF_LEN: usize = 8000;

/// Reads caller-chosen files out of a workspace.
///
/// Paths come from an external caller, so each one is confined to the root
/// twice: lexically before touching the disk, and again after symlinks are
/// resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileReader {
    max_file_bytes: Option<u64>,
}

impl FileReader {
    pub fn new(max_file_bytes: Option<u64>) -> Self {
        Self { max_file_bytes }
    }

    /// One entry per requested path, in order, duplicates included
    pub fn read_many<S: AsRef<str>>(&self, root: &Path, paths: &[S]) -> FileContentResult {
        let canonical_root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let mut result = FileContentResult::with_capacity(paths.len());

        for path in paths {
            let path = path.as_ref();
            let content = match self.read_one(&canonical_root, path) {
                Ok(text) => FileContent::Text(text),
                Err(e) => {
                    debug!(path, error = %e, "read failed");
                    FileContent::Error(e)
                }
            };
            result.push(path.to_string(), content);
        }

        result
    }

    fn read_one(&self, root: &Path, requested: &str) -> Result<String, ReadError> {
        let relative = normalize_relative(requested).ok_or(ReadError::OutsideWorkspace)?;
        let full = root.join(&relative);

        let resolved = match full.canonicalize() {
            Ok(p) => p,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ReadError::NotFound),
            Err(e) => return Err(ReadError::Unreadable(e.to_string())),
        };
        if !resolved.starts_with(root) {
            return Err(ReadError::OutsideWorkspace);
        }

        let metadata = fs::metadata(&resolved).map_err(|e| ReadError::Unreadable(e.to_string()))?;
        if metadata.is_dir() {
            return Err(ReadError::NotAFile);
        }
        if let Some(limit) = self.max_file_bytes {
            if metadata.len() > limit {
                return Err(ReadError::TooLarge {
                    size: metadata.len(),
                    limit,
                });
            }
        }

        let mut file =
            fs::File::open(&resolved).map_err(|e| ReadError::Unreadable(e.to_string()))?;
        let mut bytes = Vec::new();
        let read = match self.max_file_bytes {
            // the file may have grown since the metadata call
            Some(limit) => file.take(limit.saturating_add(1)).read_to_end(&mut bytes),
            None => file.read_to_end(&mut bytes),
        };
        read.map_err(|e| ReadError::Unreadable(e.to_string()))?;
        if let Some(limit) = self.max_file_bytes {
            if bytes.len() as u64 > limit {
                return Err(ReadError::TooLarge {
                    size: bytes.len() as u64,
                    limit,
                });
            }
        }

        decode_text(bytes)
    }
}

/// Resolve `.` and `..` without touching the disk.
///
/// Returns `None` for absolute paths, drive prefixes, and any `..` that
/// would climb above the root.
fn normalize_relative(path: &str) -> Option<PathBuf> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();

    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    Some(parts.iter().collect())
}

/// Text as-is, invalid UTF-8 replaced, binaries withheld
fn decode_text(bytes: Vec<u8>) -> Result<String, ReadError> {
    let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
    if sniff.contains(&0) {
        return Err(ReadError::Binary {
            size: bytes.len() as u64,
        });
    }

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => Ok(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    }
}
