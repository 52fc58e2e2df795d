use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::types::RepositoryRef;

const WORKSPACE_PREFIX: &str = "git-ingest-";

/// Hands out fresh, empty directories for one ingestion each
#[derive(Debug, Clone, Default)]
pub struct WorkspaceManager {
    temp_root: Option<PathBuf>,
}

/// An exclusively owned scratch directory.
///
/// Removed by [`Workspace::release`], or on drop if the owner bails out
/// early (error, panic, cancelled future).
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl WorkspaceManager {
    pub fn new(temp_root: Option<PathBuf>) -> Self {
        Self { temp_root }
    }

    /// Create a new uniquely named directory.
    ///
    /// The name carries a short hash of the repository URL so a leaked
    /// directory can be traced back to its source.
    pub fn acquire(&self, repo: &RepositoryRef) -> io::Result<Workspace> {
        let prefix = format!("{}{}-", WORKSPACE_PREFIX, url_hash(repo.url()));
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);

        let dir = match &self.temp_root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };

        debug!(path = %dir.path().display(), repo = %repo, "acquired workspace");
        Ok(Workspace { dir })
    }
}

impl Workspace {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory and everything in it.
    ///
    /// Failures are logged, not returned: the caller's result matters more
    /// than a stray temp directory.
    pub fn release(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!(path = %path.display(), "released workspace"),
            // already gone, e.g. removed by a failed fetch
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "workspace already removed")
            }
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove workspace"),
        }
    }
}

fn url_hash(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepositoryRef {
        RepositoryRef::new("https://example.com/owner/repo.git")
    }

    #[test]
    fn test_url_hash() {
        let h1 = url_hash("https://a");
        let h2 = url_hash("https://a");
        let h3 = url_hash("https://b");

        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
        assert_eq!(h1.len(), 12);
    }

    #[test]
    fn test_acquire_is_empty_and_unique() {
        let root = TempDir::new().unwrap();
        let manager = WorkspaceManager::new(Some(root.path().to_path_buf()));

        let a = manager.acquire(&repo()).unwrap();
        let b = manager.acquire(&repo()).unwrap();

        assert_ne!(a.path(), b.path());
        assert!(a.path().starts_with(root.path()));
        assert_eq!(std::fs::read_dir(a.path()).unwrap().count(), 0);

        let name = a.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(WORKSPACE_PREFIX));
    }

    #[test]
    fn test_release_removes_contents() {
        let root = TempDir::new().unwrap();
        let manager = WorkspaceManager::new(Some(root.path().to_path_buf()));

        let ws = manager.acquire(&repo()).unwrap();
        let path = ws.path().to_path_buf();
        std::fs::create_dir_all(path.join("a/b")).unwrap();
        std::fs::write(path.join("a/b/c.txt"), "x").unwrap();

        ws.release();
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_release_after_directory_vanished() {
        let root = TempDir::new().unwrap();
        let manager = WorkspaceManager::new(Some(root.path().to_path_buf()));

        let ws = manager.acquire(&repo()).unwrap();
        std::fs::remove_dir(ws.path()).unwrap();

        ws.release();
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_drop_removes_directory() {
        let root = TempDir::new().unwrap();
        let manager = WorkspaceManager::new(Some(root.path().to_path_buf()));

        let path = {
            let ws = manager.acquire(&repo()).unwrap();
            std::fs::write(ws.path().join("file"), "x").unwrap();
            ws.path().to_path_buf()
        };

        assert!(!path.exists());
    }

    #[test]
    fn test_missing_temp_root_is_created() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("deeper/still");
        let manager = WorkspaceManager::new(Some(nested.clone()));

        let ws = manager.acquire(&repo()).unwrap();
        assert!(ws.path().starts_with(&nested));
    }
}
