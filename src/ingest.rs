//! The two operations exposed to agents.
//!
//! Each call gets a workspace of its own: acquire, fetch, read, release.
//! Nothing is shared between calls except the fetcher and configuration,
//! so concurrent callers need no locking. Walking, reading and removing the
//! workspace run on tokio's blocking pool.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::IngestError;
use crate::scan::{FileReader, Fetcher, GitFetcher, TreeBuilder, WorkspaceManager};
use crate::types::{FileContentResult, RepositoryRef, TreeNode};

#[derive(Clone)]
pub struct Ingestor {
    fetcher: Arc<dyn Fetcher>,
    workspaces: WorkspaceManager,
    tree: TreeBuilder,
    reader: FileReader,
}

impl Ingestor {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: &Config) -> Self {
        Self {
            fetcher,
            workspaces: WorkspaceManager::new(config.workspace.temp_root.clone()),
            tree: TreeBuilder::new(config.tree.follow_symlinks),
            reader: FileReader::new(config.read.size_limit()),
        }
    }

    /// Ingestor backed by the host `git` binary
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(GitFetcher::from_config(&config.git)), config)
    }

    /// Clone `repo_url` and mirror its working tree
    pub async fn get_directory_structure(&self, repo_url: &str) -> Result<TreeNode, IngestError> {
        let repo = RepositoryRef::new(repo_url);
        let started = Instant::now();

        let builder = self.tree;
        let root_name = repo.name();
        let tree = self
            .with_workspace(&repo, move |root| Ok(builder.build(root, &root_name)?))
            .await?;

        info!(
            repo = %repo,
            files = tree.file_count(),
            dirs = tree.dir_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "directory structure ready"
        );
        Ok(tree)
    }

    /// Clone `repo_url` and return the contents of `file_paths`, one entry per
    /// requested path in request order
    pub async fn get_important_files<S>(
        &self,
        repo_url: &str,
        file_paths: &[S],
    ) -> Result<FileContentResult, IngestError>
    where
        S: AsRef<str> + Sync,
    {
        let repo = RepositoryRef::new(repo_url);
        let started = Instant::now();

        let reader = self.reader;
        let paths: Vec<String> = file_paths.iter().map(|p| p.as_ref().to_string()).collect();
        let result = self
            .with_workspace(&repo, move |root| Ok(reader.read_many(root, paths.as_slice())))
            .await?;

        let found = result.iter().filter(|(_, c)| c.as_text().is_some()).count();
        info!(
            repo = %repo,
            requested = result.len(),
            found,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "files read"
        );
        Ok(result)
    }

    async fn with_workspace<T, F>(&self, repo: &RepositoryRef, read: F) -> Result<T, IngestError>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T, IngestError> + Send + 'static,
    {
        let workspace = self
            .workspaces
            .acquire(repo)
            .map_err(IngestError::Workspace)?;

        // the workspace also cleans up on drop if this future is cancelled
        let outcome = match self.fetcher.fetch(repo, workspace.path()).await {
            Ok(()) => {
                let root = workspace.path().to_path_buf();
                tokio::task::spawn_blocking(move || read(&root))
                    .await
                    .map_err(IngestError::from)
                    .and_then(|inner| inner)
            }
            Err(e) => {
                warn!(repo = %repo, cause = %e.cause, "fetch failed");
                Err(e.into())
            }
        };

        if let Err(e) = tokio::task::spawn_blocking(move || workspace.release()).await {
            error!(repo = %repo, error = %e, "workspace release task failed");
        }
        outcome
    }
}
