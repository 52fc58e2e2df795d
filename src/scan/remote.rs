use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::config::GitConfig;
use crate::error::FetchError;
use crate::types::RepositoryRef;

/// Materializes a remote repository's working tree into an empty directory
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, repo: &RepositoryRef, dest: &Path) -> Result<(), FetchError>;
}

/// Clones with the host's `git` binary
#[derive(Debug, Clone)]
pub struct GitFetcher {
    binary: String,
    depth: u32,
}

impl Default for GitFetcher {
    fn default() -> Self {
        Self::from_config(&GitConfig::default())
    }
}

impl GitFetcher {
    pub fn from_config(config: &GitConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            depth: config.depth,
        }
    }

    fn clone_args(&self, url: &str, dest: &Path) -> Vec<String> {
        let mut args = vec![
            // ext:: would let a crafted URL run arbitrary commands
            "-c".to_string(),
            "protocol.ext.allow=never".to_string(),
            "clone".to_string(),
            "--quiet".to_string(),
            "--single-branch".to_string(),
        ];
        if self.depth > 0 {
            args.push("--depth".to_string());
            args.push(self.depth.to_string());
        }
        args.push("--".to_string());
        args.push(url.to_string());
        args.push(dest.to_string_lossy().to_string());
        args
    }
}

#[async_trait]
impl Fetcher for GitFetcher {
    async fn fetch(&self, repo: &RepositoryRef, dest: &Path) -> Result<(), FetchError> {
        if repo.url().is_empty() {
            return Err(FetchError::new("", "repository URL is empty"));
        }

        debug!(repo = %repo, dest = %dest.display(), depth = self.depth, "cloning");

        let mut command = Command::new(&self.binary);
        command
            .args(self.clone_args(repo.url(), dest))
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GCM_INTERACTIVE", "never")
            .stdin(Stdio::null())
            .kill_on_drop(true);
        // ssh prompts on the tty, not stdin; keep a user-provided command as is
        if std::env::var_os("GIT_SSH_COMMAND").is_none() {
            command.env("GIT_SSH_COMMAND", "ssh -o BatchMode=yes");
        }

        let output = command
            .output()
            .await
            .map_err(|e| FetchError::new(repo.url(), format!("failed to run {}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let cause = stderr.trim();
            let cause = if cause.is_empty() {
                format!("git exited with {}", output.status)
            } else {
                cause.to_string()
            };
            return Err(FetchError::new(repo.url(), cause));
        }

        Ok(())
    }
}
