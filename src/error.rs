use thiserror::Error;

/// The clone could not complete. Network, auth, a nonexistent repository
/// and a full disk all end up here with git's own explanation as the cause.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to clone repository {url}: {cause}")]
pub struct FetchError {
    pub url: String,
    pub cause: String,
}

impl FetchError {
    pub fn new(url: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cause: cause.into(),
        }
    }
}

/// Per-path failure reported inline in a `FileContentResult`
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReadError {
    #[error("file not found")]
    NotFound,

    #[error("path is a directory, not a file")]
    NotAFile,

    #[error("path escapes the repository root")]
    OutsideWorkspace,

    #[error("error reading file: {0}")]
    Unreadable(String),

    #[error("binary file ({size} bytes) not shown")]
    Binary { size: u64 },

    #[error("file is {size} bytes, above the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
}

impl ReadError {
    /// Stable machine-readable tag for serialized results
    pub fn kind(&self) -> &'static str {
        match self {
            ReadError::NotFound => "not_found",
            ReadError::NotAFile => "not_a_file",
            ReadError::OutsideWorkspace => "outside_workspace",
            ReadError::Unreadable(_) => "unreadable",
            ReadError::Binary { .. } => "binary",
            ReadError::TooLarge { .. } => "too_large",
        }
    }
}

/// Failure of a whole ingestion operation
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to create workspace: {0}")]
    Workspace(#[source] std::io::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to walk repository: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("workspace task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
