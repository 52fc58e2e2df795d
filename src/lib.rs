//! Repository ingestion for AI agents.
//!
//! Clones a remote repository into a throwaway workspace, then either
//! mirrors its directory tree or reads a caller-chosen set of files.
//! The [`Ingestor`] is the entry point; [`cli`] wraps it in an MCP server
//! and a small command-line interface.

pub mod cli;
pub mod config;
pub mod emit;
pub mod error;
pub mod ingest;
pub mod scan;
pub mod types;

pub use config::Config;
pub use error::{FetchError, IngestError, ReadError};
pub use ingest::Ingestor;
pub use types::{FileContent, FileContentResult, NodeKind, RepositoryRef, TreeNode};
