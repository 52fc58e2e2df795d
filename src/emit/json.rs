use serde::Serialize;

use crate::types::{FileContentResult, TreeNode};

/// Envelope for `tree --json` and the `json` tool format
#[derive(Serialize)]
pub struct TreeOutput<'a> {
    pub version: &'static str,
    pub repository: RepositoryInfo<'a>,
    pub tree: &'a TreeNode,
}

#[derive(Serialize)]
pub struct RepositoryInfo<'a> {
    pub url: &'a str,
    pub files_count: usize,
    pub dirs_count: usize,
}

impl<'a> TreeOutput<'a> {
    pub fn new(url: &'a str, tree: &'a TreeNode) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            repository: RepositoryInfo {
                url,
                files_count: tree.file_count(),
                dirs_count: tree.dir_count(),
            },
            tree,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Envelope for `read --json`
#[derive(Serialize)]
pub struct FilesOutput<'a> {
    pub version: &'static str,
    pub url: &'a str,
    pub files: &'a FileContentResult,
}

impl<'a> FilesOutput<'a> {
    pub fn new(url: &'a str, files: &'a FileContentResult) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            url,
            files,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
