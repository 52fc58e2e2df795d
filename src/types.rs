use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::ReadError;

/// `owner/repo` with no scheme or host, as typed by people who live on GitHub
static GITHUB_SHORTHAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]*/[A-Za-z0-9._-]+$").unwrap());

/// A remote repository as handed over by the caller.
///
/// Only the GitHub shorthand is rewritten, and only when no local path of
/// that name exists; anything else goes to the fetch mechanism untouched
/// and fails there if it is not clonable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    url: String,
}

impl RepositoryRef {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        let url = if GITHUB_SHORTHAND.is_match(trimmed) && !Path::new(trimmed).exists() {
            format!("https://github.com/{}.git", trimmed.trim_end_matches(".git"))
        } else {
            trimmed.to_string()
        };
        Self { url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Last path segment without `.git`, used as the name of the tree root.
    /// "https://github.com/owner/repo.git" → "repo"
    /// "git@github.com:owner/repo" → "repo"
    pub fn name(&self) -> String {
        let stripped = self.url.trim_end_matches('/');
        let last = stripped
            .rsplit(['/', ':', '\\'])
            .next()
            .unwrap_or(stripped);
        let name = last.trim_end_matches(".git");
        if name.is_empty() {
            "repository".to_string()
        } else {
            name.to_string()
        }
    }
}

impl std::fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File,
}

/// One filesystem entry relative to the workspace root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub name: String,
    pub kind: NodeKind,
    /// `None` for files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory,
            children: Some(Vec::new()),
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
            children: None,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn children(&self) -> &[TreeNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Append a child. Ignored for file nodes, which never have children.
    pub fn push(&mut self, child: TreeNode) {
        if let Some(children) = self.children.as_mut() {
            children.push(child);
        }
    }

    /// Number of file leaves in this subtree
    pub fn file_count(&self) -> usize {
        match self.kind {
            NodeKind::File => 1,
            NodeKind::Directory => self.children().iter().map(TreeNode::file_count).sum(),
        }
    }

    /// Number of directories below this node, not counting itself
    pub fn dir_count(&self) -> usize {
        self.children()
            .iter()
            .filter(|c| c.is_dir())
            .map(|c| 1 + c.dir_count())
            .sum()
    }

    /// Look up a descendant by a `/`-separated path relative to this node
    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        let mut current = self;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            current = current.children().iter().find(|c| c.name == part)?;
        }
        Some(current)
    }
}

/// Outcome of reading a single requested path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Error(ReadError),
}

impl FileContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FileContent::Text(text) => Some(text),
            FileContent::Error(_) => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FileContent::Error(ReadError::NotFound))
    }
}

impl Serialize for FileContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FileContent::Text(text) => serializer.serialize_str(text),
            FileContent::Error(err) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("error", err.kind())?;
                map.serialize_entry("message", &err.to_string())?;
                map.end()
            }
        }
    }
}

/// Requested path → content, in request order.
///
/// Stored as a list rather than a map: duplicates in the request are
/// answered once per occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileContentResult {
    entries: Vec<(String, FileContent)>,
}

impl FileContentResult {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, path: String, content: FileContent) {
        self.entries.push((path, content));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileContent)> {
        self.entries.iter().map(|(p, c)| (p.as_str(), c))
    }

    /// First entry for `path`
    pub fn get(&self, path: &str) -> Option<&FileContent> {
        self.entries.iter().find(|(p, _)| p == path).map(|(_, c)| c)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Serialize for FileContentResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, content) in &self.entries {
            map.serialize_entry(path, content)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_ref_shorthand() {
        let repo = RepositoryRef::new("rust-lang/cargo");
        assert_eq!(repo.url(), "https://github.com/rust-lang/cargo.git");
        assert_eq!(repo.name(), "cargo");
    }

    #[test]
    fn test_repository_ref_passthrough() {
        assert_eq!(
            RepositoryRef::new(" https://gitlab.com/a/b ").url(),
            "https://gitlab.com/a/b"
        );
        assert_eq!(
            RepositoryRef::new("git@github.com:owner/repo.git").url(),
            "git@github.com:owner/repo.git"
        );
        assert_eq!(RepositoryRef::new("./local/repo").url(), "./local/repo");
        assert_eq!(RepositoryRef::new("not a url").url(), "not a url");
    }

    #[test]
    fn test_existing_relative_path_is_not_shorthand() {
        // tests run from the package root, where `src/scan` exists
        assert!(Path::new("src/scan").is_dir());
        assert_eq!(RepositoryRef::new("src/scan").url(), "src/scan");
        assert_eq!(RepositoryRef::new("src/scan").name(), "scan");
    }

    #[test]
    fn test_repository_name() {
        assert_eq!(RepositoryRef::new("git@github.com:owner/repo.git").name(), "repo");
        assert_eq!(RepositoryRef::new("https://host/x/y/").name(), "y");
        assert_eq!(RepositoryRef::new("").name(), "repository");
    }

    #[test]
    fn test_tree_counts() {
        let mut src = TreeNode::directory("src");
        src.push(TreeNode::file("main.rs"));
        src.push(TreeNode::file("lib.rs"));
        let mut root = TreeNode::directory("repo");
        root.push(TreeNode::file("README.md"));
        root.push(src);
        root.push(TreeNode::directory("empty"));

        assert_eq!(root.file_count(), 3);
        assert_eq!(root.dir_count(), 2);
        assert_eq!(root.find("src/lib.rs").map(|n| n.kind), Some(NodeKind::File));
        assert!(root.find("src/nope.rs").is_none());
    }

    #[test]
    fn test_file_node_has_no_children() {
        let mut file = TreeNode::file("a.txt");
        file.push(TreeNode::file("b.txt"));
        assert!(file.children().is_empty());
        assert!(file.children.is_none());

        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json, serde_json::json!({"name": "a.txt", "kind": "file"}));
    }

    #[test]
    fn test_result_serializes_in_request_order() {
        let mut result = FileContentResult::default();
        result.push("b.txt".into(), FileContent::Text("bee".into()));
        result.push("a.txt".into(), FileContent::Error(ReadError::NotFound));

        let json = result.to_json();
        let b = json.find("b.txt").unwrap();
        let a = json.find("a.txt").unwrap();
        assert!(b < a);
        assert!(json.contains("\"not_found\""));
    }

    #[test]
    fn test_result_keeps_duplicates() {
        let mut result = FileContentResult::default();
        result.push("x".into(), FileContent::Text("1".into()));
        result.push("x".into(), FileContent::Text("1".into()));

        assert_eq!(result.len(), 2);
        assert_eq!(result.to_json().matches("\"x\"").count(), 2);
    }
}
