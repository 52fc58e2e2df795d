use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::filter::should_include_entry;
use crate::types::TreeNode;

/// Mirrors a directory on disk as a [`TreeNode`].
///
/// Children are sorted by file name so repeated walks of the same tree
/// compare equal regardless of how the filesystem lists them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder {
    follow_symlinks: bool,
}

impl TreeBuilder {
    pub fn new(follow_symlinks: bool) -> Self {
        Self { follow_symlinks }
    }

    /// Walk `root` depth-first. The returned root node is named `root_name`.
    ///
    /// Entries below the root that cannot be read are left out, as are
    /// symlinks that lead back into one of their own ancestors or resolve
    /// outside `root`. Only an unreadable root is an error.
    pub fn build(&self, root: &Path, root_name: &str) -> Result<TreeNode, walkdir::Error> {
        let follow = self.follow_symlinks;
        let canonical_root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let walker = WalkDir::new(root)
            .follow_links(follow)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| {
                if e.depth() == 0 {
                    return true;
                }
                if !should_include_entry(e.file_name()) {
                    return false;
                }
                if !e.path_is_symlink() {
                    return true;
                }
                follow && link_stays_inside(e.path(), &canonical_root)
            });

        // stack[d] is the open directory at depth d
        let mut stack: Vec<TreeNode> = vec![TreeNode::directory(root_name)];

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(e),
                Err(e) => {
                    if let Some(ancestor) = e.loop_ancestor() {
                        debug!(
                            path = ?e.path(),
                            ancestor = %ancestor.display(),
                            "symlink cycle truncated"
                        );
                    } else {
                        warn!(error = %e, "skipping unreadable entry");
                    }
                    continue;
                }
            };

            let depth = entry.depth();
            if depth == 0 {
                continue;
            }

            while stack.len() > depth {
                close_top(&mut stack);
            }

            let name = entry.file_name().to_string_lossy().to_string();
            let file_type = entry.file_type();
            if file_type.is_dir() {
                stack.push(TreeNode::directory(name));
            } else if file_type.is_file() {
                if let Some(parent) = stack.last_mut() {
                    parent.push(TreeNode::file(name));
                }
            }
        }

        while stack.len() > 1 {
            close_top(&mut stack);
        }

        // stack always keeps the root
        Ok(stack.pop().unwrap_or_else(|| TreeNode::directory(root_name)))
    }
}

/// Only links whose target resolves under the root are walked
fn link_stays_inside(link: &Path, canonical_root: &Path) -> bool {
    match link.canonicalize() {
        Ok(target) if target.starts_with(canonical_root) => true,
        Ok(target) => {
            debug!(
                path = %link.display(),
                target = %target.display(),
                "symlink leaves workspace, skipped"
            );
            false
        }
        Err(e) => {
            debug!(path = %link.display(), error = %e, "dangling symlink skipped");
            false
        }
    }
}

fn close_top(stack: &mut Vec<TreeNode>) {
    if let Some(done) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.push(done);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeKind;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("README.md"), "# hi").unwrap();
        fs::create_dir_all(root.join("src/util")).unwrap();
        fs::write(root.join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("src/util/mod.rs"), "").unwrap();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::write(root.join(".git/HEAD"), "ref: refs/heads/main").unwrap();
        fs::create_dir_all(root.join(".github/workflows")).unwrap();
        fs::write(root.join(".github/workflows/ci.yml"), "on: push").unwrap();
        fs::write(root.join(".gitignore"), "target/").unwrap();
        dir
    }

    fn names(node: &TreeNode) -> Vec<&str> {
        node.children().iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_builds_sorted_nested_tree() {
        let dir = fixture();
        let tree = TreeBuilder::default().build(dir.path(), "repo").unwrap();

        assert_eq!(tree.name, "repo");
        assert_eq!(tree.kind, NodeKind::Directory);
        assert_eq!(names(&tree), vec![".github", ".gitignore", "README.md", "src"]);

        let src = tree.find("src").unwrap();
        assert_eq!(names(src), vec!["main.rs", "util"]);
        assert_eq!(tree.find("src/util/mod.rs").unwrap().kind, NodeKind::File);
    }

    #[test]
    fn test_excludes_git_metadata() {
        let dir = fixture();
        let tree = TreeBuilder::default().build(dir.path(), "repo").unwrap();

        assert!(tree.find(".git").is_none());
        assert_eq!(tree.file_count(), 5);
    }

    #[test]
    fn test_leaf_count_matches_regular_files() {
        let dir = fixture();
        let tree = TreeBuilder::default().build(dir.path(), "repo").unwrap();

        let on_disk = WalkDir::new(dir.path())
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git")
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .count();
        assert_eq!(tree.file_count(), on_disk);
    }

    #[test]
    fn test_empty_directory_is_kept() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();

        let tree = TreeBuilder::default().build(dir.path(), "repo").unwrap();
        let empty = tree.find("empty").unwrap();
        assert!(empty.is_dir());
        assert!(empty.children().is_empty());
    }

    #[test]
    fn test_rebuild_is_identical() {
        let dir = fixture();
        let builder = TreeBuilder::default();
        let a = builder.build(dir.path(), "repo").unwrap();
        let b = builder.build(dir.path(), "repo").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_root_is_error() {
        let dir = TempDir::new().unwrap();
        let result = TreeBuilder::default().build(&dir.path().join("gone"), "repo");
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_skipped_by_default() {
        let dir = fixture();
        std::os::unix::fs::symlink(dir.path().join("src"), dir.path().join("link")).unwrap();

        let tree = TreeBuilder::default().build(dir.path(), "repo").unwrap();
        assert!(tree.find("link").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_is_truncated() {
        let dir = fixture();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("src/loop")).unwrap();

        let tree = TreeBuilder::new(true).build(dir.path(), "repo").unwrap();
        assert!(tree.find("src/main.rs").is_some());
        assert!(tree.find("src/loop").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_followed_symlink_inside_root_is_expanded() {
        let dir = fixture();
        std::os::unix::fs::symlink(dir.path().join("src/util"), dir.path().join("util")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("README.md"), dir.path().join("README")).unwrap();

        let tree = TreeBuilder::new(true).build(dir.path(), "repo").unwrap();
        assert_eq!(tree.find("util/mod.rs").map(|n| n.kind), Some(NodeKind::File));
        assert_eq!(tree.find("README").map(|n| n.kind), Some(NodeKind::File));
    }

    #[cfg(unix)]
    #[test]
    fn test_followed_symlink_outside_root_is_truncated() {
        let dir = fixture();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("vendored.txt"), "v").unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("vendor")).unwrap();
        std::os::unix::fs::symlink(outside.path().join("vendored.txt"), dir.path().join("leak.txt"))
            .unwrap();

        let tree = TreeBuilder::new(true).build(dir.path(), "repo").unwrap();
        assert!(tree.find("vendor").is_none());
        assert!(tree.find("leak.txt").is_none());
        assert_eq!(tree.file_count(), 5);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_skipped() {
        let dir = fixture();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("broken")).unwrap();

        let tree = TreeBuilder::new(true).build(dir.path(), "repo").unwrap();
        assert!(tree.find("broken").is_none());
        assert_eq!(tree.file_count(), 5);
    }
}
