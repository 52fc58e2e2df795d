use crate::types::TreeNode;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Render a tree the way `tree(1)` does. Directories get a trailing `/`.
///
/// ```text
/// demo/
/// ├── README.md
/// └── src/
///     └── main.rs
/// ```
pub fn render_tree(root: &TreeNode) -> String {
    let mut output = String::new();
    output.push_str(&label(root));
    output.push('\n');
    render_children(root, "", &mut output);
    output
}

fn render_children(node: &TreeNode, prefix: &str, output: &mut String) {
    let children = node.children();
    for (i, child) in children.iter().enumerate() {
        let is_last = i + 1 == children.len();
        let (branch, next) = if is_last {
            (LAST_BRANCH, SPACE)
        } else {
            (BRANCH, PIPE)
        };

        output.push_str(prefix);
        output.push_str(branch);
        output.push_str(&label(child));
        output.push('\n');

        if child.is_dir() {
            render_children(child, &format!("{}{}", prefix, next), output);
        }
    }
}

fn label(node: &TreeNode) -> String {
    if node.is_dir() {
        format!("{}/", node.name)
    } else {
        node.name.clone()
    }
}
