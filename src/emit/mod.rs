mod json;
mod tree;

pub use json::{FilesOutput, RepositoryInfo, TreeOutput};
pub use tree::render_tree;
