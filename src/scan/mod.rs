mod filter;
mod reader;
pub mod remote;
mod walker;
mod workspace;

pub use filter::should_include_entry;
pub use reader::FileReader;
pub use remote::{Fetcher, GitFetcher};
pub use walker::TreeBuilder;
pub use workspace::{Workspace, WorkspaceManager};
