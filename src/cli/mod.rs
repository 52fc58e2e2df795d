mod args;
mod read;
mod serve;
mod tree;

pub use args::{Args, Command};
pub use read::run_read;
pub use serve::{run_mcp_server, IngestServer};
pub use tree::run_tree;
