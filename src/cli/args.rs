use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "git-ingest")]
#[command(author, version, about = "Clone remote git repositories and hand their structure and files to AI agents")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file (defaults to <config dir>/git-ingest/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory to create per-call workspaces in
    #[arg(long, global = true, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Clone depth (0 = full history)
    #[arg(long, global = true)]
    pub depth: Option<u32>,

    /// Follow symbolic links when building the tree
    #[arg(long, global = true)]
    pub follow_symlinks: bool,

    /// Refuse to return files larger than this many bytes (0 = no limit)
    #[arg(long, global = true, value_name = "BYTES")]
    pub max_file_bytes: Option<u64>,

    /// More logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the MCP server on stdio (default)
    Serve,

    /// Print the directory structure of a repository
    Tree {
        /// Repository URL, or owner/repo for GitHub
        repo_url: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the contents of selected files
    Read {
        /// Repository URL, or owner/repo for GitHub
        repo_url: String,

        /// Paths relative to the repository root
        #[arg(required = true)]
        paths: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Args {
    /// Flags win over the config file
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.temp_dir {
            config.workspace.temp_root = Some(dir.clone());
        }
        if let Some(depth) = self.depth {
            config.git.depth = depth;
        }
        if self.follow_symlinks {
            config.tree.follow_symlinks = true;
        }
        if let Some(limit) = self.max_file_bytes {
            config.read.max_file_bytes = limit;
        }
    }

    /// Log filter from `-v`, falling back to the configured level
    pub fn log_filter(&self, config: &Config) -> String {
        match self.verbose {
            0 => config.logging.level.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }
}
