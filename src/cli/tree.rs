use anyhow::Result;
use console::{style, Emoji};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::emit::{render_tree, TreeOutput};
use crate::ingest::Ingestor;
use crate::types::RepositoryRef;

static CLONING: Emoji<'_, '_> = Emoji("📦 ", "");
static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "");

/// Spinner on stderr so stdout stays clean for piping
pub(crate) fn clone_spinner(repo_url: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("{}Cloning {}...", CLONING, repo_url));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub async fn run_tree(ingestor: &Ingestor, repo_url: &str, json: bool) -> Result<()> {
    let pb = clone_spinner(repo_url);
    let result = ingestor.get_directory_structure(repo_url).await;
    pb.finish_and_clear();
    let tree = result?;

    if json {
        let repo = RepositoryRef::new(repo_url);
        println!("{}", TreeOutput::new(repo.url(), &tree).to_json());
        return Ok(());
    }

    print!("{}", render_tree(&tree));
    eprintln!(
        "\n{}{} files, {} directories",
        INFO,
        style(tree.file_count()).green(),
        style(tree.dir_count()).cyan()
    );

    Ok(())
}
