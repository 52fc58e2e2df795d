use anyhow::Result;
use console::{style, Emoji};

use super::tree::clone_spinner;
use crate::emit::FilesOutput;
use crate::ingest::Ingestor;
use crate::types::{FileContent, RepositoryRef};

static FILE: Emoji<'_, '_> = Emoji("📄 ", "");
static MISSING: Emoji<'_, '_> = Emoji("❌ ", "");

pub async fn run_read(ingestor: &Ingestor, repo_url: &str, paths: &[String], json: bool) -> Result<()> {
    let pb = clone_spinner(repo_url);
    let result = ingestor.get_important_files(repo_url, paths).await;
    pb.finish_and_clear();
    let files = result?;

    if json {
        let repo = RepositoryRef::new(repo_url);
        println!("{}", FilesOutput::new(repo.url(), &files).to_json());
        return Ok(());
    }

    for (path, content) in files.iter() {
        match content {
            FileContent::Text(text) => {
                println!("{}{}", FILE, style(path).green().bold());
                println!("{}", style("─".repeat(60)).dim());
                print!("{}", text);
                if !text.ends_with('\n') {
                    println!();
                }
                println!();
            }
            FileContent::Error(e) => {
                println!("{}{} {}", MISSING, style(path).red().bold(), style(e).dim());
                println!();
            }
        }
    }

    Ok(())
}
