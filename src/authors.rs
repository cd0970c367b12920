use crate::cli::CommonArgs;
use crate::git::GitRepo;
use crate::report;
use anyhow::{Context, Result};

pub fn exec(common: CommonArgs, json: bool) -> Result<()> {
    let repo = GitRepo::open(common.repo.as_ref()).context("Failed to open git repository")?;
    let authors = repo
        .scan_authors()
        .context("Failed to read repository authors")?
        .authors();

    if json {
        println!("{}", serde_json::to_string_pretty(&authors)?);
    } else if authors.is_empty() {
        println!("No authors found on local branches.");
    } else {
        report::console::print_authors(&authors);
    }
    Ok(())
}
