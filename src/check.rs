use crate::cli::CommonArgs;
use crate::git::GitRepo;
use anyhow::{Context, Result};
use console::style;

pub fn exec(common: CommonArgs) -> Result<()> {
    let repo = GitRepo::open(common.repo.as_ref()).context("Failed to open git repository")?;
    let branches = repo
        .local_branches()
        .context("Failed to list local branches")?;

    println!(
        "{} {} is a git repository with {} local branch(es)",
        style("OK:").green().bold(),
        repo.path().display(),
        branches.len()
    );
    Ok(())
}
