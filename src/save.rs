use crate::error::{MetricsError, Result};
use anyhow::Context;
use console::style;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Copies `report` into `dest`, creating the directory when needed, and
/// returns the path of the copy.
pub fn copy_report(report: &Path, dest: &Path) -> Result<PathBuf> {
    if !report.is_file() {
        return Err(MetricsError::PathNotFound(report.to_path_buf()));
    }
    let file_name = report
        .file_name()
        .ok_or_else(|| MetricsError::Parse(format!("No file name in {}", report.display())))?;

    fs::create_dir_all(dest)?;
    let target = dest.join(file_name);
    fs::copy(report, &target)?;
    info!("Copied {} to {}", report.display(), target.display());
    Ok(target)
}

pub fn exec(report: &Path, dest: &Path) -> anyhow::Result<()> {
    let target = copy_report(report, dest).context("Failed to save report")?;
    println!("Report saved to {}", style(target.display()).green());
    Ok(())
}
