use super::MetricsDocument;
use crate::error::Result;
use log::debug;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub fn write_document(path: &Path, document: &MetricsDocument) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, document)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    debug!("JSON export written to {}", path.display());
    Ok(())
}

pub fn print_document(document: &MetricsDocument) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(document)?);
    Ok(())
}
