use super::table::{Cell, Tabular};
use super::Metadata;
use crate::aggregate::Aggregates;
use crate::error::Result;
use log::debug;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::Path;

const HEADER_COLOR: u32 = 0x1F4E78;
const STRIPE_COLOR: u32 = 0xF5F5F5;
const AUTHOR_SECTION: u32 = 0xE6F3FF;
const ENVIRONMENT_SECTION: u32 = 0xE6FFE6;
const DAILY_SECTION: u32 = 0xFFE6E6;
const MONTHLY_SECTION: u32 = 0xFFF3E6;

/// Writes the multi-sheet workbook: a sectioned summary, three detail sheets
/// and an info sheet.
pub fn write_workbook(path: &Path, aggregates: &Aggregates, metadata: &Metadata) -> Result<()> {
    let mut workbook = Workbook::new();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        let mut row = 0;
        row = write_section(
            sheet,
            row,
            "SUMMARY BY AUTHOR AND ENVIRONMENT",
            &aggregates.author_summary,
            AUTHOR_SECTION,
        )?;
        row = write_section(
            sheet,
            row + 2,
            "SUMMARY BY ENVIRONMENT (PRD/HML)",
            &aggregates.environments,
            ENVIRONMENT_SECTION,
        )?;
        row = write_section(
            sheet,
            row + 2,
            "DAILY TOTALS",
            &aggregates.daily_totals,
            DAILY_SECTION,
        )?;
        write_section(
            sheet,
            row + 2,
            "MONTHLY TOTALS",
            &aggregates.monthly_totals,
            MONTHLY_SECTION,
        )?;
        sheet.autofit();
    }

    write_detail_sheet(workbook.add_worksheet(), "By Branch", &aggregates.by_branch)?;
    write_detail_sheet(workbook.add_worksheet(), "Daily", &aggregates.daily)?;
    write_detail_sheet(workbook.add_worksheet(), "Monthly", &aggregates.monthly)?;
    write_info_sheet(workbook.add_worksheet(), metadata)?;

    workbook.save(path)?;
    debug!("Workbook written to {}", path.display());
    Ok(())
}

/// Title row merged across the table width, then the table. Returns the last
/// row written.
fn write_section<T: Tabular>(
    sheet: &mut Worksheet,
    start: u32,
    title: &str,
    rows: &[T],
    color: u32,
) -> Result<u32> {
    let fill = Format::new().set_background_color(Color::RGB(color));
    let title_format = fill
        .clone()
        .set_bold()
        .set_font_size(12)
        .set_align(FormatAlign::Center);
    let header_format = fill.clone().set_bold();

    let last_col = (T::HEADERS.len() - 1) as u16;
    sheet.merge_range(start, 0, start, last_col, title, &title_format)?;

    write_header(sheet, start + 1, T::HEADERS, &header_format)?;
    for (offset, row) in rows.iter().enumerate() {
        write_cells(sheet, start + 2 + offset as u32, &row.cells(), &fill)?;
    }
    Ok(start + 1 + rows.len() as u32)
}

fn write_detail_sheet<T: Tabular>(sheet: &mut Worksheet, name: &str, rows: &[T]) -> Result<()> {
    sheet.set_name(name)?;

    let border = Format::new()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center);
    let header_format = border
        .clone()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_COLOR));
    let stripe = border.clone().set_background_color(Color::RGB(STRIPE_COLOR));

    write_header(sheet, 0, T::HEADERS, &header_format)?;
    for (offset, row) in rows.iter().enumerate() {
        let row_num = 1 + offset as u32;
        let format = if row_num % 2 == 0 { &stripe } else { &border };
        write_cells(sheet, row_num, &row.cells(), format)?;
    }

    if !rows.is_empty() {
        let last_col = (T::HEADERS.len() - 1) as u16;
        sheet.autofilter(0, 0, rows.len() as u32, last_col)?;
    }
    sheet.autofit();
    Ok(())
}

fn write_info_sheet(sheet: &mut Worksheet, metadata: &Metadata) -> Result<()> {
    sheet.set_name("Info")?;
    let bold = Format::new().set_bold();

    let names: Vec<&str> = metadata.author_names();
    let emails: Vec<&str> = metadata.authors.iter().map(|a| a.email.as_str()).collect();
    let entries = [
        (
            "Generated At",
            metadata.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ),
        ("Authors", names.join(", ")),
        ("Emails", emails.join(", ")),
        ("Repository", metadata.repository_path.clone()),
        ("Since", metadata.since.clone().unwrap_or_default()),
        ("Until", metadata.until.clone().unwrap_or_default()),
        ("Production Branches", metadata.production_branches.join(", ")),
    ];

    for (row, (label, value)) in entries.iter().enumerate() {
        sheet.write_string_with_format(row as u32, 0, *label, &bold)?;
        sheet.write_string(row as u32, 1, value)?;
    }
    sheet.autofit();
    Ok(())
}

fn write_header(sheet: &mut Worksheet, row: u32, headers: &[&str], format: &Format) -> Result<()> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(row, col as u16, *header, format)?;
    }
    Ok(())
}

fn write_cells(sheet: &mut Worksheet, row: u32, cells: &[Cell], format: &Format) -> Result<()> {
    for (col, cell) in cells.iter().enumerate() {
        let col = col as u16;
        match cell {
            Cell::Text(text) => {
                sheet.write_string_with_format(row, col, text, format)?;
            }
            Cell::Number(n) => {
                sheet.write_number_with_format(row, col, *n as f64, format)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregates;
    use crate::model::{Author, CommitRecord, Environment};
    use chrono::{TimeZone, Utc};

    fn record(branch: &str, day: u32) -> CommitRecord {
        CommitRecord {
            hash: "0123abcd".to_string(),
            author_name: "Ann".to_string(),
            author_email: "ann@x.com".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap(),
            branch: branch.to_string(),
            environment: Environment::from_branch(branch),
            files_changed: 2,
            insertions: 5,
            deletions: 1,
            message: Some("work".to_string()),
        }
    }

    #[test]
    fn workbook_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        let aggregates = Aggregates::compute(&[record("main", 2), record("develop", 3)]);
        let metadata = Metadata::new(
            dir.path(),
            vec![Author::new("Ann", "ann@x.com")],
            Utc::now(),
        );

        write_workbook(&path, &aggregates, &metadata).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn empty_tables_still_render() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        let metadata = Metadata::new(dir.path(), Vec::new(), Utc::now());

        write_workbook(&path, &Aggregates::default(), &metadata).unwrap();
        assert!(path.exists());
    }
}
