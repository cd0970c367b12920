use super::table::{Cell, Tabular};
use crate::aggregate::Aggregates;
use crate::model::AuthorEntry;
use console::style;

const RECENT_DAYS: usize = 7;
const RECENT_MONTHS: usize = 3;

/// Prints the summary tables; daily and monthly totals are cut to the most
/// recent periods.
pub fn print_summary(aggregates: &Aggregates) {
    let total = aggregates.grand_total();
    println!(
        "{} {} commits, {} files, {} insertions(+), {} deletions(-)",
        style("Total:").bold(),
        style(total.commits).cyan(),
        style(total.files_changed).cyan(),
        style(total.insertions).green(),
        style(total.deletions).red()
    );

    print_table("Summary by Author and Environment", &aggregates.author_summary, None);
    print_table("Summary by Environment", &aggregates.environments, None);
    print_table("Daily Totals", &aggregates.daily_totals, Some(RECENT_DAYS));
    print_table("Monthly Totals", &aggregates.monthly_totals, Some(RECENT_MONTHS));
}

pub fn print_authors(authors: &[AuthorEntry]) {
    print_table("Authors", authors, None);
}

pub fn print_table<T: Tabular>(title: &str, rows: &[T], limit: Option<usize>) {
    println!("\n{}", style(title).bold());

    let shown = limit.unwrap_or(rows.len()).min(rows.len());
    let cells: Vec<Vec<Cell>> = rows.iter().take(shown).map(|row| row.cells()).collect();

    let mut widths: Vec<usize> = T::HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (col, cell) in row.iter().enumerate() {
            let len = cell.to_string().chars().count();
            if let Some(width) = widths.get_mut(col) {
                *width = (*width).max(len);
            }
        }
    }

    let header: Vec<String> = T::HEADERS
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{:<w$}", h, w = *w))
        .collect();
    println!("{}", style(header.join("  ")).bold());
    println!("{}", "─".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| match cell {
                Cell::Text(text) => format!("{:<w$}", text, w = *w),
                Cell::Number(n) => format!("{:>w$}", n, w = *w),
            })
            .collect();
        println!("{}", line.join("  "));
    }

    if rows.len() > shown {
        println!("... and {} more rows", rows.len() - shown);
    }
}
