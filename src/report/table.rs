use crate::aggregate::{
    AuthorSummaryRow, BranchAuthorRow, DailyAuthorRow, DailyTotalRow, EnvironmentRow, Measures,
    MonthlyAuthorRow, MonthlyTotalRow,
};
use crate::model::AuthorEntry;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Number(u64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => f.write_str(text),
            Cell::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::Text(text.to_string())
    }
}

/// A row type with fixed column names, shared by every renderer.
pub trait Tabular {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<Cell>;
}

const MEASURE_HEADERS: [&str; 5] = ["Files Changed", "Insertions", "Deletions", "Total Lines", "Commits"];

fn push_measures(cells: &mut Vec<Cell>, m: &Measures) {
    cells.extend([
        Cell::Number(m.files_changed),
        Cell::Number(m.insertions),
        Cell::Number(m.deletions),
        Cell::Number(m.total_lines),
        Cell::Number(m.commits),
    ]);
}

impl Tabular for DailyAuthorRow {
    const HEADERS: &'static [&'static str] = &[
        "Date",
        "Author",
        "Email",
        "Branch",
        "Environment",
        MEASURE_HEADERS[0],
        MEASURE_HEADERS[1],
        MEASURE_HEADERS[2],
        MEASURE_HEADERS[3],
        MEASURE_HEADERS[4],
    ];

    fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![
            Cell::Text(self.date.format("%Y-%m-%d").to_string()),
            self.author_name.as_str().into(),
            self.author_email.as_str().into(),
            self.branch.as_str().into(),
            self.environment.label().into(),
        ];
        push_measures(&mut cells, &self.measures);
        cells
    }
}

impl Tabular for MonthlyAuthorRow {
    const HEADERS: &'static [&'static str] = &[
        "Month",
        "Author",
        "Email",
        "Branch",
        "Environment",
        MEASURE_HEADERS[0],
        MEASURE_HEADERS[1],
        MEASURE_HEADERS[2],
        MEASURE_HEADERS[3],
        MEASURE_HEADERS[4],
    ];

    fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![
            self.month.as_str().into(),
            self.author_name.as_str().into(),
            self.author_email.as_str().into(),
            self.branch.as_str().into(),
            self.environment.label().into(),
        ];
        push_measures(&mut cells, &self.measures);
        cells
    }
}

impl Tabular for BranchAuthorRow {
    const HEADERS: &'static [&'static str] = &[
        "Branch",
        "Environment",
        "Author",
        "Email",
        MEASURE_HEADERS[0],
        MEASURE_HEADERS[1],
        MEASURE_HEADERS[2],
        MEASURE_HEADERS[3],
        MEASURE_HEADERS[4],
    ];

    fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![
            self.branch.as_str().into(),
            self.environment.label().into(),
            self.author_name.as_str().into(),
            self.author_email.as_str().into(),
        ];
        push_measures(&mut cells, &self.measures);
        cells
    }
}

impl Tabular for AuthorSummaryRow {
    const HEADERS: &'static [&'static str] = &[
        "Author",
        "Email",
        "Environment",
        "Branches",
        MEASURE_HEADERS[0],
        MEASURE_HEADERS[1],
        MEASURE_HEADERS[2],
        MEASURE_HEADERS[3],
        MEASURE_HEADERS[4],
    ];

    fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![
            self.author_name.as_str().into(),
            self.author_email.as_str().into(),
            self.environment.label().into(),
            Cell::Number(self.branches),
        ];
        push_measures(&mut cells, &self.measures);
        cells
    }
}

impl Tabular for EnvironmentRow {
    const HEADERS: &'static [&'static str] = &[
        "Environment",
        "Branches",
        MEASURE_HEADERS[0],
        MEASURE_HEADERS[1],
        MEASURE_HEADERS[2],
        MEASURE_HEADERS[3],
        MEASURE_HEADERS[4],
    ];

    fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![self.environment.label().into(), Cell::Number(self.branches)];
        push_measures(&mut cells, &self.measures);
        cells
    }
}

impl Tabular for DailyTotalRow {
    const HEADERS: &'static [&'static str] = &[
        "Date",
        "Environment",
        MEASURE_HEADERS[0],
        MEASURE_HEADERS[1],
        MEASURE_HEADERS[2],
        MEASURE_HEADERS[3],
        MEASURE_HEADERS[4],
    ];

    fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![
            Cell::Text(self.date.format("%Y-%m-%d").to_string()),
            self.environment.label().into(),
        ];
        push_measures(&mut cells, &self.measures);
        cells
    }
}

impl Tabular for MonthlyTotalRow {
    const HEADERS: &'static [&'static str] = &[
        "Month",
        "Environment",
        MEASURE_HEADERS[0],
        MEASURE_HEADERS[1],
        MEASURE_HEADERS[2],
        MEASURE_HEADERS[3],
        MEASURE_HEADERS[4],
    ];

    fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![self.month.as_str().into(), self.environment.label().into()];
        push_measures(&mut cells, &self.measures);
        cells
    }
}

impl Tabular for AuthorEntry {
    const HEADERS: &'static [&'static str] = &["Author", "Email", "Commits"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.name.as_str().into(),
            self.email.as_str().into(),
            Cell::Number(self.commits),
        ]
    }
}
