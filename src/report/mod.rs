pub mod console;
pub mod json;
pub mod table;
pub mod xlsx;

use crate::aggregate::Aggregates;
use crate::model::{Author, SCHEMA_VERSION};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use table::{Cell, Tabular};

pub const XLSX_PREFIX: &str = "git_report";
pub const JSON_PREFIX: &str = "git_metrics";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_path: String,
    pub authors: Vec<Author>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub production_branches: Vec<String>,
}

impl Metadata {
    pub fn new(repository: &Path, authors: Vec<Author>, generated_at: DateTime<Utc>) -> Self {
        Self {
            version: SCHEMA_VERSION,
            generated_at,
            repository_path: repository.to_string_lossy().to_string(),
            authors,
            since: None,
            until: None,
            production_branches: Vec::new(),
        }
    }

    pub fn author_names(&self) -> Vec<&str> {
        self.authors.iter().map(|a| a.name.as_str()).collect()
    }
}

/// The JSON export: a metadata block plus one entry per aggregated table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsDocument {
    pub metadata: Metadata,
    pub data: Aggregates,
}
