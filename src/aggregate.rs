//! Grouped views over name-resolved commit records.
//!
//! Every view counts records, not distinct hashes: a commit reachable from
//! two branches contributes to both. All measures are integer sums.

use crate::model::{CommitRecord, Environment};
use crate::util::month_key;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measures {
    pub files_changed: u64,
    pub insertions: u64,
    pub deletions: u64,
    pub total_lines: u64,
    pub commits: u64,
}

impl Measures {
    pub fn add(&mut self, record: &CommitRecord) {
        self.files_changed += record.files_changed;
        self.insertions += record.insertions;
        self.deletions += record.deletions;
        self.total_lines += record.total_lines();
        self.commits += 1;
    }

    pub fn merge(&mut self, other: &Measures) {
        self.files_changed += other.files_changed;
        self.insertions += other.insertions;
        self.deletions += other.deletions;
        self.total_lines += other.total_lines;
        self.commits += other.commits;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAuthorRow {
    pub date: NaiveDate,
    pub author_email: String,
    pub author_name: String,
    pub branch: String,
    pub environment: Environment,
    #[serde(flatten)]
    pub measures: Measures,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAuthorRow {
    pub month: String,
    pub author_email: String,
    pub author_name: String,
    pub branch: String,
    pub environment: Environment,
    #[serde(flatten)]
    pub measures: Measures,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchAuthorRow {
    pub branch: String,
    pub environment: Environment,
    pub author_email: String,
    pub author_name: String,
    #[serde(flatten)]
    pub measures: Measures,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotalRow {
    pub date: NaiveDate,
    pub environment: Environment,
    #[serde(flatten)]
    pub measures: Measures,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotalRow {
    pub month: String,
    pub environment: Environment,
    #[serde(flatten)]
    pub measures: Measures,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentRow {
    pub environment: Environment,
    #[serde(flatten)]
    pub measures: Measures,
    pub branches: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummaryRow {
    pub author_email: String,
    pub author_name: String,
    pub environment: Environment,
    #[serde(flatten)]
    pub measures: Measures,
    pub branches: u64,
}

/// All grouped views of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregates {
    pub daily: Vec<DailyAuthorRow>,
    pub monthly: Vec<MonthlyAuthorRow>,
    pub by_branch: Vec<BranchAuthorRow>,
    pub author_summary: Vec<AuthorSummaryRow>,
    pub daily_totals: Vec<DailyTotalRow>,
    pub monthly_totals: Vec<MonthlyTotalRow>,
    pub environments: Vec<EnvironmentRow>,
}

struct Group {
    name: String,
    email: String,
    measures: Measures,
    branches: BTreeSet<String>,
}

impl Group {
    fn new(record: &CommitRecord) -> Self {
        Self {
            name: record.author_name.clone(),
            email: record.author_email.clone(),
            measures: Measures::default(),
            branches: BTreeSet::new(),
        }
    }

    fn add(&mut self, record: &CommitRecord) {
        self.measures.add(record);
        if !self.branches.contains(&record.branch) {
            self.branches.insert(record.branch.clone());
        }
    }
}

fn group_by<K, F>(records: &[CommitRecord], key: F) -> BTreeMap<K, Group>
where
    K: Ord,
    F: Fn(&CommitRecord) -> K,
{
    let mut groups: BTreeMap<K, Group> = BTreeMap::new();
    for record in records {
        groups
            .entry(key(record))
            .or_insert_with(|| Group::new(record))
            .add(record);
    }
    groups
}

impl Aggregates {
    /// Builds every view. Records must already carry canonical author names.
    pub fn compute(records: &[CommitRecord]) -> Self {
        Self {
            daily: daily_by_author(records),
            monthly: monthly_by_author(records),
            by_branch: by_branch(records),
            author_summary: author_summary(records),
            daily_totals: daily_totals(records),
            monthly_totals: monthly_totals(records),
            environments: environments(records),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.daily.is_empty()
    }

    pub fn grand_total(&self) -> Measures {
        let mut total = Measures::default();
        for row in &self.environments {
            total.merge(&row.measures);
        }
        total
    }
}

pub fn daily_by_author(records: &[CommitRecord]) -> Vec<DailyAuthorRow> {
    group_by(records, |r| {
        (r.date(), r.author_key().to_string(), r.branch.clone(), r.environment)
    })
    .into_iter()
    .map(|((date, _, branch, environment), group)| DailyAuthorRow {
        date,
        author_email: group.email,
        author_name: group.name,
        branch,
        environment,
        measures: group.measures,
    })
    .collect()
}

pub fn monthly_by_author(records: &[CommitRecord]) -> Vec<MonthlyAuthorRow> {
    group_by(records, |r| {
        (month_key(&r.timestamp), r.author_key().to_string(), r.branch.clone(), r.environment)
    })
    .into_iter()
    .map(|((month, _, branch, environment), group)| MonthlyAuthorRow {
        month,
        author_email: group.email,
        author_name: group.name,
        branch,
        environment,
        measures: group.measures,
    })
    .collect()
}

pub fn by_branch(records: &[CommitRecord]) -> Vec<BranchAuthorRow> {
    group_by(records, |r| (r.branch.clone(), r.environment, r.author_key().to_string()))
        .into_iter()
        .map(|((branch, environment, _), group)| BranchAuthorRow {
            branch,
            environment,
            author_email: group.email,
            author_name: group.name,
            measures: group.measures,
        })
        .collect()
}

pub fn author_summary(records: &[CommitRecord]) -> Vec<AuthorSummaryRow> {
    group_by(records, |r| (r.author_key().to_string(), r.environment))
        .into_iter()
        .map(|((_, environment), group)| AuthorSummaryRow {
            author_email: group.email,
            author_name: group.name,
            environment,
            measures: group.measures,
            branches: group.branches.len() as u64,
        })
        .collect()
}

/// Newest day first; production before homologation within a day.
pub fn daily_totals(records: &[CommitRecord]) -> Vec<DailyTotalRow> {
    let mut rows: Vec<DailyTotalRow> = group_by(records, |r| (r.date(), r.environment))
        .into_iter()
        .map(|((date, environment), group)| DailyTotalRow {
            date,
            environment,
            measures: group.measures,
        })
        .collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date).then(a.environment.cmp(&b.environment)));
    rows
}

/// Newest month first; production before homologation within a month.
pub fn monthly_totals(records: &[CommitRecord]) -> Vec<MonthlyTotalRow> {
    let mut rows: Vec<MonthlyTotalRow> =
        group_by(records, |r| (month_key(&r.timestamp), r.environment))
            .into_iter()
            .map(|((month, environment), group)| MonthlyTotalRow {
                month,
                environment,
                measures: group.measures,
            })
            .collect();
    rows.sort_by(|a, b| b.month.cmp(&a.month).then(a.environment.cmp(&b.environment)));
    rows
}

pub fn environments(records: &[CommitRecord]) -> Vec<EnvironmentRow> {
    group_by(records, |r| r.environment)
        .into_iter()
        .map(|(environment, group)| EnvironmentRow {
            environment,
            measures: group.measures,
            branches: group.branches.len() as u64,
        })
        .collect()
}
