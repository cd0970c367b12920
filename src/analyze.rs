use crate::aggregate::Aggregates;
use crate::cli::CommonArgs;
use crate::config::Settings;
use crate::environment::EnvironmentClassifier;
use crate::error::{MetricsError, Result};
use crate::git::{CommitFilter, GitRepo};
use crate::identity::{resolve_names, select_authors, AuthorPolicy, IdentityResolver, Selection};
use crate::model::Author;
use crate::report::{self, Metadata, MetricsDocument};
use crate::util::report_file_name;
use anyhow::Context;
use chrono::Utc;
use console::style;
use log::info;
use std::fs;
use std::path::PathBuf;

/// What one analysis run should look at.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub authors: Vec<String>,
    pub policy: AuthorPolicy,
    pub since: Option<String>,
    pub until: Option<String>,
    pub production_branches: Vec<String>,
}

/// How the authors of a run were chosen.
#[derive(Debug, Clone)]
pub enum AuthorScope {
    Requested(Vec<Selection>),
    Recent(Author),
    All,
}

pub struct Analysis {
    pub scope: AuthorScope,
    pub authors: Vec<Author>,
    pub aggregates: Aggregates,
    pub metadata: Metadata,
}

impl Analysis {
    pub fn document(&self) -> MetricsDocument {
        MetricsDocument {
            metadata: self.metadata.clone(),
            data: self.aggregates.clone(),
        }
    }
}

/// Runs the whole pipeline: author selection, commit collection, name
/// resolution and aggregation. Returns [`MetricsError::NoData`] when nothing
/// matches the filters.
pub fn run(repo: &GitRepo, request: &AnalysisRequest, show_progress: bool) -> Result<Analysis> {
    let range = repo.resolve_range(request.since.as_deref(), request.until.as_deref())?;
    let classifier = EnvironmentClassifier::new(&request.production_branches);

    let scope = if !request.authors.is_empty() {
        let known = repo.scan_authors()?.authors();
        AuthorScope::Requested(select_authors(&request.authors, &known))
    } else {
        match request.policy {
            AuthorPolicy::Recent => AuthorScope::Recent(repo.recent_author()?),
            AuthorPolicy::All => AuthorScope::All,
        }
    };

    let mut filter = CommitFilter::new(range);
    match &scope {
        AuthorScope::Requested(selections) => {
            filter = filter.with_authors(selections.iter().map(|s| s.author().email.clone()));
        }
        AuthorScope::Recent(author) => {
            filter = filter.with_authors([author.email.clone()]);
        }
        AuthorScope::All => {}
    }

    let mut records = repo.collect_records(&classifier, &filter, show_progress)?;
    if records.is_empty() {
        return Err(MetricsError::NoData);
    }

    let resolver = resolve_names(&mut records);
    let authors = scope_authors(&scope, &resolver);
    let aggregates = Aggregates::compute(&records);
    info!(
        "Aggregated {} records for {} authors",
        records.len(),
        authors.len()
    );

    let mut metadata = Metadata::new(repo.path(), authors.clone(), Utc::now());
    metadata.since = request.since.clone();
    metadata.until = request.until.clone();
    metadata.production_branches = classifier.production_branches().to_vec();

    Ok(Analysis {
        scope,
        authors,
        aggregates,
        metadata,
    })
}

fn scope_authors(scope: &AuthorScope, resolver: &IdentityResolver) -> Vec<Author> {
    let canonical = |author: &Author| {
        let name = resolver
            .canonical_name(author.key())
            .unwrap_or(author.name.as_str())
            .to_string();
        Author::new(name, author.email.clone())
    };

    match scope {
        AuthorScope::Requested(selections) => selections
            .iter()
            .map(|s| s.author())
            .filter(|a| resolver.canonical_name(a.key()).is_some())
            .map(canonical)
            .collect(),
        AuthorScope::Recent(author) => vec![canonical(author)],
        AuthorScope::All => resolver
            .authors()
            .into_iter()
            .map(|entry| Author::new(entry.name, entry.email))
            .collect(),
    }
}

/// Report destinations chosen on the command line.
#[derive(Debug, Clone, Default)]
pub struct Outputs {
    pub json: bool,
    pub export_json: bool,
    pub reports_dir: Option<PathBuf>,
    pub xlsx: bool,
}

/// Files written by one run.
#[derive(Debug, Default)]
pub struct Artifacts {
    pub xlsx: Option<PathBuf>,
    pub json: Option<PathBuf>,
}

pub fn write_artifacts(
    analysis: &Analysis,
    reports_dir: &std::path::Path,
    xlsx: bool,
    json: bool,
) -> Result<Artifacts> {
    let mut artifacts = Artifacts::default();
    if !xlsx && !json {
        return Ok(artifacts);
    }

    fs::create_dir_all(reports_dir)?;
    let names = analysis.metadata.author_names();
    let generated_at = analysis.metadata.generated_at;

    if xlsx {
        let path = reports_dir.join(report_file_name(report::XLSX_PREFIX, &generated_at, &names, "xlsx"));
        report::xlsx::write_workbook(&path, &analysis.aggregates, &analysis.metadata)?;
        artifacts.xlsx = Some(path);
    }
    if json {
        let path = reports_dir.join(report_file_name(report::JSON_PREFIX, &generated_at, &names, "json"));
        report::json::write_document(&path, &analysis.document())?;
        artifacts.json = Some(path);
    }
    Ok(artifacts)
}

pub fn exec(common: CommonArgs, outputs: Outputs) -> anyhow::Result<()> {
    let settings = Settings::load(common.config.as_deref()).context("Failed to load configuration")?;
    let repo = GitRepo::open(common.repo.as_ref()).context("Failed to open git repository")?;

    let request = AnalysisRequest {
        authors: common.authors.clone(),
        policy: if common.all_authors {
            AuthorPolicy::All
        } else {
            settings.default_authors
        },
        since: common.since.clone(),
        until: common.until.clone(),
        production_branches: if common.production_branches.is_empty() {
            settings.production_branches.clone()
        } else {
            common.production_branches.clone()
        },
    };

    let analysis = match run(&repo, &request, !outputs.json) {
        Ok(analysis) => analysis,
        Err(MetricsError::NoData) => {
            println!("No commits found for the selected authors; no report was generated.");
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to analyse repository"),
    };

    report_scope(&analysis.scope);

    let reports_dir = outputs.reports_dir.unwrap_or(settings.reports_dir);
    let artifacts = write_artifacts(
        &analysis,
        &reports_dir,
        outputs.xlsx,
        outputs.export_json || settings.export_json,
    )
    .context("Failed to write reports")?;

    if outputs.json {
        report::json::print_document(&analysis.document())?;
        return Ok(());
    }

    println!(
        "{} {}",
        style("Git metrics for").bold(),
        style(repo.path().display()).cyan()
    );
    report::console::print_summary(&analysis.aggregates);

    println!();
    if let Some(path) = &artifacts.xlsx {
        println!("Spreadsheet report: {}", style(path.display()).green());
    }
    if let Some(path) = &artifacts.json {
        println!("JSON export: {}", style(path.display()).green());
    }
    Ok(())
}

fn report_scope(scope: &AuthorScope) {
    match scope {
        AuthorScope::Requested(selections) => {
            for selection in selections {
                match selection {
                    Selection::Exact(_) => {}
                    Selection::Partial { term, chosen } => eprintln!(
                        "{}",
                        style(format!("'{term}' matched partially; using {chosen}")).yellow()
                    ),
                    Selection::Unknown(author) => eprintln!(
                        "{}",
                        style(format!("No author matches '{}'", author.email)).yellow()
                    ),
                }
            }
        }
        AuthorScope::Recent(author) => eprintln!(
            "{}",
            style(format!("No author given; using most recent committer {author}")).yellow()
        ),
        AuthorScope::All => {}
    }
}
