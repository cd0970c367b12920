use crate::environment::EnvironmentClassifier;
use crate::error::{MetricsError, Result};
use crate::identity::IdentityResolver;
use crate::model::{Author, CommitRecord, DateRange, DiffTotals};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use gix::object::tree::diff::ChangeDetached;
use gix::{ObjectId, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use similar::{ChangeTag, TextDiff};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const SHORT_HASH_LEN: usize = 8;

/// A local branch and the commit its reference points at.
#[derive(Debug, Clone)]
pub struct Branch {
    pub name: String,
    pub tip: ObjectId,
}

/// Which commits a walk keeps.
#[derive(Debug, Clone, Default)]
pub struct CommitFilter {
    /// Exact author emails; `None` keeps every author.
    pub authors: Option<HashSet<String>>,
    pub range: DateRange,
}

impl CommitFilter {
    pub fn new(range: DateRange) -> Self {
        Self {
            authors: None,
            range,
        }
    }

    pub fn with_authors<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = Some(emails.into_iter().map(Into::into).collect());
        self
    }

    pub fn keeps_author(&self, email: &str) -> bool {
        self.authors
            .as_ref()
            .map(|emails| emails.contains(email))
            .unwrap_or(true)
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Since,
    Until,
}

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open the repository at `path`, or the current dir if `None`.
    ///
    /// The directory itself must hold the `.git` metadata; parents are not
    /// searched.
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let repo_path = match path {
            Some(p) => p.as_ref().to_path_buf(),
            None => std::env::current_dir()?,
        };

        if !repo_path.exists() {
            return Err(MetricsError::PathNotFound(repo_path));
        }
        let repo_path = repo_path.canonicalize()?;
        if !repo_path.join(".git").exists() {
            return Err(MetricsError::NotARepository(repo_path));
        }

        let repo = gix::open(&repo_path)?;
        debug!("Opened git repository at {}", repo_path.display());

        Ok(Self {
            repo,
            path: repo_path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn resolve_range(&self, since: Option<&str>, until: Option<&str>) -> Result<DateRange> {
        let mut range = DateRange::new();

        let since_dt = if let Some(s) = since {
            Some(self.parse_commit_or_date(s, Bound::Since)?)
        } else {
            None
        };

        let until_dt = if let Some(u) = until {
            Some(self.parse_commit_or_date(u, Bound::Until)?)
        } else {
            None
        };

        if let (Some(s), Some(u)) = (since_dt, until_dt) {
            if s > u {
                return Err(MetricsError::InvalidDate(format!(
                    "Invalid range: since ({}) is after until ({})",
                    s, u
                )));
            }
        }

        if let Some(s) = since_dt {
            range = range.with_since(s);
        }
        if let Some(u) = until_dt {
            range = range.with_until(u);
        }

        Ok(range)
    }

    fn parse_commit_or_date(&self, input: &str, bound: Bound) -> Result<DateTime<Utc>> {
        // RFC3339
        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(dt.with_timezone(&Utc));
        }

        // YYYY-MM-DD, covering the whole day
        if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            let time = match bound {
                Bound::Since => date.and_hms_opt(0, 0, 0),
                Bound::Until => date.and_hms_opt(23, 59, 59),
            };
            if let Some(datetime) = time {
                return Ok(Utc.from_utc_datetime(&datetime));
            }
        }

        // Relative duration (e.g. "2 weeks ago")
        if let Some(duration) = parse_relative(input) {
            let now = SystemTime::now();
            let target = now
                .checked_sub(duration)
                .ok_or_else(|| MetricsError::InvalidDate(format!("Duration overflow for '{input}'")))?;
            return Ok(DateTime::<Utc>::from(target));
        }

        // Fallback to Git ref
        let id = self
            .repo
            .rev_parse_single(input)
            .map_err(|e| MetricsError::Parse(format!("Invalid commit or date '{input}': {e}")))?;

        let commit = id
            .object()
            .map_err(|e| MetricsError::Parse(format!("Cannot read '{input}': {e}")))?
            .try_into_commit()
            .map_err(|_| MetricsError::Parse(format!("Not a commit: {input}")))?;

        let secs = commit.time()?.seconds;
        DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| MetricsError::InvalidDate(format!("Invalid timestamp: {secs}")))
    }

    /// Local branches (`refs/heads/*`), sorted by name. Remote-tracking
    /// references are never included; branches whose tip cannot be resolved
    /// are skipped with a warning.
    pub fn local_branches(&self) -> Result<Vec<Branch>> {
        let references = self
            .repo
            .references()
            .map_err(|e| MetricsError::GitRepo(format!("Cannot read references: {e}")))?;
        let heads = references
            .local_branches()
            .map_err(|e| MetricsError::GitRepo(format!("Cannot list local branches: {e}")))?;

        let mut branches = Vec::new();
        for reference in heads {
            let mut reference = match reference {
                Ok(reference) => reference,
                Err(e) => {
                    warn!("Skipping unreadable branch reference: {e}");
                    continue;
                }
            };
            let name = reference.name().shorten().to_string();
            match reference.peel_to_id_in_place() {
                Ok(id) => branches.push(Branch {
                    name,
                    tip: id.detach(),
                }),
                Err(e) => warn!("Skipping branch {name}: cannot resolve tip: {e}"),
            }
        }

        branches.sort_by(|a, b| a.name.cmp(&b.name));
        debug!("Found {} local branches", branches.len());
        Ok(branches)
    }

    /// One record per (commit, branch) for every commit reachable from each
    /// local branch that passes `filter`.
    ///
    /// Within a branch records are newest first. A branch that fails to walk
    /// is skipped with a warning and never aborts the whole collection.
    pub fn collect_records(
        &self,
        classifier: &EnvironmentClassifier,
        filter: &CommitFilter,
        show_progress: bool,
    ) -> Result<Vec<CommitRecord>> {
        let branches = self.local_branches()?;

        let pb = if show_progress {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg} ({pos} commits)")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut memo: HashMap<ObjectId, DiffTotals> = HashMap::new();
        let mut records = Vec::new();

        for branch in &branches {
            pb.set_message(format!("Walking {}", branch.name));
            match self.walk_branch(branch, classifier, filter, &mut memo, &pb) {
                Ok(mut branch_records) => {
                    debug!(
                        "Branch {}: {} matching commits",
                        branch.name,
                        branch_records.len()
                    );
                    records.append(&mut branch_records);
                }
                Err(e) => warn!("Could not analyse branch {}: {}", branch.name, e),
            }
        }

        pb.finish_and_clear();
        info!(
            "Collected {} commit records from {} branches ({} distinct commits)",
            records.len(),
            branches.len(),
            memo.len()
        );
        Ok(records)
    }

    fn walk_branch(
        &self,
        branch: &Branch,
        classifier: &EnvironmentClassifier,
        filter: &CommitFilter,
        memo: &mut HashMap<ObjectId, DiffTotals>,
        pb: &ProgressBar,
    ) -> Result<Vec<CommitRecord>> {
        let environment = classifier.classify(&branch.name);
        let mut records = Vec::new();
        let mut seen = HashSet::new();

        self.walk(branch.tip, &mut seen, |commit_id, commit, timestamp, parents| {
            if !filter.range.contains(&timestamp) {
                return Ok(());
            }

            let author = commit.author()?;
            let author_email = author.email.to_string();
            if !filter.keeps_author(&author_email) {
                return Ok(());
            }
            let author_name = author.name.to_string();

            let totals = match memo.get(&commit_id) {
                Some(totals) => *totals,
                None => {
                    let totals = self.diff_totals(commit_id, parents.first().copied())?;
                    memo.insert(commit_id, totals);
                    totals
                }
            };

            let message = commit.message_raw()?.to_string().trim().to_string();

            records.push(CommitRecord {
                hash: commit_id.to_hex_with_len(SHORT_HASH_LEN).to_string(),
                author_name,
                author_email,
                timestamp,
                branch: branch.name.clone(),
                environment,
                files_changed: totals.files_changed,
                insertions: totals.insertions,
                deletions: totals.deletions,
                message: if message.is_empty() { None } else { Some(message) },
            });
            pb.inc(1);
            Ok(())
        })?;

        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    /// Visits every commit reachable from `tip` that is not in `seen` yet.
    fn walk<F>(&self, tip: ObjectId, seen: &mut HashSet<ObjectId>, mut visit: F) -> Result<()>
    where
        F: FnMut(ObjectId, &gix::Commit<'_>, DateTime<Utc>, &[ObjectId]) -> Result<()>,
    {
        let mut stack: VecDeque<ObjectId> = VecDeque::from([tip]);

        while let Some(commit_id) = stack.pop_back() {
            if !seen.insert(commit_id) {
                continue;
            }

            let commit = self.repo.find_commit(commit_id)?;
            let secs = commit.time()?.seconds;
            let timestamp = DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| MetricsError::InvalidDate(format!("Invalid timestamp: {secs}")))?;

            let parents: Vec<ObjectId> = commit.parent_ids().map(|id| id.detach()).collect();
            visit(commit_id, &commit, timestamp, &parents)?;
            stack.extend(parents);
        }

        Ok(())
    }

    /// Every author on any local branch, with canonical names. Each distinct
    /// commit is counted once, whatever the number of branches reaching it.
    pub fn scan_authors(&self) -> Result<IdentityResolver> {
        let mut resolver = IdentityResolver::new();
        let mut seen = HashSet::new();

        for branch in self.local_branches()? {
            let walked = self.walk(branch.tip, &mut seen, |_, commit, timestamp, _| {
                let author = commit.author()?;
                resolver.observe(&author.name.to_string(), &author.email.to_string(), timestamp);
                Ok(())
            });
            if let Err(e) = walked {
                warn!("Could not scan branch {}: {}", branch.name, e);
            }
        }

        Ok(resolver)
    }

    /// Author of the commit HEAD points at. A repository without commits
    /// yields [`MetricsError::NoData`].
    pub fn recent_author(&self) -> Result<Author> {
        let mut head = self.repo.head()?;
        if head.is_unborn() {
            debug!("HEAD is unborn, no recent author");
            return Err(MetricsError::NoData);
        }
        let head_commit = head.peel_to_commit_in_place()?;
        let author = head_commit.author()?;
        Ok(Author::new(author.name.to_string(), author.email.to_string()))
    }

    fn diff_totals(&self, commit_id: ObjectId, parent_id: Option<ObjectId>) -> Result<DiffTotals> {
        let commit_tree = self.repo.find_commit(commit_id)?.tree()?;
        let parent_tree = match parent_id {
            Some(id) => Some(self.repo.find_commit(id)?.tree()?),
            None => None,
        };

        // Default options leave rename tracking off, so a rename counts as a
        // deletion plus an addition like `git diff --numstat --no-renames`.
        let changes: Vec<ChangeDetached> = self.repo.diff_tree_to_tree(
            parent_tree.as_ref(),
            Some(&commit_tree),
            gix::diff::Options::default(),
        )?;

        let mut totals = DiffTotals::default();
        for change in changes {
            self.handle_change(change, &mut totals);
        }
        Ok(totals)
    }

    fn handle_change(&self, change: ChangeDetached, totals: &mut DiffTotals) {
        match change {
            ChangeDetached::Addition { id, entry_mode, .. } => {
                if entry_mode.is_tree() || entry_mode.is_commit() {
                    return;
                }
                totals.files_changed += 1;
                totals.insertions += self.blob_lines(id);
            }
            ChangeDetached::Deletion { id, entry_mode, .. } => {
                if entry_mode.is_tree() || entry_mode.is_commit() {
                    return;
                }
                totals.files_changed += 1;
                totals.deletions += self.blob_lines(id);
            }
            ChangeDetached::Modification {
                previous_id,
                id,
                entry_mode,
                ..
            } => {
                if entry_mode.is_tree() || entry_mode.is_commit() {
                    return;
                }
                totals.files_changed += 1;
                self.add_line_diff(previous_id, id, totals);
            }
            // Only produced with rename tracking on; counted as delete + add.
            ChangeDetached::Rewrite {
                source_id,
                id,
                entry_mode,
                ..
            } => {
                if entry_mode.is_tree() || entry_mode.is_commit() {
                    return;
                }
                totals.files_changed += 2;
                totals.deletions += self.blob_lines(source_id);
                totals.insertions += self.blob_lines(id);
            }
        }
    }

    /// Line count of a text blob; binary or unreadable blobs count as zero.
    fn blob_lines(&self, id: ObjectId) -> u64 {
        match self.repo.find_object(id) {
            Ok(obj) if !is_binary(&obj.data) => count_lines(&obj.data),
            _ => 0,
        }
    }

    fn add_line_diff(&self, old_id: ObjectId, new_id: ObjectId, totals: &mut DiffTotals) {
        if let (Ok(old_obj), Ok(new_obj)) = (self.repo.find_object(old_id), self.repo.find_object(new_id)) {
            if is_binary(&old_obj.data) || is_binary(&new_obj.data) {
                return;
            }
            let (added, deleted) = line_diff(&old_obj.data, &new_obj.data);
            totals.insertions += added;
            totals.deletions += deleted;
        }
    }
}

fn is_binary(data: &[u8]) -> bool {
    data.iter().take(8192).any(|&b| b == 0)
}

fn count_lines(data: &[u8]) -> u64 {
    String::from_utf8_lossy(data).lines().count() as u64
}

/// Inserted and deleted line counts between two blobs.
fn line_diff(old: &[u8], new: &[u8]) -> (u64, u64) {
    let old_text = String::from_utf8_lossy(old);
    let new_text = String::from_utf8_lossy(new);
    let diff = TextDiff::from_lines(&*old_text, &*new_text);

    let mut added = 0u64;
    let mut deleted = 0u64;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => added += 1,
            ChangeTag::Delete => deleted += 1,
            ChangeTag::Equal => {}
        }
    }
    (added, deleted)
}

/// `"<n> <unit> ago"`, unit being anything humantime understands.
fn parse_relative(input: &str) -> Option<Duration> {
    let input = input.trim().to_lowercase();
    let span = input.strip_suffix("ago")?.trim();
    if span.is_empty() {
        return None;
    }
    let compact: String = span.split_whitespace().collect();
    humantime::parse_duration(&compact).ok()
}
