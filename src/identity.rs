use crate::model::{identity_key, Author, AuthorEntry, CommitRecord};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::collections::HashMap;

struct Latest {
    name: String,
    email: String,
    seen_at: DateTime<Utc>,
    commits: u64,
}

/// Canonical display names per author identity, built from one pass over the
/// records of a single run.
///
/// For every identity key the name of the chronologically latest record wins.
/// A record only replaces the stored name when its timestamp is strictly
/// later, so on ties the first record encountered keeps its name.
#[derive(Default)]
pub struct IdentityResolver {
    latest: HashMap<String, Latest>,
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, name: &str, email: &str, seen_at: DateTime<Utc>) {
        let key = identity_key(name, email);
        match self.latest.get_mut(key) {
            Some(latest) => {
                latest.commits += 1;
                if seen_at > latest.seen_at {
                    latest.name = name.to_string();
                    latest.seen_at = seen_at;
                }
            }
            None => {
                self.latest.insert(
                    key.to_string(),
                    Latest {
                        name: name.to_string(),
                        email: email.to_string(),
                        seen_at,
                        commits: 1,
                    },
                );
            }
        }
    }

    pub fn observe_all<'a>(&mut self, records: impl IntoIterator<Item = &'a CommitRecord>) {
        for record in records {
            self.observe(&record.author_name, &record.author_email, record.timestamp);
        }
    }

    pub fn canonical_name(&self, key: &str) -> Option<&str> {
        self.latest.get(key).map(|latest| latest.name.as_str())
    }

    /// Rewrites every record's author name with the canonical one.
    pub fn apply(&self, records: &mut [CommitRecord]) {
        for record in records.iter_mut() {
            if let Some(name) = self.canonical_name(record.author_key()) {
                if record.author_name != name {
                    record.author_name = name.to_string();
                }
            }
        }
    }

    /// Known authors with their canonical names, ordered by email then name.
    pub fn authors(&self) -> Vec<AuthorEntry> {
        let mut authors: Vec<AuthorEntry> = self
            .latest
            .values()
            .map(|latest| AuthorEntry {
                name: latest.name.clone(),
                email: latest.email.clone(),
                commits: latest.commits,
            })
            .collect();
        authors.sort_by(|a, b| a.email.cmp(&b.email).then_with(|| a.name.cmp(&b.name)));
        authors
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}

/// Resolves every record to one canonical name per identity.
pub fn resolve_names(records: &mut [CommitRecord]) -> IdentityResolver {
    let mut resolver = IdentityResolver::new();
    resolver.observe_all(records.iter());
    resolver.apply(records);
    debug!(
        "Resolved {} author identities over {} records",
        resolver.len(),
        records.len()
    );
    resolver
}

/// Which authors to analyse when none are requested explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorPolicy {
    /// Only the author of the commit at HEAD.
    #[default]
    Recent,
    /// Every author found on a local branch.
    All,
}

/// How a requested author term was turned into an author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Exact(Author),
    Partial { term: String, chosen: Author },
    Unknown(Author),
}

impl Selection {
    pub fn author(&self) -> &Author {
        match self {
            Selection::Exact(author) | Selection::Unknown(author) => author,
            Selection::Partial { chosen, .. } => chosen,
        }
    }
}

/// Matches requested terms against the known authors.
///
/// An exact (case-sensitive) email match wins. Otherwise the known authors
/// whose name or email contains the term, ignoring case, are candidates and
/// the first by email order is chosen. A term nothing matches is kept as an
/// email so the run reports that no data was found.
pub fn select_authors(requested: &[String], known: &[AuthorEntry]) -> Vec<Selection> {
    let mut sorted: Vec<&AuthorEntry> = known.iter().collect();
    sorted.sort_by(|a, b| a.email.cmp(&b.email).then_with(|| a.name.cmp(&b.name)));

    let mut selections: Vec<Selection> = Vec::with_capacity(requested.len());
    for term in requested {
        let term = term.trim();
        if term.is_empty() {
            continue;
        }

        let selection = if let Some(entry) = sorted.iter().find(|entry| entry.email == term) {
            Selection::Exact(Author::new(entry.name.clone(), entry.email.clone()))
        } else {
            let needle = term.to_lowercase();
            match sorted.iter().find(|entry| {
                entry.email.to_lowercase().contains(&needle)
                    || entry.name.to_lowercase().contains(&needle)
            }) {
                Some(entry) => {
                    let chosen = Author::new(entry.name.clone(), entry.email.clone());
                    info!("Author '{}' matched partially, using {}", term, chosen);
                    Selection::Partial {
                        term: term.to_string(),
                        chosen,
                    }
                }
                None => {
                    info!("Author '{}' not found in repository history", term);
                    Selection::Unknown(Author::new("unknown", term))
                }
            }
        };

        if !selections.iter().any(|s| s.author() == selection.author()) {
            selections.push(selection);
        }
    }
    selections
}
