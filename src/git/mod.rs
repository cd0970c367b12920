mod repo;

pub use repo::{Branch, CommitFilter, GitRepo};
