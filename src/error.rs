use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MetricsError>;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),
    #[error("Not a git repository: {}", .0.display())]
    NotARepository(PathBuf),
    #[error("No commits found for the selected authors")]
    NoData,
    #[error("Git error: {0}")]
    Git(#[from] Box<gix::open::Error>),
    #[error("Git repository error: {0}")]
    GitRepo(String),
    #[error("Report error: {0}")]
    Report(#[from] rust_xlsxwriter::XlsxError),
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Commit error: {0}")]
    Commit(#[from] Box<gix::object::commit::Error>),
    #[error("Reference find error: {0}")]
    RefFind(#[from] Box<gix::reference::find::existing::Error>),
    #[error("Head peel error: {0}")]
    HeadPeel(#[from] Box<gix::head::peel::to_commit::Error>),
    #[error("Object find with conversion error: {0}")]
    ObjectFindConv(#[from] Box<gix::object::find::existing::with_conversion::Error>),
    #[error("Object decode error: {0}")]
    ObjectDecode(#[from] Box<gix::objs::decode::Error>),
    #[error("Diff tree to tree error: {0}")]
    DiffTreeToTree(#[from] Box<gix::repository::diff_tree_to_tree::Error>),
}

// Manual From implementations for unboxed to boxed conversions
impl From<gix::open::Error> for MetricsError {
    fn from(err: gix::open::Error) -> Self {
        MetricsError::Git(Box::new(err))
    }
}

impl From<gix::object::commit::Error> for MetricsError {
    fn from(err: gix::object::commit::Error) -> Self {
        MetricsError::Commit(Box::new(err))
    }
}

impl From<gix::reference::find::existing::Error> for MetricsError {
    fn from(err: gix::reference::find::existing::Error) -> Self {
        MetricsError::RefFind(Box::new(err))
    }
}

impl From<gix::head::peel::to_commit::Error> for MetricsError {
    fn from(err: gix::head::peel::to_commit::Error) -> Self {
        MetricsError::HeadPeel(Box::new(err))
    }
}

impl From<gix::object::find::existing::with_conversion::Error> for MetricsError {
    fn from(err: gix::object::find::existing::with_conversion::Error) -> Self {
        MetricsError::ObjectFindConv(Box::new(err))
    }
}

impl From<gix::objs::decode::Error> for MetricsError {
    fn from(err: gix::objs::decode::Error) -> Self {
        MetricsError::ObjectDecode(Box::new(err))
    }
}

impl From<gix::repository::diff_tree_to_tree::Error> for MetricsError {
    fn from(err: gix::repository::diff_tree_to_tree::Error) -> Self {
        MetricsError::DiffTreeToTree(Box::new(err))
    }
}
