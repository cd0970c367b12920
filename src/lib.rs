pub mod aggregate;
pub mod analyze;
pub mod authors;
pub mod check;
pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod git;
pub mod identity;
pub mod logging;
pub mod model;
pub mod report;
pub mod save;
pub mod util;

pub use error::{MetricsError, Result};
