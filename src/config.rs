use crate::environment::DEFAULT_PRODUCTION_BRANCHES;
use crate::error::Result;
use crate::identity::AuthorPolicy;
use log::{debug, info};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "GITMETRICS_CONFIG";

/// Settings read from a TOML file; every key is optional.
///
/// ```toml
/// production_branches = ["main", "master", "release"]
/// reports_dir = "reports"
/// default_authors = "all"
/// export_json = true
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub production_branches: Vec<String>,
    pub reports_dir: PathBuf,
    pub default_authors: AuthorPolicy,
    pub export_json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            production_branches: DEFAULT_PRODUCTION_BRANCHES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            reports_dir: PathBuf::from("reports"),
            default_authors: AuthorPolicy::default(),
            export_json: false,
        }
    }
}

impl Settings {
    /// Loads the explicit file when given, otherwise the first file found in
    /// the discovery paths, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        for path in discover_config_files() {
            debug!("Looking for configuration at {}", path.display());
            if path.is_file() {
                return Self::load_from_file(&path);
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        debug!("Reading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        let settings = Self::from_toml(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

fn discover_config_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = env::var(CONFIG_ENV) {
        paths.push(PathBuf::from(env_path));
    }
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("gitmetrics").join("config.toml"));
    }
    paths.push(PathBuf::from("./.gitmetrics.toml"));

    paths
}
