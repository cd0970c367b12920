use crate::model::Environment;

pub const DEFAULT_PRODUCTION_BRANCHES: [&str; 2] = ["main", "master"];

/// Maps branch names to an [`Environment`].
///
/// A branch is production when its name equals, ignoring case, one of the
/// configured production names. Everything else is homologation. Only the
/// name is looked at, never the branch history.
#[derive(Debug, Clone)]
pub struct EnvironmentClassifier {
    production: Vec<String>,
}

impl EnvironmentClassifier {
    pub fn new<I, S>(production: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let production = production
            .into_iter()
            .map(|name| name.as_ref().trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();
        Self { production }
    }

    pub fn classify(&self, branch: &str) -> Environment {
        let branch = branch.to_lowercase();
        if self.production.iter().any(|name| *name == branch) {
            Environment::Production
        } else {
            Environment::Homologation
        }
    }

    pub fn production_branches(&self) -> &[String] {
        &self.production
    }
}

impl Default for EnvironmentClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_PRODUCTION_BRANCHES)
    }
}

impl Environment {
    /// Classification with the default production names.
    pub fn from_branch(branch: &str) -> Self {
        EnvironmentClassifier::default().classify(branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_and_master_are_production_in_any_case() {
        for name in ["main", "Main", "MAIN", "master", "MASTER", "Master"] {
            assert_eq!(Environment::from_branch(name), Environment::Production, "{name}");
        }
    }

    #[test]
    fn other_branches_are_homologation() {
        for name in ["develop", "feature/x", "main-old", "release/main", "", "mainline"] {
            assert_eq!(Environment::from_branch(name), Environment::Homologation, "{name}");
        }
    }

    #[test]
    fn custom_production_names_replace_defaults() {
        let classifier = EnvironmentClassifier::new(["Release", " trunk "]);
        assert_eq!(classifier.classify("release"), Environment::Production);
        assert_eq!(classifier.classify("TRUNK"), Environment::Production);
        assert_eq!(classifier.classify("main"), Environment::Homologation);
    }
}
