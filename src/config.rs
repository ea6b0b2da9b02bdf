use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Site-wide settings shared by the scrape and build phases.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub title: String,
    pub base_url: String,
    pub output_dir: PathBuf,
    pub data_dir: PathBuf,
}

/// One configured General Assembly session.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session number, filled in from the map key it is configured under.
    #[serde(default)]
    pub number: String,
    /// Label used by the meeting and document endpoints.
    pub label: String,
    /// Label used by the decisions endpoint.
    pub decision_label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GaConfig {
    /// Upstream body code, e.g. `GA`.
    pub body_code: String,
    pub sessions: BTreeMap<String, SessionConfig>,
    /// Main Committee directory codes mapped to display names.
    pub committees: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub ga: GaConfig,
}

impl Config {
    pub fn session(&self, number: &str) -> Result<&SessionConfig> {
        self.ga
            .sessions
            .get(number)
            .ok_or_else(|| Error::Config(format!("unknown session {number}")))
    }
}

/// Load the YAML configuration. Relative output and data directories
/// resolve against the config file's own directory; a `BASE_URL`
/// environment variable overrides the configured base URL.
pub fn load_config(path: &Path) -> Result<Config> {
    let raw = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
    let mut config: Config = serde_yaml::from_str(&raw)
        .map_err(|e| Error::Config(format!("cannot parse {}: {e}", path.display())))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    config.site.output_dir = base_dir.join(&config.site.output_dir);
    config.site.data_dir = base_dir.join(&config.site.data_dir);

    if let Ok(base_url) = env::var("BASE_URL") {
        config.site.base_url = base_url;
    }
    config.site.base_url = config.site.base_url.trim_end_matches('/').to_string();

    for (number, session) in &mut config.ga.sessions {
        session.number = number.clone();
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
site:
  title: GA Proceedings
  base_url: https://example.org/ga/
  output_dir: output
  data_dir: data

ga:
  body_code: GA
  sessions:
    "80":
      label: "80"
      decision_label: 80th session
  committees:
    c1: First Committee
    c2: Second Committee
"#;

    #[test]
    fn loads_yaml_and_resolves_relative_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, SAMPLE).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.site.title, "GA Proceedings");
        assert_eq!(config.site.base_url, "https://example.org/ga");
        assert_eq!(config.site.output_dir, dir.path().join("output"));
        assert_eq!(config.site.data_dir, dir.path().join("data"));
        assert_eq!(config.ga.committees["c1"], "First Committee");
    }

    #[test]
    fn sessions_know_their_own_number() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, SAMPLE).unwrap();

        let config = load_config(&path).unwrap();
        let session = config.session("80").unwrap();
        assert_eq!(session.number, "80");
        assert_eq!(session.decision_label, "80th session");
        assert!(config.session("81").is_err());
    }
}
