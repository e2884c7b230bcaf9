//! Configuration for a link-posting run.
//!
//! An optional TOML file supplies repository and endpoint settings.
//! CLI flags and the CI environment override file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ColabLinksError, Result};
use crate::types::RepoSlug;

/// Default public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default notebook viewer.
pub const DEFAULT_VIEWER_URL: &str = "https://colab.research.google.com";

/// Title line that opens every comment.
pub const DEFAULT_TITLE: &str = "The following colabs where changed in this PR:\n";

// ---------------------------------------------------------------------------
// Config file structs
// ---------------------------------------------------------------------------

/// Top-level file config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Repository the comments are posted to.
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// Hosting API settings.
    #[serde(default)]
    pub github: GitHubConfig,

    /// Notebook viewer settings.
    #[serde(default)]
    pub viewer: ViewerConfig,
}

/// `[repository]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default = "default_owner")]
    pub owner: String,

    #[serde(default = "default_repo")]
    pub repo: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            repo: default_repo(),
        }
    }
}

fn default_owner() -> String {
    "wandb".into()
}
fn default_repo() -> String {
    "examples".into()
}

/// `[github]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// REST API base URL (GitHub Enterprise hosts differ).
    #[serde(default = "default_api_url")]
    pub api_url: Url,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
        }
    }
}

fn default_api_url() -> Url {
    Url::parse(DEFAULT_API_URL).expect("valid default API URL")
}

/// `[viewer]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Base URL of the hosted notebook viewer.
    #[serde(default = "default_viewer_url")]
    pub base_url: Url,

    /// Comment title, including its trailing newline.
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_url: default_viewer_url(),
            title: default_title(),
        }
    }
}

fn default_viewer_url() -> Url {
    Url::parse(DEFAULT_VIEWER_URL).expect("valid default viewer URL")
}
fn default_title() -> String {
    DEFAULT_TITLE.into()
}

// ---------------------------------------------------------------------------
// Run config (runtime, merged from file + CLI flags + environment)
// ---------------------------------------------------------------------------

/// Everything a run needs, constructed once at process start.
///
/// Components receive this by reference; none of them read the
/// environment on their own.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Hosting API token. Checked lazily via [`RunConfig::require_token`].
    pub token: Option<String>,
    /// CI event name (`pull_request`, `workflow_dispatch`, ...).
    pub event_name: Option<String>,
    /// Path to the JSON event payload written by the CI runner.
    pub event_path: Option<PathBuf>,
    /// Repository that receives the comment.
    pub repository: RepoSlug,
    /// REST API base URL.
    pub api_url: Url,
    /// Notebook viewer base URL.
    pub viewer_base: Url,
    /// Comment title.
    pub title: String,
    /// Branch name that bypasses git lookup when set.
    pub branch_override: Option<String>,
    /// Root of the checked-out working copy.
    pub work_dir: PathBuf,
    /// Print the comment instead of posting it.
    pub dry_run: bool,
}

impl From<&AppConfig> for RunConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            token: None,
            event_name: None,
            event_path: None,
            repository: RepoSlug::new(&config.repository.owner, &config.repository.repo),
            api_url: config.github.api_url.clone(),
            viewer_base: config.viewer.base_url.clone(),
            title: config.viewer.title.clone(),
            branch_override: None,
            work_dir: PathBuf::from("."),
            dry_run: false,
        }
    }
}

impl RunConfig {
    /// The API token, or a config error when it is absent or empty.
    pub fn require_token(&self) -> Result<&str> {
        match self.token.as_deref() {
            Some(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(ColabLinksError::config(
                "GitHub token not found. Set the GITHUB_TOKEN environment variable \
                 (in a workflow: `env: GITHUB_TOKEN: ${{ secrets.GITHUB_TOKEN }}`).",
            )),
        }
    }

    /// The event payload path, or a config error when the runner did not provide one.
    pub fn require_event_path(&self) -> Result<&Path> {
        self.event_path.as_deref().ok_or_else(|| {
            ColabLinksError::config(
                "event payload not found. Set GITHUB_EVENT_PATH or pass --event-path.",
            )
        })
    }

    /// Whether the CI event name marks a manual run.
    pub fn is_manual_dispatch(&self) -> bool {
        self.event_name.as_deref() == Some("workflow_dispatch")
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the file config, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => load_config_from(path),
        None => {
            tracing::debug!("no config file given, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Load the file config from a specific path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ColabLinksError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ColabLinksError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("wandb"));
        assert!(toml_str.contains("colab.research.google.com"));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let toml_str = r#"
[repository]
repo = "other-examples"

[github]
api_url = "https://github.example.com/api/v3"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.repository.owner, "wandb");
        assert_eq!(config.repository.repo, "other-examples");
        assert_eq!(config.github.api_url.as_str(), "https://github.example.com/api/v3");
        assert_eq!(config.viewer.title, DEFAULT_TITLE);
    }

    #[test]
    fn run_config_from_app_config() {
        let run = RunConfig::from(&AppConfig::default());
        assert_eq!(run.repository, RepoSlug::new("wandb", "examples"));
        assert_eq!(run.api_url.as_str(), "https://api.github.com/");
        assert!(!run.dry_run);
        assert!(run.token.is_none());
    }

    #[test]
    fn token_validation() {
        let mut run = RunConfig::from(&AppConfig::default());
        let err = run.require_token().unwrap_err();
        assert!(err.to_string().contains("GitHub token not found"));

        run.token = Some("   ".into());
        assert!(run.require_token().is_err());

        run.token = Some("ghp_test".into());
        assert_eq!(run.require_token().unwrap(), "ghp_test");
    }

    #[test]
    fn event_path_validation() {
        let mut run = RunConfig::from(&AppConfig::default());
        assert!(run.require_event_path().is_err());

        run.event_path = Some(PathBuf::from("/tmp/event.json"));
        assert_eq!(run.require_event_path().unwrap(), Path::new("/tmp/event.json"));
    }

    #[test]
    fn manual_dispatch_event_name() {
        let mut run = RunConfig::from(&AppConfig::default());
        assert!(!run.is_manual_dispatch());
        run.event_name = Some("workflow_dispatch".into());
        assert!(run.is_manual_dispatch());
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let err = load_config_from(Path::new("/nonexistent/colab-links.toml")).unwrap_err();
        assert!(matches!(err, ColabLinksError::Io { .. }));
    }
}
