//! Shared types, error model, and configuration for the Colab link helper.
//!
//! This crate is the foundation depended on by all other crates in the workspace.
//! It provides:
//! - [`ColabLinksError`] — the unified error type
//! - Domain types ([`TriggerEvent`], [`NotebookLink`], [`CommentBody`], [`RepoSlug`])
//! - Configuration ([`AppConfig`], [`RunConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_API_URL, DEFAULT_TITLE, DEFAULT_VIEWER_URL, GitHubConfig,
    RepositoryConfig, RunConfig, ViewerConfig, load_config, load_config_from,
};
pub use error::{ColabLinksError, Result};
pub use types::{
    CommentBody, MANUAL_DISPATCH_PULL_REQUEST, NotebookLink, OPENED_ACTION, RepoSlug,
    TriggerEvent,
};
