//! Core domain types for a single link-posting run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ColabLinksError;

/// Pull request targeted by manually dispatched runs.
pub const MANUAL_DISPATCH_PULL_REQUEST: u64 = 1;

/// The only pull request action that triggers a comment.
pub const OPENED_ACTION: &str = "opened";

// ---------------------------------------------------------------------------
// TriggerEvent
// ---------------------------------------------------------------------------

/// Why the automation run was started. Derived once per run, immutable afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerEvent {
    /// A manually dispatched workflow run.
    ManualDispatch,
    /// A webhook with an `action` field. Only `opened` is guaranteed a number;
    /// other actions (including non-PR events such as `issue_comment`) may lack one.
    PullRequestAction { action: String, number: Option<u64> },
}

impl TriggerEvent {
    /// The pull request this run should comment on, or `None` when the run is a no-op.
    pub fn target_pull_request(&self) -> Option<u64> {
        match self {
            Self::ManualDispatch => Some(MANUAL_DISPATCH_PULL_REQUEST),
            Self::PullRequestAction {
                action,
                number: Some(number),
            } if action == OPENED_ACTION => Some(*number),
            Self::PullRequestAction { .. } => None,
        }
    }

    /// Short label for logs.
    pub fn action(&self) -> &str {
        match self {
            Self::ManualDispatch => "workflow_dispatch",
            Self::PullRequestAction { action, .. } => action,
        }
    }
}

// ---------------------------------------------------------------------------
// RepoSlug
// ---------------------------------------------------------------------------

/// An `owner/repo` pair on the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoSlug {
    type Err = ColabLinksError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, repo))
                if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
            {
                Ok(Self::new(owner, repo))
            }
            _ => Err(ColabLinksError::config(format!(
                "invalid repository '{s}': expected 'owner/repo'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// NotebookLink
// ---------------------------------------------------------------------------

/// A notebook's display name paired with its viewer URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookLink {
    /// File name without its directory prefix.
    pub name: String,
    /// Viewer URL that opens the notebook.
    pub url: String,
}

impl NotebookLink {
    /// Render as a markdown bullet, newline included.
    pub fn to_markdown(&self) -> String {
        format!("- [{}]({})\n", self.name, self.url)
    }
}

// ---------------------------------------------------------------------------
// CommentBody
// ---------------------------------------------------------------------------

/// Fully assembled comment text, built once and posted once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBody(String);

impl CommentBody {
    /// Title followed by one bullet per link, with no extra separators.
    pub fn compose(title: &str, links: &[NotebookLink]) -> Self {
        let mut body = String::from(title);
        for link in links {
            body.push_str(&link.to_markdown());
        }
        Self(body)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
