//! GitHub integration: trigger event reading and the pull request REST calls.
//!
//! This crate provides:
//! - [`read_trigger_context`] — classifies the CI event payload
//! - [`PullRequestApi`] — the capability the pipeline is written against
//! - [`GitHubClient`] — the reqwest-backed implementation

pub mod client;
pub mod event;

pub use client::{GitHubClient, PullRequestApi};
pub use event::{TriggerContext, read_trigger_context};
