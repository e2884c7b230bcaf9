//! Notebook detection, link derivation, and the end-to-end comment pipeline.
//!
//! This crate ties the GitHub client and the local checkout together into
//! a single run (see [`pipeline::run`]).

pub mod branch;
pub mod links;
pub mod notebook;
pub mod pipeline;

pub use branch::{BranchLookup, BranchResolver};
pub use links::{LinkFormatter, display_name};
pub use notebook::{NOTEBOOK_MARKER, filter_notebooks, is_notebook};
pub use pipeline::{RunOutcome, run};
