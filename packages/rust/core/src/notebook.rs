//! Notebook detection over a pull request's change set.

/// Marker that identifies a notebook path.
pub const NOTEBOOK_MARKER: &str = ".ipynb";

/// Whether a changed path counts as a notebook.
///
/// This is substring containment, not a suffix check: `runs/foo.ipynb.bak/log.txt`
/// matches too. Kept loose on purpose until owners confirm a suffix rule.
pub fn is_notebook(path: &str) -> bool {
    path.contains(NOTEBOOK_MARKER)
}

/// Keep only notebook paths, preserving order and duplicates.
pub fn filter_notebooks(paths: &[String]) -> Vec<String> {
    paths.iter().filter(|p| is_notebook(p)).cloned().collect()
}
