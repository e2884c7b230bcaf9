//! Viewer URL and markdown link derivation for changed notebooks.

use std::path::Path;

use url::Url;

use colablinks_shared::{ColabLinksError, NotebookLink, RepoSlug, Result, RunConfig};

/// Builds "open in Colab" links for one repository.
#[derive(Debug, Clone)]
pub struct LinkFormatter {
    viewer_base: Url,
    repository: RepoSlug,
}

impl LinkFormatter {
    pub fn new(viewer_base: Url, repository: RepoSlug) -> Self {
        Self {
            viewer_base,
            repository,
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.viewer_base.clone(), config.repository.clone())
    }

    /// `{viewer}/github/{owner}/{repo}/blob/{branch}/{path}`.
    ///
    /// Branch and path keep their `/` separators; every segment is
    /// percent-encoded on its own.
    pub fn viewer_url(&self, branch: &str, path: &str) -> Result<Url> {
        let mut url = self.viewer_base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ColabLinksError::config(format!(
                    "viewer URL cannot be a base: {}",
                    self.viewer_base
                ))
            })?
            .pop_if_empty()
            .extend([
                "github",
                self.repository.owner.as_str(),
                self.repository.repo.as_str(),
                "blob",
            ])
            .extend(branch.split('/'))
            .extend(path.split('/'));
        Ok(url)
    }

    /// Display name plus viewer URL for a changed notebook.
    pub fn link(&self, path: &str, branch: &str) -> Result<NotebookLink> {
        Ok(NotebookLink {
            name: display_name(path).to_string(),
            url: self.viewer_url(branch, path)?.into(),
        })
    }
}

/// Final path segment, or the whole path when it has none.
pub fn display_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use colablinks_shared::DEFAULT_VIEWER_URL;

    fn formatter() -> LinkFormatter {
        LinkFormatter::new(
            Url::parse(DEFAULT_VIEWER_URL).unwrap(),
            RepoSlug::new("wandb", "examples"),
        )
    }

    #[test]
    fn builds_colab_url() {
        let link = formatter().link("nb/train.ipynb", "feature-x").unwrap();
        assert_eq!(link.name, "train.ipynb");
        assert_eq!(
            link.url,
            "https://colab.research.google.com/github/wandb/examples/blob/feature-x/nb/train.ipynb"
        );
    }

    #[test]
    fn escapes_segments_but_keeps_separators() {
        let url = formatter()
            .viewer_url("user/fix #3", "colabs/my notebook?.ipynb")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://colab.research.google.com/github/wandb/examples/blob/user/fix%20%233/colabs/my%20notebook%3F.ipynb"
        );
    }

    #[test]
    fn viewer_base_path_is_kept() {
        let formatter = LinkFormatter::new(
            Url::parse("https://viewer.example.com/nb/").unwrap(),
            RepoSlug::new("o", "r"),
        );
        let url = formatter.viewer_url("main", "a.ipynb").unwrap();
        assert_eq!(url.as_str(), "https://viewer.example.com/nb/github/o/r/blob/main/a.ipynb");
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = formatter().link("x/y/z.ipynb", "dev").unwrap();
        let b = formatter().link("x/y/z.ipynb", "dev").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn display_name_strips_directories() {
        assert_eq!(display_name("a/b/c.ipynb"), "c.ipynb");
        assert_eq!(display_name("top.ipynb"), "top.ipynb");
    }

    #[test]
    fn non_base_viewer_url_is_config_error() {
        let formatter = LinkFormatter::new(
            Url::parse("mailto:someone@example.com").unwrap(),
            RepoSlug::new("o", "r"),
        );
        let err = formatter.viewer_url("main", "a.ipynb").unwrap_err();
        assert!(matches!(err, ColabLinksError::Config { .. }));
    }
}
