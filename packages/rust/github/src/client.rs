//! GitHub REST client and the [`PullRequestApi`] capability the pipeline depends on.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use url::Url;

use colablinks_shared::{ColabLinksError, RepoSlug, Result};

/// User-Agent string for API requests (GitHub rejects requests without one).
const USER_AGENT: &str = concat!("colab-links/", env!("CARGO_PKG_VERSION"));

/// REST API version pinned in every request.
const API_VERSION: &str = "2022-11-28";

/// Request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Page size for the pull request files listing (GitHub's maximum).
const FILES_PER_PAGE: usize = 100;

/// GitHub stops listing pull request files after 3000 entries.
const MAX_FILE_PAGES: usize = 30;

const LIST_FILES_OPERATION: &str = "list pull request files";
const CREATE_COMMENT_OPERATION: &str = "create issue comment";

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// The two hosting API calls the pipeline makes.
///
/// [`GitHubClient`] is the production implementation; tests substitute an
/// in-memory double.
pub trait PullRequestApi {
    /// Paths of the files changed in a pull request, in API response order.
    fn list_changed_files(
        &self,
        repo: &RepoSlug,
        pull_number: u64,
    ) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Post a new comment on an issue or pull request.
    fn create_comment(
        &self,
        repo: &RepoSlug,
        issue_number: u64,
        body: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One entry of `GET /repos/{owner}/{repo}/pulls/{n}/files`.
#[derive(Debug, Deserialize)]
struct PullRequestFile {
    filename: String,
}

#[derive(Debug, Serialize)]
struct NewComment<'a> {
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ---------------------------------------------------------------------------
// GitHubClient
// ---------------------------------------------------------------------------

/// Authenticated client for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_url: Url,
}

impl GitHubClient {
    /// Build a client that authenticates every request with `token`.
    pub fn new(api_url: Url, token: &str) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ColabLinksError::config("GitHub token contains invalid characters"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                ColabLinksError::config(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { http, api_url })
    }

    /// Append path segments to the API base, keeping any base path (e.g. `/api/v3`).
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ColabLinksError::config(format!("API URL cannot be a base: {}", self.api_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, operation: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ColabLinksError::remote_api(operation, None, e.to_string()))?;

        let response = check_status(response, operation).await?;

        response.json::<T>().await.map_err(|e| {
            ColabLinksError::remote_api(operation, None, format!("failed to decode response: {e}"))
        })
    }
}

impl PullRequestApi for GitHubClient {
    #[instrument(skip(self, repo), fields(repo = %repo))]
    async fn list_changed_files(&self, repo: &RepoSlug, pull_number: u64) -> Result<Vec<String>> {
        let number = pull_number.to_string();
        let mut files = Vec::new();

        for page in 1..=MAX_FILE_PAGES {
            let mut url = self.endpoint(&[
                "repos",
                repo.owner.as_str(),
                repo.repo.as_str(),
                "pulls",
                &number,
                "files",
            ])?;
            url.query_pairs_mut()
                .append_pair("per_page", &FILES_PER_PAGE.to_string())
                .append_pair("page", &page.to_string());

            let batch: Vec<PullRequestFile> = self.get_json(url, LIST_FILES_OPERATION).await?;
            let batch_len = batch.len();
            debug!(page, batch_len, "fetched page of changed files");

            files.extend(batch.into_iter().map(|f| f.filename));

            if batch_len < FILES_PER_PAGE {
                break;
            }
        }

        info!(count = files.len(), "listed changed files");
        Ok(files)
    }

    #[instrument(skip(self, repo, body), fields(repo = %repo, body_len = body.len()))]
    async fn create_comment(&self, repo: &RepoSlug, issue_number: u64, body: &str) -> Result<()> {
        let number = issue_number.to_string();
        let url = self.endpoint(&[
            "repos",
            repo.owner.as_str(),
            repo.repo.as_str(),
            "issues",
            &number,
            "comments",
        ])?;

        let response = self
            .http
            .post(url)
            .json(&NewComment { body })
            .send()
            .await
            .map_err(|e| {
                ColabLinksError::remote_api(CREATE_COMMENT_OPERATION, None, e.to_string())
            })?;

        check_status(response, CREATE_COMMENT_OPERATION).await?;
        info!("comment created");
        Ok(())
    }
}

/// Pass successful responses through; turn anything else into a remote API error.
///
/// GitHub error bodies carry a `message` field, which is preferred over the raw body.
async fn check_status(response: Response, operation: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            debug!(%status, error = %e, "failed to read error response body");
            String::new()
        }
    };
    let message = match serde_json::from_str::<ApiErrorBody>(&text) {
        Ok(body) => body.message,
        Err(_) if !text.trim().is_empty() => text.trim().to_string(),
        Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
    };

    Err(ColabLinksError::remote_api(operation, Some(status.as_u16()), message))
}
