//! End-to-end run: trigger → changed files → notebooks → links → one comment.

use tracing::{debug, info, instrument};

use colablinks_github::{PullRequestApi, TriggerContext};
use colablinks_shared::{CommentBody, Result, RunConfig};

use crate::branch::BranchLookup;
use crate::links::LinkFormatter;
use crate::notebook::filter_notebooks;

/// How a run ended. Every variant is a successful exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The trigger was not a pull request being opened.
    Skipped { action: String },
    /// The pull request touched no notebooks, so nothing was posted.
    NoNotebooks { pull_request: u64, changed: usize },
    /// Links were derived but printing replaced posting.
    DryRun { pull_request: u64, body: CommentBody },
    /// One comment was posted.
    Commented { pull_request: u64, notebooks: usize },
}

/// Run the pipeline once.
///
/// `connect` builds the API client from the token and is only called once the
/// trigger is known to need API work, so skipped runs never touch the credential.
/// The comment body is fully assembled before the single post, so any failure
/// leaves the pull request untouched.
#[instrument(skip_all, fields(repo = %config.repository, action = trigger.event.action()))]
pub async fn run<A, F, B>(
    config: &RunConfig,
    trigger: &TriggerContext,
    connect: F,
    branches: &B,
) -> Result<RunOutcome>
where
    A: PullRequestApi,
    F: FnOnce(&str) -> Result<A>,
    B: BranchLookup,
{
    let Some(pull_request) = trigger.event.target_pull_request() else {
        info!("trigger is not an opened pull request, nothing to do");
        return Ok(RunOutcome::Skipped {
            action: trigger.event.action().to_string(),
        });
    };

    let api = connect(config.require_token()?)?;

    // --- Change set ---
    let changed = api
        .list_changed_files(&config.repository, pull_request)
        .await?;
    let notebooks = filter_notebooks(&changed);
    info!(
        pull_request,
        changed = changed.len(),
        notebooks = notebooks.len(),
        "filtered change set"
    );

    if notebooks.is_empty() {
        return Ok(RunOutcome::NoNotebooks {
            pull_request,
            changed: changed.len(),
        });
    }

    // --- Links ---
    let formatter = LinkFormatter::from_config(config);
    let mut links = Vec::with_capacity(notebooks.len());
    for path in &notebooks {
        let branch = branches.branch_for(path).await?;
        let link = formatter.link(path, &branch)?;
        debug!(%path, url = %link.url, "derived notebook link");
        links.push(link);
    }

    let body = CommentBody::compose(&config.title, &links);

    // --- Publish ---
    if config.dry_run {
        info!(pull_request, "dry run, comment not posted");
        return Ok(RunOutcome::DryRun { pull_request, body });
    }

    info!(pull_request, notebooks = links.len(), "creating comment");
    api.create_comment(&config.repository, pull_request, body.as_str())
        .await?;

    Ok(RunOutcome::Commented {
        pull_request,
        notebooks: links.len(),
    })
}
