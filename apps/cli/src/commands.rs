//! CLI definition, config resolution, tracing setup, and the run itself.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use colablinks_core::{BranchResolver, RunOutcome};
use colablinks_github::{GitHubClient, TriggerContext, read_trigger_context};
use colablinks_shared::{RepoSlug, RunConfig, load_config};
use tracing::info;
use url::Url;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Comment "Open in Colab" links for notebooks changed in a pull request.
///
/// Every option falls back to the variable a GitHub Actions runner sets,
/// so a workflow step needs no arguments.
#[derive(Parser, Debug)]
#[command(name = "colab-links", version, about, long_about = None)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Optional TOML config file with [repository], [github] and [viewer] sections.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// API token used to list files and post the comment.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Path to the JSON event payload.
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    /// Name of the triggering event (e.g. `pull_request`, `workflow_dispatch`).
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    pub event_name: Option<String>,

    /// Repository to comment on, as `owner/repo`.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// REST API base URL.
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<Url>,

    /// Branch to link to, skipping git lookup.
    #[arg(long, env = "GITHUB_HEAD_REF")]
    pub branch: Option<String>,

    /// Root of the checked-out repository.
    #[arg(long, env = "GITHUB_WORKSPACE", default_value = ".")]
    pub work_dir: PathBuf,

    /// Print the comment instead of posting it.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "colablinks=info",
        1 => "colablinks=debug",
        _ => "colablinks=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Config resolution
// ---------------------------------------------------------------------------

/// Merge defaults, the config file, and flags/environment into one run config.
pub(crate) fn resolve_config(cli: Cli) -> Result<RunConfig> {
    let app = load_config(cli.config.as_deref())?;
    let mut config = RunConfig::from(&app);

    config.token = cli.token;
    config.event_path = cli.event_path;
    config.event_name = cli.event_name.filter(|s| !s.is_empty());
    config.branch_override = cli.branch.filter(|s| !s.trim().is_empty());
    config.work_dir = cli.work_dir;
    config.dry_run = cli.dry_run;

    if let Some(slug) = cli.repository.filter(|s| !s.is_empty()) {
        config.repository = slug.parse::<RepoSlug>()?;
    }
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }

    Ok(config)
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Resolve config, read the trigger, and run the pipeline once.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let trigger = read_trigger_context(&config)?;

    let branches = branch_resolver(&config, &trigger);

    let api_url = config.api_url.clone();
    let outcome = colablinks_core::run(
        &config,
        &trigger,
        |token| GitHubClient::new(api_url, token),
        &branches,
    )
    .await?;

    report(&outcome);
    Ok(())
}

/// `--branch`/`GITHUB_HEAD_REF` first, then the payload's head ref, then git.
fn branch_resolver(config: &RunConfig, trigger: &TriggerContext) -> BranchResolver {
    BranchResolver::new(&config.work_dir)
        .with_fixed_branch([config.branch_override.clone(), trigger.head_ref.clone()])
}

fn report(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Skipped { action } => {
            info!(action = %action, "skipped");
        }
        RunOutcome::NoNotebooks {
            pull_request,
            changed,
        } => {
            info!(pull_request, changed, "no notebooks changed, no comment posted");
        }
        RunOutcome::DryRun { pull_request, body } => {
            info!(pull_request, "dry run");
            print!("{body}");
        }
        RunOutcome::Commented {
            pull_request,
            notebooks,
        } => {
            info!(pull_request, notebooks, "comment posted");
        }
    }
}
