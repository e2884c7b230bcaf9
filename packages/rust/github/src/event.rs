//! Trigger context reader: turns the CI event payload into a [`TriggerEvent`].

use serde::Deserialize;
use tracing::{debug, info, instrument};

use colablinks_shared::{ColabLinksError, OPENED_ACTION, Result, RunConfig, TriggerEvent};

/// Loose view of a webhook payload. Only the fields this tool reads.
#[derive(Debug, Default, Deserialize)]
struct EventPayload {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    number: Option<u64>,
    #[serde(default)]
    pull_request: Option<PullRequestPayload>,
}

#[derive(Debug, Default, Deserialize)]
struct PullRequestPayload {
    #[serde(default)]
    number: Option<u64>,
    #[serde(default)]
    head: Option<HeadPayload>,
}

#[derive(Debug, Default, Deserialize)]
struct HeadPayload {
    #[serde(rename = "ref", default)]
    git_ref: Option<String>,
}

/// The classified trigger plus any hints the payload carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerContext {
    pub event: TriggerEvent,
    /// Source branch of the pull request, when the payload names it.
    pub head_ref: Option<String>,
}

impl TriggerContext {
    /// Classify a raw JSON payload.
    ///
    /// A top-level `workflow` key marks a manual dispatch regardless of its value.
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| ColabLinksError::config(format!("event payload is not valid JSON: {e}")))?;

        let is_dispatch = value.get("workflow").is_some();

        let payload: EventPayload = serde_json::from_value(value).map_err(|e| {
            ColabLinksError::config(format!("event payload has an unexpected shape: {e}"))
        })?;

        let head_ref = payload
            .pull_request
            .as_ref()
            .and_then(|pr| pr.head.as_ref())
            .and_then(|head| head.git_ref.clone())
            .filter(|r| !r.is_empty());

        if is_dispatch {
            return Ok(Self {
                event: TriggerEvent::ManualDispatch,
                head_ref,
            });
        }

        let Some(action) = payload.action else {
            return Err(ColabLinksError::config(
                "event payload is neither a workflow dispatch nor an action event",
            ));
        };

        let number = payload
            .number
            .or_else(|| payload.pull_request.as_ref().and_then(|pr| pr.number));

        // Only an opened pull request needs its number; every other action is a no-op.
        if action == OPENED_ACTION && number.is_none() {
            return Err(ColabLinksError::config(
                "`opened` event payload carries no pull request number",
            ));
        }

        Ok(Self {
            event: TriggerEvent::PullRequestAction { action, number },
            head_ref,
        })
    }
}

/// Read and classify the event payload named by the run config.
///
/// The CI event name `workflow_dispatch` also counts as a manual run,
/// even when the payload lacks a `workflow` key.
#[instrument(skip_all)]
pub fn read_trigger_context(config: &RunConfig) -> Result<TriggerContext> {
    let path = config.require_event_path()?;
    debug!(path = %path.display(), "reading event payload");

    let raw = std::fs::read_to_string(path).map_err(|e| ColabLinksError::io(path, e))?;

    let context = if config.is_manual_dispatch() {
        // Dispatch payloads need not look like a pull request event.
        TriggerContext {
            event: TriggerEvent::ManualDispatch,
            head_ref: TriggerContext::from_json(&raw).ok().and_then(|ctx| ctx.head_ref),
        }
    } else {
        TriggerContext::from_json(&raw)?
    };

    info!(action = context.event.action(), "trigger event classified");
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use colablinks_shared::AppConfig;
    use std::path::PathBuf;

    fn fixture(name: &str) -> String {
        let path = format!("../../../fixtures/events/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn run_config_for(fixture_name: &str) -> RunConfig {
        let mut config = RunConfig::from(&AppConfig::default());
        config.event_path = Some(PathBuf::from(format!("../../../fixtures/events/{fixture_name}")));
        config
    }

    #[test]
    fn opened_fixture_classifies_as_pull_request_action() {
        let ctx = TriggerContext::from_json(&fixture("pull_request_opened.json")).unwrap();
        assert_eq!(
            ctx.event,
            TriggerEvent::PullRequestAction {
                action: "opened".into(),
                number: Some(42)
            }
        );
        assert_eq!(ctx.head_ref.as_deref(), Some("feature-x"));
        assert_eq!(ctx.event.target_pull_request(), Some(42));
    }

    #[test]
    fn closed_fixture_is_not_a_target() {
        let ctx = TriggerContext::from_json(&fixture("pull_request_closed.json")).unwrap();
        assert_eq!(ctx.event.action(), "closed");
        assert_eq!(ctx.event.target_pull_request(), None);
    }

    #[test]
    fn workflow_key_means_manual_dispatch() {
        let ctx = TriggerContext::from_json(&fixture("workflow_dispatch.json")).unwrap();
        assert_eq!(ctx.event, TriggerEvent::ManualDispatch);
        assert_eq!(ctx.event.target_pull_request(), Some(1));
    }

    #[test]
    fn workflow_key_wins_even_when_null() {
        let ctx =
            TriggerContext::from_json(r#"{"workflow": null, "action": "closed", "number": 3}"#)
                .unwrap();
        assert_eq!(ctx.event, TriggerEvent::ManualDispatch);
    }

    #[test]
    fn number_falls_back_to_pull_request_object() {
        let ctx =
            TriggerContext::from_json(r#"{"action": "opened", "pull_request": {"number": 7}}"#)
                .unwrap();
        assert_eq!(ctx.event.target_pull_request(), Some(7));
    }

    #[test]
    fn non_pull_request_action_is_a_no_op() {
        let ctx = TriggerContext::from_json(
            r#"{"action": "created", "issue": {"number": 3}, "comment": {"id": 1}}"#,
        )
        .unwrap();
        assert_eq!(
            ctx.event,
            TriggerEvent::PullRequestAction {
                action: "created".into(),
                number: None
            }
        );
        assert_eq!(ctx.event.target_pull_request(), None);

        let ctx = TriggerContext::from_json(r#"{"action": "closed"}"#).unwrap();
        assert_eq!(ctx.event.target_pull_request(), None);
    }

    #[test]
    fn opened_without_number_is_config_error() {
        let err = TriggerContext::from_json(r#"{"action": "opened"}"#).unwrap_err();
        assert!(matches!(err, ColabLinksError::Config { .. }));
    }

    #[test]
    fn unrelated_payload_is_config_error() {
        let err = TriggerContext::from_json(r#"{"ref": "refs/heads/main"}"#).unwrap_err();
        assert!(matches!(err, ColabLinksError::Config { .. }));

        let err = TriggerContext::from_json("not json").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn read_from_event_path() {
        let ctx = read_trigger_context(&run_config_for("pull_request_opened.json")).unwrap();
        assert_eq!(ctx.event.target_pull_request(), Some(42));
    }

    #[test]
    fn dispatch_event_name_overrides_payload() {
        let mut config = run_config_for("pull_request_closed.json");
        config.event_name = Some("workflow_dispatch".into());
        let ctx = read_trigger_context(&config).unwrap();
        assert_eq!(ctx.event, TriggerEvent::ManualDispatch);
    }

    #[test]
    fn missing_event_path_is_config_error() {
        let config = RunConfig::from(&AppConfig::default());
        let err = read_trigger_context(&config).unwrap_err();
        assert!(matches!(err, ColabLinksError::Config { .. }));
    }

    #[test]
    fn unreadable_event_file_is_io_error() {
        let err = read_trigger_context(&run_config_for("does_not_exist.json")).unwrap_err();
        assert!(matches!(err, ColabLinksError::Io { .. }));
    }
}
