//! Status polling for submitted executions
//!
//! After submission the editor polls the execution service on a fixed
//! interval until a terminal phase is reported or the host cancels.
//! Each observed status is handed to the caller so it can be applied to
//! the visual graph; a collaborator failure stops the loop without
//! retrying.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::error::Result;
use crate::execution::{ExecutionPhase, ExecutionService, ExecutionStatus};

/// Interval between status requests unless the host overrides it
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Why a polling loop ended
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Execution finished; the final status carries per-node results
    Completed(ExecutionStatus),
    /// Execution reported an error phase
    Failed(ExecutionStatus),
    /// The host cancelled polling; the execution may still be running
    Cancelled,
}

/// Poll an execution until it reaches a terminal phase or is cancelled
///
/// Every status observed, terminal included, is passed to `on_status`
/// before the outcome is returned. Flipping `cancel` to `true` stops
/// polling only; it does not abort the backend execution.
pub async fn poll_execution<S, F>(
    service: &S,
    execution_id: &str,
    interval: Duration,
    mut cancel: watch::Receiver<bool>,
    mut on_status: F,
) -> Result<PollOutcome>
where
    S: ExecutionService + ?Sized,
    F: FnMut(ExecutionStatus),
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let status = match service.status(execution_id).await {
                    Ok(status) => status,
                    Err(e) => {
                        log::warn!("Status poll for execution '{}' failed: {}", execution_id, e);
                        return Err(e);
                    }
                };
                let phase = status.status;
                on_status(status.clone());
                match phase {
                    ExecutionPhase::Completed => {
                        log::info!("Execution '{}' completed", execution_id);
                        return Ok(PollOutcome::Completed(status));
                    }
                    ExecutionPhase::Error => {
                        log::warn!(
                            "Execution '{}' failed: {}",
                            execution_id,
                            status.error.as_deref().unwrap_or("unknown error")
                        );
                        return Ok(PollOutcome::Failed(status));
                    }
                    _ => {}
                }
            }
            changed = cancel.changed() => {
                // A dropped sender counts as cancellation
                if changed.is_err() || *cancel.borrow() {
                    log::debug!("Polling cancelled for execution '{}'", execution_id);
                    return Ok(PollOutcome::Cancelled);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::ScriptedExecutionService;
    use serde_json::json;

    fn init_test_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn cancel_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
        watch::channel(false)
    }

    #[tokio::test]
    async fn test_polls_until_completed() {
        let service = ScriptedExecutionService::new();
        service.push_status(ExecutionStatus::pending());
        service.push_status(ExecutionStatus::pending());
        service.push_status(ExecutionStatus::completed(json!({ "node-1": {} })));
        let (_tx, rx) = cancel_channel();

        let mut observed = Vec::new();
        let outcome = poll_execution(
            &service,
            "exec-1",
            Duration::from_millis(1),
            rx,
            |status| observed.push(status.status),
        )
        .await
        .unwrap();

        assert!(matches!(outcome, PollOutcome::Completed(status) if status.results.is_some()));
        assert_eq!(
            observed,
            vec![
                ExecutionPhase::Pending,
                ExecutionPhase::Pending,
                ExecutionPhase::Completed
            ]
        );
    }

    #[tokio::test]
    async fn test_error_phase_is_terminal() {
        let service = ScriptedExecutionService::new();
        service.push_status(ExecutionStatus::pending());
        service.push_status(ExecutionStatus::failed("node crashed"));
        let (_tx, rx) = cancel_channel();

        let outcome = poll_execution(&service, "exec-1", Duration::from_millis(1), rx, |_| {})
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            PollOutcome::Failed(status) if status.error.as_deref() == Some("node crashed")
        ));
    }

    #[tokio::test]
    async fn test_cancellation_stops_polling() {
        init_test_logging();
        // Endless pending statuses, so only cancellation can end the loop
        let service = ScriptedExecutionService::new();
        for _ in 0..100 {
            service.push_status(ExecutionStatus::pending());
        }
        let (tx, rx) = cancel_channel();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let _ = tx.send(true);
        });

        let outcome = poll_execution(&service, "exec-1", Duration::from_millis(2), rx, |_| {})
            .await
            .unwrap();

        assert_eq!(outcome, PollOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_collaborator_error_stops_without_retry() {
        init_test_logging();
        let service = ScriptedExecutionService::new();
        service.push_error("backend unavailable");
        service.push_status(ExecutionStatus::completed(json!({})));
        let (_tx, rx) = cancel_channel();

        let mut calls = 0;
        let result = poll_execution(
            &service,
            "exec-1",
            Duration::from_millis(1),
            rx,
            |_| calls += 1,
        )
        .await;

        // The error surfaces before any status reaches the callback
        assert!(result.is_err());
        assert_eq!(calls, 0);
    }
}
