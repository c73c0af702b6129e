//! Execution-service collaborator
//!
//! The editor never runs a workflow itself. Submission hands a
//! canonical workflow document to the backend and receives an opaque
//! execution id; progress is observed by polling (see [`crate::poll`]).

use std::collections::VecDeque;

use async_trait::async_trait;
use graph_engine::WorkflowDocument;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ServiceError};

/// Lifecycle phase of a submitted execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPhase {
    Submitting,
    Pending,
    Completed,
    Error,
}

impl ExecutionPhase {
    /// Whether this phase ends the polling loop
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionPhase::Completed | ExecutionPhase::Error)
    }
}

/// One status report for a running execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    pub status: ExecutionPhase,
    /// Per-node results keyed by node id, present once completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionStatus {
    pub fn pending() -> Self {
        Self {
            status: ExecutionPhase::Pending,
            results: None,
            error: None,
        }
    }

    pub fn completed(results: Value) -> Self {
        Self {
            status: ExecutionPhase::Completed,
            results: Some(results),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: ExecutionPhase::Error,
            results: None,
            error: Some(message.into()),
        }
    }
}

/// Backend that runs submitted workflows
#[async_trait]
pub trait ExecutionService: Send + Sync {
    /// Submit a workflow for execution, returning its execution id
    async fn submit(&self, workflow: &WorkflowDocument) -> Result<String>;

    /// Report the current status of an execution
    async fn status(&self, execution_id: &str) -> Result<ExecutionStatus>;
}

#[derive(Deserialize)]
struct SubmitResponse {
    execution_id: String,
}

/// HTTP-backed execution collaborator
pub struct HttpExecutionService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpExecutionService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ExecutionService for HttpExecutionService {
    async fn submit(&self, workflow: &WorkflowDocument) -> Result<String> {
        let url = format!("{}/executions", self.base_url);
        let response: SubmitResponse = self
            .client
            .post(&url)
            .json(workflow)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        log::info!(
            "Submitted workflow '{}' as execution '{}'",
            workflow.name,
            response.execution_id
        );
        Ok(response.execution_id)
    }

    async fn status(&self, execution_id: &str) -> Result<ExecutionStatus> {
        let url = format!("{}/executions/{}", self.base_url, execution_id);
        let status = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(status)
    }
}

enum ScriptedReply {
    Status(ExecutionStatus),
    Error(String),
}

/// Execution service answering from a pre-loaded script
///
/// Used by tests and by hosts running without a backend. Each `status`
/// call consumes the next scripted reply; once the script is exhausted
/// the last terminal answer would normally have stopped the caller, so
/// further calls report an empty completion.
#[derive(Default)]
pub struct ScriptedExecutionService {
    replies: Mutex<VecDeque<ScriptedReply>>,
    submitted: Mutex<Vec<String>>,
}

impl ScriptedExecutionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_status(&self, status: ExecutionStatus) {
        self.replies.lock().push_back(ScriptedReply::Status(status));
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.replies
            .lock()
            .push_back(ScriptedReply::Error(message.into()));
    }

    /// Names of workflows submitted so far
    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().clone()
    }
}

#[async_trait]
impl ExecutionService for ScriptedExecutionService {
    async fn submit(&self, workflow: &WorkflowDocument) -> Result<String> {
        self.submitted.lock().push(workflow.name.clone());
        Ok(format!("exec-{}", uuid::Uuid::new_v4()))
    }

    async fn status(&self, _execution_id: &str) -> Result<ExecutionStatus> {
        match self.replies.lock().pop_front() {
            Some(ScriptedReply::Status(status)) => Ok(status),
            Some(ScriptedReply::Error(message)) => Err(ServiceError::Execution(message)),
            None => Ok(ExecutionStatus::completed(Value::Null)),
        }
    }
}
