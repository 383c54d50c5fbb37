// Task endpoints
//
// Task submission is the one place where the backend's status code
// carries meaning beyond success/failure: 200 means the device was reached
// and the task ran, 202 means the task was stored for the next session.
// Everything else is a rejection.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::client::{NbiClient, Op, decode, error_message, require};
use crate::error::Error;
use crate::models::{Collection, Task, TaskRequest};
use crate::query::Query;

/// How a task reaches the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delivery {
    /// Stored until the device next informs. The backend acknowledges at
    /// once; nothing waits.
    #[default]
    Queued,
    /// The backend sends a connection request and waits up to `timeout`
    /// for the device to run the task.
    ConnectionRequest { timeout: Duration },
}

impl Delivery {
    /// Backend-side wait used when a caller asks for a connection request
    /// without choosing a timeout.
    pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_millis(3000);

    pub fn connection_request(timeout: Duration) -> Self {
        Self::ConnectionRequest { timeout }
    }

    pub fn triggers_connection(&self) -> bool {
        matches!(self, Self::ConnectionRequest { .. })
    }

    pub fn timeout(&self) -> Option<Duration> {
        match self {
            Self::Queued => None,
            Self::ConnectionRequest { timeout } => Some(*timeout),
        }
    }
}

/// Accepted submission. Rejections are [`Error::TaskRejected`].
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    /// HTTP 200: the device ran the task during this call.
    Completed(Task),
    /// HTTP 202: the task is stored and will run on a later session.
    Pending(Task),
}

impl TaskOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    pub fn task(&self) -> &Task {
        match self {
            Self::Completed(task) | Self::Pending(task) => task,
        }
    }

    pub fn into_task(self) -> Task {
        match self {
            Self::Completed(task) | Self::Pending(task) => task,
        }
    }
}

/// Backend wait in whole milliseconds, rounded up so a sub-millisecond
/// timeout never reaches the wire as `0`.
fn wire_millis(timeout: Duration) -> u128 {
    timeout.as_nanos().div_ceil(1_000_000).max(1)
}

impl NbiClient {
    /// Create a task for a device.
    ///
    /// `POST /devices/{id}/tasks[?connection_request&timeout=<ms>]`
    ///
    /// Exactly one request is made; the task is never resubmitted here. A
    /// connection-request submission gets a transport timeout of the
    /// client timeout plus the task timeout. When the client timeout is
    /// unknown (see [`with_client`](Self::with_client)), the wrapped
    /// client's own timeout applies unchanged.
    pub async fn submit_task(
        &self,
        device_id: &str,
        request: &TaskRequest,
        delivery: Delivery,
    ) -> Result<TaskOutcome, Error> {
        require("device id", device_id)?;

        let mut url = self.url(&[Collection::Devices.as_ref(), device_id, "tasks"]);
        if let Some(timeout) = delivery.timeout() {
            url.set_query(Some(&format!(
                "connection_request&timeout={}",
                wire_millis(timeout)
            )));
        }
        debug!(task = request.name(), "POST {url}");

        let mut builder = self.http().post(url).json(request);
        if let (Some(task), Some(transport)) = (delivery.timeout(), self.timeout()) {
            builder = builder.timeout(transport.saturating_add(task));
        }
        let resp = builder.send().await?;

        let status = resp.status();
        match status.as_u16() {
            code @ (200 | 202) => {
                let body = resp.text().await?;
                let task = if body.trim().is_empty() {
                    Task::unrecorded(device_id, request)
                } else {
                    decode(body)?
                };
                if code == 200 {
                    info!(device_id, task = request.name(), "task completed");
                    Ok(TaskOutcome::Completed(task))
                } else {
                    info!(device_id, task = request.name(), "task queued");
                    Ok(TaskOutcome::Pending(task))
                }
            }
            code => {
                let message = error_message(status, resp).await;
                warn!(device_id, task = request.name(), status = code, %message, "task rejected");
                Err(Error::TaskRejected {
                    device_id: device_id.to_owned(),
                    task: request.name(),
                    status: code,
                    message,
                })
            }
        }
    }

    /// Re-queue a faulted task.
    ///
    /// `POST /tasks/{id}/retry`
    pub async fn retry_task(&self, task_id: &str) -> Result<(), Error> {
        require("task id", task_id)?;
        let url = self.url(&[Collection::Tasks.as_ref(), task_id, "retry"]);
        debug!(task_id, "retrying task");
        self.post_empty(url, &Op::entry("retry task", Collection::Tasks, task_id))
            .await
    }

    /// Remove a task regardless of its state.
    ///
    /// `DELETE /tasks/{id}`
    pub async fn delete_task(&self, task_id: &str) -> Result<(), Error> {
        require("task id", task_id)?;
        let url = self.url(&[Collection::Tasks.as_ref(), task_id]);
        debug!(task_id, "deleting task");
        self.delete(url, &Op::entry("delete task", Collection::Tasks, task_id))
            .await
    }

    /// `GET /tasks/?query=...`
    pub async fn find_tasks(&self, query: &Query) -> Result<Vec<Task>, Error> {
        self.search(Collection::Tasks, query, &[]).await
    }

    /// Tasks still stored for a device (queued or faulted).
    pub async fn tasks_for_device(&self, device_id: &str) -> Result<Vec<Task>, Error> {
        require("device id", device_id)?;
        self.find_tasks(&Query::new().eq("device", device_id)).await
    }
}
