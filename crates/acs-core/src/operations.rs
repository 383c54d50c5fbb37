// ── Device operations ──
//
// Typed task submissions. Each helper builds a `TaskRequest`, picks a
// delivery when the caller leaves it open, and makes exactly one
// submission. Outcomes are reported, never retried.

use tracing::{debug, info};

use acs_api::{Delivery, ParameterAssignment, Query, Task, TaskOutcome, TaskRequest};

use crate::client::AcsClient;
use crate::error::CoreError;
use crate::model::ParameterValues;

/// Result of [`AcsClient::read_parameters`].
#[derive(Debug, Clone)]
pub struct ParameterRead {
    /// How the refresh task was received.
    pub outcome: TaskOutcome,
    /// Values read after the task was accepted. When the outcome is
    /// pending these are the values stored before the refresh.
    pub values: ParameterValues,
}

impl ParameterRead {
    /// True when the device ran the refresh, so `values` are current.
    pub fn is_fresh(&self) -> bool {
        self.outcome.is_completed()
    }
}

impl AcsClient {
    /// Delivery used when the caller does not choose one.
    ///
    /// Reboots, resets and value reads/writes queue for the next inform.
    /// Object operations trigger a connection request with the configured
    /// timeout.
    pub fn default_delivery(&self, request: &TaskRequest) -> Delivery {
        match request {
            TaskRequest::Reboot
            | TaskRequest::FactoryReset
            | TaskRequest::GetParameterValues { .. }
            | TaskRequest::SetParameterValues { .. } => Delivery::Queued,
            TaskRequest::RefreshObject { .. }
            | TaskRequest::AddObject { .. }
            | TaskRequest::DeleteObject { .. } => {
                Delivery::connection_request(self.connection_request_timeout())
            }
        }
    }

    /// Submit any task. `None` picks [`default_delivery`](Self::default_delivery).
    pub async fn submit(
        &self,
        device_id: &str,
        request: &TaskRequest,
        delivery: Option<Delivery>,
    ) -> Result<TaskOutcome, CoreError> {
        let delivery = delivery.unwrap_or_else(|| self.default_delivery(request));
        debug!(device_id, task = request.name(), ?delivery, "submitting task");
        Ok(self.api().submit_task(device_id, request, delivery).await?)
    }

    pub async fn reboot(
        &self,
        device_id: &str,
        delivery: Option<Delivery>,
    ) -> Result<TaskOutcome, CoreError> {
        self.submit(device_id, &TaskRequest::Reboot, delivery).await
    }

    /// Factory-reset a device. Its configuration is lost.
    pub async fn factory_reset(
        &self,
        device_id: &str,
        delivery: Option<Delivery>,
    ) -> Result<TaskOutcome, CoreError> {
        info!(device_id, "factory reset requested");
        self.submit(device_id, &TaskRequest::FactoryReset, delivery)
            .await
    }

    /// Ask the device to report current values for `names`.
    pub async fn get_parameter_values(
        &self,
        device_id: &str,
        names: &[&str],
        delivery: Option<Delivery>,
    ) -> Result<TaskOutcome, CoreError> {
        let request = TaskRequest::get_parameter_values(names.iter().copied());
        self.submit(device_id, &request, delivery).await
    }

    pub async fn set_parameter_values(
        &self,
        device_id: &str,
        values: Vec<ParameterAssignment>,
        delivery: Option<Delivery>,
    ) -> Result<TaskOutcome, CoreError> {
        let request = TaskRequest::set_parameter_values(values);
        self.submit(device_id, &request, delivery).await
    }

    /// Re-read an object subtree (e.g. `Device.WiFi.`) from the device.
    pub async fn refresh_object(
        &self,
        device_id: &str,
        object_name: &str,
        delivery: Option<Delivery>,
    ) -> Result<TaskOutcome, CoreError> {
        self.submit(device_id, &TaskRequest::refresh_object(object_name), delivery)
            .await
    }

    pub async fn add_object(
        &self,
        device_id: &str,
        object_name: &str,
        delivery: Option<Delivery>,
    ) -> Result<TaskOutcome, CoreError> {
        self.submit(device_id, &TaskRequest::add_object(object_name), delivery)
            .await
    }

    pub async fn delete_object(
        &self,
        device_id: &str,
        object_name: &str,
        delivery: Option<Delivery>,
    ) -> Result<TaskOutcome, CoreError> {
        self.submit(device_id, &TaskRequest::delete_object(object_name), delivery)
            .await
    }

    /// Fetch fresh values from the device, then read them back.
    ///
    /// Submits `getParameterValues` for `paths` (by default through a
    /// connection request with the configured timeout), then reads the
    /// stored document. A rejected submission returns the error and no
    /// read is made.
    pub async fn read_parameters(
        &self,
        device_id: &str,
        paths: &[&str],
        delivery: Option<Delivery>,
    ) -> Result<ParameterRead, CoreError> {
        let delivery = delivery
            .unwrap_or_else(|| Delivery::connection_request(self.connection_request_timeout()));
        let outcome = self
            .get_parameter_values(device_id, paths, Some(delivery))
            .await?;
        let values = self.parameter_values(device_id, paths).await?;
        Ok(ParameterRead { outcome, values })
    }

    // ── Task lifecycle ───────────────────────────────────────────

    /// Clear a faulted task so the backend runs it again.
    pub async fn retry_task(&self, task_id: &str) -> Result<(), CoreError> {
        self.api().retry_task(task_id).await?;
        Ok(())
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<(), CoreError> {
        self.api().delete_task(task_id).await?;
        Ok(())
    }

    /// Tasks still stored for a device.
    pub async fn pending_tasks(&self, device_id: &str) -> Result<Vec<Task>, CoreError> {
        Ok(self.api().tasks_for_device(device_id).await?)
    }

    /// Pending tasks that hit a fault on the device.
    pub async fn faulted_tasks(&self, device_id: &str) -> Result<Vec<Task>, CoreError> {
        let mut tasks = self.pending_tasks(device_id).await?;
        tasks.retain(Task::has_fault);
        Ok(tasks)
    }

    pub async fn find_tasks(&self, query: &Query) -> Result<Vec<Task>, CoreError> {
        Ok(self.api().find_tasks(query).await?)
    }
}
