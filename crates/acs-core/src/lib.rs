//! Device-management layer between `acs-api` and consumers.
//!
//! - **[`AcsClient`]**: facade over one ACS. Device reads return domain
//!   [`Device`] values; operations submit typed tasks and report whether
//!   the device ran them during the call ([`TaskOutcome::Completed`]) or
//!   they were stored for a later session ([`TaskOutcome::Pending`]).
//!
//! - **Parameter trees** ([`ParameterTree`]): the device data model as a
//!   typed tree with path lookup and bulk [`extract`](ParameterTree::extract),
//!   where a missing path is `None`, never an error.
//!
//! - **[`CoreError`]**: every failure carries the attempted operation,
//!   the target identifier, and what the backend reported.

pub mod admin;
pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod operations;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::AcsClient;
pub use config::{ClientConfig, TlsVerification};
pub use error::CoreError;
pub use operations::ParameterRead;

pub use model::{
    Device, DeviceIdentity, Parameter, ParameterNode, ParameterObject, ParameterTree,
    ParameterValues,
};

// Wire types callers build requests from.
pub use acs_api::{
    Delivery, FileRecord, FileType, FileUpload, ParameterAssignment, Preset, Query, Task,
    TaskOutcome, TaskRequest, XsdType,
};
