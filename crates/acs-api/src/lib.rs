// acs-api: Async Rust client for the northbound REST interface of a TR-069 ACS.

pub mod client;
pub mod devices;
pub mod error;
pub mod files;
pub mod models;
pub mod presets;
pub mod query;
pub mod tags;
pub mod tasks;
pub mod transport;

pub use client::NbiClient;
pub use error::Error;
pub use models::{
    Collection, DeviceIdRecord, DeviceRecord, FileMetadata, FileRecord, FileType, FileUpload,
    ParameterAssignment, Preset, Task, TaskRequest, XsdType,
};
pub use query::{Condition, Operator, Query};
pub use tasks::{Delivery, TaskOutcome};
pub use transport::{TlsMode, TransportConfig};
