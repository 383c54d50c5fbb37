// ── Domain model ──

pub mod device;
pub mod parameter;

pub use device::{Device, DeviceIdentity};
pub use parameter::{Parameter, ParameterNode, ParameterObject, ParameterTree, ParameterValues};
