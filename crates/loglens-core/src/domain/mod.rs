//! Domain types shared by every layer.

mod device;
mod entry;
mod platform;
mod severity;

pub use device::{AdbDevice, DeviceDescriptor, DeviceProcess, SimulatorDevice};
pub use entry::{AndroidEntry, IosEntry, LogEntry, UNKNOWN_PROCESS};
pub use platform::{Platform, PlatformTool};
pub use severity::Severity;
