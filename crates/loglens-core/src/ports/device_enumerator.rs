//! Device enumeration port.

use crate::domain::{DeviceDescriptor, Platform};

/// Lists the devices a stream can target.
///
/// Enumeration is best-effort: a missing tool or an unreachable daemon
/// yields an empty list, never an error.
pub trait DeviceEnumerator: Send + Sync {
    fn list(&self, platform: Platform) -> Vec<DeviceDescriptor>;
}
