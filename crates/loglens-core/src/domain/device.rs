//! Device descriptors returned by the `DeviceEnumerator` port.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A device line from `adb devices -l`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdbDevice {
    /// Serial passed to `adb -s`.
    pub id: String,
    /// `device`, `offline`, `unauthorized`, ...
    pub status: String,
    /// `key:value` details such as `model` and `transport_id`.
    pub props: BTreeMap<String, String>,
}

/// A simulator from `xcrun simctl list devices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatorDevice {
    pub name: String,
    pub udid: String,
    pub state: String,
    pub runtime: Option<String>,
}

/// A process running on an Android device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProcess {
    pub pid: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum DeviceDescriptor {
    Android(AdbDevice),
    Ios(SimulatorDevice),
}

impl DeviceDescriptor {
    /// Identifier to pass back in stream options.
    pub fn id(&self) -> &str {
        match self {
            Self::Android(device) => &device.id,
            Self::Ios(device) => &device.udid,
        }
    }

    pub fn state(&self) -> &str {
        match self {
            Self::Android(device) => &device.status,
            Self::Ios(device) => &device.state,
        }
    }
}
