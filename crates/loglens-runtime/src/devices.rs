//! Device enumeration through `adb` and `simctl`.
//!
//! The parsers are pure functions over tool output; [`SystemDeviceEnumerator`]
//! runs the tools and treats any failure as "no devices".

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;
use std::sync::{Arc, LazyLock};

use loglens_core::{
    AdbDevice, DeviceDescriptor, DeviceEnumerator, DeviceProcess, Platform, PlatformTool,
    SimulatorDevice, ToolResolver,
};
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

const BOOTED: &str = "Booted";

static RUNTIME_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^--\s*(.+?)\s*--$").expect("runtime header pattern is valid"));

static BOOTED_DEVICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^(]+?)\s+\(([0-9a-fA-F-]+)\)\s+\((Booted)\)")
        .expect("simulator line pattern is valid")
});

/// Runs `adb` and `xcrun` to list devices.
#[derive(Clone)]
pub struct SystemDeviceEnumerator {
    resolver: Arc<dyn ToolResolver>,
}

impl std::fmt::Debug for SystemDeviceEnumerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemDeviceEnumerator").finish_non_exhaustive()
    }
}

impl SystemDeviceEnumerator {
    pub fn new(resolver: Arc<dyn ToolResolver>) -> Self {
        Self { resolver }
    }

    pub fn android_devices(&self) -> Vec<AdbDevice> {
        self.run(PlatformTool::Adb, &["devices", "-l"])
            .map(|out| parse_adb_devices(&out))
            .unwrap_or_default()
    }

    /// Booted simulators, from the JSON listing when it parses and has
    /// entries, otherwise from the plain-text listing.
    pub fn booted_simulators(&self) -> Vec<SimulatorDevice> {
        if let Some(json) = self.run(PlatformTool::Xcrun, &["simctl", "list", "devices", "booted", "--json"]) {
            match parse_simctl_json(&json) {
                Ok(devices) if !devices.is_empty() => return devices,
                Ok(_) => {}
                Err(e) => debug!(error = %e, "simctl JSON listing did not parse"),
            }
        }

        self.run(PlatformTool::Xcrun, &["simctl", "list", "devices"])
            .map(|out| parse_simctl_text(&out))
            .unwrap_or_default()
    }

    /// Processes running on an Android device, sorted by name.
    pub fn android_processes(&self, device: &str) -> Vec<DeviceProcess> {
        self.run(PlatformTool::Adb, &["-s", device, "shell", "ps", "-A", "-o", "PID,NAME"])
            .map(|out| parse_adb_processes(&out))
            .unwrap_or_default()
    }

    fn run(&self, tool: PlatformTool, args: &[&str]) -> Option<String> {
        let program = match self.resolver.resolve(tool) {
            Ok(program) => program,
            Err(e) => {
                debug!(%tool, error = %e, "Tool unavailable for device listing");
                return None;
            }
        };
        run_tool(&program, args)
    }
}

fn run_tool(program: &Path, args: &[&str]) -> Option<String> {
    match Command::new(program).args(args).output() {
        Ok(output) if output.status.success() => {
            Some(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(output) => {
            debug!(
                program = %program.display(),
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "Device listing command failed"
            );
            None
        }
        Err(e) => {
            debug!(program = %program.display(), error = %e, "Device listing command did not run");
            None
        }
    }
}

impl DeviceEnumerator for SystemDeviceEnumerator {
    fn list(&self, platform: Platform) -> Vec<DeviceDescriptor> {
        match platform {
            Platform::Android => self
                .android_devices()
                .into_iter()
                .map(DeviceDescriptor::Android)
                .collect(),
            Platform::Ios => self
                .booted_simulators()
                .into_iter()
                .map(DeviceDescriptor::Ios)
                .collect(),
        }
    }
}

/// Parse `adb devices -l`. The header line and daemon notices (`* ...`)
/// are skipped.
pub fn parse_adb_devices(output: &str) -> Vec<AdbDevice> {
    output
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('*'))
        .map(|line| {
            let mut parts = line.split_whitespace();
            let id = parts.next().unwrap_or_default().to_string();
            let status = parts.next().unwrap_or_default().to_string();
            let props = parts
                .filter_map(|detail| detail.split_once(':'))
                .filter(|(key, value)| !key.is_empty() && !value.is_empty())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect();
            AdbDevice { id, status, props }
        })
        .collect()
}

#[derive(Deserialize)]
struct SimctlListing {
    #[serde(default)]
    devices: BTreeMap<String, Vec<SimctlDevice>>,
}

#[derive(Deserialize)]
struct SimctlDevice {
    name: String,
    udid: String,
    state: String,
}

/// Parse `xcrun simctl list devices booted --json`, keeping booted devices.
pub fn parse_simctl_json(output: &str) -> Result<Vec<SimulatorDevice>, serde_json::Error> {
    let listing: SimctlListing = serde_json::from_str(output)?;
    Ok(listing
        .devices
        .into_iter()
        .flat_map(|(runtime, devices)| {
            devices
                .into_iter()
                .filter(|device| device.state == BOOTED)
                .map(move |device| SimulatorDevice {
                    name: device.name,
                    udid: device.udid,
                    state: device.state,
                    runtime: Some(runtime.clone()),
                })
        })
        .collect())
}

/// Parse the plain-text `xcrun simctl list devices` output, keeping booted
/// devices and the runtime section each appears under.
pub fn parse_simctl_text(output: &str) -> Vec<SimulatorDevice> {
    let mut runtime: Option<String> = None;
    let mut devices = Vec::new();

    for line in output.lines().map(str::trim) {
        if let Some(caps) = RUNTIME_HEADER.captures(line) {
            runtime = Some(caps[1].to_string());
            continue;
        }
        if let Some(caps) = BOOTED_DEVICE.captures(line) {
            devices.push(SimulatorDevice {
                name: caps[1].trim().to_string(),
                udid: caps[2].to_string(),
                state: caps[3].to_string(),
                runtime: runtime.clone(),
            });
        }
    }
    devices
}

/// Parse `ps -A -o PID,NAME` output, sorted by process name.
pub fn parse_adb_processes(output: &str) -> Vec<DeviceProcess> {
    let mut processes: Vec<DeviceProcess> = output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let (pid, name) = line.trim().split_once(char::is_whitespace)?;
            Some(DeviceProcess {
                pid: pid.parse().ok()?,
                name: name.trim().to_string(),
            })
        })
        .filter(|process| !process.name.is_empty())
        .collect();
    processes.sort_by(|a, b| a.name.cmp(&b.name).then(a.pid.cmp(&b.pid)));
    processes
}
