//! `devices` and `processes` handlers.

use anyhow::Result;
use loglens_core::{DeviceDescriptor, DeviceEnumerator, DeviceProcess, Platform, PlatformTool};
use loglens_runtime::SystemDeviceEnumerator;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{print_separator, truncate_string};

/// List devices for one platform, or both.
pub async fn execute(ctx: &CliContext, platform: Option<Platform>) -> Result<()> {
    let platforms = platform.map_or_else(|| vec![Platform::Android, Platform::Ios], |p| vec![p]);

    // Device listing shells out synchronously.
    let enumerator = ctx.devices.clone();
    let devices = tokio::task::spawn_blocking(move || list_all(&enumerator, &platforms)).await?;

    if ctx.json {
        for device in &devices {
            println!("{}", serde_json::to_string(device)?);
        }
        return Ok(());
    }

    if devices.is_empty() {
        println!("No devices found.");
        println!("Connect an Android device or boot a simulator, then try again.");
        return Ok(());
    }

    println!("{:<8} {:<38} {:<14} Details", "Platform", "ID", "State");
    print_separator(90);
    for device in &devices {
        println!(
            "{:<8} {:<38} {:<14} {}",
            platform_of(device),
            truncate_string(device.id(), 37),
            truncate_string(device.state(), 13),
            device_details(device)
        );
    }
    Ok(())
}

/// List processes on an Android device.
pub async fn processes(ctx: &CliContext, device: &str) -> Result<()> {
    let device = device.trim();
    if device.is_empty() {
        return Err(CliError::Arguments("device serial must not be empty".to_string()).into());
    }
    ctx.resolver
        .resolve(PlatformTool::Adb)
        .map_err(CliError::from)?;

    let enumerator = ctx.devices.clone();
    let serial = device.to_string();
    let processes =
        tokio::task::spawn_blocking(move || enumerator.android_processes(&serial)).await?;

    if ctx.json {
        for process in &processes {
            println!("{}", serde_json::to_string(process)?);
        }
        return Ok(());
    }

    if processes.is_empty() {
        println!("No processes reported by {device}.");
        return Ok(());
    }
    print_processes(&processes);
    Ok(())
}

fn list_all(enumerator: &SystemDeviceEnumerator, platforms: &[Platform]) -> Vec<DeviceDescriptor> {
    platforms
        .iter()
        .flat_map(|&platform| enumerator.list(platform))
        .collect()
}

const fn platform_of(device: &DeviceDescriptor) -> Platform {
    match device {
        DeviceDescriptor::Android(_) => Platform::Android,
        DeviceDescriptor::Ios(_) => Platform::Ios,
    }
}

/// Model or runtime shown after the state column.
fn device_details(device: &DeviceDescriptor) -> String {
    match device {
        DeviceDescriptor::Android(d) => d
            .props
            .get("model")
            .or_else(|| d.props.get("product"))
            .cloned()
            .unwrap_or_default(),
        DeviceDescriptor::Ios(d) => match &d.runtime {
            Some(runtime) => format!("{} ({})", d.name, short_runtime(runtime)),
            None => d.name.clone(),
        },
    }
}

/// `com.apple.CoreSimulator.SimRuntime.iOS-17-2` becomes `iOS 17.2`.
fn short_runtime(runtime: &str) -> String {
    runtime
        .strip_prefix("com.apple.CoreSimulator.SimRuntime.")
        .map_or_else(
            || runtime.to_string(),
            |rest| match rest.split_once('-') {
                Some((os, version)) => format!("{os} {}", version.replace('-', ".")),
                None => rest.to_string(),
            },
        )
}

fn print_processes(processes: &[DeviceProcess]) {
    println!("{:>7}  Name", "PID");
    print_separator(60);
    for process in processes {
        println!("{:>7}  {}", process.pid, process.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::build_context;
    use loglens_core::{AdbDevice, SimulatorDevice, StreamSettings};
    use std::collections::BTreeMap;

    #[test]
    fn test_blank_serial_is_rejected() {
        let ctx = build_context(StreamSettings::with_defaults(), false).unwrap();
        let err = tokio_test::block_on(processes(&ctx, "   ")).unwrap_err();
        let err = err.downcast_ref::<CliError>().unwrap();
        assert!(matches!(err, CliError::Arguments(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_short_runtime() {
        assert_eq!(short_runtime("com.apple.CoreSimulator.SimRuntime.iOS-17-2"), "iOS 17.2");
        assert_eq!(short_runtime("iOS 16.4"), "iOS 16.4");
    }

    #[test]
    fn test_device_details() {
        let mut props = BTreeMap::new();
        props.insert("product".to_string(), "sdk_phone".to_string());
        let android = DeviceDescriptor::Android(AdbDevice {
            id: "emulator-5554".to_string(),
            status: "device".to_string(),
            props,
        });
        assert_eq!(device_details(&android), "sdk_phone");
        assert_eq!(platform_of(&android), Platform::Android);

        let ios = DeviceDescriptor::Ios(SimulatorDevice {
            name: "iPhone 15".to_string(),
            udid: "A1B2".to_string(),
            state: "Booted".to_string(),
            runtime: Some("com.apple.CoreSimulator.SimRuntime.iOS-17-2".to_string()),
        });
        assert_eq!(device_details(&ios), "iPhone 15 (iOS 17.2)");
    }
}
