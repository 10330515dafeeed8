//! Locating `adb` and `xcrun` on the host.

use std::path::{Path, PathBuf};

use loglens_core::{PlatformTool, StreamSettings, ToolError, ToolResolver};
use tracing::{debug, warn};

/// Well-known SDK install locations relative to the home directory.
const HOME_SDK_DIRS: &[&str] = &["Library/Android/sdk", "Android/Sdk"];

/// Well-known system-wide SDK install locations.
const SYSTEM_SDK_DIRS: &[&str] = &["/usr/local/share/android-sdk", "/opt/android-sdk"];

/// Environment variables that point at an Android SDK root, in priority order.
const SDK_ENV_VARS: &[&str] = &["ANDROID_SDK_ROOT", "ANDROID_HOME"];

/// Resolves tools from an explicit override, then `PATH`, then well-known
/// install locations.
#[derive(Debug, Clone, Default)]
pub struct SystemToolResolver {
    adb_override: Option<PathBuf>,
    xcrun_override: Option<PathBuf>,
}

impl SystemToolResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &StreamSettings) -> Self {
        Self {
            adb_override: settings.adb_path.clone(),
            xcrun_override: settings.xcrun_path.clone(),
        }
    }

    fn resolve_adb(&self) -> Result<PathBuf, ToolError> {
        let tool = PlatformTool::Adb;
        let mut searched = Vec::new();

        if let Some(path) = usable_override(tool, self.adb_override.as_deref(), &mut searched) {
            return Ok(path);
        }

        searched.push("PATH".to_string());
        if let Ok(path) = which::which(tool.binary_name()) {
            debug!(path = %path.display(), "Found adb on PATH");
            return Ok(path);
        }

        let home = dirs::home_dir();
        for candidate in sdk_adb_candidates(|key| std::env::var(key).ok(), home.as_deref()) {
            if candidate.is_file() {
                debug!(path = %candidate.display(), "Found adb in Android SDK");
                return Ok(candidate);
            }
            searched.push(candidate.display().to_string());
        }

        Err(ToolError::NotFound { tool, searched })
    }

    fn resolve_xcrun(&self) -> Result<PathBuf, ToolError> {
        let tool = PlatformTool::Xcrun;
        if !cfg!(target_os = "macos") {
            return Err(ToolError::UnsupportedPlatform {
                tool,
                os: std::env::consts::OS.to_string(),
            });
        }

        let mut searched = Vec::new();
        if let Some(path) = usable_override(tool, self.xcrun_override.as_deref(), &mut searched) {
            return Ok(path);
        }

        searched.push("PATH".to_string());
        if let Ok(path) = which::which(tool.binary_name()) {
            return Ok(path);
        }

        let fallback = PathBuf::from("/usr/bin/xcrun");
        if fallback.is_file() {
            return Ok(fallback);
        }
        searched.push(fallback.display().to_string());

        Err(ToolError::NotFound { tool, searched })
    }
}

impl ToolResolver for SystemToolResolver {
    fn resolve(&self, tool: PlatformTool) -> Result<PathBuf, ToolError> {
        match tool {
            PlatformTool::Adb => self.resolve_adb(),
            PlatformTool::Xcrun => self.resolve_xcrun(),
        }
    }
}

/// An override wins when it points at a file. A stale override is reported
/// and skipped.
fn usable_override(
    tool: PlatformTool,
    path: Option<&Path>,
    searched: &mut Vec<String>,
) -> Option<PathBuf> {
    let path = path?;
    if path.is_file() {
        debug!(%tool, path = %path.display(), "Using configured tool path");
        return Some(path.to_path_buf());
    }
    warn!(%tool, path = %path.display(), "Configured tool path does not exist, falling back to lookup");
    searched.push(path.display().to_string());
    None
}

/// Candidate `adb` locations inside Android SDK installs, most specific
/// first.
pub fn sdk_adb_candidates<F>(lookup: F, home: Option<&Path>) -> Vec<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let adb = format!("adb{}", std::env::consts::EXE_SUFFIX);
    let mut roots: Vec<PathBuf> = SDK_ENV_VARS
        .iter()
        .filter_map(|key| lookup(key))
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .collect();

    if let Some(home) = home {
        roots.extend(HOME_SDK_DIRS.iter().map(|dir| home.join(dir)));
    }
    roots.extend(SYSTEM_SDK_DIRS.iter().map(PathBuf::from));

    let mut candidates: Vec<PathBuf> = Vec::new();
    for root in roots {
        let candidate = root.join("platform-tools").join(&adb);
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sdk_candidates_order() {
        let lookup = |key: &str| match key {
            "ANDROID_SDK_ROOT" => Some("/sdk/root".to_string()),
            "ANDROID_HOME" => Some("/sdk/home".to_string()),
            _ => None,
        };
        let candidates = sdk_adb_candidates(lookup, Some(Path::new("/home/dev")));
        let adb = format!("adb{}", std::env::consts::EXE_SUFFIX);

        assert_eq!(candidates[0], Path::new("/sdk/root/platform-tools").join(&adb));
        assert_eq!(candidates[1], Path::new("/sdk/home/platform-tools").join(&adb));
        assert_eq!(
            candidates[2],
            Path::new("/home/dev/Library/Android/sdk/platform-tools").join(&adb)
        );
        assert_eq!(candidates.len(), 6);
    }

    #[test]
    fn test_sdk_candidates_skip_blank_env_and_dedupe() {
        let lookup = |key: &str| match key {
            "ANDROID_SDK_ROOT" => Some("/opt/android-sdk".to_string()),
            "ANDROID_HOME" => Some("  ".to_string()),
            _ => None,
        };
        let candidates = sdk_adb_candidates(lookup, None);
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_override_wins() {
        let dir = TempDir::new().unwrap();
        let fake_adb = dir.path().join("adb");
        std::fs::write(&fake_adb, "").unwrap();

        let resolver = SystemToolResolver {
            adb_override: Some(fake_adb.clone()),
            xcrun_override: None,
        };
        assert_eq!(resolver.resolve(PlatformTool::Adb).unwrap(), fake_adb);
    }

    #[test]
    fn test_missing_override_is_recorded() {
        let mut searched = Vec::new();
        let path = Path::new("/definitely/not/here/adb");
        assert!(usable_override(PlatformTool::Adb, Some(path), &mut searched).is_none());
        assert_eq!(searched, vec!["/definitely/not/here/adb".to_string()]);
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn test_xcrun_unsupported_off_macos() {
        let err = SystemToolResolver::new().resolve(PlatformTool::Xcrun).unwrap_err();
        assert!(matches!(err, ToolError::UnsupportedPlatform { tool: PlatformTool::Xcrun, .. }));
    }
}
