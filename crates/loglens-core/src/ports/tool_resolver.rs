//! Platform tool resolution port.

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::PlatformTool;

/// Errors from resolving a platform tool binary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("{tool} not found (searched: {})", searched.join(", "))]
    NotFound { tool: PlatformTool, searched: Vec<String> },

    #[error("{tool} is not available on {os}")]
    UnsupportedPlatform { tool: PlatformTool, os: String },
}

/// Locates the binary for a platform tool.
pub trait ToolResolver: Send + Sync {
    fn resolve(&self, tool: PlatformTool) -> Result<PathBuf, ToolError>;
}

/// Resolver backed by a fixed table. Unlisted tools are not found.
#[derive(Debug, Clone, Default)]
pub struct StaticToolResolver {
    paths: HashMap<PlatformTool, PathBuf>,
}

impl StaticToolResolver {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, tool: PlatformTool, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(tool, path.into());
        self
    }
}

impl ToolResolver for StaticToolResolver {
    fn resolve(&self, tool: PlatformTool) -> Result<PathBuf, ToolError> {
        self.paths.get(&tool).cloned().ok_or_else(|| ToolError::NotFound {
            tool,
            searched: vec!["static table".to_string()],
        })
    }
}
