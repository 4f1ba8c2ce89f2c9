use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Relative location of the project config file.
pub const CONFIG_PATH: &str = ".clientdesk/config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub board: BoardConfig,
}

/// What to do with a CSV file longer than `max_rows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowCapPolicy {
    /// Refuse the whole file.
    #[default]
    Reject,
    /// Keep the first `max_rows` rows.
    Truncate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
    #[serde(default)]
    pub on_overflow: RowCapPolicy,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_rows: default_max_rows(),
            on_overflow: RowCapPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// How long a moved card stays highlighted.
    #[serde(default = "default_highlight_ms")]
    pub highlight_ms: u64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            highlight_ms: default_highlight_ms(),
        }
    }
}

impl BoardConfig {
    #[must_use]
    pub const fn highlight(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }
}

/// Load `.clientdesk/config.toml` under `project_root`, or defaults when absent.
///
/// # Errors
///
/// Fails when the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(CONFIG_PATH);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

const fn default_max_rows() -> usize {
    500
}

const fn default_highlight_ms() -> u64 {
    1500
}
