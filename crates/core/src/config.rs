use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub platform: PlatformConfig,
    pub undo: UndoConfig,
    pub favicon: FaviconConfig,
    pub tags: TagConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// `memory` or `chrome`.
    pub provider: String,
    /// Chromium `Bookmarks` file, required by the `chrome` provider.
    pub path: Option<String>,
    /// Container that new tag folders and untagged bookmarks live in.
    pub root_id: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            provider: "memory".to_string(),
            path: None,
            root_id: providers::DEFAULT_ROOT_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UndoConfig {
    pub window_secs: u64,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self { window_secs: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaviconConfig {
    pub service: String,
    pub size: u32,
}

impl Default for FaviconConfig {
    fn default() -> Self {
        Self {
            service: crate::favicon::DEFAULT_SERVICE.to_string(),
            size: 16,
        }
    }
}

/// Folder names skipped when deriving tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TagConfig {
    /// Matched as case-insensitive substrings.
    pub ignore_containing_ci: Vec<String>,
    /// Matched as exact substrings.
    pub ignore_containing: Vec<String>,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            ignore_containing_ci: vec!["bookmarks".to_string()],
            ignore_containing: vec!["Imported".to_string()],
        }
    }
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
