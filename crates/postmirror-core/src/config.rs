use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// CSS selectors used to locate post metadata and images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Region holding the heading and sub-heading (first match wins).
    pub main_content: String,
    /// Heading inside the main region; its first text node is the title.
    pub heading: String,
    /// Sub-heading inside the main region: "<classification> <published_at>".
    pub subheading: String,
    /// Image elements, matched document-wide.
    pub picture: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            main_content: ".main".to_string(),
            heading: "h1".to_string(),
            subheading: "h2".to_string(),
            picture: ".pic img".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/postmirror/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Number of source pages processed at once.
    pub page_workers: usize,
    /// Number of resource downloads in flight per page.
    pub resource_workers: usize,
    /// Connect timeout per request, in seconds.
    pub connect_timeout_secs: u64,
    /// Abort a transfer slower than this many bytes/sec for `low_speed_time_secs`.
    pub low_speed_limit_bytes: u32,
    pub low_speed_time_secs: u64,
    /// Maximum redirects followed per request.
    pub max_redirections: u32,
    /// Optional `User-Agent` header.
    pub user_agent: Option<String>,
    /// Extra request headers sent with every request (e.g. `Referer`).
    pub headers: BTreeMap<String, String>,
    pub selectors: SelectorConfig,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            page_workers: 4,
            resource_workers: 8,
            connect_timeout_secs: 15,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            max_redirections: 10,
            user_agent: None,
            headers: BTreeMap::new(),
            selectors: SelectorConfig::default(),
        }
    }
}

impl MirrorConfig {
    /// Applies CLI overrides for the pool sizes; zero is raised to one.
    pub fn with_workers(mut self, pages: Option<usize>, resources: Option<usize>) -> Self {
        if let Some(n) = pages {
            self.page_workers = n.max(1);
        }
        if let Some(n) = resources {
            self.resource_workers = n.max(1);
        }
        self
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("postmirror")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MirrorConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MirrorConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file. Missing keys take defaults.
pub fn load_from_path(path: &Path) -> Result<MirrorConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: MirrorConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
