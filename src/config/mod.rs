use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::sources::SourceDescriptor;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub regions: Vec<RegionConfig>,
    pub scraper: ScraperConfig,
    pub output: OutputConfig,
    pub features: FeaturesConfig,
}

/// One territory of the catalog. Owned by configuration; the pipeline only
/// ever reads these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    pub code: String,
    pub name: String,
    pub flag: String,
    pub active: bool,
    /// Per-region override for the API-shaped source URL.
    #[serde(default)]
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub retries: u32,
    pub timeout_ms: u64,
    pub user_agent: String,
    pub accept: String,
    pub region_delay_ms: u64,
    /// Channels whose name, id or stream URL contain one of these (case
    /// insensitive) are kept when a source returns a superset catalog.
    pub filter_keywords: Vec<String>,
    /// Candidate sources, tried in order. First non-empty result wins.
    pub sources: Vec<SourceDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub formats: Vec<OutputFormat>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    M3u,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    pub statistics: bool,
    pub summary: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            regions: vec![
                RegionConfig::new("us", "United States", "\u{1F1FA}\u{1F1F8}"),
                RegionConfig::new("uk", "United Kingdom", "\u{1F1EC}\u{1F1E7}"),
                RegionConfig::new("ca", "Canada", "\u{1F1E8}\u{1F1E6}"),
                RegionConfig::new("fr", "France", "\u{1F1EB}\u{1F1F7}"),
                RegionConfig::new("de", "Germany", "\u{1F1E9}\u{1F1EA}"),
                RegionConfig::new("it", "Italy", "\u{1F1EE}\u{1F1F9}"),
                RegionConfig::new("es", "Spain", "\u{1F1EA}\u{1F1F8}"),
                RegionConfig::new("br", "Brazil", "\u{1F1E7}\u{1F1F7}"),
                RegionConfig::new("mx", "Mexico", "\u{1F1F2}\u{1F1FD}"),
            ],
            scraper: ScraperConfig::default(),
            output: OutputConfig {
                dir: PathBuf::from("./data/playlists"),
                formats: vec![OutputFormat::M3u, OutputFormat::Json],
            },
            features: FeaturesConfig {
                statistics: true,
                summary: true,
            },
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            timeout_ms: 15_000,
            user_agent: "Mozilla/5.0".to_string(),
            accept: "text/plain,application/x-mpegURL".to_string(),
            region_delay_ms: 500,
            filter_keywords: vec!["pluto".to_string()],
            sources: SourceDescriptor::defaults(),
        }
    }
}

impl RegionConfig {
    fn new(code: &str, name: &str, flag: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            flag: flag.to_string(),
            active: true,
            api_url: None,
        }
    }
}

impl Config {
    /// Load configuration from the given TOML file, writing a default file
    /// on first run so users have something to edit.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, contents)?;
            Ok(default_config)
        }
    }

    pub fn active_regions(&self) -> Vec<&RegionConfig> {
        self.regions.iter().filter(|r| r.active).collect()
    }
}
