use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::models::{Channel, RegionResult};

/// Schema version of the structured-data artifact.
const FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Serialize)]
pub struct RegionDocument<'a> {
    pub region: RegionDescriptor<'a>,
    pub metadata: DocumentMetadata<'a>,
    pub channels: &'a [Channel],
}

#[derive(Debug, Serialize)]
pub struct RegionDescriptor<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub flag: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata<'a> {
    pub generated_at: DateTime<Utc>,
    pub total_channels: usize,
    pub version: &'a str,
    pub source: &'a str,
}

/// Assemble the structured-data document for one region. The timestamp is
/// a parameter so generation stays deterministic under test.
pub fn build<'a>(result: &'a RegionResult, generated_at: DateTime<Utc>) -> RegionDocument<'a> {
    RegionDocument {
        region: RegionDescriptor {
            code: &result.region.code,
            name: &result.region.name,
            flag: &result.region.flag,
        },
        metadata: DocumentMetadata {
            generated_at,
            total_channels: result.channels.len(),
            version: FORMAT_VERSION,
            source: result.source.as_deref().unwrap_or("unknown"),
        },
        channels: &result.channels,
    }
}

pub fn write(dir: &Path, result: &RegionResult) -> Result<PathBuf> {
    let document = build(result, Utc::now());
    let path = dir.join(format!("{}.json", result.region.code));
    std::fs::write(&path, serde_json::to_string_pretty(&document)?)?;
    debug!("Wrote structured-data artifact {}", path.display());
    Ok(path)
}
