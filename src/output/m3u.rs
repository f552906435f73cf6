use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::models::{Channel, RegionResult};

const HEADER: &str = "#EXTM3U";
const CACHE_DIRECTIVE: &str = "#EXT-X-ALLOW-CACHE:YES";

/// Serialize a finalized channel list in playlist form: header, caching
/// directive, then one metadata+URL block per channel in pipeline order,
/// blocks separated by a blank line.
pub fn generate(channels: &[Channel]) -> String {
    let mut m3u = format!("{HEADER}\n{CACHE_DIRECTIVE}\n\n");

    for channel in channels {
        // Normalization already excludes these; last-resort guard so a bad
        // record can never produce a malformed block.
        if channel.stream_url.is_empty() {
            continue;
        }

        // Double quotes would break the attribute quoting.
        let name = channel.name.replace('"', "'");
        m3u.push_str(&format!(
            "#EXTINF:-1 tvg-id=\"{}\" tvg-name=\"{}\" tvg-logo=\"{}\" group-title=\"{}\",{}\n",
            channel.id, name, channel.logo, channel.category, name
        ));
        m3u.push_str(&channel.stream_url);
        m3u.push_str("\n\n");
    }

    m3u
}

pub fn write(dir: &Path, result: &RegionResult) -> Result<PathBuf> {
    let path = dir.join(format!("{}.m3u", result.region.code));
    std::fs::write(&path, generate(&result.channels))?;
    debug!("Wrote playlist artifact {}", path.display());
    Ok(path)
}
