use tracing::error;

use crate::config::{OutputConfig, OutputFormat};
use crate::models::RegionResult;

pub mod json;
pub mod m3u;

/// Write every enabled artifact for one region. Write failures are logged
/// with region context and isolated: a failed format never aborts the run
/// or blocks another region's artifacts.
pub fn write_region_artifacts(output: &OutputConfig, result: &RegionResult) {
    if let Err(err) = std::fs::create_dir_all(&output.dir) {
        error!(
            "Failed to create output directory {}: {}",
            output.dir.display(),
            err
        );
        return;
    }

    for format in &output.formats {
        let outcome = match format {
            OutputFormat::M3u => m3u::write(&output.dir, result),
            OutputFormat::Json => json::write(&output.dir, result),
        };
        if let Err(err) = outcome {
            error!(
                "Failed to write {:?} artifact for region {}: {}",
                format, result.region.code, err
            );
        }
    }
}
