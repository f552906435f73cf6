use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::models::RunStatistics;

/// Render the human-readable run report.
pub fn render(stats: &RunStatistics) -> String {
    let mut doc = String::new();
    doc.push_str("# Channel Catalog Summary\n\n");
    doc.push_str(&format!(
        "Generated: {}\n\n",
        stats.generated_at.to_rfc3339()
    ));
    doc.push_str(&format!(
        "- Regions attempted: {}\n",
        stats.regions_attempted
    ));
    doc.push_str(&format!(
        "- Regions with data: {}\n",
        stats.regions_with_data
    ));
    doc.push_str(&format!(
        "- Regions without data: {}\n",
        stats.regions_without_data
    ));
    doc.push_str(&format!("- Total channels: {}\n\n", stats.total_channels));

    doc.push_str("| Region | Code | Channels | Categories |\n");
    doc.push_str("|--------|------|----------|------------|\n");
    for region in &stats.regions {
        doc.push_str(&format!(
            "| {} {} | {} | {} | {} |\n",
            region.flag, region.name, region.code, region.channel_count, region.category_count
        ));
    }

    doc
}

pub fn write(dir: &Path, stats: &RunStatistics) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join("summary.md");
    std::fs::write(&path, render(stats))?;
    debug!("Wrote summary document {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RegionStats;
    use chrono::Utc;

    #[test]
    fn test_render_lists_every_region_with_data() {
        let stats = RunStatistics {
            generated_at: Utc::now(),
            regions_attempted: 3,
            regions_with_data: 2,
            regions_without_data: 1,
            total_channels: 12,
            regions: vec![
                RegionStats {
                    code: "us".to_string(),
                    name: "United States".to_string(),
                    flag: "\u{1F1FA}\u{1F1F8}".to_string(),
                    channel_count: 8,
                    category_count: 3,
                },
                RegionStats {
                    code: "fr".to_string(),
                    name: "France".to_string(),
                    flag: "\u{1F1EB}\u{1F1F7}".to_string(),
                    channel_count: 4,
                    category_count: 2,
                },
            ],
        };

        let doc = render(&stats);
        assert!(doc.contains("- Total channels: 12"));
        assert!(doc.contains("| \u{1F1FA}\u{1F1F8} United States | us | 8 | 3 |"));
        assert!(doc.contains("| \u{1F1EB}\u{1F1F7} France | fr | 4 | 2 |"));
    }
}
