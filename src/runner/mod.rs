use std::time::Duration;

use anyhow::{bail, Result};
use tracing::{error, info, warn};

use crate::config::{Config, RegionConfig};
use crate::models::{RegionOutcome, RegionResult, RunStatistics};
use crate::output;
use crate::sources::SourceFetcher;

pub mod summary;

/// Drive the per-region pipeline over every active region, strictly
/// sequentially, and aggregate the outcomes. Fails only when there is
/// nothing to do or nothing was produced; per-region failures are soft.
pub async fn run(config: &Config) -> Result<RunStatistics> {
    let active = config.active_regions();
    if active.is_empty() {
        bail!("no active regions configured");
    }
    info!("Processing {} active regions", active.len());

    let fetcher = SourceFetcher::new(&config.scraper)?;
    let mut results: Vec<RegionResult> = Vec::with_capacity(active.len());

    for (index, region) in active.into_iter().enumerate() {
        // Remote sources are never hit back to back across regions.
        if index > 0 && config.scraper.region_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.scraper.region_delay_ms)).await;
        }

        let result = process_region(&fetcher, region).await;
        if result.has_data() {
            output::write_region_artifacts(&config.output, &result);
        }
        results.push(result);
    }

    let stats = RunStatistics::compute(&results);
    if config.features.statistics {
        info!(
            "Run complete: {}/{} regions with data, {} channels total",
            stats.regions_with_data, stats.regions_attempted, stats.total_channels
        );
        for region in &stats.regions {
            info!(
                "  {} {} ({}): {} channels in {} categories",
                region.flag, region.name, region.code, region.channel_count, region.category_count
            );
        }
    }

    if stats.regions_with_data == 0 {
        bail!("no region produced any channel data");
    }

    if config.features.summary {
        if let Err(err) = summary::write(&config.output.dir, &stats) {
            error!("Failed to write summary document: {}", err);
        }
    }

    Ok(stats)
}

/// Fetch, normalize and filter one region into its finalized result.
async fn process_region(fetcher: &SourceFetcher, region: &RegionConfig) -> RegionResult {
    if region.code.trim().is_empty() {
        error!("Region '{}' has an empty code, skipping", region.name);
        return RegionResult {
            region: region.clone(),
            channels: Vec::new(),
            outcome: RegionOutcome::Error {
                reason: "empty region code".to_string(),
            },
            source: None,
        };
    }

    info!("Processing region {} {} ({})", region.flag, region.name, region.code);
    let catalog = fetcher.fetch(region).await;

    let outcome = if catalog.channels.is_empty() {
        warn!("No channels collected for {} ({})", region.name, region.code);
        RegionOutcome::NoData {
            reason: "all sources exhausted or empty".to_string(),
        }
    } else {
        RegionOutcome::Success
    };

    RegionResult {
        region: region.clone(),
        channels: catalog.channels,
        outcome,
        source: catalog.source,
    }
}
