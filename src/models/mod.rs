use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::RegionConfig;

/// Canonical channel record produced by normalization. Field names are
/// serialized camelCase to match the structured-data artifact schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub number: i64,
    pub category: String,
    pub logo: String,
    pub stream_url: String,
    pub region: String,
    pub language: String,
    pub summary: String,
    pub featured: bool,
}

impl Channel {
    /// Fresh identifier for records whose source provides none. Unique
    /// within a run, never empty.
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }
}

/// Outcome of processing a single region.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionOutcome {
    Success,
    NoData { reason: String },
    Error { reason: String },
}

/// Transient aggregate consumed by the artifact writer and the run
/// aggregator, discarded after the run.
#[derive(Debug, Clone)]
pub struct RegionResult {
    pub region: RegionConfig,
    pub channels: Vec<Channel>,
    pub outcome: RegionOutcome,
    /// Name of the source that supplied the channels, when any did.
    pub source: Option<String>,
}

impl RegionResult {
    pub fn has_data(&self) -> bool {
        matches!(self.outcome, RegionOutcome::Success) && !self.channels.is_empty()
    }
}

/// Read-only view over all region results, computed once at end of run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatistics {
    pub generated_at: DateTime<Utc>,
    pub regions_attempted: usize,
    pub regions_with_data: usize,
    pub regions_without_data: usize,
    pub total_channels: usize,
    pub regions: Vec<RegionStats>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStats {
    pub code: String,
    pub name: String,
    pub flag: String,
    pub channel_count: usize,
    pub category_count: usize,
}

impl RunStatistics {
    pub fn compute(results: &[RegionResult]) -> Self {
        let regions: Vec<RegionStats> = results
            .iter()
            .filter(|r| r.has_data())
            .map(|r| {
                let mut categories: Vec<&str> =
                    r.channels.iter().map(|c| c.category.as_str()).collect();
                categories.sort_unstable();
                categories.dedup();
                RegionStats {
                    code: r.region.code.clone(),
                    name: r.region.name.clone(),
                    flag: r.region.flag.clone(),
                    channel_count: r.channels.len(),
                    category_count: categories.len(),
                }
            })
            .collect();

        let regions_with_data = regions.len();
        Self {
            generated_at: Utc::now(),
            regions_attempted: results.len(),
            regions_with_data,
            regions_without_data: results.len() - regions_with_data,
            total_channels: regions.iter().map(|r| r.channel_count).sum(),
            regions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(id: &str, category: &str) -> Channel {
        Channel {
            id: id.to_string(),
            name: format!("Channel {id}"),
            number: 0,
            category: category.to_string(),
            logo: String::new(),
            stream_url: format!("http://example.com/{id}.m3u8"),
            region: "us".to_string(),
            language: "en".to_string(),
            summary: String::new(),
            featured: false,
        }
    }

    fn region(code: &str) -> RegionConfig {
        RegionConfig {
            code: code.to_string(),
            name: code.to_uppercase(),
            flag: String::new(),
            active: true,
            api_url: None,
        }
    }

    #[test]
    fn test_statistics_count_channels_and_distinct_categories() {
        let results = vec![
            RegionResult {
                region: region("us"),
                channels: vec![
                    channel("1", "News"),
                    channel("2", "News"),
                    channel("3", "Movies"),
                ],
                outcome: RegionOutcome::Success,
                source: Some("iptv-org".to_string()),
            },
            RegionResult {
                region: region("uk"),
                channels: vec![],
                outcome: RegionOutcome::NoData {
                    reason: "all sources exhausted".to_string(),
                },
                source: None,
            },
        ];

        let stats = RunStatistics::compute(&results);
        assert_eq!(stats.regions_attempted, 2);
        assert_eq!(stats.regions_with_data, 1);
        assert_eq!(stats.regions_without_data, 1);
        assert_eq!(stats.total_channels, 3);
        assert_eq!(stats.regions[0].channel_count, 3);
        assert_eq!(stats.regions[0].category_count, 2);
    }

    #[test]
    fn test_channel_serializes_camel_case() {
        let json = serde_json::to_value(channel("abc", "News")).unwrap();
        assert!(json.get("streamUrl").is_some());
        assert!(json.get("stream_url").is_none());
    }

    #[test]
    fn test_generated_ids_are_unique_and_non_empty() {
        let a = Channel::generate_id();
        let b = Channel::generate_id();
        assert!(!a.is_empty());
        assert_ne!(a, b);
    }
}
