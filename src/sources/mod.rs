use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::RegionConfig;
use crate::errors::SourceError;
use crate::models::Channel;

pub mod fetcher;

pub use fetcher::SourceFetcher;

/// One candidate remote source. Sources are tried strictly in order; the
/// descriptor carries everything the fetcher needs to build a request and
/// interpret the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    /// URL template with a `{region}` placeholder.
    pub url_template: String,
    pub region_case: RegionCase,
    pub format: SourceFormat,
}

/// Region-code case convention expected by a source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RegionCase {
    Lower,
    Upper,
}

/// Wire shape a source responds with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    M3u,
    Json,
}

impl SourceDescriptor {
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                name: "iptv-org".to_string(),
                url_template:
                    "https://raw.githubusercontent.com/iptv-org/iptv/master/streams/{region}.m3u"
                        .to_string(),
                region_case: RegionCase::Lower,
                format: SourceFormat::M3u,
            },
            Self {
                name: "pluto-api".to_string(),
                url_template: "https://i.mjh.nz/PlutoTV/{region}.json".to_string(),
                region_case: RegionCase::Upper,
                format: SourceFormat::Json,
            },
        ]
    }

    /// Resolve the request URL for a region, applying this source's case
    /// convention. Region-code casing is owned here, never by callers.
    pub fn url_for(&self, region: &RegionConfig) -> String {
        if self.format == SourceFormat::Json {
            if let Some(api_url) = &region.api_url {
                return api_url.clone();
            }
        }
        let code = match self.region_case {
            RegionCase::Lower => region.code.to_lowercase(),
            RegionCase::Upper => region.code.to_uppercase(),
        };
        self.url_template.replace("{region}", &code)
    }
}

/// Typed result of a single attempt against a single source URL. Drives the
/// retry/fallback loop instead of error unwinding.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Response was recognizable in the source's declared shape.
    Success(Vec<Channel>),
    /// Definitive absence for this source/region; never retried.
    NotFound,
    /// Transient failure, retried up to the configured limit.
    SoftFail(SourceError),
}

/// Delay before retrying the same source: linear in the attempt number,
/// 2 s after the first failure, 4 s after the second, and so on.
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(2_000 * u64::from(attempt))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(code: &str, api_url: Option<&str>) -> RegionConfig {
        RegionConfig {
            code: code.to_string(),
            name: code.to_uppercase(),
            flag: String::new(),
            active: true,
            api_url: api_url.map(|u| u.to_string()),
        }
    }

    #[test]
    fn test_url_for_applies_source_case_convention() {
        let sources = SourceDescriptor::defaults();
        let us = region("Us", None);
        assert_eq!(
            sources[0].url_for(&us),
            "https://raw.githubusercontent.com/iptv-org/iptv/master/streams/us.m3u"
        );
        assert_eq!(sources[1].url_for(&us), "https://i.mjh.nz/PlutoTV/US.json");
    }

    #[test]
    fn test_api_url_override_wins_for_json_sources_only() {
        let sources = SourceDescriptor::defaults();
        let us = region("us", Some("https://override.example.com/channels"));
        assert_eq!(
            sources[1].url_for(&us),
            "https://override.example.com/channels"
        );
        // The playlist source ignores the API override.
        assert!(sources[0].url_for(&us).ends_with("/streams/us.m3u"));
    }

    #[test]
    fn test_backoff_is_linear_in_attempt_number() {
        assert_eq!(backoff_delay(1), Duration::from_millis(2_000));
        assert_eq!(backoff_delay(2), Duration::from_millis(4_000));
        assert_eq!(backoff_delay(3), Duration::from_millis(6_000));
    }
}
