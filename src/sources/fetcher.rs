use std::time::Duration;

use anyhow::Result;
use futures::StreamExt;
use reqwest::StatusCode;
use tracing::{debug, error, info, warn};

use crate::config::{RegionConfig, ScraperConfig};
use crate::errors::SourceError;
use crate::ingestor::{api_parser, m3u_parser};
use crate::models::Channel;

use super::{backoff_delay, FetchOutcome, SourceDescriptor, SourceFormat};

/// Fetched catalog for one region together with the source that supplied it.
#[derive(Debug, Default)]
pub struct FetchedCatalog {
    pub channels: Vec<Channel>,
    pub source: Option<String>,
}

/// Retrieves raw channel data for a region from the configured sources,
/// with per-source retry and backoff. Fails soft: exhaustion yields an
/// empty catalog, never an error to the caller.
pub struct SourceFetcher {
    client: reqwest::Client,
    scraper: ScraperConfig,
}

impl SourceFetcher {
    pub fn new(scraper: &ScraperConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(scraper.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            scraper: scraper.clone(),
        })
    }

    /// Try each configured source in priority order; the first source to
    /// yield a non-empty usable result wins. Partial results are never
    /// merged across sources.
    pub async fn fetch(&self, region: &RegionConfig) -> FetchedCatalog {
        for source in &self.scraper.sources {
            let channels = self.fetch_source(source, region).await;
            if channels.is_empty() {
                debug!(
                    "Source '{}' yielded no channels for {}",
                    source.name, region.name
                );
                continue;
            }
            let channels = filter_by_keywords(&self.scraper.filter_keywords, channels);
            info!(
                "Fetched {} channels for {} from '{}'",
                channels.len(),
                region.name,
                source.name
            );
            return FetchedCatalog {
                channels,
                source: Some(source.name.clone()),
            };
        }

        warn!(
            "All sources exhausted for {} ({})",
            region.name, region.code
        );
        FetchedCatalog::default()
    }

    /// Retry loop against a single source URL. A "not found" status is
    /// definitive absence and short-circuits; everything else retries with
    /// linear backoff until the configured attempts run out.
    async fn fetch_source(&self, source: &SourceDescriptor, region: &RegionConfig) -> Vec<Channel> {
        let url = source.url_for(region);
        let max_retries = self.scraper.retries.max(1);

        for attempt in 1..=max_retries {
            info!("Trying {} for {}: {}", source.name, region.name, url);

            match self.attempt(source, &url, region).await {
                FetchOutcome::Success(channels) => return channels,
                FetchOutcome::NotFound => {
                    warn!(
                        "Region {} ({}) not available on {}",
                        region.name, region.code, source.name
                    );
                    return Vec::new();
                }
                FetchOutcome::SoftFail(err) => {
                    error!(
                        "Fetch failed for {} - attempt {}/{}: {}",
                        region.name, attempt, max_retries, err
                    );
                    if attempt < max_retries {
                        tokio::time::sleep(backoff_delay(attempt)).await;
                    }
                }
            }
        }

        Vec::new()
    }

    async fn attempt(
        &self,
        source: &SourceDescriptor,
        url: &str,
        region: &RegionConfig,
    ) -> FetchOutcome {
        let request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, self.scraper.accept.as_str())
            .timeout(Duration::from_millis(self.scraper.timeout_ms));

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) if err.is_timeout() => {
                return FetchOutcome::SoftFail(SourceError::Timeout {
                    url: url.to_string(),
                })
            }
            Err(err) => return FetchOutcome::SoftFail(SourceError::Transport(err)),
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return FetchOutcome::NotFound;
        }
        if !status.is_success() {
            return FetchOutcome::SoftFail(SourceError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = match read_body(response, url).await {
            Ok(body) => body,
            Err(err) => return FetchOutcome::SoftFail(err),
        };

        match source.format {
            SourceFormat::M3u => {
                if body.contains("#EXTM3U") {
                    FetchOutcome::Success(m3u_parser::parse(&body, &region.code))
                } else {
                    // Sources sometimes answer 200 with an error page; that
                    // is not worth retrying.
                    warn!("Invalid M3U format for {}", region.name);
                    FetchOutcome::Success(Vec::new())
                }
            }
            SourceFormat::Json => match serde_json::from_str::<serde_json::Value>(&body) {
                Ok(doc) => match api_parser::parse_document(&doc, &region.code) {
                    Some(channels) => FetchOutcome::Success(channels),
                    None => FetchOutcome::SoftFail(SourceError::parse_error(
                        "api",
                        "response is not a channel array",
                    )),
                },
                Err(err) => FetchOutcome::SoftFail(SourceError::parse_error("api", err.to_string())),
            },
        }
    }
}

async fn read_body(response: reqwest::Response, url: &str) -> Result<String, SourceError> {
    let mut content = String::new();
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| {
            if err.is_timeout() {
                SourceError::Timeout {
                    url: url.to_string(),
                }
            } else {
                SourceError::Transport(err)
            }
        })?;
        content.push_str(&String::from_utf8_lossy(&chunk));
        downloaded += chunk.len() as u64;
    }

    debug!("Downloaded {} bytes from {}", downloaded, url);
    Ok(content)
}

/// Select the subset of channels whose name, id or stream URL contains any
/// of the keywords (case insensitive). If the subset is empty, the full set
/// is returned instead: over-inclusion beats an empty region.
pub fn filter_by_keywords(keywords: &[String], channels: Vec<Channel>) -> Vec<Channel> {
    if keywords.is_empty() || channels.is_empty() {
        return channels;
    }

    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    let matched: Vec<Channel> = channels
        .iter()
        .filter(|ch| {
            let name = ch.name.to_lowercase();
            let id = ch.id.to_lowercase();
            let url = ch.stream_url.to_lowercase();
            keywords
                .iter()
                .any(|k| name.contains(k) || id.contains(k) || url.contains(k))
        })
        .cloned()
        .collect();

    if matched.is_empty() {
        info!(
            "No channels matched {:?}; returning all {} channels",
            keywords,
            channels.len()
        );
        channels
    } else {
        info!(
            "Filtered {} matching channels from {} total",
            matched.len(),
            channels.len()
        );
        matched
    }
}
