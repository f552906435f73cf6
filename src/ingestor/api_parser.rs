use serde_json::Value;
use tracing::debug;

use crate::models::Channel;

/// Candidate JSON pointers per canonical field, evaluated in order; the
/// first non-null hit wins. Kept as named data so the lenient extraction
/// chains are testable instead of buried in branching.
const STREAM_URL_PATHS: &[&str] = &["/stitched/urls/0/url", "/url", "/stream"];
const ID_PATHS: &[&str] = &["/_id", "/id"];
const NAME_PATHS: &[&str] = &["/name"];
const NUMBER_PATHS: &[&str] = &["/number"];
const CATEGORY_PATHS: &[&str] = &["/category"];
const LOGO_PATHS: &[&str] = &["/logo/path", "/colorLogoPNG/path", "/logo"];
const SUMMARY_PATHS: &[&str] = &["/summary", "/description"];
const FEATURED_PATHS: &[&str] = &["/featured"];

/// Extract the channel array from an API response document. Sources return
/// either a bare array or an object wrapping the list; anything else is not
/// recognizable as the API shape.
pub fn parse_document(doc: &Value, region_code: &str) -> Option<Vec<Channel>> {
    let items = match doc {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => map
            .get("channels")
            .or_else(|| map.get("items"))
            .and_then(Value::as_array)?
            .as_slice(),
        _ => return None,
    };

    let total = items.len();
    let channels: Vec<Channel> = items
        .iter()
        .filter_map(|raw| normalize(raw, region_code))
        .collect();

    if channels.len() < total {
        debug!(
            "Discarded {} of {} API records without a stream URL for region '{}'",
            total - channels.len(),
            total,
            region_code
        );
    }

    Some(channels)
}

/// Map one source record into the canonical channel shape. Records with no
/// resolvable stream URL yield `None`; that is filtered input, not an error.
pub fn normalize(raw: &Value, region_code: &str) -> Option<Channel> {
    let stream_url = first_string(raw, STREAM_URL_PATHS).filter(|u| !u.is_empty())?;

    Some(Channel {
        id: first_string(raw, ID_PATHS)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(Channel::generate_id),
        name: first_string(raw, NAME_PATHS)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Unknown Channel".to_string()),
        number: first_number(raw, NUMBER_PATHS).unwrap_or(0),
        category: first_string(raw, CATEGORY_PATHS)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "General".to_string()),
        logo: first_string(raw, LOGO_PATHS).unwrap_or_default(),
        stream_url,
        region: region_code.to_string(),
        language: "en".to_string(),
        summary: first_string(raw, SUMMARY_PATHS).unwrap_or_default(),
        featured: first_value(raw, FEATURED_PATHS)
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

fn first_value<'a>(raw: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths
        .iter()
        .find_map(|path| raw.pointer(path).filter(|v| !v.is_null()))
}

fn first_string(raw: &Value, paths: &[&str]) -> Option<String> {
    first_value(raw, paths).and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        // Some sources emit numeric ids and channel numbers.
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn first_number(raw: &Value, paths: &[&str]) -> Option<i64> {
    first_value(raw, paths).and_then(|v| match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    })
}
