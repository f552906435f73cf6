use tracing::{debug, warn};

use crate::models::Channel;

/// Parse an M3U playlist document into channel records, preserving input
/// order. Documents missing the `#EXTM3U` header yield an empty list rather
/// than an error; upstream sources occasionally return non-playlist error
/// bodies and those must not abort a region.
pub fn parse(content: &str, region_code: &str) -> Vec<Channel> {
    if !content.contains("#EXTM3U") {
        warn!(
            "Invalid M3U document for region '{}': missing #EXTM3U header",
            region_code
        );
        return Vec::new();
    }

    let mut channels = Vec::new();
    let mut pending: Option<PendingRecord> = None;
    let mut dropped = 0usize;

    for line in content.lines() {
        let line = line.trim();

        if line.starts_with("#EXTINF:") {
            // A new metadata line before the previous record got its URL
            // means the previous entry is incomplete and never emitted.
            if pending.take().is_some() {
                dropped += 1;
            }
            pending = parse_extinf_line(line);
        } else if line.is_empty() || line.starts_with('#') {
            continue;
        } else if let Some(record) = pending.take() {
            channels.push(record.seal(line, region_code));
        }
    }

    if pending.is_some() {
        dropped += 1;
    }
    if dropped > 0 {
        debug!(
            "Dropped {} incomplete channel entries for region '{}'",
            dropped, region_code
        );
    }
    debug!(
        "Parsed {} channels from playlist for region '{}'",
        channels.len(),
        region_code
    );

    channels
}

/// Metadata parsed from an `#EXTINF:` line, waiting for its stream URL.
struct PendingRecord {
    tvg_id: Option<String>,
    tvg_name: Option<String>,
    tvg_logo: Option<String>,
    group_title: Option<String>,
    display_name: Option<String>,
}

impl PendingRecord {
    /// Attach the stream URL and fill per-field defaults. Name precedence:
    /// trailing free-text name, then the tvg-name attribute, then "Unknown".
    fn seal(self, url: &str, region_code: &str) -> Channel {
        let name = self
            .display_name
            .filter(|n| !n.is_empty())
            .or(self.tvg_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());

        Channel {
            id: self
                .tvg_id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(Channel::generate_id),
            name,
            number: 0,
            category: self
                .group_title
                .filter(|g| !g.is_empty())
                .unwrap_or_else(|| "General".to_string()),
            logo: self.tvg_logo.unwrap_or_default(),
            stream_url: url.to_string(),
            region: region_code.to_string(),
            language: "en".to_string(),
            summary: String::new(),
            featured: false,
        }
    }
}

/// Parse an EXTINF line:
/// `#EXTINF:-1 tvg-id="..." tvg-name="..." tvg-logo="..." group-title="...",Channel Name`
fn parse_extinf_line(line: &str) -> Option<PendingRecord> {
    let comma_pos = line.rfind(',')?;
    let attributes_part = &line[8..comma_pos];
    let display_name = line[comma_pos + 1..].trim();

    let mut record = PendingRecord {
        tvg_id: None,
        tvg_name: None,
        tvg_logo: None,
        group_title: None,
        display_name: (!display_name.is_empty()).then(|| display_name.to_string()),
    };

    for (key, value) in parse_attributes(attributes_part) {
        match key.as_str() {
            "tvg-id" => record.tvg_id = Some(value),
            "tvg-name" => record.tvg_name = Some(value),
            "tvg-logo" => record.tvg_logo = Some(value),
            "group-title" => record.group_title = Some(value),
            _ => {}
        }
    }

    Some(record)
}

/// Scan key="value" attribute pairs, honoring quotes and backslash escapes.
fn parse_attributes(attributes: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut current_key = String::new();
    let mut current_value = String::new();
    let mut in_quotes = false;
    let mut in_value = false;
    let mut escape_next = false;

    for ch in attributes.chars() {
        if escape_next {
            if in_value {
                current_value.push(ch);
            } else {
                current_key.push(ch);
            }
            escape_next = false;
            continue;
        }

        match ch {
            '\\' => escape_next = true,
            '"' => {
                if in_value {
                    in_quotes = !in_quotes;
                }
            }
            '=' if !in_quotes && !in_value => {
                in_value = true;
            }
            ' ' | '\t' if !in_quotes => {
                if in_value && !current_value.is_empty() {
                    attrs.push((
                        current_key.trim().to_string(),
                        current_value.trim_matches('"').to_string(),
                    ));
                }
                // Bare tokens (the EXTINF duration) and empty-valued
                // attributes are discarded at the separator.
                current_key.clear();
                current_value.clear();
                in_value = false;
            }
            _ => {
                if in_value {
                    current_value.push(ch);
                } else {
                    current_key.push(ch);
                }
            }
        }
    }

    if in_value && !current_value.is_empty() {
        attrs.push((
            current_key.trim().to_string(),
            current_value.trim_matches('"').to_string(),
        ));
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYLIST: &str = r#"#EXTM3U
#EXTINF:-1 tvg-id="one.us" tvg-name="One" tvg-logo="http://logo/1.png" group-title="News",Channel One
http://stream.example.com/one.m3u8
#EXTINF:-1 tvg-id="two.us" group-title="Movies",Channel Two
http://stream.example.com/two.m3u8
"#;

    #[test]
    fn test_one_record_per_complete_pair_in_input_order() {
        let channels = parse(PLAYLIST, "us");
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].name, "Channel One");
        assert_eq!(channels[0].id, "one.us");
        assert_eq!(channels[0].category, "News");
        assert_eq!(channels[0].logo, "http://logo/1.png");
        assert_eq!(channels[0].stream_url, "http://stream.example.com/one.m3u8");
        assert_eq!(channels[0].region, "us");
        assert_eq!(channels[1].name, "Channel Two");
    }

    #[test]
    fn test_missing_header_yields_empty_not_error() {
        let channels = parse("<html>503 Service Unavailable</html>", "us");
        assert!(channels.is_empty());
    }

    #[test]
    fn test_metadata_without_url_is_dropped() {
        let doc = "#EXTM3U\n#EXTINF:-1 tvg-id=\"a\",Dangling\n";
        assert!(parse(doc, "us").is_empty());

        let doc = concat!(
            "#EXTM3U\n",
            "#EXTINF:-1 tvg-id=\"a\",First\n",
            "#EXTINF:-1 tvg-id=\"b\",Second\n",
            "http://stream.example.com/b.m3u8\n",
        );
        let channels = parse(doc, "us");
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].id, "b");
    }

    #[test]
    fn test_blank_and_comment_lines_between_metadata_and_url() {
        let doc = concat!(
            "#EXTM3U\n",
            "#EXTINF:-1 tvg-id=\"a\",Spaced Out\n",
            "\n",
            "# a stray comment\n",
            "http://stream.example.com/a.m3u8\n",
        );
        let channels = parse(doc, "us");
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].stream_url, "http://stream.example.com/a.m3u8");
    }

    #[test]
    fn test_missing_attributes_fall_back_to_defaults() {
        let doc = "#EXTM3U\n#EXTINF:-1,Bare\nhttp://stream.example.com/bare.m3u8\n";
        let channels = parse(doc, "us");
        assert_eq!(channels.len(), 1);
        assert!(!channels[0].id.is_empty());
        assert_eq!(channels[0].category, "General");
        assert_eq!(channels[0].logo, "");
        assert_eq!(channels[0].language, "en");
        assert_eq!(channels[0].number, 0);
        assert!(!channels[0].featured);
    }

    #[test]
    fn test_name_precedence_trailing_then_attribute_then_unknown() {
        let doc = concat!(
            "#EXTM3U\n",
            "#EXTINF:-1 tvg-name=\"Attr Name\",Trailing Name\n",
            "http://s/1\n",
            "#EXTINF:-1 tvg-name=\"Attr Name\",\n",
            "http://s/2\n",
            "#EXTINF:-1 tvg-id=\"x\",\n",
            "http://s/3\n",
        );
        let channels = parse(doc, "us");
        assert_eq!(channels.len(), 3);
        assert_eq!(channels[0].name, "Trailing Name");
        assert_eq!(channels[1].name, "Attr Name");
        assert_eq!(channels[2].name, "Unknown");
    }

    #[test]
    fn test_attribute_order_does_not_matter() {
        let doc = concat!(
            "#EXTM3U\n",
            "#EXTINF:-1 group-title=\"Kids\" tvg-logo=\"http://l.png\" tvg-id=\"k1\",Kids One\n",
            "http://s/kids\n",
        );
        let channels = parse(doc, "us");
        assert_eq!(channels[0].id, "k1");
        assert_eq!(channels[0].category, "Kids");
        assert_eq!(channels[0].logo, "http://l.png");
    }

    #[test]
    fn test_empty_attribute_does_not_corrupt_the_next_one() {
        let pairs = parse_attributes(r#"-1 tvg-id="" tvg-name="Foo""#);
        assert_eq!(pairs, vec![("tvg-name".to_string(), "Foo".to_string())]);
    }

    #[test]
    fn test_attribute_values_keep_spaces_inside_quotes() {
        let pairs = parse_attributes(r#"-1 tvg-id="a b" group-title="News and Weather""#);
        assert!(pairs.contains(&("tvg-id".to_string(), "a b".to_string())));
        assert!(pairs.contains(&("group-title".to_string(), "News and Weather".to_string())));
    }
}
