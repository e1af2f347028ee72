//! Accept-header-driven selection between the JSON and XML problem
//! representations.

/// Output format for a problem document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Xml,
}

#[derive(Debug)]
struct AcceptEntry {
    media_type: String,
    quality: f32,
}

/// Parse an Accept header into `(media-type, quality)` pairs, sorted by
/// descending quality. The sort is stable: ties keep header order.
fn parse_accept_header(accept: &str) -> Vec<AcceptEntry> {
    let mut entries: Vec<AcceptEntry> = accept
        .split(',')
        .filter_map(|segment| {
            let mut params = segment.trim().split(';');
            let media_type = params.next()?.trim().to_owned();
            if media_type.is_empty() {
                return None;
            }
            let mut quality = 1.0f32;
            for param in params {
                if let Some((key, value)) = param.trim().split_once('=') {
                    if key.trim() == "q" {
                        quality = value.trim().parse().unwrap_or(1.0);
                    }
                }
            }
            Some(AcceptEntry { media_type, quality })
        })
        .collect();
    entries.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    entries
}

/// Select the response format for the given Accept header.
///
/// XML is opt-in: with `support_xml` off, or no header at all, the answer
/// is always JSON. Otherwise the quality-sorted media types are walked and
/// the first recognized one wins; unrecognized types are skipped and an
/// exhausted list defaults to JSON.
#[must_use]
pub fn negotiate_content_type(accept: Option<&str>, support_xml: bool) -> Format {
    let Some(accept) = accept else {
        return Format::Json;
    };
    if !support_xml {
        return Format::Json;
    }

    for entry in parse_accept_header(accept) {
        match entry.media_type.as_str() {
            "application/problem+xml" | "application/xml" => return Format::Xml,
            "application/problem+json" | "application/json" | "*/*" => return Format::Json,
            _ => {}
        }
    }

    Format::Json
}
