//! Media-range parsing for `Accept` values.
//!
//! Each range is parsed by `mime`; this module only splits the list and
//! drops ranges that fail. Quoted parameter values may contain `,` and are
//! re-quoted when rendered.

use std::fmt;

use mime::Mime;

/// One parsed entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange(Mime);

impl MediaRange {
    /// Parse a single media range such as `text/turtle;q=0.9`.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if !input.is_ascii() {
            return None;
        }
        let mime: Mime = input.parse().ok()?;
        let (type_, subtype) = (mime.type_().as_str(), mime.subtype().as_str());
        if subtype.is_empty() || (type_ == "*" && subtype != "*") {
            return None;
        }
        let bad_quality = mime
            .get_param("q")
            .is_some_and(|q| !valid_quality(q.as_str()));
        if bad_quality {
            return None;
        }
        Some(Self(mime))
    }
}

impl fmt::Display for MediaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.essence_str())?;
        for (name, value) in self.0.params() {
            let value = value.as_str();
            if is_token(value) {
                write!(f, ";{name}={value}")?;
            } else {
                write!(f, ";{name}=\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))?;
            }
        }
        Ok(())
    }
}

/// Parse a comma-separated list, discarding ranges that fail to parse.
pub fn parse_media_ranges(input: &str) -> Vec<MediaRange> {
    split_unquoted(input)
        .into_iter()
        .filter(|range| !range.trim().is_empty())
        .filter_map(|range| {
            let parsed = MediaRange::parse(range);
            if parsed.is_none() {
                tracing::debug!(range = %range.trim(), "Discarding malformed media range");
            }
            parsed
        })
        .collect()
}

fn split_unquoted(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ',' if !quoted => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

// RFC 9110 tchar
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

fn valid_quality(value: &str) -> bool {
    value
        .parse::<f32>()
        .map(|q| (0.0..=1.0).contains(&q))
        .unwrap_or(false)
}
