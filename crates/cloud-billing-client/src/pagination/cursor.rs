//! Cursor extraction from next-page links.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::{ParseError, Url};

use crate::error::{ClientError, Result};

/// Base used to resolve server-relative links. Only the query is read back.
const RELATIVE_BASE: &str = "http://relative.invalid/";

/// Return the value of `param` in the query of `link`.
///
/// `link` may be an absolute URL or a server-relative reference starting
/// with `/` or `?`. A missing or empty parameter yields `Ok(None)`, the
/// normal end-of-listing signal. The value is decoded exactly: `+` is a
/// space and percent escapes must form valid UTF-8.
///
/// # Errors
///
/// Returns [`ClientError::MalformedLink`] if `link` cannot be parsed as a URL
/// or the cursor does not decode to UTF-8.
pub fn extract_cursor(link: &str, param: &str) -> Result<Option<String>> {
    let url = parse_link(link)?;
    let Some(query) = url.query() else {
        return Ok(None);
    };

    for pair in query.split('&') {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        if percent_decode_str(&plus_to_space(name)).decode_utf8_lossy() != param {
            continue;
        }
        let raw = plus_to_space(value);
        let value = percent_decode_str(&raw)
            .decode_utf8()
            .map_err(|e| ClientError::MalformedLink {
                link: link.to_string(),
                reason: format!("cursor is not valid UTF-8: {e}"),
            })?;
        return Ok((!value.is_empty()).then(|| value.into_owned()));
    }
    Ok(None)
}

fn plus_to_space(raw: &str) -> Cow<'_, str> {
    if raw.contains('+') {
        Cow::Owned(raw.replace('+', " "))
    } else {
        Cow::Borrowed(raw)
    }
}

fn parse_link(link: &str) -> Result<Url> {
    let malformed = |e: ParseError| ClientError::MalformedLink {
        link: link.to_string(),
        reason: e.to_string(),
    };

    match Url::parse(link) {
        Ok(url) => Ok(url),
        Err(ParseError::RelativeUrlWithoutBase)
            if link.starts_with('/') || link.starts_with('?') =>
        {
            Url::parse(RELATIVE_BASE)
                .and_then(|base| base.join(link))
                .map_err(malformed)
        }
        Err(e) => Err(malformed(e)),
    }
}
