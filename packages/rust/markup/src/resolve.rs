//! Link target resolution against the crawled resource table.

use url::Url;
use valleydocs_shared::UrlTable;

/// Components of an href, borrowed from the original string.
#[derive(Debug, PartialEq, Eq)]
struct HrefParts<'a> {
    /// `scheme://authority` or `//authority`, empty for relative hrefs.
    origin: &'a str,
    path: &'a str,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}

fn split_href(href: &str) -> HrefParts<'_> {
    let (rest, fragment) = match href.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (href, None),
    };
    let (rest, query) = match rest.split_once('?') {
        Some((rest, query)) => (rest, Some(query)),
        None => (rest, None),
    };

    let authority_start = match rest.find("://") {
        Some(idx)
            if idx > 0
                && rest[..idx]
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) =>
        {
            Some(idx + 3)
        }
        _ if rest.starts_with("//") => Some(2),
        _ => None,
    };

    let (origin, path) = match authority_start {
        Some(start) => {
            let end = rest[start..].find('/').map_or(rest.len(), |i| start + i);
            (&rest[..end], &rest[end..])
        }
        None => ("", rest),
    };

    HrefParts {
        origin,
        path,
        query: query.filter(|q| !q.is_empty()),
        fragment: fragment.filter(|f| !f.is_empty()),
    }
}

/// Rewrite an href so internal links point at resource ids.
///
/// - Known path: replaced by its resource id, query and fragment kept.
/// - Unknown path without fragment: root-relative hrefs become absolute
///   against `base_url`, anything else is returned unchanged.
/// - Unknown path with a fragment: the path is dropped, leaving `#fragment`.
pub fn resolve_href(base_url: &Url, raw_href: &str, urls: &UrlTable) -> String {
    let parts = split_href(raw_href);
    let mapped = urls.get(parts.path).map(String::as_str).unwrap_or("");

    if mapped.is_empty() && parts.fragment.is_none() {
        if raw_href.starts_with('/') {
            return base_url
                .join(raw_href)
                .map(String::from)
                .unwrap_or_else(|_| raw_href.to_string());
        }
        return raw_href.to_string();
    }

    let mut out = String::with_capacity(raw_href.len());
    out.push_str(parts.origin);
    if !parts.origin.is_empty() && !mapped.is_empty() && !mapped.starts_with('/') {
        out.push('/');
    }
    out.push_str(mapped);
    if let Some(query) = parts.query {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = parts.fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}
