//! Link canonicalisation for result deduplication.
//!
//! Derives the merge-identity key for a result link. Two hits whose links
//! canonicalise to the same key refer to the same logical result and are
//! merged during fusion. The original link is preserved for display; the
//! canonical key is never shown to clients.

use url::Url;

/// Canonicalise a link into a dedup key.
///
/// Applies the following transformations:
///
/// 1. Parse as a URL; clear the query string and fragment.
/// 2. Percent-decode the serialised form.
/// 3. Strip a `www.` label immediately after the scheme.
/// 4. Strip exactly one trailing slash.
///
/// If the link cannot be parsed or decoded, the raw string is the key —
/// this function never fails.
///
/// # Examples
///
/// ```
/// use metasearch::fusion::canonical::canonicalize;
///
/// let a = canonicalize("https://www.example.com/page?x=1#y");
/// let b = canonicalize("https://example.com/page/");
/// assert_eq!(a, b);
/// ```
pub fn canonicalize(link: &str) -> String {
    let Ok(mut parsed) = Url::parse(link) else {
        return link.to_string();
    };

    parsed.set_query(None);
    parsed.set_fragment(None);

    let serialized = parsed.to_string();
    let Ok(decoded) = urlencoding::decode(&serialized) else {
        return link.to_string();
    };
    let mut key = decoded.into_owned();

    for scheme in ["https://", "http://"] {
        if let Some(host) = key.strip_prefix(scheme).and_then(|s| s.strip_prefix("www.")) {
            key = format!("{scheme}{host}");
            break;
        }
    }

    if key.ends_with('/') {
        key.pop();
    }

    key
}
