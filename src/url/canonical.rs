use url::Url;

/// Canonicalizes a URL into the key used for dedup and storage.
///
/// # Canonicalization Steps
///
/// 1. Replace every literal `%20` with `-`; tumblr serves the same page
///    under both spellings.
/// 2. For post URLs, keep only `scheme://authority/post/<id>`; the
///    descriptive slug, query, and fragment are junk.
/// 3. For everything else, keep `scheme://authority/path`, discarding
///    query and fragment.
///
/// This is a total function: a malformed input is logged and returned
/// unchanged rather than failing the caller. It is also idempotent, so
/// already-canonical keys pass through untouched.
///
/// # Examples
///
/// ```
/// use tumblr_mirror::url::canonicalize;
///
/// let url = canonicalize("http://foo.tumblr.com/post/123/some-slug?x=1#y");
/// assert_eq!(url, "http://foo.tumblr.com/post/123");
/// ```
pub fn canonicalize(raw: &str) -> String {
    let replaced = raw.replace("%20", "-");

    let url = match Url::parse(&replaced) {
        Ok(url) => url,
        Err(error) => {
            tracing::warn!("malformed URL {:?} while canonicalizing: {}", raw, error);
            return raw.to_string();
        }
    };

    let path = url.path();
    if let Some(post_id) = post_id(path) {
        return format!("{}://{}/post/{}", url.scheme(), url.authority(), post_id);
    }

    format!("{}://{}{}", url.scheme(), url.authority(), path)
}

/// Returns the post ID when the path starts with `/post/<digits>`.
///
/// The first run of digits immediately following `/post/` wins; trailing
/// slug segments are ignored.
fn post_id(path: &str) -> Option<&str> {
    let rest = path.strip_prefix("/post/")?;
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    Some(&rest[..digits_end])
}
