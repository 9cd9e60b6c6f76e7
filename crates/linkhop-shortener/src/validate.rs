use linkhop_core::ShortenerError;
use url::Url;

/// Checks that `raw` is an absolute `http` or `https` URL with a host and
/// returns its serialized form.
///
/// Parsing strips tabs and newlines, percent-encodes non-ASCII and lowercases
/// the scheme and host, so the returned string is always a valid `Location`
/// header value. Callers store this string rather than `raw`.
pub fn validate_url(raw: &str) -> Result<String, ShortenerError> {
    if raw.trim().is_empty() {
        return Err(ShortenerError::InvalidUrl("URL cannot be empty".to_string()));
    }

    let url = Url::parse(raw)
        .map_err(|e| ShortenerError::InvalidUrl(format!("Invalid URL format: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ShortenerError::InvalidUrl(format!(
            "URL scheme must be http or https: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(ShortenerError::InvalidUrl(format!(
            "URL must have a host: {raw}"
        )));
    }

    Ok(url.into())
}
