//! Store identity derived from product URLs.

/// Extracts the store domain from a product URL.
///
/// Given `"https://www.notino.pt/cerave/foaming-cleanser/"`, returns
/// `"notino.pt"`. Falls back to the full string if the URL has no host.
#[must_use]
pub fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .map_or_else(
            || {
                tracing::debug!(url, "could not extract host from URL; using it verbatim");
                url.to_owned()
            },
            |host| host.strip_prefix("www.").map_or(host.clone(), str::to_owned),
        )
}
