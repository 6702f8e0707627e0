//! URL helpers for request headers and error messages.

/// Scheme+host origin of `url`, used as the `Referer` so that a product page
/// request looks like navigation from the store's own front page.
///
/// Returns `None` for URLs without a host.
pub(super) fn referer_for(url: &reqwest::Url) -> Option<String> {
    url.host_str()?;
    Some(format!("{}/", url.origin().ascii_serialization()))
}
