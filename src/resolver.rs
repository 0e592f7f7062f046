use url::Url;

use crate::error::LoadError;

/// How two URLs are compared when deciding whether an asset belongs to the page.
///
/// By default only hostnames are compared, so `http://host` and `https://host:8443`
/// are the same origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OriginPolicy {
    pub compare_scheme_and_port: bool,
}

impl OriginPolicy {
    pub fn is_same_origin(&self, page_url: &Url, asset_url: &Url) -> bool {
        if !is_same_origin(page_url, asset_url) {
            return false;
        }
        if self.compare_scheme_and_port {
            return page_url.scheme() == asset_url.scheme()
                && page_url.port_or_known_default() == asset_url.port_or_known_default();
        }
        true
    }
}

/// True for `scheme://...` references.
fn has_scheme(reference: &str) -> bool {
    match reference.split_once("://") {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Resolve a markup reference against the page it was found on.
pub fn resolve_reference(reference: &str, page_url: &Url) -> Result<Url, LoadError> {
    let reference = reference.trim();
    if reference.starts_with("//") {
        // Protocol-relative: inherit the page's scheme.
        let with_scheme = format!("{}:{}", page_url.scheme(), reference);
        return Url::parse(&with_scheme).map_err(|e| LoadError::invalid_url(reference, e));
    }
    if has_scheme(reference) {
        return Url::parse(reference).map_err(|e| LoadError::invalid_url(reference, e));
    }
    page_url
        .join(reference)
        .map_err(|e| LoadError::invalid_url(reference, e))
}

/// Hostnames are compared byte for byte; scheme and port are ignored.
pub fn is_same_origin(page_url: &Url, asset_url: &Url) -> bool {
    page_url.host_str() == asset_url.host_str()
}
