//! Cookie construction rules shared by the desktop stores

use bridge_traits::{
    cookie::{CookieProperties, HttpCookie, SAME_SITE_PROPERTY},
    error::Result,
    store::StoreCapabilities,
};
use chrono::{DateTime, Utc};

/// Build a cookie the way a store with `capabilities` would.
///
/// Without a typed same-site slot the policy is kept as a loose property.
pub(crate) fn build_cookie(
    mut properties: CookieProperties,
    capabilities: StoreCapabilities,
    now: DateTime<Utc>,
) -> Result<HttpCookie> {
    if !capabilities.same_site_policy {
        if let Some(policy) = properties.same_site.take() {
            properties
                .extra
                .entry(SAME_SITE_PROPERTY.to_string())
                .or_insert_with(|| policy.display_name().to_string());
        }
    }

    HttpCookie::from_properties(properties, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::cookie::SameSitePolicy;

    #[test]
    fn test_same_site_kept_loose_without_capability() {
        let props = CookieProperties::new("a", "1", "/")
            .with_domain("example.com")
            .with_same_site(SameSitePolicy::Strict);

        let cookie = build_cookie(props.clone(), StoreCapabilities::default(), Utc::now()).unwrap();
        assert_eq!(cookie.same_site, None);
        assert_eq!(cookie.extra.get(SAME_SITE_PROPERTY).map(String::as_str), Some("Strict"));

        let cookie = build_cookie(props, StoreCapabilities::full(), Utc::now()).unwrap();
        assert_eq!(cookie.same_site, Some(SameSitePolicy::Strict));
        assert!(cookie.extra.is_empty());
    }
}
