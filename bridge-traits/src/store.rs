//! Cookie Store Abstraction
//!
//! The cookie store is owned by the host platform (WebKit's `WKHTTPCookieStore`,
//! Android's `CookieManager`, an in-process store on desktop). The core only
//! issues requests against it through [`CookieStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::cookie::{CookieProperties, HttpCookie};
use crate::error::Result;

/// Optional features a store may or may not provide.
///
/// Reported once by the store instead of probing platform versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreCapabilities {
    /// Store has a typed same-site policy attribute
    pub same_site_policy: bool,
}

impl StoreCapabilities {
    /// Capabilities of a store supporting every optional attribute
    pub fn full() -> Self {
        Self {
            same_site_policy: true,
        }
    }
}

/// Category of website data that can be bulk-removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebsiteDataType {
    Cookies,
    LocalStorage,
}

/// HTTP cookie store trait
///
/// Stores own matching, expiry and persistence. Enumeration order is
/// store-defined and not guaranteed stable across calls.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::store::CookieStore;
/// use bridge_traits::cookie::CookieProperties;
///
/// async fn remember(store: &dyn CookieStore) -> Result<()> {
///     let props = CookieProperties::new("theme", "dark", "/")
///         .with_origin_url("https://example.com");
///     let cookie = store.make_cookie(props)?;
///     store.set_cookie(cookie).await
/// }
/// ```
#[async_trait]
pub trait CookieStore: Send + Sync {
    /// Optional features supported by this store
    fn capabilities(&self) -> StoreCapabilities;

    /// Construct a cookie from a property dictionary
    ///
    /// Returns [`BridgeError::InvalidCookie`](crate::BridgeError::InvalidCookie)
    /// when the store rejects the combination of properties.
    fn make_cookie(&self, properties: CookieProperties) -> Result<HttpCookie> {
        HttpCookie::from_properties(properties, Utc::now())
    }

    /// Enumerate every live cookie in the store
    async fn all_cookies(&self) -> Result<Vec<HttpCookie>>;

    /// Insert a cookie, replacing any cookie with the same identity
    async fn set_cookie(&self, cookie: HttpCookie) -> Result<()>;

    /// Delete the cookie with the same `(domain, path, name)`
    async fn delete_cookie(&self, cookie: &HttpCookie) -> Result<()>;

    /// Remove all data of the given types modified at or after `modified_since`
    async fn remove_data(
        &self,
        types: &[WebsiteDataType],
        modified_since: DateTime<Utc>,
    ) -> Result<()>;
}
