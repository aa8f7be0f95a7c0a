//! Native Cookie Schema
//!
//! Mirrors the property dictionary a platform cookie store accepts when
//! constructing a cookie, and the cookie record it hands back on enumeration.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

use crate::error::{BridgeError, Result};

/// Loose property key used when a store has no typed same-site slot.
pub const SAME_SITE_PROPERTY: &str = "SameSite";

/// Same-site policy attached to a cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SameSitePolicy {
    Lax,
    Strict,
    None,
}

impl SameSitePolicy {
    /// Normalize a caller-supplied policy name.
    ///
    /// Matching is case-insensitive. Anything that is not `lax` or `strict`
    /// maps to [`SameSitePolicy::None`].
    pub fn normalize(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("lax") {
            Self::Lax
        } else if raw.eq_ignore_ascii_case("strict") {
            Self::Strict
        } else {
            Self::None
        }
    }

    /// Raw value as stored by the platform (`lax`, `strict`, `none`)
    pub fn raw_value(self) -> &'static str {
        match self {
            Self::Lax => "lax",
            Self::Strict => "strict",
            Self::None => "none",
        }
    }

    /// Human-cased name reported back to callers
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Lax => "Lax",
            Self::Strict => "Strict",
            Self::None => "None",
        }
    }
}

impl fmt::Display for SameSitePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Properties used to construct a native cookie.
///
/// Optional attributes stay `None` until explicitly set so that stores can
/// apply their own defaults (e.g. deriving the domain from `origin_url`).
///
/// # Example
///
/// ```
/// use bridge_traits::cookie::{CookieProperties, SameSitePolicy};
///
/// let props = CookieProperties::new("session", "abc", "/")
///     .with_origin_url("https://example.com/login")
///     .with_secure(true)
///     .with_same_site(SameSitePolicy::Lax);
///
/// assert!(props.domain.is_none());
/// assert!(props.secure);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieProperties {
    pub origin_url: Option<String>,
    pub name: String,
    pub value: String,
    pub path: String,
    pub domain: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    /// Maximum age in seconds, takes precedence over `expires`
    pub max_age: Option<i64>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSitePolicy>,
    /// Loosely-typed properties with no dedicated slot
    pub extra: BTreeMap<String, String>,
}

impl CookieProperties {
    pub fn new(name: impl Into<String>, value: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_origin_url(mut self, url: impl Into<String>) -> Self {
        self.origin_url = Some(url.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn with_same_site(mut self, policy: SameSitePolicy) -> Self {
        self.same_site = Some(policy);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Cookie record as held by a cookie store.
///
/// `(domain, path, name)` identifies a cookie within a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub expires: Option<DateTime<Utc>>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSitePolicy>,
    /// URL the cookie was set from, when the store recorded one
    pub origin_url: Option<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl HttpCookie {
    /// Build a cookie from a property dictionary.
    ///
    /// Rejects the combination with [`BridgeError::InvalidCookie`] when:
    /// - the name is empty or contains separators, whitespace or control characters
    /// - the value contains `;` or control characters
    /// - the path does not start with `/`
    /// - no domain is given and none can be derived from `origin_url`
    ///
    /// A `max_age` is resolved against `now` and replaces `expires`.
    pub fn from_properties(properties: CookieProperties, now: DateTime<Utc>) -> Result<Self> {
        let CookieProperties {
            origin_url,
            name,
            value,
            path,
            domain,
            expires,
            max_age,
            secure,
            http_only,
            same_site,
            extra,
        } = properties;

        if name.is_empty() {
            return Err(BridgeError::InvalidCookie("cookie name is empty".to_string()));
        }
        if name
            .chars()
            .any(|c| c.is_control() || c.is_whitespace() || matches!(c, '=' | ';' | ','))
        {
            return Err(BridgeError::InvalidCookie(format!(
                "cookie name contains invalid characters: {:?}",
                name
            )));
        }
        if value.chars().any(|c| c.is_control() || c == ';') {
            return Err(BridgeError::InvalidCookie(format!(
                "cookie value for {:?} contains invalid characters",
                name
            )));
        }
        if !path.starts_with('/') {
            return Err(BridgeError::InvalidCookie(format!(
                "cookie path must start with '/': {:?}",
                path
            )));
        }

        let domain = match domain.as_deref().map(str::trim) {
            Some(explicit) if !explicit.is_empty() => explicit.to_string(),
            _ => origin_url
                .as_deref()
                .and_then(host_of)
                .ok_or_else(|| {
                    BridgeError::InvalidCookie(format!(
                        "cannot determine a domain for cookie {:?}",
                        name
                    ))
                })?,
        };

        let expires = match max_age {
            Some(seconds) => {
                let delta = TimeDelta::try_seconds(seconds).ok_or_else(|| {
                    BridgeError::InvalidCookie(format!("max-age out of range: {}", seconds))
                })?;
                Some(now.checked_add_signed(delta).ok_or_else(|| {
                    BridgeError::InvalidCookie(format!("max-age out of range: {}", seconds))
                })?)
            }
            None => expires,
        };

        Ok(Self {
            name,
            value,
            domain,
            path,
            expires,
            secure,
            http_only,
            same_site,
            origin_url,
            extra,
        })
    }

    /// A cookie without an expiry lives for the session only
    pub fn is_session_only(&self) -> bool {
        self.expires.is_none()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| expires <= now)
    }

    /// Expiry as milliseconds since the Unix epoch
    pub fn expires_millis(&self) -> Option<i64> {
        self.expires.map(|expires| expires.timestamp_millis())
    }

    /// True when both cookies share the same `(domain, path, name)`
    ///
    /// Domains compare without regard to ASCII case.
    pub fn same_identity(&self, other: &HttpCookie) -> bool {
        self.domain.eq_ignore_ascii_case(&other.domain)
            && self.path == other.path
            && self.name == other.name
    }
}

/// Lower-cased host of a URL, if it parses and has one.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_ascii_lowercase))
        .filter(|host| !host.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_same_site_normalize() {
        assert_eq!(SameSitePolicy::normalize("lax"), SameSitePolicy::Lax);
        assert_eq!(SameSitePolicy::normalize("STRICT"), SameSitePolicy::Strict);
        assert_eq!(SameSitePolicy::normalize("None"), SameSitePolicy::None);
        assert_eq!(SameSitePolicy::normalize("whatever"), SameSitePolicy::None);
        assert_eq!(SameSitePolicy::Lax.display_name(), "Lax");
        assert_eq!(SameSitePolicy::Strict.raw_value(), "strict");
    }

    #[test]
    fn test_domain_derived_from_origin_url() {
        let props = CookieProperties::new("id", "1", "/").with_origin_url("https://Shop.Example.com/cart");
        let cookie = HttpCookie::from_properties(props, now()).unwrap();
        assert_eq!(cookie.domain, "shop.example.com");
        assert_eq!(cookie.origin_url.as_deref(), Some("https://Shop.Example.com/cart"));
        assert!(cookie.is_session_only());
    }

    #[test]
    fn test_explicit_domain_wins() {
        let props = CookieProperties::new("id", "1", "/")
            .with_origin_url("https://shop.example.com")
            .with_domain(" .Example.com ");
        let cookie = HttpCookie::from_properties(props, now()).unwrap();
        assert_eq!(cookie.domain, ".Example.com");
    }

    #[test]
    fn test_identity_ignores_domain_case() {
        let make = |domain: &str, path: &str| {
            HttpCookie::from_properties(
                CookieProperties::new("id", "1", path).with_domain(domain),
                now(),
            )
            .unwrap()
        };

        assert!(make("Example.com", "/").same_identity(&make("example.COM", "/")));
        assert!(!make("example.com", "/").same_identity(&make("example.com", "/a")));
        assert!(!make("example.com", "/").same_identity(&make(".example.com", "/")));
    }

    #[test]
    fn test_missing_domain_rejected() {
        let props = CookieProperties::new("id", "1", "/").with_origin_url("not a url");
        let err = HttpCookie::from_properties(props, now()).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidCookie(_)));
    }

    #[test]
    fn test_invalid_name_value_and_path_rejected() {
        let base = |name: &str, value: &str, path: &str| {
            CookieProperties::new(name, value, path).with_domain("example.com")
        };

        assert!(HttpCookie::from_properties(base("", "v", "/"), now()).is_err());
        assert!(HttpCookie::from_properties(base("a b", "v", "/"), now()).is_err());
        assert!(HttpCookie::from_properties(base("a=b", "v", "/"), now()).is_err());
        assert!(HttpCookie::from_properties(base("a", "v;x", "/"), now()).is_err());
        assert!(HttpCookie::from_properties(base("a", "v", "docs"), now()).is_err());
        assert!(HttpCookie::from_properties(base("a", "", "/"), now()).is_ok());
    }

    #[test]
    fn test_max_age_overrides_expires() {
        let props = CookieProperties::new("id", "1", "/")
            .with_domain("example.com")
            .with_expires(now() + TimeDelta::days(30))
            .with_max_age(60);
        let cookie = HttpCookie::from_properties(props, now()).unwrap();
        assert_eq!(cookie.expires, Some(now() + TimeDelta::seconds(60)));
        assert!(!cookie.is_session_only());
        assert!(!cookie.is_expired(now()));
        assert!(cookie.is_expired(now() + TimeDelta::seconds(61)));
    }

    #[test]
    fn test_expires_millis() {
        let expires = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let props = CookieProperties::new("id", "1", "/")
            .with_domain("example.com")
            .with_expires(expires);
        let cookie = HttpCookie::from_properties(props, now()).unwrap();
        assert_eq!(cookie.expires_millis(), Some(1_700_000_000_123));
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("https://a.b.com:8443/x?y=1"), Some("a.b.com".to_string()));
        assert_eq!(host_of("file:///tmp/x"), None);
        assert_eq!(host_of("::nope"), None);
    }
}
