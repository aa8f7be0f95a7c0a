//! Cookie representation exchanged with callers

use bridge_traits::{HttpCookie, StoreCapabilities};
use serde::{Deserialize, Serialize};

/// A cookie as reported back over the channel.
///
/// Absent optionals are sent as `null` rather than omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Milliseconds since the Unix epoch, `None` for session cookies
    pub expires_date: Option<i64>,
    pub is_session_only: bool,
    pub domain: String,
    /// `"Lax"`, `"Strict"` or `"None"`; only reported by stores with a typed same-site slot
    pub same_site: Option<String>,
    pub is_secure: bool,
    pub is_http_only: bool,
    pub path: String,
}

impl Cookie {
    pub fn from_http(cookie: &HttpCookie, capabilities: StoreCapabilities) -> Self {
        let same_site = if capabilities.same_site_policy {
            cookie.same_site.map(|policy| policy.display_name().to_string())
        } else {
            None
        };

        Self {
            name: cookie.name.clone(),
            value: cookie.value.clone(),
            expires_date: cookie.expires_millis(),
            is_session_only: cookie.is_session_only(),
            domain: cookie.domain.clone(),
            same_site,
            is_secure: cookie.secure,
            is_http_only: cookie.http_only,
            path: cookie.path.clone(),
        }
    }
}

/// True when a cookie stored for `cookie_domain` applies to `host`.
///
/// A leading dot on the cookie domain is ignored; the host must equal the
/// domain or be one of its subdomains. Comparison ignores ASCII case.
pub fn domain_matches(host: &str, cookie_domain: &str) -> bool {
    let domain = cookie_domain.strip_prefix('.').unwrap_or(cookie_domain);
    if domain.is_empty() || host.len() < domain.len() {
        return false;
    }

    let split = host.len() - domain.len();
    if !host.is_char_boundary(split) || !host[split..].eq_ignore_ascii_case(domain) {
        return false;
    }

    split == 0 || host[..split].ends_with('.')
}
