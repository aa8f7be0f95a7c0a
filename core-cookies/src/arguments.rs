//! Typed requests decoded from channel arguments
//!
//! Required keys must be present with the right type. Optional keys that are
//! absent, `null` or of an unexpected type are treated as not supplied.

use bridge_traits::cookie::{CookieProperties, SameSitePolicy, SAME_SITE_PROPERTY};
use bridge_traits::{MethodCall, StoreCapabilities};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::{CookieError, Result};

/// Read-only view over a call's argument map
pub(crate) struct Arguments<'a> {
    method: &'a str,
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Arguments<'a> {
    pub(crate) fn of(call: &'a MethodCall) -> Self {
        Self {
            method: &call.method,
            map: call.argument_map(),
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.and_then(|map| map.get(key)).filter(|v| !v.is_null())
    }

    pub(crate) fn required_str(&self, key: &str) -> Result<String> {
        match self.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(CookieError::InvalidArguments(format!(
                "{}: '{}' must be a string, got {}",
                self.method, key, other
            ))),
            None => Err(CookieError::InvalidArguments(format!(
                "{}: missing required argument '{}'",
                self.method, key
            ))),
        }
    }

    pub(crate) fn optional_str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(Value::as_str).map(str::to_string)
    }

    pub(crate) fn optional_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Integer argument, also accepted as a decimal string
    pub(crate) fn optional_i64(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Arguments of `setCookie`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookieRequest {
    pub url: String,
    pub name: String,
    pub value: String,
    pub path: String,
    pub domain: Option<String>,
    /// Milliseconds since the Unix epoch
    pub expires_date: Option<i64>,
    /// Seconds
    pub max_age: Option<i64>,
    pub is_secure: Option<bool>,
    pub is_http_only: Option<bool>,
    pub same_site: Option<String>,
}

impl SetCookieRequest {
    pub fn new(
        url: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            value: value.into(),
            path: path.into(),
            domain: None,
            expires_date: None,
            max_age: None,
            is_secure: None,
            is_http_only: None,
            same_site: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_expires_date(mut self, millis: i64) -> Self {
        self.expires_date = Some(millis);
        self
    }

    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.is_secure = Some(secure);
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.is_http_only = Some(http_only);
        self
    }

    pub fn with_same_site(mut self, same_site: impl Into<String>) -> Self {
        self.same_site = Some(same_site.into());
        self
    }

    pub(crate) fn decode(args: &Arguments<'_>) -> Result<Self> {
        Ok(Self {
            url: args.required_str("url")?,
            name: args.required_str("name")?,
            value: args.required_str("value")?,
            path: args.required_str("path")?,
            domain: args.optional_str("domain"),
            expires_date: args.optional_i64("expiresDate"),
            max_age: args.optional_i64("maxAge"),
            is_secure: args.optional_bool("isSecure"),
            is_http_only: args.optional_bool("isHttpOnly"),
            same_site: args.optional_str("sameSite"),
        })
    }

    /// Translate into the store's property dictionary.
    ///
    /// The same-site policy goes into the typed slot when the store has one,
    /// otherwise the caller's string is passed through as a loose property.
    pub(crate) fn into_properties(
        self,
        capabilities: StoreCapabilities,
    ) -> Result<CookieProperties> {
        let mut properties =
            CookieProperties::new(self.name, self.value, self.path).with_origin_url(self.url);

        if let Some(domain) = self.domain {
            properties = properties.with_domain(domain);
        }

        if let Some(millis) = self.expires_date {
            let expires = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
                CookieError::MalformedCookie(format!("expiresDate out of range: {}", millis))
            })?;
            properties = properties.with_expires(expires);
        }

        if let Some(seconds) = self.max_age {
            properties = properties.with_max_age(seconds);
        }
        if self.is_secure == Some(true) {
            properties = properties.with_secure(true);
        }
        if self.is_http_only == Some(true) {
            properties = properties.with_http_only(true);
        }

        if let Some(raw) = self.same_site {
            properties = if capabilities.same_site_policy {
                properties.with_same_site(SameSitePolicy::normalize(&raw))
            } else {
                properties.with_extra(SAME_SITE_PROPERTY, raw)
            };
        }

        Ok(properties)
    }
}

/// Arguments of `deleteCookie`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteCookieRequest {
    pub url: String,
    pub name: String,
    pub path: String,
    pub domain: Option<String>,
}

impl DeleteCookieRequest {
    pub fn new(url: impl Into<String>, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            path: path.into(),
            domain: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub(crate) fn decode(args: &Arguments<'_>) -> Result<Self> {
        Ok(Self {
            url: args.required_str("url")?,
            name: args.required_str("name")?,
            path: args.required_str("path")?,
            domain: args.optional_str("domain"),
        })
    }
}

/// Arguments of `deleteCookies`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteCookiesRequest {
    pub url: String,
    pub path: String,
    pub domain: Option<String>,
}

impl DeleteCookiesRequest {
    pub fn new(url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            path: path.into(),
            domain: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub(crate) fn decode(args: &Arguments<'_>) -> Result<Self> {
        Ok(Self {
            url: args.required_str("url")?,
            path: args.required_str("path")?,
            domain: args.optional_str("domain"),
        })
    }
}
