//! # Cookie Manager
//!
//! Translates cookie requests into calls against the host's [`CookieStore`].
//!
//! ## Overview
//!
//! The manager owns nothing but a handle to the store. The handle is bound at
//! construction and unbound once by [`dispose`](bridge_traits::MethodCallHandler::dispose);
//! afterwards reads yield nothing and writes fail with
//! [`CookieError::StoreUnavailable`]. Matching, expiry and persistence are
//! left entirely to the store.
//!
//! ## Usage
//!
//! ```no_run
//! use bridge_desktop::MemoryCookieStore;
//! use core_cookies::{CookieManager, SetCookieRequest};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> core_cookies::Result<()> {
//! let manager = CookieManager::new(Arc::new(MemoryCookieStore::new()));
//!
//! manager
//!     .set_cookie(SetCookieRequest::new("https://example.com", "theme", "dark", "/"))
//!     .await?;
//!
//! let cookies = manager.get_cookies("https://www.example.com/").await?;
//! assert_eq!(cookies[0].value, "dark");
//! # Ok(())
//! # }
//! ```

use bridge_traits::cookie::host_of;
use bridge_traits::{BridgeError, CookieStore, HttpCookie, WebsiteDataType};
use chrono::{DateTime, Utc};
use core_runtime::config::{BulkDeleteMode, CookieManagerConfig, DEFAULT_CHANNEL_NAME};
use core_runtime::logging::{redact_if_sensitive, strip_query};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::arguments::{DeleteCookieRequest, DeleteCookiesRequest, SetCookieRequest};
use crate::cookie::{domain_matches, Cookie};
use crate::error::{CookieError, Result};

/// Bridge between cookie requests and a host cookie store.
pub struct CookieManager {
    channel_name: String,
    store: RwLock<Option<Arc<dyn CookieStore>>>,
    bulk_delete: BulkDeleteMode,
    log_cookie_values: bool,
}

impl CookieManager {
    /// Bind a manager to `store` using the default channel and settings.
    pub fn new(store: Arc<dyn CookieStore>) -> Self {
        Self {
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            store: RwLock::new(Some(store)),
            bulk_delete: BulkDeleteMode::default(),
            log_cookie_values: false,
        }
    }

    /// Bind a manager according to a validated configuration.
    pub fn from_config(config: &CookieManagerConfig) -> Self {
        Self::new(Arc::clone(&config.cookie_store))
            .with_channel_name(config.channel_name.clone())
            .with_bulk_delete(config.bulk_delete)
            .with_log_cookie_values(config.log_cookie_values)
    }

    pub fn with_channel_name(mut self, channel_name: impl Into<String>) -> Self {
        self.channel_name = channel_name.into();
        self
    }

    pub fn with_bulk_delete(mut self, mode: BulkDeleteMode) -> Self {
        self.bulk_delete = mode;
        self
    }

    pub fn with_log_cookie_values(mut self, enabled: bool) -> Self {
        self.log_cookie_values = enabled;
        self
    }

    pub(crate) fn channel(&self) -> &str {
        &self.channel_name
    }

    /// Whether the store handle is still bound
    pub async fn is_bound(&self) -> bool {
        self.store.read().await.is_some()
    }

    /// Drop the store handle. Every later operation sees an unavailable store.
    pub(crate) async fn unbind(&self) {
        if self.store.write().await.take().is_some() {
            info!(channel = %self.channel_name, "Cookie store unbound");
        }
    }

    async fn store(&self) -> Result<Arc<dyn CookieStore>> {
        self.store
            .read()
            .await
            .clone()
            .ok_or(CookieError::StoreUnavailable)
    }

    fn loggable_value(&self, value: &str) -> String {
        if self.log_cookie_values {
            value.to_string()
        } else {
            redact_if_sensitive("value", value)
        }
    }

    /// Write a cookie built from `request`.
    ///
    /// # Errors
    ///
    /// - [`CookieError::StoreUnavailable`] once the store is unbound
    /// - [`CookieError::MalformedCookie`] when the store rejects the properties
    /// - [`CookieError::Store`] when the write itself fails
    #[instrument(skip_all, fields(name = %request.name, path = %request.path))]
    pub async fn set_cookie(&self, request: SetCookieRequest) -> Result<()> {
        let store = self.store().await?;
        let url = strip_query(&request.url);
        let value = self.loggable_value(&request.value);

        let properties = request.into_properties(store.capabilities())?;
        let cookie = store.make_cookie(properties).map_err(|e| match e {
            BridgeError::InvalidCookie(reason) => CookieError::MalformedCookie(reason),
            other => CookieError::Store(other),
        })?;

        debug!(
            domain = %cookie.domain,
            %url,
            %value,
            session_only = cookie.is_session_only(),
            "Setting cookie"
        );

        store.set_cookie(cookie).await?;
        Ok(())
    }

    /// Cookies applicable to the host of `url`.
    ///
    /// A URL without a host yields an empty list.
    #[instrument(skip_all, fields(url = %strip_query(url)))]
    pub async fn get_cookies(&self, url: &str) -> Result<Vec<Cookie>> {
        let store = self.store().await?;

        let Some(host) = host_of(url) else {
            warn!("Cannot get cookies, no host found for URL");
            return Ok(Vec::new());
        };

        let capabilities = store.capabilities();
        let cookies: Vec<Cookie> = store
            .all_cookies()
            .await?
            .iter()
            .filter(|cookie| domain_matches(&host, &cookie.domain))
            .map(|cookie| Cookie::from_http(cookie, capabilities))
            .collect();

        debug!(%host, count = cookies.len(), "Matched cookies");
        Ok(cookies)
    }

    /// Every cookie in the store, unfiltered.
    pub async fn get_all_cookies(&self) -> Result<Vec<Cookie>> {
        let store = self.store().await?;
        let capabilities = store.capabilities();

        Ok(store
            .all_cookies()
            .await?
            .iter()
            .map(|cookie| Cookie::from_http(cookie, capabilities))
            .collect())
    }

    /// Delete the first cookie matching the request's domain, name and path.
    ///
    /// # Errors
    ///
    /// Returns [`CookieError::NotFound`] when no cookie matches; the store
    /// is left untouched in that case.
    #[instrument(skip_all, fields(name = %request.name, path = %request.path))]
    pub async fn delete_cookie(&self, request: DeleteCookieRequest) -> Result<()> {
        let store = self.store().await?;
        let cookies = store.all_cookies().await?;

        let mut resolver = DomainResolver::new(request.domain.as_deref(), &request.url);
        let target = cookies.iter().find(|cookie| {
            resolver
                .resolve(cookie)
                .is_some_and(|domain| cookie.domain.eq_ignore_ascii_case(domain))
                && cookie.name == request.name
                && cookie.path == request.path
        });

        match target {
            Some(cookie) => {
                store.delete_cookie(cookie).await?;
                debug!(domain = %cookie.domain, "Deleted cookie");
                Ok(())
            }
            None => Err(CookieError::NotFound {
                name: request.name,
                path: request.path,
                domain: resolver.into_resolved(),
            }),
        }
    }

    /// Delete every cookie matching the request's domain and path.
    ///
    /// Individual delete failures are logged and never fail the call. With
    /// [`BulkDeleteMode::Detached`] the deletes may still be running when this
    /// returns.
    #[instrument(skip_all, fields(path = %request.path, mode = ?self.bulk_delete))]
    pub async fn delete_cookies(&self, request: DeleteCookiesRequest) -> Result<()> {
        let store = self.store().await?;
        let cookies = store.all_cookies().await?;

        let mut resolver = DomainResolver::new(request.domain.as_deref(), &request.url);
        let targets: Vec<HttpCookie> = cookies
            .into_iter()
            .filter(|cookie| {
                resolver
                    .resolve(cookie)
                    .is_some_and(|domain| cookie.domain.eq_ignore_ascii_case(domain))
                    && cookie.path == request.path
            })
            .collect();

        if targets.is_empty() {
            debug!(domain = ?resolver.into_resolved(), "No cookies to delete");
            return Ok(());
        }

        match self.bulk_delete {
            BulkDeleteMode::AwaitAll => delete_all_awaited(store, &targets).await,
            BulkDeleteMode::Detached => delete_all_detached(store, targets).await,
        }

        Ok(())
    }

    /// Clear every cookie regardless of when it was set.
    pub async fn delete_all_cookies(&self) -> Result<()> {
        let store = self.store().await?;
        store
            .remove_data(&[WebsiteDataType::Cookies], DateTime::<Utc>::UNIX_EPOCH)
            .await?;
        info!("Removed all cookies");
        Ok(())
    }
}

async fn delete_all_awaited(store: Arc<dyn CookieStore>, targets: &[HttpCookie]) {
    let results = join_all(targets.iter().map(|cookie| store.delete_cookie(cookie))).await;

    let mut failed = 0usize;
    for (cookie, result) in targets.iter().zip(results) {
        if let Err(e) = result {
            failed += 1;
            warn!(name = %cookie.name, domain = %cookie.domain, error = %e, "Failed to delete cookie");
        }
    }

    debug!(requested = targets.len(), failed, "Bulk delete finished");
}

async fn delete_all_detached(store: Arc<dyn CookieStore>, targets: Vec<HttpCookie>) {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        debug!("No runtime to detach deletes onto, awaiting them instead");
        delete_all_awaited(store, &targets).await;
        return;
    };

    let issued = targets.len();
    for cookie in targets {
        let store = Arc::clone(&store);
        handle.spawn(async move {
            if let Err(e) = store.delete_cookie(&cookie).await {
                warn!(name = %cookie.name, domain = %cookie.domain, error = %e, "Failed to delete cookie");
            }
        });
    }

    debug!(issued, "Bulk delete issued");
}

/// Domain a delete request applies to.
///
/// An explicit domain wins. Otherwise the host of the first enumerated
/// cookie's origin URL (or the request URL when the cookie has none) is used,
/// and kept for the rest of the enumeration once it resolves.
struct DomainResolver<'a> {
    fallback_url: &'a str,
    resolved: Option<String>,
}

impl<'a> DomainResolver<'a> {
    fn new(explicit: Option<&str>, fallback_url: &'a str) -> Self {
        Self {
            fallback_url,
            resolved: explicit.map(str::to_string),
        }
    }

    fn resolve(&mut self, cookie: &HttpCookie) -> Option<&str> {
        if self.resolved.is_none() {
            let origin = cookie.origin_url.as_deref().unwrap_or(self.fallback_url);
            self.resolved = host_of(origin);
            if self.resolved.is_none() {
                warn!(url = %strip_query(origin), "Cannot resolve cookie domain, no host found for URL");
            }
        }
        self.resolved.as_deref()
    }

    fn into_resolved(self) -> Option<String> {
        self.resolved
    }
}
