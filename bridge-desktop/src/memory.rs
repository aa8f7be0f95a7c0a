//! In-process cookie store

use async_trait::async_trait;
use bridge_traits::{
    cookie::{CookieProperties, HttpCookie},
    error::Result,
    store::{CookieStore, StoreCapabilities, WebsiteDataType},
    time::{Clock, SystemClock},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::rules::build_cookie;

struct StoredCookie {
    cookie: HttpCookie,
    modified_at: DateTime<Utc>,
}

/// Cookie store kept entirely in memory
///
/// Cookies are enumerated in insertion order; replacing a cookie keeps its
/// original position. Expired cookies are purged on enumeration.
pub struct MemoryCookieStore {
    entries: RwLock<Vec<StoredCookie>>,
    clock: Arc<dyn Clock>,
    capabilities: StoreCapabilities,
}

impl MemoryCookieStore {
    /// Create an empty store using the system clock
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            clock: Arc::new(SystemClock),
            capabilities: StoreCapabilities::full(),
        }
    }

    /// Use `clock` for expiry and modification times
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Override the reported capabilities
    pub fn with_capabilities(mut self, capabilities: StoreCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Number of cookies held, including ones that expired since the last enumeration
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for MemoryCookieStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CookieStore for MemoryCookieStore {
    fn capabilities(&self) -> StoreCapabilities {
        self.capabilities
    }

    fn make_cookie(&self, properties: CookieProperties) -> Result<HttpCookie> {
        build_cookie(properties, self.capabilities, self.clock.now())
    }

    async fn all_cookies(&self) -> Result<Vec<HttpCookie>> {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;

        let before = entries.len();
        entries.retain(|entry| !entry.cookie.is_expired(now));
        if entries.len() != before {
            debug!(purged = before - entries.len(), "Purged expired cookies");
        }

        Ok(entries.iter().map(|entry| entry.cookie.clone()).collect())
    }

    async fn set_cookie(&self, cookie: HttpCookie) -> Result<()> {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;

        if cookie.is_expired(now) {
            entries.retain(|entry| !entry.cookie.same_identity(&cookie));
            debug!(name = %cookie.name, domain = %cookie.domain, "Expired cookie evicts existing entry");
            return Ok(());
        }

        match entries
            .iter_mut()
            .find(|entry| entry.cookie.same_identity(&cookie))
        {
            Some(existing) => {
                existing.cookie = cookie;
                existing.modified_at = now;
            }
            None => entries.push(StoredCookie {
                cookie,
                modified_at: now,
            }),
        }

        Ok(())
    }

    async fn delete_cookie(&self, cookie: &HttpCookie) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.retain(|entry| !entry.cookie.same_identity(cookie));
        debug!(name = %cookie.name, domain = %cookie.domain, path = %cookie.path, "Deleted cookie");
        Ok(())
    }

    async fn remove_data(
        &self,
        types: &[WebsiteDataType],
        modified_since: DateTime<Utc>,
    ) -> Result<()> {
        if !types.contains(&WebsiteDataType::Cookies) {
            debug!(?types, "No cookie data requested for removal");
            return Ok(());
        }

        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|entry| entry.modified_at < modified_since);
        debug!(removed = before - entries.len(), "Removed cookie data");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::cookie::SameSitePolicy;
    use bridge_traits::time::ManualClock;
    use chrono::{TimeDelta, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn store_with_clock() -> (MemoryCookieStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        let store = MemoryCookieStore::new().with_clock(clock.clone());
        (store, clock)
    }

    fn cookie(store: &MemoryCookieStore, name: &str, value: &str, domain: &str) -> HttpCookie {
        store
            .make_cookie(CookieProperties::new(name, value, "/").with_domain(domain))
            .unwrap()
    }

    #[tokio::test]
    async fn test_set_and_enumerate_in_insertion_order() {
        let (store, _) = store_with_clock();
        store.set_cookie(cookie(&store, "b", "1", "example.com")).await.unwrap();
        store.set_cookie(cookie(&store, "a", "2", "example.com")).await.unwrap();

        let names: Vec<_> = store
            .all_cookies()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_same_identity_replaces_in_place() {
        let (store, _) = store_with_clock();
        store.set_cookie(cookie(&store, "a", "old", "example.com")).await.unwrap();
        store.set_cookie(cookie(&store, "b", "x", "example.com")).await.unwrap();
        store.set_cookie(cookie(&store, "a", "new", "example.com")).await.unwrap();

        let cookies = store.all_cookies().await.unwrap();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].name, "a");
        assert_eq!(cookies[0].value, "new");
    }

    #[tokio::test]
    async fn test_domain_case_kept_and_shares_identity() {
        let (store, _) = store_with_clock();
        store.set_cookie(cookie(&store, "a", "1", "Example.com")).await.unwrap();
        assert_eq!(store.all_cookies().await.unwrap()[0].domain, "Example.com");

        store.set_cookie(cookie(&store, "a", "2", "example.com")).await.unwrap();
        let cookies = store.all_cookies().await.unwrap();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].value, "2");

        store.delete_cookie(&cookie(&store, "a", "", "EXAMPLE.COM")).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_same_name_different_domain_kept_apart() {
        let (store, _) = store_with_clock();
        store.set_cookie(cookie(&store, "a", "1", "example.com")).await.unwrap();
        store.set_cookie(cookie(&store, "a", "2", "other.com")).await.unwrap();
        assert_eq!(store.all_cookies().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_expired_cookies_are_purged() {
        let (store, clock) = store_with_clock();
        let short = store
            .make_cookie(
                CookieProperties::new("short", "1", "/")
                    .with_domain("example.com")
                    .with_max_age(10),
            )
            .unwrap();
        store.set_cookie(short).await.unwrap();
        store.set_cookie(cookie(&store, "session", "1", "example.com")).await.unwrap();

        clock.advance(TimeDelta::seconds(11));

        let cookies = store.all_cookies().await.unwrap();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "session");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_setting_expired_cookie_deletes_existing() {
        let (store, _) = store_with_clock();
        store.set_cookie(cookie(&store, "a", "1", "example.com")).await.unwrap();

        let expired = store
            .make_cookie(
                CookieProperties::new("a", "gone", "/")
                    .with_domain("example.com")
                    .with_expires(start() - TimeDelta::days(1)),
            )
            .unwrap();
        store.set_cookie(expired).await.unwrap();

        assert!(store.all_cookies().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_cookie_by_identity() {
        let (store, _) = store_with_clock();
        let target = cookie(&store, "a", "1", "example.com");
        store.set_cookie(target.clone()).await.unwrap();
        store.set_cookie(cookie(&store, "b", "1", "example.com")).await.unwrap();

        store.delete_cookie(&target).await.unwrap();
        store.delete_cookie(&target).await.unwrap();

        let cookies = store.all_cookies().await.unwrap();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "b");
    }

    #[tokio::test]
    async fn test_remove_data_respects_horizon_and_type() {
        let (store, clock) = store_with_clock();
        store.set_cookie(cookie(&store, "old", "1", "example.com")).await.unwrap();
        clock.advance(TimeDelta::hours(1));
        store.set_cookie(cookie(&store, "new", "1", "example.com")).await.unwrap();

        store
            .remove_data(&[WebsiteDataType::LocalStorage], DateTime::<Utc>::UNIX_EPOCH)
            .await
            .unwrap();
        assert_eq!(store.all_cookies().await.unwrap().len(), 2);

        store
            .remove_data(&[WebsiteDataType::Cookies], start() + TimeDelta::minutes(30))
            .await
            .unwrap();
        let cookies = store.all_cookies().await.unwrap();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "old");

        store
            .remove_data(&[WebsiteDataType::Cookies], DateTime::<Utc>::UNIX_EPOCH)
            .await
            .unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_capabilities_drive_same_site_slot() {
        let store = MemoryCookieStore::new().with_capabilities(StoreCapabilities::default());
        assert!(!store.capabilities().same_site_policy);

        let cookie = store
            .make_cookie(
                CookieProperties::new("a", "1", "/")
                    .with_domain("example.com")
                    .with_same_site(SameSitePolicy::Lax),
            )
            .unwrap();
        assert!(cookie.same_site.is_none());
    }
}
