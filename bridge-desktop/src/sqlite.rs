//! Persistent cookie store using SQLite

use async_trait::async_trait;
use bridge_traits::{
    cookie::{CookieProperties, HttpCookie, SameSitePolicy},
    error::{BridgeError, Result},
    store::{CookieStore, StoreCapabilities, WebsiteDataType},
    time::{Clock, SystemClock},
};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
    Row,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::rules::build_cookie;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS cookies (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        domain TEXT NOT NULL COLLATE NOCASE,
        path TEXT NOT NULL,
        name TEXT NOT NULL,
        value TEXT NOT NULL,
        expires_ms INTEGER,
        secure INTEGER NOT NULL,
        http_only INTEGER NOT NULL,
        same_site TEXT,
        origin_url TEXT,
        extra TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        modified_at INTEGER NOT NULL,
        UNIQUE (domain, path, name)
    )
"#;

/// SQLite-backed cookie store
///
/// Survives process restarts:
/// - one row per `(domain, path, name)`, domain compared without case
/// - enumeration follows first-insertion order
/// - expiry and modification times come from the injected [`Clock`]
pub struct SqliteCookieStore {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    capabilities: StoreCapabilities,
}

impl SqliteCookieStore {
    /// Open (or create) a cookie database at the given path
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to open cookie DB: {}", e)))?;

        let store = Self::with_pool(pool).await?;
        debug!(path = ?db_path, "Initialized cookie store");
        Ok(store)
    }

    /// Create an in-memory cookie store (for testing)
    pub async fn in_memory() -> Result<Self> {
        // A single connection keeps every query on the same memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to open cookie DB: {}", e)))?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to create table: {}", e)))?;

        Ok(Self {
            pool,
            clock: Arc::new(SystemClock),
            capabilities: StoreCapabilities::full(),
        })
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

    async fn delete_identity(&self, domain: &str, path: &str, name: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cookies WHERE domain = ? AND path = ? AND name = ?")
            .bind(domain)
            .bind(path)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to delete cookie: {}", e)))?;

        Ok(result.rows_affected())
    }

    fn row_to_cookie(row: &SqliteRow) -> Result<HttpCookie> {
        let expires_ms: Option<i64> = row.get("expires_ms");
        let expires = match expires_ms {
            Some(ms) => Some(DateTime::from_timestamp_millis(ms).ok_or_else(|| {
                BridgeError::DatabaseError(format!("Stored expiry out of range: {}", ms))
            })?),
            None => None,
        };

        let same_site: Option<String> = row.get("same_site");
        let extra: String = row.get("extra");
        let extra: BTreeMap<String, String> = serde_json::from_str(&extra)
            .map_err(|e| BridgeError::DatabaseError(format!("Corrupt extra properties: {}", e)))?;

        Ok(HttpCookie {
            name: row.get("name"),
            value: row.get("value"),
            domain: row.get("domain"),
            path: row.get("path"),
            expires,
            secure: row.get("secure"),
            http_only: row.get("http_only"),
            same_site: same_site.as_deref().map(SameSitePolicy::normalize),
            origin_url: row.get("origin_url"),
            extra,
        })
    }
}

#[async_trait]
impl CookieStore for SqliteCookieStore {
    fn capabilities(&self) -> StoreCapabilities {
        self.capabilities
    }

    fn make_cookie(&self, properties: CookieProperties) -> Result<HttpCookie> {
        build_cookie(properties, self.capabilities, self.clock.now())
    }

    async fn all_cookies(&self) -> Result<Vec<HttpCookie>> {
        let now_ms = self.clock.unix_timestamp_millis();

        let purged = sqlx::query("DELETE FROM cookies WHERE expires_ms IS NOT NULL AND expires_ms <= ?")
            .bind(now_ms)
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to purge cookies: {}", e)))?
            .rows_affected();
        if purged > 0 {
            debug!(purged, "Purged expired cookies");
        }

        let rows = sqlx::query("SELECT * FROM cookies ORDER BY seq")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to list cookies: {}", e)))?;

        rows.iter().map(Self::row_to_cookie).collect()
    }

    async fn set_cookie(&self, cookie: HttpCookie) -> Result<()> {
        let now = self.clock.now();

        if cookie.is_expired(now) {
            self.delete_identity(&cookie.domain, &cookie.path, &cookie.name)
                .await?;
            debug!(name = %cookie.name, domain = %cookie.domain, "Expired cookie evicts existing row");
            return Ok(());
        }

        let extra = serde_json::to_string(&cookie.extra).map_err(|e| {
            BridgeError::OperationFailed(format!("Failed to encode extra properties: {}", e))
        })?;

        sqlx::query(
            r#"
            INSERT INTO cookies (domain, path, name, value, expires_ms, secure, http_only,
                                 same_site, origin_url, extra, created_at, modified_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(domain, path, name) DO UPDATE SET
                domain = excluded.domain,
                value = excluded.value,
                expires_ms = excluded.expires_ms,
                secure = excluded.secure,
                http_only = excluded.http_only,
                same_site = excluded.same_site,
                origin_url = excluded.origin_url,
                extra = excluded.extra,
                modified_at = excluded.modified_at
            "#,
        )
        .bind(&cookie.domain)
        .bind(&cookie.path)
        .bind(&cookie.name)
        .bind(&cookie.value)
        .bind(cookie.expires_millis())
        .bind(cookie.secure)
        .bind(cookie.http_only)
        .bind(cookie.same_site.map(SameSitePolicy::raw_value))
        .bind(cookie.origin_url.as_deref())
        .bind(extra)
        .bind(now.timestamp_millis())
        .bind(now.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| BridgeError::DatabaseError(format!("Failed to store cookie: {}", e)))?;

        debug!(name = %cookie.name, domain = %cookie.domain, "Stored cookie");
        Ok(())
    }

    async fn delete_cookie(&self, cookie: &HttpCookie) -> Result<()> {
        let removed = self
            .delete_identity(&cookie.domain, &cookie.path, &cookie.name)
            .await?;
        debug!(name = %cookie.name, domain = %cookie.domain, removed, "Deleted cookie");
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

        let removed = sqlx::query("DELETE FROM cookies WHERE modified_at >= ?")
            .bind(modified_since.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to clear cookies: {}", e)))?
            .rows_affected();

        debug!(removed, "Removed cookie data");
        Ok(())
    }
}
