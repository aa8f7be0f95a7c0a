//! # Cookie Manager Configuration
//!
//! Provides configuration management for the cookie bridge.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! [`CookieManagerConfig`] holding the cookie store handle and the settings of
//! the method channel. It enforces fail-fast validation so a manager is never
//! created without a store.
//!
//! ## Required Dependencies
//!
//! - `CookieStore` - the platform cookie store
//!
//! When the `desktop-shims` feature is enabled, a desktop store is injected
//! automatically if none is provided: `SqliteCookieStore` when a
//! `database_path` is set, `MemoryCookieStore` otherwise.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{BulkDeleteMode, CookieManagerConfig};
//! use std::sync::Arc;
//!
//! let config = CookieManagerConfig::builder()
//!     .cookie_store(Arc::new(MyWebKitCookieStore::default()))
//!     .bulk_delete(BulkDeleteMode::Detached)
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CookieManagerConfig;
//!
//! // Whitespace is not allowed in channel names
//! let config = CookieManagerConfig::builder()
//!     .channel_name("my channel")
//!     .build()
//!     .expect("Should fail - invalid channel name");
//! ```

use crate::error::{Error, Result};
use bridge_traits::CookieStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Channel name the host framework uses for cookie calls
pub const DEFAULT_CHANNEL_NAME: &str = "com.pichillilorenzo/flutter_inappwebview_cookiemanager";

/// How `deleteCookies` waits on the individual deletes it issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulkDeleteMode {
    /// Run every delete concurrently and reply once all have settled
    #[default]
    AwaitAll,
    /// Spawn every delete and reply without waiting for any of them
    Detached,
}

/// Configuration for the cookie manager.
///
/// Use [`CookieManagerConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CookieManagerConfig {
    /// Name of the method channel the manager answers on
    pub channel_name: String,

    /// Cookie store every operation is delegated to (required)
    pub cookie_store: Arc<dyn CookieStore>,

    /// Database file backing the desktop default store
    pub database_path: Option<PathBuf>,

    /// Completion policy of bulk deletes
    pub bulk_delete: BulkDeleteMode,

    /// Log cookie values verbatim instead of redacting them
    pub log_cookie_values: bool,
}

impl std::fmt::Debug for CookieManagerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieManagerConfig")
            .field("channel_name", &self.channel_name)
            .field("cookie_store", &"CookieStore { ... }")
            .field("database_path", &self.database_path)
            .field("bulk_delete", &self.bulk_delete)
            .field("log_cookie_values", &self.log_cookie_values)
            .finish()
    }
}

impl CookieManagerConfig {
    /// Creates a new builder for constructing a `CookieManagerConfig`.
    pub fn builder() -> CookieManagerConfigBuilder {
        CookieManagerConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Channel name is not empty and contains no whitespace
    /// - Database path, if set, is not empty
    pub fn validate(&self) -> Result<()> {
        if self.channel_name.trim().is_empty() {
            return Err(Error::Config("Channel name cannot be empty".to_string()));
        }

        if self.channel_name.chars().any(char::is_whitespace) {
            return Err(Error::Config(format!(
                "Channel name must not contain whitespace: {:?}",
                self.channel_name
            )));
        }

        if let Some(path) = &self.database_path {
            if path.as_os_str().is_empty() {
                return Err(Error::Config("Database path cannot be empty".to_string()));
            }
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn cookie_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "CookieStore".to_string(),
        message: "CookieStore implementation is required for cookie operations. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default desktop store. \
                 iOS: inject a WKHTTPCookieStore adapter. \
                 Android: inject an android.webkit.CookieManager adapter."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_cookie_store(database_path: Option<&Path>) -> Result<Arc<dyn CookieStore>> {
    use bridge_desktop::{MemoryCookieStore, SqliteCookieStore};
    use std::thread;
    use tokio::runtime::{Handle, Runtime};

    let Some(path) = database_path else {
        let store: Arc<dyn CookieStore> = Arc::new(MemoryCookieStore::new());
        return Ok(store);
    };

    let init_store = |path: PathBuf| -> Result<_> {
        let runtime = Runtime::new()
            .map_err(|e| Error::Worker(format!("Failed to create Tokio runtime: {}", e)))?;
        Ok(runtime.block_on(SqliteCookieStore::new(path))?)
    };

    // block_on panics inside a runtime, so initialize from a fresh thread there
    let store = match Handle::try_current() {
        Ok(_) => {
            let path = path.to_path_buf();
            thread::spawn(move || init_store(path))
                .join()
                .map_err(|_| Error::Worker("Worker thread panicked".to_string()))??
        }
        Err(_) => init_store(path.to_path_buf())?,
    };

    let store: Arc<dyn CookieStore> = Arc::new(store);
    Ok(store)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_cookie_store(_database_path: Option<&Path>) -> Result<Arc<dyn CookieStore>> {
    Err(cookie_store_missing_error())
}

/// Builder for constructing [`CookieManagerConfig`] instances.
#[derive(Default)]
pub struct CookieManagerConfigBuilder {
    channel_name: Option<String>,
    cookie_store: Option<Arc<dyn CookieStore>>,
    database_path: Option<PathBuf>,
    bulk_delete: BulkDeleteMode,
    log_cookie_values: bool,
}

impl CookieManagerConfigBuilder {
    /// Sets the method channel name.
    ///
    /// Default: [`DEFAULT_CHANNEL_NAME`]
    pub fn channel_name(mut self, name: impl Into<String>) -> Self {
        self.channel_name = Some(name.into());
        self
    }

    /// Sets the cookie store implementation (required).
    ///
    /// The store is bound to the manager for its whole lifetime and released
    /// when the manager is disposed.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use core_runtime::config::CookieManagerConfig;
    /// use std::sync::Arc;
    ///
    /// let builder = CookieManagerConfig::builder()
    ///     .cookie_store(Arc::new(MyCookieStore));
    /// ```
    pub fn cookie_store(mut self, store: Arc<dyn CookieStore>) -> Self {
        self.cookie_store = Some(store);
        self
    }

    /// Sets the database file used by the desktop default store.
    ///
    /// Ignored when a store is injected explicitly.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_runtime::config::CookieManagerConfig;
    ///
    /// let builder = CookieManagerConfig::builder()
    ///     .database_path("/path/to/cookies.db");
    /// ```
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Sets how `deleteCookies` completes.
    ///
    /// Default: [`BulkDeleteMode::AwaitAll`]
    pub fn bulk_delete(mut self, mode: BulkDeleteMode) -> Self {
        self.bulk_delete = mode;
        self
    }

    /// Enables or disables logging raw cookie values.
    ///
    /// Default: false
    pub fn log_cookie_values(mut self, enabled: bool) -> Self {
        self.log_cookie_values = enabled;
        self
    }

    /// Builds the final `CookieManagerConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CookieManagerConfig)` on success, or an error if:
    /// - No cookie store is available (see [`CookieManagerConfigBuilder::cookie_store`])
    /// - Configuration values are invalid
    pub fn build(self) -> Result<CookieManagerConfig> {
        let cookie_store = match self.cookie_store {
            Some(store) => store,
            None => provide_default_cookie_store(self.database_path.as_deref())?,
        };

        let config = CookieManagerConfig {
            channel_name: self
                .channel_name
                .unwrap_or_else(|| DEFAULT_CHANNEL_NAME.to_string()),
            cookie_store,
            database_path: self.database_path,
            bulk_delete: self.bulk_delete,
            log_cookie_values: self.log_cookie_values,
        };

        config.validate()?;

        Ok(config)
    }
}
