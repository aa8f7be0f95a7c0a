//! Core service façade and bootstrap helpers.
//!
//! This crate wires a host-provided cookie store into the cookie bridge and
//! routes method-channel calls to the handler registered for each channel.
//! Desktop apps typically enable the `desktop-shims` feature, which lets
//! [`bootstrap_desktop`] fall back to the stores from `bridge-desktop`.

pub mod error;

pub use error::{CoreError, Result};

use std::collections::HashMap;
use std::sync::Arc;

use bridge_traits::{MethodCall, MethodCallHandler, MethodResponse};
use core_cookies::CookieManager;
use core_runtime::config::CookieManagerConfig;
use tokio::sync::RwLock;
use tracing::{debug, info};

type Registry = HashMap<String, Arc<dyn MethodCallHandler>>;

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    cookies: Arc<CookieManager>,
    channels: Arc<RwLock<Registry>>,
}

impl CoreService {
    /// Build the cookie bridge from `config` and register it on its channel.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InitializationFailed`] when the configuration is
    /// invalid.
    pub async fn bootstrap(config: CookieManagerConfig) -> Result<Self> {
        config.validate()?;

        let cookies = Arc::new(CookieManager::from_config(&config));
        let service = Self {
            cookies: Arc::clone(&cookies),
            channels: Arc::new(RwLock::new(HashMap::new())),
        };
        service.register(cookies).await?;

        info!(channel = %config.channel_name, "Cookie bridge registered");
        Ok(service)
    }

    /// The cookie bridge created at bootstrap.
    pub fn cookies(&self) -> Arc<CookieManager> {
        Arc::clone(&self.cookies)
    }

    /// Register an additional handler under its own channel name.
    pub async fn register(&self, handler: Arc<dyn MethodCallHandler>) -> Result<()> {
        let name = handler.channel_name().to_string();
        let mut channels = self.channels.write().await;
        if channels.contains_key(&name) {
            return Err(CoreError::ChannelConflict(name));
        }

        debug!(channel = %name, "Registered channel handler");
        channels.insert(name, handler);
        Ok(())
    }

    /// Names of every registered channel, sorted.
    pub async fn channels(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Route a call to the handler registered on `channel`.
    ///
    /// Calls on unknown channels get [`MethodResponse::NotImplemented`].
    pub async fn dispatch(&self, channel: &str, call: MethodCall) -> MethodResponse {
        let handler = self.channels.read().await.get(channel).cloned();
        match handler {
            Some(handler) => handler.handle(call).await,
            None => {
                debug!(%channel, method = %call.method, "No handler for channel");
                MethodResponse::NotImplemented
            }
        }
    }

    /// Dispose every handler and clear the registry.
    pub async fn shutdown(&self) {
        let handlers: Vec<_> = self.channels.write().await.drain().collect();
        for (name, handler) in handlers {
            handler.dispose().await;
            debug!(channel = %name, "Disposed channel handler");
        }
        info!("Core service shut down");
    }
}

/// Bootstrap with the desktop default store.
///
/// Uses a persistent SQLite store when `database_path` is given and an
/// in-memory store otherwise.
///
/// ```no_run
/// # async fn example() -> core_service::Result<()> {
/// use bridge_traits::MethodCall;
///
/// let core = core_service::bootstrap_desktop(None).await?;
/// let channel = core.cookies();
/// let reply = core
///     .dispatch(
///         bridge_traits::MethodCallHandler::channel_name(channel.as_ref()),
///         MethodCall::without_arguments("getAllCookies"),
///     )
///     .await;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub async fn bootstrap_desktop(database_path: Option<std::path::PathBuf>) -> Result<CoreService> {
    let mut builder = CookieManagerConfig::builder();
    if let Some(path) = database_path {
        builder = builder.database_path(path);
    }
    CoreService::bootstrap(builder.build()?).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_desktop::MemoryCookieStore;
    use core_runtime::config::DEFAULT_CHANNEL_NAME;
    use mockall::mock;
    use serde_json::json;

    mock! {
        Handler {}

        #[async_trait]
        impl MethodCallHandler for Handler {
            fn channel_name(&self) -> &str;
            async fn handle(&self, call: MethodCall) -> MethodResponse;
            async fn dispose(&self);
        }
    }

    fn config() -> CookieManagerConfig {
        CookieManagerConfig::builder()
            .cookie_store(Arc::new(MemoryCookieStore::new()))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_bootstrap_registers_cookie_channel() {
        let core = CoreService::bootstrap(config()).await.unwrap();
        assert_eq!(core.channels().await, vec![DEFAULT_CHANNEL_NAME.to_string()]);

        let reply = core
            .dispatch(
                DEFAULT_CHANNEL_NAME,
                MethodCall::new(
                    "setCookie",
                    json!({ "url": "https://example.com", "name": "a", "value": "1", "path": "/" }),
                ),
            )
            .await;
        assert_eq!(reply.as_bool(), Some(true));
    }

    #[tokio::test]
    async fn test_unknown_channel_is_not_implemented() {
        let core = CoreService::bootstrap(config()).await.unwrap();
        let reply = core
            .dispatch("unknown/channel", MethodCall::without_arguments("getAllCookies"))
            .await;
        assert!(reply.is_not_implemented());
    }

    #[tokio::test]
    async fn test_register_routes_and_rejects_duplicates() {
        let core = CoreService::bootstrap(config()).await.unwrap();

        let mut handler = MockHandler::new();
        handler.expect_channel_name().return_const("test/echo".to_string());
        handler
            .expect_handle()
            .withf(|call| call.method == "ping")
            .times(1)
            .returning(|_| MethodResponse::success("pong"));
        let handler: Arc<dyn MethodCallHandler> = Arc::new(handler);

        core.register(Arc::clone(&handler)).await.unwrap();
        assert!(matches!(
            core.register(handler).await,
            Err(CoreError::ChannelConflict(name)) if name == "test/echo"
        ));

        let reply = core
            .dispatch("test/echo", MethodCall::without_arguments("ping"))
            .await;
        assert_eq!(reply.value(), Some(&json!("pong")));
    }

    #[tokio::test]
    async fn test_shutdown_disposes_handlers() {
        let core = CoreService::bootstrap(config()).await.unwrap();

        let mut handler = MockHandler::new();
        handler.expect_channel_name().return_const("test/other".to_string());
        handler.expect_dispose().times(1).return_const(());
        core.register(Arc::new(handler)).await.unwrap();

        let cookies = core.cookies();
        core.shutdown().await;

        assert!(core.channels().await.is_empty());
        assert!(!cookies.is_bound().await);

        let reply = core
            .dispatch(DEFAULT_CHANNEL_NAME, MethodCall::without_arguments("getAllCookies"))
            .await;
        assert!(reply.is_not_implemented());
    }

    #[tokio::test]
    async fn test_invalid_config_fails_bootstrap() {
        let mut config = config();
        config.channel_name = "has space".to_string();

        assert!(matches!(
            CoreService::bootstrap(config).await,
            Err(CoreError::InitializationFailed(_))
        ));
    }

    #[cfg(feature = "desktop-shims")]
    #[tokio::test]
    async fn test_bootstrap_desktop_in_memory() {
        let core = bootstrap_desktop(None).await.unwrap();
        let reply = core
            .dispatch(DEFAULT_CHANNEL_NAME, MethodCall::without_arguments("getAllCookies"))
            .await;
        assert_eq!(reply.value(), Some(&json!([])));
    }
}
