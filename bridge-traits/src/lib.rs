//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the cookie core and the
//! platform-specific pieces it drives. The web-view cookie store is owned by
//! the host (WebKit, Android WebView, a desktop store) and is reached only
//! through [`CookieStore`](store::CookieStore).
//!
//! ## Traits
//!
//! - [`CookieStore`](store::CookieStore) - Enumerate, insert, delete and bulk-clear cookies
//! - [`MethodCallHandler`](channel::MethodCallHandler) - Receive named calls from the host framework
//! - [`Clock`](time::Clock) - Time source for deterministic expiry
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Memory + SQLite stores |
//! | iOS      | TBD                 | 📋 Planned (`WKHTTPCookieStore`) |
//! | Android  | TBD                 | 📋 Planned (`android.webkit.CookieManager`) |
//!
//! ## Capabilities
//!
//! Stores report optional features through
//! [`StoreCapabilities`](store::StoreCapabilities) once, at construction. The
//! core branches on the reported capability instead of on OS versions.
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). A store that
//! refuses to build a cookie from its properties returns
//! [`BridgeError::InvalidCookie`].
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so handles can be shared across
//! async tasks.

pub mod channel;
pub mod cookie;
pub mod error;
pub mod store;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use channel::{MethodCall, MethodCallHandler, MethodResponse};
pub use cookie::{CookieProperties, HttpCookie, SameSitePolicy};
pub use store::{CookieStore, StoreCapabilities, WebsiteDataType};
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, ManualClock, SystemClock};
