//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux), where no web-view engine provides a cookie store.
//!
//! ## Overview
//!
//! - [`MemoryCookieStore`] keeps cookies in process memory (tests, ephemeral sessions)
//! - [`SqliteCookieStore`] persists cookies in a SQLite database via `sqlx`
//!
//! Both stores report full [`StoreCapabilities`](bridge_traits::StoreCapabilities)
//! unless overridden, purge expired cookies on enumeration and honour
//! `remove_data` modification horizons.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::SqliteCookieStore;
//! use bridge_traits::CookieStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store: Arc<dyn CookieStore> =
//!         Arc::new(SqliteCookieStore::new("/tmp/cookies.db".into()).await.unwrap());
//!
//!     // Inject into the cookie manager configuration
//! }
//! ```

mod memory;
mod rules;
mod sqlite;

pub use memory::MemoryCookieStore;
pub use sqlite::SqliteCookieStore;
