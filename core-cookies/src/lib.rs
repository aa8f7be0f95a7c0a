//! # Cookie Bridge
//!
//! Exposes a host web-view cookie store to the application framework over a
//! method channel.
//!
//! ## Overview
//!
//! [`CookieManager`] receives named calls (`setCookie`, `getCookies`,
//! `getAllCookies`, `deleteCookie`, `deleteCookies`, `deleteAllCookies`),
//! translates their arguments into the store's property schema, delegates to
//! a [`CookieStore`](bridge_traits::CookieStore) and replies exactly once per
//! call. It holds no cookie state of its own.
//!
//! ## Features
//!
//! - Host-based filtering with dot-prefixed parent-domain matching
//! - Same-site handling driven by the store's reported capabilities
//! - Domain inference from origin URLs for deletes
//! - Awaited or detached bulk deletion
//! - Failures reported in-band (`false`, `[]`, not-implemented sentinel)

pub mod arguments;
pub mod channel;
pub mod cookie;
pub mod error;
pub mod manager;

pub use arguments::{DeleteCookieRequest, DeleteCookiesRequest, SetCookieRequest};
pub use channel::CookieMethod;
pub use cookie::{domain_matches, Cookie};
pub use error::{CookieError, Result};
pub use manager::CookieManager;
