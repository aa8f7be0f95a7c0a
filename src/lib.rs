//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (e.g., `core-service`, `core-runtime`). Host applications
//! can depend on `webview-cookies` and enable the documented features without
//! needing to wire each crate individually.

pub use core_service::{CoreError, CoreService};
#[cfg(feature = "desktop-shims")]
pub use core_service::bootstrap_desktop;
