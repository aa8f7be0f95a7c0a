//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the cookie bridge:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! Other crates depend on this one for the configuration builder that wires a
//! [`CookieStore`](bridge_traits::CookieStore) into the manager, and for the
//! logging conventions (structured fields, redaction of cookie values and
//! URL query strings) used throughout the workspace.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
