//! Redirect dispatch.
//!
//! This module owns the upstream rotation and the per-connection redirect
//! handshake: the pool hands out targets in strict round-robin order, and
//! the handshake tells a freshly accepted client where to reconnect.

pub mod handshake;
pub mod pool;

pub use pool::{RedirectPool, UpstreamTarget};
