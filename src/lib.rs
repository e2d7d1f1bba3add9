//! anidex - rate-limit aware anime catalog browser.
//!
//! Core library: a fetch client that absorbs upstream rate limiting, a
//! navigation throttle that paces user-driven requests, and the state,
//! session and preference layers built on them.

pub mod client;
pub mod config;
pub mod models;
pub mod preferences;
pub mod session;
pub mod store;
pub mod throttle;
