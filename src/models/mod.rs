//! Data models for the web front-end.
//!
//! Wallet, balance and contract types live in `ethdash_core`; this module
//! only holds what is specific to the browser shell:
//! - [`AppRoute`] - path-based navigation

mod route;

pub use route::AppRoute;
