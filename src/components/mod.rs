//! UI components built with Leptos.
//!
//! - [`router`] - Application routing (main entry point)
//! - [`header`] - App bar with the connect button
//! - [`home`] - The wallet screen and its controller
//! - [`footer`] - Static link columns
//! - [`icons`] - Centralized icon definitions (change theme here)

pub mod footer;
pub mod header;
pub mod home;
pub mod icons;
pub mod router;

pub use router::AppRouter;
