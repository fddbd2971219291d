//! Application configuration.
//!
//! Centralizes the constants used by the web front-end. Runtime settings
//! (screen mode, countdown, contract) come from `assets/config.toml`,
//! embedded at compile time using `include_str!`.

use ethdash_core::AppConfig;
use leptos::logging::warn;

// =============================================================================
// Application Metadata
// =============================================================================

/// Application name displayed in the header.
pub const APP_NAME: &str = "Web3 FE";

/// Id of the element in `index.html` the app is mounted into.
pub const MOUNT_ELEMENT_ID: &str = "app";

/// Embedded runtime configuration.
pub const CONFIG_TOML: &str = include_str!("../assets/config.toml");

/// Load the embedded configuration.
///
/// A malformed file is logged and replaced by the defaults so the screen
/// still renders.
pub fn load_config() -> AppConfig {
    AppConfig::from_toml(CONFIG_TOML).unwrap_or_else(|e| {
        warn!("{e}; falling back to default configuration");
        AppConfig::default()
    })
}

// =============================================================================
// Footer Links
// =============================================================================

/// Links in the left footer column.
pub const FOOTER_LEFT: &[(&str, &str)] = &[
    ("Contract", "https://etherscan.io"),
    ("Opensea", "https://opensea.io"),
];

/// Links in the right footer column.
pub const FOOTER_RIGHT: &[(&str, &str)] = &[
    ("Twitter", "https://twitter.com"),
    ("Discord", "https://discord.gg"),
];

// =============================================================================
// UI Configuration
// =============================================================================

/// Icon theme selection.
///
/// Available themes:
/// - `Bootstrap` - Familiar, slightly bolder (default)
/// - `Lucide` - Minimal, thin strokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(dead_code)]
pub enum IconTheme {
    #[default]
    Bootstrap,
    Lucide,
}

/// Current icon theme used throughout the application.
pub const ICON_THEME: IconTheme = IconTheme::Bootstrap;
