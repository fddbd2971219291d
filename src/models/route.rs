//! Path-based routing with a single screen.

/// Application routes.
#[derive(Clone, Debug, PartialEq)]
pub enum AppRoute {
    /// The wallet screen: `/` or empty path
    Home,
    /// Anything else
    NotFound {
        /// Requested path, without the leading slash
        path: String,
    },
}

impl AppRoute {
    /// Parse a URL path into a route.
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_start_matches('/');
        let trimmed = trimmed.strip_suffix("index.html").unwrap_or(trimmed);

        if trimmed.is_empty() {
            return Self::Home;
        }

        Self::NotFound {
            path: trimmed.to_string(),
        }
    }

    /// Get current route from browser URL
    pub fn current() -> Self {
        let path = web_sys::window()
            .and_then(|w| w.location().pathname().ok())
            .unwrap_or_default();
        Self::from_path(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_home() {
        assert_eq!(AppRoute::from_path(""), AppRoute::Home);
        assert_eq!(AppRoute::from_path("/"), AppRoute::Home);
        assert_eq!(AppRoute::from_path("/index.html"), AppRoute::Home);
    }

    #[test]
    fn test_other_paths_are_not_found() {
        assert_eq!(
            AppRoute::from_path("/wallet/settings"),
            AppRoute::NotFound {
                path: "wallet/settings".to_string()
            }
        );
    }
}
