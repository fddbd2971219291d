//! Root application module.
//!
//! Contains the main App component and AppContext definition following
//! Leptos conventions.

use ethdash_core::AppConfig;
use leptos::prelude::*;

use crate::components::AppRouter;
use crate::config::load_config;

// ============================================================================
// AppContext
// ============================================================================

/// Application-wide context.
///
/// Holds only what is shared by every screen. Connection state is owned by
/// each screen's [`WalletController`](crate::components::home::WalletController).
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Runtime configuration loaded at startup.
    pub config: StoredValue<AppConfig>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: StoredValue::new(config),
        }
    }
}

/// Root application component with error boundary.
///
/// This component:
/// - Loads the configuration and provides the AppContext
/// - Wraps the app in an ErrorBoundary for graceful error handling
/// - Renders the router
#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext::new(load_config());
    provide_context(ctx);

    view! {
        <ErrorBoundary
            fallback=|errors| view! {
                <div style="
                    display: flex;
                    flex-direction: column;
                    align-items: center;
                    justify-content: center;
                    height: 100vh;
                    padding: 2rem;
                    background: #212529;
                    color: #e0e0e0;
                    font-family: sans-serif;
                ">
                    <h1 style="color: #fd7e14; margin-bottom: 1rem;">
                        "Something went wrong"
                    </h1>
                    <ul style="color: #fd7e14; font-size: 0.9rem;">
                        {move || errors.get()
                            .into_iter()
                            .map(|(_, e)| view! { <li>{e.to_string()}</li> })
                            .collect::<Vec<_>>()
                        }
                    </ul>
                    <button
                        on:click=move |_| {
                            if let Some(window) = web_sys::window() {
                                let _ = window.location().reload();
                            }
                        }
                        style="
                            background: #fd7e14;
                            color: white;
                            border: none;
                            padding: 0.75rem 2rem;
                            border-radius: 4px;
                            cursor: pointer;
                        "
                    >
                        "Reload Page"
                    </button>
                </div>
            }
        >
            <AppRouter />
        </ErrorBoundary>
    }
}
