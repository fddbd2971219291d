//! Application router component.
//!
//! The app has a single screen, so the route is read once from
//! `location.pathname` on mount. Anything other than the root renders a
//! not-found notice.

use leptos::prelude::*;

use crate::components::footer::Footer;
use crate::components::home::Home;
use crate::models::AppRoute;

stylance::import_crate_style!(css, "src/components/router.module.css");

/// Main application router.
#[component]
pub fn AppRouter() -> impl IntoView {
    match AppRoute::current() {
        AppRoute::Home => view! { <Home /> }.into_any(),
        AppRoute::NotFound { path } => view! { <NotFound path=path /> }.into_any(),
    }
}

#[component]
fn NotFound(path: String) -> impl IntoView {
    view! {
        <main class=css::notFound>
            <h1 class=css::title>"404"</h1>
            <p class=css::message>{format!("Nothing lives at /{path}")}</p>
            <a class=css::back href="/">"Back to the wallet"</a>
        </main>
        <Footer />
    }
}
