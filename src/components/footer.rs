//! Footer with the two static link columns.

use leptos::prelude::*;
use leptos_icons::Icon;

use crate::components::icons as ic;
use crate::config::{FOOTER_LEFT, FOOTER_RIGHT};

stylance::import_crate_style!(css, "src/components/footer.module.css");

#[component]
pub fn Footer() -> impl IntoView {
    view! {
        <footer class=css::footer>
            <LinkColumn links=FOOTER_LEFT />
            <LinkColumn links=FOOTER_RIGHT />
        </footer>
    }
}

#[component]
fn LinkColumn(links: &'static [(&'static str, &'static str)]) -> impl IntoView {
    view! {
        <ul class=css::column>
            {links
                .iter()
                .map(|(label, href)| {
                    view! {
                        <li>
                            <a class=css::link href=*href target="_blank" rel="noopener noreferrer">
                                {*label}
                                <span class=css::external><Icon icon=ic::EXTERNAL_LINK /></span>
                            </a>
                        </li>
                    }
                })
                .collect_view()}
        </ul>
    }
}
