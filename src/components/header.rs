//! App bar with the connect and disconnect buttons.

use ethdash_core::ConnectionState;
use leptos::prelude::*;
use leptos_icons::Icon;

use crate::components::home::WalletController;
use crate::components::icons as ic;
use crate::config::APP_NAME;

stylance::import_crate_style!(css, "src/components/header.module.css");

/// Header bar.
///
/// The connect button doubles as the status line: it reads "Connect wallet",
/// the live countdown while connecting, or the short connected address.
/// Pressing it while connecting or connected does nothing.
#[component]
pub fn Header(controller: WalletController) -> impl IntoView {
    let state = controller.state();
    let label = Signal::derive(move || state.with(ConnectionState::button_label));
    let connecting = Signal::derive(move || state.with(ConnectionState::is_connecting));
    let connected = Signal::derive(move || state.with(ConnectionState::is_connected));

    view! {
        <header class=css::bar>
            <a href="/" class=css::brand>
                <span class=css::brandIcon><Icon icon=ic::WALLET /></span>
                <span class=css::brandText>{APP_NAME}</span>
            </a>

            <div class=css::actions>
                <button
                    class=css::connect
                    class:connecting=move || connecting.get()
                    on:click=move |_| controller.connect()
                    title=label
                >
                    <Icon icon=ic::USER />
                    <span class=css::label>{label}</span>
                </button>

                <Show when=move || connected.get()>
                    <button
                        class=css::disconnect
                        on:click=move |_| controller.disconnect()
                        title="Disconnect"
                    >
                        <Icon icon=ic::CLOSE />
                    </button>
                </Show>
            </div>
        </header>
    }
}
