//! The wallet screen.
//!
//! Shows the connection status, inline errors, the connected account's
//! balance and network and, in contract mode, the contract panel.

mod contract_panel;
mod controller;

pub use contract_panel::ContractPanel;
pub use controller::WalletController;

use ethdash_core::account::checksummed;
use ethdash_core::{AccountView, ConnectionState, ReceiptPolling};
use leptos::prelude::*;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::footer::Footer;
use crate::components::header::Header;
use crate::components::icons as ic;

stylance::import_crate_style!(css, "src/components/home/home.module.css");

#[component]
pub fn Home() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided at root");
    let config = ctx.config.get_value();

    let controller = WalletController::new(&config);
    controller.mount();

    let state = controller.state();
    let account = controller.account();
    let connected = Signal::derive(move || state.with(ConnectionState::is_connected));
    let polling = ReceiptPolling::from(&config.contract);

    view! {
        <Header controller=controller />
        <main class=css::page>
            <section class=css::card>
                <span class=css::hero><Icon icon=ic::WALLET /></span>

                {move || {
                    state
                        .with(ConnectionState::error)
                        .map(|e| view! { <p class=css::error role="alert">{e.to_string()}</p> })
                }}

                {move || {
                    state
                        .with(|s| match s {
                            ConnectionState::Connecting { remaining_secs } => Some(*remaining_secs),
                            _ => None,
                        })
                        .map(|secs| {
                            view! {
                                <p class=css::pending>
                                    {format!("Waiting for the wallet... {secs}s left")}
                                </p>
                            }
                        })
                }}

                <Show
                    when=move || connected.get()
                    fallback=|| view! { <p class=css::hint>"Connect a wallet to see your balance."</p> }
                >
                    <AccountDetails account=account />
                </Show>
            </section>

            {config
                .contract_address()
                .map(|contract| {
                    view! {
                        <Show when=move || connected.get()>
                            <ContractPanel controller=controller contract=contract polling=polling />
                        </Show>
                    }
                })}
        </main>
        <Footer />
    }
}

#[component]
fn AccountDetails(account: Signal<AccountView>) -> impl IntoView {
    let address = Signal::derive(move || {
        account.with(|a| a.address.as_ref().map(checksummed).unwrap_or_default())
    });
    let balance = Signal::derive(move || {
        account.with(|a| a.balance.clone().unwrap_or_else(|| "-".to_string()))
    });
    let network = Signal::derive(move || {
        account.with(|a| {
            a.network
                .as_ref()
                .map(|n| n.name.to_string())
                .unwrap_or_else(|| "-".to_string())
        })
    });

    view! {
        <dl class=css::details>
            <div class=css::row>
                <dt class=css::label><Icon icon=ic::USER />"Account"</dt>
                <dd class=css::address>{address}</dd>
            </div>
            <div class=css::row>
                <dt class=css::label><Icon icon=ic::BALANCE />"ETH Balance"</dt>
                <dd class=css::value>{move || format!("{} ETH", balance.get())}</dd>
            </div>
            <div class=css::row>
                <dt class=css::label><Icon icon=ic::NETWORK />"Network"</dt>
                <dd class=css::value>{network}</dd>
            </div>
        </dl>
    }
}
