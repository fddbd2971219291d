//! Deposit, withdraw and transfer against the configured contract.

use alloy_primitives::{Address, U256};
use ethdash_core::contract::{prepare_deposit, prepare_transfer, prepare_withdraw};
use ethdash_core::units::format_ether;
use ethdash_core::{ContractFacade, ContractOp, ReceiptPolling, TxStatus, WalletError};
use leptos::logging::warn;
use leptos::prelude::*;
use leptos_icons::Icon;
use wasm_bindgen_futures::spawn_local;

use super::WalletController;
use crate::components::icons as ic;

stylance::import_crate_style!(css, "src/components/home/contract.module.css");

const SUPPLY_PRECISION: usize = 4;

/// A validated write, ready to send.
#[derive(Clone, Copy)]
enum Write {
    Deposit(U256),
    Withdraw(U256),
    Transfer(Address, U256),
}

impl Write {
    fn op(&self) -> ContractOp {
        match self {
            Self::Deposit(_) => ContractOp::Deposit,
            Self::Withdraw(_) => ContractOp::Withdraw,
            Self::Transfer(..) => ContractOp::Transfer,
        }
    }
}

#[component]
pub fn ContractPanel(
    controller: WalletController,
    contract: Address,
    polling: ReceiptPolling,
) -> impl IntoView {
    let provider = controller.provider();

    let status = RwSignal::new(TxStatus::default());
    let total_supply = RwSignal::new(None::<String>);
    let transfer_check = RwSignal::new(None::<String>);

    let deposit_amount = RwSignal::new(String::new());
    let withdraw_amount = RwSignal::new(String::new());
    let recipient = RwSignal::new(String::new());
    let transfer_amount = RwSignal::new(String::new());

    let busy = Signal::derive(move || status.with(TxStatus::is_pending));
    let report = move |next: TxStatus| {
        let _ = status.try_set(next);
    };

    let load_supply = move || {
        spawn_local(async move {
            let facade = ContractFacade::new(&provider, contract, polling);
            let text = match facade.total_supply().await {
                Ok(supply) => format_ether(supply, SUPPLY_PRECISION),
                Err(e) => {
                    warn!("[contract] totalSupply failed: {e}");
                    e.to_string()
                }
            };
            let _ = total_supply.try_set(Some(text));
        });
    };
    load_supply();

    let validate = move |op: ContractOp| -> Result<Write, WalletError> {
        match op {
            ContractOp::Deposit => prepare_deposit(
                &deposit_amount.get_untracked(),
                controller.balance_wei_untracked(),
            )
            .map(Write::Deposit),
            ContractOp::Withdraw => {
                prepare_withdraw(&withdraw_amount.get_untracked()).map(Write::Withdraw)
            }
            ContractOp::Transfer => {
                prepare_transfer(&recipient.get_untracked(), &transfer_amount.get_untracked())
                    .map(|(to, amount)| Write::Transfer(to, amount))
            }
        }
    };

    let submit = move |op: ContractOp| {
        let Some(from) = controller.address_untracked() else {
            return;
        };
        let write = match validate(op) {
            Ok(write) => write,
            Err(e) => {
                report(TxStatus::Failed {
                    op,
                    message: e.to_string(),
                });
                return;
            }
        };

        spawn_local(async move {
            let facade = ContractFacade::new(&provider, contract, polling);
            let result = match write {
                Write::Deposit(amount) => facade.deposit(from, amount, report).await,
                Write::Withdraw(amount) => facade.withdraw(from, amount, report).await,
                Write::Transfer(to, amount) => facade.transfer(from, to, amount, report).await,
            };
            match result {
                Ok(_) => {
                    let input = match write.op() {
                        ContractOp::Deposit => deposit_amount,
                        ContractOp::Withdraw => withdraw_amount,
                        ContractOp::Transfer => transfer_amount,
                    };
                    let _ = input.try_set(String::new());
                    controller.refresh();
                    load_supply();
                }
                Err(e) => warn!("[contract] {} failed: {e}", write.op()),
            }
        });
    };

    let check_transfer = move |_| {
        let Some(from) = controller.address_untracked() else {
            return;
        };
        let (to, amount) = match prepare_transfer(
            &recipient.get_untracked(),
            &transfer_amount.get_untracked(),
        ) {
            Ok(parsed) => parsed,
            Err(e) => {
                let _ = transfer_check.try_set(Some(e.to_string()));
                return;
            }
        };
        spawn_local(async move {
            let facade = ContractFacade::new(&provider, contract, polling);
            let text = match facade.query_transfer(from, to, amount).await {
                Ok(true) => "Transfer would succeed".to_string(),
                Ok(false) => "Transfer would be refused by the contract".to_string(),
                Err(e) => e.to_string(),
            };
            let _ = transfer_check.try_set(Some(text));
        });
    };

    view! {
        <section class=css::panel>
            <header class=css::heading>
                <h2 class=css::title>"Contract"</h2>
                <code class=css::contract>{contract.to_checksum(None)}</code>
            </header>

            <p class=css::supply>
                "Total supply: "
                {move || total_supply.get().unwrap_or_else(|| "...".to_string())}
            </p>

            <div class=css::form>
                <AmountInput value=deposit_amount placeholder="Amount (ETH)" />
                <button
                    class=css::action
                    disabled=move || busy.get()
                    on:click=move |_| submit(ContractOp::Deposit)
                >
                    <Icon icon=ic::DEPOSIT />
                    "Deposit"
                </button>
            </div>

            <div class=css::form>
                <AmountInput value=withdraw_amount placeholder="Amount (ETH)" />
                <button
                    class=css::action
                    disabled=move || busy.get()
                    on:click=move |_| submit(ContractOp::Withdraw)
                >
                    <Icon icon=ic::WITHDRAW />
                    "Withdraw"
                </button>
            </div>

            <div class=css::form>
                <input
                    class=css::input
                    type="text"
                    placeholder="Recipient (0x...)"
                    spellcheck="false"
                    prop:value=move || recipient.get()
                    on:input=move |ev| recipient.set(event_target_value(&ev))
                />
                <AmountInput value=transfer_amount placeholder="Amount" />
                <button class=css::secondary disabled=move || busy.get() on:click=check_transfer>
                    "Check"
                </button>
                <button
                    class=css::action
                    disabled=move || busy.get()
                    on:click=move |_| submit(ContractOp::Transfer)
                >
                    <Icon icon=ic::TRANSFER />
                    "Transfer"
                </button>
            </div>

            {move || transfer_check.get().map(|text| view! { <p class=css::note>{text}</p> })}

            {move || {
                status
                    .with(|s| s.text().map(|text| (text, matches!(s, TxStatus::Failed { .. }))))
                    .map(|(text, failed)| {
                        view! {
                            <p class=css::status class:failed=failed role="status">
                                {text}
                            </p>
                        }
                    })
            }}
        </section>
    }
}

#[component]
fn AmountInput(value: RwSignal<String>, placeholder: &'static str) -> impl IntoView {
    view! {
        <input
            class=css::input
            type="text"
            inputmode="decimal"
            placeholder=placeholder
            prop:value=move || value.get()
            on:input=move |ev| value.set(event_target_value(&ev))
        />
    }
}
