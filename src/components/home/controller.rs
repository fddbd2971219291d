//! Glue between the connection machine and the browser.
//!
//! [`WalletController`] owns the reactive copy of the machine and performs
//! the effects it emits: the one-second countdown, the account request, the
//! cached-address entry and the balance/network refresh.

use alloy_primitives::{Address, U256};
use ethdash_core::account::parse_addresses;
use ethdash_core::config::TICK_INTERVAL_MS;
use ethdash_core::provider::{accounts, request_accounts};
use ethdash_core::{
    AccountView, AddressCache, AppConfig, BalanceReader, ConnectionMachine, ConnectionState,
    Effect, Eip1193Provider, Event, LocalStore, ProviderEvent, ProviderEventKind,
    RefreshSequence, Subscription, WalletProvider,
};
use gloo_timers::callback::Interval;
use leptos::logging::{log, warn};
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

/// Handles for one mounted wallet screen.
///
/// All fields are arena handles or zero-sized, so the controller is `Copy`
/// and can be moved into every event handler and task it spawns.
#[derive(Clone, Copy)]
pub struct WalletController {
    machine: RwSignal<ConnectionMachine>,
    account: RwSignal<AccountView>,
    refreshes: StoredValue<RefreshSequence>,
    countdown: StoredValue<Option<Interval>, LocalStorage>,
    subscriptions: StoredValue<Vec<Subscription>, LocalStorage>,
    cache: AddressCache<LocalStore>,
    provider: Eip1193Provider,
    precision: usize,
}

impl WalletController {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            machine: RwSignal::new(ConnectionMachine::new(config.connect_timeout_secs)),
            account: RwSignal::new(AccountView::default()),
            refreshes: StoredValue::new(RefreshSequence::default()),
            countdown: StoredValue::new_local(None),
            subscriptions: StoredValue::new_local(Vec::new()),
            cache: AddressCache::new(LocalStore),
            provider: Eip1193Provider,
            precision: config.balance_precision,
        }
    }

    /// Attach to the provider and restore the cached session.
    ///
    /// Listeners and the countdown are released when the current reactive
    /// owner is cleaned up.
    pub fn mount(self) {
        self.ensure_subscribed();
        let cached = self.cache.load();
        self.dispatch(Event::Mounted {
            cached,
            provider_available: self.provider.is_available(),
        });
        on_cleanup(move || self.teardown());
    }

    pub fn state(&self) -> Signal<ConnectionState> {
        let machine = self.machine;
        Signal::derive(move || machine.with(|m| m.state().clone()))
    }

    pub fn account(&self) -> Signal<AccountView> {
        let account = self.account;
        Signal::derive(move || account.get())
    }

    pub fn provider(&self) -> Eip1193Provider {
        self.provider
    }

    pub fn address_untracked(&self) -> Option<Address> {
        self.machine
            .try_with_untracked(|m| m.state().address())
            .flatten()
    }

    pub fn balance_wei_untracked(&self) -> Option<U256> {
        self.account
            .try_with_untracked(|view| view.balance_wei)
            .flatten()
    }

    pub fn connect(self) {
        // A wallet injected after page load still gets listeners.
        self.ensure_subscribed();
        self.dispatch(Event::ConnectRequested {
            provider_available: self.provider.is_available(),
        });
    }

    pub fn disconnect(self) {
        self.dispatch(Event::Disconnect);
    }

    /// Re-read balance and network for the connected address.
    pub fn refresh(self) {
        if let Some(address) = self.address_untracked() {
            self.perform(Effect::Refresh(address));
        }
    }

    fn dispatch(self, event: Event) {
        let Some(effects) = self.machine.try_update(|machine| machine.apply(event)) else {
            return;
        };
        for effect in effects {
            self.perform(effect);
        }
    }

    fn perform(self, effect: Effect) {
        match effect {
            Effect::StartCountdown => self.start_countdown(),
            Effect::CancelCountdown => self.stop_countdown(),
            Effect::RequestAccounts { attempt } => {
                let provider = self.provider;
                spawn_local(async move {
                    let event = match request_accounts(&provider).await {
                        Ok(accounts) => Event::AccountsResolved { attempt, accounts },
                        Err(error) => {
                            warn!("[wallet] connect attempt {attempt} failed: {error}");
                            Event::RequestFailed { attempt, error }
                        }
                    };
                    self.dispatch(event);
                });
            }
            Effect::PersistAddress(address) => {
                log!("[wallet] connected {address}");
                if let Err(e) = self.cache.save(&address) {
                    warn!("[wallet] could not cache address: {e}");
                }
            }
            Effect::ClearCachedAddress => {
                if let Err(e) = self.cache.clear() {
                    warn!("[wallet] could not clear cached address: {e}");
                }
                let _ = self.account.try_update(AccountView::clear);
            }
            Effect::VerifyAccounts => {
                let provider = self.provider;
                spawn_local(async move {
                    match accounts(&provider).await {
                        Ok(exposed) => self.dispatch(Event::AccountsChanged(exposed)),
                        Err(e) => warn!("[wallet] could not verify cached session: {e}"),
                    }
                });
            }
            Effect::Refresh(address) => {
                let Some(ticket) = self.refreshes.try_update_value(RefreshSequence::begin) else {
                    return;
                };
                let provider = self.provider;
                let precision = self.precision;
                spawn_local(async move {
                    let outcome = BalanceReader::new(&provider, precision)
                        .refresh(address)
                        .await;
                    // A newer refresh or another account may have taken over
                    // while the reads were in flight.
                    let current = self
                        .refreshes
                        .try_with_value(|sequence| sequence.is_current(ticket))
                        .unwrap_or(false);
                    if !current || self.address_untracked() != Some(address) {
                        return;
                    }
                    let errors = self
                        .account
                        .try_update(|view| view.merge(address, outcome, precision))
                        .unwrap_or_default();
                    for e in errors {
                        warn!("[wallet] refresh for {address} failed: {e}");
                    }
                });
            }
        }
    }

    fn start_countdown(self) {
        self.stop_countdown();
        let interval = Interval::new(TICK_INTERVAL_MS, move || self.dispatch(Event::Tick));
        self.countdown
            .try_update_value(move |slot| *slot = Some(interval));
    }

    fn stop_countdown(self) {
        let Some(interval) = self.countdown.try_update_value(Option::take).flatten() else {
            return;
        };
        let callback = interval.cancel();
        // The last tick may be the caller; free its closure after it returns.
        spawn_local(async move { drop(callback) });
    }

    fn ensure_subscribed(self) {
        let subscribed = self
            .subscriptions
            .try_with_value(|subs| !subs.is_empty())
            .unwrap_or(true);
        if subscribed || !self.provider.is_available() {
            return;
        }

        let mut subs = Vec::with_capacity(2);
        for kind in [
            ProviderEventKind::AccountsChanged,
            ProviderEventKind::ChainChanged,
        ] {
            match self
                .provider
                .on(kind, Box::new(move |event| self.on_provider_event(event)))
            {
                Ok(sub) => subs.push(sub),
                Err(e) => warn!("[wallet] could not listen for {}: {e}", kind.as_str()),
            }
        }
        self.subscriptions
            .try_update_value(move |slot| slot.extend(subs));
    }

    fn on_provider_event(self, event: ProviderEvent) {
        let event = match event {
            ProviderEvent::AccountsChanged(raw) => match parse_addresses(&raw) {
                Ok(accounts) => Event::AccountsChanged(accounts),
                Err(e) => {
                    warn!("[wallet] ignoring accountsChanged: {e}");
                    return;
                }
            },
            ProviderEvent::ChainChanged(chain_id) => Event::ChainChanged(chain_id),
        };
        self.dispatch(event);
    }

    /// Stop the countdown and drop the provider listeners. Safe to call twice.
    fn teardown(self) {
        self.stop_countdown();
        self.subscriptions.try_update_value(Vec::clear);
    }
}
