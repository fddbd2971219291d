//! Wallet connection state machine.
//!
//! [`ConnectionMachine::apply`] is a pure reducer: it updates the state and
//! returns the [`Effect`]s the screen must perform (start or cancel the
//! countdown, call the provider, touch the cached address, refresh the
//! balance). Nothing here touches timers, storage or the network, so the
//! same transitions run in the browser and in host tests.
//!
//! # Transitions
//!
//! | From | Event | To |
//! |------|-------|----|
//! | `Idle` | mount with cached address | `Connected` (then verified) |
//! | `Idle` / `Expired` / `Error` | connect | `Connecting(D)` |
//! | `Connecting` | accounts resolved | `Connected` |
//! | `Connecting` | request failed | `Error` |
//! | `Connecting` | D-th tick | `Expired` |
//! | any | accounts changed `[x, ..]` | `Connected(x)` |
//! | `Connected` | accounts changed `[]` | `Idle` |
//! | `Connected` | chain changed | `Connected` (refresh) |

use alloy_primitives::Address;

use crate::account::short_address;
use crate::error::WalletError;

/// Identifier of one user-initiated connect request.
pub type AttemptId = u64;

/// Connection lifecycle of one screen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting {
        remaining_secs: u32,
    },
    Connected {
        address: Address,
    },
    /// The countdown ran out. Late answers to the expired attempt are
    /// ignored; a new connect or a wallet account event leaves this state.
    Expired,
    Error(WalletError),
}

impl ConnectionState {
    pub fn address(&self) -> Option<Address> {
        match self {
            Self::Connected { address } => Some(*address),
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self, Self::Connecting { .. })
    }

    /// The error to show inline, if any.
    pub fn error(&self) -> Option<WalletError> {
        match self {
            Self::Expired => Some(WalletError::ConnectionExpired),
            Self::Error(e) => Some(e.clone()),
            _ => None,
        }
    }

    /// Label for the connect button.
    pub fn button_label(&self) -> String {
        match self {
            Self::Connected { address } => format!("Connected to {}", short_address(address)),
            Self::Connecting { remaining_secs } => format!("Connecting... ({remaining_secs}s)"),
            _ => "Connect wallet".to_string(),
        }
    }
}

/// Inputs to the machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Screen mounted.
    Mounted {
        cached: Option<Address>,
        provider_available: bool,
    },
    /// User pressed connect.
    ConnectRequested { provider_available: bool },
    /// User pressed disconnect.
    Disconnect,
    /// `eth_requestAccounts` resolved for `attempt`.
    AccountsResolved {
        attempt: AttemptId,
        accounts: Vec<Address>,
    },
    /// `eth_requestAccounts` rejected for `attempt`.
    RequestFailed {
        attempt: AttemptId,
        error: WalletError,
    },
    /// One second of the countdown elapsed.
    Tick,
    /// Provider `accountsChanged`.
    AccountsChanged(Vec<Address>),
    /// Provider `chainChanged`.
    ChainChanged(u64),
}

/// Work the screen performs on behalf of the machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    StartCountdown,
    /// Always emitted before any other effect of the same transition.
    CancelCountdown,
    RequestAccounts {
        attempt: AttemptId,
    },
    PersistAddress(Address),
    ClearCachedAddress,
    /// Ask the wallet which accounts it still exposes (`eth_accounts`) and
    /// feed the answer back as [`Event::AccountsChanged`].
    VerifyAccounts,
    /// Re-fetch balance and network for the address.
    Refresh(Address),
}

/// The reducer and its state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionMachine {
    state: ConnectionState,
    countdown_secs: u32,
    attempt: AttemptId,
}

impl ConnectionMachine {
    /// A machine whose connect countdown lasts `countdown_secs` (at least 1).
    pub fn new(countdown_secs: u32) -> Self {
        Self {
            state: ConnectionState::Idle,
            countdown_secs: countdown_secs.max(1),
            attempt: 0,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn countdown_secs(&self) -> u32 {
        self.countdown_secs
    }

    /// The current (or most recent) connect attempt.
    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    /// Apply an event, returning the effects to perform in order.
    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Mounted {
                cached,
                provider_available,
            } => self.on_mounted(cached, provider_available),
            Event::ConnectRequested { provider_available } => self.on_connect(provider_available),
            Event::Disconnect => self.on_disconnect(),
            Event::AccountsResolved { attempt, accounts } => self.on_resolved(attempt, accounts),
            Event::RequestFailed { attempt, error } => self.on_failed(attempt, error),
            Event::Tick => self.on_tick(),
            Event::AccountsChanged(accounts) => self.on_accounts_changed(accounts),
            Event::ChainChanged(_) => self.on_chain_changed(),
        }
    }

    fn on_mounted(&mut self, cached: Option<Address>, provider_available: bool) -> Vec<Effect> {
        if self.state != ConnectionState::Idle {
            return Vec::new();
        }
        if !provider_available {
            self.state = ConnectionState::Error(WalletError::ProviderUnavailable);
            return Vec::new();
        }
        match cached {
            Some(address) => {
                self.state = ConnectionState::Connected { address };
                vec![Effect::Refresh(address), Effect::VerifyAccounts]
            }
            None => Vec::new(),
        }
    }

    fn on_connect(&mut self, provider_available: bool) -> Vec<Effect> {
        if self.state.is_connecting() || self.state.is_connected() {
            return Vec::new();
        }
        if !provider_available {
            self.state = ConnectionState::Error(WalletError::ProviderUnavailable);
            return Vec::new();
        }

        self.attempt += 1;
        self.state = ConnectionState::Connecting {
            remaining_secs: self.countdown_secs,
        };
        vec![
            Effect::StartCountdown,
            Effect::RequestAccounts {
                attempt: self.attempt,
            },
        ]
    }

    fn on_disconnect(&mut self) -> Vec<Effect> {
        let previous = std::mem::take(&mut self.state);
        match previous {
            ConnectionState::Connected { .. } => vec![Effect::ClearCachedAddress],
            ConnectionState::Connecting { .. } => vec![Effect::CancelCountdown],
            _ => Vec::new(),
        }
    }

    fn on_resolved(&mut self, attempt: AttemptId, accounts: Vec<Address>) -> Vec<Effect> {
        if attempt != self.attempt || !self.state.is_connecting() {
            return Vec::new();
        }
        match accounts.first() {
            Some(address) => self.connect_to(*address),
            None => {
                self.state = ConnectionState::Error(WalletError::NoAccount);
                vec![Effect::CancelCountdown]
            }
        }
    }

    fn on_failed(&mut self, attempt: AttemptId, error: WalletError) -> Vec<Effect> {
        if attempt != self.attempt || !self.state.is_connecting() {
            return Vec::new();
        }
        self.state = ConnectionState::Error(error);
        vec![Effect::CancelCountdown]
    }

    fn on_tick(&mut self) -> Vec<Effect> {
        let ConnectionState::Connecting { remaining_secs } = self.state else {
            return Vec::new();
        };
        let remaining_secs = remaining_secs.saturating_sub(1);
        if remaining_secs == 0 {
            self.state = ConnectionState::Expired;
            vec![Effect::CancelCountdown]
        } else {
            self.state = ConnectionState::Connecting { remaining_secs };
            Vec::new()
        }
    }

    fn on_accounts_changed(&mut self, accounts: Vec<Address>) -> Vec<Effect> {
        match accounts.first() {
            Some(address) => {
                if self.state.address() == Some(*address) {
                    return Vec::new();
                }
                self.connect_to(*address)
            }
            None if self.state.is_connected() => {
                self.state = ConnectionState::Idle;
                vec![Effect::ClearCachedAddress]
            }
            None => Vec::new(),
        }
    }

    fn on_chain_changed(&self) -> Vec<Effect> {
        match self.state.address() {
            Some(address) => vec![Effect::Refresh(address)],
            None => Vec::new(),
        }
    }

    fn connect_to(&mut self, address: Address) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(3);
        if self.state.is_connecting() {
            effects.push(Effect::CancelCountdown);
        }
        self.state = ConnectionState::Connected { address };
        effects.push(Effect::PersistAddress(address));
        effects.push(Effect::Refresh(address));
        effects
    }
}

impl Default for ConnectionMachine {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CONNECT_TIMEOUT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn connecting(countdown: u32) -> ConnectionMachine {
        let mut machine = ConnectionMachine::new(countdown);
        machine.apply(Event::ConnectRequested {
            provider_available: true,
        });
        machine
    }

    #[test]
    fn test_connect_starts_countdown_and_request() {
        let mut machine = ConnectionMachine::new(4);
        let effects = machine.apply(Event::ConnectRequested {
            provider_available: true,
        });

        assert_eq!(
            effects,
            vec![Effect::StartCountdown, Effect::RequestAccounts { attempt: 1 }]
        );
        assert_eq!(
            machine.state(),
            &ConnectionState::Connecting { remaining_secs: 4 }
        );
    }

    #[test]
    fn test_connect_without_provider_is_inert() {
        let mut machine = ConnectionMachine::new(4);
        let effects = machine.apply(Event::ConnectRequested {
            provider_available: false,
        });

        assert!(effects.is_empty());
        assert_eq!(
            machine.state(),
            &ConnectionState::Error(WalletError::ProviderUnavailable)
        );
        assert_eq!(machine.attempt(), 0);
    }

    #[test]
    fn test_mount_with_cached_address_skips_prompt() {
        let mut machine = ConnectionMachine::new(4);
        let effects = machine.apply(Event::Mounted {
            cached: Some(addr(1)),
            provider_available: true,
        });

        assert_eq!(
            effects,
            vec![Effect::Refresh(addr(1)), Effect::VerifyAccounts]
        );
        assert_eq!(machine.state().address(), Some(addr(1)));
    }

    #[test]
    fn test_revoked_cached_session_falls_back_to_idle() {
        let mut machine = ConnectionMachine::new(4);
        machine.apply(Event::Mounted {
            cached: Some(addr(1)),
            provider_available: true,
        });

        // The wallet answers the verification with no exposed accounts.
        let effects = machine.apply(Event::AccountsChanged(vec![]));
        assert_eq!(effects, vec![Effect::ClearCachedAddress]);
        assert_eq!(machine.state(), &ConnectionState::Idle);
    }

    #[test]
    fn test_verified_cached_session_is_unchanged() {
        let mut machine = ConnectionMachine::new(4);
        machine.apply(Event::Mounted {
            cached: Some(addr(1)),
            provider_available: true,
        });
        let before = machine.clone();

        assert!(machine.apply(Event::AccountsChanged(vec![addr(1)])).is_empty());
        assert_eq!(machine, before);
    }

    #[test]
    fn test_mount_without_provider() {
        let mut machine = ConnectionMachine::new(4);
        let effects = machine.apply(Event::Mounted {
            cached: Some(addr(1)),
            provider_available: false,
        });

        assert!(effects.is_empty());
        assert_eq!(machine.state().error(), Some(WalletError::ProviderUnavailable));
    }

    #[test]
    fn test_resolution_cancels_countdown_first() {
        let mut machine = connecting(4);
        let effects = machine.apply(Event::AccountsResolved {
            attempt: 1,
            accounts: vec![addr(1), addr(2)],
        });

        assert_eq!(
            effects,
            vec![
                Effect::CancelCountdown,
                Effect::PersistAddress(addr(1)),
                Effect::Refresh(addr(1)),
            ]
        );
        assert_eq!(machine.state(), &ConnectionState::Connected { address: addr(1) });
    }

    #[test]
    fn test_empty_resolution_is_an_error() {
        let mut machine = connecting(4);
        let effects = machine.apply(Event::AccountsResolved {
            attempt: 1,
            accounts: vec![],
        });

        assert_eq!(effects, vec![Effect::CancelCountdown]);
        assert_eq!(machine.state().error(), Some(WalletError::NoAccount));
    }

    #[test]
    fn test_rejection() {
        let mut machine = connecting(4);
        let rejected = WalletError::from_rpc(Some(4001), "User rejected the request.");
        let effects = machine.apply(Event::RequestFailed {
            attempt: 1,
            error: rejected.clone(),
        });

        assert_eq!(effects, vec![Effect::CancelCountdown]);
        assert_eq!(machine.state(), &ConnectionState::Error(rejected));
    }

    #[test]
    fn test_countdown_expires_on_last_tick() {
        let mut machine = connecting(4);
        for remaining in (1..4).rev() {
            assert!(machine.apply(Event::Tick).is_empty());
            assert_eq!(
                machine.state(),
                &ConnectionState::Connecting {
                    remaining_secs: remaining
                }
            );
        }

        assert_eq!(machine.apply(Event::Tick), vec![Effect::CancelCountdown]);
        assert_eq!(machine.state(), &ConnectionState::Expired);

        // Stray ticks after expiry change nothing
        assert!(machine.apply(Event::Tick).is_empty());
        assert_eq!(machine.state(), &ConnectionState::Expired);
    }

    #[test]
    fn test_expired_is_terminal_until_connect() {
        let mut machine = connecting(1);
        machine.apply(Event::Tick);

        let late = machine.apply(Event::AccountsResolved {
            attempt: 1,
            accounts: vec![addr(1)],
        });
        assert!(late.is_empty());
        assert_eq!(machine.state(), &ConnectionState::Expired);

        let effects = machine.apply(Event::ConnectRequested {
            provider_available: true,
        });
        assert_eq!(
            effects,
            vec![Effect::StartCountdown, Effect::RequestAccounts { attempt: 2 }]
        );
    }

    #[test]
    fn test_account_event_leaves_expired() {
        let mut machine = connecting(1);
        machine.apply(Event::Tick);

        let effects = machine.apply(Event::AccountsChanged(vec![addr(2)]));
        assert_eq!(
            effects,
            vec![Effect::PersistAddress(addr(2)), Effect::Refresh(addr(2))]
        );
        assert_eq!(machine.state().address(), Some(addr(2)));
    }

    #[test]
    fn test_stale_attempt_is_ignored() {
        let mut machine = connecting(1);
        machine.apply(Event::Tick);
        machine.apply(Event::ConnectRequested {
            provider_available: true,
        });

        let stale = machine.apply(Event::RequestFailed {
            attempt: 1,
            error: WalletError::from_rpc(None, "old"),
        });
        assert!(stale.is_empty());
        assert!(machine.state().is_connecting());
    }

    #[test]
    fn test_connect_while_connecting_or_connected_is_noop() {
        let mut machine = connecting(4);
        assert!(
            machine
                .apply(Event::ConnectRequested {
                    provider_available: true
                })
                .is_empty()
        );

        machine.apply(Event::AccountsChanged(vec![addr(1)]));
        assert!(
            machine
                .apply(Event::ConnectRequested {
                    provider_available: true
                })
                .is_empty()
        );
        assert_eq!(machine.attempt(), 1);
    }

    #[test]
    fn test_accounts_changed_switches_address() {
        let mut machine = ConnectionMachine::new(4);
        machine.apply(Event::AccountsChanged(vec![addr(1)]));

        let effects = machine.apply(Event::AccountsChanged(vec![addr(2)]));
        assert_eq!(
            effects,
            vec![Effect::PersistAddress(addr(2)), Effect::Refresh(addr(2))]
        );
        assert_eq!(machine.state().address(), Some(addr(2)));
    }

    #[test]
    fn test_same_address_twice_is_noop() {
        let mut machine = ConnectionMachine::new(4);
        machine.apply(Event::AccountsChanged(vec![addr(1)]));
        let snapshot = machine.clone();

        let effects = machine.apply(Event::AccountsChanged(vec![addr(1)]));
        assert!(effects.is_empty());
        assert_eq!(machine, snapshot);
    }

    #[test]
    fn test_event_and_resolution_race() {
        // accountsChanged lands before eth_requestAccounts resolves
        let mut machine = connecting(4);
        let first = machine.apply(Event::AccountsChanged(vec![addr(1)]));
        assert_eq!(first[0], Effect::CancelCountdown);

        let second = machine.apply(Event::AccountsResolved {
            attempt: 1,
            accounts: vec![addr(1)],
        });
        assert!(second.is_empty());
        assert_eq!(machine.state().address(), Some(addr(1)));
    }

    #[test]
    fn test_empty_accounts_disconnects() {
        let mut machine = ConnectionMachine::new(4);
        machine.apply(Event::Mounted {
            cached: Some(addr(1)),
            provider_available: true,
        });

        let effects = machine.apply(Event::AccountsChanged(vec![]));
        assert_eq!(effects, vec![Effect::ClearCachedAddress]);
        assert_eq!(machine.state(), &ConnectionState::Idle);
    }

    #[test]
    fn test_empty_accounts_while_connecting_keeps_waiting() {
        let mut machine = connecting(4);
        assert!(machine.apply(Event::AccountsChanged(vec![])).is_empty());
        assert!(machine.state().is_connecting());
    }

    #[test]
    fn test_chain_change_refreshes_connected_address() {
        let mut machine = ConnectionMachine::new(4);
        assert!(machine.apply(Event::ChainChanged(5)).is_empty());

        machine.apply(Event::AccountsChanged(vec![addr(1)]));
        let effects = machine.apply(Event::ChainChanged(1));
        assert_eq!(effects, vec![Effect::Refresh(addr(1))]);
        assert_eq!(machine.state().address(), Some(addr(1)));
    }

    #[test]
    fn test_disconnect() {
        let mut machine = ConnectionMachine::new(4);
        machine.apply(Event::AccountsChanged(vec![addr(1)]));
        assert_eq!(
            machine.apply(Event::Disconnect),
            vec![Effect::ClearCachedAddress]
        );
        assert_eq!(machine.state(), &ConnectionState::Idle);

        let mut machine = connecting(4);
        assert_eq!(machine.apply(Event::Disconnect), vec![Effect::CancelCountdown]);
        let late = machine.apply(Event::AccountsResolved {
            attempt: 1,
            accounts: vec![addr(1)],
        });
        assert!(late.is_empty());
        assert_eq!(machine.state(), &ConnectionState::Idle);
    }

    #[test]
    fn test_zero_countdown_is_clamped() {
        let machine = ConnectionMachine::new(0);
        assert_eq!(machine.countdown_secs(), 1);
    }

    #[test]
    fn test_button_label() {
        assert_eq!(ConnectionState::Idle.button_label(), "Connect wallet");
        assert_eq!(
            ConnectionState::Connecting { remaining_secs: 3 }.button_label(),
            "Connecting... (3s)"
        );
        assert!(
            ConnectionState::Connected { address: addr(0xab) }
                .button_label()
                .starts_with("Connected to 0x")
        );
    }
}
