//! In-memory provider and store for tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use serde_json::Value;

use crate::error::{StorageError, WalletError};
use crate::provider::{
    EventHandler, ProviderEvent, ProviderEventKind, Subscription, WalletProvider,
};
use crate::session::KeyValueStore;

type Reply = Result<Value, WalletError>;
type Listeners = Rc<RefCell<Vec<(u64, ProviderEventKind, Rc<dyn Fn(ProviderEvent)>)>>>;

/// Scripted [`WalletProvider`].
///
/// One-shot replies queued with [`respond_once`](Self::respond_once) are
/// consumed first; afterwards the standing reply set with
/// [`respond`](Self::respond) or [`fail`](Self::fail) is returned.
pub struct MockProvider {
    available: Cell<bool>,
    queued: RefCell<HashMap<String, VecDeque<Reply>>>,
    standing: RefCell<HashMap<String, Reply>>,
    calls: RefCell<Vec<(String, Value)>>,
    listeners: Listeners,
    next_listener: Cell<u64>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            available: Cell::new(true),
            queued: RefCell::new(HashMap::new()),
            standing: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_listener: Cell::new(0),
        }
    }

    /// A page with no injected wallet.
    pub fn unavailable() -> Self {
        let provider = Self::new();
        provider.available.set(false);
        provider
    }

    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    pub fn respond(&self, method: &str, value: Value) {
        self.standing
            .borrow_mut()
            .insert(method.to_string(), Ok(value));
    }

    pub fn fail(&self, method: &str, error: WalletError) {
        self.standing
            .borrow_mut()
            .insert(method.to_string(), Err(error));
    }

    pub fn respond_once(&self, method: &str, reply: Reply) {
        self.queued
            .borrow_mut()
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|(m, _)| m == method).count()
    }

    pub fn last_call(&self, method: &str) -> Option<(String, Value)> {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find(|(m, _)| m == method)
            .cloned()
    }

    /// Deliver an event to every listener registered for its kind.
    pub fn emit(&self, event: ProviderEvent) {
        let kind = event.kind();
        let handlers: Vec<_> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(event.clone());
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletProvider for MockProvider {
    fn is_available(&self) -> bool {
        self.available.get()
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        if !self.available.get() {
            return Err(WalletError::ProviderUnavailable);
        }
        self.calls.borrow_mut().push((method.to_string(), params));

        if let Some(reply) = self
            .queued
            .borrow_mut()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
        {
            return reply;
        }
        self.standing
            .borrow()
            .get(method)
            .cloned()
            .unwrap_or_else(|| {
                Err(WalletError::from_rpc(
                    Some(-32601),
                    format!("method {method} not mocked"),
                ))
            })
    }

    fn on(
        &self,
        kind: ProviderEventKind,
        handler: EventHandler,
    ) -> Result<Subscription, WalletError> {
        if !self.available.get() {
            return Err(WalletError::ProviderUnavailable);
        }
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners
            .borrow_mut()
            .push((id, kind, Rc::from(handler)));

        let listeners = Rc::downgrade(&self.listeners);
        Ok(Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.borrow_mut().retain(|(entry, _, _)| *entry != id);
            }
        }))
    }
}

/// In-memory [`KeyValueStore`].
#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    read_only: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail, like a full or disabled localStorage.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only.get() {
            return Err(StorageError::WriteFailed);
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.read_only.get() {
            return Err(StorageError::RemoveFailed);
        }
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
