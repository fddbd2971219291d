//! Browser wallet provider using web-sys.
//!
//! Provides MetaMask (EIP-1193) wallet connectivity through
//! direct JavaScript interop via Reflect API.

use js_sys::{Function, Object, Promise, Reflect};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen_futures::JsFuture;

use crate::error::WalletError;
use crate::network::parse_chain_id;
use crate::provider::{
    EventHandler, ProviderEvent, ProviderEventKind, Subscription, WalletProvider,
};

/// Provider backed by `window.ethereum`.
///
/// Holds no state: the injected object is looked up on every call, so a
/// wallet that appears after page load is picked up on the next attempt.
#[derive(Clone, Copy, Debug, Default)]
pub struct Eip1193Provider;

/// Get the window.ethereum object injected by the wallet.
fn get_ethereum() -> Result<Object, WalletError> {
    let window = web_sys::window().ok_or(WalletError::NoWindow)?;
    Reflect::get(&window, &"ethereum".into())
        .ok()
        .and_then(|v| v.dyn_into::<Object>().ok())
        .ok_or(WalletError::ProviderUnavailable)
}

/// Look up a method on the provider object.
fn get_method(ethereum: &Object, name: &str) -> Result<Function, WalletError> {
    Reflect::get(ethereum, &name.into())
        .map_err(|_| WalletError::RequestCreationFailed)?
        .dyn_into::<Function>()
        .map_err(|_| WalletError::RequestCreationFailed)
}

/// Turn a rejected request into a structured error using the
/// `{ code, message }` fields EIP-1193 errors carry.
fn decode_rejection(error: JsValue) -> WalletError {
    let code = Reflect::get(&error, &"code".into())
        .ok()
        .and_then(|c| c.as_f64())
        .map(|c| c as i64);
    let message = Reflect::get(&error, &"message".into())
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| error.as_string())
        .unwrap_or_else(|| "Unknown wallet error".to_string());
    WalletError::from_rpc(code, message)
}

fn decode_event(kind: ProviderEventKind, payload: JsValue) -> Option<ProviderEvent> {
    match kind {
        ProviderEventKind::AccountsChanged => serde_wasm_bindgen::from_value(payload)
            .ok()
            .map(ProviderEvent::AccountsChanged),
        ProviderEventKind::ChainChanged => payload
            .as_string()
            .and_then(|raw| parse_chain_id(&raw))
            .or_else(|| payload.as_f64().map(|id| id as u64))
            .map(ProviderEvent::ChainChanged),
    }
}

impl WalletProvider for Eip1193Provider {
    fn is_available(&self) -> bool {
        get_ethereum().is_ok()
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let ethereum = get_ethereum()?;

        // Create { method, params } object
        let args = Object::new();
        Reflect::set(&args, &"method".into(), &method.into())
            .map_err(|_| WalletError::RequestCreationFailed)?;
        if !params.is_null() {
            let js_params = params
                .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
                .map_err(|_| WalletError::RequestCreationFailed)?;
            Reflect::set(&args, &"params".into(), &js_params)
                .map_err(|_| WalletError::RequestCreationFailed)?;
        }

        let request = get_method(&ethereum, "request")?;
        let promise: Promise = request
            .call1(&ethereum, &args)
            .map_err(decode_rejection)?
            .into();

        let result = JsFuture::from(promise).await.map_err(decode_rejection)?;
        if result.is_undefined() || result.is_null() {
            return Ok(Value::Null);
        }
        serde_wasm_bindgen::from_value(result)
            .map_err(|e| WalletError::InvalidResponse(e.to_string()))
    }

    /// Register `handler` with `ethereum.on(...)`.
    ///
    /// The returned [`Subscription`] calls `ethereum.removeListener(...)` with
    /// the same closure and only then frees it.
    fn on(
        &self,
        kind: ProviderEventKind,
        handler: EventHandler,
    ) -> Result<Subscription, WalletError> {
        let ethereum = get_ethereum()?;

        let closure = Closure::wrap(Box::new(move |payload: JsValue| {
            if let Some(event) = decode_event(kind, payload) {
                handler(event);
            }
        }) as Box<dyn Fn(JsValue)>);

        get_method(&ethereum, "on")?
            .call2(&ethereum, &kind.as_str().into(), closure.as_ref())
            .map_err(|_| WalletError::RequestCreationFailed)?;

        Ok(Subscription::new(move || {
            if let Ok(remove) = get_method(&ethereum, "removeListener") {
                let _ = remove.call2(&ethereum, &kind.as_str().into(), closure.as_ref());
            }
            drop(closure);
        }))
    }
}
