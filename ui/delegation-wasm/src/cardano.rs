//! Wallets injected under `window.cardano`.
//!
//! Each extension adds `window.cardano[key] = { name, enable() }`. `enable`
//! resolves to an API object whose `getUsedAddresses()` resolves to hex
//! strings.

use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect};
use sb_api_types::AddressHex;
use sb_wallet_bridge::{NamespaceEntry, WalletCapability, WalletError, WalletNamespace, WalletSession};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

const NAMESPACE: &str = "cardano";

/// Best human-readable message for a thrown or rejected JS value.
///
/// Wallet errors usually carry `info` or `message`; codec errors are
/// often plain strings.
pub fn describe_js_error(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    for field in ["info", "message"] {
        if let Some(text) = Reflect::get(err, &JsValue::from_str(field))
            .ok()
            .and_then(|v| v.as_string())
        {
            return text;
        }
    }
    format!("{err:?}")
}

fn property(target: &JsValue, name: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

/// Call `target[method]()` and await the result if it is a promise.
async fn call_method(target: &JsValue, method: &str) -> Result<JsValue, String> {
    let function: Function = property(target, method)
        .and_then(|f| f.dyn_into().ok())
        .ok_or_else(|| format!("{method} is not a function"))?;

    let result = function.call0(target).map_err(|e| describe_js_error(&e))?;
    if result.has_type::<Promise>() {
        let promise: Promise = result.unchecked_into();
        JsFuture::from(promise).await.map_err(|e| describe_js_error(&e))
    } else {
        Ok(result)
    }
}

/// `window.cardano`, read fresh on every inspection.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowNamespace;

impl WalletNamespace for WindowNamespace {
    fn entries(&self) -> Option<Vec<NamespaceEntry>> {
        let window = web_sys::window()?;
        let namespace = property(&window, NAMESPACE).filter(JsValue::is_object)?;
        let keys = Object::keys(namespace.unchecked_ref::<Object>());

        let entries = keys
            .iter()
            .filter_map(|key| key.as_string())
            .map(|key| {
                let handle = property(&namespace, &key).unwrap_or(JsValue::UNDEFINED);
                let name = property(&handle, "name").and_then(|v| v.as_string());
                let capability = property(&handle, "enable")
                    .filter(JsValue::is_function)
                    .map(|_| {
                        Rc::new(InjectedCapability {
                            handle: handle.clone(),
                        }) as Rc<dyn WalletCapability>
                    });
                NamespaceEntry {
                    key,
                    name,
                    capability,
                }
            })
            .collect();
        Some(entries)
    }
}

pub struct InjectedCapability {
    handle: JsValue,
}

#[async_trait(?Send)]
impl WalletCapability for InjectedCapability {
    async fn enable(&self) -> Result<Box<dyn WalletSession>, WalletError> {
        let api = call_method(&self.handle, "enable")
            .await
            .map_err(WalletError::Enable)?;
        Ok(Box::new(InjectedSession { api }))
    }
}

pub struct InjectedSession {
    api: JsValue,
}

#[async_trait(?Send)]
impl WalletSession for InjectedSession {
    async fn get_used_addresses(&self) -> Result<Vec<AddressHex>, WalletError> {
        let value = call_method(&self.api, "getUsedAddresses")
            .await
            .map_err(WalletError::Addresses)?;
        if !Array::is_array(&value) {
            return Err(WalletError::Addresses("expected an array of addresses".to_owned()));
        }

        Array::from(&value)
            .iter()
            .map(|item| {
                item.as_string()
                    .map(AddressHex)
                    .ok_or_else(|| WalletError::Addresses("address is not a string".to_owned()))
            })
            .collect()
    }

    async fn get_network_id(&self) -> Result<u8, WalletError> {
        let value = call_method(&self.api, "getNetworkId")
            .await
            .map_err(WalletError::Network)?;
        value
            .as_f64()
            .filter(|id| id.fract() == 0.0 && (0.0..16.0).contains(id))
            .map(|id| id as u8)
            .ok_or_else(|| WalletError::Network(format!("unexpected network id {value:?}")))
    }
}
