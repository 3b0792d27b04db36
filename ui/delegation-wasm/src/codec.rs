//! Page-loaded serialization library.
//!
//! The library is exposed as a global (default `CSL`) with
//! `Address.from_bytes(Uint8Array).to_bech32()`, and announces itself with
//! a window event (default `csl-loaded`).

use crate::cardano::describe_js_error;
use crate::dom;
use js_sys::{Function, Reflect, Uint8Array};
use sb_api_types::Bech32Address;
use sb_codec::{AddressCodec, DecodeError};
use sb_wallet_core::DelegationApp;
use std::rc::Rc;
use tracing::debug;
use wasm_bindgen::prelude::*;
use web_sys::AddEventListenerOptions;

fn address_class(global: &str) -> Option<JsValue> {
    let window = web_sys::window()?;
    let library = Reflect::get(&window, &JsValue::from_str(global)).ok()?;
    if !library.is_object() {
        return None;
    }
    Reflect::get(&library, &JsValue::from_str("Address"))
        .ok()
        .filter(|class| !class.is_undefined() && !class.is_null())
}

fn method(target: &JsValue, name: &str) -> Result<Function, DecodeError> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|f| f.dyn_into().ok())
        .ok_or_else(|| DecodeError::Rejected(format!("{name} is not available")))
}

/// True once `global.Address` exists.
pub fn is_loaded(global: &str) -> bool {
    address_class(global).is_some()
}

/// `AddressCodec` backed by the page's serialization library.
pub struct CslCodec {
    global: String,
}

impl CslCodec {
    pub fn new(global: &str) -> Self {
        Self {
            global: global.to_owned(),
        }
    }
}

impl AddressCodec for CslCodec {
    fn to_bech32(&self, bytes: &[u8]) -> Result<Bech32Address, DecodeError> {
        let class = address_class(&self.global)
            .ok_or_else(|| DecodeError::Rejected(format!("{} is not loaded", self.global)))?;

        let address = method(&class, "from_bytes")?
            .call1(&class, &Uint8Array::from(bytes))
            .map_err(|e| DecodeError::Rejected(describe_js_error(&e)))?;
        let text = method(&address, "to_bech32")?
            .call0(&address)
            .map_err(|e| DecodeError::Rejected(describe_js_error(&e)))?;

        text.as_string()
            .map(Bech32Address)
            .ok_or_else(|| DecodeError::Rejected("to_bech32 returned a non-string".to_owned()))
    }
}

/// Open the app's readiness gate when the library shows up.
///
/// Listens for the load event once, and also checks for the global on the
/// poll interval for bundles that never fire it. Both stop when the gate
/// settles.
pub fn watch_for_codec(app: &Rc<DelegationApp>) -> Result<(), JsValue> {
    let config = app.config();
    if is_loaded(&config.codec_global) {
        debug!(global = %config.codec_global, "codec global already present");
        app.gate().signal_loaded();
        return Ok(());
    }

    let target = app.clone();
    let cb = Closure::wrap(Box::new(move |_: web_sys::Event| {
        target.gate().signal_loaded();
    }) as Box<dyn FnMut(_)>);
    let options = AddEventListenerOptions::new();
    options.set_once(true);
    dom::window()?.add_event_listener_with_callback_and_add_event_listener_options(
        &config.codec_event,
        cb.as_ref().unchecked_ref(),
        &options,
    )?;
    cb.forget();

    let app = app.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let global = app.config().codec_global.clone();
        let present = move || is_loaded(&global);
        app.gate()
            .poll_marker(&present, app.config().poll_interval(), app.timer())
            .await;
    });
    Ok(())
}
