//! Event binding.
//!
//! Buttons are re-created on every render, so clicks are handled on their
//! containers and routed by the button's `data-*` attribute.

use crate::dom::{self, Elements};
use crate::render::{ACTION_ATTR, ACTION_DELEGATE, ACTION_DISCONNECT, WALLET_ATTR};
use crate::state;
use tracing::{info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Attach a click handler to a container element.
macro_rules! on_click {
    ($el:expr, $cb:expr) => {{
        let cb = Closure::wrap(Box::new($cb) as Box<dyn FnMut(web_sys::MouseEvent)>);
        $el.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }};
}

/// Bind all UI event listeners. Call once after init.
pub fn bind_events(els: &Elements) -> Result<(), JsValue> {
    on_click!(els.wallet_buttons, move |event: web_sys::MouseEvent| {
        if let Some(key) = dom::data_from_event(&event, WALLET_ATTR) {
            on_select(key);
        }
    });

    on_click!(els.delegate_container, move |event: web_sys::MouseEvent| {
        match dom::data_from_event(&event, ACTION_ATTR).as_deref() {
            Some(ACTION_DELEGATE) => on_delegate(),
            Some(ACTION_DISCONNECT) => {
                if let Some(app) = state::app() {
                    app.disconnect();
                }
            }
            _ => {}
        }
    });
    Ok(())
}

fn on_select(key: String) {
    let Some(app) = state::app() else { return };
    wasm_bindgen_futures::spawn_local(async move {
        match app.select(&key).await {
            Ok(address) => info!(wallet = %key, %address, "wallet selected"),
            Err(err) => warn!(wallet = %key, error = %err, "wallet selection failed"),
        }
    });
}

fn on_delegate() {
    let Some(app) = state::app() else { return };
    wasm_bindgen_futures::spawn_local(async move {
        match app.delegate().await {
            Ok(result) => info!(tx_hash = %result.tx_hash, "delegation complete"),
            Err(err) => warn!(error = %err, "delegation not completed"),
        }
    });
}
