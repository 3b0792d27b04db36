//! Applies a `StatusView` to the page.

use crate::dom::{self, Elements};
use sb_wallet_core::{AppState, Severity, StatusView, project};
use tokio::sync::watch;
use tracing::warn;
use wasm_bindgen::prelude::*;

pub const WALLET_ATTR: &str = "wallet";
pub const ACTION_ATTR: &str = "action";
pub const ACTION_DELEGATE: &str = "delegate";
pub const ACTION_DISCONNECT: &str = "disconnect";

pub fn render(els: &Elements, view: &StatusView) -> Result<(), JsValue> {
    dom::set_text(&els.status, &view.status);
    dom::toggle_class(&els.status, "error", view.severity == Severity::Error);

    dom::clear(&els.wallet_buttons);
    for wallet in &view.wallet_buttons {
        let button = dom::create_button(WALLET_ATTR, &wallet.key, &wallet.label)?;
        dom::toggle_class(&button, "active", wallet.active);
        els.wallet_buttons.append_child(&button)?;
    }

    dom::clear(&els.delegate_container);
    if let Some(delegate) = &view.delegate_button {
        let button = dom::create_button(ACTION_ATTR, ACTION_DELEGATE, &delegate.label)?;
        button.set_disabled(!delegate.enabled);
        els.delegate_container.append_child(&button)?;

        let disconnect = dom::create_button(ACTION_ATTR, ACTION_DISCONNECT, "Disconnect")?;
        disconnect.set_disabled(!delegate.enabled);
        els.delegate_container.append_child(&disconnect)?;
    }
    Ok(())
}

/// Re-render on every state change until the store goes away.
pub fn spawn_renderer(els: Elements, mut rx: watch::Receiver<AppState>) {
    wasm_bindgen_futures::spawn_local(async move {
        loop {
            let view = project(&rx.borrow_and_update());
            if let Err(err) = render(&els, &view) {
                warn!(error = ?err, "render failed");
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    });
}
