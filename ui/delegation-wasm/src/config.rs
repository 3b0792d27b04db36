use crate::dom;
use sb_wallet_core::BridgeConfig;
use wasm_bindgen::prelude::*;

/// Defaults, overridden by the page's `#bridgeConfig` JSON if present.
pub fn load() -> Result<BridgeConfig, JsValue> {
    match dom::config_script() {
        Some(raw) => BridgeConfig::from_json(&raw)
            .map_err(|err| JsValue::from_str(&format!("invalid #bridgeConfig: {err}"))),
        None => Ok(BridgeConfig::default()),
    }
}
