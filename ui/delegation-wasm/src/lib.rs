//! StakeBridge delegation page.
//!
//! Binds the page, waits for the serialization library, discovers injected
//! Cardano wallets and then drives connect and delegate from button clicks.

pub mod cardano;
pub mod codec;
pub mod config;
pub mod dom;
pub mod events;
pub mod logging;
pub mod render;
pub mod state;
pub mod timer;

use sb_backend_client::HttpBackend;
use sb_codec::{AddressCodec, CardanoAddressCodec};
use sb_wallet_core::{CodecSource, DelegationApp};
use std::rc::Rc;
use tracing::{error, info, warn};
use wasm_bindgen::prelude::*;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    // Improve panic messages in the browser console
    console_error_panic_hook::set_once();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let config = config::load()?;
    logging::init(&config.log_filter);
    let els = dom::Elements::bind()?;

    let codec: Rc<dyn AddressCodec> = match config.codec_source {
        CodecSource::Csl => Rc::new(codec::CslCodec::new(&config.codec_global)),
        CodecSource::Native => Rc::new(CardanoAddressCodec),
    };
    let backend = Rc::new(HttpBackend::new(config.backend_url.clone()));
    info!(backend = backend.base_url(), source = ?config.codec_source, "starting delegation page");

    let source = config.codec_source;
    let app = Rc::new(DelegationApp::new(
        config,
        codec,
        Rc::new(cardano::WindowNamespace),
        backend,
        Rc::new(timer::GlooTimer),
    ));
    state::install(app.clone());

    render::spawn_renderer(els.clone(), app.subscribe());
    events::bind_events(&els)?;

    match source {
        CodecSource::Csl => codec::watch_for_codec(&app)?,
        CodecSource::Native => {
            app.gate().signal_loaded();
        }
    }

    match app.start().await {
        Ok(()) => {}
        Err(err) if err.is_fatal() => error!(error = %err, "delegation page halted"),
        Err(err) => warn!(error = %err, "wallet discovery finished empty"),
    }
    Ok(())
}
