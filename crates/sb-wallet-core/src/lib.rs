mod app;
mod config;
mod controller;
mod delegation;
mod discovery;
mod error;
mod gate;
mod projection;
mod state;
#[cfg(test)]
mod testing;
mod timer;

pub use app::DelegationApp;
pub use config::{BridgeConfig, CodecSource, DEFAULT_POOL_ID, KNOWN_WALLETS};
pub use controller::ConnectionController;
pub use delegation::{DelegationResult, submit_delegation};
pub use discovery::{DiscoveryOutcome, WalletDescriptor, discover, discover_wallets, display_name};
pub use error::{BridgeError, CODEC_NOT_LOADED, CodecLoadError, ConnectError, DelegateError};
pub use gate::{CodecReadiness, ReadinessGate};
pub use projection::{
    DelegateButton, MSG_CODEC_FAILED, MSG_DETECTING, MSG_LOADING, MSG_NO_SUPPORTED, MSG_NO_WALLETS,
    MSG_SELECT, MSG_SUBMITTING, Severity, StatusView, WalletButton, project,
};
pub use state::{
    AppState, ConnectionState, DelegationStatus, DiscoveryStatus, StateStore, Transition,
    WalletSummary,
};
#[cfg(not(target_arch = "wasm32"))]
pub use timer::TokioTimer;
pub use timer::{Timer, with_timeout};
