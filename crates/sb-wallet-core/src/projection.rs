//! Pure mapping from `AppState` to what the page shows.

use crate::gate::CodecReadiness;
use crate::state::{AppState, ConnectionState, DelegationStatus, DiscoveryStatus};
use serde::Serialize;

pub const MSG_LOADING: &str = "loading serialization library...";
pub const MSG_CODEC_FAILED: &str = crate::error::CODEC_NOT_LOADED;
pub const MSG_DETECTING: &str = "detecting wallets...";
pub const MSG_NO_WALLETS: &str = "no wallets detected";
pub const MSG_NO_SUPPORTED: &str = "no supported wallets detected";
pub const MSG_SELECT: &str = "select a wallet";
pub const MSG_SUBMITTING: &str = "submitting delegation...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletButton {
    pub key: String,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelegateButton {
    pub label: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub status: String,
    pub severity: Severity,
    pub wallet_buttons: Vec<WalletButton>,
    pub delegate_button: Option<DelegateButton>,
}

impl StatusView {
    fn message(status: &str, severity: Severity) -> Self {
        Self {
            status: status.to_owned(),
            severity,
            wallet_buttons: Vec::new(),
            delegate_button: None,
        }
    }
}

pub fn project(state: &AppState) -> StatusView {
    match state.codec {
        CodecReadiness::NotLoaded | CodecReadiness::Loading => {
            return StatusView::message(MSG_LOADING, Severity::Info);
        }
        CodecReadiness::Failed => return StatusView::message(MSG_CODEC_FAILED, Severity::Error),
        CodecReadiness::Ready => {}
    }

    let display = |key: &str| {
        state
            .discovery
            .wallets()
            .iter()
            .find(|w| w.key == key)
            .map(|w| w.display_name.clone())
            .unwrap_or_else(|| key.to_owned())
    };

    let (status, severity) = match &state.connection {
        ConnectionState::Idle => match &state.discovery {
            DiscoveryStatus::Pending => (MSG_DETECTING.to_owned(), Severity::Info),
            DiscoveryStatus::NoWallets => (MSG_NO_WALLETS.to_owned(), Severity::Error),
            DiscoveryStatus::NoSupportedWallets => (MSG_NO_SUPPORTED.to_owned(), Severity::Error),
            DiscoveryStatus::Found(_) => (MSG_SELECT.to_owned(), Severity::Info),
        },
        ConnectionState::Detecting => (MSG_DETECTING.to_owned(), Severity::Info),
        ConnectionState::AwaitingSelection => (MSG_SELECT.to_owned(), Severity::Info),
        ConnectionState::Connecting { wallet } => {
            (format!("connecting to {}...", display(wallet)), Severity::Info)
        }
        ConnectionState::Connected { wallet, address } => match &state.delegation {
            DelegationStatus::Submitting => (MSG_SUBMITTING.to_owned(), Severity::Info),
            DelegationStatus::Submitted { tx_hash } => {
                (format!("delegation submitted: {tx_hash}"), Severity::Info)
            }
            DelegationStatus::Failed { reason } => (reason.clone(), Severity::Error),
            DelegationStatus::Idle | DelegationStatus::Unavailable => {
                (format!("connected to {}: {address}", display(wallet)), Severity::Info)
            }
        },
        ConnectionState::Failed { reason } => (reason.clone(), Severity::Error),
    };

    let active_wallet = match &state.connection {
        ConnectionState::Connecting { wallet } | ConnectionState::Connected { wallet, .. } => {
            Some(wallet.as_str())
        }
        _ => None,
    };

    let wallet_buttons = state
        .discovery
        .wallets()
        .iter()
        .map(|w| WalletButton {
            key: w.key.clone(),
            label: format!("Connect {}", w.display_name),
            active: active_wallet == Some(w.key.as_str()),
        })
        .collect();

    let delegate_button = state.connection.is_connected().then(|| match state.delegation {
        DelegationStatus::Submitting => DelegateButton {
            label: "Delegating...".to_owned(),
            enabled: false,
        },
        _ => DelegateButton {
            label: "Delegate".to_owned(),
            enabled: true,
        },
    });

    StatusView {
        status,
        severity,
        wallet_buttons,
        delegate_button,
    }
}
