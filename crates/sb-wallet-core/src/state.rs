//! Page state.
//!
//! `AppState` is a plain value that is replaced, never edited in place: every
//! change goes through [`AppState::apply`] and is published by
//! [`StateStore::dispatch`] to whoever subscribed (the UI renderer).

use crate::gate::CodecReadiness;
use sb_api_types::Bech32Address;
use serde::Serialize;
use std::rc::Rc;
use tokio::sync::watch;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WalletSummary {
    pub key: String,
    pub display_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub enum DiscoveryStatus {
    #[default]
    Pending,
    /// The host namespace never appeared or stayed empty.
    NoWallets,
    /// Wallets are installed, but none we know how to talk to.
    NoSupportedWallets,
    Found(Vec<WalletSummary>),
}

impl DiscoveryStatus {
    pub fn wallets(&self) -> &[WalletSummary] {
        match self {
            DiscoveryStatus::Found(wallets) => wallets,
            _ => &[],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    #[default]
    Idle,
    Detecting,
    AwaitingSelection,
    Connecting {
        wallet: String,
    },
    Connected {
        wallet: String,
        address: Bech32Address,
    },
    Failed {
        reason: String,
    },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }

    pub fn address(&self) -> Option<&Bech32Address> {
        match self {
            ConnectionState::Connected { address, .. } => Some(address),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub enum DelegationStatus {
    #[default]
    Unavailable,
    Idle,
    Submitting,
    Submitted {
        tx_hash: String,
    },
    Failed {
        reason: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppState {
    pub codec: CodecReadiness,
    pub discovery: DiscoveryStatus,
    pub connection: ConnectionState,
    pub delegation: DelegationStatus,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            codec: CodecReadiness::NotLoaded,
            discovery: DiscoveryStatus::default(),
            connection: ConnectionState::default(),
            delegation: DelegationStatus::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    CodecChanged(CodecReadiness),
    DetectionStarted,
    WalletsDiscovered(DiscoveryStatus),
    ConnectStarted { wallet: String },
    ConnectSucceeded { wallet: String, address: Bech32Address },
    ConnectFailed { reason: String },
    Disconnected,
    DelegationStarted,
    DelegationSucceeded { tx_hash: String },
    DelegationFailed { reason: String },
}

impl AppState {
    pub fn apply(&self, transition: Transition) -> AppState {
        let mut next = self.clone();
        match transition {
            Transition::CodecChanged(codec) => next.codec = codec,
            Transition::DetectionStarted => {
                next.discovery = DiscoveryStatus::Pending;
                next.connection = ConnectionState::Detecting;
            }
            Transition::WalletsDiscovered(discovery) => {
                next.connection = if discovery.wallets().is_empty() {
                    ConnectionState::Idle
                } else {
                    ConnectionState::AwaitingSelection
                };
                next.discovery = discovery;
            }
            Transition::ConnectStarted { wallet } => {
                next.connection = ConnectionState::Connecting { wallet };
                next.delegation = DelegationStatus::Unavailable;
            }
            Transition::ConnectSucceeded { wallet, address } => {
                next.connection = ConnectionState::Connected { wallet, address };
                next.delegation = DelegationStatus::Idle;
            }
            Transition::ConnectFailed { reason } => {
                next.connection = ConnectionState::Failed { reason };
                next.delegation = DelegationStatus::Unavailable;
            }
            Transition::Disconnected => {
                next.connection = if next.discovery.wallets().is_empty() {
                    ConnectionState::Idle
                } else {
                    ConnectionState::AwaitingSelection
                };
                next.delegation = DelegationStatus::Unavailable;
            }
            // delegation outcomes only make sense while a wallet is connected
            Transition::DelegationStarted if next.connection.is_connected() => {
                next.delegation = DelegationStatus::Submitting;
            }
            Transition::DelegationSucceeded { tx_hash } if next.connection.is_connected() => {
                next.delegation = DelegationStatus::Submitted { tx_hash };
            }
            Transition::DelegationFailed { reason } if next.connection.is_connected() => {
                next.delegation = DelegationStatus::Failed { reason };
            }
            Transition::DelegationStarted
            | Transition::DelegationSucceeded { .. }
            | Transition::DelegationFailed { .. } => {}
        }
        next
    }
}

/// Single owner of the current `AppState`. Cloning shares the same state.
#[derive(Clone)]
pub struct StateStore {
    inner: Rc<watch::Sender<AppState>>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(AppState::default());
        Self { inner: Rc::new(tx) }
    }

    pub fn snapshot(&self) -> AppState {
        self.inner.borrow().clone()
    }

    pub fn dispatch(&self, transition: Transition) {
        debug!(?transition, "state transition");
        self.inner.send_if_modified(|state| {
            let next = state.apply(transition);
            if next == *state {
                return false;
            }
            *state = next;
            true
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.inner.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallets(keys: &[&str]) -> DiscoveryStatus {
        DiscoveryStatus::Found(
            keys.iter()
                .map(|k| WalletSummary {
                    key: (*k).to_owned(),
                    display_name: (*k).to_owned(),
                })
                .collect(),
        )
    }

    fn addr(s: &str) -> Bech32Address {
        Bech32Address(s.to_owned())
    }

    #[test]
    fn discovery_drives_selection_state() {
        let state = AppState::default().apply(Transition::DetectionStarted);
        assert_eq!(state.connection, ConnectionState::Detecting);

        let found = state.apply(Transition::WalletsDiscovered(wallets(&["eternl"])));
        assert_eq!(found.connection, ConnectionState::AwaitingSelection);

        let none = state.apply(Transition::WalletsDiscovered(DiscoveryStatus::NoWallets));
        assert_eq!(none.connection, ConnectionState::Idle);
    }

    #[test]
    fn reconnect_resets_delegation() {
        let state = AppState::default()
            .apply(Transition::WalletsDiscovered(wallets(&["nami", "lace"])))
            .apply(Transition::ConnectSucceeded {
                wallet: "nami".to_owned(),
                address: addr("addr1qa"),
            })
            .apply(Transition::DelegationSucceeded {
                tx_hash: "tx1".to_owned(),
            });
        assert_eq!(
            state.delegation,
            DelegationStatus::Submitted {
                tx_hash: "tx1".to_owned()
            }
        );

        let state = state.apply(Transition::ConnectStarted {
            wallet: "lace".to_owned(),
        });
        assert_eq!(state.delegation, DelegationStatus::Unavailable);
        assert_eq!(
            state.connection,
            ConnectionState::Connecting {
                wallet: "lace".to_owned()
            }
        );
    }

    #[test]
    fn delegation_outcomes_are_ignored_without_a_connection() {
        let state = AppState::default().apply(Transition::DelegationFailed {
            reason: "late".to_owned(),
        });
        assert_eq!(state.delegation, DelegationStatus::Unavailable);
    }

    #[test]
    fn disconnect_returns_to_selection() {
        let state = AppState::default()
            .apply(Transition::WalletsDiscovered(wallets(&["nami"])))
            .apply(Transition::ConnectSucceeded {
                wallet: "nami".to_owned(),
                address: addr("addr1qa"),
            })
            .apply(Transition::Disconnected);
        assert_eq!(state.connection, ConnectionState::AwaitingSelection);
        assert_eq!(state.connection.address(), None);
    }

    #[tokio::test]
    async fn subscribers_see_dispatched_state() {
        let store = StateStore::new();
        let mut rx = store.subscribe();

        store.dispatch(Transition::CodecChanged(CodecReadiness::Ready));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().codec, CodecReadiness::Ready);

        // no-op transitions do not wake subscribers
        store.dispatch(Transition::CodecChanged(CodecReadiness::Ready));
        assert!(!rx.has_changed().unwrap());
    }
}
