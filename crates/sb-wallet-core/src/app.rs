//! Page-session orchestration.
//!
//! `DelegationApp` runs the page lifecycle: codec gate, then wallet
//! discovery, then user-driven connect and delegate. Every failure is turned
//! into state here so the renderer can show it; the returned `Result`s are
//! for logging only.

use crate::config::BridgeConfig;
use crate::controller::ConnectionController;
use crate::delegation::{DelegationResult, submit_delegation};
use crate::discovery::{WalletDescriptor, discover};
use crate::error::{BridgeError, ConnectError, DelegateError};
use crate::gate::ReadinessGate;
use crate::state::{AppState, DelegationStatus, StateStore, Transition};
use crate::timer::Timer;
use sb_api_types::Bech32Address;
use sb_backend_client::DelegationBackend;
use sb_codec::AddressCodec;
use sb_wallet_bridge::WalletNamespace;
use std::cell::RefCell;
use std::rc::Rc;
use tokio::sync::watch;
use tracing::{error, info, warn};

pub struct DelegationApp {
    config: BridgeConfig,
    gate: ReadinessGate,
    controller: ConnectionController,
    namespace: Rc<dyn WalletNamespace>,
    backend: Rc<dyn DelegationBackend>,
    timer: Rc<dyn Timer>,
    wallets: RefCell<Vec<WalletDescriptor>>,
}

impl DelegationApp {
    pub fn new(
        config: BridgeConfig,
        codec: Rc<dyn AddressCodec>,
        namespace: Rc<dyn WalletNamespace>,
        backend: Rc<dyn DelegationBackend>,
        timer: Rc<dyn Timer>,
    ) -> Self {
        Self {
            config,
            gate: ReadinessGate::new(),
            controller: ConnectionController::new(codec, StateStore::new()),
            namespace,
            backend,
            timer,
            wallets: RefCell::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Hosts signal codec readiness through the gate.
    pub fn gate(&self) -> &ReadinessGate {
        &self.gate
    }

    pub fn timer(&self) -> &dyn Timer {
        self.timer.as_ref()
    }

    pub fn snapshot(&self) -> AppState {
        self.controller.store().snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.controller.store().subscribe()
    }

    fn dispatch(&self, transition: Transition) {
        self.controller.store().dispatch(transition);
    }

    /// Wait for the codec, then look for wallets. Call once per page load.
    pub async fn start(&self) -> Result<(), BridgeError> {
        self.gate.mark_loading();
        self.dispatch(Transition::CodecChanged(self.gate.readiness()));

        let ready = self
            .gate
            .await_ready(self.config.codec_timeout(), self.timer.as_ref())
            .await;
        self.dispatch(Transition::CodecChanged(self.gate.readiness()));
        if let Err(err) = ready {
            error!(error = %err, "halting: no wallet operations without the codec");
            return Err(err.into());
        }

        self.dispatch(Transition::DetectionStarted);
        let outcome = discover(
            self.namespace.as_ref(),
            &self.config.known_wallets,
            self.config.poll_interval(),
            self.config.max_poll_attempts,
            self.timer.as_ref(),
        )
        .await;
        self.dispatch(Transition::WalletsDiscovered(outcome.status()));

        let wallets = outcome.into_descriptors();
        let found = !wallets.is_empty();
        *self.wallets.borrow_mut() = wallets;
        if found { Ok(()) } else { Err(BridgeError::NoWallet) }
    }

    pub fn wallets(&self) -> Vec<WalletDescriptor> {
        self.wallets.borrow().clone()
    }

    /// Connect the discovered wallet named `key`, superseding any earlier connection.
    pub async fn select(&self, key: &str) -> Result<Bech32Address, BridgeError> {
        if !self.gate.is_ready() {
            return Err(ConnectError::CodecUnavailable.into());
        }

        let descriptor = self.wallets.borrow().iter().find(|w| w.key == key).cloned();
        let Some(descriptor) = descriptor else {
            let err = ConnectError::UnknownWallet(key.to_owned());
            warn!(wallet = key, "selected wallet was not discovered");
            self.controller.fail(&err);
            return Err(err.into());
        };

        Ok(self.controller.connect(&descriptor).await?)
    }

    pub fn disconnect(&self) {
        info!("disconnecting wallet");
        self.controller.disconnect();
    }

    /// Submit a delegation for the connected address.
    pub async fn delegate(&self) -> Result<DelegationResult, BridgeError> {
        let snapshot = self.snapshot();
        let current = self.controller.current();
        let Some((attempt, address)) = current.filter(|_| snapshot.connection.is_connected()) else {
            return Err(DelegateError::NotConnected.into());
        };
        if snapshot.delegation == DelegationStatus::Submitting {
            return Err(DelegateError::InFlight.into());
        }

        self.dispatch(Transition::DelegationStarted);
        let result = submit_delegation(self.backend.as_ref(), &address, &self.config.pool()).await;

        if !self.controller.is_current(attempt) {
            warn!(%address, "wallet changed during submission, discarding result");
            return Err(DelegateError::Stale.into());
        }

        match result {
            Ok(result) => {
                self.dispatch(Transition::DelegationSucceeded {
                    tx_hash: result.tx_hash.clone(),
                });
                Ok(result)
            }
            Err(err) => {
                warn!(error = %err, "delegation failed");
                self.dispatch(Transition::DelegationFailed {
                    reason: err.to_string(),
                });
                Err(DelegateError::Submit(err).into())
            }
        }
    }
}
