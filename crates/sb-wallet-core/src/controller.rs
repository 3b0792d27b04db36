//! Connection controller.
//!
//! Drives `ConnectionState` for the wallet the user picked. Each `connect`
//! takes a new attempt number; when an attempt completes after a newer one
//! started, its result is dropped instead of overwriting the newer state.

use crate::discovery::WalletDescriptor;
use crate::error::ConnectError;
use crate::state::{StateStore, Transition};
use sb_api_types::{AddressHex, Bech32Address};
use sb_codec::{AddressCodec, decode_address_hex};
use sb_wallet_bridge::WalletSession;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, info, warn};

struct ActiveSession {
    attempt: u64,
    wallet: String,
    address: Bech32Address,
    network: Option<u8>,
    // held only so the connection has an owner; wallets expose no disconnect
    _session: Box<dyn WalletSession>,
}

pub struct ConnectionController {
    codec: Rc<dyn AddressCodec>,
    store: StateStore,
    active: RefCell<Option<ActiveSession>>,
    attempt: Cell<u64>,
}

impl ConnectionController {
    pub fn new(codec: Rc<dyn AddressCodec>, store: StateStore) -> Self {
        Self {
            codec,
            store,
            active: RefCell::new(None),
            attempt: Cell::new(0),
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn has_session(&self) -> bool {
        self.active.borrow().is_some()
    }

    /// Attempt number and address of the live connection, if any.
    pub fn current(&self) -> Option<(u64, Bech32Address)> {
        self.active
            .borrow()
            .as_ref()
            .map(|active| (active.attempt, active.address.clone()))
    }

    pub fn current_wallet(&self) -> Option<String> {
        self.active.borrow().as_ref().map(|active| active.wallet.clone())
    }

    /// Network the wallet reported for the live connection, if it answered.
    pub fn network_id(&self) -> Option<u8> {
        self.active.borrow().as_ref().and_then(|active| active.network)
    }

    pub fn is_current(&self, attempt: u64) -> bool {
        self.attempt.get() == attempt
    }

    pub async fn connect(&self, descriptor: &WalletDescriptor) -> Result<Bech32Address, ConnectError> {
        let attempt = self.begin_attempt();
        self.store.dispatch(Transition::ConnectStarted {
            wallet: descriptor.key.clone(),
        });
        info!(wallet = %descriptor.key, attempt, "connecting wallet");

        let result = self.establish(descriptor).await;

        if !self.is_current(attempt) {
            debug!(wallet = %descriptor.key, attempt, "dropping superseded connection attempt");
            return Err(ConnectError::Superseded);
        }

        match result {
            Ok((session, address, network)) => {
                *self.active.borrow_mut() = Some(ActiveSession {
                    attempt,
                    wallet: descriptor.key.clone(),
                    address: address.clone(),
                    network,
                    _session: session,
                });
                info!(wallet = %descriptor.key, %address, "wallet connected");
                self.store.dispatch(Transition::ConnectSucceeded {
                    wallet: descriptor.key.clone(),
                    address: address.clone(),
                });
                Ok(address)
            }
            Err(err) => {
                warn!(wallet = %descriptor.key, error = %err, "wallet connection failed");
                self.store.dispatch(Transition::ConnectFailed {
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Fail the connection without contacting a wallet. Any held session is
    /// dropped and in-flight attempts are superseded.
    pub fn fail(&self, err: &ConnectError) {
        self.begin_attempt();
        self.store.dispatch(Transition::ConnectFailed {
            reason: err.to_string(),
        });
    }

    /// Forget the current session. Purely client-side.
    pub fn disconnect(&self) {
        self.begin_attempt();
        self.store.dispatch(Transition::Disconnected);
    }

    fn begin_attempt(&self) -> u64 {
        let attempt = self.attempt.get() + 1;
        self.attempt.set(attempt);
        self.active.borrow_mut().take();
        attempt
    }

    async fn establish(
        &self,
        descriptor: &WalletDescriptor,
    ) -> Result<(Box<dyn WalletSession>, Bech32Address, Option<u8>), ConnectError> {
        let session = descriptor.capability.enable().await?;
        let network = match session.get_network_id().await {
            Ok(id) => {
                info!(wallet = %descriptor.key, network_id = id, "wallet network");
                Some(id)
            }
            Err(err) => {
                warn!(wallet = %descriptor.key, error = %err, "wallet did not report its network");
                None
            }
        };
        let addresses = session.get_used_addresses().await?;

        // wallet order is kept; the first used address is the one we delegate from
        let Some(first) = addresses.into_iter().next() else {
            return Err(ConnectError::NoAddress);
        };
        let address = decode_address_hex(self.codec.as_ref(), &first)?;

        if let (Some(reported), Some(encoded)) = (network, header_network(&first)) {
            if reported != encoded {
                warn!(
                    wallet = %descriptor.key,
                    reported,
                    encoded,
                    "address network differs from wallet network"
                );
            }
        }
        Ok((session, address, network))
    }
}

/// Network nibble of the address header byte.
fn header_network(address: &AddressHex) -> Option<u8> {
    let raw = address.0.trim();
    let raw = raw.strip_prefix("0x").unwrap_or(raw);
    let header = u8::from_str_radix(raw.get(..2)?, 16).ok()?;
    Some(header & 0x0f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ConnectionState;
    use async_trait::async_trait;
    use futures::channel::oneshot;
    use sb_codec::DecodeError;
    use sb_wallet_bridge::{ScriptedWallet, WalletCapability, WalletError};

    struct FixedCodec(&'static str);

    impl AddressCodec for FixedCodec {
        fn to_bech32(&self, _bytes: &[u8]) -> Result<Bech32Address, DecodeError> {
            Ok(Bech32Address(self.0.to_owned()))
        }
    }

    struct RejectingCodec;

    impl AddressCodec for RejectingCodec {
        fn to_bech32(&self, _bytes: &[u8]) -> Result<Bech32Address, DecodeError> {
            Err(DecodeError::Rejected("bad header".to_owned()))
        }
    }

    /// Wallet whose approval dialog stays open until released.
    struct GatedWallet {
        release: RefCell<Option<oneshot::Receiver<()>>>,
    }

    #[async_trait(?Send)]
    impl WalletCapability for GatedWallet {
        async fn enable(&self) -> Result<Box<dyn WalletSession>, WalletError> {
            let release = self.release.borrow_mut().take();
            if let Some(release) = release {
                let _ = release.await;
            }
            ScriptedWallet::with_addresses(["aa"]).enable().await
        }
    }

    fn descriptor(key: &str, capability: Rc<dyn WalletCapability>) -> WalletDescriptor {
        WalletDescriptor {
            key: key.to_owned(),
            display_name: key.to_owned(),
            capability,
        }
    }

    fn controller(codec: impl AddressCodec + 'static) -> ConnectionController {
        ConnectionController::new(Rc::new(codec), StateStore::new())
    }

    #[tokio::test]
    async fn connects_and_decodes_first_address() -> anyhow::Result<()> {
        let controller = controller(FixedCodec("addr1q..."));
        let nami = descriptor("nami", Rc::new(ScriptedWallet::with_addresses(["deadbeef", "cafe"])));

        let address = controller.connect(&nami).await?;

        assert_eq!(address, Bech32Address("addr1q...".to_owned()));
        assert_eq!(
            controller.store().snapshot().connection,
            ConnectionState::Connected {
                wallet: "nami".to_owned(),
                address: address.clone(),
            }
        );
        assert!(controller.has_session());
        assert_eq!(controller.current_wallet().as_deref(), Some("nami"));
        Ok(())
    }

    #[tokio::test]
    async fn wallet_without_used_addresses_fails() {
        let controller = controller(FixedCodec("addr1q..."));
        let empty = descriptor("eternl", Rc::new(ScriptedWallet::with_addresses(Vec::<String>::new())));

        let err = controller.connect(&empty).await.unwrap_err();

        assert_eq!(err, ConnectError::NoAddress);
        assert_eq!(
            controller.store().snapshot().connection,
            ConnectionState::Failed {
                reason: "wallet has no used addresses".to_owned()
            }
        );
        assert!(!controller.has_session());
    }

    #[tokio::test]
    async fn repeated_enable_rejection_leaves_no_session() {
        let controller = controller(FixedCodec("addr1q..."));
        let wallet = Rc::new(ScriptedWallet::rejecting("user declined"));
        let flint = descriptor("flint", wallet.clone());

        for _ in 0..2 {
            let err = controller.connect(&flint).await.unwrap_err();
            assert_eq!(err, ConnectError::Wallet(WalletError::Enable("user declined".to_owned())));
            assert!(matches!(
                controller.store().snapshot().connection,
                ConnectionState::Failed { .. }
            ));
            assert!(!controller.has_session());
        }
        assert_eq!(wallet.enable_calls(), 2);
    }

    #[tokio::test]
    async fn codec_rejection_is_surfaced_verbatim() {
        let controller = controller(RejectingCodec);
        let lace = descriptor("lace", Rc::new(ScriptedWallet::with_addresses(["0102"])));

        let err = controller.connect(&lace).await.unwrap_err();

        assert_eq!(err, ConnectError::Decode(DecodeError::Rejected("bad header".to_owned())));
        assert_eq!(
            controller.store().snapshot().connection,
            ConnectionState::Failed {
                reason: "could not decode address: codec rejected address: bad header".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn failed_reconnect_drops_previous_session() -> anyhow::Result<()> {
        let controller = controller(FixedCodec("addr1q..."));
        controller
            .connect(&descriptor("nami", Rc::new(ScriptedWallet::with_addresses(["aa"]))))
            .await?;
        assert!(controller.has_session());

        let _ = controller
            .connect(&descriptor("gero", Rc::new(ScriptedWallet::rejecting("locked"))))
            .await;

        assert!(!controller.has_session());
        assert_eq!(controller.current(), None);
        Ok(())
    }

    #[tokio::test]
    async fn newer_attempt_wins_over_slower_older_one() {
        let controller = controller(FixedCodec("addr1qlace"));
        let (release, gate) = oneshot::channel();
        let slow = descriptor(
            "nami",
            Rc::new(GatedWallet {
                release: RefCell::new(Some(gate)),
            }),
        );
        let fast = descriptor("lace", Rc::new(ScriptedWallet::with_addresses(["bb"])));

        let (first, second) = futures::join!(controller.connect(&slow), async {
            let result = controller.connect(&fast).await;
            let _ = release.send(());
            result
        });

        assert_eq!(first, Err(ConnectError::Superseded));
        assert_eq!(second, Ok(Bech32Address("addr1qlace".to_owned())));
        assert_eq!(controller.current_wallet().as_deref(), Some("lace"));
        assert!(matches!(
            controller.store().snapshot().connection,
            ConnectionState::Connected { ref wallet, .. } if wallet == "lace"
        ));
    }

    #[tokio::test]
    async fn reports_wallet_network_and_tolerates_its_absence() -> anyhow::Result<()> {
        let controller = controller(FixedCodec("addr_test1q..."));
        let preprod = Rc::new(ScriptedWallet::with_addresses(["00aa"]).on_network(0));
        controller.connect(&descriptor("lace", preprod)).await?;
        assert_eq!(controller.network_id(), Some(0));

        let silent = Rc::new(ScriptedWallet::with_addresses(["01aa"]).without_network("not implemented"));
        let address = controller.connect(&descriptor("gero", silent)).await?;
        assert_eq!(address, Bech32Address("addr_test1q...".to_owned()));
        assert!(controller.has_session());
        assert_eq!(controller.network_id(), None);
        Ok(())
    }

    #[test]
    fn header_network_reads_low_nibble() {
        assert_eq!(header_network(&AddressHex("61abcd".to_owned())), Some(1));
        assert_eq!(header_network(&AddressHex("0x70ab".to_owned())), Some(0));
        assert_eq!(header_network(&AddressHex("z".to_owned())), None);
    }

    #[tokio::test]
    async fn fail_drops_the_session_without_touching_a_wallet() -> anyhow::Result<()> {
        let controller = controller(FixedCodec("addr1q..."));
        controller
            .connect(&descriptor("nami", Rc::new(ScriptedWallet::with_addresses(["aa"]))))
            .await?;

        controller.fail(&ConnectError::UnknownWallet("typhon".to_owned()));

        assert!(!controller.has_session());
        assert_eq!(controller.current(), None);
        assert_eq!(
            controller.store().snapshot().connection,
            ConnectionState::Failed {
                reason: "wallet typhon is not available".to_owned()
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn disconnect_resets_client_state() -> anyhow::Result<()> {
        let controller = controller(FixedCodec("addr1q..."));
        controller
            .connect(&descriptor("nami", Rc::new(ScriptedWallet::with_addresses(["aa"]))))
            .await?;

        controller.disconnect();

        assert!(!controller.has_session());
        assert!(!controller.store().snapshot().connection.is_connected());
        Ok(())
    }
}
