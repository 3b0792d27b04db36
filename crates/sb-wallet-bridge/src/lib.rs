use async_trait::async_trait;
use sb_api_types::AddressHex;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("wallet refused access: {0}")]
    Enable(String),
    #[error("failed to read used addresses: {0}")]
    Addresses(String),
    #[error("failed to read network id: {0}")]
    Network(String),
}

/// Host-injected handle through which the page asks a wallet for access.
#[async_trait(?Send)]
pub trait WalletCapability {
    /// May suspend for as long as the wallet's approval dialog is open.
    async fn enable(&self) -> Result<Box<dyn WalletSession>, WalletError>;
}

/// Access granted by a wallet after `enable`.
#[async_trait(?Send)]
pub trait WalletSession {
    /// Hex-encoded addresses with on-chain history, in wallet order.
    async fn get_used_addresses(&self) -> Result<Vec<AddressHex>, WalletError>;

    /// 1 for mainnet, 0 for the test networks.
    async fn get_network_id(&self) -> Result<u8, WalletError>;
}

/// One raw entry in the host's wallet namespace.
///
/// `capability` is `None` when the entry does not expose a callable
/// `enable`; such entries are never offered to the user.
#[derive(Clone)]
pub struct NamespaceEntry {
    pub key: String,
    pub name: Option<String>,
    pub capability: Option<Rc<dyn WalletCapability>>,
}

impl std::fmt::Debug for NamespaceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespaceEntry")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("capable", &self.capability.is_some())
            .finish()
    }
}

/// Read-only view of the shared namespace wallets inject themselves into.
pub trait WalletNamespace {
    /// `None` while the namespace object itself does not exist.
    fn entries(&self) -> Option<Vec<NamespaceEntry>>;
}

/// Namespace held in memory, for hosts without a browser window and for tests.
#[derive(Default)]
pub struct InMemoryNamespace {
    entries: RefCell<Option<Vec<NamespaceEntry>>>,
}

impl InMemoryNamespace {
    /// A namespace that has not been created by any wallet yet.
    pub fn absent() -> Self {
        Self::default()
    }

    /// A namespace object that exists but holds no wallets.
    pub fn empty() -> Self {
        Self {
            entries: RefCell::new(Some(Vec::new())),
        }
    }

    pub fn inject(&self, key: &str, name: Option<&str>, capability: Rc<dyn WalletCapability>) {
        self.push(NamespaceEntry {
            key: key.to_owned(),
            name: name.map(ToOwned::to_owned),
            capability: Some(capability),
        });
    }

    /// Inject an entry without an `enable` method.
    pub fn inject_malformed(&self, key: &str) {
        self.push(NamespaceEntry {
            key: key.to_owned(),
            name: None,
            capability: None,
        });
    }

    fn push(&self, entry: NamespaceEntry) {
        let mut guard = self.entries.borrow_mut();
        let entries = guard.get_or_insert_with(Vec::new);
        entries.retain(|existing| existing.key != entry.key);
        entries.push(entry);
    }
}

impl WalletNamespace for InMemoryNamespace {
    fn entries(&self) -> Option<Vec<NamespaceEntry>> {
        self.entries.borrow().clone()
    }
}

/// Wallet whose `enable` outcome is fixed up front.
pub struct ScriptedWallet {
    outcome: Result<Vec<AddressHex>, WalletError>,
    network: Result<u8, WalletError>,
    enable_calls: Cell<usize>,
}

impl ScriptedWallet {
    pub fn with_addresses<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            outcome: Ok(addresses.into_iter().map(|a| AddressHex(a.into())).collect()),
            network: Ok(1),
            enable_calls: Cell::new(0),
        }
    }

    pub fn rejecting(reason: &str) -> Self {
        Self {
            outcome: Err(WalletError::Enable(reason.to_owned())),
            network: Ok(1),
            enable_calls: Cell::new(0),
        }
    }

    pub fn on_network(mut self, network_id: u8) -> Self {
        self.network = Ok(network_id);
        self
    }

    /// Sessions from this wallet fail `get_network_id` with `reason`.
    pub fn without_network(mut self, reason: &str) -> Self {
        self.network = Err(WalletError::Network(reason.to_owned()));
        self
    }

    pub fn enable_calls(&self) -> usize {
        self.enable_calls.get()
    }
}

#[async_trait(?Send)]
impl WalletCapability for ScriptedWallet {
    async fn enable(&self) -> Result<Box<dyn WalletSession>, WalletError> {
        self.enable_calls.set(self.enable_calls.get() + 1);
        let addresses = self.outcome.clone()?;
        Ok(Box::new(ScriptedSession {
            addresses,
            network: self.network.clone(),
        }))
    }
}

pub struct ScriptedSession {
    addresses: Vec<AddressHex>,
    network: Result<u8, WalletError>,
}

#[async_trait(?Send)]
impl WalletSession for ScriptedSession {
    async fn get_used_addresses(&self) -> Result<Vec<AddressHex>, WalletError> {
        Ok(self.addresses.clone())
    }

    async fn get_network_id(&self) -> Result<u8, WalletError> {
        self.network.clone()
    }
}
