//! Wallet registry and poller.
//!
//! Wallet extensions inject themselves into a shared namespace at some
//! point after page load and never announce that they are done, so the
//! namespace is polled a bounded number of times.

use crate::state::{DiscoveryStatus, WalletSummary};
use crate::timer::Timer;
use sb_wallet_bridge::{NamespaceEntry, WalletCapability, WalletNamespace};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Clone)]
pub struct WalletDescriptor {
    pub key: String,
    pub display_name: String,
    pub capability: Rc<dyn WalletCapability>,
}

impl WalletDescriptor {
    pub fn summary(&self) -> WalletSummary {
        WalletSummary {
            key: self.key.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

impl std::fmt::Debug for WalletDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletDescriptor")
            .field("key", &self.key)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum DiscoveryOutcome {
    NoWallets,
    NoSupportedWallets { present: Vec<String> },
    Found(Vec<WalletDescriptor>),
}

impl DiscoveryOutcome {
    pub fn descriptors(&self) -> &[WalletDescriptor] {
        match self {
            DiscoveryOutcome::Found(found) => found,
            _ => &[],
        }
    }

    pub fn into_descriptors(self) -> Vec<WalletDescriptor> {
        match self {
            DiscoveryOutcome::Found(found) => found,
            _ => Vec::new(),
        }
    }

    pub fn status(&self) -> DiscoveryStatus {
        match self {
            DiscoveryOutcome::NoWallets => DiscoveryStatus::NoWallets,
            DiscoveryOutcome::NoSupportedWallets { .. } => DiscoveryStatus::NoSupportedWallets,
            DiscoveryOutcome::Found(found) => {
                DiscoveryStatus::Found(found.iter().map(WalletDescriptor::summary).collect())
            }
        }
    }
}

/// Provided name when it is non-empty, otherwise the namespace key.
pub fn display_name(key: &str, name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => key.to_owned(),
    }
}

/// Supported wallets currently in the namespace, in `known_keys` order.
///
/// `None` when the namespace is absent or holds nothing at all.
fn inspect(namespace: &dyn WalletNamespace, known_keys: &[String]) -> Option<Inspection> {
    let entries = namespace.entries()?;
    if entries.is_empty() {
        return None;
    }

    let found = known_keys
        .iter()
        .enumerate()
        // a key listed twice is offered once, at its first position
        .filter(|(i, key)| !known_keys[..*i].contains(*key))
        .filter_map(|(_, key)| entries.iter().find(|entry| &entry.key == key))
        .filter_map(describe)
        .collect();

    Some(Inspection {
        found,
        present: entries.into_iter().map(|entry| entry.key).collect(),
    })
}

struct Inspection {
    found: Vec<WalletDescriptor>,
    present: Vec<String>,
}

fn describe(entry: &NamespaceEntry) -> Option<WalletDescriptor> {
    let Some(capability) = entry.capability.clone() else {
        debug!(key = %entry.key, "skipping namespace entry without enable()");
        return None;
    };
    Some(WalletDescriptor {
        key: entry.key.clone(),
        display_name: display_name(&entry.key, entry.name.as_deref()),
        capability,
    })
}

/// Look for supported wallets once right away, then up to `max_attempts`
/// more times with `poll_interval` between looks.
pub async fn discover(
    namespace: &dyn WalletNamespace,
    known_keys: &[String],
    poll_interval: Duration,
    max_attempts: u32,
    timer: &dyn Timer,
) -> DiscoveryOutcome {
    let mut last = inspect(namespace, known_keys);
    let mut attempt = 0;

    loop {
        if let Some(inspection) = &last {
            if !inspection.found.is_empty() {
                break;
            }
        }
        if attempt == max_attempts {
            break;
        }
        attempt += 1;
        timer.sleep(poll_interval).await;
        last = inspect(namespace, known_keys);
    }

    match last {
        None => {
            info!(attempts = attempt, "no wallets detected");
            DiscoveryOutcome::NoWallets
        }
        Some(Inspection { found, present }) if found.is_empty() => {
            info!(?present, "no supported wallets detected");
            DiscoveryOutcome::NoSupportedWallets { present }
        }
        Some(Inspection { found, .. }) => {
            info!(
                wallets = ?found.iter().map(|w| w.key.as_str()).collect::<Vec<_>>(),
                "wallets detected"
            );
            DiscoveryOutcome::Found(found)
        }
    }
}

/// Supported wallets in `known_keys` order; empty when none showed up.
pub async fn discover_wallets(
    namespace: &dyn WalletNamespace,
    known_keys: &[String],
    poll_interval: Duration,
    max_attempts: u32,
    timer: &dyn Timer,
) -> Vec<WalletDescriptor> {
    discover(namespace, known_keys, poll_interval, max_attempts, timer)
        .await
        .into_descriptors()
}
