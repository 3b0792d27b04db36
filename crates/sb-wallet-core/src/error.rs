use sb_backend_client::SubmitError;
use sb_codec::DecodeError;
use sb_wallet_bridge::WalletError;
use thiserror::Error;

pub const CODEC_NOT_LOADED: &str = "serialization library not loaded";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecLoadError {
    #[error("serialization library not loaded")]
    TimedOut,
    #[error("serialization library not loaded")]
    Failed,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// The user declined, or the extension failed while enabling or reading addresses.
    #[error("{0}")]
    Wallet(#[from] WalletError),
    #[error("wallet has no used addresses")]
    NoAddress,
    #[error("could not decode address: {0}")]
    Decode(#[from] DecodeError),
    #[error("wallet {0} is not available")]
    UnknownWallet(String),
    #[error("serialization library not loaded")]
    CodecUnavailable,
    /// A newer `connect` started before this one finished.
    #[error("connection attempt superseded")]
    Superseded,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DelegateError {
    #[error("connect a wallet first")]
    NotConnected,
    #[error("a delegation is already being submitted")]
    InFlight,
    #[error(transparent)]
    Submit(#[from] SubmitError),
    /// The wallet changed while the submission was in flight.
    #[error("delegation result discarded: wallet changed")]
    Stale,
}

/// Every failure the page can surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error(transparent)]
    CodecLoad(#[from] CodecLoadError),
    #[error("no wallets detected")]
    NoWallet,
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error(transparent)]
    Delegate(#[from] DelegateError),
}

impl BridgeError {
    /// Fatal errors halt the page; everything else can be retried by the user.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BridgeError::CodecLoad(_))
    }
}
