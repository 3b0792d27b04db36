use serde::{Deserialize, Serialize};
use std::fmt;

/// Hex-encoded raw address bytes, as handed out by a wallet session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressHex(pub String);

/// Human-readable (bech32) address derived from raw address bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bech32Address(pub String);

impl fmt::Display for Bech32Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolId(pub String);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DelegationRequest {
    pub address: String,
    pub pool_id: String,
}

impl DelegationRequest {
    pub fn new(address: &Bech32Address, pool_id: &PoolId) -> Self {
        Self {
            address: address.0.clone(),
            pool_id: pool_id.0.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DelegationResponse {
    pub tx_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendErrorResponse {
    pub error: String,
}

/// One unspent output as reported by the backend. Only the fields needed to
/// identify the output are typed; the rest is carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Utxo {
    #[serde(default, alias = "txHash")]
    pub tx_hash: String,
    #[serde(default, alias = "outputIndex", alias = "tx_index")]
    pub output_index: u32,
    #[serde(default)]
    pub amount: serde_json::Value,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Protocol parameters for the current epoch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EpochParams {
    #[serde(default)]
    pub epoch: Option<u64>,
    #[serde(default)]
    pub min_fee_a: Option<u64>,
    #[serde(default)]
    pub min_fee_b: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub key_deposit: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub pool_deposit: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// Deposits come back as either numbers or decimal strings depending on the
// indexer behind the backend.
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Num(u64),
        Str(String),
    }

    match Option::<NumOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumOrString::Num(n)) => Ok(Some(n)),
        Some(NumOrString::Str(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
