use sb_api_types::{Bech32Address, DelegationRequest, PoolId};
use sb_backend_client::{DelegationBackend, SubmitError};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationResult {
    pub tx_hash: String,
}

/// Post a delegation of `address` to `pool_id`.
///
/// UTXOs and epoch parameters are read first; they are the inputs a
/// client-side transaction builder would need, and nothing consumes them yet.
pub async fn submit_delegation(
    backend: &dyn DelegationBackend,
    address: &Bech32Address,
    pool_id: &PoolId,
) -> Result<DelegationResult, SubmitError> {
    let utxos = backend.fetch_utxos(address).await?;
    let params = backend.fetch_epoch_params().await?;
    debug!(utxos = utxos.len(), epoch = ?params.epoch, "fetched chain state");

    let request = DelegationRequest::new(address, pool_id);
    let response = backend.submit_delegation(&request).await?;
    info!(tx_hash = %response.tx_hash, pool = %pool_id.0, "delegation submitted");

    Ok(DelegationResult {
        tx_hash: response.tx_hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;

    fn address() -> Bech32Address {
        Bech32Address("addr1qdelegator".to_owned())
    }

    #[tokio::test]
    async fn posts_address_and_fixed_pool() -> anyhow::Result<()> {
        let backend = FakeBackend::accepting("9f2c");
        let pool = PoolId("pool1fixed".to_owned());

        let result = submit_delegation(&backend, &address(), &pool).await?;

        assert_eq!(result.tx_hash, "9f2c");
        assert_eq!(backend.calls(), vec!["utxos", "epoch-params", "submit"]);
        assert_eq!(
            backend.submitted(),
            vec![DelegationRequest {
                address: "addr1qdelegator".to_owned(),
                pool_id: "pool1fixed".to_owned(),
            }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn backend_error_message_is_kept_exactly() {
        let backend = FakeBackend::failing(SubmitError::Backend("pool not found".to_owned()));

        let err = submit_delegation(&backend, &address(), &PoolId("pool1x".to_owned()))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "pool not found");
    }

    #[tokio::test]
    async fn failed_state_fetch_stops_before_submit() {
        let backend = FakeBackend::accepting("unused")
            .with_utxo_error(SubmitError::Network("connection refused".to_owned()));

        let err = submit_delegation(&backend, &address(), &PoolId("pool1x".to_owned()))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Network(_)));
        assert_eq!(backend.calls(), vec!["utxos"]);
        assert!(backend.submitted().is_empty());
    }
}
