//! Test doubles shared across module tests.

use async_trait::async_trait;
use futures::channel::oneshot;
use sb_api_types::{Bech32Address, DelegationRequest, DelegationResponse, EpochParams, Utxo};
use sb_backend_client::{DelegationBackend, SubmitError};
use std::cell::RefCell;

pub(crate) struct FakeBackend {
    calls: RefCell<Vec<&'static str>>,
    submitted: RefCell<Vec<DelegationRequest>>,
    submit_result: Result<String, SubmitError>,
    utxo_error: Option<SubmitError>,
    hold: RefCell<Option<oneshot::Receiver<()>>>,
}

impl FakeBackend {
    pub(crate) fn accepting(tx_hash: &str) -> Self {
        Self::with_result(Ok(tx_hash.to_owned()))
    }

    pub(crate) fn failing(err: SubmitError) -> Self {
        Self::with_result(Err(err))
    }

    fn with_result(submit_result: Result<String, SubmitError>) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            submitted: RefCell::new(Vec::new()),
            submit_result,
            utxo_error: None,
            hold: RefCell::new(None),
        }
    }

    pub(crate) fn with_utxo_error(mut self, err: SubmitError) -> Self {
        self.utxo_error = Some(err);
        self
    }

    /// Submission blocks until the paired sender fires.
    pub(crate) fn held(self, release: oneshot::Receiver<()>) -> Self {
        *self.hold.borrow_mut() = Some(release);
        self
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub(crate) fn submitted(&self) -> Vec<DelegationRequest> {
        self.submitted.borrow().clone()
    }
}

#[async_trait(?Send)]
impl DelegationBackend for FakeBackend {
    async fn fetch_utxos(&self, _address: &Bech32Address) -> Result<Vec<Utxo>, SubmitError> {
        self.calls.borrow_mut().push("utxos");
        match &self.utxo_error {
            Some(err) => Err(err.clone()),
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_epoch_params(&self) -> Result<EpochParams, SubmitError> {
        self.calls.borrow_mut().push("epoch-params");
        Ok(EpochParams::default())
    }

    async fn submit_delegation(
        &self,
        request: &DelegationRequest,
    ) -> Result<DelegationResponse, SubmitError> {
        self.calls.borrow_mut().push("submit");
        self.submitted.borrow_mut().push(request.clone());
        let hold = self.hold.borrow_mut().take();
        if let Some(release) = hold {
            let _ = release.await;
        }
        self.submit_result
            .clone()
            .map(|tx_hash| DelegationResponse { tx_hash })
    }
}
