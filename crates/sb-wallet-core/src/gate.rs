//! Readiness gate for the serialization codec.
//!
//! The codec loads asynchronously alongside the page. Nothing that touches
//! addresses may run before the gate reports `Ready`; if the codec never
//! shows up within the timeout the gate settles on `Failed` for the rest of
//! the page session.

use crate::error::CodecLoadError;
use crate::timer::{Timer, with_timeout};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CodecReadiness {
    NotLoaded,
    Loading,
    Ready,
    Failed,
}

impl CodecReadiness {
    pub fn is_terminal(self) -> bool {
        matches!(self, CodecReadiness::Ready | CodecReadiness::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            CodecReadiness::NotLoaded => 0,
            CodecReadiness::Loading => 1,
            CodecReadiness::Ready | CodecReadiness::Failed => 2,
        }
    }
}

pub struct ReadinessGate {
    state: watch::Sender<CodecReadiness>,
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessGate {
    pub fn new() -> Self {
        let (state, _) = watch::channel(CodecReadiness::NotLoaded);
        Self { state }
    }

    pub fn readiness(&self) -> CodecReadiness {
        *self.state.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.readiness() == CodecReadiness::Ready
    }

    pub fn subscribe(&self) -> watch::Receiver<CodecReadiness> {
        self.state.subscribe()
    }

    pub fn mark_loading(&self) -> bool {
        self.advance(CodecReadiness::Loading)
    }

    /// The codec announced itself. Ignored once the gate has settled.
    pub fn signal_loaded(&self) -> bool {
        let advanced = self.advance(CodecReadiness::Ready);
        if advanced {
            info!("serialization codec ready");
        } else {
            debug!(state = ?self.readiness(), "ignoring late codec signal");
        }
        advanced
    }

    pub fn mark_failed(&self) -> bool {
        self.advance(CodecReadiness::Failed)
    }

    fn advance(&self, next: CodecReadiness) -> bool {
        self.state.send_if_modified(|current| {
            if current.is_terminal() || next.rank() <= current.rank() {
                return false;
            }
            *current = next;
            true
        })
    }

    /// Wait until the gate settles, failing it if `timeout` passes first.
    pub async fn await_ready(
        &self,
        timeout: Duration,
        timer: &dyn Timer,
    ) -> Result<(), CodecLoadError> {
        let mut rx = self.state.subscribe();
        let settled = async { rx.wait_for(|state| state.is_terminal()).await.map(|state| *state) };

        match with_timeout(timer, timeout, settled).await {
            Some(Ok(CodecReadiness::Ready)) => Ok(()),
            Some(_) => Err(CodecLoadError::Failed),
            None => {
                self.mark_failed();
                if self.is_ready() {
                    return Ok(());
                }
                warn!(timeout_ms = timeout.as_millis() as u64, "serialization codec did not load");
                Err(CodecLoadError::TimedOut)
            }
        }
    }

    /// Poll `present` until it reports the codec present or the gate settles.
    ///
    /// For hosts whose codec bundle sets a global but fires no event.
    pub async fn poll_marker(&self, present: &dyn Fn() -> bool, interval: Duration, timer: &dyn Timer) {
        loop {
            if self.readiness().is_terminal() {
                return;
            }
            if present() {
                self.signal_loaded();
                return;
            }
            timer.sleep(interval).await;
        }
    }
}
