use async_trait::async_trait;
use sb_wallet_core::Timer;
use std::time::Duration;

/// Browser timer (`setTimeout`).
#[derive(Debug, Default, Clone, Copy)]
pub struct GlooTimer;

#[async_trait(?Send)]
impl Timer for GlooTimer {
    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}
