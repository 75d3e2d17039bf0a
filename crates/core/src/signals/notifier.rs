use async_trait::async_trait;
use log::info;

use super::Signal;
use crate::errors::Result;

/// Delivers emitted signals.
///
/// Delivery failures are reported back but do not un-emit the signal.
#[async_trait]
pub trait SignalNotifier: Send + Sync {
    async fn notify(&self, signal: &Signal) -> Result<()>;
}

/// Writes signals to the log only.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl SignalNotifier for LogNotifier {
    async fn notify(&self, signal: &Signal) -> Result<()> {
        info!(
            "Signal [fallback={}]\n{}",
            signal.used_fallback,
            signal.message()
        );
        Ok(())
    }
}
