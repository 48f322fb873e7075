//! Injector for platforms without a keyboard injection backend.
//!
//! Every sequence is logged and reported as delivered, so the relay still
//! runs end to end (useful on headless Linux hosts and in CI).

use async_trait::async_trait;
use pochi_core::KeyStroke;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::application::keyboard_controller::{InjectionError, KeyboardInjector};

/// Logs instead of injecting.
#[derive(Debug, Default)]
pub struct NoopInjector;

impl NoopInjector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl KeyboardInjector for NoopInjector {
    async fn inject(
        &self,
        sequence: &[KeyStroke],
        cancel: &CancellationToken,
    ) -> Result<(), InjectionError> {
        if cancel.is_cancelled() {
            return Err(InjectionError::Cancelled);
        }
        let keys: Vec<String> = sequence.iter().map(ToString::to_string).collect();
        warn!(
            keys = %keys.join(", "),
            "keyboard injection is not supported on this platform; strokes dropped"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pochi_core::KeyCode;

    #[test]
    fn test_noop_reports_success() {
        let injector = NoopInjector::new();
        let strokes = [KeyStroke::with_key(KeyCode::Escape), KeyStroke::with_key(KeyCode::F5)];

        tokio_test::assert_ok!(tokio_test::block_on(
            injector.inject(&strokes, &CancellationToken::new())
        ));
    }

    #[tokio::test]
    async fn test_noop_honours_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = NoopInjector::new()
            .inject(&[KeyStroke::with_key(KeyCode::F5)], &cancel)
            .await;

        assert_eq!(result, Err(InjectionError::Cancelled));
    }
}
