//! CommandDispatcher: runs parsed requests and classifies the outcome.
//!
//! The dispatcher is the boundary between "what went wrong" (logged in full on
//! the server) and "what the client is told" (one fixed reason).

use std::sync::Arc;

use pochi_core::CommandRequest;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::keyboard_controller::{ActionResolver, InjectionError};

/// The only failure reason a client ever sees from dispatch.
pub const DISPATCH_FAILED: &str = "dispatch failed";

/// Outcome of dispatching one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    Success,
    Failure { reason: &'static str },
}

impl DispatchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchResult::Success)
    }
}

/// Dispatch was abandoned because cancellation was requested.
///
/// Not a failure: the caller should stop without replying or counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("dispatch cancelled")]
pub struct Cancelled;

/// Routes validated requests to the [`ActionResolver`].
pub struct CommandDispatcher {
    resolver: Arc<dyn ActionResolver>,
}

impl CommandDispatcher {
    pub fn new(resolver: Arc<dyn ActionResolver>) -> Self {
        Self { resolver }
    }

    /// Executes `request.command`.
    ///
    /// # Errors
    ///
    /// [`Cancelled`] when `cancel` fired during execution.  Every other fault
    /// is logged at error level and folded into
    /// [`DispatchResult::Failure`] with reason [`DISPATCH_FAILED`].
    pub async fn dispatch(
        &self,
        request: &CommandRequest,
        cancel: &CancellationToken,
    ) -> Result<DispatchResult, Cancelled> {
        let client_id = request.client_id.as_deref().unwrap_or("-");
        match self.resolver.execute(request.command, cancel).await {
            Ok(()) => Ok(DispatchResult::Success),
            Err(InjectionError::Cancelled) => {
                debug!(command = %request.command, client_id, "dispatch cancelled");
                Err(Cancelled)
            }
            Err(e) => {
                error!(
                    command = %request.command,
                    client_id,
                    error = %e,
                    "failed to dispatch command"
                );
                Ok(DispatchResult::Failure {
                    reason: DISPATCH_FAILED,
                })
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::keyboard_controller::MockActionResolver;
    use mockall::predicate::eq;
    use pochi_core::CommandType;

    fn dispatcher_with(mock: MockActionResolver) -> CommandDispatcher {
        CommandDispatcher::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_success_when_resolver_succeeds() {
        // Arrange
        let mut mock = MockActionResolver::new();
        mock.expect_execute()
            .with(eq(CommandType::Next), mockall::predicate::always())
            .times(1)
            .returning(|_, _| Ok(()));
        let dispatcher = dispatcher_with(mock);
        let request = CommandRequest::new(CommandType::Next, Some("phone-1".to_string()));

        // Act
        let result = dispatcher.dispatch(&request, &CancellationToken::new()).await;

        // Assert
        assert_eq!(result, Ok(DispatchResult::Success));
    }

    #[tokio::test]
    async fn test_platform_fault_becomes_generic_failure() {
        // Arrange
        let mut mock = MockActionResolver::new();
        mock.expect_execute()
            .times(1)
            .returning(|_, _| Err(InjectionError::Platform("SendInput returned 0".to_string())));
        let dispatcher = dispatcher_with(mock);

        // Act
        let result = dispatcher
            .dispatch(
                &CommandRequest::new(CommandType::Blackout, None),
                &CancellationToken::new(),
            )
            .await;

        // Assert: the platform detail never reaches the client.
        assert_eq!(
            result,
            Ok(DispatchResult::Failure {
                reason: DISPATCH_FAILED
            })
        );
    }

    #[tokio::test]
    async fn test_partial_delivery_is_a_failure() {
        let mut mock = MockActionResolver::new();
        mock.expect_execute()
            .returning(|_, _| Err(InjectionError::Partial { delivered: 1, expected: 2 }));
        let dispatcher = dispatcher_with(mock);

        let result = dispatcher
            .dispatch(
                &CommandRequest::new(CommandType::Whiteout, None),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn test_cancellation_is_not_a_failure() {
        // Arrange
        let mut mock = MockActionResolver::new();
        mock.expect_execute()
            .times(1)
            .returning(|_, _| Err(InjectionError::Cancelled));
        let dispatcher = dispatcher_with(mock);
        let cancel = CancellationToken::new();
        cancel.cancel();

        // Act
        let result = dispatcher
            .dispatch(&CommandRequest::new(CommandType::Prev, None), &cancel)
            .await;

        // Assert
        assert_eq!(result, Err(Cancelled));
    }

    #[test]
    fn test_dispatch_result_is_success() {
        assert!(DispatchResult::Success.is_success());
        assert!(!DispatchResult::Failure { reason: DISPATCH_FAILED }.is_success());
    }
}
