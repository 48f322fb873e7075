//! KeyboardController: turns a command into delivered key strokes.
//!
//! The controller looks the command up in the shared [`ActionTable`] and hands
//! the resulting stroke sequence to a [`KeyboardInjector`].  Platform
//! injectors live in the infrastructure layer and are chosen at startup.
//!
//! # Serialization
//!
//! Sequences from different sessions must never interleave at the OS input
//! queue.  The controller holds one async lock for the whole process (the
//! relay builds exactly one controller) and keeps it for the full sequence.
//! Waiting for that lock is cancellable.

use std::sync::Arc;

use async_trait::async_trait;
use pochi_core::{ActionTable, CommandType, KeyCode, KeyStroke};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Errors raised while injecting a key-stroke sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectionError {
    /// Cancellation was requested before the sequence finished.
    #[error("injection cancelled")]
    Cancelled,

    /// The OS rejected the injection.
    #[error("platform error: {0}")]
    Platform(String),

    /// The OS accepted only part of the input events.
    #[error("only {delivered} of {expected} input events were delivered")]
    Partial { delivered: usize, expected: usize },
}

/// Capability that presses and releases keys on the local machine.
///
/// Implementations deliver each stroke as one key-down followed by one key-up,
/// in order, and check `cancel` before every stroke.  A cancelled sequence
/// returns [`InjectionError::Cancelled`], never a partial success.
#[async_trait]
pub trait KeyboardInjector: Send + Sync {
    /// Delivers `sequence` in order.
    async fn inject(
        &self,
        sequence: &[KeyStroke],
        cancel: &CancellationToken,
    ) -> Result<(), InjectionError>;

    /// Short name for log lines (`"windows"`, `"noop"`, ...).
    fn name(&self) -> &'static str;
}

/// Resolves a command to its keyboard action and performs it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActionResolver: Send + Sync {
    /// Executes `command`.
    ///
    /// # Errors
    ///
    /// [`InjectionError::Cancelled`] if `cancel` fires before the sequence
    /// completes, or the injector's error otherwise.
    async fn execute(
        &self,
        command: CommandType,
        cancel: &CancellationToken,
    ) -> Result<(), InjectionError>;
}

/// The production [`ActionResolver`].
pub struct KeyboardController {
    table: Arc<ActionTable>,
    injector: Arc<dyn KeyboardInjector>,
    gate: Mutex<()>,
}

impl KeyboardController {
    /// Creates a controller over an immutable table and an injector.
    pub fn new(table: Arc<ActionTable>, injector: Arc<dyn KeyboardInjector>) -> Self {
        Self {
            table,
            injector,
            gate: Mutex::new(()),
        }
    }

    /// The table this controller resolves against.
    pub fn table(&self) -> &ActionTable {
        &self.table
    }
}

#[async_trait]
impl ActionResolver for KeyboardController {
    async fn execute(
        &self,
        command: CommandType,
        cancel: &CancellationToken,
    ) -> Result<(), InjectionError> {
        let action = self.table.action(command);
        info!(%command, %action, injector = self.injector.name(), "executing command");

        if cancel.is_cancelled() {
            return Err(InjectionError::Cancelled);
        }

        let _guard = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(%command, "cancelled while waiting for the injection lock");
                return Err(InjectionError::Cancelled);
            }
            guard = self.gate.lock() => guard,
        };

        self.injector.inject(action.sequence(), cancel).await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use pochi_core::KeyboardAction;

    use crate::infrastructure::injection::mock::RecordingInjector;

    fn make_controller(injector: RecordingInjector) -> (Arc<KeyboardController>, Arc<RecordingInjector>) {
        make_controller_with_table(ActionTable::defaults(), injector)
    }

    fn make_controller_with_table(
        table: ActionTable,
        injector: RecordingInjector,
    ) -> (Arc<KeyboardController>, Arc<RecordingInjector>) {
        let injector = Arc::new(injector);
        let controller = KeyboardController::new(
            Arc::new(table),
            Arc::clone(&injector) as Arc<dyn KeyboardInjector>,
        );
        (Arc::new(controller), injector)
    }

    // ── Resolution ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_execute_injects_default_key_for_each_command() {
        // Arrange
        let (controller, injector) = make_controller(RecordingInjector::new());
        let cancel = CancellationToken::new();

        // Act
        for command in CommandType::ALL {
            controller.execute(command, &cancel).await.unwrap();
        }

        // Assert
        assert_eq!(
            injector.recorded(),
            vec![
                vec![KeyCode::RightArrow],
                vec![KeyCode::LeftArrow],
                vec![KeyCode::F5],
                vec![KeyCode::Escape],
                vec![KeyCode::B],
                vec![KeyCode::W],
            ]
        );
    }

    #[tokio::test]
    async fn test_execute_forwards_multi_stroke_sequence_in_order() {
        // Arrange
        let mut overrides = HashMap::new();
        overrides.insert(
            CommandType::StartPresentation,
            KeyboardAction::from_keys(&[KeyCode::Escape, KeyCode::Home, KeyCode::F5]).unwrap(),
        );
        let table = ActionTable::defaults().with_overrides(overrides);
        let (controller, injector) = make_controller_with_table(table, RecordingInjector::new());

        // Act
        controller
            .execute(CommandType::StartPresentation, &CancellationToken::new())
            .await
            .unwrap();

        // Assert
        assert_eq!(
            injector.recorded()[0],
            vec![KeyCode::Escape, KeyCode::Home, KeyCode::F5]
        );
    }

    #[tokio::test]
    async fn test_execute_propagates_injector_failure() {
        let (controller, _) = make_controller(RecordingInjector::failing());

        let result = controller.execute(CommandType::Blackout, &CancellationToken::new()).await;

        assert_eq!(result, Err(InjectionError::Platform("mock failure".to_string())));
    }

    // ── Cancellation ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_execute_with_cancelled_token_injects_nothing() {
        // Arrange
        let (controller, injector) = make_controller(RecordingInjector::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        // Act
        let result = controller.execute(CommandType::Next, &cancel).await;

        // Assert
        assert_eq!(result, Err(InjectionError::Cancelled));
        assert!(injector.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_for_lock_returns_cancelled() {
        // Arrange: hold the gate so the next execute has to wait.
        let (controller, injector) = make_controller(RecordingInjector::new());
        let guard = controller.gate.lock().await;
        let cancel = CancellationToken::new();

        let waiter = {
            let controller = Arc::clone(&controller);
            let cancel = cancel.clone();
            tokio::spawn(async move { controller.execute(CommandType::Prev, &cancel).await })
        };

        // Act
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
        let result = waiter.await.unwrap();
        drop(guard);

        // Assert
        assert_eq!(result, Err(InjectionError::Cancelled));
        assert!(injector.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_mid_sequence_aborts_remaining_strokes() {
        // Arrange
        let mut overrides = HashMap::new();
        overrides.insert(
            CommandType::Next,
            KeyboardAction::from_keys(&[KeyCode::Space; 10]).unwrap(),
        );
        let table = ActionTable::defaults().with_overrides(overrides);
        let (controller, injector) = make_controller_with_table(
            table,
            RecordingInjector::with_stroke_delay(Duration::from_millis(20)),
        );
        let cancel = CancellationToken::new();

        // Act
        let task = {
            let controller = Arc::clone(&controller);
            let cancel = cancel.clone();
            tokio::spawn(async move { controller.execute(CommandType::Next, &cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        // Assert
        assert_eq!(task.await.unwrap(), Err(InjectionError::Cancelled));
        assert!(injector.recorded().is_empty());
    }

    // ── Serialization ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_concurrent_executions_never_overlap() {
        // Arrange
        let (controller, injector) =
            make_controller(RecordingInjector::with_stroke_delay(Duration::from_millis(5)));

        // Act
        let mut tasks = Vec::new();
        for command in CommandType::ALL {
            let controller = Arc::clone(&controller);
            tasks.push(tokio::spawn(async move {
                controller.execute(command, &CancellationToken::new()).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        // Assert
        assert_eq!(injector.max_in_flight(), 1);
        assert_eq!(injector.recorded().len(), CommandType::COUNT);
    }
}
