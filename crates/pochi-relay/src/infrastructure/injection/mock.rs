//! Recording injector for tests.
//!
//! The real injectors press keys on the machine running the tests, need a
//! desktop session, and cannot be observed from Rust.  [`RecordingInjector`]
//! stores every delivered sequence in a `Mutex<Vec<...>>` instead, so tests
//! can assert exactly what was sent and in what order.
//!
//! # Usage in tests
//!
//! ```ignore
//! let injector = Arc::new(RecordingInjector::new());
//! let controller = KeyboardController::new(table, Arc::clone(&injector) as Arc<dyn KeyboardInjector>);
//!
//! controller.execute(CommandType::Next, &CancellationToken::new()).await?;
//!
//! assert_eq!(injector.recorded(), vec![vec![KeyCode::RightArrow]]);
//! ```
//!
//! # Failure injection
//!
//! `should_fail` makes every call fail; `fail_on` fails only sequences that
//! contain the given key, which lets one command fail while others succeed.
//!
//! # Overlap
//!
//! [`RecordingInjector::max_in_flight`] reports the most calls that were ever
//! inside `inject` at once, so serialization tests can assert it stays at 1.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pochi_core::{KeyCode, KeyStroke};
use tokio_util::sync::CancellationToken;

use crate::application::keyboard_controller::{InjectionError, KeyboardInjector};

/// An injector that records sequences without touching the OS.
#[derive(Debug, Default)]
pub struct RecordingInjector {
    /// Every fully delivered sequence, in delivery order.
    pub sequences: Mutex<Vec<Vec<KeyStroke>>>,
    /// When `true`, every call returns [`InjectionError::Platform`].
    pub should_fail: bool,
    /// Fail only sequences containing this key.
    pub fail_on: Option<KeyCode>,
    /// Pause before each stroke, to give cancellation something to interrupt.
    pub stroke_delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// An injector whose every call fails.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// An injector that fails sequences containing `key`.
    pub fn failing_on(key: KeyCode) -> Self {
        Self {
            fail_on: Some(key),
            ..Self::default()
        }
    }

    /// An injector that sleeps `delay` before each stroke.
    pub fn with_stroke_delay(delay: Duration) -> Self {
        Self {
            stroke_delay: Some(delay),
            ..Self::default()
        }
    }

    /// The recorded sequences as plain key lists.
    pub fn recorded(&self) -> Vec<Vec<KeyCode>> {
        self.sequences
            .lock()
            .map(|seqs| {
                seqs.iter()
                    .map(|seq| seq.iter().map(|s| s.key).collect())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Highest number of `inject` calls that ran at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Counts one call as in flight until dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize, high_water: &AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        high_water.fetch_max(now, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyboardInjector for RecordingInjector {
    async fn inject(
        &self,
        sequence: &[KeyStroke],
        cancel: &CancellationToken,
    ) -> Result<(), InjectionError> {
        let _in_flight = InFlight::enter(&self.in_flight, &self.max_in_flight);

        if self.should_fail {
            return Err(InjectionError::Platform("mock failure".into()));
        }
        if let Some(key) = self.fail_on {
            if sequence.iter().any(|s| s.key == key) {
                return Err(InjectionError::Platform(format!("mock failure on {key}")));
            }
        }

        for _ in sequence {
            if cancel.is_cancelled() {
                return Err(InjectionError::Cancelled);
            }
            if let Some(delay) = self.stroke_delay {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(InjectionError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        self.sequences
            .lock()
            .map_err(|_| InjectionError::Platform("recording lock poisoned".into()))?
            .push(sequence.to_vec());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
