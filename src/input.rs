use crate::error::TrackerError;
use anyhow::anyhow;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    X1,
    X2,
}

/// A recognised input event. Consumed immediately by the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Virtual key code of the pressed key.
    KeyDown(u32),
    MouseDown(MouseButton),
}

/// Receives events from an [`InputSource`].
///
/// Called from the platform's hook dispatch context: implementations must be
/// O(1), must not block and must not panic.
pub trait InputSink: Send + Sync {
    fn record(&self, event: InputEvent);
}

/// A process-wide listener for key-down and mouse-button-down events.
pub trait InputSource {
    /// Start delivering events to `sink`. Failure is fatal to the tracker.
    fn subscribe(&mut self, sink: Arc<dyn InputSink>) -> Result<(), TrackerError>;
    /// Stop delivery. Once this returns no further event reaches the sink.
    /// Calling it again, or without a subscription, is a no-op.
    fn unsubscribe(&mut self) -> anyhow::Result<()>;
    fn is_subscribed(&self) -> bool;
}

/// In-memory input source driven by a [`MockInputHandle`].
#[derive(Clone)]
pub struct MockInputSource {
    state: Arc<MockInputState>,
}

#[derive(Default)]
struct MockInputState {
    subscribe_count: AtomicUsize,
    unsubscribe_count: AtomicUsize,
    fail_subscribe: AtomicBool,
    sink: Mutex<Option<Arc<dyn InputSink>>>,
}

impl MockInputSource {
    pub fn new() -> (Self, MockInputHandle) {
        let state = Arc::new(MockInputState::default());
        (
            Self {
                state: Arc::clone(&state),
            },
            MockInputHandle { state },
        )
    }

    /// A source whose subscription always fails, like a hook refused for lack
    /// of privilege.
    pub fn failing() -> (Self, MockInputHandle) {
        let (source, handle) = Self::new();
        source.state.fail_subscribe.store(true, Ordering::SeqCst);
        (source, handle)
    }
}

impl InputSource for MockInputSource {
    fn subscribe(&mut self, sink: Arc<dyn InputSink>) -> Result<(), TrackerError> {
        if self.state.fail_subscribe.load(Ordering::SeqCst) {
            return Err(TrackerError::subscription("access denied"));
        }
        let mut guard = self
            .state
            .sink
            .lock()
            .map_err(|_| TrackerError::subscription("lock"))?;
        if guard.is_some() {
            return Err(TrackerError::subscription("already subscribed"));
        }
        self.state.subscribe_count.fetch_add(1, Ordering::SeqCst);
        *guard = Some(sink);
        Ok(())
    }

    fn unsubscribe(&mut self) -> anyhow::Result<()> {
        let mut guard = self.state.sink.lock().map_err(|_| anyhow!("lock"))?;
        if guard.take().is_some() {
            self.state.unsubscribe_count.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn is_subscribed(&self) -> bool {
        match self.state.sink.lock() {
            Ok(guard) => guard.is_some(),
            Err(_) => false,
        }
    }
}

pub struct MockInputHandle {
    state: Arc<MockInputState>,
}

impl MockInputHandle {
    pub fn subscribe_count(&self) -> usize {
        self.state.subscribe_count.load(Ordering::SeqCst)
    }

    pub fn unsubscribe_count(&self) -> usize {
        self.state.unsubscribe_count.load(Ordering::SeqCst)
    }

    /// Deliver `event` as the platform hook would. Returns `false` when no
    /// subscription is active and the event was dropped.
    pub fn emit(&self, event: InputEvent) -> bool {
        match self.state.sink.lock() {
            Ok(guard) => guard
                .as_ref()
                .map(|sink| sink.record(event))
                .is_some(),
            Err(_) => false,
        }
    }
}
