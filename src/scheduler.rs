use crate::aggregator::EventAggregator;
use crate::display::DisplayFeed;
use crate::overlay::OverlayWindow;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    WaitingForEvent,
    Dispatching,
    ShuttingDown,
}

/// Result of one blocking wait on the platform queue.
#[derive(Debug)]
pub enum Retrieved<M> {
    /// The periodic timer fired.
    Tick,
    /// A UI message to translate and dispatch.
    Message(M),
    /// The queue asked the loop to stop, e.g. the window was closed.
    Quit,
    /// The retrieval primitive returned its error sentinel.
    Failed(String),
}

/// Blocking message retrieval plus dispatch, owned by the main thread.
pub trait MessagePump {
    type Message;

    /// Block until the next tick or message. Never blocks past the next tick.
    fn wait(&mut self) -> Retrieved<Self::Message>;
    fn dispatch(&mut self, message: Self::Message);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    Quit,
    RetrievalFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopReport {
    pub reason: ExitReason,
    pub ticks: u64,
    pub messages: u64,
}

/// The process's single cooperative control loop.
///
/// Each iteration waits on the pump and performs exactly one unit of work:
/// a display refresh on a tick, or one dispatched message. The aggregator is
/// only ever read, which is O(1) and never blocks.
pub struct Scheduler<'a, P: MessagePump, O: OverlayWindow + ?Sized> {
    pump: &'a mut P,
    overlay: &'a O,
    aggregator: &'a EventAggregator,
    feed: DisplayFeed,
    state: LoopState,
}

impl<'a, P: MessagePump, O: OverlayWindow + ?Sized> Scheduler<'a, P, O> {
    pub fn new(
        pump: &'a mut P,
        overlay: &'a O,
        aggregator: &'a EventAggregator,
        feed: DisplayFeed,
    ) -> Self {
        Self {
            pump,
            overlay,
            aggregator,
            feed,
            state: LoopState::Idle,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    fn transition(&mut self, next: LoopState) {
        tracing::trace!(from = ?self.state, to = ?next, "scheduler state");
        self.state = next;
    }

    /// Refresh the overlay from the aggregator once.
    pub fn refresh(&mut self) -> u64 {
        let value = self.feed.next_value(self.aggregator);
        self.overlay.request_repaint(value);
        value
    }

    /// Run until the pump reports quit or a retrieval failure.
    pub fn run(&mut self) -> LoopReport {
        let mut ticks = 0_u64;
        let mut messages = 0_u64;
        self.transition(LoopState::WaitingForEvent);

        let reason = loop {
            match self.pump.wait() {
                Retrieved::Tick => {
                    self.transition(LoopState::Dispatching);
                    let value = self.refresh();
                    ticks += 1;
                    tracing::trace!(value, "tick");
                }
                Retrieved::Message(message) => {
                    self.transition(LoopState::Dispatching);
                    self.pump.dispatch(message);
                    messages += 1;
                }
                Retrieved::Quit => break ExitReason::Quit,
                Retrieved::Failed(err) => {
                    tracing::warn!(%err, "message retrieval failed; shutting down");
                    break ExitReason::RetrievalFailed(err);
                }
            }
            self.transition(LoopState::WaitingForEvent);
        };

        self.transition(LoopState::ShuttingDown);
        LoopReport {
            reason,
            ticks,
            messages,
        }
    }
}

/// A queued step for [`ScriptedPump`]. Dispatching runs the closure, which
/// lets a script inject input between ticks.
pub type ScriptedMessage = Box<dyn FnOnce() + Send>;

/// Pump that replays a fixed script and reports [`Retrieved::Quit`] once the
/// script is exhausted.
#[derive(Default)]
pub struct ScriptedPump {
    script: VecDeque<Retrieved<ScriptedMessage>>,
    dispatched: usize,
}

impl ScriptedPump {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(mut self) -> Self {
        self.script.push_back(Retrieved::Tick);
        self
    }

    pub fn message<F>(mut self, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.script.push_back(Retrieved::Message(Box::new(f)));
        self
    }

    pub fn fail(mut self, err: impl Into<String>) -> Self {
        self.script.push_back(Retrieved::Failed(err.into()));
        self
    }

    pub fn quit(mut self) -> Self {
        self.script.push_back(Retrieved::Quit);
        self
    }

    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl MessagePump for ScriptedPump {
    type Message = ScriptedMessage;

    fn wait(&mut self) -> Retrieved<ScriptedMessage> {
        self.script.pop_front().unwrap_or(Retrieved::Quit)
    }

    fn dispatch(&mut self, message: ScriptedMessage) {
        self.dispatched += 1;
        message();
    }
}
