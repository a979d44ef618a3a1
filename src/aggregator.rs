use crate::input::{InputEvent, InputSink};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// How reads affect the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountPolicy {
    /// The counter only grows; reads leave it untouched.
    #[default]
    Cumulative,
    /// Every read returns the events since the previous read and resets to 0.
    PerTick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputTotals {
    pub key_downs: u64,
    pub mouse_downs: u64,
}

impl InputTotals {
    pub fn total(&self) -> u64 {
        self.key_downs + self.mouse_downs
    }
}

/// Lock-free event counter shared between the hook thread and the main loop.
///
/// Every operation is a single atomic instruction, so [`record`] is safe to
/// call from a low-level hook callback.
///
/// [`record`]: EventAggregator::record
#[derive(Debug)]
pub struct EventAggregator {
    policy: CountPolicy,
    count: AtomicU64,
    key_downs: AtomicU64,
    mouse_downs: AtomicU64,
}

impl EventAggregator {
    pub fn new(policy: CountPolicy, base: u64) -> Self {
        Self {
            policy,
            count: AtomicU64::new(base),
            key_downs: AtomicU64::new(0),
            mouse_downs: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> CountPolicy {
        self.policy
    }

    pub fn record(&self, event: InputEvent) {
        // Counters carry no other data, relaxed ordering is enough.
        self.count.fetch_add(1, Ordering::Relaxed);
        match event {
            InputEvent::KeyDown(_) => self.key_downs.fetch_add(1, Ordering::Relaxed),
            InputEvent::MouseDown(_) => self.mouse_downs.fetch_add(1, Ordering::Relaxed),
        };
    }

    /// Read the counter for display. Under [`CountPolicy::PerTick`] the read
    /// and the reset are one atomic swap, so an event lands either in this
    /// reading or the next one.
    pub fn read_and_optionally_reset(&self) -> u64 {
        match self.policy {
            CountPolicy::Cumulative => self.count.load(Ordering::Relaxed),
            CountPolicy::PerTick => self.count.swap(0, Ordering::Relaxed),
        }
    }

    /// Current value without applying the reset policy.
    pub fn peek(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Events recorded since start, split by kind. Never reset.
    pub fn totals(&self) -> InputTotals {
        InputTotals {
            key_downs: self.key_downs.load(Ordering::Relaxed),
            mouse_downs: self.mouse_downs.load(Ordering::Relaxed),
        }
    }
}

impl Default for EventAggregator {
    fn default() -> Self {
        Self::new(CountPolicy::default(), 0)
    }
}

impl InputSink for EventAggregator {
    fn record(&self, event: InputEvent) {
        EventAggregator::record(self, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseButton;

    #[test]
    fn cumulative_reads_do_not_reset() {
        let agg = EventAggregator::new(CountPolicy::Cumulative, 0);
        agg.record(InputEvent::KeyDown(0x20));
        agg.record(InputEvent::MouseDown(MouseButton::Right));
        assert_eq!(agg.read_and_optionally_reset(), 2);
        assert_eq!(agg.read_and_optionally_reset(), 2);
        agg.record(InputEvent::KeyDown(0x20));
        assert_eq!(agg.read_and_optionally_reset(), 3);
    }

    #[test]
    fn per_tick_reads_reset() {
        let agg = EventAggregator::new(CountPolicy::PerTick, 0);
        agg.record(InputEvent::KeyDown(0x20));
        agg.record(InputEvent::KeyDown(0x21));
        assert_eq!(agg.read_and_optionally_reset(), 2);
        assert_eq!(agg.read_and_optionally_reset(), 0);
        assert_eq!(agg.totals().key_downs, 2);
    }

    #[test]
    fn base_count_is_the_starting_value() {
        let agg = EventAggregator::new(CountPolicy::Cumulative, 1000);
        assert_eq!(agg.peek(), 1000);
        agg.record(InputEvent::MouseDown(MouseButton::X1));
        assert_eq!(agg.read_and_optionally_reset(), 1001);
        assert_eq!(agg.totals().total(), 1);
    }

    #[test]
    fn totals_split_by_kind() {
        let agg = EventAggregator::default();
        for _ in 0..3 {
            agg.record(InputEvent::KeyDown(0x41));
        }
        agg.record(InputEvent::MouseDown(MouseButton::Left));
        assert_eq!(
            agg.totals(),
            InputTotals {
                key_downs: 3,
                mouse_downs: 1
            }
        );
    }
}
