use crate::aggregator::{CountPolicy, EventAggregator};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

const MINUTE: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// The value read from the aggregator.
    #[default]
    Count,
    /// Actions per minute over the last sixty seconds.
    PerMinute,
}

/// Text currently rendered by the overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    label: String,
    value: Option<u64>,
    text: String,
}

impl DisplayState {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: None,
            text: String::new(),
        }
    }

    /// Apply a new value. Returns `true` when the rendered text changed and
    /// the window needs a redraw.
    pub fn apply(&mut self, value: u64) -> bool {
        if self.value == Some(value) {
            return false;
        }
        self.value = Some(value);
        self.text = format!("{}{}", self.label, value);
        true
    }

    pub fn value(&self) -> Option<u64> {
        self.value
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Sliding one-minute window of per-tick event counts.
#[derive(Debug, Clone)]
pub struct RateMeter {
    tick: Duration,
    capacity: usize,
    samples: VecDeque<u64>,
    sum: u64,
}

impl RateMeter {
    pub fn new(tick: Duration) -> Self {
        let tick = tick.max(Duration::from_millis(1));
        let capacity = MINUTE.as_millis().div_ceil(tick.as_millis()).max(1) as usize;
        Self {
            tick,
            capacity,
            samples: VecDeque::with_capacity(capacity),
            sum: 0,
        }
    }

    /// Number of ticks covering one minute.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Add the events seen during one tick and return the current rate.
    pub fn push(&mut self, events: u64) -> u64 {
        self.samples.push_back(events);
        self.sum += events;
        if self.samples.len() > self.capacity {
            if let Some(old) = self.samples.pop_front() {
                self.sum -= old;
            }
        }
        self.per_minute()
    }

    /// Events per minute over the time the samples cover. Before a full minute
    /// exists the rate is extrapolated; a window longer than a minute (tick
    /// not dividing 60 s, or longer than 60 s) is scaled down.
    pub fn per_minute(&self) -> u64 {
        if self.samples.is_empty() {
            return 0;
        }
        let covered = self.tick.as_millis() * self.samples.len() as u128;
        (self.sum as u128 * MINUTE.as_millis() / covered) as u64
    }
}

/// Turns aggregator reads into the value handed to the overlay on each tick.
#[derive(Debug)]
pub struct DisplayFeed {
    mode: DisplayMode,
    meter: RateMeter,
    last_total: u64,
    /// Base still contained in the next `PerTick` reading.
    pending_base: u64,
}

impl DisplayFeed {
    pub fn new(mode: DisplayMode, tick: Duration, base: u64) -> Self {
        Self {
            mode,
            meter: RateMeter::new(tick),
            last_total: base,
            pending_base: base,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Value shown before the first tick. Does not consume a reading.
    pub fn initial_value(&self, aggregator: &EventAggregator) -> u64 {
        match self.mode {
            DisplayMode::Count => aggregator.peek(),
            DisplayMode::PerMinute => 0,
        }
    }

    /// Read the aggregator once and compute the value to display.
    pub fn next_value(&mut self, aggregator: &EventAggregator) -> u64 {
        let reading = aggregator.read_and_optionally_reset();
        match self.mode {
            DisplayMode::Count => reading,
            DisplayMode::PerMinute => {
                let delta = match aggregator.policy() {
                    CountPolicy::Cumulative => {
                        let delta = reading.saturating_sub(self.last_total);
                        self.last_total = reading;
                        delta
                    }
                    CountPolicy::PerTick => {
                        reading.saturating_sub(std::mem::take(&mut self.pending_base))
                    }
                };
                self.meter.push(delta)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputEvent, MouseButton};

    #[test]
    fn identical_values_do_not_redraw() {
        let mut state = DisplayState::new("");
        assert!(state.apply(5));
        assert_eq!(state.text(), "5");
        assert!(!state.apply(5));
        assert!(state.apply(6));
        assert_eq!(state.value(), Some(6));
    }

    #[test]
    fn label_prefixes_value() {
        let mut state = DisplayState::new("APM ");
        state.apply(42);
        assert_eq!(state.text(), "APM 42");
    }

    #[test]
    fn zero_is_drawn_on_first_apply() {
        let mut state = DisplayState::default();
        assert!(state.apply(0));
        assert_eq!(state.text(), "0");
    }

    #[test]
    fn meter_capacity_covers_a_minute() {
        assert_eq!(RateMeter::new(Duration::from_secs(1)).capacity(), 60);
        assert_eq!(RateMeter::new(Duration::from_millis(250)).capacity(), 240);
        assert_eq!(RateMeter::new(Duration::from_secs(7)).capacity(), 9);
    }

    #[test]
    fn meter_extrapolates_partial_window() {
        let mut meter = RateMeter::new(Duration::from_secs(1));
        // 5 events in the first second is 300 per minute.
        assert_eq!(meter.push(5), 300);
        assert_eq!(meter.push(1), 180);
    }

    #[test]
    fn meter_drops_samples_older_than_a_minute() {
        let mut meter = RateMeter::new(Duration::from_secs(30));
        meter.push(10);
        assert_eq!(meter.push(20), 30);
        assert_eq!(meter.push(0), 20);
        assert_eq!(meter.push(0), 0);
    }

    #[test]
    fn meter_scales_windows_longer_than_a_minute() {
        let mut meter = RateMeter::new(Duration::from_secs(7));
        let mut rate = 0;
        for _ in 0..20 {
            rate = meter.push(7);
        }
        // 7 events every 7 s is one per second.
        assert_eq!(rate, 60);

        let mut slow = RateMeter::new(Duration::from_secs(120));
        assert_eq!(slow.capacity(), 1);
        assert_eq!(slow.push(10), 5);
    }

    #[test]
    fn feed_in_count_mode_passes_reading_through() {
        let agg = EventAggregator::new(CountPolicy::Cumulative, 0);
        let mut feed = DisplayFeed::new(DisplayMode::Count, Duration::from_secs(1), 0);
        agg.record(InputEvent::KeyDown(0x41));
        assert_eq!(feed.next_value(&agg), 1);
        assert_eq!(feed.next_value(&agg), 1);
    }

    #[test]
    fn feed_per_minute_uses_deltas_of_cumulative_counter() {
        let agg = EventAggregator::new(CountPolicy::Cumulative, 100);
        let mut feed = DisplayFeed::new(DisplayMode::PerMinute, Duration::from_secs(30), 100);
        agg.record(InputEvent::KeyDown(0x41));
        agg.record(InputEvent::MouseDown(MouseButton::Left));
        assert_eq!(feed.next_value(&agg), 4);
        assert_eq!(feed.next_value(&agg), 2);
        assert_eq!(agg.peek(), 102);
    }

    #[test]
    fn initial_value_leaves_the_counter_alone() {
        let agg = EventAggregator::new(CountPolicy::PerTick, 12);
        let count = DisplayFeed::new(DisplayMode::Count, Duration::from_secs(1), 12);
        let rate = DisplayFeed::new(DisplayMode::PerMinute, Duration::from_secs(1), 12);
        assert_eq!(count.initial_value(&agg), 12);
        assert_eq!(rate.initial_value(&agg), 0);
        assert_eq!(agg.peek(), 12);
    }

    #[test]
    fn feed_per_minute_with_per_tick_policy() {
        let agg = EventAggregator::new(CountPolicy::PerTick, 0);
        let mut feed = DisplayFeed::new(DisplayMode::PerMinute, Duration::from_secs(60), 0);
        for _ in 0..7 {
            agg.record(InputEvent::KeyDown(0x41));
        }
        assert_eq!(feed.next_value(&agg), 7);
        assert_eq!(agg.peek(), 0);
    }

    #[test]
    fn feed_per_minute_with_per_tick_policy_skips_the_base() {
        let agg = EventAggregator::new(CountPolicy::PerTick, 1000);
        let mut feed = DisplayFeed::new(DisplayMode::PerMinute, Duration::from_secs(1), 1000);
        agg.record(InputEvent::KeyDown(0x41));
        assert_eq!(feed.next_value(&agg), 60);
        agg.record(InputEvent::KeyDown(0x41));
        // Base is only subtracted from the first reading.
        assert_eq!(feed.next_value(&agg), 60);
        assert_eq!(feed.next_value(&agg), 40);
    }
}
