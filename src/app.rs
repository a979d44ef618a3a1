use crate::aggregator::{EventAggregator, InputTotals};
use crate::display::DisplayFeed;
use crate::error::TrackerError;
use crate::input::{InputSink, InputSource};
use crate::overlay::OverlayWindow;
use crate::scheduler::{LoopReport, MessagePump, Scheduler};
use crate::settings::Settings;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub report: LoopReport,
    pub totals: InputTotals,
}

/// Active input subscription. Dropping it unsubscribes.
struct Subscription<'a, I: InputSource + ?Sized> {
    source: &'a mut I,
}

impl<I: InputSource + ?Sized> Drop for Subscription<'_, I> {
    fn drop(&mut self) {
        if let Err(err) = self.source.unsubscribe() {
            tracing::error!(?err, "failed to unsubscribe input source");
        }
    }
}

/// Created overlay window. Dropping it destroys the window.
struct Window<'a, O: OverlayWindow + ?Sized> {
    overlay: &'a mut O,
}

impl<O: OverlayWindow + ?Sized> Drop for Window<'_, O> {
    fn drop(&mut self) {
        self.overlay.destroy();
    }
}

/// Set up input, window and pump in that order, run the loop, then release
/// everything exactly once.
///
/// Any setup failure is logged and returned; resources acquired before the
/// failing step are released on the way out. Loop termination, including a
/// failed message retrieval, is a normal shutdown.
pub fn run<I, O, P, F>(
    settings: &Settings,
    input: &mut I,
    overlay: &mut O,
    make_pump: F,
) -> Result<RunSummary, TrackerError>
where
    I: InputSource + ?Sized,
    O: OverlayWindow + ?Sized,
    P: MessagePump,
    F: FnOnce(Duration) -> Result<P, TrackerError>,
{
    let aggregator = Arc::new(EventAggregator::new(
        settings.count_policy,
        settings.base_count,
    ));

    let sink: Arc<dyn InputSink> = aggregator.clone();
    if let Err(err) = input.subscribe(sink) {
        tracing::error!(%err, "input subscription failed");
        return Err(err);
    }
    let subscription = Subscription { source: input };

    if let Err(err) = overlay.create(&settings.geometry(), &settings.overlay_style()) {
        tracing::error!(%err, "overlay setup failed");
        return Err(err);
    }
    let window = Window { overlay };

    let tick = settings.tick_interval();
    let mut pump = match make_pump(tick) {
        Ok(pump) => pump,
        Err(err) => {
            tracing::error!(%err, "message loop setup failed");
            return Err(err);
        }
    };

    tracing::info!(
        policy = ?settings.count_policy,
        mode = ?settings.display_mode,
        tick_ms = tick.as_millis() as u64,
        "tracker running"
    );

    let feed = DisplayFeed::new(settings.display_mode, tick, settings.base_count);
    // Show the starting value without waiting a full period.
    window
        .overlay
        .request_repaint(feed.initial_value(&aggregator));
    let report = Scheduler::new(&mut pump, &*window.overlay, &aggregator, feed).run();
    drop(pump);

    drop(subscription);
    drop(window);

    let totals = aggregator.totals();
    tracing::info!(
        reason = ?report.reason,
        ticks = report.ticks,
        key_downs = totals.key_downs,
        mouse_downs = totals.mouse_downs,
        "tracker stopped"
    );
    Ok(RunSummary { report, totals })
}
