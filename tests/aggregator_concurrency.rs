use apm_overlay::aggregator::{CountPolicy, EventAggregator};
use apm_overlay::input::{InputEvent, InputSource, MockInputSource, MouseButton};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

const THREADS: u64 = 8;
const KEYS_PER_THREAD: u64 = 1_000;
const CLICKS_PER_THREAD: u64 = 500;

fn hammer(agg: &Arc<EventAggregator>) -> Vec<thread::JoinHandle<()>> {
    (0..THREADS)
        .map(|i| {
            let agg = Arc::clone(agg);
            thread::spawn(move || {
                for n in 0..KEYS_PER_THREAD.max(CLICKS_PER_THREAD) {
                    if n < KEYS_PER_THREAD {
                        agg.record(InputEvent::KeyDown(0x41 + i as u32));
                    }
                    if n < CLICKS_PER_THREAD {
                        agg.record(InputEvent::MouseDown(MouseButton::Left));
                    }
                }
            })
        })
        .collect()
}

#[test]
fn concurrent_records_are_all_counted() {
    let agg = Arc::new(EventAggregator::new(CountPolicy::Cumulative, 0));
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let agg = Arc::clone(&agg);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut last = 0;
            while !done.load(Ordering::SeqCst) {
                let now = agg.read_and_optionally_reset();
                assert!(now >= last, "cumulative counter went from {last} to {now}");
                last = now;
            }
        })
    };

    for handle in hammer(&agg) {
        handle.join().unwrap();
    }
    done.store(true, Ordering::SeqCst);
    reader.join().unwrap();

    let expected = THREADS * (KEYS_PER_THREAD + CLICKS_PER_THREAD);
    assert_eq!(agg.read_and_optionally_reset(), expected);
    let totals = agg.totals();
    assert_eq!(totals.key_downs, THREADS * KEYS_PER_THREAD);
    assert_eq!(totals.mouse_downs, THREADS * CLICKS_PER_THREAD);
}

#[test]
fn per_tick_reads_partition_all_events() {
    let agg = Arc::new(EventAggregator::new(CountPolicy::PerTick, 0));
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let agg = Arc::clone(&agg);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut seen = 0;
            while !done.load(Ordering::SeqCst) {
                seen += agg.read_and_optionally_reset();
            }
            seen
        })
    };

    for handle in hammer(&agg) {
        handle.join().unwrap();
    }
    done.store(true, Ordering::SeqCst);
    let seen = reader.join().unwrap() + agg.read_and_optionally_reset();

    assert_eq!(seen, THREADS * (KEYS_PER_THREAD + CLICKS_PER_THREAD));
}

#[test]
fn no_mutation_after_unsubscribe() {
    let agg = Arc::new(EventAggregator::default());
    let (mut source, handle) = MockInputSource::new();
    source.subscribe(agg.clone()).unwrap();

    for _ in 0..4 {
        assert!(handle.emit(InputEvent::KeyDown(0x20)));
    }
    source.unsubscribe().unwrap();
    for _ in 0..10 {
        assert!(!handle.emit(InputEvent::MouseDown(MouseButton::Right)));
    }

    assert_eq!(agg.peek(), 4);
    assert_eq!(handle.unsubscribe_count(), 1);
}

#[test]
fn concurrent_delivery_through_input_source() {
    let agg = Arc::new(EventAggregator::default());
    let (mut source, handle) = MockInputSource::new();
    source.subscribe(agg.clone()).unwrap();
    let handle = Arc::new(handle);

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let handle = Arc::clone(&handle);
            thread::spawn(move || {
                for _ in 0..250 {
                    handle.emit(InputEvent::KeyDown(0x41));
                    handle.emit(InputEvent::MouseDown(MouseButton::X2));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(agg.peek(), 2_000);
}
