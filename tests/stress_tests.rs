//! Stress tests for the dispatch core
//!
//! These tests verify:
//! - Per-handler ordering with many concurrent producers
//! - Sync returning promptly for every producer under load
//! - Handler churn (replace/remove) while events are in flight
//! - Severe events reach a dedicated handler even when a noisy one drops

use sawmill::handlers::FileHandler;
use sawmill::prelude::*;
use sawmill::handler_fn;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

#[test]
fn test_concurrent_producers_keep_per_handler_order() {
    let capture = Arc::new(CaptureHandler::new());
    let logger = Arc::new(
        Logger::builder()
            .handler_with(
                "capture",
                Arc::clone(&capture),
                HandlerConfig::new().capacity(100_000),
            )
            .build()
            .unwrap(),
    );

    let threads = 8;
    let per_thread = 500;
    let barrier = Arc::new(Barrier::new(threads));
    let mut handles = vec![];

    for thread_id in 0..threads {
        let logger = Arc::clone(&logger);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..per_thread {
                logger.info("work", &fields! { "thread" => thread_id, "i" => i });
            }
        }));
    }
    for handle in handles {
        handle.join().expect("Thread panicked");
    }
    logger.stop();

    let ids: Vec<u64> = capture.events().iter().map(|e| e.id).collect();
    assert_eq!(ids.len(), threads * per_thread);
    assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids out of order");
    assert_eq!(logger.dropped_count(), 0);
}

#[test]
fn test_sync_under_concurrent_load() {
    let slow_calls = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&slow_calls);
    let logger = Arc::new(Logger::new());
    logger
        .add_handler_with(
            "slow",
            handler_fn(move |_event: &Event| {
                calls.fetch_add(1, Ordering::Relaxed);
                thread::sleep(Duration::from_micros(200));
                Ok(())
            }),
            HandlerConfig::new().capacity(16),
        )
        .unwrap();
    logger.add_handler("fast", CaptureHandler::new()).unwrap();

    let mut handles = vec![];
    for _ in 0..4 {
        let logger = Arc::clone(&logger);
        handles.push(thread::spawn(move || {
            let start = Instant::now();
            for i in 0..200 {
                let id = logger.debug("tick", &fields! { "i" => i });
                if i % 25 == 0 {
                    logger.sync(id);
                }
            }
            start.elapsed()
        }));
    }

    for handle in handles {
        let elapsed = handle.join().expect("Thread panicked");
        assert!(elapsed < Duration::from_secs(30), "producer took {:?}", elapsed);
    }
    logger.stop();

    let metrics = logger.metrics();
    assert_eq!(metrics.submitted_count(), 800);
    assert_eq!(metrics.enqueued_count() + metrics.dropped_count(), 1_600);
    assert_eq!(
        slow_calls.load(Ordering::Relaxed) as u64 + metrics.dropped_count(),
        800
    );
}

#[test]
fn test_handler_churn_during_logging() {
    let logger = Arc::new(Logger::new());
    let running = Arc::new(std::sync::atomic::AtomicBool::new(true));

    let producer = {
        let logger = Arc::clone(&logger);
        let running = Arc::clone(&running);
        thread::spawn(move || {
            let mut count = 0u64;
            while running.load(Ordering::Relaxed) {
                let id = logger.info("churn", &());
                logger.sync(id);
                count += 1;
            }
            count
        })
    };

    let captures: Vec<Arc<CaptureHandler>> =
        (0..20).map(|_| Arc::new(CaptureHandler::new())).collect();
    for capture in &captures {
        logger.add_handler("rotating", Arc::clone(capture)).unwrap();
        thread::sleep(Duration::from_millis(2));
    }
    assert!(logger.remove_handler("rotating", true));

    running.store(false, Ordering::Relaxed);
    let produced = producer.join().expect("Producer panicked");
    assert!(produced > 0);

    // Every replaced handler saw a strictly increasing run of ids.
    for capture in &captures {
        let ids: Vec<u64> = capture.events().iter().map(|e| e.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }
    logger.stop();
}

#[test]
fn test_severe_events_survive_noisy_neighbour() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("errors.log");

    let logger = Logger::builder()
        .handler_with(
            "noisy",
            handler_fn(|_event: &Event| {
                thread::sleep(Duration::from_millis(1));
                Ok(())
            }),
            HandlerConfig::new().capacity(2),
        )
        .handler_with(
            "errors",
            FileHandler::append(&log_file).expect("Failed to create handler"),
            HandlerConfig::new().capacity(1_000).threshold(Level::Error),
        )
        .build()
        .unwrap();

    let mut expected_errors = 0;
    for i in 0..300 {
        if i % 10 == 0 {
            logger.error(format!("failure {}", i), &());
            expected_errors += 1;
        } else {
            logger.debug(format!("noise {}", i), &());
        }
    }
    logger.stop();

    let content = std::fs::read_to_string(&log_file).expect("Failed to read log file");
    assert_eq!(content.lines().count(), expected_errors);
    assert!(content.lines().all(|line| line.contains("error>")));
    assert!(logger.dropped_count() > 0);
}

#[test]
fn test_rapid_burst_with_default_capacity() {
    let counted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&counted);
    let logger = Logger::new();
    logger
        .add_handler(
            "count",
            handler_fn(move |_event: &Event| {
                counter.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }),
        )
        .unwrap();

    let start = Instant::now();
    for i in 0..10_000 {
        logger.info("burst", &fields! { "i" => i });
    }
    let elapsed = start.elapsed();
    logger.stop();

    assert!(elapsed < Duration::from_secs(10), "burst took {:?}", elapsed);
    assert_eq!(
        counted.load(Ordering::Relaxed) as u64 + logger.dropped_count(),
        10_000
    );
}
