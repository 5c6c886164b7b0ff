//! Async logging example
//!
//! Demonstrates an async file handler driven through the bridge, plus
//! several producer threads sharing one logger.
//!
//! Run with: cargo run --example async_logging --features async-handlers

use sawmill::core::AsyncBridge;
use sawmill::handlers::{AsyncFileHandler, StandardStreamsHandler};
use sawmill::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Sawmill - Async Logging Example ===\n");

    let runtime = tokio::runtime::Runtime::new()?;
    let file = runtime.block_on(AsyncFileHandler::new("async_test.log"))?;

    let logger = Arc::new(
        Logger::builder()
            .handler_with(
                "console",
                StandardStreamsHandler::new(),
                HandlerConfig::new().threshold(Level::Notice),
            )
            .handler_with(
                "file",
                AsyncBridge::new(file.with_output_format(OutputFormat::Json))?,
                HandlerConfig::new().capacity(1_000),
            )
            .build()?,
    );

    println!("1. Logging 100 events quickly:");
    for i in 0..100 {
        logger.info(format!("Message #{}", i), &fields! { "n" => i });
    }
    println!("   submitted 100 events");

    println!("\n2. Multi-threaded logging:");
    let mut handles = vec![];
    for thread_id in 0..5 {
        let logger = Arc::clone(&logger);
        handles.push(thread::spawn(move || {
            for i in 0..20 {
                logger.info(
                    format!("Thread {} - Message {}", thread_id, i),
                    &fields! { "thread" => thread_id },
                );
                thread::sleep(Duration::from_millis(10));
            }
            logger.notice(format!("Thread {} done", thread_id), &())
        }));
    }

    let mut last = 0;
    for handle in handles {
        last = last.max(handle.join().expect("Thread panicked"));
    }
    logger.sync(last);
    println!("   5 threads logged 20 events each");

    logger.stop();
    println!(
        "\n   dropped: {} (drop rate {:.2}%)",
        logger.metrics().dropped_count(),
        logger.metrics().drop_rate()
    );

    println!("\n=== Example completed successfully! ===");
    println!("Check 'async_test.log' for file output");

    Ok(())
}
