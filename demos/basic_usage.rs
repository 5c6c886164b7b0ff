//! Basic logger usage example
//!
//! Demonstrates console logging at every level, structured fields, a
//! severity band per handler and sync points.
//!
//! Run with: cargo run --example basic_usage

use sawmill::handlers::StandardStreamsHandler;
use sawmill::prelude::*;
use sawmill::{info, warning};
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Sawmill - Basic Usage Example ===\n");

    let logger = Logger::builder()
        .handler("console", StandardStreamsHandler::new())
        .build()?;

    println!("1. Logging at different levels:");
    logger.emergency("This is an emergency message", &());
    logger.alert("This is an alert message", &());
    logger.critical("This is a critical message", &());
    logger.error("This is an error message", &());
    logger.warning("This is a warning message", &());
    logger.notice("This is a notice message", &());
    logger.info("This is an info message", &());
    let id = logger.debug("This is a debug message", &());
    logger.sync(id);

    println!("\n2. Structured fields:");
    let id = logger.info(
        "user logged in",
        &fields! { "user" => "alice", "roles" => vec!["admin", "ops"], "mfa" => true },
    );
    logger.sync(id);

    let port = 8080;
    info!(logger, { "port" => port }, "listening on {}", port);
    let id = warning!(logger, "retry {} of {}", 2, 5);
    logger.sync(id);

    println!("\n3. A handler restricted to Warning and above:");
    let severe = Arc::new(CaptureHandler::new());
    logger.add_handler_with(
        "severe",
        Arc::clone(&severe),
        HandlerConfig::new().threshold(Level::Warning),
    )?;
    logger.info("not captured", &());
    let id = logger.error("captured", &fields! { "code" => 500 });
    logger.sync(id);
    println!("   captured {} event(s): {:?}", severe.len(), severe.last().map(|e| e.message));

    logger.stop();
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
