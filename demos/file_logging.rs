//! File logging example
//!
//! Demonstrates logging to the console and to text and JSON files at once.
//!
//! Run with: cargo run --example file_logging --features file

use sawmill::handlers::{FileHandler, StandardStreamsHandler};
use sawmill::prelude::*;

fn main() -> Result<()> {
    println!("=== Sawmill - File Logging Example ===\n");

    let logger = Logger::builder()
        .handler("console", StandardStreamsHandler::new())
        .handler("file", FileHandler::append("application.log")?)
        .handler(
            "json",
            FileHandler::append("application.jsonl")?.with_output_format(OutputFormat::Json),
        )
        .build()?;

    println!("1. Logging to console and files:");

    logger.info("Application started", &());
    logger.debug("Loading configuration...", &fields! { "path" => "/etc/app.toml" });
    logger.warning("Using default settings for some options", &());
    logger.info("Database connection established", &fields! { "pool" => 8 });
    logger.error(
        "Failed to load optional plugin",
        &fields! { "plugin" => "metrics", "cause" => std::io::Error::other("not installed") },
    );

    println!("\n2. Performing some operations:");

    for i in 1..=5 {
        logger.info(format!("Processing item {}/5", i), &fields! { "item" => i });
        if i == 3 {
            logger.warning("Item 3 took longer than expected", &fields! { "ms" => 1250 });
        }
    }

    // Drains every handler before returning.
    logger.stop();

    println!("\n=== Example completed successfully! ===");
    println!("Check 'application.log' and 'application.jsonl' for the file output");

    Ok(())
}
