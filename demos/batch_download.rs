//! Batch download example
//!
//! This example demonstrates the core functionality of audio-dl:
//! - Locating yt-dlp and ffmpeg from the configuration
//! - Parsing free text into inputs
//! - Reporting progress and result lines
//! - Saving the produced archive
//!
//! Usage: `cargo run --example batch_download -- <url> [<url> ...]`

use audio_dl::config::{Config, PipelineConfig};
use audio_dl::{Pipeline, parse_inputs};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let text = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let inputs = parse_inputs(&text);
    if inputs.is_empty() {
        eprintln!("usage: batch_download <url> [<url> ...]");
        return Ok(());
    }

    let config = Config {
        pipeline: PipelineConfig {
            concurrency: 5,
            item_timeout: Some(Duration::from_secs(600)),
            ..Default::default()
        },
        ..Default::default()
    };

    let pipeline = Pipeline::from_config(config)?;

    // Ctrl+C abandons whatever is still in flight
    let cancel = pipeline.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let progress = |done: usize, total: usize| {
        println!("[{:>3}%] {}/{}", done * 100 / total, done, total);
    };
    let output = pipeline.run(&inputs, &progress).await?;

    for line in output.result_lines() {
        println!("{}", line);
    }

    let archive = output.archive?;
    std::fs::write(&archive.file_name, &archive.bytes)?;
    println!(
        "Saved {} ({} files, {} bytes)",
        archive.file_name,
        archive.entries.len(),
        archive.bytes.len()
    );
    for path in &archive.skipped {
        eprintln!("Could not pack {}", path.display());
    }

    Ok(())
}
