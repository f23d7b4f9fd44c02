//! Example: Headless replay of a recording
//!
//! Loads a CSV or JSON recording, replays it at a fixed pace, and writes one
//! JSON snapshot per reading to stdout. Ctrl+C stops the replay at the next
//! tick.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example headless_replay -- path/to/motor_data.csv 250ms
//! ```

use std::env;
use std::sync::Arc;

use motorwatch::data::duration::parse_duration;
use motorwatch::{FileSource, JsonLinesSink, ReadingSource, Replayer, SharedThresholds};

#[tokio::main]
async fn main() {
    let mut args = env::args().skip(1);
    let path = args.next().unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example headless_replay -- <recording.csv|json> [interval]");
        std::process::exit(1);
    });
    let interval = parse_duration(&args.next().unwrap_or_else(|| "1s".to_string()))
        .expect("invalid interval");

    let source = FileSource::load(&path).expect("failed to load recording");
    eprintln!("Replaying {} readings from {}", source.len(), path);

    let replayer = Arc::new(Replayer::new(
        Arc::new(source),
        SharedThresholds::default(),
        Box::new(JsonLinesSink::stdout()),
        60,
        tokio::runtime::Handle::current(),
    ));

    let on_ctrl_c = Arc::clone(&replayer);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.stop();
        }
    });

    replayer.start(interval);
    let state = replayer.wait().await;

    let status = replayer.status();
    eprintln!("Replay {} after {}/{} readings", state.label(), status.cursor, status.total);
    if let Some(err) = status.last_error {
        eprintln!("Error: {}", err);
    }
}
