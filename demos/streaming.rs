//! Streaming read example for seglog.
//!
//! Writes enough entries to rotate across several segments, then streams
//! everything back with a reader.
//!
//! Run with: cargo run --example streaming

use seglog::{Log, OptionsBuilder};
use std::time::Duration;
use tempfile::TempDir;

fn main() -> seglog::Result<()> {
    let dir = TempDir::new().expect("failed to create temp dir");

    // A tiny segment size so rotation is visible
    let log = Log::open(
        OptionsBuilder::new(dir.path())
            .segment_size(256)
            .sync_interval(Duration::from_millis(100))
            .build()?,
    )?;

    let first = log.write(b"event 0")?;
    let mut last_segment = first.segment_id;
    let mut rotations = 0;
    for i in 1..20 {
        let data = format!("event {}", i);
        let pos = log.write(data.as_bytes())?;
        if pos.segment_id != last_segment {
            rotations += 1;
            last_segment = pos.segment_id;
        }
    }
    log.sync()?;
    println!("rotated {} times while writing", rotations);

    // Stream from the first entry across all segments
    let reader = log.reader(first)?;
    let mut count = 0;
    while let Some(entry) = reader.next_entry()? {
        println!("{}", String::from_utf8_lossy(&entry));
        count += 1;
    }
    println!("streamed {} entries", count);

    log.close()?;
    Ok(())
}
