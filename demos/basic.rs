//! Basic usage example for seglog.
//!
//! Run with: cargo run --example basic

use seglog::{Log, Options, Position};
use tempfile::TempDir;

fn main() -> seglog::Result<()> {
    // Create a temporary directory for the log
    let dir = TempDir::new().expect("failed to create temp dir");

    // Open the log
    let log = Log::open(Options::new(dir.path()))?;
    println!("Log opened at {}", dir.path().display());

    // Write some entries; each returns a durable position
    let pos1 = log.write(b"first entry")?;
    let pos2 = log.write(b"second entry")?;
    let pos3 = log.write(b"third entry")?;
    println!("Wrote 3 entries");
    println!("  pos1 = {}", pos1.encode_hex());
    println!("  pos2 = {}", pos2.encode_hex());
    println!("  pos3 = {}", pos3.encode_hex());

    // Make them durable
    log.sync()?;

    // Read them back in any order
    println!("read(pos2) = {:?}", String::from_utf8_lossy(&log.read(pos2)?));
    println!("read(pos1) = {:?}", String::from_utf8_lossy(&log.read(pos1)?));
    println!("read(pos3) = {:?}", String::from_utf8_lossy(&log.read(pos3)?));

    // Positions round-trip through their hex form, e.g. for log lines
    // or handing to another process
    let hex = pos2.encode_hex();
    let decoded = Position::decode_hex(&hex)?;
    assert_eq!(&log.read(decoded)?[..], b"second entry");
    println!("Hex-decoded position reads the same entry");

    log.close()?;
    println!("Log closed");
    Ok(())
}
