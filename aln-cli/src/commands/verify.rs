use crate::commands::scan::parse_capture;
use crate::read_input;
use anyhow::{bail, Result};
use colored::*;
use tracing::{info, warn};

/// Verify a capture; returns the number of recovered packets
///
/// Fails if any frame was dropped.
pub fn execute(input: &str, config_path: Option<&str>) -> Result<usize> {
    info!("Verifying capture: {}", input);

    let data = read_input(input)?;
    let (queue, stats) = parse_capture(&data, None, config_path)?;

    println!("\n=== Verification Results ===");
    println!("Frames started:     {}", stats.frames_started);
    println!(
        "Packets recovered:  {}",
        stats.frames_dispatched.to_string().green()
    );

    if !queue.discards.is_empty() {
        println!("\n=== Dropped Frames ===");
        for (i, reason) in queue.discards.iter().enumerate() {
            warn!("Dropped frame {}: {}", i, reason);
            println!("{} {}", "✗".red(), reason);
        }
    }

    if stats.control_words_corrected > 0 {
        println!(
            "{} {} control words repaired by FEC",
            "!".yellow(),
            stats.control_words_corrected
        );
    }

    println!("\n=== Summary ===");
    if queue.packets.is_empty() && queue.discards.is_empty() {
        println!("{} No frames found", "✗".red());
        bail!("No frames found in {}", input);
    }

    if queue.discards.is_empty() {
        println!("{} All frames valid", "✓".green());
        Ok(queue.packets.len())
    } else {
        println!(
            "{} {} of {} frames dropped",
            "✗".red(),
            queue.discards.len(),
            stats.frames_started
        );
        bail!("{} frames dropped", queue.discards.len())
    }
}
