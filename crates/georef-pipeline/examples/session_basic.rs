//! Basic example demonstrating the session API for georeferencing a map scan.
//!
//! This example shows:
//! - Creating a session and recording image dimensions
//! - Adding calibration pairs
//! - Pre-filling real-world coordinates for a new click
//! - Editing a point through its stable id
//! - Checkpointing state to JSON
//! - Exporting a selection as CSV
//!
//! Run with: cargo run --example session_basic

use georef_core::{ImageInfo, ImagePt, RealPt, ViewScale};
use georef_pipeline::GeorefSession;

fn main() -> anyhow::Result<()> {
    println!("=== Session API Example ===\n");

    // Step 1: Create session
    let mut session = GeorefSession::with_description("Harbour survey, sheet 4");
    let image = ImageInfo::with_source(4000, 3000, "harbour.jpg");
    let view = ViewScale::fit(&image, 1200.0, 800.0).unwrap_or_default();
    session.set_image(image);
    println!("✓ Created session, display scale {:.3}", view.scale);

    // Step 2: Three landmarks clicked on the display, typed in as lon/lat
    let clicks = [
        ((30.0, 30.0), RealPt::new(-8.6200, 41.1500)),
        ((1170.0, 45.0), RealPt::new(-8.5800, 41.1495)),
        ((60.0, 780.0), RealPt::new(-8.6195, 41.1300)),
    ];
    for ((dx, dy), real) in clicks {
        let id = session.add_point(view.to_image(dx, dy), real)?;
        println!("  added {id}: {real}");
    }

    // Step 3: A fourth click gets a pre-filled estimate
    let click = view.to_image(600.0, 400.0);
    match session.estimate_real(click) {
        Some(real) => println!("\nEstimate for {click}: ({:.6}, {:.6})", real.x, real.y),
        None => println!("\nNo transform yet"),
    }

    // Step 4: Fix a typo in the second landmark
    let id = session.begin_edit(1)?;
    session.finish_edit(RealPt::new(-8.5810, 41.1495))?;
    println!("✓ Edited {id}");

    // Step 5: Checkpoint
    let json = session.to_json()?;
    let restored = GeorefSession::from_json(&json)?;
    println!("✓ Checkpoint round trip: {} points", restored.points().len());

    // Step 6: Export the first and last points
    let mut csv = Vec::new();
    let rows = session.export_csv_indices(&mut csv, [0, 2])?;
    println!("\nExported {rows} rows:\n{}", String::from_utf8(csv)?);

    Ok(())
}
