//! # Seed Data Generator
//!
//! Populates a development database with sample tags and journal entries.
//!
//! ## Usage
//! ```bash
//! # Generate 200 entries (default)
//! cargo run -p skypass-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p skypass-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p skypass-db --bin seed -- --db ./data/skypass.db
//! ```
//!
//! ## Generated Entries
//! Each entry gets:
//! - A title built from a place and an activity
//! - One of the default categories
//! - A date walking back one day per entry from now
//! - Coordinates near the place (never zero, so entries validate)
//! - Up to three tags

use chrono::{Duration, Utc};
use std::env;

use skypass_core::{TravelEntry, DEFAULT_CATEGORIES};
use skypass_db::{Database, DbConfig};

/// Places with a rough (lat, lon) to scatter entries around.
const PLACES: &[(&str, f64, f64)] = &[
    ("Chamonix", 45.92, 6.87),
    ("Lisbon", 38.72, -9.14),
    ("Kyoto", 35.01, 135.77),
    ("Banff", 51.18, -115.57),
    ("Queenstown", -45.03, 168.66),
    ("Cusco", -13.53, -71.97),
    ("Reykjavik", 64.15, -21.94),
    ("Cape Town", -33.92, 18.42),
    ("Hallstatt", 47.56, 13.65),
    ("Moab", 38.57, -109.55),
];

const ACTIVITIES: &[&str] = &[
    "Morning hike",
    "Old town walk",
    "Coastal drive",
    "Lake loop",
    "Sunset viewpoint",
    "Market visit",
    "Ridge traverse",
    "Museum day",
];

/// Sample tags as `(name, color)`.
const TAGS: &[(&str, &str)] = &[
    ("Mountain", "#795548"),
    ("Lake", "#2196F3"),
    ("Food", "#FF5722"),
    ("Sunset", "#FFC107"),
    ("Friends", "#8BC34A"),
    ("Solo", "#607D8B"),
    ("Rain", "#9E9E9E"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./skypass_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Skypass Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of entries to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./skypass_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Skypass Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Entries:  {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let journal = db.journal();

    println!("✓ Connected to database");
    println!("✓ Schema ready ({:?})", db.schema_state());

    let existing = journal.count_entries().await?;
    if existing > 0 {
        println!("⚠ Database already has {} entries", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut tag_ids = Vec::with_capacity(TAGS.len());
    for (name, color) in TAGS {
        tag_ids.push(journal.create_tag(name, color).await?);
    }
    println!("✓ Created {} tags", tag_ids.len());

    println!();
    println!("Generating entries...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    for n in 0..count {
        let entry = generate_entry(n);
        let tags: Vec<i64> = (0..n % 4)
            .map(|k| tag_ids[(n + k * 3) % tag_ids.len()])
            .collect();

        if let Err(e) = journal.save_entry_with_tags(&entry, &tags).await {
            eprintln!("Failed to insert '{}': {}", entry.title, e);
            continue;
        }

        generated += 1;
        if generated % 50 == 0 {
            println!("  Generated {} entries...", generated);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} entries in {:?}", generated, elapsed);

    println!();
    for (name, _) in DEFAULT_CATEGORIES {
        let in_category = journal.count_entries_in_category(name).await?;
        println!("  {:<10} {}", name, in_category);
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Generates a single entry with plausible data.
fn generate_entry(seed: usize) -> TravelEntry {
    let (place, lat, lon) = PLACES[seed % PLACES.len()];
    let activity = ACTIVITIES[(seed / PLACES.len()) % ACTIVITIES.len()];
    let (category, _) = DEFAULT_CATEGORIES[seed % DEFAULT_CATEGORIES.len()];

    // Jitter within ~0.05 degrees so entries don't stack
    let jitter = ((seed * 37) % 100) as f64 / 2000.0;
    let date = Utc::now() - Duration::days(seed as i64);

    let distance = if seed % 3 == 0 {
        None
    } else {
        Some(((seed * 13) % 400) as f32 / 10.0 + 0.5)
    };

    TravelEntry::new(
        format!("{activity} in {place}"),
        format!("Day {} of the journal", seed + 1),
        date,
        lat + jitter,
        lon + jitter,
        ((seed * 29) % 360) as f32,
    )
    .with_category(category)
    .with_distance(distance)
}
