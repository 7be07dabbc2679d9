//! Binary to generate/update the `.expected` layout dumps in tests/fixtures
//!
//! Usage:
//!   cargo run --bin accept_expected            # Update all
//!   cargo run --bin accept_expected -- strings # Update only fixtures matching "strings"

use nb_student::{Style, dump_cell, layout_cell};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

fn main() {
    let filter: Option<String> = std::env::args().nth(1);
    let fixture_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    let style = Style::default();

    let mut updated = 0;
    let mut skipped = 0;

    for entry in WalkDir::new(&fixture_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "py"))
    {
        let path = entry.path();
        if let Some(ref f) = filter {
            if !path.to_string_lossy().contains(f.as_str()) {
                skipped += 1;
                continue;
            }
        }

        let source = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to read {:?}: {}", path, e);
                continue;
            }
        };

        let expected = path.with_extension("expected");
        match fs::write(&expected, dump_cell(&layout_cell(&source, &style))) {
            Ok(()) => updated += 1,
            Err(e) => eprintln!("Failed to write {:?}: {}", expected, e),
        }
    }

    println!("Updated {} files, skipped {}", updated, skipped);
}
