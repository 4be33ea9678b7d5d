//! Example: load a table and print every validation error.
//!
//! Usage:
//!   cargo run --example validate -- <file_path> [rules.json]
//!
//! Set `RUST_LOG=sift=debug` to see the sniffing and reading steps.

use std::env;
use std::fs;
use std::path::Path;

use sift::{Options, Sift};
use tracing_subscriber::EnvFilter;

fn main() -> sift::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example validate -- <file_path> [rules.json]");
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);
    let options = match args.get(2) {
        Some(rules) => {
            let json = fs::read_to_string(rules).map_err(|e| sift::SiftError::Io {
                path: rules.into(),
                source: e,
            })?;
            Options::from_json(&json)?
        }
        None => Options::default(),
    };

    let sift = Sift::from_file(path, options)?;

    let source = sift.source();
    println!(
        "{}: {} rows, {} columns, delimiter {:?}",
        path.display(),
        sift.row_count(),
        sift.column_count(),
        source.delimiter
    );
    println!("Header: {}", sift.header().join(", "));

    let records = sift.errors(None, None);
    if records.is_empty() {
        println!("No errors.");
        return Ok(());
    }

    println!("\n{} errors:", records.len());
    for record in records {
        println!("  [{}] {:?}: {}", record.row, record.field, record.message);
    }

    Ok(())
}
