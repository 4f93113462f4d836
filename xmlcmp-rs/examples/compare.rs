//! Example: Compare two XML documents ignoring element order
//!
//! Prints the difference report and exits non-zero when the documents
//! differ.
//!
//! Usage: cargo run --example compare <control.xml> <test.xml>

use std::env;

use xmlcmp::{CompareOptions, XmlComparer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 3 {
        eprintln!("Usage: {} <control.xml> <test.xml>", args[0]);
        std::process::exit(1);
    }

    let control_file = &args[1];
    let test_file = &args[2];

    let comparer = XmlComparer::with_options(CompareOptions::default());

    eprintln!("Comparing {} with {}", control_file, test_file);
    let result = comparer.compare_resources(control_file, test_file)?;

    print!("{}", result.report());
    if !result.is_equivalent() {
        std::process::exit(1);
    }

    Ok(())
}
