use std::fs::File;
use std::io::BufReader;

use miette::*;

use aoc2025_day_4::part2;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "input2.txt".to_string());
    let file = File::open(&path)
        .into_diagnostic()
        .wrap_err_with(|| format!("opening {path}"))?;
    let result = part2::process_reader(BufReader::new(file))?;
    println!("Result: {}", result);
    Ok(())
}
