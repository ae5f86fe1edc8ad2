use std::io::BufRead;

use miette::*;

use crate::grid::RollMap;
use crate::peel::peel;

/// Rolls taken once removals have cascaded as far as they go.
pub fn solve(mut map: RollMap) -> usize {
    peel(&mut map).count()
}

#[tracing::instrument(skip(input))]
pub fn process(input: &str) -> Result<String> {
    let map = RollMap::parse(input)?;
    Ok(solve(map).to_string())
}

#[tracing::instrument(skip(reader))]
pub fn process_reader<R: BufRead>(reader: R) -> Result<String> {
    let map = RollMap::from_reader(reader)?;
    Ok(solve(map).to_string())
}
