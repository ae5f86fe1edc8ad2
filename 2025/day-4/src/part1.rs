use std::io::BufRead;

use miette::*;

use crate::grid::RollMap;
use crate::peel::ACCESS_THRESHOLD;

/// Rolls reachable straight away, before anything is removed.
pub fn solve(map: &RollMap) -> usize {
    map.rolls()
        .iter()
        .filter(|roll| roll.degree() < ACCESS_THRESHOLD)
        .count()
}

#[tracing::instrument(skip(input))]
pub fn process(input: &str) -> Result<String> {
    let map = RollMap::parse(input)?;
    Ok(solve(&map).to_string())
}

#[tracing::instrument(skip(reader))]
pub fn process_reader<R: BufRead>(reader: R) -> Result<String> {
    let map = RollMap::from_reader(reader)?;
    Ok(solve(&map).to_string())
}
