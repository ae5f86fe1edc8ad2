pub mod error;
pub mod grid;
pub mod peel;
pub mod part1;
pub mod part2;
