use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::io::BufRead;

use chumsky::prelude::*;
use rayon::prelude::*;

use crate::error::RollError;

pub const ROLL: char = '@';
pub const EMPTY: char = '.';

/// A cell coordinate, `row` counted from the top and `col` from the left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Cells that may hold a neighbouring roll.
    ///
    /// Rows and columns never go negative, so cells above or left of the
    /// first row/column are only named when they exist.
    pub fn adjacent(self) -> Vec<Position> {
        let Position { row: r, col: c } = self;
        let mut cells = Vec::with_capacity(8);
        cells.push(Position::new(r + 1, c + 1));
        cells.push(Position::new(r, c + 1));
        cells.push(Position::new(r + 1, c));
        if r > 0 {
            cells.push(Position::new(r - 1, c));
            cells.push(Position::new(r - 1, c + 1));
        }
        if c > 0 {
            cells.push(Position::new(r, c - 1));
            cells.push(Position::new(r + 1, c - 1));
        }
        if r > 0 && c > 0 {
            cells.push(Position::new(r - 1, c - 1));
        }
        cells
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Clone, Debug)]
pub struct Roll {
    position: Position,
    // Indices into `RollMap::rolls`
    pub(crate) neighbors: BTreeSet<usize>,
    pub(crate) removed: bool,
}

impl Roll {
    fn new(position: Position) -> Self {
        Self {
            position,
            neighbors: BTreeSet::new(),
            removed: false,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn neighbors(&self) -> &BTreeSet<usize> {
        &self.neighbors
    }

    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// Every roll of the input, linked to the rolls around it.
#[derive(Clone, Debug)]
pub struct RollMap {
    rows: usize,
    cols: usize,
    pub(crate) rolls: Vec<Roll>,
    index: HashMap<Position, usize>,
}

/// Parses a single row, `true` for a roll and `false` for empty floor.
fn row_parser<'a>() -> impl Parser<'a, &'a str, Vec<bool>, extra::Err<Rich<'a, char>>> {
    let cell = just(ROLL).to(true).or(just(EMPTY).to(false));

    cell.repeated().collect::<Vec<_>>().then_ignore(end())
}

fn parse_row(row: usize, line: &str) -> Result<Vec<Position>, RollError> {
    let cells = row_parser().parse(line).into_result().map_err(|errors| {
        // Only '@' and '.' precede the failure, so the byte offset is the column.
        let col = errors.first().map(|e| e.span().start).unwrap_or_default();
        let found = line
            .get(col..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        RollError::Malformed { row, col, found }
    })?;

    Ok(cells
        .into_iter()
        .enumerate()
        .filter(|&(_, is_roll)| is_roll)
        .map(|(col, _)| Position::new(row, col))
        .collect())
}

impl RollMap {
    pub fn parse(input: &str) -> Result<Self, RollError> {
        let lines: Vec<&str> = input.lines().collect();
        Self::from_lines(&lines)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, RollError> {
        let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;
        Self::from_lines(&lines)
    }

    pub fn from_lines<S>(lines: &[S]) -> Result<Self, RollError>
    where
        S: AsRef<str> + Sync,
    {
        let mut map = Self::load(lines)?;
        map.link_neighbors();

        tracing::debug!(
            rows = map.rows,
            cols = map.cols,
            rolls = map.len(),
            links = map.link_count(),
            "loaded roll map"
        );
        Ok(map)
    }

    /// Collects the rolls of every row, one parallel task per row.
    fn load<S>(lines: &[S]) -> Result<Self, RollError>
    where
        S: AsRef<str> + Sync,
    {
        let per_row = lines
            .par_iter()
            .enumerate()
            .map(|(row, line)| parse_row(row, line.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let rolls: Vec<Roll> = per_row.into_iter().flatten().map(Roll::new).collect();
        let index = rolls
            .iter()
            .enumerate()
            .map(|(idx, roll)| (roll.position, idx))
            .collect();

        Ok(Self {
            rows: lines.len(),
            cols: lines.iter().map(|l| l.as_ref().len()).max().unwrap_or(0),
            rolls,
            index,
        })
    }

    /// Links every pair of rolls that touch, in both directions.
    fn link_neighbors(&mut self) {
        for idx in 0..self.rolls.len() {
            let position = self.rolls[idx].position;
            for cell in position.adjacent() {
                let Some(&other) = self.index.get(&cell) else {
                    continue;
                };
                self.rolls[idx].neighbors.insert(other);
                self.rolls[other].neighbors.insert(idx);
            }
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.rolls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rolls.is_empty()
    }

    pub fn rolls(&self) -> &[Roll] {
        &self.rolls
    }

    pub fn get(&self, position: Position) -> Option<&Roll> {
        self.index.get(&position).map(|&idx| &self.rolls[idx])
    }

    /// Number of undirected neighbour links.
    pub fn link_count(&self) -> usize {
        self.rolls.iter().map(Roll::degree).sum::<usize>() / 2
    }

    /// Neighbours of `idx` that have not been removed yet.
    pub fn live_neighbors(&self, idx: usize) -> usize {
        self.rolls[idx]
            .neighbors
            .iter()
            .filter(|&&n| !self.rolls[n].removed)
            .count()
    }

    pub fn removed_count(&self) -> usize {
        self.rolls.iter().filter(|r| r.removed).count()
    }

    /// Puts every roll back, keeping the links.
    pub fn reset(&mut self) {
        for roll in &mut self.rolls {
            roll.removed = false;
        }
    }
}

impl fmt::Display for RollMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            let line: String = (0..self.cols)
                .map(|col| match self.get(Position::new(row, col)) {
                    Some(roll) if roll.removed => 'x',
                    Some(_) => ROLL,
                    None => EMPTY,
                })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use miette::Result;
    use rstest::rstest;
    use std::io::{self, BufReader, Read};

    const EXAMPLE: &str = "..@@.@@@@.
@@@.@.@.@@
@@@@@.@.@@
@.@@@@..@.
@@.@@@@.@@
.@@@@@@@.@
.@.@.@.@@@
@.@@@.@@@@
.@@@@@@@@.
@.@.@@@.@.";

    #[test]
    fn loads_roll_positions() -> Result<()> {
        let map = RollMap::parse(".@\n@.\n")?;
        let positions: Vec<_> = map.rolls().iter().map(Roll::position).collect();
        assert_eq!(vec![Position::new(0, 1), Position::new(1, 0)], positions);
        assert_eq!((2, 2), (map.rows(), map.cols()));
        Ok(())
    }

    #[test]
    fn blank_lines_keep_row_numbers() -> Result<()> {
        let map = RollMap::parse("@\n\n@\r\n")?;
        assert_eq!(3, map.rows());
        assert!(map.get(Position::new(2, 0)).is_some());
        assert_eq!(0, map.link_count());
        Ok(())
    }

    #[rstest]
    #[case("@@#@", 0, 2, '#')]
    #[case("....\n..@x", 1, 3, 'x')]
    #[case("@.\n.@\n é", 2, 0, ' ')]
    #[case("@.\n.é", 1, 1, 'é')]
    fn rejects_unknown_cells(
        #[case] input: &str,
        #[case] row: usize,
        #[case] col: usize,
        #[case] found: char,
    ) {
        let err = RollMap::parse(input).unwrap_err();
        assert!(
            matches!(
                err,
                RollError::Malformed { row: r, col: c, found: f } if r == row && c == col && f == found
            ),
            "unexpected error: {err:?}"
        );
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn surfaces_read_failures() {
        let err = RollMap::from_reader(BufReader::new(Broken)).unwrap_err();
        assert!(matches!(err, RollError::Io(_)));
    }

    #[test]
    fn reads_from_a_buffer() -> Result<()> {
        let map = RollMap::from_reader(EXAMPLE.as_bytes())?;
        assert_eq!(71, map.len());
        Ok(())
    }

    #[rstest]
    #[case(Position::new(0, 0), 3)]
    #[case(Position::new(0, 4), 5)]
    #[case(Position::new(3, 0), 5)]
    #[case(Position::new(2, 7), 8)]
    fn candidate_cells_near_edges(#[case] position: Position, #[case] expected: usize) {
        let cells = position.adjacent();
        assert_eq!(expected, cells.len());
        assert!(!cells.contains(&position));
    }

    #[rstest]
    #[case(EXAMPLE)]
    #[case("@@\n@@")]
    #[case("@@@@@\n@@@@@\n@@@@@\n@@@@@\n@@@@@")]
    #[case("@.@\n.@.\n@.@")]
    fn links_are_symmetric(#[case] input: &str) -> Result<()> {
        let map = RollMap::parse(input)?;
        for (idx, roll) in map.rolls().iter().enumerate() {
            assert!(!roll.neighbors().contains(&idx));
            for &other in roll.neighbors() {
                assert!(
                    map.rolls()[other].neighbors().contains(&idx),
                    "{} lists {} but not the other way round",
                    roll.position(),
                    map.rolls()[other].position()
                );
            }
        }
        Ok(())
    }

    #[test]
    fn links_every_touching_pair() -> Result<()> {
        let map = RollMap::parse("@@@\n@@@\n@@@")?;
        let centre = map.get(Position::new(1, 1)).map(Roll::degree);
        let corner = map.get(Position::new(2, 2)).map(Roll::degree);
        assert_eq!(Some(8), centre);
        assert_eq!(Some(3), corner);
        // 12 orthogonal + 8 diagonal
        assert_eq!(20, map.link_count());
        Ok(())
    }

    #[test]
    fn renders_removed_rolls() -> Result<()> {
        let mut map = RollMap::parse("@.\n@@")?;
        map.rolls[0].removed = true;
        assert_eq!("x.\n@@\n", map.to_string());
        map.reset();
        assert_eq!("@.\n@@\n", map.to_string());
        Ok(())
    }
}
