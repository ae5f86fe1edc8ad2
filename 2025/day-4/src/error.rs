use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum RollError {
    /// A cell that is neither a roll nor empty floor.
    #[error("unexpected {found:?} at row {row}, column {col}")]
    #[diagnostic(
        code(day_4::malformed),
        help("the grid may only contain '@' (roll) and '.' (empty)")
    )]
    Malformed { row: usize, col: usize, found: char },

    #[error("failed to read the grid")]
    #[diagnostic(code(day_4::io))]
    Io(#[from] std::io::Error),
}
