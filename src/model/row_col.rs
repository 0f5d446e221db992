use std::fmt;

/// A zero-based (row, column) cell location in a partition.
/// Displays in A1 notation, so `RowCol(1, 9)` is `"J2"`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RowCol(pub usize, pub usize);

impl RowCol {
    pub const fn new(row: usize, col: usize) -> Self {
        Self(row, col)
    }

    pub fn row(&self) -> usize {
        self.0
    }

    pub fn col(&self) -> usize {
        self.1
    }

    /// The cell immediately to the right of this one.
    pub fn right(&self) -> Self {
        Self(self.0, self.1 + 1)
    }
}

/// Converts a zero-based column index to its letters: 0 -> A, 25 -> Z, 26 -> AA.
fn column_letters(col: usize) -> String {
    let mut n = col + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

impl fmt::Display for RowCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.1), self.0 + 1)
    }
}
