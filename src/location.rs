// ABOUTME: Source location primitives shared by tokens and AST diagnostics

use std::fmt;

/// An inclusive column range within a single source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnRange {
    pub from: usize,
    pub to: usize,
}

impl ColumnRange {
    pub fn new(from: usize, to: usize) -> Self {
        ColumnRange { from, to }
    }
}

/// A 1-indexed line with an inclusive column range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub line: usize,
    pub range: ColumnRange,
}

impl Location {
    pub fn new(line: usize, from: usize, to: usize) -> Self {
        Location {
            line,
            range: ColumnRange::new(from, to),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.line, self.range.from, self.range.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let loc = Location::new(3, 4, 7);
        assert_eq!(format!("{}", loc), "3:4-7");
    }
}
