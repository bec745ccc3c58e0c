//! Cell address and range types

use crate::error::{Error, Result};
use lazy_regex::regex_captures;
use std::fmt;
use std::str::FromStr;

/// Largest 1-based row number or column ordinal, so that every `u32` index
/// has a textual form
const MAX_ORDINAL: u64 = u32::MAX as u64 + 1;

/// A cell address (e.g., "A1", "AA100")
///
/// Rows and columns are zero-based internally. The textual form uses Excel's
/// bijective base-26 column letters followed by the 1-based row number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., Z=25, AA=26)
    pub col: u32,
}

impl CellAddress {
    /// Create a new cell address from 0-based indices
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// Letters are case-insensitive. Anything other than one or more letters
    /// followed by one or more digits is rejected.
    ///
    /// # Examples
    /// ```
    /// use gridcalc_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("b3").unwrap();
    /// assert_eq!(addr.row, 2);
    /// assert_eq!(addr.col, 1);
    ///
    /// assert!(CellAddress::parse("3B").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let Some((_, letters, digits)) = regex_captures!(r"^([A-Za-z]+)([0-9]+)$", s) else {
            return Err(Error::InvalidAddress(format!(
                "'{}' does not match [A-Za-z]+[0-9]+",
                s
            )));
        };

        let col = Self::letters_to_column(letters)?;

        // Rows are 1-based in text, so row u32::MAX is written 4294967296
        let row = match digits.parse::<u64>() {
            Ok(0) => {
                return Err(Error::InvalidAddress(format!(
                    "row number must be >= 1 in '{}'",
                    s
                )))
            }
            Ok(row) if row <= MAX_ORDINAL => row - 1,
            _ => {
                return Err(Error::InvalidAddress(format!(
                    "row number too large in '{}'",
                    s
                )))
            }
        };

        Ok(Self {
            row: row as u32,
            col,
        })
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u32) -> String {
        let mut result = String::new();
        let mut n = col as u64 + 1; // 1-based for calculation

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u64 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u64 - 'A' as u64 + 1);
            if col > MAX_ORDINAL {
                return Err(Error::InvalidAddress(format!(
                    "column '{}' is too large",
                    letters
                )));
            }
        }

        Ok((col - 1) as u32)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row as u64 + 1)
    }

    /// Create a range from this address to another
    pub fn to(&self, other: CellAddress) -> CellRange {
        CellRange::new(*self, other)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// An inclusive rectangle of cells (e.g., "A1:B10")
///
/// The corners are kept exactly as written. A range whose end lies before its
/// start on either axis contains no cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Start corner as written
    pub start: CellAddress,
    /// End corner as written
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range without normalizing the corners
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        Self { start, end }
    }

    /// True when the end lies before the start on either axis
    pub fn is_empty(&self) -> bool {
        self.end.row < self.start.row || self.end.col < self.start.col
    }

    /// Check if a cell is within this range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.col >= self.start.col
            && addr.col <= self.end.col
    }

    /// Number of rows in the range (0 when empty)
    pub fn row_count(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.end.row - self.start.row) as u64 + 1
        }
    }

    /// Number of columns in the range (0 when empty)
    pub fn col_count(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.end.col - self.start.col) as u64 + 1
        }
    }

    /// Total number of cells in the range
    pub fn cell_count(&self) -> u64 {
        self.row_count() * self.col_count()
    }

    /// Iterate over all cell addresses in the range (row by row)
    pub fn cells(&self) -> CellRangeIterator {
        CellRangeIterator {
            range: *self,
            current_row: self.start.row as u64,
            current_col: self.start.col as u64,
            remaining: self.cell_count(),
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Iterator over cells in a range, in row-major order
#[derive(Debug, Clone)]
pub struct CellRangeIterator {
    range: CellRange,
    current_row: u64,
    current_col: u64,
    remaining: u64,
}

impl Iterator for CellRangeIterator {
    type Item = CellAddress;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let addr = CellAddress::new(self.current_row as u32, self.current_col as u32);
        self.remaining -= 1;

        // Move to next cell
        self.current_col += 1;
        if self.current_col > self.range.end.col as u64 {
            self.current_col = self.range.start.col as u64;
            self.current_row += 1;
        }

        Some(addr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(CellAddress::column_to_letters(0), "A");
        assert_eq!(CellAddress::column_to_letters(1), "B");
        assert_eq!(CellAddress::column_to_letters(25), "Z");
        assert_eq!(CellAddress::column_to_letters(26), "AA");
        assert_eq!(CellAddress::column_to_letters(27), "AB");
        assert_eq!(CellAddress::column_to_letters(701), "ZZ");
        assert_eq!(CellAddress::column_to_letters(702), "AAA");
    }

    #[test]
    fn test_letters_to_column() {
        assert_eq!(CellAddress::letters_to_column("A").unwrap(), 0);
        assert_eq!(CellAddress::letters_to_column("Z").unwrap(), 25);
        assert_eq!(CellAddress::letters_to_column("AA").unwrap(), 26);
        assert_eq!(CellAddress::letters_to_column("ZZ").unwrap(), 701);
        assert_eq!(CellAddress::letters_to_column("AAA").unwrap(), 702);

        // Case insensitive
        assert_eq!(CellAddress::letters_to_column("aa").unwrap(), 26);

        assert!(CellAddress::letters_to_column("").is_err());
        assert!(CellAddress::letters_to_column("ZZZZZZZZZ").is_err());
    }

    #[test]
    fn test_cell_address_parse() {
        let addr = CellAddress::parse("A1").unwrap();
        assert_eq!(addr, CellAddress::new(0, 0));

        let addr = CellAddress::parse("aa100").unwrap();
        assert_eq!(addr, CellAddress::new(99, 26));
    }

    #[test]
    fn test_cell_address_parse_errors() {
        assert!(CellAddress::parse("").is_err());
        assert!(CellAddress::parse("A").is_err());
        assert!(CellAddress::parse("1").is_err());
        assert!(CellAddress::parse("1A").is_err());
        assert!(CellAddress::parse("A0").is_err());
        assert!(CellAddress::parse(" A1").is_err());
        assert!(CellAddress::parse("$A$1").is_err());
        assert!(CellAddress::parse("A99999999999").is_err());
        assert!(CellAddress::parse("A4294967297").is_err());

        let err = CellAddress::parse("B-2").unwrap_err();
        assert!(matches!(err, Error::InvalidAddress(_)));
    }

    #[test]
    fn test_extreme_addresses_round_trip() {
        let corner = CellAddress::new(u32::MAX, u32::MAX);
        let text = corner.to_string();
        assert!(text.ends_with("4294967296"));
        assert_eq!(CellAddress::parse(&text).unwrap(), corner);

        let range = CellRange::new(CellAddress::new(0, 0), CellAddress::new(u32::MAX, 0));
        assert_eq!(range.row_count(), 1 << 32);
        assert_eq!(range.cell_count(), 1 << 32);
    }

    #[test]
    fn test_cell_address_display() {
        assert_eq!(CellAddress::new(0, 0).to_string(), "A1");
        assert_eq!(CellAddress::new(99, 2).to_string(), "C100");
        assert_eq!("ab12".parse::<CellAddress>().unwrap().to_string(), "AB12");
    }

    #[test]
    fn test_cell_range_iterator() {
        let range = CellAddress::new(0, 0).to(CellAddress::new(1, 1));
        let cells: Vec<_> = range.cells().collect();

        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0], CellAddress::new(0, 0)); // A1
        assert_eq!(cells[1], CellAddress::new(0, 1)); // B1
        assert_eq!(cells[2], CellAddress::new(1, 0)); // A2
        assert_eq!(cells[3], CellAddress::new(1, 1)); // B2
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let range = CellRange::new(CellAddress::new(3, 0), CellAddress::new(1, 0));
        assert!(range.is_empty());
        assert_eq!(range.cells().count(), 0);
        assert_eq!(range.cell_count(), 0);

        let range = CellRange::new(CellAddress::new(0, 2), CellAddress::new(5, 1));
        assert_eq!(range.cells().count(), 0);
        assert!(!range.contains(&CellAddress::new(1, 1)));
    }

    #[test]
    fn test_cell_range_contains() {
        let range = CellRange::new(CellAddress::new(1, 1), CellAddress::new(3, 3));

        assert!(range.contains(&CellAddress::new(1, 1)));
        assert!(range.contains(&CellAddress::new(2, 2)));
        assert!(!range.contains(&CellAddress::new(0, 0)));
        assert!(!range.contains(&CellAddress::new(4, 1)));
        assert_eq!(range.to_string(), "B2:D4");
    }

    proptest! {
        #[test]
        fn address_round_trips(row in 0u32..2_000_000, col in 0u32..100_000) {
            let addr = CellAddress::new(row, col);
            prop_assert_eq!(CellAddress::parse(&addr.to_string()).unwrap(), addr);
        }

        #[test]
        fn address_round_trips_at_any_index(row in any::<u32>(), col in any::<u32>()) {
            let addr = CellAddress::new(row, col);
            prop_assert_eq!(CellAddress::parse(&addr.to_string()).unwrap(), addr);
        }

        #[test]
        fn column_letters_are_bijective(col in 0u32..1_000_000) {
            let letters = CellAddress::column_to_letters(col);
            prop_assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
            prop_assert_eq!(CellAddress::letters_to_column(&letters).unwrap(), col);
        }
    }
}
