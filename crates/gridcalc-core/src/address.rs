//! Cell address type
//!
//! Coordinates are zero-based on both axes. The text form is base-26 column
//! letters with no zero digit (A=0, Z=25, AA=26) followed by the plain decimal
//! row index, so the top-left cell is `A0`.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Prefix used for cell identifiers in wire contexts (`cell-A0`)
pub const WIRE_PREFIX: &str = "cell-";

/// One of the two grid axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Column,
    Row,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Column => f.write_str("column"),
            Axis::Row => f.write_str("row"),
        }
    }
}

/// A cell coordinate (e.g. "A0", "B12")
///
/// Ordering is column-major: all of column A sorts before column B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    /// Column index (0-based, A=0, B=1, ..., AA=26)
    pub column: u32,
    /// Row index (0-based, written as-is)
    pub row: u32,
}

impl CellAddress {
    /// Create a new cell address
    pub fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Check whether `text` has the shape of a coordinate (`[A-Z]+[0-9]+`)
    ///
    /// A matching string can still fail [`CellAddress::parse`] when one of the
    /// axes overflows.
    pub fn is_address(text: &str) -> bool {
        lazy_regex::regex_is_match!(r"^[A-Z]+[0-9]+$", text)
    }

    /// Parse a cell address from its canonical text form
    ///
    /// # Examples
    /// ```
    /// use gridcalc_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("A0").unwrap();
    /// assert_eq!((addr.column, addr.row), (0, 0));
    ///
    /// let addr = CellAddress::parse("AA7").unwrap();
    /// assert_eq!((addr.column, addr.row), (26, 7));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        let mut pos = 0;

        while pos < bytes.len() && bytes[pos].is_ascii_uppercase() {
            pos += 1;
        }
        if pos == 0 {
            return Err(Error::invalid_address(s, Axis::Column, "letters are missing"));
        }
        let column = Self::letters_to_column(&s[..pos])
            .ok_or_else(|| Error::invalid_address(s, Axis::Column, "letters overflow 32 bits"))?;

        let row_str = &s[pos..];
        if row_str.is_empty() {
            return Err(Error::invalid_address(s, Axis::Row, "number is missing"));
        }
        if let Some(c) = row_str.chars().find(|c| !c.is_ascii_digit()) {
            return Err(Error::invalid_address(
                s,
                Axis::Row,
                format!("contains unexpected character {c:?}"),
            ));
        }
        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::invalid_address(s, Axis::Row, "number does not fit in 32 bits"))?;

        Ok(Self { column, row })
    }

    /// Parse a coordinate that may carry the `cell-` wire prefix
    pub fn parse_wire(s: &str) -> Result<Self> {
        Self::parse(s.strip_prefix(WIRE_PREFIX).unwrap_or(s))
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(column: u32) -> String {
        let mut result = String::new();
        let mut n = column as u64 + 1; // 1-based for calculation

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    ///
    /// Returns `None` for anything that is not a run of `A-Z` or that does not
    /// fit in a `u32`.
    pub fn letters_to_column(letters: &str) -> Option<u32> {
        if letters.is_empty() {
            return None;
        }

        let mut acc: u64 = 0;
        for b in letters.bytes() {
            if !b.is_ascii_uppercase() {
                return None;
            }
            acc = acc.checked_mul(26)?.checked_add((b - b'A') as u64 + 1)?;
            if acc > u32::MAX as u64 + 1 {
                return None;
            }
        }

        u32::try_from(acc - 1).ok()
    }

    /// Format with the `cell-` wire prefix
    pub fn wire_id(&self) -> String {
        format!("{WIRE_PREFIX}{self}")
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::column_to_letters(self.column), self.row)
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
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
        assert_eq!(CellAddress::letters_to_column("A"), Some(0));
        assert_eq!(CellAddress::letters_to_column("Z"), Some(25));
        assert_eq!(CellAddress::letters_to_column("AA"), Some(26));
        assert_eq!(CellAddress::letters_to_column("ZZ"), Some(701));
        assert_eq!(CellAddress::letters_to_column("AAA"), Some(702));
        assert_eq!(CellAddress::letters_to_column("a"), None);
        assert_eq!(CellAddress::letters_to_column(""), None);
        assert_eq!(CellAddress::letters_to_column(&"Z".repeat(8)), None);
    }

    #[test]
    fn test_max_column_round_trips() {
        let letters = CellAddress::column_to_letters(u32::MAX);
        assert_eq!(CellAddress::letters_to_column(&letters), Some(u32::MAX));
    }

    #[test]
    fn test_cell_address_parse() {
        assert_eq!(CellAddress::parse("A0").unwrap(), CellAddress::new(0, 0));
        assert_eq!(CellAddress::parse("B12").unwrap(), CellAddress::new(1, 12));
        assert_eq!(CellAddress::parse("AA007").unwrap(), CellAddress::new(26, 7));
        assert_eq!(
            CellAddress::parse_wire("cell-C3").unwrap(),
            CellAddress::new(2, 3)
        );
    }

    #[test]
    fn test_cell_address_parse_errors_name_the_axis() {
        let axis_of = |s: &str| match CellAddress::parse(s) {
            Err(Error::InvalidAddress { axis, .. }) => axis,
            other => panic!("expected decode error for {s:?}, got {other:?}"),
        };

        assert_eq!(axis_of(""), Axis::Column);
        assert_eq!(axis_of("12"), Axis::Column);
        assert_eq!(axis_of("a1"), Axis::Column);
        assert_eq!(axis_of("A"), Axis::Row);
        assert_eq!(axis_of("A1B"), Axis::Row);
        assert_eq!(axis_of("A-1"), Axis::Row);
        assert_eq!(axis_of("A99999999999"), Axis::Row);
        assert_eq!(axis_of("ZZZZZZZZ1"), Axis::Column);
    }

    #[test]
    fn test_is_address() {
        assert!(CellAddress::is_address("A0"));
        assert!(CellAddress::is_address("ZZ100"));
        assert!(!CellAddress::is_address("a0"));
        assert!(!CellAddress::is_address("ROW"));
        assert!(!CellAddress::is_address("A0B"));
        assert!(!CellAddress::is_address("MAX_ROW"));
    }

    #[test]
    fn test_cell_address_display() {
        assert_eq!(CellAddress::new(0, 0).to_string(), "A0");
        assert_eq!(CellAddress::new(2, 99).to_string(), "C99");
        assert_eq!(CellAddress::new(1, 4).wire_id(), "cell-B4");
    }

    #[test]
    fn test_ordering_is_column_major() {
        let mut cells = vec![
            CellAddress::new(1, 0),
            CellAddress::new(0, 5),
            CellAddress::new(0, 1),
        ];
        cells.sort();
        assert_eq!(
            cells,
            vec![
                CellAddress::new(0, 1),
                CellAddress::new(0, 5),
                CellAddress::new(1, 0)
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_text_form_round_trips(column in any::<u32>(), row in any::<u32>()) {
            let addr = CellAddress::new(column, row);
            let text = addr.to_string();
            prop_assert!(CellAddress::is_address(&text));
            prop_assert_eq!(CellAddress::parse(&text).unwrap(), addr);
        }
    }
}
