//! Source positions: points, ranges, lengths and edits.
//!
//! Byte offsets index the encoded source. Columns count bytes from the start
//! of the row, so they mean different things for UTF-8 and UTF-16 input.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A (row, column) position. Both components are zero-based.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

impl Point {
    pub const ZERO: Point = Point { row: 0, column: 0 };
    pub const MAX: Point = Point {
        row: usize::MAX,
        column: usize::MAX,
    };

    #[inline]
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Relative extents compose like text: a multi-row right side resets the column.
impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, rhs: Point) -> Point {
        if rhs.row > 0 {
            Point::new(self.row + rhs.row, rhs.column)
        } else {
            Point::new(self.row, self.column + rhs.column)
        }
    }
}

/// Saturating inverse of [`Add`]: `b + (a - b) == a` whenever `b <= a`.
impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, rhs: Point) -> Point {
        if self.row > rhs.row {
            Point::new(self.row - rhs.row, self.column)
        } else {
            Point::new(0, self.column.saturating_sub(rhs.column))
        }
    }
}

/// A span of source text in both byte and point coordinates. Half-open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_point: Point,
    pub end_point: Point,
}

impl Range {
    /// The range covering any document.
    pub const WHOLE: Range = Range {
        start_byte: 0,
        end_byte: usize::MAX,
        start_point: Point::ZERO,
        end_point: Point::MAX,
    };

    pub fn new(start_byte: usize, end_byte: usize, start_point: Point, end_point: Point) -> Self {
        Self {
            start_byte,
            end_byte,
            start_point,
            end_point,
        }
    }

    #[inline]
    pub fn byte_range(&self) -> std::ops::Range<usize> {
        self.start_byte..self.end_byte
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start_byte >= self.end_byte
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..{}] {} - {}",
            self.start_byte, self.end_byte, self.start_point, self.end_point
        )
    }
}

/// A relative size of text measured in bytes and extent.
///
/// Nodes store their padding and size as lengths so that an edit only has to
/// touch the nodes on the path to it; absolute positions are summed while
/// descending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Length {
    pub bytes: usize,
    pub extent: Point,
}

impl Length {
    pub const ZERO: Length = Length {
        bytes: 0,
        extent: Point::ZERO,
    };

    #[inline]
    pub const fn new(bytes: usize, extent: Point) -> Self {
        Self { bytes, extent }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.bytes == 0
    }
}

impl Add for Length {
    type Output = Length;

    #[inline]
    fn add(self, rhs: Length) -> Length {
        Length::new(self.bytes + rhs.bytes, self.extent + rhs.extent)
    }
}

impl Sub for Length {
    type Output = Length;

    #[inline]
    fn sub(self, rhs: Length) -> Length {
        Length::new(self.bytes.saturating_sub(rhs.bytes), self.extent - rhs.extent)
    }
}

/// Describes a change to the source text: the bytes in
/// `start_byte..old_end_byte` were replaced by `start_byte..new_end_byte`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputEdit {
    pub start_byte: usize,
    pub old_end_byte: usize,
    pub new_end_byte: usize,
    pub start_position: Point,
    pub old_end_position: Point,
    pub new_end_position: Point,
}

impl InputEdit {
    #[inline]
    pub fn start(&self) -> Length {
        Length::new(self.start_byte, self.start_position)
    }

    #[inline]
    pub fn old_end(&self) -> Length {
        Length::new(self.old_end_byte, self.old_end_position)
    }

    #[inline]
    pub fn new_end(&self) -> Length {
        Length::new(self.new_end_byte, self.new_end_position)
    }

    /// Maps a position in the pre-edit document to the post-edit document.
    ///
    /// Positions inside the replaced span collapse to the edit start.
    pub fn apply(&self, byte: usize, point: Point) -> (usize, Point) {
        if byte >= self.old_end_byte {
            let byte = self.new_end_byte + (byte - self.old_end_byte);
            let point = self.new_end_position + (point - self.old_end_position);
            (byte, point)
        } else if byte > self.start_byte {
            (self.start_byte, self.start_position)
        } else {
            (byte, point)
        }
    }
}

/// Computes the extent spanned by `text`, counting columns in bytes.
pub fn extent_of(text: &[u8]) -> Point {
    let mut point = Point::ZERO;
    for &byte in text {
        if byte == b'\n' {
            point.row += 1;
            point.column = 0;
        } else {
            point.column += 1;
        }
    }
    point
}
