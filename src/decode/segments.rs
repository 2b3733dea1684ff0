//! Seven-segment state tracking and glyph decoding.
//!
//! A digit sub-image is partitioned into a fixed 3-column x 5-row grid and
//! seven predefined cells are sampled, one per segment. The resulting on/off
//! pattern is looked up in a static classification table.

use image::GrayImage;

use crate::error::{Error, Result};

/// The seven strokes of a display digit, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Top,
    UpperRight,
    LowerRight,
    Bottom,
    LowerLeft,
    UpperLeft,
    Middle,
}

impl Segment {
    pub const ALL: [Segment; 7] = [
        Segment::Top,
        Segment::UpperRight,
        Segment::LowerRight,
        Segment::Bottom,
        Segment::LowerLeft,
        Segment::UpperLeft,
        Segment::Middle,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Sampling cell `(row, column)` of this segment in the 5x3 grid.
    pub fn cell(self) -> (usize, usize) {
        match self {
            Segment::Top => (0, 1),
            Segment::UpperRight => (1, 2),
            Segment::LowerRight => (3, 2),
            Segment::Bottom => (4, 1),
            Segment::LowerLeft => (3, 0),
            Segment::UpperLeft => (1, 0),
            Segment::Middle => (2, 1),
        }
    }
}

/// On/off state of the seven segments of one digit.
///
/// Starts all-off; segments are turned on individually (idempotent and
/// order-independent); [`SegmentStates::decode`] consumes the state and
/// produces exactly one character or an explicit no-match error.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SegmentStates {
    states: [bool; 7],
}

impl SegmentStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turn_on(&mut self, segment: Segment) {
        self.states[segment.index()] = true;
    }

    /// Clears every segment back to off.
    pub fn reset(&mut self) {
        self.states = [false; 7];
    }

    pub fn pattern(&self) -> [bool; 7] {
        self.states
    }

    /// Terminal transition: looks the pattern up in the classification
    /// table. Unlisted patterns fail explicitly; callers decide any
    /// fallback, never this table.
    pub fn decode(self) -> Result<char> {
        lookup_digit(self.states).ok_or(Error::UnrecognizedSegmentPattern {
            pattern: self.states,
        })
    }
}

/// Static pattern table, ordered (top, upper-right, lower-right, bottom,
/// lower-left, upper-left, middle).
///
/// '6', '7' and '9' each carry two patterns: deployed panels render these
/// digits with and without the optional stroke, so the table is a
/// many-keys-to-one mapping by design.
fn lookup_digit(pattern: [bool; 7]) -> Option<char> {
    const T: bool = true;
    const F: bool = false;
    Some(match pattern {
        [T, T, T, T, T, T, F] => '0',
        [F, T, T, F, F, F, F] => '1',
        [T, T, F, T, T, F, T] => '2',
        [T, T, T, T, F, F, T] => '3',
        [F, T, T, F, F, T, T] => '4',
        [T, F, T, T, F, T, T] => '5',
        [T, F, T, T, T, T, T] | [F, F, T, T, T, T, T] => '6',
        [T, T, T, F, F, F, F] | [T, T, T, F, F, T, F] => '7',
        [T, T, T, T, T, T, T] => '8',
        [T, T, T, T, F, T, T] | [T, T, T, F, F, T, T] => '9',
        _ => return None,
    })
}

/// Near-equal split of `len` into `parts` half-open ranges, any remainder
/// going to the first ranges. Deterministic for every input size.
pub fn split_ranges(len: u32, parts: u32) -> Vec<(u32, u32)> {
    let base = len / parts;
    let remainder = len % parts;
    let mut ranges = Vec::with_capacity(parts as usize);
    let mut start = 0;
    for i in 0..parts {
        let size = base + u32::from(i < remainder);
        ranges.push((start, start + size));
        start += size;
    }
    ranges
}

/// Fraction of non-zero pixels inside the half-open cell
/// `[x0, x1) x [y0, y1)`. An empty cell reads as 0.
fn cell_fill_ratio(img: &GrayImage, x0: u32, x1: u32, y0: u32, y1: u32) -> f64 {
    let area = (x1 - x0) as u64 * (y1 - y0) as u64;
    if area == 0 {
        return 0.0;
    }
    let mut nonzero = 0u64;
    for y in y0..y1 {
        for x in x0..x1 {
            if img.get_pixel(x, y)[0] != 0 {
                nonzero += 1;
            }
        }
    }
    nonzero as f64 / area as f64
}

/// Decodes one digit sub-image. A grid cell counts as lit when its non-zero
/// fill ratio reaches `fill_thresh`.
pub fn decode_digit(img: &GrayImage, fill_thresh: f64) -> Result<char> {
    let rows = split_ranges(img.height(), 5);
    let cols = split_ranges(img.width(), 3);

    let mut states = SegmentStates::new();
    for segment in Segment::ALL {
        let (row, col) = segment.cell();
        let (y0, y1) = rows[row];
        let (x0, x1) = cols[col];
        if cell_fill_ratio(img, x0, x1, y0, y1) >= fill_thresh {
            states.turn_on(segment);
        }
    }
    states.decode()
}
