//! Source text access.
//!
//! The parser never needs the whole document at once. It asks an [`Input`]
//! for the text starting at a byte offset and decodes characters from
//! whatever chunk comes back, fetching more when a character straddles two
//! chunks.

use std::borrow::Cow;

use thicket_core::{Length, Point, Range};

/// Text encodings the parser can decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InputEncoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
}

/// A source of document text.
///
/// `read` returns the text starting at `byte_offset`; `position` is the
/// point of that offset when known. An empty chunk means end of input.
pub trait Input {
    fn read(&mut self, byte_offset: usize, position: Point) -> Cow<'_, [u8]>;
}

impl Input for &[u8] {
    fn read(&mut self, byte_offset: usize, _position: Point) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.get(byte_offset..).unwrap_or_default())
    }
}

impl Input for &str {
    fn read(&mut self, byte_offset: usize, _position: Point) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes().get(byte_offset..).unwrap_or_default())
    }
}

impl Input for Vec<u8> {
    fn read(&mut self, byte_offset: usize, _position: Point) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.get(byte_offset..).unwrap_or_default())
    }
}

impl Input for String {
    fn read(&mut self, byte_offset: usize, _position: Point) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes().get(byte_offset..).unwrap_or_default())
    }
}

/// Adapts a read callback into an [`Input`].
pub struct ReadFn<F>(pub F);

impl<F, T> Input for ReadFn<F>
where
    F: FnMut(usize, Point) -> T,
    T: AsRef<[u8]>,
{
    fn read(&mut self, byte_offset: usize, position: Point) -> Cow<'_, [u8]> {
        Cow::Owned((self.0)(byte_offset, position).as_ref().to_vec())
    }
}

/// UTF-16 code units served as little-endian bytes.
pub struct Utf16Units<'a>(pub &'a [u16]);

const UTF16_CHUNK_UNITS: usize = 1024;

impl Input for Utf16Units<'_> {
    fn read(&mut self, byte_offset: usize, _position: Point) -> Cow<'_, [u8]> {
        let start = byte_offset / 2;
        let Some(units) = self.0.get(start..) else {
            return Cow::Borrowed(&[]);
        };
        let units = &units[..units.len().min(UTF16_CHUNK_UNITS)];
        let mut bytes: Vec<u8> = units.iter().flat_map(|unit| unit.to_le_bytes()).collect();
        if byte_offset % 2 == 1 && !bytes.is_empty() {
            bytes.remove(0);
        }
        Cow::Owned(bytes)
    }
}

/// Decodes characters from an [`Input`], honoring included ranges.
///
/// Positions are tracked in bytes of the original encoding. Invalid
/// sequences decode to U+FFFD and consume a single code unit.
pub(crate) struct InputAdapter<'a> {
    input: &'a mut dyn Input,
    encoding: InputEncoding,
    chunk: Vec<u8>,
    chunk_start: usize,
    position: Length,
    ranges: &'a [Range],
    range_index: usize,
    lookahead: Option<(char, usize)>,
}

impl<'a> InputAdapter<'a> {
    /// `ranges` must be non-empty, sorted and non-overlapping.
    pub fn new(input: &'a mut dyn Input, encoding: InputEncoding, ranges: &'a [Range]) -> Self {
        let mut adapter = Self {
            input,
            encoding,
            chunk: Vec::new(),
            chunk_start: 0,
            position: Length::ZERO,
            ranges,
            range_index: 0,
            lookahead: None,
        };
        adapter.seek(Length::ZERO);
        adapter
    }

    #[inline]
    pub fn position(&self) -> Length {
        self.position
    }

    /// Where a token ending here ends. Right after jumping a gap between
    /// included ranges that is the end of the previous range, not the start
    /// of the next.
    pub fn mark_end(&self) -> Length {
        if self.range_index > 0
            && let Some(range) = self.ranges.get(self.range_index)
            && self.position.bytes == range.start_byte
        {
            let previous = &self.ranges[self.range_index - 1];
            return Length::new(previous.end_byte, previous.end_point);
        }
        self.position
    }

    /// The character at the current position, if any.
    #[inline]
    pub fn lookahead(&self) -> Option<char> {
        self.lookahead.map(|(c, _)| c)
    }

    /// Encoded size in bytes of the current character.
    #[inline]
    pub fn lookahead_size(&self) -> usize {
        self.lookahead.map_or(0, |(_, size)| size)
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.lookahead.is_none()
    }

    /// Moves to `position`, snapping forward to the next included range.
    pub fn seek(&mut self, position: Length) {
        self.position = position;
        self.range_index = self
            .ranges
            .iter()
            .position(|r| r.end_byte > position.bytes)
            .unwrap_or(self.ranges.len());
        self.enter_range();
        self.decode();
    }

    /// Steps over the current character.
    pub fn advance(&mut self) {
        let Some((c, size)) = self.lookahead else {
            return;
        };
        self.position.bytes += size;
        if c == '\n' {
            self.position.extent.row += 1;
            self.position.extent.column = 0;
        } else {
            self.position.extent.column += size;
        }

        if let Some(range) = self.ranges.get(self.range_index)
            && self.position.bytes >= range.end_byte
        {
            self.range_index += 1;
        }
        self.enter_range();
        self.decode();
    }

    fn enter_range(&mut self) {
        if let Some(range) = self.ranges.get(self.range_index)
            && self.position.bytes < range.start_byte
        {
            self.position = Length::new(range.start_byte, range.start_point);
        }
    }

    fn decode(&mut self) {
        let in_range = self
            .ranges
            .get(self.range_index)
            .is_some_and(|r| self.position.bytes < r.end_byte);
        self.lookahead = if in_range { self.decode_at_position() } else { None };
    }

    fn decode_at_position(&mut self) -> Option<(char, usize)> {
        match self.encoding {
            InputEncoding::Utf8 => self.decode_utf8(),
            InputEncoding::Utf16Le => self.decode_utf16(u16::from_le_bytes),
            InputEncoding::Utf16Be => self.decode_utf16(u16::from_be_bytes),
        }
    }

    fn decode_utf8(&mut self) -> Option<(char, usize)> {
        let first = *self.available(1).first()?;
        let width = match first {
            0x00..=0x7f => return Some((first as char, 1)),
            0xc2..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf4 => 4,
            _ => return Some((char::REPLACEMENT_CHARACTER, 1)),
        };
        let bytes = self.available(width);
        if bytes.len() < width {
            return Some((char::REPLACEMENT_CHARACTER, 1));
        }
        match std::str::from_utf8(&bytes[..width]) {
            Ok(s) => s.chars().next().map(|c| (c, width)),
            Err(_) => Some((char::REPLACEMENT_CHARACTER, 1)),
        }
    }

    fn decode_utf16(&mut self, unit_from: fn([u8; 2]) -> u16) -> Option<(char, usize)> {
        let bytes = self.available(2);
        match bytes.len() {
            0 => return None,
            1 => return Some((char::REPLACEMENT_CHARACTER, 1)),
            _ => {}
        }
        let high = unit_from([bytes[0], bytes[1]]);
        if !(0xd800..=0xdbff).contains(&high) {
            let c = char::from_u32(high as u32).unwrap_or(char::REPLACEMENT_CHARACTER);
            return Some((c, 2));
        }
        let bytes = self.available(4);
        if bytes.len() < 4 {
            return Some((char::REPLACEMENT_CHARACTER, 2));
        }
        let low = unit_from([bytes[2], bytes[3]]);
        match char::decode_utf16([high, low]).next() {
            Some(Ok(c)) if (0xdc00..=0xdfff).contains(&low) => Some((c, 4)),
            _ => Some((char::REPLACEMENT_CHARACTER, 2)),
        }
    }

    /// Up to `n` bytes starting at the current position, fetching and
    /// stitching chunks as needed. Fewer bytes means the input ended.
    fn available(&mut self, n: usize) -> &[u8] {
        let offset = self.position.bytes;
        let chunk_end = self.chunk_start + self.chunk.len();
        if offset < self.chunk_start || offset >= chunk_end {
            self.chunk = self.input.read(offset, self.position.extent).into_owned();
            self.chunk_start = offset;
        }

        while self.chunk_start + self.chunk.len() < offset + n {
            let end = self.chunk_start + self.chunk.len();
            // The buffered bytes past `offset` are part of one character, so
            // they cannot hold a line break.
            let point = Point::new(
                self.position.extent.row,
                self.position.extent.column + (end - offset),
            );
            let more = self.input.read(end, point);
            if more.is_empty() {
                break;
            }
            self.chunk.extend_from_slice(&more);
        }

        let start = offset - self.chunk_start;
        let end = (start + n).min(self.chunk.len());
        &self.chunk[start.min(end)..end]
    }
}
