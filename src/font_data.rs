//! Bounds-checked access to raw font bytes.

use std::ops::Range;

use font_types::Tag;

use crate::error::SanitizeError;

/// A reference to raw binary font data.
///
/// This is a wrapper around a byte slice with a known length; all access
/// goes through bounds-checked methods or a [`Cursor`]. It never owns the
/// bytes and never outlives them.
#[derive(Debug, Default, Clone, Copy)]
pub struct FontData<'a> {
    bytes: &'a [u8],
}

impl<'a> FontData<'a> {
    /// Create a new `FontData` with these bytes.
    pub const fn new(bytes: &'a [u8]) -> Self {
        FontData { bytes }
    }

    /// The length of the data, in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` if the data has a length of zero bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the sub-region for `range`, or `None` if it is out of bounds.
    pub fn slice(&self, range: Range<usize>) -> Option<FontData<'a>> {
        self.bytes.get(range).map(|bytes| FontData { bytes })
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// A cursor positioned at the start of this data.
    pub fn cursor(&self) -> Cursor<'a> {
        Cursor {
            pos: 0,
            bytes: self.bytes,
        }
    }
}

impl AsRef<[u8]> for FontData<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

impl<'a> From<&'a [u8]> for FontData<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        FontData::new(bytes)
    }
}

/// A cursor over a fixed-length byte region.
///
/// Every read advances the cursor and fails with
/// [`SanitizeError::OutOfBounds`] if it would consume bytes past the end
/// of the originally supplied region, regardless of any length or count
/// read from the data itself. After a failed read the cursor position is
/// unspecified and the caller must abort parsing the current table.
pub struct Cursor<'a> {
    pos: usize,
    bytes: &'a [u8],
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], SanitizeError> {
        let end = self
            .pos
            .checked_add(n)
            .ok_or(SanitizeError::OutOfBounds)?;
        let bytes = self
            .bytes
            .get(self.pos..end)
            .ok_or(SanitizeError::OutOfBounds)?;
        self.pos = end;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], SanitizeError> {
        self.take(N)?
            .try_into()
            .map_err(|_| SanitizeError::OutOfBounds)
    }

    pub fn read_u8(&mut self) -> Result<u8, SanitizeError> {
        self.take_array::<1>().map(|raw| raw[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, SanitizeError> {
        self.take_array::<1>().map(|raw| raw[0] as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, SanitizeError> {
        self.take_array::<2>().map(u16::from_be_bytes)
    }

    pub fn read_i16(&mut self) -> Result<i16, SanitizeError> {
        self.take_array::<2>().map(i16::from_be_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32, SanitizeError> {
        self.take_array::<4>().map(u32::from_be_bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32, SanitizeError> {
        self.take_array::<4>().map(i32::from_be_bytes)
    }

    pub fn read_tag(&mut self) -> Result<Tag, SanitizeError> {
        self.take_array::<4>().map(Tag::from_be_bytes)
    }

    /// Advance the cursor by `n` bytes without interpreting them.
    pub fn skip(&mut self, n: usize) -> Result<(), SanitizeError> {
        self.take(n).map(|_| ())
    }

    /// The current position, in bytes from the start of the region.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }
}
