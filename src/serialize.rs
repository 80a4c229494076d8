//! Building the sanitized output stream.

use font_types::Tag;

use crate::error::SanitizeError;

/// An append-only, capacity-tracked sink for validated bytes.
///
/// The orchestrator computes the exact size of the output it is about to
/// emit and constructs the sink with that capacity; a write that would
/// exceed it fails with [`SanitizeError::OutputCapacity`]. That error is
/// a guard against internal corruption, not a property of the input:
/// every table re-serializes to at most its validated input length.
pub struct Serializer {
    data: Vec<u8>,
    capacity: usize,
}

impl Serializer {
    pub fn new(capacity: usize) -> Self {
        Serializer {
            data: Vec::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, bytes: &[u8]) -> Result<(), SanitizeError> {
        if self.data.len() + bytes.len() > self.capacity {
            return Err(SanitizeError::OutputCapacity);
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), SanitizeError> {
        self.push(&[value])
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), SanitizeError> {
        self.push(&value.to_be_bytes())
    }

    pub fn write_i16(&mut self, value: i16) -> Result<(), SanitizeError> {
        self.push(&value.to_be_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), SanitizeError> {
        self.push(&value.to_be_bytes())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), SanitizeError> {
        self.push(&value.to_be_bytes())
    }

    pub fn write_tag(&mut self, tag: Tag) -> Result<(), SanitizeError> {
        self.push(&tag.to_be_bytes())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SanitizeError> {
        self.push(bytes)
    }

    pub fn write_zeros(&mut self, n: usize) -> Result<(), SanitizeError> {
        for _ in 0..n {
            self.push(&[0])?;
        }
        Ok(())
    }

    /// Zero-fill up to the next multiple of `align`.
    pub fn pad_to_alignment(&mut self, align: usize) -> Result<(), SanitizeError> {
        let rem = self.data.len() % align;
        if rem != 0 {
            self.write_zeros(align - rem)?;
        }
        Ok(())
    }

    /// Overwrite four already-written bytes at `pos`.
    ///
    /// Used for the head checksum adjustment, which can only be computed
    /// once the rest of the output exists.
    pub fn patch_u32(&mut self, pos: usize, value: u32) -> Result<(), SanitizeError> {
        let slot = self
            .data
            .get_mut(pos..pos + 4)
            .ok_or(SanitizeError::OutOfBounds)?;
        slot.copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// The number of bytes written so far.
    pub fn position(&self) -> usize {
        self.data.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

/// The sfnt checksum: the sum of the data interpreted as big-endian
/// 32-bit words, with the tail zero-padded to a word boundary.
pub(crate) fn checksum(bytes: &[u8]) -> u32 {
    let mut sum = 0u32;
    let mut chunks = bytes.chunks_exact(4);
    for chunk in &mut chunks {
        let raw: [u8; 4] = match chunk.try_into() {
            Ok(raw) => raw,
            Err(_) => break,
        };
        sum = sum.wrapping_add(u32::from_be_bytes(raw));
    }
    let mut tail = [0u8; 4];
    tail[..chunks.remainder().len()].copy_from_slice(chunks.remainder());
    sum.wrapping_add(u32::from_be_bytes(tail))
}
