//! Helpers for building binary test data.

use font_types::Tag;

use crate::directory::{SearchRange, DIRECTORY_HEADER_LEN, TABLE_RECORD_LEN, TT_SFNT_VERSION};

/// A big-endian byte buffer builder.
pub(crate) struct BeBuffer(Vec<u8>);

impl BeBuffer {
    pub fn new() -> Self {
        BeBuffer(Vec::new())
    }

    pub fn u8(mut self, value: u8) -> Self {
        self.0.push(value);
        self
    }

    pub fn i16(mut self, value: i16) -> Self {
        self.0.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn u16(mut self, value: u16) -> Self {
        self.0.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn i32(mut self, value: i32) -> Self {
        self.0.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.0.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn tag(mut self, value: Tag) -> Self {
        self.0.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn bytes(mut self, value: &[u8]) -> Self {
        self.0.extend_from_slice(value);
        self
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

/// A well-formed 54-byte head table with the given flags.
pub(crate) fn head_bytes(flags: u16) -> Vec<u8> {
    BeBuffer::new()
        .u32(0x00010000) // version
        .i32(0x00010000) // font revision
        .u32(0xdeadbeef) // checksum adjustment (ignored on input)
        .u32(0x5F0F3F5F) // magic
        .u16(flags)
        .u16(1000) // units per em
        .u32(0)
        .u32(0x5f5e0f00) // created
        .u32(0)
        .u32(0x5f5e0f01) // modified
        .i16(-100) // x_min
        .i16(-200) // y_min
        .i16(800) // x_max
        .i16(900) // y_max
        .u16(0) // mac style
        .u16(8) // lowest rec ppem
        .i16(2) // font direction hint
        .i16(0) // index to loc format
        .i16(0) // glyph data format
        .into_vec()
}

/// A version 0.5 maxp table (no TrueType profile).
pub(crate) fn maxp_bytes_v05(num_glyphs: u16) -> Vec<u8> {
    BeBuffer::new().u32(0x00005000).u16(num_glyphs).into_vec()
}

/// A version 1.0 maxp table with a minimal valid profile.
pub(crate) fn maxp_bytes_v10(num_glyphs: u16) -> Vec<u8> {
    let mut buf = BeBuffer::new()
        .u32(0x00010000)
        .u16(num_glyphs)
        .u16(10) // max_points
        .u16(2) // max_contours
        .u16(0) // max_composite_points
        .u16(0) // max_composite_contours
        .u16(1); // max_zones
    for _ in 0..8 {
        buf = buf.u16(0);
    }
    buf.into_vec()
}

/// A well-formed 36-byte hhea table.
pub(crate) fn hhea_bytes(number_of_h_metrics: u16) -> Vec<u8> {
    BeBuffer::new()
        .u32(0x00010000) // version
        .i16(750) // ascender
        .i16(-250) // descender
        .i16(0) // line gap
        .u16(600) // advance width max
        .i16(-100) // min left side bearing
        .i16(-50) // min right side bearing
        .i16(800) // x max extent
        .i16(1) // caret slope rise
        .i16(0) // caret slope run
        .i16(0) // caret offset
        .i16(0) // reserved
        .i16(0)
        .i16(0)
        .i16(0)
        .i16(0) // metric data format
        .u16(number_of_h_metrics)
        .into_vec()
}

/// An hmtx table with `num_metrics` full metrics and `num_trailing`
/// bare side bearings.
pub(crate) fn hmtx_bytes(num_metrics: u16, num_trailing: u16) -> Vec<u8> {
    let mut buf = BeBuffer::new();
    for i in 0..num_metrics {
        buf = buf.u16(500 + i).i16(10);
    }
    for _ in 0..num_trailing {
        buf = buf.i16(20);
    }
    buf.into_vec()
}

fn round4(n: usize) -> usize {
    (n + 3) & !3
}

/// Assembles a complete sfnt container from the given tables, with a
/// well-formed directory. Tables are sorted by tag and placed at 4-byte
/// aligned offsets; input checksums are left at zero (the sanitizer does
/// not verify them).
pub(crate) fn build_font(tables: &[(Tag, &[u8])]) -> Vec<u8> {
    let mut tables: Vec<_> = tables.to_vec();
    tables.sort_by_key(|(tag, _)| *tag);

    let header_len = DIRECTORY_HEADER_LEN + tables.len() * TABLE_RECORD_LEN;
    let computed = SearchRange::compute(tables.len(), TABLE_RECORD_LEN);
    let mut buf = BeBuffer::new()
        .u32(TT_SFNT_VERSION)
        .u16(tables.len() as u16)
        .u16(computed.search_range)
        .u16(computed.entry_selector)
        .u16(computed.range_shift);

    let mut offset = header_len;
    for (tag, data) in &tables {
        buf = buf
            .tag(*tag)
            .u32(0) // checksum, unchecked on input
            .u32(offset as u32)
            .u32(data.len() as u32);
        offset += round4(data.len());
    }
    let mut bytes = buf.into_vec();
    for (_, data) in &tables {
        bytes.extend_from_slice(data);
        bytes.resize(round4(bytes.len()), 0);
    }
    bytes
}
