//! The font header table.
//!
//! Mandatory; carries the global flags and units-per-em the rest of the
//! font is interpreted against. Every failure here is fatal: a font
//! whose header cannot be trusted cannot be rendered at all.

use font_types::Tag;

use crate::error::{SanitizeError, TableOutcome};
use crate::font::Font;
use crate::font_data::FontData;
use crate::serialize::Serializer;
use crate::ParseResult;

const MAGIC_NUMBER: u32 = 0x5F0F3F5F;

/// Only these flag bits are passed through to the output; the rest are
/// either reserved or only meaningful to the original authoring tool.
const FLAGS_MASK: u16 = 0x383f;

/// Bits 2 and 4 of the flags; a device-metrics table may only be present
/// when at least one of them is set.
pub(crate) const FLAGS_PPEM_BITS: u16 = 0x0014;

/// Byte offset of the checksum adjustment field within the table.
pub(crate) const CHECKSUM_ADJUSTMENT_OFFSET: usize = 8;

/// The magic 32-bit constant the whole-file checksum must sum to.
pub(crate) const CHECKSUM_MAGIC: u32 = 0xB1B0AFBA;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Head {
    pub font_revision: i32,
    pub flags: u16,
    pub units_per_em: u16,
    pub created: i64,
    pub modified: i64,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub mac_style: u16,
    pub lowest_rec_ppem: u16,
    pub font_direction_hint: i16,
    pub index_to_loc_format: i16,
    pub glyph_data_format: i16,
}

impl Head {
    pub const TAG: Tag = Tag::new(b"head");

    pub(crate) fn parse(_font: &Font, data: FontData<'_>) -> ParseResult<Head> {
        let mut cursor = data.cursor();

        let version = cursor.read_u32()?;
        if version >> 16 != 1 {
            return Err(SanitizeError::MalformedTable {
                reason: "unsupported head version",
            });
        }
        let font_revision = cursor.read_i32()?;
        // recomputed at emit time
        let _checksum_adjustment = cursor.read_u32()?;
        if cursor.read_u32()? != MAGIC_NUMBER {
            return Err(SanitizeError::MalformedTable {
                reason: "bad magic number",
            });
        }
        let raw_flags = cursor.read_u16()?;
        let flags = raw_flags & FLAGS_MASK;
        if flags != raw_flags {
            log::debug!("masking head flags 0x{raw_flags:04x} to 0x{flags:04x}");
        }
        let units_per_em = cursor.read_u16()?;
        if !(16..=16384).contains(&units_per_em) {
            return Err(SanitizeError::MalformedTable {
                reason: "units per em out of range",
            });
        }
        let created = read_long_date_time(&mut cursor)?;
        let modified = read_long_date_time(&mut cursor)?;
        let x_min = cursor.read_i16()?;
        let y_min = cursor.read_i16()?;
        let x_max = cursor.read_i16()?;
        let y_max = cursor.read_i16()?;
        if x_min > x_max || y_min > y_max {
            return Err(SanitizeError::MalformedTable {
                reason: "inverted bounding box",
            });
        }
        let mac_style = cursor.read_u16()?;
        let lowest_rec_ppem = cursor.read_u16()?;
        let font_direction_hint = cursor.read_i16()?;
        if !(-2..=2).contains(&font_direction_hint) {
            return Err(SanitizeError::MalformedTable {
                reason: "bad font direction hint",
            });
        }
        let index_to_loc_format = cursor.read_i16()?;
        if !matches!(index_to_loc_format, 0 | 1) {
            return Err(SanitizeError::MalformedTable {
                reason: "bad index to loc format",
            });
        }
        let glyph_data_format = cursor.read_i16()?;
        if glyph_data_format != 0 {
            return Err(SanitizeError::MalformedTable {
                reason: "bad glyph data format",
            });
        }

        Ok(TableOutcome::Kept(Head {
            font_revision,
            flags,
            units_per_em,
            created,
            modified,
            x_min,
            y_min,
            x_max,
            y_max,
            mac_style,
            lowest_rec_ppem,
            font_direction_hint,
            index_to_loc_format,
            glyph_data_format,
        }))
    }

    pub(crate) fn should_serialize(&self, _font: &Font) -> bool {
        true
    }

    pub(crate) fn serialize(&self, out: &mut Serializer) -> Result<(), SanitizeError> {
        out.write_u32(0x00010000)?;
        out.write_i32(self.font_revision)?;
        // checksum adjustment; patched by the orchestrator once the whole
        // output exists
        out.write_u32(0)?;
        out.write_u32(MAGIC_NUMBER)?;
        out.write_u16(self.flags)?;
        out.write_u16(self.units_per_em)?;
        write_long_date_time(out, self.created)?;
        write_long_date_time(out, self.modified)?;
        out.write_i16(self.x_min)?;
        out.write_i16(self.y_min)?;
        out.write_i16(self.x_max)?;
        out.write_i16(self.y_max)?;
        out.write_u16(self.mac_style)?;
        out.write_u16(self.lowest_rec_ppem)?;
        out.write_i16(self.font_direction_hint)?;
        out.write_i16(self.index_to_loc_format)?;
        out.write_i16(self.glyph_data_format)?;
        Ok(())
    }
}

fn read_long_date_time(
    cursor: &mut crate::font_data::Cursor<'_>,
) -> Result<i64, SanitizeError> {
    let hi = cursor.read_u32()? as i64;
    let lo = cursor.read_u32()? as i64;
    Ok((hi << 32) | lo)
}

fn write_long_date_time(out: &mut Serializer, value: i64) -> Result<(), SanitizeError> {
    out.write_u32((value >> 32) as u32)?;
    out.write_u32(value as u32)
}

pub(crate) fn parse_head(
    font: &mut Font,
    data: FontData<'_>,
) -> Result<TableOutcome<()>, SanitizeError> {
    match Head::parse(font, data)? {
        TableOutcome::Kept(table) => {
            font.head = Some(table);
            Ok(TableOutcome::Kept(()))
        }
        TableOutcome::Dropped(reason) => Ok(TableOutcome::Dropped(reason)),
    }
}

pub(crate) fn is_present(font: &Font) -> bool {
    font.head.is_some()
}

pub(crate) fn should_serialize(font: &Font) -> bool {
    font.head.as_ref().is_some_and(|t| t.should_serialize(font))
}

pub(crate) fn serialize(font: &Font, out: &mut Serializer) -> Result<(), SanitizeError> {
    font.head
        .as_ref()
        .ok_or(SanitizeError::MissingMandatoryTable(Head::TAG))?
        .serialize(out)
}
