//! The horizontal header table.
//!
//! Mandatory; `number_of_h_metrics` sizes the hmtx table, so this must
//! parse before it.

use font_types::Tag;

use crate::error::{SanitizeError, TableOutcome};
use crate::font::Font;
use crate::font_data::FontData;
use crate::serialize::Serializer;
use crate::ParseResult;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hhea {
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub advance_width_max: u16,
    pub min_left_side_bearing: i16,
    pub min_right_side_bearing: i16,
    pub x_max_extent: i16,
    pub caret_slope_rise: i16,
    pub caret_slope_run: i16,
    pub caret_offset: i16,
    pub number_of_h_metrics: u16,
}

impl Hhea {
    pub const TAG: Tag = Tag::new(b"hhea");

    pub(crate) fn parse(_font: &Font, data: FontData<'_>) -> ParseResult<Hhea> {
        let mut cursor = data.cursor();

        let version = cursor.read_u32()?;
        if version >> 16 != 1 {
            return Err(SanitizeError::MalformedTable {
                reason: "unsupported hhea version",
            });
        }
        let ascender = cursor.read_i16()?;
        let descender = cursor.read_i16()?;
        let line_gap = cursor.read_i16()?;
        let advance_width_max = cursor.read_u16()?;
        let min_left_side_bearing = cursor.read_i16()?;
        let min_right_side_bearing = cursor.read_i16()?;
        let x_max_extent = cursor.read_i16()?;
        let caret_slope_rise = cursor.read_i16()?;
        let caret_slope_run = cursor.read_i16()?;
        let caret_offset = cursor.read_i16()?;
        for _ in 0..4 {
            let reserved = cursor.read_i16()?;
            if reserved != 0 {
                // normalized to zero on output
                log::debug!("nonzero reserved field in hhea");
            }
        }
        let metric_data_format = cursor.read_i16()?;
        if metric_data_format != 0 {
            return Err(SanitizeError::MalformedTable {
                reason: "bad metric data format",
            });
        }
        let number_of_h_metrics = cursor.read_u16()?;
        if number_of_h_metrics == 0 {
            return Err(SanitizeError::MalformedTable {
                reason: "no horizontal metrics",
            });
        }

        Ok(TableOutcome::Kept(Hhea {
            ascender,
            descender,
            line_gap,
            advance_width_max,
            min_left_side_bearing,
            min_right_side_bearing,
            x_max_extent,
            caret_slope_rise,
            caret_slope_run,
            caret_offset,
            number_of_h_metrics,
        }))
    }

    pub(crate) fn should_serialize(&self, _font: &Font) -> bool {
        true
    }

    pub(crate) fn serialize(&self, out: &mut Serializer) -> Result<(), SanitizeError> {
        out.write_u32(0x00010000)?;
        out.write_i16(self.ascender)?;
        out.write_i16(self.descender)?;
        out.write_i16(self.line_gap)?;
        out.write_u16(self.advance_width_max)?;
        out.write_i16(self.min_left_side_bearing)?;
        out.write_i16(self.min_right_side_bearing)?;
        out.write_i16(self.x_max_extent)?;
        out.write_i16(self.caret_slope_rise)?;
        out.write_i16(self.caret_slope_run)?;
        out.write_i16(self.caret_offset)?;
        for _ in 0..4 {
            out.write_i16(0)?;
        }
        out.write_i16(0)?; // metric data format
        out.write_u16(self.number_of_h_metrics)?;
        Ok(())
    }
}

pub(crate) fn parse_hhea(
    font: &mut Font,
    data: FontData<'_>,
) -> Result<TableOutcome<()>, SanitizeError> {
    match Hhea::parse(font, data)? {
        TableOutcome::Kept(table) => {
            font.hhea = Some(table);
            Ok(TableOutcome::Kept(()))
        }
        TableOutcome::Dropped(reason) => Ok(TableOutcome::Dropped(reason)),
    }
}

pub(crate) fn is_present(font: &Font) -> bool {
    font.hhea.is_some()
}

pub(crate) fn should_serialize(font: &Font) -> bool {
    font.hhea.as_ref().is_some_and(|t| t.should_serialize(font))
}

pub(crate) fn serialize(font: &Font, out: &mut Serializer) -> Result<(), SanitizeError> {
    font.hhea
        .as_ref()
        .ok_or(SanitizeError::MissingMandatoryTable(Hhea::TAG))?
        .serialize(out)
}
