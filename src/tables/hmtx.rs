//! The horizontal metrics table.
//!
//! Depends on hhea (`number_of_h_metrics`) and maxp (`num_glyphs`),
//! both of which must already have parsed. This table is mandatory, so
//! unlike hdmx every failure here is fatal; there is nothing to fall
//! back to when the advance widths cannot be trusted.

use font_types::Tag;

use crate::error::{SanitizeError, TableOutcome};
use crate::font::Font;
use crate::font_data::FontData;
use crate::serialize::Serializer;
use crate::tables::{hhea::Hhea, maxp::Maxp};
use crate::ParseResult;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hmtx {
    pub h_metrics: Vec<LongHorMetric>,
    /// Trailing side bearings for glyphs past `number_of_h_metrics`,
    /// which all share the last metric's advance width.
    pub left_side_bearings: Vec<i16>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LongHorMetric {
    pub advance_width: u16,
    pub lsb: i16,
}

impl Hmtx {
    pub const TAG: Tag = Tag::new(b"hmtx");

    pub(crate) fn parse(font: &Font, data: FontData<'_>) -> ParseResult<Hmtx> {
        let mut cursor = data.cursor();

        let Some(hhea) = font.hhea.as_ref() else {
            return Err(SanitizeError::MissingDependency(Hhea::TAG));
        };
        let Some(maxp) = font.maxp.as_ref() else {
            return Err(SanitizeError::MissingDependency(Maxp::TAG));
        };

        let num_metrics = hhea.number_of_h_metrics;
        let num_glyphs = maxp.num_glyphs;
        if num_metrics > num_glyphs {
            return Err(SanitizeError::MalformedTable {
                reason: "more metrics than glyphs",
            });
        }

        let mut h_metrics = Vec::with_capacity(num_metrics as usize);
        for _ in 0..num_metrics {
            h_metrics.push(LongHorMetric {
                advance_width: cursor.read_u16()?,
                lsb: cursor.read_i16()?,
            });
        }

        let num_trailing = num_glyphs - num_metrics;
        let mut left_side_bearings = Vec::with_capacity(num_trailing as usize);
        for _ in 0..num_trailing {
            left_side_bearings.push(cursor.read_i16()?);
        }

        Ok(TableOutcome::Kept(Hmtx {
            h_metrics,
            left_side_bearings,
        }))
    }

    pub(crate) fn should_serialize(&self, _font: &Font) -> bool {
        true
    }

    pub(crate) fn serialize(&self, out: &mut Serializer) -> Result<(), SanitizeError> {
        for metric in &self.h_metrics {
            out.write_u16(metric.advance_width)?;
            out.write_i16(metric.lsb)?;
        }
        for lsb in &self.left_side_bearings {
            out.write_i16(*lsb)?;
        }
        Ok(())
    }
}

pub(crate) fn parse_hmtx(
    font: &mut Font,
    data: FontData<'_>,
) -> Result<TableOutcome<()>, SanitizeError> {
    match Hmtx::parse(font, data)? {
        TableOutcome::Kept(table) => {
            font.hmtx = Some(table);
            Ok(TableOutcome::Kept(()))
        }
        TableOutcome::Dropped(reason) => Ok(TableOutcome::Dropped(reason)),
    }
}

pub(crate) fn is_present(font: &Font) -> bool {
    font.hmtx.is_some()
}

pub(crate) fn should_serialize(font: &Font) -> bool {
    font.hmtx.as_ref().is_some_and(|t| t.should_serialize(font))
}

pub(crate) fn serialize(font: &Font, out: &mut Serializer) -> Result<(), SanitizeError> {
    font.hmtx
        .as_ref()
        .ok_or(SanitizeError::MissingMandatoryTable(Hmtx::TAG))?
        .serialize(out)
}
