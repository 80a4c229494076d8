//! The maximum profile table, which declares the global glyph count.
//!
//! Mandatory: per-glyph arrays in sibling tables are sized from
//! `num_glyphs`, so a font without a trustworthy maxp is rejected.

use font_types::Tag;

use crate::error::{SanitizeError, TableOutcome};
use crate::font::Font;
use crate::font_data::FontData;
use crate::serialize::Serializer;
use crate::ParseResult;

const VERSION_1_0: u32 = 0x00010000;
const VERSION_0_5: u32 = 0x00005000;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Maxp {
    pub num_glyphs: u16,
    /// Version 1.0 fields; `None` for the version 0.5 (CFF) profile.
    pub profile: Option<TrueTypeProfile>,
}

/// The version 1.0 limits used to size the TrueType interpreter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrueTypeProfile {
    pub max_points: u16,
    pub max_contours: u16,
    pub max_composite_points: u16,
    pub max_composite_contours: u16,
    pub max_zones: u16,
    pub max_twilight_points: u16,
    pub max_storage: u16,
    pub max_function_defs: u16,
    pub max_instruction_defs: u16,
    pub max_stack_elements: u16,
    pub max_size_of_instructions: u16,
    pub max_component_elements: u16,
    pub max_component_depth: u16,
}

impl Maxp {
    pub const TAG: Tag = Tag::new(b"maxp");

    pub(crate) fn parse(_font: &Font, data: FontData<'_>) -> ParseResult<Maxp> {
        let mut cursor = data.cursor();

        let version = cursor.read_u32()?;
        if version != VERSION_1_0 && version != VERSION_0_5 {
            return Err(SanitizeError::MalformedTable {
                reason: "unsupported maxp version",
            });
        }
        let num_glyphs = cursor.read_u16()?;
        if num_glyphs == 0 {
            return Err(SanitizeError::MalformedTable {
                reason: "font contains no glyphs",
            });
        }

        let profile = if version == VERSION_1_0 {
            let max_points = cursor.read_u16()?;
            let max_contours = cursor.read_u16()?;
            let max_composite_points = cursor.read_u16()?;
            let max_composite_contours = cursor.read_u16()?;
            let mut max_zones = cursor.read_u16()?;
            if max_zones == 0 {
                // some legacy fonts write 0; the only legal values are 1 and 2
                log::debug!("normalizing maxp max_zones 0 to 1");
                max_zones = 1;
            } else if max_zones > 2 {
                return Err(SanitizeError::MalformedTable {
                    reason: "bad max_zones",
                });
            }
            Some(TrueTypeProfile {
                max_points,
                max_contours,
                max_composite_points,
                max_composite_contours,
                max_zones,
                max_twilight_points: cursor.read_u16()?,
                max_storage: cursor.read_u16()?,
                max_function_defs: cursor.read_u16()?,
                max_instruction_defs: cursor.read_u16()?,
                max_stack_elements: cursor.read_u16()?,
                max_size_of_instructions: cursor.read_u16()?,
                max_component_elements: cursor.read_u16()?,
                max_component_depth: cursor.read_u16()?,
            })
        } else {
            None
        };

        Ok(TableOutcome::Kept(Maxp {
            num_glyphs,
            profile,
        }))
    }

    pub(crate) fn should_serialize(&self, _font: &Font) -> bool {
        true
    }

    pub(crate) fn serialize(&self, out: &mut Serializer) -> Result<(), SanitizeError> {
        match &self.profile {
            Some(profile) => {
                out.write_u32(VERSION_1_0)?;
                out.write_u16(self.num_glyphs)?;
                out.write_u16(profile.max_points)?;
                out.write_u16(profile.max_contours)?;
                out.write_u16(profile.max_composite_points)?;
                out.write_u16(profile.max_composite_contours)?;
                out.write_u16(profile.max_zones)?;
                out.write_u16(profile.max_twilight_points)?;
                out.write_u16(profile.max_storage)?;
                out.write_u16(profile.max_function_defs)?;
                out.write_u16(profile.max_instruction_defs)?;
                out.write_u16(profile.max_stack_elements)?;
                out.write_u16(profile.max_size_of_instructions)?;
                out.write_u16(profile.max_component_elements)?;
                out.write_u16(profile.max_component_depth)?;
            }
            None => {
                out.write_u32(VERSION_0_5)?;
                out.write_u16(self.num_glyphs)?;
            }
        }
        Ok(())
    }
}

pub(crate) fn parse_maxp(
    font: &mut Font,
    data: FontData<'_>,
) -> Result<TableOutcome<()>, SanitizeError> {
    match Maxp::parse(font, data)? {
        TableOutcome::Kept(table) => {
            font.maxp = Some(table);
            Ok(TableOutcome::Kept(()))
        }
        TableOutcome::Dropped(reason) => Ok(TableOutcome::Dropped(reason)),
    }
}

pub(crate) fn is_present(font: &Font) -> bool {
    font.maxp.is_some()
}

pub(crate) fn should_serialize(font: &Font) -> bool {
    font.maxp.as_ref().is_some_and(|t| t.should_serialize(font))
}

pub(crate) fn serialize(font: &Font, out: &mut Serializer) -> Result<(), SanitizeError> {
    font.maxp
        .as_ref()
        .ok_or(SanitizeError::MissingMandatoryTable(Maxp::TAG))?
        .serialize(out)
}
