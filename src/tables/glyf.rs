//! The glyph data table, carried as an opaque pass-through blob.
//!
//! Outline validation is a separate concern with its own handler in a
//! full deployment; here the table's role is to witness that the font
//! uses TrueType outlines (hdmx consults its presence) and to travel
//! through the pass verbatim. The directory validation has already
//! bounds-checked its byte range.

use font_types::Tag;

use crate::error::{SanitizeError, TableOutcome};
use crate::font::Font;
use crate::font_data::FontData;
use crate::serialize::Serializer;
use crate::ParseResult;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Glyf {
    data: Vec<u8>,
}

impl Glyf {
    pub const TAG: Tag = Tag::new(b"glyf");

    pub(crate) fn parse(_font: &Font, data: FontData<'_>) -> ParseResult<Glyf> {
        Ok(TableOutcome::Kept(Glyf {
            data: data.as_bytes().to_vec(),
        }))
    }

    pub(crate) fn should_serialize(&self, _font: &Font) -> bool {
        true
    }

    pub(crate) fn serialize(&self, out: &mut Serializer) -> Result<(), SanitizeError> {
        out.write_bytes(&self.data)
    }
}

pub(crate) fn parse_glyf(
    font: &mut Font,
    data: FontData<'_>,
) -> Result<TableOutcome<()>, SanitizeError> {
    match Glyf::parse(font, data)? {
        TableOutcome::Kept(table) => {
            font.glyf = Some(table);
            Ok(TableOutcome::Kept(()))
        }
        TableOutcome::Dropped(reason) => Ok(TableOutcome::Dropped(reason)),
    }
}

pub(crate) fn is_present(font: &Font) -> bool {
    font.glyf.is_some()
}

pub(crate) fn should_serialize(font: &Font) -> bool {
    font.glyf.as_ref().is_some_and(|t| t.should_serialize(font))
}

pub(crate) fn serialize(font: &Font, out: &mut Serializer) -> Result<(), SanitizeError> {
    font.glyf
        .as_ref()
        .ok_or(SanitizeError::MissingMandatoryTable(Glyf::TAG))?
        .serialize(out)
}
