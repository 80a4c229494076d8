//! The horizontal device metrics table.
//!
//! Depends on head (flags) and maxp (glyph count). This table is
//! optional for rendering, so most non-conformance here is answered by
//! dropping the table rather than rejecting the font: an unrecognized
//! version or unsorted records are addressed by omission. The exceptions
//! are truncated data and a padding length no legitimate encoder could
//! produce, which poison the whole font.

use font_types::Tag;

use crate::error::{DropReason, SanitizeError, TableOutcome};
use crate::font::Font;
use crate::font_data::FontData;
use crate::serialize::Serializer;
use crate::tables::head::{Head, FLAGS_PPEM_BITS};
use crate::tables::maxp::Maxp;
use crate::ParseResult;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hdmx {
    pub version: u16,
    /// Declared byte length of one device record, including padding.
    pub size_device_record: i32,
    pub records: Vec<DeviceRecord>,
    /// Padding bytes per record: `size_device_record` minus the bytes a
    /// record actually needs. At most 3; re-emitted as zeros.
    pad_len: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceRecord {
    /// The sort key: records are ordered by strictly increasing ppem.
    pub pixel_size: u8,
    pub max_width: u8,
    /// One advance width per glyph in the font.
    pub widths: Vec<u8>,
}

impl Hdmx {
    pub const TAG: Tag = Tag::new(b"hdmx");

    pub(crate) fn parse(font: &Font, data: FontData<'_>) -> ParseResult<Hdmx> {
        let mut cursor = data.cursor();

        let Some(head) = font.head.as_ref() else {
            return Err(SanitizeError::MissingDependency(Head::TAG));
        };
        let Some(maxp) = font.maxp.as_ref() else {
            return Err(SanitizeError::MissingDependency(Maxp::TAG));
        };

        if head.flags & FLAGS_PPEM_BITS == 0 {
            // hdmx may only be present when the head flags declare
            // ppem-dependent advance widths
            return Ok(TableOutcome::Dropped(DropReason::NotPermittedByFlags));
        }

        let version = cursor.read_u16()?;
        let num_records = cursor.read_i16()?;
        let size_device_record = cursor.read_i32()?;
        if version != 0 {
            return Ok(TableOutcome::Dropped(DropReason::UnsupportedVersion(
                version as u32,
            )));
        }
        if num_records <= 0 {
            return Ok(TableOutcome::Dropped(DropReason::BadRecordCount(
                num_records as i32,
            )));
        }

        let min_size_device_record = maxp.num_glyphs as i32 + 2;
        if size_device_record < min_size_device_record {
            return Ok(TableOutcome::Dropped(DropReason::StrideTooSmall {
                stride: size_device_record,
                min: min_size_device_record,
            }));
        }
        let pad_len = size_device_record - min_size_device_record;
        if pad_len > 3 {
            // records are 32-bit aligned at most, so no encoder emits
            // more than 3 bytes of padding
            return Err(SanitizeError::MalformedTable {
                reason: "implausible device record padding",
            });
        }

        let mut last_pixel_size = 0u8;
        let mut records = Vec::with_capacity(num_records as usize);
        for i in 0..num_records {
            let pixel_size = cursor.read_u8()?;
            let max_width = cursor.read_u8()?;
            if i != 0 && pixel_size <= last_pixel_size {
                return Ok(TableOutcome::Dropped(DropReason::UnsortedRecords));
            }
            last_pixel_size = pixel_size;

            let mut widths = Vec::with_capacity(maxp.num_glyphs as usize);
            for _ in 0..maxp.num_glyphs {
                widths.push(cursor.read_u8()?);
            }
            if pad_len > 0 {
                cursor.skip(pad_len as usize)?;
            }

            records.push(DeviceRecord {
                pixel_size,
                max_width,
                widths,
            });
        }

        Ok(TableOutcome::Kept(Hdmx {
            version,
            size_device_record,
            records,
            pad_len,
        }))
    }

    /// Device metrics only apply to fonts with TrueType outlines; for
    /// anything else the table is silently omitted from the output.
    pub(crate) fn should_serialize(&self, font: &Font) -> bool {
        font.glyf.is_some()
    }

    pub(crate) fn serialize(&self, out: &mut Serializer) -> Result<(), SanitizeError> {
        if self.records.len() > i16::MAX as usize {
            // cannot happen for a table produced by parse; treat it as
            // internal corruption
            return Err(SanitizeError::FieldOverflow);
        }
        out.write_u16(self.version)?;
        out.write_i16(self.records.len() as i16)?;
        out.write_i32(self.size_device_record)?;

        for record in &self.records {
            out.write_u8(record.pixel_size)?;
            out.write_u8(record.max_width)?;
            out.write_bytes(&record.widths)?;
            // padding content is not meaningful; normalize it to zeros
            out.write_zeros(self.pad_len as usize)?;
        }
        Ok(())
    }
}

pub(crate) fn parse_hdmx(
    font: &mut Font,
    data: FontData<'_>,
) -> Result<TableOutcome<()>, SanitizeError> {
    match Hdmx::parse(font, data)? {
        TableOutcome::Kept(table) => {
            font.hdmx = Some(table);
            Ok(TableOutcome::Kept(()))
        }
        TableOutcome::Dropped(reason) => Ok(TableOutcome::Dropped(reason)),
    }
}

pub(crate) fn is_present(font: &Font) -> bool {
    font.hdmx.is_some()
}

pub(crate) fn should_serialize(font: &Font) -> bool {
    font.hdmx.as_ref().is_some_and(|t| t.should_serialize(font))
}

pub(crate) fn serialize(font: &Font, out: &mut Serializer) -> Result<(), SanitizeError> {
    font.hdmx
        .as_ref()
        .ok_or(SanitizeError::MissingMandatoryTable(Hdmx::TAG))?
        .serialize(out)
}
