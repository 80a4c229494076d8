//! The sfnt table directory: parsing, validation, and layout of the
//! regenerated directory for the output.

use font_types::Tag;

use crate::error::SanitizeError;
use crate::font::registry_entry;
use crate::font_data::FontData;
use crate::serialize::Serializer;

/// The sfnt version for fonts containing TrueType outlines.
pub const TT_SFNT_VERSION: u32 = 0x00010000;
/// The sfnt version for fonts containing CFF outlines.
pub const CFF_SFNT_VERSION: u32 = 0x4F54544F;

pub(crate) const DIRECTORY_HEADER_LEN: usize = 12;
pub(crate) const TABLE_RECORD_LEN: usize = 16;

/// One (tag, offset, length) triple from the input directory.
///
/// The offsets and lengths are attacker-controlled; nothing reads
/// through them until [`TableDirectory::parse`] has bounds-validated the
/// whole set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TableRecord {
    pub tag: Tag,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TableDirectory {
    pub sfnt_version: u32,
    pub records: Vec<TableRecord>,
}

impl TableDirectory {
    /// Reads and fully validates the directory: sfnt version, tag
    /// ordering, per-entry bounds, and range overlap. Any violation is
    /// fatal; a font whose index cannot be trusted has no salvageable
    /// parts.
    pub(crate) fn parse(data: FontData<'_>) -> Result<Self, SanitizeError> {
        let mut cursor = data.cursor();

        let sfnt_version = cursor.read_u32()?;
        if sfnt_version != TT_SFNT_VERSION && sfnt_version != CFF_SFNT_VERSION {
            return Err(SanitizeError::InvalidSfntVersion(sfnt_version));
        }
        let num_tables = cursor.read_u16()?;
        if num_tables == 0 {
            return Err(SanitizeError::EmptyDirectory);
        }
        let search_range = cursor.read_u16()?;
        let entry_selector = cursor.read_u16()?;
        let range_shift = cursor.read_u16()?;
        let expected = SearchRange::compute(num_tables as usize, TABLE_RECORD_LEN);
        if (search_range, entry_selector, range_shift)
            != (
                expected.search_range,
                expected.entry_selector,
                expected.range_shift,
            )
        {
            // recomputed on output either way
            log::debug!("inconsistent search range fields in directory header");
        }

        let directory_end = DIRECTORY_HEADER_LEN + num_tables as usize * TABLE_RECORD_LEN;
        let mut records = Vec::with_capacity(num_tables as usize);
        let mut prev_tag: Option<Tag> = None;
        for _ in 0..num_tables {
            let record = TableRecord {
                tag: cursor.read_tag()?,
                checksum: cursor.read_u32()?,
                offset: cursor.read_u32()?,
                length: cursor.read_u32()?,
            };
            if prev_tag.is_some_and(|prev| record.tag <= prev) {
                return Err(SanitizeError::UnorderedDirectory(record.tag));
            }
            prev_tag = Some(record.tag);

            // u64 math so offset + length cannot wrap
            let start = record.offset as u64;
            let end = start + record.length as u64;
            if start < directory_end as u64 || end > data.len() as u64 {
                return Err(SanitizeError::EntryOutOfBounds(record.tag));
            }
            records.push(record);
        }

        check_overlap(&records)?;

        Ok(TableDirectory {
            sfnt_version,
            records,
        })
    }

    pub(crate) fn get(&self, tag: Tag) -> Option<&TableRecord> {
        self.records.iter().find(|r| r.tag == tag)
    }
}

/// Table byte ranges must be disjoint. Two entries may alias the exact
/// same range only when both table types are declared range-reusable;
/// any other intersection means the directory is lying about the file
/// layout.
fn check_overlap(records: &[TableRecord]) -> Result<(), SanitizeError> {
    let mut by_offset: Vec<&TableRecord> = records.iter().collect();
    by_offset.sort_by_key(|r| (r.offset, r.length));
    for pair in by_offset.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let a_end = a.offset as u64 + a.length as u64;
        if a_end <= b.offset as u64 {
            continue;
        }
        let identical = a.offset == b.offset && a.length == b.length;
        let both_reusable = [a, b].iter().all(|r| {
            registry_entry(r.tag).is_some_and(|t| t.range_reusable)
        });
        if !(identical && both_reusable) {
            return Err(SanitizeError::OverlappingTables(a.tag, b.tag));
        }
    }
    Ok(())
}

/// The binary-search acceleration fields in the directory header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SearchRange {
    pub search_range: u16,
    pub entry_selector: u16,
    pub range_shift: u16,
}

impl SearchRange {
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/otff#table-directory>
    pub(crate) fn compute(n_items: usize, item_size: usize) -> SearchRange {
        let mut max_pow2 = 15usize.min(n_items.max(1).ilog2() as usize);
        // all three fields are u16 in the header, so back off the
        // exponent until the byte count is representable
        while max_pow2 > 0 && (1usize << max_pow2) * item_size > u16::MAX as usize {
            max_pow2 -= 1;
        }
        let search_range = (1 << max_pow2) * item_size;
        let range_shift = (n_items * item_size)
            .saturating_sub(search_range)
            .min(u16::MAX as usize);
        SearchRange {
            search_range: search_range as u16,
            entry_selector: max_pow2 as u16,
            range_shift: range_shift as u16,
        }
    }
}

/// Writes the regenerated directory header and records for the tables
/// that survived. `records` must already be sorted by tag with final
/// offsets and lengths filled in.
pub(crate) fn serialize_directory(
    out: &mut Serializer,
    sfnt_version: u32,
    records: &[TableRecord],
) -> Result<(), SanitizeError> {
    if records.len() > u16::MAX as usize {
        return Err(SanitizeError::FieldOverflow);
    }
    out.write_u32(sfnt_version)?;
    out.write_u16(records.len() as u16)?;
    let computed = SearchRange::compute(records.len(), TABLE_RECORD_LEN);
    out.write_u16(computed.search_range)?;
    out.write_u16(computed.entry_selector)?;
    out.write_u16(computed.range_shift)?;
    for record in records {
        out.write_tag(record.tag)?;
        out.write_u32(record.checksum)?;
        out.write_u32(record.offset)?;
        out.write_u32(record.length)?;
    }
    Ok(())
}
