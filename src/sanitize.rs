//! The top-level sanitization pass.

use font_types::Tag;

use crate::directory::{
    serialize_directory, TableDirectory, TableRecord, DIRECTORY_HEADER_LEN, TABLE_RECORD_LEN,
};
use crate::error::{DropReason, SanitizeError, TableOutcome};
use crate::font::{parse_order, registry_entry, DroppedTable, Font, TABLE_REGISTRY};
use crate::font_data::FontData;
use crate::serialize::{checksum, Serializer};
use crate::tables::head::{Head, CHECKSUM_ADJUSTMENT_OFFSET, CHECKSUM_MAGIC};

/// The result of a successful pass: the re-emitted font plus the ledger
/// of tables that were dropped along the way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SanitizedFont {
    bytes: Vec<u8>,
    dropped: Vec<DroppedTable>,
}

impl SanitizedFont {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Tables removed from the output, in the order they were dropped.
    pub fn dropped(&self) -> &[DroppedTable] {
        &self.dropped
    }
}

/// Validates an untrusted font file and re-emits the tables that
/// survive.
///
/// On success the returned bytes form a complete sfnt container with a
/// freshly computed directory, holding only validated (or, for
/// pass-through tables, verbatim-copied) table data. On failure the
/// font was rejected outright and no output exists.
pub fn sanitize(data: &[u8]) -> Result<SanitizedFont, SanitizeError> {
    let data = FontData::new(data);
    let directory = TableDirectory::parse(data)?;
    let mut font = Font::default();

    // tables with no handler never reach the output
    for record in &directory.records {
        if registry_entry(record.tag).is_none() {
            font.record_drop(record.tag, DropReason::UnsupportedTable);
        }
    }

    for table_type in parse_order() {
        let Some(record) = directory.get(table_type.tag) else {
            continue;
        };
        let start = record.offset as usize;
        let bytes = data
            .slice(start..start + record.length as usize)
            .ok_or(SanitizeError::EntryOutOfBounds(record.tag))?;
        log::trace!("parsing '{}' ({} bytes)", table_type.tag, record.length);
        match (table_type.parse)(&mut font, bytes) {
            Ok(TableOutcome::Kept(())) => {}
            Ok(TableOutcome::Dropped(reason)) => font.record_drop(table_type.tag, reason),
            Err(err) => {
                let err = err.for_table(table_type.tag);
                log::error!("rejecting font: {err}");
                return Err(err);
            }
        }
    }

    for table_type in TABLE_REGISTRY {
        if table_type.mandatory && !(table_type.is_present)(&font) {
            return Err(SanitizeError::MissingMandatoryTable(table_type.tag));
        }
    }

    let bytes = serialize_font(&font, &directory)?;
    Ok(SanitizedFont {
        bytes,
        dropped: font.take_dropped(),
    })
}

struct EmittedTable {
    tag: Tag,
    checksum: u32,
    bytes: Vec<u8>,
}

fn serialize_font(font: &Font, directory: &TableDirectory) -> Result<Vec<u8>, SanitizeError> {
    let mut emitted = Vec::new();
    for table_type in TABLE_REGISTRY {
        if !(table_type.is_present)(font) {
            continue;
        }
        if !(table_type.should_serialize)(font) {
            log::debug!("omitting '{}' from output", table_type.tag);
            continue;
        }
        let Some(record) = directory.get(table_type.tag) else {
            // a table can only have been parsed out of the directory
            continue;
        };
        // no table re-serializes to more than its validated input length
        let mut sink = Serializer::new(record.length as usize);
        (table_type.serialize)(font, &mut sink).map_err(|e| e.for_table(table_type.tag))?;
        let bytes = sink.into_vec();
        emitted.push(EmittedTable {
            tag: table_type.tag,
            checksum: checksum(&bytes),
            bytes,
        });
    }
    emitted.sort_by_key(|table| table.tag);

    let header_len = DIRECTORY_HEADER_LEN + emitted.len() * TABLE_RECORD_LEN;
    let mut position = header_len;
    let mut records = Vec::with_capacity(emitted.len());
    for table in &emitted {
        records.push(TableRecord {
            tag: table.tag,
            checksum: table.checksum,
            offset: u32::try_from(position).map_err(|_| SanitizeError::FieldOverflow)?,
            length: u32::try_from(table.bytes.len()).map_err(|_| SanitizeError::FieldOverflow)?,
        });
        position += round4(table.bytes.len());
    }

    let mut out = Serializer::new(position);
    serialize_directory(&mut out, directory.sfnt_version, &records)?;
    let mut adjustment_slot = None;
    for table in &emitted {
        if table.tag == Head::TAG {
            adjustment_slot = Some(out.position() + CHECKSUM_ADJUSTMENT_OFFSET);
        }
        out.write_bytes(&table.bytes)?;
        out.pad_to_alignment(4)?;
    }

    // whole-file checksum, taken while the adjustment slot is still zero
    if let Some(slot) = adjustment_slot {
        let adjustment = CHECKSUM_MAGIC.wrapping_sub(checksum(out.as_bytes()));
        out.patch_u32(slot, adjustment)?;
    }

    Ok(out.into_vec())
}

fn round4(n: usize) -> usize {
    (n + 3) & !3
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_helpers::{
        build_font, head_bytes, hhea_bytes, hmtx_bytes, maxp_bytes_v05, maxp_bytes_v10, BeBuffer,
    };

    const GLYF: Tag = Tag::new(b"glyf");
    const HDMX: Tag = Tag::new(b"hdmx");
    const HEAD: Tag = Tag::new(b"head");
    const HHEA: Tag = Tag::new(b"hhea");
    const HMTX: Tag = Tag::new(b"hmtx");
    const MAXP: Tag = Tag::new(b"maxp");

    // head flags with bit 2 set, permitting hdmx
    const PPEM_FLAGS: u16 = 0x000f;

    fn hdmx_bytes() -> Vec<u8> {
        BeBuffer::new()
            .u16(0) // version
            .i16(2) // num_records
            .i32(6) // size_device_record: 2 + 3 glyphs + 1 pad
            .bytes(&[8, 13, 10, 12, 13, 0xcc])
            .bytes(&[16, 21, 18, 20, 21, 0xcc])
            .into_vec()
    }

    fn truetype_font(hdmx: &[u8]) -> Vec<u8> {
        build_font(&[
            (HEAD, &head_bytes(PPEM_FLAGS)),
            (HHEA, &hhea_bytes(2)),
            (MAXP, &maxp_bytes_v10(3)),
            (HMTX, &hmtx_bytes(2, 1)),
            (GLYF, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]),
            (HDMX, hdmx),
        ])
    }

    fn output_tags(bytes: &[u8]) -> Vec<Tag> {
        let directory = TableDirectory::parse(FontData::new(bytes)).expect("output must revalidate");
        directory.records.iter().map(|r| r.tag).collect()
    }

    #[test]
    fn full_pass_keeps_all_valid_tables() {
        let _ = env_logger::builder().is_test(true).try_init();
        let input = truetype_font(&hdmx_bytes());
        let sanitized = sanitize(&input).unwrap();
        assert!(sanitized.dropped().is_empty());
        assert_eq!(
            output_tags(sanitized.as_bytes()),
            vec![GLYF, HDMX, HEAD, HHEA, HMTX, MAXP]
        );
    }

    #[test]
    fn output_is_idempotent() {
        let input = truetype_font(&hdmx_bytes());
        let first = sanitize(&input).unwrap().into_bytes();
        let second = sanitize(&first).unwrap().into_bytes();
        assert_eq!(first, second);
    }

    #[test]
    fn hdmx_padding_is_normalized_in_output() {
        let input = truetype_font(&hdmx_bytes());
        let sanitized = sanitize(&input).unwrap();
        let directory = TableDirectory::parse(FontData::new(sanitized.as_bytes())).unwrap();
        let record = directory.get(HDMX).expect("hdmx survived");
        let start = record.offset as usize;
        let body = &sanitized.as_bytes()[start..start + record.length as usize];
        // padding bytes (offsets 13 and 19 in the table) must be zero now
        assert_eq!(body[13], 0);
        assert_eq!(body[19], 0);
        assert_eq!(record.length, 20);
    }

    #[test]
    fn whole_file_checksum_is_patched() {
        let input = truetype_font(&hdmx_bytes());
        let sanitized = sanitize(&input).unwrap();
        assert_eq!(checksum(sanitized.as_bytes()), CHECKSUM_MAGIC);
    }

    #[test]
    fn unknown_hdmx_version_drops_only_that_table() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut hdmx = hdmx_bytes();
        hdmx[0..2].copy_from_slice(&1u16.to_be_bytes());
        let input = truetype_font(&hdmx);
        let sanitized = sanitize(&input).unwrap();
        assert_eq!(
            sanitized.dropped(),
            &[DroppedTable {
                tag: HDMX,
                reason: DropReason::UnsupportedVersion(1)
            }]
        );
        assert_eq!(
            output_tags(sanitized.as_bytes()),
            vec![GLYF, HEAD, HHEA, HMTX, MAXP]
        );
    }

    #[test]
    fn truncated_hdmx_rejects_the_whole_font() {
        let mut hdmx = hdmx_bytes();
        // claim more records than the data holds
        hdmx[2..4].copy_from_slice(&9i16.to_be_bytes());
        let input = truetype_font(&hdmx);
        assert_eq!(
            sanitize(&input),
            Err(SanitizeError::Table {
                tag: HDMX,
                source: Box::new(SanitizeError::OutOfBounds)
            })
        );
    }

    #[test]
    fn hdmx_survives_parse_but_is_omitted_without_glyf() {
        // hdmx is meaningless without TrueType outlines
        let input = build_font(&[
            (HEAD, &head_bytes(PPEM_FLAGS)),
            (HHEA, &hhea_bytes(2)),
            (MAXP, &maxp_bytes_v05(3)),
            (HMTX, &hmtx_bytes(2, 1)),
            (HDMX, &hdmx_bytes()),
        ]);
        let sanitized = sanitize(&input).unwrap();
        // omission is silent: not an error, not a drop
        assert!(sanitized.dropped().is_empty());
        assert_eq!(
            output_tags(sanitized.as_bytes()),
            vec![HEAD, HHEA, HMTX, MAXP]
        );
    }

    #[test]
    fn missing_dependency_table_is_fatal() {
        // hmtx is present but maxp is not: the dependent escalates
        let input = build_font(&[
            (HEAD, &head_bytes(PPEM_FLAGS)),
            (HHEA, &hhea_bytes(2)),
            (HMTX, &hmtx_bytes(2, 1)),
        ]);
        assert_eq!(
            sanitize(&input),
            Err(SanitizeError::Table {
                tag: HMTX,
                source: Box::new(SanitizeError::MissingDependency(MAXP))
            })
        );
    }

    #[test]
    fn missing_mandatory_table_is_fatal() {
        let input = build_font(&[
            (HEAD, &head_bytes(PPEM_FLAGS)),
            (MAXP, &maxp_bytes_v05(3)),
        ]);
        assert_eq!(
            sanitize(&input),
            Err(SanitizeError::MissingMandatoryTable(HHEA))
        );
    }

    #[test]
    fn unknown_tables_are_dropped() {
        let input = build_font(&[
            (HEAD, &head_bytes(PPEM_FLAGS)),
            (HHEA, &hhea_bytes(2)),
            (MAXP, &maxp_bytes_v05(3)),
            (HMTX, &hmtx_bytes(2, 1)),
            (Tag::new(b"kern"), &[0, 0, 0, 0]),
        ]);
        let sanitized = sanitize(&input).unwrap();
        assert_eq!(
            sanitized.dropped(),
            &[DroppedTable {
                tag: Tag::new(b"kern"),
                reason: DropReason::UnsupportedTable
            }]
        );
        assert_eq!(
            output_tags(sanitized.as_bytes()),
            vec![HEAD, HHEA, HMTX, MAXP]
        );
    }

    #[test]
    fn corrupt_mandatory_table_is_fatal() {
        let mut maxp = maxp_bytes_v05(3);
        maxp[4..6].copy_from_slice(&0u16.to_be_bytes()); // zero glyphs
        let input = build_font(&[
            (HEAD, &head_bytes(PPEM_FLAGS)),
            (HHEA, &hhea_bytes(2)),
            (MAXP, &maxp),
            (HMTX, &hmtx_bytes(2, 1)),
        ]);
        assert_eq!(
            sanitize(&input),
            Err(SanitizeError::Table {
                tag: MAXP,
                source: Box::new(SanitizeError::MalformedTable {
                    reason: "font contains no glyphs"
                })
            })
        );
    }

    #[test]
    fn not_a_font_is_rejected() {
        assert!(sanitize(b"not a font at all").is_err());
        assert!(sanitize(&[]).is_err());
    }
}
