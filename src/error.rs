//! The two-tier outcome model: fatal rejection vs. local table drop.

use font_types::Tag;
use thiserror::Error;

/// A condition that makes the whole font unsafe to emit.
///
/// When any table parse returns one of these, the sanitization pass is
/// aborted and no output is produced.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SanitizeError {
    /// A read would have run past the end of the supplied data.
    #[error("unexpected end of data")]
    OutOfBounds,
    #[error("not an sfnt container (version 0x{0:08X})")]
    InvalidSfntVersion(u32),
    #[error("font contains no tables")]
    EmptyDirectory,
    #[error("table directory is not ordered by tag at '{0}'")]
    UnorderedDirectory(Tag),
    #[error("table '{0}' lies outside the file")]
    EntryOutOfBounds(Tag),
    #[error("tables '{0}' and '{1}' overlap")]
    OverlappingTables(Tag, Tag),
    #[error("{reason}")]
    MalformedTable { reason: &'static str },
    #[error("missing '{0}' table, required by a sibling table")]
    MissingDependency(Tag),
    #[error("mandatory table '{0}' is missing")]
    MissingMandatoryTable(Tag),
    /// The output sink was asked to grow past its fixed capacity. This
    /// always indicates internal corruption, never a property of the input.
    #[error("output capacity exceeded")]
    OutputCapacity,
    #[error("value does not fit the output field width")]
    FieldOverflow,
    /// A fatal error, annotated with the table it occurred in.
    #[error("table '{tag}': {source}")]
    Table {
        tag: Tag,
        #[source]
        source: Box<SanitizeError>,
    },
}

impl SanitizeError {
    /// Attach the tag of the table being processed, unless one is
    /// already attached.
    pub(crate) fn for_table(self, tag: Tag) -> Self {
        match self {
            SanitizeError::Table { .. } => self,
            other => SanitizeError::Table {
                tag,
                source: Box::new(other),
            },
        }
    }
}

/// Why one table was removed while the rest of the font survived.
///
/// A drop is always observable: the orchestrator logs it and records it
/// in the [`Font`](crate::Font) drop ledger.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DropReason {
    #[error("unsupported version {0}")]
    UnsupportedVersion(u32),
    #[error("table is not permitted by the head flags")]
    NotPermittedByFlags,
    #[error("record count {0} is not positive")]
    BadRecordCount(i32),
    #[error("record stride {stride} is below the minimum {min}")]
    StrideTooSmall { stride: i32, min: i32 },
    #[error("records are not sorted")]
    UnsortedRecords,
    #[error("no handler for this table")]
    UnsupportedTable,
}

/// The result of parsing one table: kept, or locally dropped.
///
/// Combined with `Result`, a table parse has exactly three outcomes
/// (`Ok(Kept)`, `Ok(Dropped)`, `Err(fatal)`), which the orchestrator
/// matches exhaustively.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableOutcome<T> {
    Kept(T),
    Dropped(DropReason),
}

pub(crate) type ParseResult<T> = Result<TableOutcome<T>, SanitizeError>;
