//! Sanitization of untrusted font files.
//!
//! This crate parses a binary sfnt container, validates every table it
//! understands against format and cross-table consistency rules, and
//! re-emits a byte stream a rendering engine can consume without
//! further defensive checking. Failures come in two tiers: a
//! non-conformant table the font can live without is *dropped* from the
//! output, while data that cannot be safely interpreted at all (a
//! truncated read, a missing mandatory sibling) *rejects* the whole
//! font. When in doubt, it rejects; there is no best-effort recovery.
//!
//! The entry point is [`sanitize`]:
//!
//! ```
//! # fn run(untrusted_bytes: &[u8]) -> Result<(), sanitize_fonts::SanitizeError> {
//! let sanitized = sanitize_fonts::sanitize(untrusted_bytes)?;
//! for dropped in sanitized.dropped() {
//!     eprintln!("dropped '{}': {}", dropped.tag, dropped.reason);
//! }
//! let safe_bytes = sanitized.into_bytes();
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod directory;
mod error;
mod font;
mod font_data;
mod serialize;
mod sanitize;
pub mod tables;

#[cfg(test)]
mod test_helpers;

pub use error::{DropReason, SanitizeError, TableOutcome};
pub use font::{DroppedTable, Font};
pub use font_data::{Cursor, FontData};
pub use sanitize::{sanitize, SanitizedFont};
pub use serialize::Serializer;

pub(crate) use error::ParseResult;
