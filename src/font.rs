//! Per-pass font state, the table registry, and dependency resolution.

use font_types::Tag;

use crate::error::{DropReason, SanitizeError, TableOutcome};
use crate::font_data::FontData;
use crate::serialize::Serializer;
use crate::tables::glyf::{self, Glyf};
use crate::tables::hdmx::{self, Hdmx};
use crate::tables::head::{self, Head};
use crate::tables::hhea::{self, Hhea};
use crate::tables::hmtx::{self, Hmtx};
use crate::tables::maxp::{self, Maxp};

/// Every table parsed so far in one sanitization pass, plus the drop
/// ledger.
///
/// A `Some` table has passed its own parse validation; dependent tables
/// borrow these (never own them) through the `&Font` handed to their
/// parse. One `Font` exists per [`sanitize`](crate::sanitize()) call
/// and nothing persists across calls.
#[derive(Debug, Default)]
pub struct Font {
    pub head: Option<Head>,
    pub hhea: Option<Hhea>,
    pub maxp: Option<Maxp>,
    pub hmtx: Option<Hmtx>,
    pub hdmx: Option<Hdmx>,
    pub glyf: Option<Glyf>,
    dropped: Vec<DroppedTable>,
}

/// One entry in the drop ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DroppedTable {
    pub tag: Tag,
    pub reason: DropReason,
}

impl Font {
    /// Tables removed from the output, with the reason each was removed.
    pub fn dropped(&self) -> &[DroppedTable] {
        &self.dropped
    }

    pub(crate) fn record_drop(&mut self, tag: Tag, reason: DropReason) {
        log::warn!("dropping '{tag}': {reason}");
        self.dropped.push(DroppedTable { tag, reason });
    }

    pub(crate) fn take_dropped(self) -> Vec<DroppedTable> {
        self.dropped
    }
}

/// The static per-type descriptor the orchestrator dispatches through.
///
/// The set of table types is fixed at build time, so dispatch is a flat
/// array of function pointers rather than trait objects.
pub(crate) struct TableType {
    pub tag: Tag,
    /// A font where this table is missing (or dropped) is rejected.
    pub mandatory: bool,
    /// Whether two directory entries may alias this table's exact byte
    /// range. Only verbatim pass-through tables are safe to alias.
    pub range_reusable: bool,
    /// Tables that must have parsed before this one. The graph is fixed
    /// per table type and is never influenced by the input.
    pub dependencies: &'static [Tag],
    pub parse: fn(&mut Font, FontData<'_>) -> Result<TableOutcome<()>, SanitizeError>,
    pub is_present: fn(&Font) -> bool,
    pub should_serialize: fn(&Font) -> bool,
    pub serialize: fn(&Font, &mut Serializer) -> Result<(), SanitizeError>,
}

pub(crate) static TABLE_REGISTRY: &[TableType] = &[
    TableType {
        tag: Head::TAG,
        mandatory: true,
        range_reusable: false,
        dependencies: &[],
        parse: head::parse_head,
        is_present: head::is_present,
        should_serialize: head::should_serialize,
        serialize: head::serialize,
    },
    TableType {
        tag: Maxp::TAG,
        mandatory: true,
        range_reusable: false,
        dependencies: &[],
        parse: maxp::parse_maxp,
        is_present: maxp::is_present,
        should_serialize: maxp::should_serialize,
        serialize: maxp::serialize,
    },
    TableType {
        tag: Hhea::TAG,
        mandatory: true,
        range_reusable: false,
        dependencies: &[],
        parse: hhea::parse_hhea,
        is_present: hhea::is_present,
        should_serialize: hhea::should_serialize,
        serialize: hhea::serialize,
    },
    TableType {
        tag: Glyf::TAG,
        mandatory: false,
        range_reusable: true,
        dependencies: &[],
        parse: glyf::parse_glyf,
        is_present: glyf::is_present,
        should_serialize: glyf::should_serialize,
        serialize: glyf::serialize,
    },
    TableType {
        tag: Hmtx::TAG,
        mandatory: true,
        range_reusable: false,
        dependencies: &[Hhea::TAG, Maxp::TAG],
        parse: hmtx::parse_hmtx,
        is_present: hmtx::is_present,
        should_serialize: hmtx::should_serialize,
        serialize: hmtx::serialize,
    },
    TableType {
        tag: Hdmx::TAG,
        mandatory: false,
        range_reusable: false,
        dependencies: &[Head::TAG, Maxp::TAG],
        parse: hdmx::parse_hdmx,
        is_present: hdmx::is_present,
        should_serialize: hdmx::should_serialize,
        serialize: hdmx::serialize,
    },
];

pub(crate) fn registry_entry(tag: Tag) -> Option<&'static TableType> {
    TABLE_REGISTRY.iter().find(|t| t.tag == tag)
}

/// The registry ordered so that every table's dependencies precede it.
///
/// Kahn's algorithm over the fixed dependency graph, with registry order
/// as the tiebreak so the result is deterministic. A cycle in the graph
/// is a programming error; the unit test below precludes it (a cyclic
/// entry would simply never become ready and would be absent from the
/// returned order).
pub(crate) fn parse_order() -> Vec<&'static TableType> {
    let mut order = Vec::with_capacity(TABLE_REGISTRY.len());
    let mut placed = vec![false; TABLE_REGISTRY.len()];
    loop {
        let mut progressed = false;
        for (i, table) in TABLE_REGISTRY.iter().enumerate() {
            if placed[i] {
                continue;
            }
            let ready = table.dependencies.iter().all(|dep| {
                TABLE_REGISTRY
                    .iter()
                    .position(|t| t.tag == *dep)
                    .map_or(true, |j| placed[j])
            });
            if ready {
                placed[i] = true;
                order.push(table);
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_order_is_complete_and_acyclic() {
        let order = parse_order();
        // a cycle would leave entries out of the order
        assert_eq!(order.len(), TABLE_REGISTRY.len());
    }

    #[test]
    fn dependencies_precede_dependents() {
        let order = parse_order();
        for (i, table) in order.iter().enumerate() {
            for dep in table.dependencies {
                let dep_index = order
                    .iter()
                    .position(|t| t.tag == *dep)
                    .unwrap_or_else(|| panic!("dependency '{dep}' of '{}' not in registry", table.tag));
                assert!(
                    dep_index < i,
                    "'{dep}' must parse before '{}'",
                    table.tag
                );
            }
        }
    }

    #[test]
    fn dependencies_are_registered() {
        for table in TABLE_REGISTRY {
            for dep in table.dependencies {
                assert!(
                    registry_entry(*dep).is_some(),
                    "'{}' depends on unregistered '{dep}'",
                    table.tag
                );
            }
        }
    }

    #[test]
    fn drop_ledger_records_reasons() {
        let mut font = Font::default();
        font.record_drop(Hdmx::TAG, DropReason::UnsortedRecords);
        assert_eq!(
            font.dropped(),
            &[DroppedTable {
                tag: Hdmx::TAG,
                reason: DropReason::UnsortedRecords
            }]
        );
    }
}
