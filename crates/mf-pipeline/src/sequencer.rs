//! Deterministic ordering of collected entries.

use std::cmp::Ordering;

use mf_types::Entry;

use crate::config::SortOrder;

/// Root index ascending, then relative path compared by code point.
pub fn default_order(a: &Entry, b: &Entry) -> Ordering {
    a.root
        .cmp(&b.root)
        .then_with(|| a.path.as_bytes().cmp(b.path.as_bytes()))
}

/// Order entries for deduplication.
///
/// `Unsorted` leaves completion order untouched. The other orders use a
/// stable sort, so entries that compare equal keep their relative order.
pub fn sequence(mut entries: Vec<Entry>, order: &SortOrder) -> Vec<Entry> {
    match order {
        SortOrder::Default => entries.sort_by(default_order),
        SortOrder::Unsorted => {}
        SortOrder::Custom(compare) => entries.sort_by(|a, b| compare(a, b)),
    }
    entries
}
