//! Result-set cleanup before POIs are shown to the answer composer.

use std::collections::HashSet;

use wayfind_core::PoiRecord;

/// Drop unnamed records and collapse duplicate names to their first
/// occurrence.
///
/// Names are trimmed; duplicates are detected case-insensitively. Input
/// order is preserved.
pub fn normalize_for_display(records: Vec<PoiRecord>) -> Vec<PoiRecord> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(records.len());

    for mut record in records {
        let Some(name) = record.display_name().map(str::to_string) else {
            continue;
        };
        if !seen.insert(name.to_lowercase()) {
            continue;
        }
        record.name = Some(name);
        out.push(record);
    }

    out
}
