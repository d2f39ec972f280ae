//src/aggregate/summary.rs

use indexmap::IndexMap;

use crate::types::{AggregateRow, CollapsedRecord, Rank};

/// Groups collapsed records by their values at `levels` and turns each group
/// into a row with its count and share of `total`.
///
/// Rows come out in the order their key was first seen.
pub fn summarize(records: &[CollapsedRecord<'_>], levels: &[Rank], total: u64) -> Vec<AggregateRow> {
    let mut groups: IndexMap<Vec<&str>, u64> = IndexMap::new();
    for record in records {
        let key: Vec<&str> = levels.iter().map(|&rank| record.value(rank)).collect();
        *groups.entry(key).or_insert(0) += 1;
    }

    groups
        .into_iter()
        .map(|(key, count)| AggregateRow {
            key: key.into_iter().map(str::to_string).collect(),
            count,
            percentage: share(count, total),
        })
        .collect()
}

fn share(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}
