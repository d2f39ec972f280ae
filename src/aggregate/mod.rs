pub mod collapse;
pub mod hierarchy;
pub mod summary;

use crate::config::AggregationConfig;
use crate::error::{Result, TaxaError};
use crate::types::{AggregateRow, AnnotatedRecord, HierarchyNode, Rank};

use collapse::collapse_records;
use hierarchy::build_hierarchy;
use summary::summarize;

/// Output of one aggregation run.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Records that passed the filter; the denominator of every percentage.
    pub total: u64,
    /// Ranks making up each row key, outermost first.
    pub levels: Vec<Rank>,
    pub rows: Vec<AggregateRow>,
    pub tree: HierarchyNode,
}

/// Filters, collapses and groups annotated records into rows and a sunburst tree.
///
/// Fails with `InvalidConfig` before looking at any record, and with
/// `EmptyInput` when the filter leaves nothing to divide by.
pub fn aggregate(records: &[AnnotatedRecord], config: &AggregationConfig) -> Result<Aggregation> {
    let validated = config.validate()?;

    let filtered: Vec<&AnnotatedRecord> = records
        .iter()
        .filter(|record| validated.filter.accepts(record))
        .collect();
    if filtered.is_empty() {
        return Err(TaxaError::EmptyInput {
            records: records.len(),
        });
    }
    let total = filtered.len() as u64;
    log::info!(
        "Aggregating {} of {} records ({} filtered out)",
        total,
        records.len(),
        records.len() - filtered.len()
    );

    let collapsed = collapse_records(&filtered, &validated);
    let levels = validated.layout.levels();
    let rows = summarize(&collapsed, levels, total);
    log::info!("{} distinct {:?} groups", rows.len(), levels);

    let tree = build_hierarchy(&rows);

    Ok(Aggregation {
        total,
        levels: levels.to_vec(),
        rows,
        tree,
    })
}

/// Same as `aggregate`, keeping only the tree.
pub fn aggregate_tree(records: &[AnnotatedRecord], config: &AggregationConfig) -> Result<HierarchyNode> {
    aggregate(records, config).map(|aggregation| aggregation.tree)
}
