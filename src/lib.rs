// src/lib.rs
pub mod types;
pub mod error;
pub mod lineage;
pub mod annotate;
pub mod config;
pub mod aggregate;
pub mod tsv;
pub mod tree_json;

use rayon::prelude::*;
use std::path::Path;

use crate::aggregate::{aggregate, Aggregation};
use crate::annotate::annotate_all;
use crate::config::AggregationConfig;
use crate::error::Result;
use crate::lineage::LineageParser;
use crate::tsv::{read_classifications, read_split_table, write_split_records};
use crate::types::{AnnotatedRecord, ClassificationRecord, SplitRecord, RANK_COUNT};

pub use crate::error::TaxaError;
pub use crate::lineage::parse_lineage;
pub use crate::types::{HierarchyNode, RankVector};

/// Everything one pipeline run produces. Text outputs are generated on demand.
pub struct SunburstResults {
    /// One row per input record with its parsed ranks (the split table)
    pub split_records: Vec<SplitRecord>,

    /// Same records with placeholders in place of missing ranks
    pub annotated_records: Vec<AnnotatedRecord>,

    /// Rows and tree built from the filtered, collapsed records
    pub aggregation: Aggregation,
}

impl SunburstResults {
    /// Generate the tab-separated split table
    pub fn get_split_table(&self) -> Result<String> {
        let mut out = Vec::new();
        write_split_records(&mut out, &self.split_records)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Generate the sunburst JSON document
    pub fn get_sunburst_json(&self) -> Result<String> {
        tree_json::to_json_string(&self.aggregation.tree)
    }

    pub fn tree(&self) -> &HierarchyNode {
        &self.aggregation.tree
    }
}

/// Parses every record's lineage into ranks, keeping input order.
pub fn split_classifications(records: Vec<ClassificationRecord>, parser: LineageParser) -> Vec<SplitRecord> {
    let parsed: Vec<(SplitRecord, usize)> = records
        .into_par_iter()
        .map(|record| {
            let (ranks, depth) = parser.parse_with_depth(&record.lineage);
            (SplitRecord { record, ranks }, depth)
        })
        .collect();

    let truncated = parsed.iter().filter(|(_, depth)| *depth > RANK_COUNT).count();
    if truncated > 0 {
        log::warn!(
            "{} lineages had more than {} ranks; extra ranks were dropped",
            truncated,
            RANK_COUNT
        );
    }

    parsed.into_iter().map(|(split, _)| split).collect()
}

/// Annotates already split records and aggregates them.
pub fn build_sunburst(split_records: Vec<SplitRecord>, config: &AggregationConfig) -> Result<SunburstResults> {
    let annotated_records = annotate_all(&split_records);
    let aggregation = aggregate(&annotated_records, config)?;

    Ok(SunburstResults {
        split_records,
        annotated_records,
        aggregation,
    })
}

/// Full run from a classifier output file: read, split, annotate, aggregate.
pub fn sunburst_from_classifications<P: AsRef<Path>>(
    input: P,
    config: &AggregationConfig,
) -> Result<SunburstResults> {
    let records = read_classifications(input)?;
    let split_records = split_classifications(records, LineageParser::new(config.prefix_style));
    build_sunburst(split_records, config)
}

/// Run starting from a previously written split table.
pub fn sunburst_from_split_table<P: AsRef<Path>>(
    input: P,
    config: &AggregationConfig,
) -> Result<SunburstResults> {
    build_sunburst(read_split_table(input)?, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClassificationStatus;
    use serde_json::Value;
    use std::fs;

    const CLASSIFICATIONS: &str = "\
C\tr1\troot;k__Bacteria;p__Firmicutes;c__Bacilli;o__Bacillales;f__Bacillaceae;g__Bacillus;s__Bacillus_subtilis
C\tr2\troot;k__Bacteria;p__Proteobacteria;c__Gammaproteobacteria;o__Enterobacterales;f__Enterobacteriaceae;g__Escherichia;s__Escherichia_coli
U\tr3\tunclassified
C\tr4\troot;k__Bacteria;p__Firmicutes;c__Bacilli;o__Bacillales;f__Bacillaceae;g__Bacillus;s__Bacillus_subtilis
C\tr5\troot;k__Bacteria;p__Tenericutes
C\tr6\troot;k__Eukaryota;p__Chordata
C\tr7\tk__Bacteria;p__Firmicutes;c__Bacilli;o__Bacillales;f__Bacillaceae;g__Bacillus;s__Bacillus_cereus;t__strain
";

    #[test]
    fn test_split_preserves_order() {
        let records: Vec<ClassificationRecord> = (0..100)
            .map(|i| ClassificationRecord {
                status: ClassificationStatus::Classified,
                read_id: format!("r{i}"),
                lineage: format!("k__K{i};p__P{i}"),
            })
            .collect();
        let split = split_classifications(records, LineageParser::default());
        for (i, s) in split.iter().enumerate() {
            assert_eq!(s.record.read_id, format!("r{i}"));
            assert_eq!(s.ranks.slots()[1].as_deref(), Some(format!("P{i}").as_str()));
        }
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("taxa_classifications.tsv");
        fs::write(&input, CLASSIFICATIONS).unwrap();

        let results = sunburst_from_classifications(&input, &AggregationConfig::default())
            .expect("pipeline runs");

        assert_eq!(results.split_records.len(), 7);
        assert_eq!(results.annotated_records[2].class, "Unclassified Classes");
        // r1, r2, r4, r5, r7: classified bacteria
        assert_eq!(results.aggregation.total, 5);

        let tree: Value = serde_json::from_str(&results.get_sunburst_json().unwrap()).unwrap();
        assert_eq!(tree["name"], "root");
        assert!(tree.get("value").is_none());
        let phyla: Vec<&str> = tree["children"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(phyla, vec!["Firmicutes", "Proteobacteria", "Other Phyla"]);

        let firmicutes = results.tree().child("Firmicutes").unwrap();
        assert!((firmicutes.percentage.unwrap() - 0.6).abs() < 1e-12);
        let bacillus = firmicutes.child("Bacillus").unwrap();
        assert_eq!(bacillus.child("Bacillus_subtilis").and_then(|s| s.value), Some(2));
        assert_eq!(bacillus.child("Bacillus_cereus").and_then(|s| s.value), Some(1));

        let tenericutes = results
            .tree()
            .child("Other Phyla")
            .and_then(|p| p.child("Unclassified Genera"))
            .and_then(|g| g.child("Unclassified Species"))
            .unwrap();
        assert_eq!(tenericutes.value, Some(1));
    }

    #[test]
    fn test_split_table_feeds_second_stage() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("taxa_classifications.tsv");
        let split_path = dir.path().join("taxa_classifications_splited.tsv");
        fs::write(&input, CLASSIFICATIONS).unwrap();

        let config = AggregationConfig::default();
        let first = sunburst_from_classifications(&input, &config).unwrap();
        fs::write(&split_path, first.get_split_table().unwrap()).unwrap();

        let second = sunburst_from_split_table(&split_path, &config).unwrap();
        assert_eq!(second.split_records, first.split_records);
        assert_eq!(second.aggregation.rows, first.aggregation.rows);
        assert_eq!(second.tree(), first.tree());
    }

    #[test]
    fn test_nothing_left_after_filter() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("only_unclassified.tsv");
        fs::write(&input, "U\tr1\tunclassified\nU\tr2\tUnclassified\n").unwrap();

        assert!(matches!(
            sunburst_from_classifications(&input, &AggregationConfig::default()),
            Err(TaxaError::EmptyInput { records: 2 })
        ));
    }
}
