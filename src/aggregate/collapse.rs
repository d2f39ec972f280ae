//src/aggregate/collapse.rs

use ahash::AHashSet;
use indexmap::IndexMap;
use std::cmp::Reverse;

use crate::config::ValidatedConfig;
use crate::types::{AnnotatedRecord, CollapsedRecord, Rank};

/// Occurrence counts per category, in first-seen order.
pub fn category_frequencies<'a, I>(values: I) -> IndexMap<&'a str, u64>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: IndexMap<&'a str, u64> = IndexMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
}

/// The `n` most frequent categories, most frequent first.
///
/// Ties keep first-seen order (the sort is stable), so exactly
/// `min(n, distinct)` categories are returned and the result is reproducible.
pub fn top_n_categories<'a, I>(values: I, n: usize) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ranked: Vec<(&str, u64)> = category_frequencies(values).into_iter().collect();
    ranked.sort_by_key(|&(_, count)| Reverse(count));
    ranked.into_iter().take(n).map(|(name, _)| name).collect()
}

/// Keeps `value` if it is retained, otherwise returns the rank's "Other" bucket.
pub fn collapse_value<'a>(value: &'a str, retained: &AHashSet<&str>, rank: Rank) -> &'a str {
    if retained.contains(value) {
        value
    } else {
        rank.other_bucket()
    }
}

/// Adds collapsed phylum, genus and species to every filtered record.
///
/// Top-N frequencies are computed over `records` only, i.e. after filtering.
pub fn collapse_records<'a>(
    records: &[&'a AnnotatedRecord],
    config: &ValidatedConfig<'_>,
) -> Vec<CollapsedRecord<'a>> {
    let top_genera: AHashSet<&str> =
        top_n_categories(records.iter().map(|r| r.genus.as_str()), config.genus_top_n)
            .into_iter()
            .collect();
    let top_species: AHashSet<&str> =
        top_n_categories(records.iter().map(|r| r.species.as_str()), config.species_top_n)
            .into_iter()
            .collect();

    log::debug!(
        "Retaining {} genera and {} species by name",
        top_genera.len(),
        top_species.len()
    );

    records
        .iter()
        .map(|&record| CollapsedRecord {
            record,
            phylum_collapsed: collapse_value(&record.phylum, &config.retained_phyla, Rank::Phylum),
            genus_collapsed: collapse_value(&record.genus, &top_genera, Rank::Genus),
            species_collapsed: collapse_value(&record.species, &top_species, Rank::Species),
        })
        .collect()
}
