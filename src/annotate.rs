//src/annotate.rs

use crate::types::{AnnotatedRecord, Rank, RankVector, SplitRecord};

/// Promotes parsed ranks onto the record, filling empty slots with the
/// per-rank placeholder.
pub fn annotate(split: &SplitRecord) -> AnnotatedRecord {
    let ranks = &split.ranks;
    let fill = |rank: Rank| fill_rank(ranks, rank);

    AnnotatedRecord {
        status: split.record.status,
        kingdom: fill(Rank::Kingdom),
        phylum: fill(Rank::Phylum),
        class: fill(Rank::Class),
        order: fill(Rank::Order),
        family: fill(Rank::Family),
        genus: fill(Rank::Genus),
        species: fill(Rank::Species),
    }
}

pub fn annotate_all(records: &[SplitRecord]) -> Vec<AnnotatedRecord> {
    records.iter().map(annotate).collect()
}

fn fill_rank(ranks: &RankVector, rank: Rank) -> String {
    ranks
        .get(rank)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(rank.placeholder())
        .to_string()
}
