//src/lineage.rs

use serde::{Deserialize, Serialize};

use crate::types::RankVector;

/// Separator between lineage segments.
pub const SEGMENT_DELIMITER: char = ';';
/// Separator between the rank letter and the taxon name (`p_Firmicutes`).
pub const RANK_DELIMITER: char = '_';

const UNCLASSIFIED: &str = "unclassified";
const ROOT: &str = "root";

/// How to treat the extra underscores of `k__Bacteria`-style prefixes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefixStyle {
    /// Strip every underscore directly after the rank letter: `k__Bacteria` -> `Bacteria`.
    #[default]
    Normalized,
    /// Split on the first underscore only: `k__Bacteria` -> `_Bacteria`.
    Verbatim,
}

/// Turns lineage strings into fixed seven-slot rank vectors.
///
/// Parsing never fails. Segments without a rank prefix are kept as they are,
/// missing ranks are left empty and anything deeper than species is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineageParser {
    pub prefix_style: PrefixStyle,
}

impl LineageParser {
    pub fn new(prefix_style: PrefixStyle) -> Self {
        Self { prefix_style }
    }

    pub fn parse(&self, lineage: &str) -> RankVector {
        self.parse_with_depth(lineage).0
    }

    /// Like `parse`, but also returns how many ranked segments the lineage had
    /// before truncation, so callers can report lineages deeper than species.
    pub fn parse_with_depth(&self, lineage: &str) -> (RankVector, usize) {
        if lineage.trim().eq_ignore_ascii_case(UNCLASSIFIED) {
            return (RankVector::empty(), 0);
        }

        let mut segments = lineage.split(SEGMENT_DELIMITER).peekable();
        if segments
            .peek()
            .is_some_and(|first| first.trim().eq_ignore_ascii_case(ROOT))
        {
            segments.next();
        }

        let cleaned: Vec<Option<String>> = segments
            .map(|segment| Some(self.strip_rank_prefix(segment).to_string()))
            .collect();
        let depth = cleaned.len();

        (RankVector::from_segments(cleaned), depth)
    }

    fn strip_rank_prefix<'a>(&self, segment: &'a str) -> &'a str {
        match segment.split_once(RANK_DELIMITER) {
            Some((_, name)) => match self.prefix_style {
                PrefixStyle::Normalized => name.trim_start_matches(RANK_DELIMITER),
                PrefixStyle::Verbatim => name,
            },
            None => segment,
        }
    }
}

/// Parses with the default (normalized) prefix handling.
pub fn parse_lineage(lineage: &str) -> RankVector {
    LineageParser::default().parse(lineage)
}
