//src/types.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TaxaError};

/// Number of fixed taxonomic ranks carried by every lineage.
pub const RANK_COUNT: usize = 7;

/// Whether the classifier assigned any taxonomy to a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassificationStatus {
    Classified,
    Unclassified,
}

impl ClassificationStatus {
    /// Parses the single-character status column (`C` / `U`).
    pub fn from_code(code: &str) -> Result<Self> {
        match code.trim() {
            "C" => Ok(Self::Classified),
            "U" => Ok(Self::Unclassified),
            other => Err(TaxaError::InvalidStatus(other.to_string())),
        }
    }

    pub fn code(&self) -> char {
        match self {
            Self::Classified => 'C',
            Self::Unclassified => 'U',
        }
    }
}

impl fmt::Display for ClassificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The seven ranks, in lineage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
}

impl Rank {
    pub const ALL: [Rank; RANK_COUNT] = [
        Rank::Kingdom,
        Rank::Phylum,
        Rank::Class,
        Rank::Order,
        Rank::Family,
        Rank::Genus,
        Rank::Species,
    ];

    /// Position of this rank inside a `RankVector`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column header used in the split table.
    pub fn name(self) -> &'static str {
        match self {
            Rank::Kingdom => "Kingdom",
            Rank::Phylum => "Phylum",
            Rank::Class => "Class",
            Rank::Order => "Order",
            Rank::Family => "Family",
            Rank::Genus => "Genus",
            Rank::Species => "Species",
        }
    }

    /// Stand-in value for an empty slot. Distinct per rank so grouping never
    /// merges, say, a missing class with a missing order.
    pub fn placeholder(self) -> &'static str {
        match self {
            Rank::Kingdom => "Unclassified Kingdoms",
            Rank::Phylum => "Unclassified Phyla",
            Rank::Class => "Unclassified Classes",
            Rank::Order => "Unclassified Orders",
            Rank::Family => "Unclassified Family",
            Rank::Genus => "Unclassified Genera",
            Rank::Species => "Unclassified Species",
        }
    }

    /// Bucket that absorbs collapsed (low-frequency) categories.
    pub fn other_bucket(self) -> &'static str {
        match self {
            Rank::Kingdom => "Other Kingdoms",
            Rank::Phylum => "Other Phyla",
            Rank::Class => "Other Classes",
            Rank::Order => "Other Orders",
            Rank::Family => "Other Families",
            Rank::Genus => "Other Genera",
            Rank::Species => "Other Species",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One line of classifier output.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationRecord {
    pub status: ClassificationStatus,
    pub read_id: String, // opaque, never aggregated
    pub lineage: String, // e.g. "root;k__Bacteria;p__Firmicutes" or "unclassified"
}

/// Exactly seven optional rank slots, Kingdom..Species.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankVector {
    slots: [Option<String>; RANK_COUNT],
}

impl RankVector {
    /// A vector with every slot empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fills slots left to right; anything past Species is dropped.
    pub fn from_segments<I>(segments: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let mut vector = Self::empty();
        for (slot, value) in vector.slots.iter_mut().zip(segments) {
            *slot = value.filter(|v| !v.is_empty());
        }
        vector
    }

    pub fn get(&self, rank: Rank) -> Option<&str> {
        self.slots[rank.index()].as_deref()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn slots(&self) -> &[Option<String>; RANK_COUNT] {
        &self.slots
    }

    /// Slots rendered with `""` for absent ranks.
    pub fn to_strings(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.as_deref().unwrap_or("")).collect()
    }
}

/// A classifier record together with its parsed ranks (one row of the split table).
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRecord {
    pub record: ClassificationRecord,
    pub ranks: RankVector,
}

/// Status plus all seven ranks, with empty slots replaced by `Rank::placeholder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedRecord {
    pub status: ClassificationStatus,
    pub kingdom: String,
    pub phylum: String,
    pub class: String,
    pub order: String,
    pub family: String,
    pub genus: String,
    pub species: String,
}

impl AnnotatedRecord {
    pub fn rank(&self, rank: Rank) -> &str {
        match rank {
            Rank::Kingdom => &self.kingdom,
            Rank::Phylum => &self.phylum,
            Rank::Class => &self.class,
            Rank::Order => &self.order,
            Rank::Family => &self.family,
            Rank::Genus => &self.genus,
            Rank::Species => &self.species,
        }
    }
}

/// An annotated record with its collapsed categorical fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CollapsedRecord<'a> {
    pub record: &'a AnnotatedRecord,
    pub phylum_collapsed: &'a str,
    pub genus_collapsed: &'a str,
    pub species_collapsed: &'a str,
}

impl<'a> CollapsedRecord<'a> {
    /// Collapsed value for the three collapsed ranks, raw value for the rest.
    pub fn value(&self, rank: Rank) -> &'a str {
        match rank {
            Rank::Phylum => self.phylum_collapsed,
            Rank::Genus => self.genus_collapsed,
            Rank::Species => self.species_collapsed,
            other => self.record.rank(other),
        }
    }
}

/// One distinct grouping key with its read count and share of the filtered total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    /// Values of the grouping ranks, outermost first.
    pub key: Vec<String>,
    pub count: u64,
    pub percentage: f64, // in [0, 1]
}

/// A node of the sunburst tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    /// The unnamed top of every tree; carries neither value nor percentage.
    pub fn root() -> Self {
        Self::branch("root")
    }

    pub(crate) fn branch(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
            percentage: None,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of leaves below (or at) this node.
    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(HierarchyNode::leaf_count).sum()
        }
    }

    /// Sum of leaf values below this node.
    pub fn total_value(&self) -> u64 {
        if self.is_leaf() {
            self.value.unwrap_or(0)
        } else {
            self.children.iter().map(HierarchyNode::total_value).sum()
        }
    }

    pub fn child(&self, name: &str) -> Option<&HierarchyNode> {
        self.children.iter().find(|c| c.name == name)
    }
}
