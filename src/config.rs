//src/config.rs

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, TaxaError};
use crate::lineage::PrefixStyle;
use crate::types::{AnnotatedRecord, ClassificationStatus, Rank};

/// Which records count toward the aggregation total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterPolicy {
    /// Let unclassified reads into the denominator. They bypass the kingdom
    /// check, since their kingdom is usually a placeholder.
    pub include_unclassified: bool,
    /// Required kingdom for classified reads; `None` accepts any kingdom.
    pub kingdom: Option<String>,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            include_unclassified: false,
            kingdom: Some("Bacteria".to_string()),
        }
    }
}

impl FilterPolicy {
    pub fn accepts(&self, record: &AnnotatedRecord) -> bool {
        match record.status {
            ClassificationStatus::Unclassified => self.include_unclassified,
            ClassificationStatus::Classified => self
                .kingdom
                .as_deref()
                .map_or(true, |k| record.kingdom == k),
        }
    }
}

/// Grouping levels of the sunburst, outermost first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyLayout {
    /// phylum -> genus -> species leaves
    #[default]
    PhylumGenusSpecies,
    /// kingdom -> phylum -> genus leaves
    KingdomPhylumGenus,
}

impl HierarchyLayout {
    pub fn levels(self) -> &'static [Rank] {
        match self {
            HierarchyLayout::PhylumGenusSpecies => &[Rank::Phylum, Rank::Genus, Rank::Species],
            HierarchyLayout::KingdomPhylumGenus => &[Rank::Kingdom, Rank::Phylum, Rank::Genus],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Phyla kept by name; everything else becomes "Other Phyla".
    pub retained_phyla: Vec<String>,
    /// Signed so that a negative value from a config file is reported, not wrapped.
    pub genus_top_n: i64,
    pub species_top_n: i64,
    pub filter: FilterPolicy,
    pub layout: HierarchyLayout,
    pub prefix_style: PrefixStyle,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            retained_phyla: ["Firmicutes", "Bacteroidetes", "Proteobacteria", "Actinobacteria"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            genus_top_n: 10,
            species_top_n: 20,
            filter: FilterPolicy::default(),
            layout: HierarchyLayout::default(),
            prefix_style: PrefixStyle::default(),
        }
    }
}

/// A config that passed `AggregationConfig::validate`.
#[derive(Debug, Clone)]
pub struct ValidatedConfig<'a> {
    pub retained_phyla: AHashSet<&'a str>,
    pub genus_top_n: usize,
    pub species_top_n: usize,
    pub filter: &'a FilterPolicy,
    pub layout: HierarchyLayout,
}

impl AggregationConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<ValidatedConfig<'_>> {
        let genus_top_n = non_negative("genus_top_n", self.genus_top_n)?;
        let species_top_n = non_negative("species_top_n", self.species_top_n)?;

        let retained_phyla: AHashSet<&str> = self
            .retained_phyla
            .iter()
            .map(String::as_str)
            .filter(|p| !p.trim().is_empty())
            .collect();
        if retained_phyla.is_empty() {
            return Err(TaxaError::InvalidConfig(
                "retained_phyla is empty; every read would collapse into \"Other Phyla\"".to_string(),
            ));
        }

        Ok(ValidatedConfig {
            retained_phyla,
            genus_top_n,
            species_top_n,
            filter: &self.filter,
            layout: self.layout,
        })
    }
}

fn non_negative(field: &str, value: i64) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| TaxaError::InvalidConfig(format!("{field} must be >= 0, got {value}")))
}
