// 🧱 Entity Model - Province 1-* District 1-* Constituency 1-* Ward
//
// All references are by business code. Surrogate keys only exist in the
// target database and are looked up at load time.

use crate::normalize::SqlText;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Province {
    pub code: String,
    pub name: SqlText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct District {
    pub code: String,
    pub name: SqlText,
    pub province_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constituency {
    pub code: String,
    /// Inferred at creation, refined once all wards are known
    pub name: SqlText,
    pub district_code: String,
    pub ward_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ward {
    pub code: String,
    pub name: SqlText,
    pub constituency_code: String,
    /// `None` when the source has no value; filled in by the synthesizer
    pub population: Option<u64>,
    pub registered_voters: Option<u64>,
}

/// A `(province, district)` pair the registry could not resolve
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct UnmappedDistrict {
    pub province_name: String,
    pub district_name: String,
}

impl UnmappedDistrict {
    pub fn new(province_name: &str, district_name: &str) -> Self {
        UnmappedDistrict {
            province_name: province_name.to_string(),
            district_name: district_name.to_string(),
        }
    }
}

// ============================================================================
// HIERARCHY
// ============================================================================

/// Everything one input file yields, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hierarchy {
    pub provinces: Vec<Province>,
    pub districts: Vec<District>,
    pub constituencies: Vec<Constituency>,
    pub wards: Vec<Ward>,
    pub unmapped_districts: BTreeSet<UnmappedDistrict>,
}

impl Hierarchy {
    pub fn constituency(&self, code: &str) -> Option<&Constituency> {
        self.constituencies.iter().find(|c| c.code == code)
    }

    pub fn wards_of<'a>(&'a self, constituency_code: &'a str) -> impl Iterator<Item = &'a Ward> + 'a {
        self.wards
            .iter()
            .filter(move |w| w.constituency_code == constituency_code)
    }

    /// Ward names grouped by constituency code, each group in ingestion order
    pub fn ward_names_by_constituency(&self) -> HashMap<&str, Vec<&str>> {
        let mut groups: HashMap<&str, Vec<&str>> = HashMap::new();
        for ward in &self.wards {
            groups
                .entry(ward.constituency_code.as_str())
                .or_default()
                .push(ward.name.as_str());
        }
        groups
    }
}
