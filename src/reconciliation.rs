// ⚖️ Hierarchy Reconciler - flat ward rows -> Province/District/Constituency/Ward
//
// Two explicit phases:
//   1. `HierarchyBuilder::ingest` - one pass over the rows; each constituency
//      gets a provisional name from its FIRST ward.
//   2. `refine_names` - pure function over the finished hierarchy; names are
//      recomputed from ALL wards of a constituency.
//
// Ward and constituency names are `SqlText` (already quote-escaped).
// Splitting on whitespace and re-joining keeps them escaped, so rebuilt names
// go back through `SqlText::from_escaped`. Province and district names arrive
// raw and are only escaped when stored on the entity.

use crate::input::AdminUnitRow;
use crate::model::{Constituency, District, Hierarchy, Province, UnmappedDistrict, Ward};
use crate::normalize::{zero_pad, SqlText};
use crate::registry::{synthetic_district_code, CodeRegistry};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Token separating the place name from the ward sequence ("Kanini Ward 3")
const WARD_TOKEN: &str = "Ward";

/// Trailing words dropped when inferring a constituency name from one ward.
/// Lossy for places whose real name ends in a direction; kept as-is.
const DIRECTIONAL_SUFFIXES: &[&str] = &["East", "West", "North", "South", "Central"];

/// Refined names shorter than this are discarded
const MIN_REFINED_NAME_LEN: usize = 3;

/// Name given to a constituency no ward name could describe
pub const FALLBACK_NAME_PREFIX: &str = "Constituency ";

pub const CONSTITUENCY_CODE_WIDTH: usize = 3;
pub const WARD_SEQUENCE_WIDTH: usize = 2;

// ============================================================================
// CODES & NAMES
// ============================================================================

pub fn constituency_code(source_code: &str) -> String {
    zero_pad(source_code, CONSTITUENCY_CODE_WIDTH)
}

/// `<constituency code>-<2-digit sequence>`, e.g. `005-01`
pub fn ward_code(constituency_code: &str, ward_sequence: &str) -> String {
    format!(
        "{}-{}",
        constituency_code,
        zero_pad(ward_sequence, WARD_SEQUENCE_WIDTH)
    )
}

pub fn fallback_constituency_name(code: &str) -> SqlText {
    SqlText::escape(&format!("{}{}", FALLBACK_NAME_PREFIX, code))
}

/// Same token, or same number (`"01"` and `"1"`)
fn is_sequence_token(token: &str, ward_sequence: &str) -> bool {
    let ward_sequence = ward_sequence.trim();
    if token == ward_sequence {
        return true;
    }
    match (token.parse::<u64>(), ward_sequence.parse::<u64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Provisional constituency name from a single ward name.
///
/// Drops the `Ward` token and the ward's own sequence number, then strips
/// trailing directional words while more than one word remains:
/// `"Ndola Central Ward 1"` -> `"Ndola"`. `None` when nothing is left.
pub fn infer_constituency_name(ward_name: &SqlText, ward_sequence: &str) -> Option<SqlText> {
    let mut words: Vec<&str> = ward_name
        .as_str()
        .split_whitespace()
        .filter(|token| *token != WARD_TOKEN && !is_sequence_token(token, ward_sequence))
        .collect();

    while words.len() > 1 && words.last().map_or(false, |w| DIRECTIONAL_SUFFIXES.contains(w)) {
        words.pop();
    }

    if words.is_empty() {
        None
    } else {
        Some(SqlText::from_escaped(words.join(" ")))
    }
}

/// Name shared by a group of ward names: their word-level common prefix,
/// minus trailing `Ward` and numeric tokens.
fn common_ward_prefix(ward_names: &[&str]) -> Option<String> {
    let mut iter = ward_names.iter();
    let first: Vec<&str> = iter.next()?.split_whitespace().collect();

    let shared = iter.fold(first.len(), |shared, name| {
        first
            .iter()
            .zip(name.split_whitespace())
            .take(shared)
            .take_while(|(a, b)| *a == b)
            .count()
    });

    let mut prefix = &first[..shared];
    while let Some((last, rest)) = prefix.split_last() {
        if *last == WARD_TOKEN || last.chars().all(|c| c.is_ascii_digit()) {
            prefix = rest;
        } else {
            break;
        }
    }

    let name = prefix.join(" ");
    if name.chars().count() >= MIN_REFINED_NAME_LEN {
        Some(name)
    } else {
        None
    }
}

// ============================================================================
// PHASE 1: INGEST
// ============================================================================

/// Builds the hierarchy incrementally, one ward row at a time
pub struct HierarchyBuilder<'r> {
    registry: &'r CodeRegistry,
    hierarchy: Hierarchy,
    provinces: HashMap<String, usize>,
    districts: HashMap<(String, String), usize>,
    constituencies: HashMap<String, usize>,
    district_conflicts: BTreeSet<String>,
}

impl<'r> HierarchyBuilder<'r> {
    pub fn new(registry: &'r CodeRegistry) -> Self {
        HierarchyBuilder {
            registry,
            hierarchy: Hierarchy::default(),
            provinces: HashMap::new(),
            districts: HashMap::new(),
            constituencies: HashMap::new(),
            district_conflicts: BTreeSet::new(),
        }
    }

    /// Fold one ward-level row into the hierarchy
    pub fn ingest(&mut self, row: &AdminUnitRow) {
        let province_code = self.register_province(row);
        let district_code = self.register_district(row, &province_code);

        let code = constituency_code(&row.constituency_code);
        let index = match self.constituencies.get(&code) {
            Some(&index) => index,
            None => {
                let name = infer_constituency_name(&row.ward_name, &row.ward_code)
                    .unwrap_or_else(|| fallback_constituency_name(&code));
                debug!(code = %code, name = %name, "new constituency");

                self.hierarchy.constituencies.push(Constituency {
                    code: code.clone(),
                    name,
                    district_code: district_code.clone(),
                    ward_count: 0,
                });
                let index = self.hierarchy.constituencies.len() - 1;
                self.constituencies.insert(code.clone(), index);
                index
            }
        };

        let constituency = &mut self.hierarchy.constituencies[index];
        if constituency.district_code != district_code
            && self.district_conflicts.insert(code.clone())
        {
            warn!(
                line = row.line,
                constituency = %code,
                kept = %constituency.district_code,
                ignored = %district_code,
                "constituency spans two districts; keeping the first"
            );
        }
        constituency.ward_count += 1;

        self.hierarchy.wards.push(Ward {
            code: ward_code(&code, &row.ward_code),
            name: row.ward_name.clone(),
            constituency_code: code,
            population: None,
            registered_voters: None,
        });
    }

    fn register_province(&mut self, row: &AdminUnitRow) -> String {
        let code = self
            .registry
            .provinces
            .resolve(row.province_code.as_deref(), &row.province_name);

        if !self.provinces.contains_key(&code) {
            self.hierarchy.provinces.push(Province {
                code: code.clone(),
                name: SqlText::escape(&row.province_name),
            });
            self.provinces
                .insert(code.clone(), self.hierarchy.provinces.len() - 1);
        }
        code
    }

    fn register_district(&mut self, row: &AdminUnitRow, province_code: &str) -> String {
        let key = (row.province_name.clone(), row.district_name.clone());
        if let Some(&index) = self.districts.get(&key) {
            return self.hierarchy.districts[index].code.clone();
        }

        let code = match self
            .registry
            .lookup_district_code(&row.province_name, &row.district_name)
        {
            Some(code) => code.to_string(),
            None => {
                let code = synthetic_district_code(&row.district_name);
                warn!(
                    line = row.line,
                    province = %row.province_name,
                    district = %row.district_name,
                    fallback = %code,
                    "district not in registry"
                );
                self.hierarchy
                    .unmapped_districts
                    .insert(UnmappedDistrict::new(&key.0, &key.1));
                code
            }
        };

        if self.hierarchy.districts.iter().any(|d| d.code == code) {
            warn!(
                code = %code,
                district = %row.district_name,
                "district code already used by another district"
            );
        }

        self.hierarchy.districts.push(District {
            code: code.clone(),
            name: SqlText::escape(&row.district_name),
            province_code: province_code.to_string(),
        });
        self.districts.insert(key, self.hierarchy.districts.len() - 1);
        code
    }

    /// Hierarchy so far, names still provisional
    pub fn finish(self) -> Hierarchy {
        self.hierarchy
    }
}

// ============================================================================
// PHASE 2: REFINE
// ============================================================================

/// Recompute constituency names from the full set of their ward names.
///
/// - two or more wards: common prefix of the ward names, when long enough
/// - exactly one ward: provisional name kept
/// - no wards: `Constituency <code>`
///
/// Depends only on the wards, so applying it twice changes nothing.
pub fn refine_names(hierarchy: Hierarchy) -> Hierarchy {
    let refined: Vec<Option<SqlText>> = {
        let groups = hierarchy.ward_names_by_constituency();
        hierarchy
            .constituencies
            .iter()
            .map(|constituency| {
                match groups.get(constituency.code.as_str()).map(Vec::as_slice) {
                    None | Some([]) => Some(fallback_constituency_name(&constituency.code)),
                    Some([_single]) => None,
                    Some(names) => common_ward_prefix(names).map(SqlText::from_escaped),
                }
            })
            .collect()
    };

    let constituencies = hierarchy
        .constituencies
        .into_iter()
        .zip(refined)
        .map(|(constituency, name)| match name {
            Some(name) => Constituency {
                name,
                ..constituency
            },
            None => constituency,
        })
        .collect();

    Hierarchy {
        constituencies,
        ..hierarchy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{clean, Placeholder};
    use crate::registry::{DistrictEntry, DistrictKeying, DistrictRegistry, ProvinceRegistry};

    fn row(province: &str, district: &str, constituency: &str, ward: &str, name: &str) -> AdminUnitRow {
        AdminUnitRow {
            line: 2,
            province_name: province.to_string(),
            province_code: None,
            district_name: district.to_string(),
            district_code: None,
            constituency_code: constituency.to_string(),
            ward_code: ward.to_string(),
            ward_name: clean(Some(name), Placeholder::Empty),
        }
    }

    fn build(registry: &CodeRegistry, rows: &[AdminUnitRow]) -> Hierarchy {
        let mut builder = HierarchyBuilder::new(registry);
        for r in rows {
            builder.ingest(r);
        }
        builder.finish()
    }

    #[test]
    fn test_single_ward_scenario() {
        let registry = CodeRegistry::admin_units();
        let h = build(
            &registry,
            &[row("Copperbelt", "Ndola", "5", "1", "Ndola Central Ward 1")],
        );

        assert_eq!(h.districts[0].code, "CB-NDL");
        assert_eq!(h.districts[0].province_code, "CB");
        let c = &h.constituencies[0];
        assert_eq!(c.code, "005");
        assert_eq!(c.name.as_str(), "Ndola");
        assert_eq!(c.district_code, "CB-NDL");
        assert_eq!(h.wards[0].code, "005-01");
        assert_eq!(h.wards[0].constituency_code, "005");
        assert!(h.unmapped_districts.is_empty());
    }

    #[test]
    fn test_unmapped_district_falls_back_and_continues() {
        let districts = DistrictRegistry::from_entries(
            DistrictKeying::ProvinceAndName,
            vec![DistrictEntry::new("Central", "Kabwe", "CP-KAB")],
        );
        let registry = CodeRegistry::new(districts, ProvinceRegistry::zambia());

        let h = build(
            &registry,
            &[
                row("Central", "Mumbwa", "41", "1", "Nalubanda Ward 1"),
                row("Central", "Mumbwa", "41", "2", "Myooye Ward 2"),
                row("Central", "Kabwe", "30", "1", "Bwacha Ward 1"),
            ],
        );

        assert_eq!(h.constituency("041").unwrap().district_code, "XX-MUM");
        assert_eq!(h.constituency("030").unwrap().district_code, "CP-KAB");
        assert_eq!(h.wards.len(), 3);
        let unmapped: Vec<_> = h.unmapped_districts.iter().collect();
        assert_eq!(unmapped, vec![&UnmappedDistrict::new("Central", "Mumbwa")]);
    }

    #[test]
    fn test_ward_count_matches_ward_records() {
        let registry = CodeRegistry::admin_units();
        let h = build(
            &registry,
            &[
                row("Lusaka", "Lusaka", "14", "1", "Kamwala Ward 1"),
                row("Lusaka", "Lusaka", "15", "1", "Mandevu Ward 1"),
                row("Lusaka", "Lusaka", "14", "2", "Kamwala Ward 2"),
                row("Lusaka", "Lusaka", "14", "3", "Kamwala South Ward 3"),
            ],
        );

        for c in &h.constituencies {
            assert_eq!(c.ward_count, h.wards_of(&c.code).count(), "{}", c.code);
        }
        assert_eq!(h.constituency("014").unwrap().ward_count, 3);
        assert_eq!(h.provinces.len(), 1);
        assert_eq!(h.districts.len(), 1);
    }

    #[test]
    fn test_constituency_keeps_first_district() {
        let registry = CodeRegistry::admin_units();
        let h = build(
            &registry,
            &[
                row("Copperbelt", "Kitwe", "20", "1", "Nkana Ward 1"),
                row("Copperbelt", "Kalulushi", "20", "2", "Nkana Ward 2"),
            ],
        );
        assert_eq!(h.constituency("020").unwrap().district_code, "CB-KTW");
        assert_eq!(h.districts.len(), 2);
    }

    #[test]
    fn test_infer_name_rules() {
        let name = |s: &str, seq: &str| {
            infer_constituency_name(&SqlText::escape(s), seq).map(|n| n.as_str().to_string())
        };
        assert_eq!(name("Ndola Central Ward 1", "1").as_deref(), Some("Ndola"));
        assert_eq!(name("Kabwe North East Ward 04", "4").as_deref(), Some("Kabwe"));
        assert_eq!(name("Central Ward 3", "3").as_deref(), Some("Central"));
        // only whole tokens are removed
        assert_eq!(name("Mwense 12 Ward 1", "1").as_deref(), Some("Mwense 12"));
        assert_eq!(name("Ward 7", "7"), None);
    }

    #[test]
    fn test_refine_uses_common_prefix() {
        let registry = CodeRegistry::admin_units();
        let h = build(
            &registry,
            &[
                row("Copperbelt", "Ndola", "5", "1", "Ndola Central Ward 1"),
                row("Copperbelt", "Ndola", "5", "2", "Ndola Central Ward 2"),
                row("Copperbelt", "Ndola", "6", "1", "Chifubu"),
                row("Copperbelt", "Ndola", "6", "2", "Kanini"),
                row("Copperbelt", "Ndola", "7", "1", "Twapia Ward 1"),
            ],
        );
        assert_eq!(h.constituency("005").unwrap().name.as_str(), "Ndola");

        let refined = refine_names(h);
        // shared prefix across the group wins over the first-ward guess
        assert_eq!(refined.constituency("005").unwrap().name.as_str(), "Ndola Central");
        // no shared prefix: provisional name stays
        assert_eq!(refined.constituency("006").unwrap().name.as_str(), "Chifubu");
        // single ward: untouched
        assert_eq!(refined.constituency("007").unwrap().name.as_str(), "Twapia");
    }

    #[test]
    fn test_refine_is_idempotent() {
        let registry = CodeRegistry::admin_units();
        let h = build(
            &registry,
            &[
                row("Southern", "Choma", "60", "1", "Choma Central Ward 1"),
                row("Southern", "Choma", "60", "2", "Choma Central Ward 2"),
                row("Southern", "Choma", "61", "1", "Mbabala"),
                row("Southern", "Choma", "61", "2", "Singani"),
                row("Southern", "Choma", "62", "1", "Pemba Ward 1"),
            ],
        );
        let once = refine_names(h);
        let twice = refine_names(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_refine_constituency_without_wards() {
        let mut h = Hierarchy::default();
        h.constituencies.push(Constituency {
            code: "099".to_string(),
            name: SqlText::escape("Whatever"),
            district_code: "XX-UNK".to_string(),
            ward_count: 0,
        });
        let refined = refine_names(h);
        assert_eq!(refined.constituencies[0].name.as_str(), "Constituency 099");
    }

    #[test]
    fn test_apostrophes_are_escaped_once() {
        let name = infer_constituency_name(&SqlText::escape("Shiwang'andu Ward 1"), "1").unwrap();
        assert_eq!(name.as_str(), "Shiwang''andu");

        let registry = CodeRegistry::admin_units();
        let h = build(
            &registry,
            &[
                row("Muchinga", "Chama", "150", "1", "Chama's Ward 1"),
                row("Muchinga", "Chama", "150", "2", "Chama's Ward 2"),
                row("Muchinga", "Chama", "151", "1", "Lundu's Ward 1"),
            ],
        );
        let refined = refine_names(h);
        assert_eq!(refined.constituency("150").unwrap().name.as_str(), "Chama''s");
        assert_eq!(refined.constituency("151").unwrap().name.as_str(), "Lundu''s");
        assert_eq!(refine_names(refined.clone()), refined);
    }

    #[test]
    fn test_district_names_with_quotes_resolve_raw() {
        let districts = DistrictRegistry::from_entries(
            DistrictKeying::ProvinceAndName,
            vec![DistrictEntry::new("Muchinga", "Shiwang'andu", "MCH-SHI")],
        );
        let registry = CodeRegistry::new(districts, ProvinceRegistry::zambia());
        let h = build(
            &registry,
            &[
                row("Muchinga", "Shiwang'andu", "152", "1", "Mwika Ward 1"),
                row("Muchinga", "Ng'ona", "153", "1", "Lubu Ward 1"),
            ],
        );

        assert_eq!(h.constituency("152").unwrap().district_code, "MCH-SHI");
        assert_eq!(h.districts[0].name.as_str(), "Shiwang''andu");
        assert_eq!(h.constituency("153").unwrap().district_code, "XX-NGO");
        let unmapped: Vec<_> = h.unmapped_districts.iter().collect();
        assert_eq!(unmapped, vec![&UnmappedDistrict::new("Muchinga", "Ng'ona")]);
    }

    #[test]
    fn test_common_prefix_trims_ward_and_numbers() {
        assert_eq!(
            common_ward_prefix(&["Lusaka Central Ward 1", "Lusaka Central Ward 12"]).as_deref(),
            Some("Lusaka Central")
        );
        assert_eq!(common_ward_prefix(&["Mu Ward 1", "Mu Ward 2"]), None);
        assert_eq!(common_ward_prefix(&["A", "B"]), None);
    }
}
