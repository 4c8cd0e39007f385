// 🌱 Seed Rows - entities + synthesized values -> one row per INSERT tuple
//
// Reconciled hierarchies and per-entity CSV rows both end up here, so the
// emitter only ever sees one constituency row type and one ward row type.

use crate::input::{ConstituencyRow, WardRow};
use crate::model::{District, Hierarchy, Province, UnmappedDistrict};
use crate::normalize::{derive_code_from_name, SqlText, NAME_CODE_LENGTH};
use crate::reconciliation::ward_code;
use crate::registry::{synthetic_district_code, CodeRegistry};
use crate::synthesize::{
    BankAccount, BankName, Level, MpName, MpParty, Population, Synthesizer, Voters,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstituencySeed {
    pub district_code: SqlText,
    pub code: SqlText,
    pub name: SqlText,
    pub mp_name: SqlText,
    pub mp_party: SqlText,
    pub mp_elected_date: NaiveDate,
    pub annual_cdf_allocation: f64,
    pub current_year_allocation: f64,
    pub registered_voters: u64,
    pub population: u64,
    pub bank_name: SqlText,
    pub bank_account_number: SqlText,
    pub bank_branch: SqlText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WardSeed {
    pub constituency_code: SqlText,
    pub code: SqlText,
    pub name: SqlText,
    pub population: u64,
    pub registered_voters: u64,
}

/// Everything the emitter writes for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedSet {
    pub provinces: Vec<Province>,
    pub districts: Vec<District>,
    pub constituencies: Vec<ConstituencySeed>,
    pub wards: Vec<WardSeed>,
    pub unmapped_districts: BTreeSet<UnmappedDistrict>,
}

// ============================================================================
// FROM A RECONCILED HIERARCHY
// ============================================================================

/// Constituencies sorted by code and synthesized by sorted position; wards
/// keep ingestion order.
pub fn from_hierarchy(hierarchy: Hierarchy, synth: &Synthesizer) -> SeedSet {
    let config = synth.config();

    let mut constituencies: Vec<_> = hierarchy.constituencies.iter().collect();
    constituencies.sort_by(|a, b| a.code.cmp(&b.code));

    let constituencies = constituencies
        .into_iter()
        .enumerate()
        .map(|(index, constituency)| ConstituencySeed {
            district_code: SqlText::escape(&constituency.district_code),
            code: SqlText::escape(&constituency.code),
            name: constituency.name.clone(),
            mp_name: synth.synthesize(index, MpName),
            mp_party: synth.synthesize(index, MpParty),
            mp_elected_date: config.mp_elected_date,
            annual_cdf_allocation: config.cdf_allocation,
            current_year_allocation: config.cdf_allocation,
            registered_voters: synth.synthesize(index, Voters(Level::Constituency)),
            population: synth.synthesize(index, Population(Level::Constituency)),
            bank_name: synth.synthesize(index, BankName),
            bank_account_number: synth.synthesize(index, BankAccount),
            bank_branch: SqlText::escape(&config.bank_branch),
        })
        .collect();

    let wards = hierarchy
        .wards
        .iter()
        .enumerate()
        .map(|(index, ward)| {
            let population = ward
                .population
                .unwrap_or_else(|| synth.synthesize(index, Population(Level::Ward)));
            WardSeed {
                constituency_code: SqlText::escape(&ward.constituency_code),
                code: SqlText::escape(&ward.code),
                name: ward.name.clone(),
                population,
                registered_voters: ward
                    .registered_voters
                    .unwrap_or_else(|| synth.voters_from_population(population)),
            }
        })
        .collect();

    SeedSet {
        provinces: hierarchy.provinces,
        districts: hierarchy.districts,
        constituencies,
        wards,
        unmapped_districts: hierarchy.unmapped_districts,
    }
}

// ============================================================================
// FROM PER-ENTITY LISTS
// ============================================================================

/// Constituency-list rows. Districts resolve through the name-keyed registry;
/// a miss gets a synthetic `XX-` code and an unmapped record. A row with no
/// district at all is recorded with an empty district name and banks at the
/// configured branch.
pub fn from_constituency_rows(
    rows: Vec<ConstituencyRow>,
    registry: &CodeRegistry,
    synth: &Synthesizer,
) -> SeedSet {
    let config = synth.config();
    let mut unmapped = BTreeSet::new();

    let mut resolved: Vec<(String, ConstituencyRow)> = rows
        .into_iter()
        .map(|row| {
            let code = match &row.code {
                Some(code) => code.clone(),
                None => derive_code_from_name(row.name.as_str(), NAME_CODE_LENGTH),
            };
            (code, row)
        })
        .collect();
    resolved.sort_by(|a, b| a.0.cmp(&b.0));

    let constituencies = resolved
        .into_iter()
        .enumerate()
        .map(|(index, (code, row))| {
            let district = row.district_name.as_str();
            let district_code = match registry.lookup_district_code("", district) {
                Some(code) => code.to_string(),
                None => {
                    if district.is_empty() {
                        warn!(
                            line = row.line,
                            constituency = row.name.as_str(),
                            "constituency has no district"
                        );
                    } else {
                        warn!(
                            line = row.line,
                            district,
                            constituency = row.name.as_str(),
                            "unknown district"
                        );
                    }
                    unmapped.insert(UnmappedDistrict::new("", district));
                    synthetic_district_code(district)
                }
            };
            let bank_branch = if district.is_empty() {
                SqlText::escape(&config.bank_branch)
            } else {
                SqlText::escape(&format!("{} Branch", district))
            };

            ConstituencySeed {
                district_code: SqlText::escape(&district_code),
                code: SqlText::escape(&code),
                name: row.name.clone(),
                mp_name: row.mp_name.clone(),
                mp_party: row.mp_party.clone(),
                mp_elected_date: config.mp_elected_date,
                annual_cdf_allocation: config.cdf_allocation,
                current_year_allocation: config.cdf_allocation,
                registered_voters: row
                    .registered_voters
                    .unwrap_or_else(|| synth.synthesize(index, Voters(Level::Constituency))),
                population: row
                    .population
                    .unwrap_or_else(|| synth.synthesize(index, Population(Level::Constituency))),
                bank_name: synth.synthesize(index, BankName),
                bank_account_number: synth.synthesize(index, BankAccount),
                bank_branch,
            }
        })
        .collect();

    SeedSet {
        constituencies,
        unmapped_districts: unmapped,
        ..SeedSet::default()
    }
}

/// Ward-list rows in file order. Missing ward codes become
/// `<constituency code>-<position, 2 digits>`.
pub fn from_ward_rows(rows: Vec<WardRow>, synth: &Synthesizer) -> SeedSet {
    let wards = rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            let code = match row.ward_code {
                Some(code) => code,
                None => ward_code(&row.constituency_code, &(index + 1).to_string()),
            };
            let population = row
                .population
                .unwrap_or_else(|| synth.synthesize(index, Population(Level::Ward)));
            WardSeed {
                constituency_code: SqlText::escape(&row.constituency_code),
                code: SqlText::escape(&code),
                name: row.name,
                population,
                registered_voters: row
                    .registered_voters
                    .unwrap_or_else(|| synth.voters_from_population(population)),
            }
        })
        .collect();

    SeedSet {
        wards,
        ..SeedSet::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Constituency, Ward};
    use crate::normalize::{clean, Placeholder};
    use crate::registry::{DistrictEntry, DistrictRegistry, ProvinceRegistry};

    fn text(raw: &str) -> SqlText {
        clean(Some(raw), Placeholder::Tbd)
    }

    fn constituency_row(line: u64, name: &str, district: &str) -> ConstituencyRow {
        ConstituencyRow {
            line,
            name: text(name),
            district_name: district.to_string(),
            code: None,
            mp_name: text("TBD"),
            mp_party: text("TBD"),
            registered_voters: None,
            population: None,
        }
    }

    #[test]
    fn test_hierarchy_constituencies_sorted_then_synthesized() {
        let hierarchy = Hierarchy {
            constituencies: vec![
                Constituency {
                    code: "041".into(),
                    name: text("Mumbwa"),
                    district_code: "XX-MUM".into(),
                    ward_count: 0,
                },
                Constituency {
                    code: "005".into(),
                    name: text("Ndola"),
                    district_code: "CB-NDL".into(),
                    ward_count: 1,
                },
            ],
            wards: vec![Ward {
                code: "005-01".into(),
                name: text("Ndola Central Ward 1"),
                constituency_code: "005".into(),
                population: None,
                registered_voters: None,
            }],
            ..Hierarchy::default()
        };

        let seeds = from_hierarchy(hierarchy, &Synthesizer::default());
        let first = &seeds.constituencies[0];
        assert_eq!(first.code.as_str(), "005");
        assert_eq!(first.bank_account_number.as_str(), "1000000001");
        assert_eq!(first.bank_name.as_str(), "Zanaco");
        assert_eq!(first.population, 85_000);
        assert_eq!(first.bank_branch.as_str(), "Main Branch");

        let second = &seeds.constituencies[1];
        assert_eq!(second.code.as_str(), "041");
        assert_eq!(second.bank_name.as_str(), "Stanbic");
        assert_eq!(second.registered_voters, 50_800);

        assert_eq!(seeds.wards[0].population, 8_000);
        assert_eq!(seeds.wards[0].registered_voters, 4_800);
    }

    #[test]
    fn test_constituency_rows_resolve_districts_by_name() {
        let registry = CodeRegistry::constituency_list();
        let mut explicit = constituency_row(3, "Bwacha", "Kabwe");
        explicit.code = Some("BWAC".into());
        explicit.registered_voters = Some(61_200);

        let rows = vec![
            constituency_row(2, "Kafue", "Kafue"),
            explicit,
            constituency_row(4, "Nowhere East", "Atlantis"),
        ];
        let seeds = from_constituency_rows(rows, &registry, &Synthesizer::default());

        let codes: Vec<&str> = seeds.constituencies.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["BWAC", "KAFU", "NOEA"]);

        assert_eq!(seeds.constituencies[0].registered_voters, 61_200);
        assert_eq!(seeds.constituencies[0].bank_branch.as_str(), "Kabwe Branch");
        assert_eq!(seeds.constituencies[1].registered_voters, 50_800);

        assert_eq!(seeds.constituencies[2].district_code.as_str(), "XX-ATL");
        assert!(seeds
            .unmapped_districts
            .contains(&UnmappedDistrict::new("", "Atlantis")));
        assert_eq!(seeds.unmapped_districts.len(), 1);
    }

    #[test]
    fn test_constituency_rows_keep_quotes_raw_for_lookup() {
        let districts = DistrictRegistry::constituency_list()
            .with_entries(vec![DistrictEntry::new("", "Shiwang'andu", "MCH-SHI")]);
        let registry = CodeRegistry::new(districts, ProvinceRegistry::zambia());
        let rows = vec![
            constituency_row(2, "Shiwang'andu", "Shiwang'andu"),
            constituency_row(3, "Lubu", "Ng'ona"),
        ];
        let seeds = from_constituency_rows(rows, &registry, &Synthesizer::default());

        let lubu = &seeds.constituencies[0];
        assert_eq!(lubu.district_code.as_str(), "XX-NGO");
        assert_eq!(lubu.bank_branch.as_str(), "Ng''ona Branch");

        let shiwangandu = &seeds.constituencies[1];
        assert_eq!(shiwangandu.name.as_str(), "Shiwang''andu");
        assert_eq!(shiwangandu.district_code.as_str(), "MCH-SHI");
        assert_eq!(shiwangandu.bank_branch.as_str(), "Shiwang''andu Branch");

        let unmapped: Vec<_> = seeds.unmapped_districts.iter().collect();
        assert_eq!(unmapped, vec![&UnmappedDistrict::new("", "Ng'ona")]);
    }

    #[test]
    fn test_constituency_row_without_district() {
        let rows = vec![constituency_row(2, "Kafue", "")];
        let registry = CodeRegistry::constituency_list();
        let seeds = from_constituency_rows(rows, &registry, &Synthesizer::default());

        let kafue = &seeds.constituencies[0];
        assert_eq!(kafue.district_code.as_str(), "XX-");
        assert_eq!(kafue.bank_branch.as_str(), "Main Branch");
        assert!(seeds
            .unmapped_districts
            .contains(&UnmappedDistrict::new("", "")));
    }

    #[test]
    fn test_ward_rows_get_sequence_codes() {
        let rows = vec![
            WardRow {
                line: 2,
                name: text("Kamwala"),
                constituency_code: "014".into(),
                ward_code: None,
                population: None,
                registered_voters: None,
            },
            WardRow {
                line: 3,
                name: text("Libala"),
                constituency_code: "014".into(),
                ward_code: Some("LSK-99".into()),
                population: Some(9_100),
                registered_voters: None,
            },
        ];
        let seeds = from_ward_rows(rows, &Synthesizer::default());

        assert_eq!(seeds.wards[0].code.as_str(), "014-01");
        assert_eq!(seeds.wards[1].code.as_str(), "LSK-99");
        assert_eq!(seeds.wards[1].registered_voters, 5_460);
        assert!(seeds.constituencies.is_empty());
    }
}
