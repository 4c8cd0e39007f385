// 🗺️ District Registry - (province, district) names -> district codes
//
// Two source tables exist because the two upstream file families label
// districts differently: the administrative-units export carries the
// province next to every district, the constituency list only has the
// district name (in any casing).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Prefix of every code invented for an unresolved district
pub const SYNTHETIC_PREFIX: &str = "XX-";

// ============================================================================
// KEYING
// ============================================================================

/// How a lookup key is built from the caller's names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistrictKeying {
    /// Exact `(province, district)` pair, case-sensitive
    ProvinceAndName,

    /// District name only, lower-cased and trimmed; province ignored
    NameOnly,
}

impl DistrictKeying {
    fn key(&self, province: &str, district: &str) -> (String, String) {
        match self {
            DistrictKeying::ProvinceAndName => (province.to_string(), district.to_string()),
            DistrictKeying::NameOnly => (String::new(), district.trim().to_lowercase()),
        }
    }
}

/// One registry row, as written in the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictEntry {
    /// Ignored by name-only tables
    #[serde(default)]
    pub province: String,
    pub district: String,
    pub code: String,
}

impl DistrictEntry {
    pub fn new(province: &str, district: &str, code: &str) -> Self {
        DistrictEntry {
            province: province.to_string(),
            district: district.to_string(),
            code: code.to_string(),
        }
    }
}

// ============================================================================
// BUILT-IN TABLES
// ============================================================================

/// Administrative-units export: `(PROVINCENA, DISTRICTNA)` -> database code
const ADMIN_UNIT_DISTRICTS: &[(&str, &str, &str)] = &[
    // Central
    ("Central", "Kabwe", "CP-KAB"),
    ("Central", "Kapiri Mposhi", "CP-KAP"),
    ("Central", "Chibombo", "CP-CHS"),
    ("Central", "Serenje", "CP-SRM"),
    ("Central", "Mkushi", "CP-MKS"),
    ("Central", "Mumbwa", "CP-MUM"),
    // Copperbelt
    ("Copperbelt", "Ndola", "CB-NDL"),
    ("Copperbelt", "Kitwe", "CB-KTW"),
    ("Copperbelt", "Chililabombwe", "CB-CHL"),
    ("Copperbelt", "Luanshya", "CB-LUA"),
    ("Copperbelt", "Mufulira", "CB-MLO"),
    ("Copperbelt", "Kalulushi", "CB-KLW"),
    ("Copperbelt", "Chingola", "CB-CNG"),
    ("Copperbelt", "Lufwanyama", "CB-LFW"),
    ("Copperbelt", "Masaiti", "CB-MAS"),
    ("Copperbelt", "Mpongwe", "CB-MPO"),
    // Eastern
    ("Eastern", "Chipata", "EP-CHP"),
    ("Eastern", "Katete", "EP-KTT"),
    ("Eastern", "Lundazi", "EP-LND"),
    ("Eastern", "Chadiza", "EP-CHD"),
    ("Eastern", "Petauke", "EP-PTK"),
    ("Eastern", "Nyimba", "EP-NYM"),
    ("Eastern", "Mambwe", "EP-MBL"),
    // Luapula
    ("Luapula", "Mansa", "LP-MNS"),
    ("Luapula", "Nchelenge", "LP-NCH"),
    ("Luapula", "Kawambwa", "LP-KWA"),
    ("Luapula", "Samfya", "LP-SMP"),
    ("Luapula", "Mwense", "LP-MPL"),
    ("Luapula", "Chienge", "LP-CHG"),
    ("Luapula", "Milenge", "LP-MLG"),
    // Lusaka
    ("Lusaka", "Lusaka", "LSK-LSK"),
    ("Lusaka", "Kafue", "LSK-KFU"),
    ("Lusaka", "Chongwe", "LSK-CHO"),
    ("Lusaka", "Luangwa", "LSK-LUA"),
    // Muchinga
    ("Muchinga", "Chinsali", "MCH-CHS"),
    ("Muchinga", "Isoka", "MCH-IMA"),
    ("Muchinga", "Mpika", "MCH-MPI"),
    ("Muchinga", "Nakonde", "MCH-NKO"),
    ("Muchinga", "Chama", "MCH-CHA"),
    ("Muchinga", "Mafinga", "MCH-MAF"),
    // Northern
    ("Northern", "Kasama", "NP-KSM"),
    ("Northern", "Mbala", "NP-MBL"),
    ("Northern", "Luwingu", "NP-LWG"),
    ("Northern", "Kaputa", "NP-KAP"),
    ("Northern", "Chilubi", "NP-CHI"),
    ("Northern", "Mporokoso", "NP-MPN"),
    // North-Western
    ("North-Western", "Solwezi", "NWP-SOL"),
    ("North-Western", "Mwinilunga", "NWP-MWI"),
    ("North-Western", "Kabompo", "NWP-KAB"),
    ("North-Western", "Zambezi", "NWP-ZAM"),
    ("North-Western", "Mufumbwe", "NWP-MUF"),
    ("North-Western", "Chavuma", "NWP-CHV"),
    // Southern
    ("Southern", "Choma", "SP-CHO"),
    ("Southern", "Livingstone", "SP-LIV"),
    ("Southern", "Monze", "SP-MON"),
    ("Southern", "Mazabuka", "SP-MAZ"),
    ("Southern", "Kalomo", "SP-KAL"),
    ("Southern", "Namwala", "SP-NAM"),
    ("Southern", "Kazungula", "SP-KAZ"),
    ("Southern", "Gwembe", "SP-GWE"),
    ("Southern", "Sinazongwe", "SP-SIN"),
    ("Southern", "Siavonga", "SP-SIA"),
    // Western
    ("Western", "Mongu", "WP-MON"),
    ("Western", "Senanga", "WP-SEN"),
    ("Western", "Kaoma", "WP-KAO"),
    ("Western", "Lukulu", "WP-LUK"),
    ("Western", "Kalabo", "WP-KAL"),
    ("Western", "Sesheke", "WP-SES"),
    ("Western", "Shangombo", "WP-SHA"),
    ("Western", "Nalolo", "WP-NAL"),
];

/// ECZ constituency list: district name -> code. Province kept for reference.
const CONSTITUENCY_LIST_DISTRICTS: &[(&str, &str, &str)] = &[
    ("Central", "Kabwe", "CP-KAB"),
    ("Central", "Kapiri Mposhi", "CP-KAP"),
    ("Central", "Mkushi", "CP-MKU"),
    ("Central", "Mumbwa", "CP-MUM"),
    ("Central", "Serenje", "CP-SER"),
    ("Central", "Chibombo", "CP-CHB"),
    ("Copperbelt", "Ndola", "CB-NDL"),
    ("Copperbelt", "Kitwe", "CB-KIT"),
    ("Copperbelt", "Luanshya", "CB-LUA"),
    ("Copperbelt", "Mufulira", "CB-MUF"),
    ("Copperbelt", "Chingola", "CB-CHI"),
    ("Eastern", "Chipata", "EP-CHP"),
    ("Eastern", "Katete", "EP-KAT"),
    ("Eastern", "Lundazi", "EP-LUN"),
    ("Eastern", "Petauke", "EP-PET"),
    ("Luapula", "Mansa", "LP-MAN"),
    ("Luapula", "Nchelenge", "LP-NCH"),
    ("Luapula", "Kawambwa", "LP-KAW"),
    ("Luapula", "Samfya", "LP-SAM"),
    ("Lusaka", "Lusaka", "LSK-LSK"),
    ("Lusaka", "Kafue", "LSK-KFU"),
    ("Lusaka", "Chongwe", "LSK-CHO"),
    ("Muchinga", "Chinsali", "MP-CHN"),
    ("Muchinga", "Isoka", "MP-ISO"),
    ("Muchinga", "Nakonde", "MP-NAK"),
    ("Muchinga", "Mpika", "MP-MPI"),
    ("Northern", "Kasama", "NP-KSM"),
    ("Northern", "Mbala", "NP-MBA"),
    ("Northern", "Luwingu", "NP-LUW"),
    ("North-Western", "Solwezi", "NWP-SOL"),
    ("North-Western", "Mwinilunga", "NWP-MWI"),
    ("North-Western", "Kabompo", "NWP-KAB"),
    ("Southern", "Choma", "SP-CHO"),
    ("Southern", "Livingstone", "SP-LIV"),
    ("Southern", "Monze", "SP-MON"),
    ("Southern", "Mazabuka", "SP-MAZ"),
    ("Western", "Mongu", "WP-MON"),
    ("Western", "Senanga", "WP-SEN"),
    ("Western", "Kaoma", "WP-KAO"),
];

// ============================================================================
// DISTRICT REGISTRY
// ============================================================================

#[derive(Debug, Clone)]
pub struct DistrictRegistry {
    keying: DistrictKeying,
    codes: HashMap<(String, String), String>,
}

impl DistrictRegistry {
    pub fn empty(keying: DistrictKeying) -> Self {
        DistrictRegistry {
            keying,
            codes: HashMap::new(),
        }
    }

    pub fn from_entries<I>(keying: DistrictKeying, entries: I) -> Self
    where
        I: IntoIterator<Item = DistrictEntry>,
    {
        DistrictRegistry::empty(keying).with_entries(entries)
    }

    /// Table for the administrative-units export
    pub fn admin_units() -> Self {
        Self::from_table(DistrictKeying::ProvinceAndName, ADMIN_UNIT_DISTRICTS)
    }

    /// Table for the per-constituency ECZ list
    pub fn constituency_list() -> Self {
        Self::from_table(DistrictKeying::NameOnly, CONSTITUENCY_LIST_DISTRICTS)
    }

    fn from_table(keying: DistrictKeying, table: &[(&str, &str, &str)]) -> Self {
        Self::from_entries(
            keying,
            table
                .iter()
                .map(|(province, district, code)| DistrictEntry::new(province, district, code)),
        )
    }

    /// Add or override entries; later entries win
    pub fn with_entries<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = DistrictEntry>,
    {
        for entry in entries {
            let key = self.keying.key(&entry.province, &entry.district);
            self.codes.insert(key, entry.code);
        }
        self
    }

    /// Exact-match lookup. No fuzzy or partial matching.
    pub fn lookup_district_code(&self, province_name: &str, district_name: &str) -> Option<&str> {
        self.codes
            .get(&self.keying.key(province_name, district_name))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Fallback code for a district the registry cannot resolve: `XX-` plus the
/// first three letters of the name, upper-cased.
pub fn synthetic_district_code(district_name: &str) -> String {
    let letters: String = district_name
        .chars()
        .filter(|c| c.is_alphabetic())
        .take(3)
        .collect::<String>()
        .to_uppercase();
    format!("{}{}", SYNTHETIC_PREFIX, letters)
}
