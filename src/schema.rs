// 📐 Input Schema - which source column feeds which semantic field
//
// The three upstream file families share one pipeline. What differs is
// described here as data: an ordered list of candidate header names per
// field, and which fields must have a column at all.

use crate::error::{SeedError, SeedResult};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// INPUT SHAPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputShape {
    /// One row per ward, carrying province/district/constituency columns
    AdminUnits,

    /// One row per constituency
    Constituencies,

    /// One row per ward, referencing its constituency by code
    Wards,
}

impl InputShape {
    pub fn name(&self) -> &'static str {
        match self {
            InputShape::AdminUnits => "administrative units",
            InputShape::Constituencies => "constituencies",
            InputShape::Wards => "wards",
        }
    }
}

// ============================================================================
// FIELDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    ProvinceName,
    ProvinceCode,
    DistrictName,
    DistrictCode,
    ConstituencyName,
    ConstituencyCode,
    WardName,
    WardCode,
    MpName,
    MpParty,
    RegisteredVoters,
    Population,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::ProvinceName,
        Field::ProvinceCode,
        Field::DistrictName,
        Field::DistrictCode,
        Field::ConstituencyName,
        Field::ConstituencyCode,
        Field::WardName,
        Field::WardCode,
        Field::MpName,
        Field::MpParty,
        Field::RegisteredVoters,
        Field::Population,
    ];

    /// Key used in the configuration file's `columns` section
    pub fn key(&self) -> &'static str {
        match self {
            Field::ProvinceName => "province_name",
            Field::ProvinceCode => "province_code",
            Field::DistrictName => "district_name",
            Field::DistrictCode => "district_code",
            Field::ConstituencyName => "constituency_name",
            Field::ConstituencyCode => "constituency_code",
            Field::WardName => "ward_name",
            Field::WardCode => "ward_code",
            Field::MpName => "mp_name",
            Field::MpParty => "mp_party",
            Field::RegisteredVoters => "registered_voters",
            Field::Population => "population",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|field| field.key() == key)
    }

    /// Human-readable label for error messages
    pub fn label(&self) -> &'static str {
        match self {
            Field::ProvinceName => "province name",
            Field::ProvinceCode => "province code",
            Field::DistrictName => "district name",
            Field::DistrictCode => "district code",
            Field::ConstituencyName => "constituency name",
            Field::ConstituencyCode => "constituency code",
            Field::WardName => "ward name",
            Field::WardCode => "ward code",
            Field::MpName => "MP name",
            Field::MpParty => "MP party",
            Field::RegisteredVoters => "registered voters",
            Field::Population => "population",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub candidates: Vec<String>,
    /// The header must contain at least one candidate
    pub required: bool,
}

impl FieldSpec {
    fn new(candidates: &[&str], required: bool) -> Self {
        FieldSpec {
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
            required,
        }
    }
}

// ============================================================================
// COLUMN MAPPING
// ============================================================================

/// Field -> candidate header names for one input shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    shape: InputShape,
    fields: BTreeMap<Field, FieldSpec>,
}

impl ColumnMapping {
    /// Built-in mapping for each upstream file family
    pub fn for_shape(shape: InputShape) -> Self {
        let specs: Vec<(Field, FieldSpec)> = match shape {
            InputShape::AdminUnits => vec![
                (Field::ProvinceName, FieldSpec::new(&["PROVINCENA"], true)),
                (Field::ProvinceCode, FieldSpec::new(&["PROV_CODE"], false)),
                (Field::DistrictName, FieldSpec::new(&["DISTRICTNA"], true)),
                (Field::DistrictCode, FieldSpec::new(&["DISTRICT_C"], false)),
                (Field::ConstituencyCode, FieldSpec::new(&["CONST_CODE"], true)),
                (Field::WardCode, FieldSpec::new(&["WARD_CODE"], true)),
                (Field::WardName, FieldSpec::new(&["WARD_NAME"], true)),
            ],
            InputShape::Constituencies => vec![
                (
                    Field::ConstituencyName,
                    FieldSpec::new(&["constituency_name", "name", "Constituency"], true),
                ),
                (Field::DistrictName, FieldSpec::new(&["district", "District"], false)),
                (Field::ConstituencyCode, FieldSpec::new(&["code", "Code"], false)),
                (Field::MpName, FieldSpec::new(&["mp_name", "MP"], false)),
                (Field::MpParty, FieldSpec::new(&["party", "Party"], false)),
                (
                    Field::RegisteredVoters,
                    FieldSpec::new(&["registered_voters", "voters", "Voters"], false),
                ),
                (Field::Population, FieldSpec::new(&["population", "Population"], false)),
            ],
            InputShape::Wards => vec![
                (Field::WardName, FieldSpec::new(&["ward_name", "name", "Ward"], false)),
                (
                    Field::ConstituencyCode,
                    FieldSpec::new(&["constituency_code", "code", "Constituency Code"], true),
                ),
                (Field::WardCode, FieldSpec::new(&["ward_code", "Code"], false)),
                (Field::Population, FieldSpec::new(&["population", "Population"], false)),
                (
                    Field::RegisteredVoters,
                    FieldSpec::new(&["registered_voters", "Voters"], false),
                ),
            ],
        };

        ColumnMapping {
            shape,
            fields: specs.into_iter().collect(),
        }
    }

    /// Replace candidate lists from the configuration file's `columns` section.
    ///
    /// Only fields this shape already knows are touched; unknown keys are a
    /// configuration error, keys for fields of other shapes are ignored.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, Vec<String>>) -> SeedResult<Self> {
        for (key, candidates) in overrides {
            let field = Field::from_key(key)
                .ok_or_else(|| SeedError::Config(format!("unknown column field '{}'", key)))?;
            if candidates.is_empty() {
                return Err(SeedError::Config(format!(
                    "column field '{}' needs at least one header name",
                    key
                )));
            }
            if let Some(spec) = self.fields.get_mut(&field) {
                spec.candidates = candidates.clone();
            }
        }
        Ok(self)
    }

    pub fn shape(&self) -> InputShape {
        self.shape
    }

    pub fn spec(&self, field: Field) -> Option<&FieldSpec> {
        self.fields.get(&field)
    }

    /// True when every required field has at least one matching header
    pub fn matches(&self, headers: &[String]) -> bool {
        self.fields
            .values()
            .filter(|spec| spec.required)
            .all(|spec| spec.candidates.iter().any(|c| headers.iter().any(|h| h == c)))
    }

    /// Resolve candidate names to column positions for one header row
    pub fn bind(&self, headers: &[String]) -> SeedResult<BoundColumns> {
        let mut columns = BTreeMap::new();

        for (field, spec) in &self.fields {
            let positions: Vec<usize> = spec
                .candidates
                .iter()
                .filter_map(|candidate| headers.iter().position(|h| h == candidate))
                .collect();

            if positions.is_empty() {
                if spec.required {
                    return Err(SeedError::MissingColumn {
                        shape: self.shape.name(),
                        column: field.label(),
                        candidates: spec.candidates.join(", "),
                    });
                }
                continue;
            }
            columns.insert(*field, positions);
        }

        Ok(BoundColumns {
            shape: self.shape,
            columns,
        })
    }
}

// ============================================================================
// BOUND COLUMNS
// ============================================================================

/// A mapping resolved against a concrete header row
#[derive(Debug, Clone)]
pub struct BoundColumns {
    shape: InputShape,
    columns: BTreeMap<Field, Vec<usize>>,
}

impl BoundColumns {
    pub fn shape(&self) -> InputShape {
        self.shape
    }

    pub fn has(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }

    /// First non-blank value among the field's candidate columns
    pub fn get<'r>(&self, record: &'r StringRecord, field: Field) -> Option<&'r str> {
        self.columns
            .get(&field)?
            .iter()
            .filter_map(|&position| record.get(position))
            .find(|value| !value.trim().is_empty())
    }

    /// Like `get`, but a blank value aborts the run
    pub fn require<'r>(&self, record: &'r StringRecord, field: Field, line: u64) -> SeedResult<&'r str> {
        self.get(record, field).ok_or(SeedError::MissingValue {
            line,
            field: field.label(),
        })
    }

    /// Whole-number field; blank is `None`, thousands separators are allowed
    pub fn count(&self, record: &StringRecord, field: Field, line: u64) -> SeedResult<Option<u64>> {
        match self.get(record, field) {
            None => Ok(None),
            Some(raw) => {
                let digits: String = raw.trim().chars().filter(|c| *c != ',').collect();
                digits
                    .parse::<u64>()
                    .map(Some)
                    .map_err(|_| SeedError::InvalidNumber {
                        line,
                        field: field.label(),
                        value: raw.to_string(),
                    })
            }
        }
    }
}

// ============================================================================
// SHAPE DETECTION
// ============================================================================

/// Normalize raw header cells: trim, drop a leading BOM
pub fn header_names(headers: &StringRecord) -> Vec<String> {
    headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect()
}

/// Decide the input shape from the header row.
///
/// The administrative-units export is recognized by its full set of required
/// columns first, since its `WARD_CODE` column would otherwise read as a
/// plain ward list. Then: any `ward` header -> wards, any `constituency` or
/// `mp` header -> constituencies.
pub fn detect_shape(headers: &[String], admin_units: &ColumnMapping) -> SeedResult<InputShape> {
    if admin_units.matches(headers) {
        return Ok(InputShape::AdminUnits);
    }

    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();

    if lowered.iter().any(|h| h.contains("ward")) {
        return Ok(InputShape::Wards);
    }
    if lowered
        .iter()
        .any(|h| h.contains("constituency") || h.contains("mp"))
    {
        return Ok(InputShape::Constituencies);
    }

    Err(SeedError::UnknownFileType {
        columns: headers.to_vec(),
    })
}
