// 📂 Input Reader - CSV file -> typed, cleaned source rows
//
// One reader for every file family: the header row decides (or confirms)
// the shape, the column mapping is bound once, then each record becomes a
// typed row. Any malformed record aborts the run.

use crate::error::{SeedError, SeedResult};
use crate::normalize::{clean, Placeholder, SqlText};
use crate::schema::{detect_shape, header_names, BoundColumns, ColumnMapping, Field, InputShape};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

// ============================================================================
// SOURCE ROWS
// ============================================================================

/// A row type that can be built from one CSV record
pub trait SourceRow: Sized {
    /// Shape whose files carry this row type
    const SHAPE: InputShape;

    /// `line` is the 1-based line in the source file, for error messages
    fn from_record(columns: &BoundColumns, record: &StringRecord, line: u64) -> SeedResult<Self>;
}

/// Administrative-units export: one ward with all its ancestors.
///
/// Province and district names stay raw (trimmed, unescaped): they are
/// registry keys first and only become `SqlText` when emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUnitRow {
    pub line: u64,
    pub province_name: String,
    pub province_code: Option<String>,
    pub district_name: String,
    pub district_code: Option<String>,
    pub constituency_code: String,
    pub ward_code: String,
    pub ward_name: SqlText,
}

impl SourceRow for AdminUnitRow {
    const SHAPE: InputShape = InputShape::AdminUnits;

    fn from_record(columns: &BoundColumns, record: &StringRecord, line: u64) -> SeedResult<Self> {
        let raw = |field| -> SeedResult<String> {
            Ok(columns.require(record, field, line)?.trim().to_string())
        };

        Ok(AdminUnitRow {
            line,
            province_name: raw(Field::ProvinceName)?,
            province_code: optional_code(columns, record, Field::ProvinceCode),
            district_name: raw(Field::DistrictName)?,
            district_code: optional_code(columns, record, Field::DistrictCode),
            constituency_code: columns.require(record, Field::ConstituencyCode, line)?.trim().to_string(),
            ward_code: columns.require(record, Field::WardCode, line)?.trim().to_string(),
            ward_name: clean(Some(columns.require(record, Field::WardName, line)?), Placeholder::Empty),
        })
    }
}

/// Constituency list: one constituency, optionally with MP and counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstituencyRow {
    pub line: u64,
    pub name: SqlText,
    /// Raw registry key; empty when the file has no district value
    pub district_name: String,
    pub code: Option<String>,
    pub mp_name: SqlText,
    pub mp_party: SqlText,
    pub registered_voters: Option<u64>,
    pub population: Option<u64>,
}

impl SourceRow for ConstituencyRow {
    const SHAPE: InputShape = InputShape::Constituencies;

    fn from_record(columns: &BoundColumns, record: &StringRecord, line: u64) -> SeedResult<Self> {
        let attribute = |field| clean(columns.get(record, field), Placeholder::Tbd);

        Ok(ConstituencyRow {
            line,
            name: attribute(Field::ConstituencyName),
            district_name: columns
                .get(record, Field::DistrictName)
                .map(|name| name.trim().to_string())
                .unwrap_or_default(),
            code: optional_code(columns, record, Field::ConstituencyCode),
            mp_name: attribute(Field::MpName),
            mp_party: attribute(Field::MpParty),
            registered_voters: columns.count(record, Field::RegisteredVoters, line)?,
            population: columns.count(record, Field::Population, line)?,
        })
    }
}

/// Ward list: one ward referencing its constituency by code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WardRow {
    pub line: u64,
    pub name: SqlText,
    pub constituency_code: String,
    pub ward_code: Option<String>,
    pub population: Option<u64>,
    pub registered_voters: Option<u64>,
}

impl SourceRow for WardRow {
    const SHAPE: InputShape = InputShape::Wards;

    fn from_record(columns: &BoundColumns, record: &StringRecord, line: u64) -> SeedResult<Self> {
        Ok(WardRow {
            line,
            name: clean(columns.get(record, Field::WardName), Placeholder::Tbd),
            constituency_code: columns
                .require(record, Field::ConstituencyCode, line)?
                .trim()
                .to_string(),
            ward_code: optional_code(columns, record, Field::WardCode),
            population: columns.count(record, Field::Population, line)?,
            registered_voters: columns.count(record, Field::RegisteredVoters, line)?,
        })
    }
}

fn optional_code(columns: &BoundColumns, record: &StringRecord, field: Field) -> Option<String> {
    columns.get(record, field).map(|code| code.trim().to_string())
}

// ============================================================================
// INPUT FILE
// ============================================================================

/// An opened input with its shape decided and columns bound.
///
/// Owns the underlying reader; dropping it releases the file handle.
pub struct InputFile<R: Read> {
    reader: csv::Reader<R>,
    columns: BoundColumns,
}

impl InputFile<File> {
    pub fn open(
        path: &Path,
        shape: Option<InputShape>,
        overrides: &BTreeMap<String, Vec<String>>,
    ) -> SeedResult<Self> {
        if !path.is_file() {
            return Err(SeedError::InputNotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        InputFile::from_reader(file, shape, overrides)
    }
}

impl<R: Read> InputFile<R> {
    /// Read the header row, detect the shape unless one is forced, bind columns
    pub fn from_reader(
        source: R,
        shape: Option<InputShape>,
        overrides: &BTreeMap<String, Vec<String>>,
    ) -> SeedResult<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(Trim::All)
            .from_reader(source);

        let headers = header_names(reader.headers()?);
        let admin_units = ColumnMapping::for_shape(InputShape::AdminUnits).with_overrides(overrides)?;

        let shape = match shape {
            Some(shape) => shape,
            None => detect_shape(&headers, &admin_units)?,
        };
        let mapping = match shape {
            InputShape::AdminUnits => admin_units,
            other => ColumnMapping::for_shape(other).with_overrides(overrides)?,
        };
        let columns = mapping.bind(&headers)?;

        debug!(shape = shape.name(), columns = ?headers, "input columns bound");
        if shape == InputShape::Constituencies && !columns.has(Field::DistrictName) {
            warn!("constituency list has no district column; districts will be unmapped");
        }

        Ok(InputFile { reader, columns })
    }

    pub fn shape(&self) -> InputShape {
        self.columns.shape()
    }

    /// Typed rows in file order. `T::SHAPE` must match the file's shape.
    pub fn rows<'a, T: SourceRow + 'a>(
        &'a mut self,
    ) -> SeedResult<impl Iterator<Item = SeedResult<T>> + 'a> {
        if T::SHAPE != self.shape() {
            return Err(SeedError::Config(format!(
                "cannot read {} rows from a {} file",
                T::SHAPE.name(),
                self.shape().name()
            )));
        }

        let columns = &self.columns;
        Ok(self.reader.records().map(move |result| {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            T::from_record(columns, &record, line)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(csv: &str) -> SeedResult<InputFile<&[u8]>> {
        InputFile::from_reader(csv.as_bytes(), None, &BTreeMap::new())
    }

    const ADMIN_CSV: &str = "\
PROV_CODE,PROVINCENA,DISTRICT_C,DISTRICTNA,CONST_CODE,WARD_CODE,WARD_NAME
2,Copperbelt,201,Ndola,5,1,Ndola Central Ward 1
3,Central,305,Mumbwa,41, 2 ,Nalubanda's Ward 2
10,Muchinga,1003,Shiwang'andu,150,1,Mwika Ward 1
";

    #[test]
    fn test_admin_rows_are_cleaned() {
        let mut input = open(ADMIN_CSV).unwrap();
        assert_eq!(input.shape(), InputShape::AdminUnits);

        let rows: Vec<AdminUnitRow> = input.rows().unwrap().collect::<SeedResult<_>>().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].province_code.as_deref(), Some("2"));
        assert_eq!(rows[0].district_name, "Ndola");
        assert_eq!(rows[1].ward_code, "2");
        assert_eq!(rows[1].ward_name.as_str(), "Nalubanda''s Ward 2");
        // registry keys keep their quotes as written
        assert_eq!(rows[2].district_name, "Shiwang'andu");
    }

    #[test]
    fn test_blank_required_value_is_fatal() {
        let csv = "\
PROVINCENA,DISTRICTNA,CONST_CODE,WARD_CODE,WARD_NAME
Copperbelt,Ndola,5,1,Ndola Central Ward 1
Copperbelt,Ndola,5,,Ndola Central Ward 2
";
        let mut input = open(csv).unwrap();
        let result: SeedResult<Vec<AdminUnitRow>> = input.rows().unwrap().collect();
        match result {
            Err(SeedError::MissingValue { line, field }) => {
                assert_eq!(line, 3);
                assert_eq!(field, "ward code");
            }
            other => panic!("expected missing value, got {:?}", other),
        }
    }

    #[test]
    fn test_ragged_row_is_fatal() {
        let csv = "\
PROVINCENA,DISTRICTNA,CONST_CODE,WARD_CODE,WARD_NAME
Copperbelt,Ndola,5,1
";
        let mut input = open(csv).unwrap();
        let result: SeedResult<Vec<AdminUnitRow>> = input.rows().unwrap().collect();
        assert!(matches!(result, Err(SeedError::Csv(_))));
    }

    #[test]
    fn test_constituency_rows_use_tbd_placeholder() {
        let csv = "\
Constituency,District,MP,Party,Voters
Kabwe Central,Kabwe,,,61200
Bwacha,,Jane Doe,UPND,
";
        let mut input = open(csv).unwrap();
        assert_eq!(input.shape(), InputShape::Constituencies);

        let rows: Vec<ConstituencyRow> = input.rows().unwrap().collect::<SeedResult<_>>().unwrap();
        assert_eq!(rows[0].mp_name.as_str(), "TBD");
        assert_eq!(rows[0].district_name, "Kabwe");
        // a parent reference is never filled with TBD
        assert_eq!(rows[1].district_name, "");
        assert_eq!(rows[0].registered_voters, Some(61200));
        assert_eq!(rows[0].code, None);
        assert_eq!(rows[1].mp_party.as_str(), "UPND");
        assert_eq!(rows[1].registered_voters, None);
    }

    #[test]
    fn test_constituency_rows_without_district_column() {
        let csv = "Constituency,MP\nKafue,\n";
        let mut input = open(csv).unwrap();
        assert_eq!(input.shape(), InputShape::Constituencies);

        let rows: Vec<ConstituencyRow> = input.rows().unwrap().collect::<SeedResult<_>>().unwrap();
        assert_eq!(rows[0].name.as_str(), "Kafue");
        assert!(rows[0].district_name.is_empty());
    }

    #[test]
    fn test_ward_rows() {
        let csv = "\
constituency_code,ward_name,population
014,Kamwala,
014,,9100
";
        let mut input = open(csv).unwrap();
        assert_eq!(input.shape(), InputShape::Wards);

        let rows: Vec<WardRow> = input.rows().unwrap().collect::<SeedResult<_>>().unwrap();
        assert_eq!(rows[0].constituency_code, "014");
        assert_eq!(rows[0].population, None);
        assert_eq!(rows[1].name.as_str(), "TBD");
        assert_eq!(rows[1].population, Some(9100));
    }

    #[test]
    fn test_row_type_must_match_shape() {
        let mut input = open(ADMIN_CSV).unwrap();
        assert!(input.rows::<WardRow>().is_err());
    }

    #[test]
    fn test_forced_shape_skips_detection() {
        let csv = "id,label\n1,x\n";
        assert!(matches!(open(csv), Err(SeedError::UnknownFileType { .. })));

        let forced = InputFile::from_reader(csv.as_bytes(), Some(InputShape::Wards), &BTreeMap::new());
        assert!(matches!(forced, Err(SeedError::MissingColumn { .. })));
    }

    #[test]
    fn test_open_missing_file() {
        let err = InputFile::open(Path::new("/definitely/not/here.csv"), None, &BTreeMap::new())
            .err()
            .unwrap();
        assert!(matches!(err, SeedError::InputNotFound(_)));
    }
}
