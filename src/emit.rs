// 🖨️ SQL Emitter - seed rows -> psql-ready INSERT script
//
// Each batch is wrapped in a transient `get_<parent>_id` function so rows can
// reference their parent by business code; the function is dropped again
// right after the INSERT. Text only enters through `SqlText`.

use crate::model::{District, Province};
use crate::normalize::SqlText;
use crate::seed::{ConstituencySeed, WardSeed};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};

const BANNER: &str =
    "-- ============================================================================";

// ============================================================================
// LOOKUP FUNCTIONS
// ============================================================================

/// A load-time helper resolving a parent's surrogate key from its code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupFunction {
    pub name: &'static str,
    pub param: &'static str,
    pub table: &'static str,
}

pub const PROVINCE_LOOKUP: LookupFunction = LookupFunction {
    name: "get_province_id",
    param: "p_code",
    table: "provinces",
};

pub const DISTRICT_LOOKUP: LookupFunction = LookupFunction {
    name: "get_district_id",
    param: "d_code",
    table: "districts",
};

pub const CONSTITUENCY_LOOKUP: LookupFunction = LookupFunction {
    name: "get_constituency_id",
    param: "c_code",
    table: "constituencies",
};

impl LookupFunction {
    fn write_create<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "CREATE OR REPLACE FUNCTION {}({} VARCHAR) RETURNS UUID AS $$",
            self.name, self.param
        )?;
        writeln!(
            out,
            "    SELECT id FROM {} WHERE code = {} LIMIT 1;",
            self.table, self.param
        )?;
        writeln!(out, "$$ LANGUAGE SQL STABLE;")
    }

    fn write_drop<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "DROP FUNCTION IF EXISTS {};", self.name)
    }
}

// ============================================================================
// VALUES
// ============================================================================

/// One literal inside a VALUES tuple
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue<'a> {
    Text(&'a SqlText),
    Integer(u64),
    /// Money, always two decimals
    Decimal(f64),
    Date(NaiveDate),
    Bool(bool),
    Lookup(&'static LookupFunction, &'a SqlText),
}

impl fmt::Display for SqlValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Text(text) => write!(f, "'{}'", text),
            SqlValue::Integer(n) => write!(f, "{}", n),
            SqlValue::Decimal(amount) => write!(f, "{:.2}", amount),
            SqlValue::Date(date) => write!(f, "'{}'", date.format("%Y-%m-%d")),
            SqlValue::Bool(flag) => write!(f, "{}", flag),
            SqlValue::Lookup(function, code) => write!(f, "{}('{}')", function.name, code),
        }
    }
}

// ============================================================================
// INSERT BATCHES
// ============================================================================

/// Column list of a batch. A single group prints on the INSERT line; several
/// groups print one per line.
struct InsertBatch<'a> {
    table: &'static str,
    column_groups: &'static [&'static [&'static str]],
    rows: Vec<Vec<SqlValue<'a>>>,
}

const PROVINCE_COLUMNS: &[&[&str]] = &[&["code", "name", "is_active"]];

const DISTRICT_COLUMNS: &[&[&str]] = &[&["province_id", "code", "name", "is_active"]];

const CONSTITUENCY_COLUMNS: &[&[&str]] = &[
    &["district_id", "code", "name"],
    &["current_mp_name", "current_mp_party", "current_mp_elected_date"],
    &["annual_cdf_allocation", "current_year_allocation"],
    &["registered_voters", "population"],
    &["bank_name", "bank_account_number", "bank_branch"],
    &["is_active"],
];

const WARD_COLUMNS: &[&[&str]] = &[&[
    "constituency_id",
    "code",
    "name",
    "population",
    "registered_voters",
    "is_active",
]];

impl InsertBatch<'_> {
    fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self.column_groups {
            [single] => writeln!(out, "INSERT INTO {} ({}) VALUES", self.table, single.join(", "))?,
            groups => {
                writeln!(out, "INSERT INTO {} (", self.table)?;
                let last = groups.len() - 1;
                for (i, group) in groups.iter().enumerate() {
                    let sep = if i == last { "" } else { "," };
                    writeln!(out, "    {}{}", group.join(", "), sep)?;
                }
                writeln!(out, ") VALUES")?;
            }
        }

        let last = self.rows.len().saturating_sub(1);
        for (i, row) in self.rows.iter().enumerate() {
            let values: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            let terminator = if i == last { ';' } else { ',' };
            writeln!(out, "    ({}){}", values.join(", "), terminator)?;
        }
        Ok(())
    }
}

// ============================================================================
// EMITTER
// ============================================================================

/// Labels printed in the script header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitConfig {
    pub title: String,
    pub source: String,
    pub loading_message: String,
}

impl Default for EmitConfig {
    fn default() -> Self {
        EmitConfig {
            title: "ZAMBIAN CONSTITUENCIES AND WARDS - COMPLETE DATA".to_string(),
            source: "ECZ Administrative Units 2023".to_string(),
            loading_message: "Loading complete Zambian administrative data".to_string(),
        }
    }
}

pub struct SqlEmitter<W: Write> {
    out: W,
    config: EmitConfig,
}

impl<W: Write> SqlEmitter<W> {
    pub fn new(out: W, config: EmitConfig) -> Self {
        SqlEmitter { out, config }
    }

    /// Header comment with per-entity counts, then the `\echo` start marker
    pub fn emit_preamble(&mut self, counts: &[(&str, usize)]) -> io::Result<()> {
        writeln!(self.out, "{}", BANNER)?;
        writeln!(self.out, "-- {}", self.config.title)?;
        writeln!(self.out, "-- Source: {}", self.config.source)?;
        for (label, count) in counts {
            writeln!(self.out, "-- {}: {}", label, count)?;
        }
        writeln!(self.out, "{}", BANNER)?;
        writeln!(self.out)?;
        writeln!(
            self.out,
            "\\echo '{}'",
            SqlText::escape(&self.config.loading_message)
        )?;
        writeln!(self.out)
    }

    pub fn emit_provinces(&mut self, provinces: &[Province]) -> io::Result<()> {
        let codes: Vec<SqlText> = provinces.iter().map(|p| SqlText::escape(&p.code)).collect();
        let rows = provinces
            .iter()
            .zip(codes.iter())
            .map(|(province, code)| {
                vec![
                    SqlValue::Text(code),
                    SqlValue::Text(&province.name),
                    SqlValue::Bool(true),
                ]
            })
            .collect();

        let batch = InsertBatch {
            table: "provinces",
            column_groups: PROVINCE_COLUMNS,
            rows,
        };
        self.emit_section("PROVINCES", "provinces", None, &batch)
    }

    pub fn emit_districts(&mut self, districts: &[District]) -> io::Result<()> {
        let codes: Vec<(SqlText, SqlText)> = districts
            .iter()
            .map(|d| (SqlText::escape(&d.province_code), SqlText::escape(&d.code)))
            .collect();
        let rows = districts
            .iter()
            .zip(codes.iter())
            .map(|(district, (province_code, code))| {
                vec![
                    SqlValue::Lookup(&PROVINCE_LOOKUP, province_code),
                    SqlValue::Text(code),
                    SqlValue::Text(&district.name),
                    SqlValue::Bool(true),
                ]
            })
            .collect();

        let batch = InsertBatch {
            table: "districts",
            column_groups: DISTRICT_COLUMNS,
            rows,
        };
        self.emit_section("DISTRICTS", "districts", Some(&PROVINCE_LOOKUP), &batch)
    }

    /// Rows in the given order; callers sort by code first
    pub fn emit_constituencies(&mut self, constituencies: &[ConstituencySeed]) -> io::Result<()> {
        let rows = constituencies
            .iter()
            .map(|c| {
                vec![
                    SqlValue::Lookup(&DISTRICT_LOOKUP, &c.district_code),
                    SqlValue::Text(&c.code),
                    SqlValue::Text(&c.name),
                    SqlValue::Text(&c.mp_name),
                    SqlValue::Text(&c.mp_party),
                    SqlValue::Date(c.mp_elected_date),
                    SqlValue::Decimal(c.annual_cdf_allocation),
                    SqlValue::Decimal(c.current_year_allocation),
                    SqlValue::Integer(c.registered_voters),
                    SqlValue::Integer(c.population),
                    SqlValue::Text(&c.bank_name),
                    SqlValue::Text(&c.bank_account_number),
                    SqlValue::Text(&c.bank_branch),
                    SqlValue::Bool(true),
                ]
            })
            .collect();

        let batch = InsertBatch {
            table: "constituencies",
            column_groups: CONSTITUENCY_COLUMNS,
            rows,
        };
        self.emit_section("CONSTITUENCIES", "constituencies", Some(&DISTRICT_LOOKUP), &batch)
    }

    pub fn emit_wards(&mut self, wards: &[WardSeed]) -> io::Result<()> {
        let rows = wards
            .iter()
            .map(|w| {
                vec![
                    SqlValue::Lookup(&CONSTITUENCY_LOOKUP, &w.constituency_code),
                    SqlValue::Text(&w.code),
                    SqlValue::Text(&w.name),
                    SqlValue::Integer(w.population),
                    SqlValue::Integer(w.registered_voters),
                    SqlValue::Bool(true),
                ]
            })
            .collect();

        let batch = InsertBatch {
            table: "wards",
            column_groups: WARD_COLUMNS,
            rows,
        };
        self.emit_section("WARDS", "wards", Some(&CONSTITUENCY_LOOKUP), &batch)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit_section(
        &mut self,
        heading: &str,
        entities: &str,
        lookup: Option<&LookupFunction>,
        batch: &InsertBatch<'_>,
    ) -> io::Result<()> {
        writeln!(self.out, "{}", BANNER)?;
        writeln!(self.out, "-- {}", heading)?;
        writeln!(self.out, "{}", BANNER)?;
        writeln!(self.out)?;

        if let Some(function) = lookup {
            function.write_create(&mut self.out)?;
            writeln!(self.out)?;
        }

        if batch.rows.is_empty() {
            writeln!(self.out, "-- No {} to load", entities)?;
        } else {
            batch.write(&mut self.out)?;
        }
        writeln!(self.out)?;

        if let Some(function) = lookup {
            function.write_drop(&mut self.out)?;
            writeln!(self.out)?;
        }

        writeln!(self.out, "\\echo '✓ {} {} loaded'", batch.rows.len(), entities)?;
        writeln!(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{clean, Placeholder};

    fn text(raw: &str) -> SqlText {
        clean(Some(raw), Placeholder::Tbd)
    }

    fn render(f: impl FnOnce(&mut SqlEmitter<Vec<u8>>) -> io::Result<()>) -> String {
        let mut emitter = SqlEmitter::new(Vec::new(), EmitConfig::default());
        f(&mut emitter).unwrap();
        String::from_utf8(emitter.into_inner()).unwrap()
    }

    fn ward(code: &str, name: &str) -> WardSeed {
        WardSeed {
            constituency_code: text("005"),
            code: text(code),
            name: text(name),
            population: 8_000,
            registered_voters: 4_800,
        }
    }

    #[test]
    fn test_value_literals() {
        let name = text("Chama's");
        assert_eq!(SqlValue::Text(&name).to_string(), "'Chama''s'");
        assert_eq!(SqlValue::Integer(85_000).to_string(), "85000");
        assert_eq!(SqlValue::Decimal(1_600_000.0).to_string(), "1600000.00");
        assert_eq!(
            SqlValue::Date(NaiveDate::from_ymd_opt(2021, 8, 12).unwrap()).to_string(),
            "'2021-08-12'"
        );
        assert_eq!(SqlValue::Bool(true).to_string(), "true");

        let code = text("CB-NDL");
        assert_eq!(
            SqlValue::Lookup(&DISTRICT_LOOKUP, &code).to_string(),
            "get_district_id('CB-NDL')"
        );
    }

    #[test]
    fn test_preamble() {
        let sql = render(|e| e.emit_preamble(&[("Constituencies", 1), ("Wards", 2)]));
        let lines: Vec<&str> = sql.lines().collect();
        assert_eq!(lines[0], BANNER);
        assert_eq!(lines[1], "-- ZAMBIAN CONSTITUENCIES AND WARDS - COMPLETE DATA");
        assert_eq!(lines[2], "-- Source: ECZ Administrative Units 2023");
        assert_eq!(lines[3], "-- Constituencies: 1");
        assert_eq!(lines[4], "-- Wards: 2");
        assert_eq!(lines[7], "\\echo 'Loading complete Zambian administrative data'");
    }

    #[test]
    fn test_ward_batch_layout() {
        let wards = vec![ward("005-01", "Ndola Central Ward 1"), ward("005-02", "Chifubu")];
        let sql = render(|e| e.emit_wards(&wards));

        let expected = "\
-- ============================================================================
-- WARDS
-- ============================================================================

CREATE OR REPLACE FUNCTION get_constituency_id(c_code VARCHAR) RETURNS UUID AS $$
    SELECT id FROM constituencies WHERE code = c_code LIMIT 1;
$$ LANGUAGE SQL STABLE;

INSERT INTO wards (constituency_id, code, name, population, registered_voters, is_active) VALUES
    (get_constituency_id('005'), '005-01', 'Ndola Central Ward 1', 8000, 4800, true),
    (get_constituency_id('005'), '005-02', 'Chifubu', 8000, 4800, true);

DROP FUNCTION IF EXISTS get_constituency_id;

\\echo '✓ 2 wards loaded'

";
        assert_eq!(sql, expected);
    }

    #[test]
    fn test_constituency_batch_uses_grouped_columns() {
        let seed = ConstituencySeed {
            district_code: text("CB-NDL"),
            code: text("005"),
            name: text("Ndola"),
            mp_name: text("TBD"),
            mp_party: text("TBD"),
            mp_elected_date: NaiveDate::from_ymd_opt(2021, 8, 12).unwrap(),
            annual_cdf_allocation: 1_600_000.0,
            current_year_allocation: 1_600_000.0,
            registered_voters: 50_000,
            population: 85_000,
            bank_name: text("Zanaco"),
            bank_account_number: text("1000000001"),
            bank_branch: text("Main Branch"),
        };
        let sql = render(|e| e.emit_constituencies(&[seed]));

        assert!(sql.contains(
            "INSERT INTO constituencies (\n    district_id, code, name,\n    current_mp_name, current_mp_party, current_mp_elected_date,\n"
        ));
        assert!(sql.contains("    is_active\n) VALUES\n"));
        assert!(sql.contains(
            "    (get_district_id('CB-NDL'), '005', 'Ndola', 'TBD', 'TBD', '2021-08-12', 1600000.00, 1600000.00, 50000, 85000, 'Zanaco', '1000000001', 'Main Branch', true);\n"
        ));
        assert!(sql.contains("DROP FUNCTION IF EXISTS get_district_id;"));
        assert!(sql.contains("\\echo '✓ 1 constituencies loaded'"));
    }

    #[test]
    fn test_empty_batch_emits_comment_not_insert() {
        let sql = render(|e| e.emit_wards(&[]));
        assert!(!sql.contains("INSERT"));
        assert!(sql.contains("-- No wards to load"));
        assert!(sql.contains("\\echo '✓ 0 wards loaded'"));
    }

    #[test]
    fn test_province_and_district_batches() {
        let provinces = vec![Province {
            code: "CB".into(),
            name: text("Copperbelt"),
        }];
        let districts = vec![District {
            code: "CB-NDL".into(),
            name: text("Ndola"),
            province_code: "CB".into(),
        }];
        let sql = render(|e| {
            e.emit_provinces(&provinces)?;
            e.emit_districts(&districts)
        });

        assert!(sql.contains("INSERT INTO provinces (code, name, is_active) VALUES\n    ('CB', 'Copperbelt', true);"));
        assert!(sql.contains("    (get_province_id('CB'), 'CB-NDL', 'Ndola', true);"));
        assert!(sql.contains("DROP FUNCTION IF EXISTS get_province_id;"));
    }
}
