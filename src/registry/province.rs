// 🏛️ Province Registry - source province codes/names -> short codes

use serde::{Deserialize, Serialize};

/// Fallback when neither a source code nor a known name is available
const UNKNOWN_PROVINCE: &str = "XX";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceEntry {
    /// Numeric `PROV_CODE` used by the administrative-units export
    pub source_code: String,
    pub code: String,
    pub name: String,
}

impl ProvinceEntry {
    pub fn new(source_code: &str, code: &str, name: &str) -> Self {
        ProvinceEntry {
            source_code: source_code.to_string(),
            code: code.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProvinceRegistry {
    entries: Vec<ProvinceEntry>,
}

impl ProvinceRegistry {
    pub fn new(entries: Vec<ProvinceEntry>) -> Self {
        ProvinceRegistry { entries }
    }

    /// The ten provinces, keyed by the export's `PROV_CODE`
    pub fn zambia() -> Self {
        ProvinceRegistry::new(vec![
            ProvinceEntry::new("1", "WP", "Western"),
            ProvinceEntry::new("2", "CB", "Copperbelt"),
            ProvinceEntry::new("3", "CP", "Central"),
            ProvinceEntry::new("4", "EP", "Eastern"),
            ProvinceEntry::new("5", "LSK", "Lusaka"),
            ProvinceEntry::new("6", "LP", "Luapula"),
            ProvinceEntry::new("7", "MP", "Muchinga"),
            ProvinceEntry::new("8", "NP", "Northern"),
            ProvinceEntry::new("9", "NWP", "North-Western"),
            ProvinceEntry::new("10", "SP", "Southern"),
        ])
    }

    /// Add or replace entries by source code
    pub fn with_entries<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = ProvinceEntry>,
    {
        for entry in entries {
            match self
                .entries
                .iter_mut()
                .find(|existing| existing.source_code == entry.source_code)
            {
                Some(existing) => *existing = entry,
                None => self.entries.push(entry),
            }
        }
        self
    }

    /// `"02"` and `"2"` are the same source code
    pub fn code_for_source(&self, source_code: &str) -> Option<&str> {
        let wanted = canonical_source_code(source_code);
        self.entries
            .iter()
            .find(|entry| canonical_source_code(&entry.source_code) == wanted)
            .map(|entry| entry.code.as_str())
    }

    pub fn code_for_name(&self, name: &str) -> Option<&str> {
        let wanted = name.trim();
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(wanted))
            .map(|entry| entry.code.as_str())
    }

    /// Best available code: source code, then name, then `P<source>`, then `XX`
    pub fn resolve(&self, source_code: Option<&str>, name: &str) -> String {
        let source_code = source_code.map(str::trim).filter(|code| !code.is_empty());

        if let Some(code) = source_code.and_then(|code| self.code_for_source(code)) {
            return code.to_string();
        }
        if let Some(code) = self.code_for_name(name) {
            return code.to_string();
        }
        match source_code {
            Some(code) => format!("P{}", code),
            None => UNKNOWN_PROVINCE.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn canonical_source_code(code: &str) -> &str {
    let trimmed = code.trim().trim_start_matches('0');
    if trimmed.is_empty() && !code.trim().is_empty() {
        "0"
    } else {
        trimmed
    }
}
