// ⚙️ Run Configuration - optional JSON file, every field defaulted
//
// {
//   "synthesis": { "ward_population_step": 100 },
//   "emit":      { "source": "ECZ Administrative Units 2026" },
//   "districts": [ { "province": "Central", "district": "Mumbwa", "code": "CP-MUM" } ],
//   "provinces": [ { "source_code": "11", "code": "MCH", "name": "Muchinga" } ],
//   "columns":   { "ward_name": ["WARD_NAME", "WARDNAME"] }
// }

use crate::emit::EmitConfig;
use crate::error::{SeedError, SeedResult};
use crate::registry::{CodeRegistry, DistrictEntry, ProvinceEntry};
use crate::schema::Field;
use crate::synthesize::SynthesisConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedConfig {
    pub synthesis: SynthesisConfig,
    pub emit: EmitConfig,

    /// Added to (or overriding) the built-in district table
    pub districts: Vec<DistrictEntry>,
    pub provinces: Vec<ProvinceEntry>,

    /// Field key -> candidate header names, replacing the defaults
    pub columns: BTreeMap<String, Vec<String>>,
}

impl SeedConfig {
    pub fn load(path: &Path) -> SeedResult<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            SeedError::Config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        let config: SeedConfig = serde_json::from_str(&raw)?;
        config.validate()?;

        debug!(
            path = %path.display(),
            districts = config.districts.len(),
            provinces = config.provinces.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> SeedResult<()> {
        self.synthesis.validate().map_err(SeedError::Config)?;

        for key in self.columns.keys() {
            if Field::from_key(key).is_none() {
                return Err(SeedError::Config(format!("unknown column field '{}'", key)));
            }
        }
        for entry in &self.districts {
            if entry.code.trim().is_empty() || entry.district.trim().is_empty() {
                return Err(SeedError::Config(format!(
                    "district entry {:?} needs a name and a code",
                    entry
                )));
            }
        }
        for entry in &self.provinces {
            if entry.code.trim().is_empty() {
                return Err(SeedError::Config(format!(
                    "province entry {:?} needs a code",
                    entry
                )));
            }
        }
        Ok(())
    }

    /// Built-in registry with this file's entries layered on top
    pub fn extend_registry(&self, registry: CodeRegistry) -> CodeRegistry {
        CodeRegistry::new(
            registry.districts.with_entries(self.districts.iter().cloned()),
            registry.provinces.with_entries(self.provinces.iter().cloned()),
        )
    }
}
