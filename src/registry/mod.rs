// Code Registries - human-readable names -> stable business codes
//
// Each registry is an immutable value built once at startup and handed to
// the components that need it. Lookups are exact on the table's own
// normalization; a miss is `None`, never an error.

pub mod district;
pub mod province;

pub use district::{
    synthetic_district_code, DistrictEntry, DistrictKeying, DistrictRegistry, SYNTHETIC_PREFIX,
};
pub use province::{ProvinceEntry, ProvinceRegistry};

/// The registries one run resolves against
#[derive(Debug, Clone)]
pub struct CodeRegistry {
    pub districts: DistrictRegistry,
    pub provinces: ProvinceRegistry,
}

impl CodeRegistry {
    pub fn new(districts: DistrictRegistry, provinces: ProvinceRegistry) -> Self {
        CodeRegistry {
            districts,
            provinces,
        }
    }

    /// Administrative-units table keyed by `(province, district)`
    pub fn admin_units() -> Self {
        CodeRegistry::new(DistrictRegistry::admin_units(), ProvinceRegistry::zambia())
    }

    /// Constituency-list table keyed by lower-cased district name
    pub fn constituency_list() -> Self {
        CodeRegistry::new(DistrictRegistry::constituency_list(), ProvinceRegistry::zambia())
    }

    pub fn lookup_district_code(&self, province_name: &str, district_name: &str) -> Option<&str> {
        self.districts.lookup_district_code(province_name, district_name)
    }
}
