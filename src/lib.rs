// Geo Seed - Core Library
// Administrative-geography CSV -> SQL seed scripts. Used by the CLI and tests.

pub mod error;
pub mod registry;       // Code Registry - names -> stable codes
pub mod normalize;      // Name Normalizer - SqlText, clean, derived codes
pub mod schema;         // Input Schema - column mappings, shape detection
pub mod input;          // Input Reader - CSV -> typed rows
pub mod model;          // Province / District / Constituency / Ward
pub mod reconciliation; // Hierarchy Reconciler - ingest + refine_names
pub mod synthesize;     // Value Synthesizer - deterministic placeholders
pub mod seed;           // Seed rows handed to the emitter
pub mod emit;           // SQL Emitter
pub mod config;
pub mod report;
pub mod pipeline;

// Re-export commonly used types
pub use error::{SeedError, SeedResult};
pub use registry::{
    CodeRegistry, DistrictEntry, DistrictKeying, DistrictRegistry,
    ProvinceEntry, ProvinceRegistry,
};
pub use normalize::{clean, derive_code_from_name, Placeholder, SqlText};
pub use schema::{detect_shape, ColumnMapping, Field, InputShape};
pub use input::{AdminUnitRow, ConstituencyRow, InputFile, SourceRow, WardRow};
pub use model::{Constituency, District, Hierarchy, Province, UnmappedDistrict, Ward};
pub use reconciliation::{refine_names, HierarchyBuilder};
pub use synthesize::{Level, SynthesisConfig, Synthesizer, ValueKind};
pub use seed::{ConstituencySeed, SeedSet, WardSeed};
pub use emit::{EmitConfig, SqlEmitter};
pub use config::SeedConfig;
pub use report::{RunReport, Severity};
pub use pipeline::{Pipeline, PipelineOptions, RegistryChoice, SeedOutput};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
