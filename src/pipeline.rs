// 🔁 Seed Pipeline - CSV in, SQL bytes + run report out
//
// detect shape -> read rows -> reconcile (admin units only) -> synthesize
// -> emit into a buffer -> digest. Nothing reaches the caller's writer
// unless every stage succeeded.

use crate::config::SeedConfig;
use crate::emit::SqlEmitter;
use crate::error::SeedResult;
use crate::input::{AdminUnitRow, ConstituencyRow, InputFile, WardRow};
use crate::reconciliation::{refine_names, HierarchyBuilder};
use crate::registry::CodeRegistry;
use crate::report::RunReport;
use crate::schema::InputShape;
use crate::seed::{self, SeedSet};
use crate::synthesize::Synthesizer;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Which built-in district table to resolve against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegistryChoice {
    /// Administrative-units table for that shape, constituency list otherwise
    #[default]
    Auto,
    AdminUnits,
    ConstituencyList,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// `None` detects the shape from the header row
    pub shape: Option<InputShape>,
    pub registry: RegistryChoice,
    /// Also emit provinces and districts (administrative units only)
    pub with_districts: bool,
}

pub struct SeedOutput {
    pub sql: Vec<u8>,
    pub report: RunReport,
}

pub struct Pipeline {
    config: SeedConfig,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(config: SeedConfig, options: PipelineOptions) -> Self {
        Pipeline { config, options }
    }

    pub fn run_file(&self, path: &Path) -> SeedResult<SeedOutput> {
        info!(path = %path.display(), "reading input");
        let input = InputFile::open(path, self.options.shape, &self.config.columns)?;
        self.run(input)
    }

    pub fn run_reader<R: Read>(&self, source: R) -> SeedResult<SeedOutput> {
        let input = InputFile::from_reader(source, self.options.shape, &self.config.columns)?;
        self.run(input)
    }

    fn run<R: Read>(&self, mut input: InputFile<R>) -> SeedResult<SeedOutput> {
        let shape = input.shape();
        info!(shape = shape.name(), "input shape");

        let registry = self.registry_for(shape);
        let synth = Synthesizer::new(self.config.synthesis.clone());

        let seeds = match shape {
            InputShape::AdminUnits => {
                let mut builder = HierarchyBuilder::new(&registry);
                for row in input.rows::<AdminUnitRow>()? {
                    builder.ingest(&row?);
                }
                seed::from_hierarchy(refine_names(builder.finish()), &synth)
            }
            InputShape::Constituencies => {
                let rows = input
                    .rows::<ConstituencyRow>()?
                    .collect::<SeedResult<Vec<_>>>()?;
                seed::from_constituency_rows(rows, &registry, &synth)
            }
            InputShape::Wards => {
                let rows = input.rows::<WardRow>()?.collect::<SeedResult<Vec<_>>>()?;
                seed::from_ward_rows(rows, &synth)
            }
        };

        let sql = self.render(shape, &seeds)?;
        let digest = format!("{:x}", Sha256::digest(&sql));
        debug!(bytes = sql.len(), sha256 = %digest, "sql rendered");

        Ok(SeedOutput {
            report: RunReport::new(shape, &seeds, digest),
            sql,
        })
    }

    fn registry_for(&self, shape: InputShape) -> CodeRegistry {
        let builtin = match (self.options.registry, shape) {
            (RegistryChoice::AdminUnits, _) | (RegistryChoice::Auto, InputShape::AdminUnits) => {
                CodeRegistry::admin_units()
            }
            _ => CodeRegistry::constituency_list(),
        };
        self.config.extend_registry(builtin)
    }

    fn render(&self, shape: InputShape, seeds: &SeedSet) -> SeedResult<Vec<u8>> {
        let with_districts = self.options.with_districts && shape == InputShape::AdminUnits;
        if self.options.with_districts && !with_districts {
            warn!(
                shape = shape.name(),
                "provinces and districts only come from administrative units; skipping"
            );
        }
        let with_constituencies = shape != InputShape::Wards;
        let with_wards = shape != InputShape::Constituencies;

        let mut counts = Vec::new();
        if with_districts {
            counts.push(("Provinces", seeds.provinces.len()));
            counts.push(("Districts", seeds.districts.len()));
        }
        if with_constituencies {
            counts.push(("Constituencies", seeds.constituencies.len()));
        }
        if with_wards {
            counts.push(("Wards", seeds.wards.len()));
        }

        let mut emitter = SqlEmitter::new(Vec::new(), self.config.emit.clone());
        emitter.emit_preamble(&counts)?;
        if with_districts {
            emitter.emit_provinces(&seeds.provinces)?;
            emitter.emit_districts(&seeds.districts)?;
        }
        if with_constituencies {
            emitter.emit_constituencies(&seeds.constituencies)?;
        }
        if with_wards {
            emitter.emit_wards(&seeds.wards)?;
        }
        Ok(emitter.into_inner())
    }
}
