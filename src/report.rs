// 📋 Run Report - what a seed run produced and what needs a human look
//
// Unmapped districts and fallback names never stop a run, so they are
// collected here, logged at the end and optionally written out as JSON.

use crate::error::SeedResult;
use crate::model::UnmappedDistrict;
use crate::reconciliation::FALLBACK_NAME_PREFIX;
use crate::schema::InputShape;
use crate::seed::SeedSet;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning, // output loads, but a reference points at a synthetic code
    Info,    // output is valid, a value was filled in
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportIssue {
    pub severity: Severity,
    pub subject: String,
    pub issue: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub provinces: usize,
    pub districts: usize,
    pub constituencies: usize,
    pub wards: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub shape: InputShape,
    pub counts: EntityCounts,
    pub unmapped_districts: Vec<UnmappedDistrict>,
    pub issues: Vec<ReportIssue>,

    /// Hex SHA-256 of the emitted SQL
    pub sql_sha256: String,
}

impl RunReport {
    pub fn new(shape: InputShape, seeds: &SeedSet, sql_sha256: String) -> Self {
        let mut issues: Vec<ReportIssue> = seeds
            .unmapped_districts
            .iter()
            .map(|unmapped| ReportIssue {
                severity: Severity::Warning,
                subject: describe(unmapped),
                issue: "district not in the code registry; a synthetic XX- code was used"
                    .to_string(),
                recommendation: "add a \"districts\" entry to the configuration file".to_string(),
            })
            .collect();

        issues.extend(
            seeds
                .constituencies
                .iter()
                .filter(|c| c.name.as_str().starts_with(FALLBACK_NAME_PREFIX))
                .map(|c| ReportIssue {
                    severity: Severity::Info,
                    subject: format!("constituency {}", c.code),
                    issue: "no ward name to infer a constituency name from".to_string(),
                    recommendation: "rename the constituency after loading".to_string(),
                }),
        );

        RunReport {
            shape,
            counts: EntityCounts {
                provinces: seeds.provinces.len(),
                districts: seeds.districts.len(),
                constituencies: seeds.constituencies.len(),
                wards: seeds.wards.len(),
            },
            unmapped_districts: seeds.unmapped_districts.iter().cloned().collect(),
            issues,
            sql_sha256,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} input: {} constituencies, {} wards, {} issues ({} warnings)",
            self.shape.name(),
            self.counts.constituencies,
            self.counts.wards,
            self.issues.len(),
            self.warning_count()
        )
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }

    /// End-of-run diagnostics on the tracing stream
    pub fn log_summary(&self) {
        info!(
            summary = %self.summary(),
            shape = self.shape.name(),
            provinces = self.counts.provinces,
            districts = self.counts.districts,
            constituencies = self.counts.constituencies,
            wards = self.counts.wards,
            sha256 = %self.sql_sha256,
            "seed generated"
        );

        if self.has_warnings() {
            warn!(
                count = self.unmapped_districts.len(),
                "districts not mapped to registry codes"
            );
            for unmapped in &self.unmapped_districts {
                warn!("  {}", describe(unmapped));
            }
        }
    }

    pub fn write_json(&self, path: &Path) -> SeedResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

fn describe(unmapped: &UnmappedDistrict) -> String {
    if unmapped.district_name.is_empty() {
        "(no district given)".to_string()
    } else if unmapped.province_name.is_empty() {
        unmapped.district_name.clone()
    } else {
        format!("{} -> {}", unmapped.province_name, unmapped.district_name)
    }
}
