// 🎲 Value Synthesizer - deterministic placeholders for fields the source lacks
//
// Every value is a pure function of (row index, kind). No randomness and no
// clock: the same input always yields byte-identical SQL, so generated seed
// files diff cleanly under version control.

use crate::normalize::SqlText;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which entity a count belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Constituency,
    Ward,
}

/// A kind of placeholder value, typed by what it produces
pub trait ValueKind: Copy {
    type Output;

    fn produce(self, synth: &Synthesizer, index: usize) -> Self::Output;
}

/// `"1"` followed by `index + 1` padded to nine digits: `1000000001`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankAccount;

/// Alternates the two configured banks by row parity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Population(pub Level);

/// Constituencies step linearly; wards derive from their population
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voters(pub Level);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MpName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MpParty;

impl ValueKind for BankAccount {
    type Output = SqlText;

    fn produce(self, _synth: &Synthesizer, index: usize) -> SqlText {
        SqlText::escape(&format!("1{:09}", index + 1))
    }
}

impl ValueKind for BankName {
    type Output = SqlText;

    fn produce(self, synth: &Synthesizer, index: usize) -> SqlText {
        SqlText::escape(&synth.config.bank_names[index % 2])
    }
}

impl ValueKind for Population {
    type Output = u64;

    fn produce(self, synth: &Synthesizer, index: usize) -> u64 {
        let config = &synth.config;
        let index = index as u64;
        match self.0 {
            Level::Constituency => {
                config.constituency_population_base + index * config.constituency_population_step
            }
            Level::Ward => config.ward_population_base + index * config.ward_population_step,
        }
    }
}

impl ValueKind for Voters {
    type Output = u64;

    fn produce(self, synth: &Synthesizer, index: usize) -> u64 {
        let config = &synth.config;
        match self.0 {
            Level::Constituency => {
                config.constituency_voters_base + index as u64 * config.constituency_voters_step
            }
            Level::Ward => {
                let population = synth.synthesize(index, Population(Level::Ward));
                synth.voters_from_population(population)
            }
        }
    }
}

impl ValueKind for MpName {
    type Output = SqlText;

    fn produce(self, synth: &Synthesizer, _index: usize) -> SqlText {
        SqlText::escape(&synth.config.mp_placeholder)
    }
}

impl ValueKind for MpParty {
    type Output = SqlText;

    fn produce(self, synth: &Synthesizer, _index: usize) -> SqlText {
        SqlText::escape(&synth.config.mp_placeholder)
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Bases, steps and literals used by the synthesizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub constituency_population_base: u64,
    pub constituency_population_step: u64,
    pub constituency_voters_base: u64,
    pub constituency_voters_step: u64,
    pub ward_population_base: u64,
    pub ward_population_step: u64,

    /// Share of a ward's population that is registered to vote
    pub voter_ratio: f64,

    /// Alternated by row parity: even rows take the first
    pub bank_names: [String; 2],
    pub bank_branch: String,
    pub mp_placeholder: String,
    pub mp_elected_date: NaiveDate,
    pub cdf_allocation: f64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        SynthesisConfig {
            constituency_population_base: 85_000,
            constituency_population_step: 1_200,
            constituency_voters_base: 50_000,
            constituency_voters_step: 800,
            ward_population_base: 8_000,
            ward_population_step: 50,
            voter_ratio: 0.6,
            bank_names: ["Zanaco".to_string(), "Stanbic".to_string()],
            bank_branch: "Main Branch".to_string(),
            mp_placeholder: "TBD".to_string(),
            mp_elected_date: NaiveDate::from_ymd_opt(2021, 8, 12).unwrap_or(NaiveDate::MIN),
            cdf_allocation: 1_600_000.0,
        }
    }
}

impl SynthesisConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.voter_ratio) {
            return Err(format!(
                "voter_ratio must be between 0 and 1, got {}",
                self.voter_ratio
            ));
        }
        if self.bank_names.iter().any(|name| name.trim().is_empty()) {
            return Err("bank_names must not be blank".to_string());
        }
        if !self.cdf_allocation.is_finite() || self.cdf_allocation < 0.0 {
            return Err(format!(
                "cdf_allocation must be a non-negative amount, got {}",
                self.cdf_allocation
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SYNTHESIZER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    config: SynthesisConfig,
}

impl Synthesizer {
    pub fn new(config: SynthesisConfig) -> Self {
        Synthesizer { config }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Placeholder value for the zero-based row `index`
    pub fn synthesize<K: ValueKind>(&self, index: usize, kind: K) -> K::Output {
        kind.produce(self, index)
    }

    /// `round(population * voter_ratio)`
    pub fn voters_from_population(&self, population: u64) -> u64 {
        (population as f64 * self.config.voter_ratio).round() as u64
    }
}
