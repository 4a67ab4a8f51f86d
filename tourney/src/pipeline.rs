//! End-to-end generation: roster in, bracket plus schedule out.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::bracket::builder::{BuildOptions, build_bracket};
use crate::bracket::models::{Bracket, Format};
use crate::config::SchedulerConfig;
use crate::errors::BracketResult;
use crate::fingerprint::fingerprint;
use crate::roster::models::{Participant, SeedingPolicy};
use crate::schedule::models::{Constraints, Schedule};
use crate::schedule::scheduler::schedule_bracket;
use crate::validation::models::Violation;
use crate::validation::validator::validate;

/// Everything needed to generate a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentRequest {
    pub name: String,
    pub format: Format,
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub seeding: SeedingPolicy,
    #[serde(default)]
    pub constraints: Constraints,
}

impl TournamentRequest {
    pub fn new(name: &str, format: Format, participants: Vec<Participant>) -> Self {
        Self {
            name: name.to_string(),
            format,
            participants,
            seeding: SeedingPolicy::default(),
            constraints: Constraints::default(),
        }
    }

    pub fn with_seeding(mut self, seeding: SeedingPolicy) -> Self {
        self.seeding = seeding;
        self
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Build options derived from the request
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            seeding: self.seeding.clone(),
            avoid_first_round: self.constraints.pairing_bans.clone(),
        }
    }
}

/// Output of [`generate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedTournament {
    pub name: String,
    /// Fingerprint of the request this was generated from
    pub fingerprint: String,
    pub bracket: Bracket,
    pub schedule: Schedule,
    /// Constraints the generated pair still breaks (bans that could not be
    /// separated, for instance)
    pub violations: Vec<Violation>,
}

/// Build, schedule and validate a tournament
///
/// Same request, same output: the bracket, schedule and fingerprint depend on
/// nothing but the request and the scheduler config.
///
/// # Errors
///
/// Any error from roster normalization, bracket building or scheduling.
pub fn generate(
    request: &TournamentRequest,
    config: &SchedulerConfig,
) -> BracketResult<GeneratedTournament> {
    let fingerprint = fingerprint(request)?;
    let bracket = build_bracket(request.format, &request.participants, &request.build_options())?;
    let schedule = schedule_bracket(&bracket, &request.constraints, config)?;
    let violations = validate(&bracket, &schedule, &request.constraints);

    if violations.is_empty() {
        info!(
            "Generated '{}' ({}, {} matches, fingerprint {})",
            request.name,
            request.format,
            bracket.matches().len(),
            &fingerprint[..12]
        );
    } else {
        for violation in &violations {
            warn!("'{}': {violation}", request.name);
        }
    }

    Ok(GeneratedTournament {
        name: request.name.clone(),
        fingerprint,
        bracket,
        schedule,
        violations,
    })
}
