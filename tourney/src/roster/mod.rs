//! Participant roster handling.
//!
//! A roster is frozen once registration closes. Normalization removes
//! duplicate registrations, checks the per-format minimum and turns the
//! requested seeding into a dense 1..N order that the builders consume.

pub mod models;
pub mod normalizer;

pub use models::{Participant, ParticipantId, SeededParticipant, SeededRoster, SeedingPolicy};
pub use normalizer::normalize;
