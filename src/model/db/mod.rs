//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in a DB-friendly way, e.g.:
//!
//! - IDs are stored as `_id`.
//! - Timestamps are stored as MongoDB datetimes.

mod candidate;
pub use candidate::{Candidate, CandidateCore};

mod election;
pub use election::{Election, ElectionCore};

mod profile;
pub use profile::{Profile, ProfileCore};
