//! API-compatible types.
//!
//! Requests arrive as `*Spec` (create) or `*Patch` (update) bodies; responses
//! leave as `*Description`s, which carry `id` rather than MongoDB's `_id` and
//! render timestamps as RFC 3339 strings.

mod candidate;
pub use candidate::{CandidateDescription, CandidatePatch, CandidateSpec, CandidateWithProfile};

mod election;
pub use election::{ElectionDescription, ElectionPatch, ElectionSpec, ElectionWithCandidates};

mod patch;
pub use patch::Patch;

mod profile;
pub use profile::{now, ProfileDescription, ProfilePatch, ProfileSpec};

pub mod auth;

use serde::{Deserialize, Serialize};

/// A plain confirmation, e.g. after a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
