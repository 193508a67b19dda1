use serde::{Deserialize, Serialize};

use crate::model::{
    api::{
        patch::{double_option, Patch},
        ProfileDescription,
    },
    common::{CandidateId, ElectionId},
    db::{Candidate, CandidateCore, Profile},
};

/// A candidate specification, as submitted by an admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub election_id: ElectionId,
    pub full_name: String,
    pub office: String,
    #[serde(default)]
    pub district: Option<String>,
    pub party: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl CandidateSpec {
    /// Convert this spec into a proper Candidate with the given unique ID.
    pub fn into_candidate(self, id: CandidateId) -> Candidate {
        Candidate {
            id,
            candidate: self.into(),
        }
    }
}

impl From<CandidateSpec> for CandidateCore {
    fn from(spec: CandidateSpec) -> Self {
        Self {
            election_id: spec.election_id,
            full_name: spec.full_name,
            office: spec.office,
            district: spec.district,
            party: spec.party,
            photo_url: spec.photo_url,
        }
    }
}

/// Changes to an existing candidate. Absent fields are left alone; the
/// optional fields can be cleared with an explicit `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub election_id: Option<ElectionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub office: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub district: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub photo_url: Option<Option<String>>,
}

impl Patch for CandidatePatch {}

/// A candidate as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDescription {
    pub id: CandidateId,
    pub election_id: ElectionId,
    pub full_name: String,
    pub office: String,
    pub district: Option<String>,
    pub party: String,
    pub photo_url: Option<String>,
}

impl From<Candidate> for CandidateDescription {
    fn from(candidate: Candidate) -> Self {
        let Candidate { id, candidate } = candidate;
        Self {
            id,
            election_id: candidate.election_id,
            full_name: candidate.full_name,
            office: candidate.office,
            district: candidate.district,
            party: candidate.party,
            photo_url: candidate.photo_url,
        }
    }
}

/// A candidate with their profile inlined, or `null` if they have none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateWithProfile {
    #[serde(flatten)]
    pub candidate: CandidateDescription,
    pub profile: Option<ProfileDescription>,
}

impl CandidateWithProfile {
    pub fn new(candidate: Candidate, profile: Option<Profile>) -> Self {
        Self {
            candidate: candidate.into(),
            profile: profile.map(Into::into),
        }
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl CandidateSpec {
        pub fn example(election_id: ElectionId) -> Self {
            let core = CandidateCore::example(election_id);
            Self {
                election_id,
                full_name: core.full_name,
                office: core.office,
                district: core.district,
                party: core.party,
                photo_url: core.photo_url,
            }
        }

        pub fn example2(election_id: ElectionId) -> Self {
            let core = CandidateCore::example2(election_id);
            Self {
                election_id,
                full_name: core.full_name,
                office: core.office,
                district: core.district,
                party: core.party,
                photo_url: core.photo_url,
            }
        }
    }
}
