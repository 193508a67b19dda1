use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::common::{CandidateId, ElectionId};

/// Core candidate data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCore {
    /// The election this candidate is standing in. Must exist.
    pub election_id: ElectionId,
    pub full_name: String,
    pub office: String,
    pub district: Option<String>,
    pub party: String,
    pub photo_url: Option<String>,
}

/// A candidate from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: CandidateId,
    #[serde(flatten)]
    pub candidate: CandidateCore,
}

impl Deref for Candidate {
    type Target = CandidateCore;

    fn deref(&self) -> &Self::Target {
        &self.candidate
    }
}

impl DerefMut for Candidate {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.candidate
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl CandidateCore {
        pub fn example(election_id: ElectionId) -> Self {
            Self {
                election_id,
                full_name: "Kate Harrison".to_string(),
                office: "Mayor".to_string(),
                district: None,
                party: "Democrat".to_string(),
                photo_url: None,
            }
        }

        pub fn example2(election_id: ElectionId) -> Self {
            Self {
                election_id,
                full_name: "Terry Taplin".to_string(),
                office: "City Council".to_string(),
                district: Some("District 2".to_string()),
                party: "Democrat".to_string(),
                photo_url: Some("https://example.com/taplin.jpg".to_string()),
            }
        }
    }

    impl Candidate {
        pub fn example(id: CandidateId, election_id: ElectionId) -> Self {
            Self {
                id,
                candidate: CandidateCore::example(election_id),
            }
        }
    }
}
