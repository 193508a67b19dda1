use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::common::{CandidateId, Policies};

/// Core profile data: everything an admin may write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCore {
    /// Biography, in Markdown.
    pub bio_md: String,
    pub policies_json: Policies,
    pub website: Option<String>,
    pub email: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
}

/// A candidate's profile from the database. Shares its ID with the candidate,
/// which is what makes the relationship one-to-one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "_id")]
    pub candidate_id: CandidateId,
    #[serde(flatten)]
    pub profile: ProfileCore,
    /// Set by the server on every write.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub last_updated: DateTime<Utc>,
}

impl Deref for Profile {
    type Target = ProfileCore;

    fn deref(&self) -> &Self::Target {
        &self.profile
    }
}

impl DerefMut for Profile {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.profile
    }
}
