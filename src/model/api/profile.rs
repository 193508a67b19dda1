use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    api::patch::{double_option, Patch},
    common::{CandidateId, Policies},
    db::{Profile, ProfileCore},
};

/// A profile specification, as submitted by an admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSpec {
    pub candidate_id: CandidateId,
    pub bio_md: String,
    pub policies_json: Policies,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
}

impl ProfileSpec {
    /// Convert this spec into a proper Profile, stamped with the current time.
    pub fn into_profile(self) -> Profile {
        Profile {
            candidate_id: self.candidate_id,
            profile: ProfileCore {
                bio_md: self.bio_md,
                policies_json: self.policies_json,
                website: self.website,
                email: self.email,
                facebook: self.facebook,
                twitter: self.twitter,
                instagram: self.instagram,
            },
            last_updated: now(),
        }
    }
}

/// The current time at the precision the database stores.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Changes to an existing profile. Absent fields are left alone; the
/// optional fields can be cleared with an explicit `null`.
///
/// A `candidate_id` in the body is accepted and ignored: a profile's identity
/// never changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(default, skip_serializing)]
    pub candidate_id: Option<CandidateId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio_md: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policies_json: Option<Policies>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub website: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub facebook: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub twitter: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub instagram: Option<Option<String>>,
}

impl Patch for ProfilePatch {}

/// A profile as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDescription {
    pub candidate_id: CandidateId,
    pub bio_md: String,
    pub policies_json: Policies,
    pub website: Option<String>,
    pub email: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl From<Profile> for ProfileDescription {
    fn from(profile: Profile) -> Self {
        let Profile {
            candidate_id,
            profile,
            last_updated,
        } = profile;
        Self {
            candidate_id,
            bio_md: profile.bio_md,
            policies_json: profile.policies_json,
            website: profile.website,
            email: profile.email,
            facebook: profile.facebook,
            twitter: profile.twitter,
            instagram: profile.instagram,
            last_updated,
        }
    }
}
