use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{
    api::{CandidateWithProfile, Patch},
    common::ElectionId,
    db::{Election, ElectionCore},
};

/// An election specification, as submitted by an admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectionSpec {
    pub name: String,
    pub date: NaiveDate,
    pub jurisdiction: String,
}

impl ElectionSpec {
    /// Convert this spec into a proper Election with the given unique ID.
    pub fn into_election(self, id: ElectionId) -> Election {
        Election {
            id,
            election: self.into(),
        }
    }
}

impl From<ElectionSpec> for ElectionCore {
    fn from(spec: ElectionSpec) -> Self {
        Self {
            name: spec.name,
            date: spec.date,
            jurisdiction: spec.jurisdiction,
        }
    }
}

/// Changes to an existing election. Absent fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElectionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
}

impl Patch for ElectionPatch {}

/// An election as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionDescription {
    pub id: ElectionId,
    pub name: String,
    pub date: NaiveDate,
    pub jurisdiction: String,
}

impl From<Election> for ElectionDescription {
    fn from(election: Election) -> Self {
        Self {
            id: election.id,
            name: election.election.name,
            date: election.election.date,
            jurisdiction: election.election.jurisdiction,
        }
    }
}

/// An election together with every candidate standing in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionWithCandidates {
    #[serde(flatten)]
    pub election: ElectionDescription,
    pub candidates: Vec<CandidateWithProfile>,
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl ElectionSpec {
        pub fn example() -> Self {
            let core = ElectionCore::example();
            Self {
                name: core.name,
                date: core.date,
                jurisdiction: core.jurisdiction,
            }
        }

        pub fn example2() -> Self {
            let core = ElectionCore::example2();
            Self {
                name: core.name,
                date: core.date,
                jurisdiction: core.jurisdiction,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rocket::serde::json::{json, serde_json};

    #[test]
    fn patch_sets_only_present_fields() {
        let patch: ElectionPatch = serde_json::from_value(json!({ "name": "Renamed" })).unwrap();
        let changes = patch.changes().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes.get_str("name").unwrap(), "Renamed");
    }

    #[test]
    fn patch_dates_are_stored_like_inserted_dates() {
        let patch: ElectionPatch =
            serde_json::from_value(json!({ "date": "2026-03-03" })).unwrap();
        let changes = patch.changes().unwrap();
        let inserted = mongodb::bson::to_document(&ElectionCore {
            date: NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
            ..ElectionCore::example()
        })
        .unwrap();
        assert_eq!(changes.get("date"), inserted.get("date"));
    }

    #[test]
    fn description_renames_id() {
        let description = ElectionDescription::from(Election::example(7));
        let value = serde_json::to_value(&description).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 7,
                "name": "Berkeley Municipal Election",
                "date": "2024-11-05",
                "jurisdiction": "Berkeley, CA",
            })
        );
    }

    #[test]
    fn election_with_candidates_is_flat() {
        let with_candidates = ElectionWithCandidates {
            election: Election::example(1).into(),
            candidates: vec![],
        };
        let value = serde_json::to_value(&with_candidates).unwrap();
        assert_eq!(value["id"], json!(1));
        assert_eq!(value["candidates"], json!([]));
    }
}
