use mongodb::{
    bson::doc,
    error::Error as DbError,
    options::{FindOneAndUpdateOptions, ReturnDocument, UpdateOptions},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::mongodb::Coll;

/// ID of the global election ID counter.
pub const ELECTION_ID_COUNTER_ID: &str = "election_id";
/// ID of the global candidate ID counter.
pub const CANDIDATE_ID_COUNTER_ID: &str = "candidate_id";

/// A counter object used to implement auto-increment fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    #[serde(rename = "_id")]
    pub id: String,
    pub next: u32,
}

impl Counter {
    /// Create a new `Counter` with the given ID, starting at the given value.
    pub fn new(id: impl Into<String>, start: u32) -> Self {
        Self {
            id: id.into(),
            next: start,
        }
    }

    /// Atomically retrieve the next value of the counter with the given ID.
    ///
    /// Runs outside any transaction, so an aborted create leaves a gap in the
    /// sequence.
    pub async fn next(counters: &Coll<Counter>, id: &str) -> Result<u32> {
        let update = doc! {
            "$inc": { "next": 1 }
        };
        let options: FindOneAndUpdateOptions = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::Before)
            .build();
        let counter = counters
            .find_one_and_update(doc! { "_id": id }, update, options)
            .await?
            .ok_or_else(|| Error::Internal(format!("Failed to find counter with ID {id}")))?;
        Ok(counter.next)
    }
}

/// Ensure that the election and candidate ID counters exist, creating them
/// at 1 if not. Existing counters are left untouched.
pub async fn ensure_id_counters_exist(
    counters: &Coll<Counter>,
) -> std::result::Result<(), DbError> {
    let upsert = UpdateOptions::builder().upsert(true).build();
    for id in [ELECTION_ID_COUNTER_ID, CANDIDATE_ID_COUNTER_ID] {
        let update = doc! {
            "$setOnInsert": { "next": 1 }
        };
        counters
            .update_one(doc! { "_id": id }, update, upsert.clone())
            .await?;
    }
    Ok(())
}
