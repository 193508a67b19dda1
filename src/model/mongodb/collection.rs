use std::ops::Deref;

use mongodb::{bson::doc, error::Error as DbError, Collection, Database, IndexModel};
use rocket::{
    request::{self, FromRequest, Request},
    State,
};

use crate::model::db::{Candidate, Election, Profile};

use super::counter::Counter;

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r, T> FromRequest<'r> for Coll<T>
where
    T: MongoCollection,
{
    type Error = ();

    /// Get the database connection from the managed state and wrap it in a collection.
    ///
    /// Panics iff the [`Database`] is not managed by [`rocket::Rocket`].
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let db = req.guard::<&State<Database>>().await.unwrap();
        request::Outcome::Success(Coll::from_db(db))
    }
}

const ELECTIONS: &str = "elections";
impl MongoCollection for Election {
    const NAME: &'static str = ELECTIONS;
}

const CANDIDATES: &str = "candidates";
impl MongoCollection for Candidate {
    const NAME: &'static str = CANDIDATES;
}

const PROFILES: &str = "profiles";
impl MongoCollection for Profile {
    const NAME: &'static str = PROFILES;
}

const COUNTERS: &str = "counters";
impl MongoCollection for Counter {
    const NAME: &'static str = COUNTERS;
}

/// Ensure that the lookup indexes used by the read API exist.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    // Candidates are listed per election far more often than anything else.
    let by_election = IndexModel::builder()
        .keys(doc! {"election_id": 1, "_id": 1})
        .build();
    Coll::<Candidate>::from_db(db)
        .create_index(by_election, None)
        .await?;

    let by_office = IndexModel::builder()
        .keys(doc! {"office": 1, "district": 1})
        .build();
    Coll::<Candidate>::from_db(db)
        .create_index(by_office, None)
        .await?;

    let by_jurisdiction = IndexModel::builder()
        .keys(doc! {"jurisdiction": 1})
        .build();
    Coll::<Election>::from_db(db)
        .create_index(by_jurisdiction, None)
        .await?;

    Ok(())
}
