mod bson;
mod collection;
mod counter;
mod errors;
mod transaction;

use mongodb::{error::Error as DbError, Database};

pub use bson::{id_filter, ids_filter};
pub use collection::{ensure_indexes_exist, Coll, MongoCollection};
pub use counter::{
    ensure_id_counters_exist, Counter, CANDIDATE_ID_COUNTER_ID, ELECTION_ID_COUNTER_ID,
};
pub use errors::is_duplicate_key;
pub use transaction::Transaction;

/// Bring a fresh or existing database up to what the server expects.
pub async fn prepare_database(db: &Database) -> Result<(), DbError> {
    ensure_indexes_exist(db).await?;
    ensure_id_counters_exist(&Coll::from_db(db)).await
}
