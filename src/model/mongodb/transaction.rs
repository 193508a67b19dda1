use std::ops::{Deref, DerefMut};

use mongodb::{error::Error as DbError, Client, ClientSession};
use rocket::{
    http::Status,
    request::{self, FromRequest, Request},
    State,
};

use crate::logging::RequestId;

/// A client session with a transaction in progress, scoped to one request.
///
/// The transaction only takes effect once [`Transaction::commit`] succeeds.
/// Dropping a `Transaction` any other way (an early `?` return, a panic, a
/// failed request guard after this one) drops the session with the
/// transaction still open, and the driver aborts it.
pub struct Transaction {
    session: ClientSession,
}

impl Transaction {
    /// Start a new session on `client` and open a transaction on it.
    pub async fn start(client: &Client) -> Result<Self, DbError> {
        let mut session = client.start_session(None).await?;
        session.start_transaction(None).await?;
        Ok(Self { session })
    }

    /// Commit every write made through this transaction.
    pub async fn commit(mut self) -> Result<(), DbError> {
        self.session.commit_transaction().await
    }

    /// Explicitly roll back every write made through this transaction.
    pub async fn abort(mut self) -> Result<(), DbError> {
        self.session.abort_transaction().await
    }
}

impl Deref for Transaction {
    type Target = ClientSession;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl DerefMut for Transaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.session
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Transaction {
    type Error = DbError;

    /// Open a transaction on the managed database client.
    ///
    /// Panics iff the [`Client`] is not managed by [`rocket::Rocket`].
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let client = req.guard::<&State<Client>>().await.unwrap();
        match Transaction::start(client).await {
            Ok(transaction) => request::Outcome::Success(transaction),
            Err(e) => {
                let id = req.local_cache(RequestId::next);
                error!("req{id} could not open a transaction: {e}");
                request::Outcome::Failure((Status::ServiceUnavailable, e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mongodb::{bson::doc, Database};

    use crate::model::{
        db::Election,
        mongodb::{id_filter, Coll},
    };

    /// A client of our own, with the test database's elections as seen by it.
    /// Sessions only work with collections from the client that started them.
    async fn client_and_elections(db: &Database) -> (Client, Coll<Election>) {
        let client = crate::db_client().await;
        let elections = Coll::from_db(&client.database(db.name()));
        (client, elections)
    }

    #[backend_test]
    async fn dropped_transaction_rolls_back(db: Database) {
        let (client, elections) = client_and_elections(&db).await;
        {
            let mut transaction = Transaction::start(&client).await.unwrap();
            elections
                .insert_one_with_session(Election::example(1), None, &mut transaction)
                .await
                .unwrap();
        }
        let found = elections.find_one(id_filter(1), None).await.unwrap();
        assert!(found.is_none());
    }

    #[backend_test]
    async fn committed_transaction_is_visible(db: Database) {
        let (client, elections) = client_and_elections(&db).await;
        let mut transaction = Transaction::start(&client).await.unwrap();
        elections
            .insert_one_with_session(Election::example(1), None, &mut transaction)
            .await
            .unwrap();
        transaction.commit().await.unwrap();

        let found = elections
            .find_one(doc! { "_id": 1 }, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, Election::example(1));
    }

    #[backend_test]
    async fn aborted_transaction_rolls_back(db: Database) {
        let (client, elections) = client_and_elections(&db).await;
        let mut transaction = Transaction::start(&client).await.unwrap();
        elections
            .insert_one_with_session(Election::example(1), None, &mut transaction)
            .await
            .unwrap();
        transaction.abort().await.unwrap();

        assert_eq!(0, elections.count_documents(None, None).await.unwrap());
    }
}
