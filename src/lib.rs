#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use config::{ConfigFairing, DatabaseFairing};
use logging::LoggerFairing;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod updates;

pub use config::Config;

/// Build the server: routes, JSON catchers, request logging, config, the
/// update hub, and the database connection.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .register("/", api::catchers())
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
}

#[cfg(test)]
pub(crate) async fn db_client() -> mongodb::Client {
    let db_uri = rocket::Config::figment()
        .extract_inner::<String>("db_uri")
        .expect("`db_uri` not set");
    mongodb::Client::with_uri_str(&db_uri)
        .await
        .unwrap_or_else(|e| panic!("Could not connect to database at {db_uri}: {e}"))
}

/// A fresh database name, so tests can run in parallel.
#[cfg(test)]
pub(crate) fn database() -> String {
    use rand::{distributions::Alphanumeric, Rng};

    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    format!("test_{suffix}")
}

/// A server backed by the named database on an existing client, with
/// indexes and counters already in place.
#[cfg(test)]
pub(crate) async fn rocket_for_db(db_client: mongodb::Client, db_name: &str) -> Rocket<Build> {
    let db = db_client.database(db_name);
    model::mongodb::prepare_database(&db).await.unwrap();
    rocket::build()
        .mount("/", api::routes())
        .register("/", api::catchers())
        .attach(ConfigFairing)
        .manage(db_client)
        .manage(db)
}
