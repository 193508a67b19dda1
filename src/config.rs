use chrono::Duration;
use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::mongodb::prepare_database;
use crate::updates::Updates;

const DEFAULT_HEARTBEAT_INTERVAL: u64 = 30;
const DEFAULT_UPDATE_CAPACITY: usize = 1024;

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    auth_ttl: u32,
    #[serde(default = "default_heartbeat_interval")]
    heartbeat_interval: u64,
    #[serde(default = "default_update_capacity")]
    update_capacity: usize,
    admin_username: String,
    // secrets
    admin_password: String,
    jwt_secret: String,
}

fn default_heartbeat_interval() -> u64 {
    DEFAULT_HEARTBEAT_INTERVAL
}

fn default_update_capacity() -> usize {
    DEFAULT_UPDATE_CAPACITY
}

impl Config {
    /// Valid lifetime of admin auth tokens.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// How long an update stream waits for an event before sending a heartbeat.
    pub fn heartbeat_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.heartbeat_interval)
    }

    /// How many undelivered events a slow subscriber may fall behind by.
    pub fn update_capacity(&self) -> usize {
        self.update_capacity
    }

    /// Check a login attempt against the configured admin account.
    pub fn admin_matches(&self, username: &str, password: &str) -> bool {
        self.admin_username == username && self.admin_password == password
    }

    /// Secret key used to sign JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

/// A fairing that loads the application config and puts it in managed state,
/// along with the update hub sized from that config.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        if config.update_capacity == 0 {
            error!("`update_capacity` must be at least 1");
            return Err(rocket);
        }

        let updates = Updates::new(config.update_capacity());
        info!(
            "Update hub ready (capacity {}, heartbeat every {}s)",
            config.update_capacity, config.heartbeat_interval
        );
        Ok(rocket.manage(config).manage(updates))
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // non-secrets
    #[serde(default = "default_db_name")]
    db_name: String,
    // secrets
    db_uri: String,
}

fn default_db_name() -> String {
    "betterballot".to_string()
}

/// A fairing that loads the MongoDB config, connects to the database,
/// prepares indexes and counters, and places both a `Client` and a `Database`
/// into managed state.
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");
        let client = match MongoClient::with_uri_str(&config.db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db = client.database(&config.db_name);

        if let Err(e) = prepare_database(&db).await {
            error!("Failed to prepare database {}: {e}", config.db_name);
            return Err(rocket);
        }
        info!("...database connection online!");

        Ok(rocket.manage(client).manage(db))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use rocket::figment::{
        providers::{Format, Toml},
        Figment,
    };

    #[test]
    fn defaults_fill_optional_settings() {
        let figment = Figment::new().merge(Toml::string(
            r#"
            auth_ttl = 60
            admin_username = "admin"
            admin_password = "pw"
            jwt_secret = "secret"
            "#,
        ));
        let config: Config = figment.extract().unwrap();
        assert_eq!(
            config.heartbeat_interval(),
            std::time::Duration::from_secs(30)
        );
        assert_eq!(config.update_capacity(), 1024);
        assert_eq!(config.auth_ttl(), Duration::seconds(60));
    }

    #[test]
    fn admin_credentials_must_both_match() {
        let config = Config::example();
        assert!(config.admin_matches("admin", "correct horse battery staple"));
        assert!(!config.admin_matches("admin", "wrong"));
        assert!(!config.admin_matches("root", "correct horse battery staple"));
    }
}
