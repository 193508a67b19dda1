use betterballot_backend::Config;
use log::{error, info, LevelFilter};
use mongodb::Database;
use rocket::Error as RocketError;
use thiserror::Error;

/// Errors that are critical to the entire server.
#[derive(Debug, Error)]
enum Error {
    #[error(transparent)]
    RocketError(#[from] RocketError),
}

async fn run() -> Result<(), Error> {
    info!("Configuring server...");
    let rocket = betterballot_backend::build().ignite().await?;
    if let Some(db) = rocket.state::<Database>() {
        info!("Serving from database `{}`", db.name());
    }
    if let Some(config) = rocket.state::<Config>() {
        info!(
            "Update stream: heartbeat every {}s, {} events buffered per subscriber",
            config.heartbeat_interval().as_secs(),
            config.update_capacity(),
        );
    }
    info!("...server configured!");
    // Rocket's own launch chatter is noise from here on; our fairing logs requests.
    log4rs_dynamic_filters::DynamicLevelFilter::set("rocket", LevelFilter::Off);
    let _ = rocket.launch().await?;
    Ok(())
}

#[rocket::main]
async fn main() {
    // Set up logging.
    log4rs::init_file("log4rs.yaml", log4rs_dynamic_filters::default_deserializers())
        .expect("Failed to initialise logging");
    info!("Initialised logging");

    // Launch server.
    if let Err(err) = run().await {
        error!("{err}");
        error!("Critical failure, shutting down");
        std::process::exit(1)
    }
}
