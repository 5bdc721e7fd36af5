#[macro_use]
extern crate rocket;

mod api;
mod cdn;
mod cors;
mod db;
mod env;
mod error;
mod mail;
mod models;
mod payload;
mod reconcile;
mod telemetry;
#[cfg(test)]
mod test;
mod validation;

use cdn::CdnClient;
use cors::{Cors, json_catcher};
use env::{Settings, load_environment};
use rocket::data::{Limits, ToByteUnit};
use rocket::{Build, Rocket};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use telemetry::{TelemetryFairing, init_tracing};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Rocket(Box<rocket::Error>),
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("Environment file error: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

impl From<rocket::Error> for Error {
    fn from(value: rocket::Error) -> Self {
        Error::Rocket(Box::new(value))
    }
}

#[rocket::main]
async fn main() -> Result<(), Error> {
    let loaded = load_environment()?;
    let settings = Settings::from_env();

    let _telemetry = init_tracing(&settings.telemetry);
    for file in loaded {
        info!("Loaded environment from: {}", file);
    }

    let pool = SqlitePoolOptions::new()
        .connect(&settings.database_url)
        .await?;

    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations completed successfully");

    let _ = init_rocket(pool, settings).launch().await?;

    Ok(())
}

pub fn init_rocket(pool: SqlitePool, settings: Settings) -> Rocket<Build> {
    info!("Starting sports hall admin backend");

    let upload_limit = settings.upload_limit_mib.mebibytes();
    let limits = Limits::default()
        .limit("json", upload_limit)
        .limit("file", upload_limit)
        .limit("data-form", upload_limit);
    let figment = rocket::Config::figment().merge(("limits", limits));

    if settings.smtp.is_none() {
        info!("SMTP not configured, feedback mail runs in demo mode");
    }

    rocket::custom(figment)
        .manage(pool)
        .manage(CdnClient::new(settings.cdn.clone()))
        .manage(settings)
        .mount("/content", api::content::routes())
        .mount("/feedback-manage", api::feedback_manage::routes())
        .mount("/feedback-stats", api::feedback_stats::routes())
        .mount("/send-email", api::send_email::routes())
        .mount("/upload-document", api::upload_document::routes())
        .mount("/upload-photo", api::upload_photo::routes())
        .mount("/health", routes![api::health])
        .register("/", catchers![json_catcher])
        .attach(TelemetryFairing)
        .attach(Cors)
}
