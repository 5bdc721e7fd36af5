use rocket::State;
use serde::{Deserialize, Serialize};
use sqlx::pool::PoolConnection;
use sqlx::{Pool, Sqlite};

use crate::error::AppError;

pub mod content;
pub mod feedback_manage;
pub mod feedback_stats;
pub mod send_email;
pub mod upload_document;
pub mod upload_photo;

/// `{"success": true, "message": "..."}`, used by the mutating content routes.
#[derive(Serialize, Deserialize, Debug)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn new(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}

/// `{"message": "..."}`, used by the feedback moderation routes.
#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

/// One connection per request, released when the handler returns.
pub async fn connection(db: &State<Pool<Sqlite>>) -> Result<PoolConnection<Sqlite>, AppError> {
    Ok(db.acquire().await?)
}

#[get("/")]
pub fn health() -> &'static str {
    "OK"
}
