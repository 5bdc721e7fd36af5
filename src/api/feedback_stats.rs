use chrono::NaiveDateTime;
use rocket::http::Method;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};

use crate::api::connection;
use crate::cors::{Preflight, method_not_allowed};
use crate::db::{count_feedback, get_recent_feedback};
use crate::error::AppError;
use crate::models::FeedbackMessage;

const RECENT_LIMIT: i64 = 10;

pub fn routes() -> Vec<Route> {
    let mut routes = routes![feedback_stats, preflight];
    routes.extend(method_not_allowed(&[Method::Get]));
    routes
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RecentMessage {
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: Option<NaiveDateTime>,
}

impl From<FeedbackMessage> for RecentMessage {
    fn from(feedback: FeedbackMessage) -> Self {
        Self {
            name: feedback.name,
            email: feedback.email,
            message: feedback.message,
            created_at: feedback.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FeedbackStatsResponse {
    pub total_count: i64,
    pub recent_messages: Vec<RecentMessage>,
}

#[get("/")]
pub async fn feedback_stats(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<FeedbackStatsResponse>, AppError> {
    let mut conn = connection(db).await?;

    let total_count = count_feedback(&mut conn).await?;
    let recent_messages = get_recent_feedback(&mut conn, RECENT_LIMIT)
        .await?
        .into_iter()
        .map(RecentMessage::from)
        .collect();

    Ok(Json(FeedbackStatsResponse {
        total_count,
        recent_messages,
    }))
}

#[options("/")]
pub fn preflight() -> Preflight {
    Preflight::new("GET, OPTIONS")
}
