use std::str::FromStr;

use rocket::http::Method;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};

use crate::api::{MessageResponse, connection};
use crate::cors::{Preflight, method_not_allowed};
use crate::db::{
    delete_feedback, get_feedback, get_feedback_counts, mark_feedback_read,
    set_feedback_archived,
};
use crate::error::AppError;
use crate::models::{FeedbackCounts, FeedbackMessage};

pub fn routes() -> Vec<Route> {
    let mut routes = routes![list_feedback, update_feedback, remove_feedback, preflight];
    routes.extend(method_not_allowed(&[Method::Get, Method::Put, Method::Delete]));
    routes
}

#[derive(FromForm, Debug, Default)]
pub struct FeedbackQuery {
    pub archived: Option<String>,
    pub id: Option<i64>,
}

impl FeedbackQuery {
    /// Only a case-insensitive `true` selects the archive.
    fn show_archived(&self) -> bool {
        self.archived
            .as_deref()
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }

    fn required_id(&self) -> Result<i64, AppError> {
        self.id
            .ok_or_else(|| AppError::Validation("Feedback ID required".to_string()))
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FeedbackListResponse {
    pub feedback: Vec<FeedbackMessage>,
    #[serde(flatten)]
    pub counts: FeedbackCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackAction {
    #[default]
    MarkRead,
    Archive,
    Unarchive,
}

impl FromStr for FeedbackAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mark_read" => Ok(FeedbackAction::MarkRead),
            "archive" => Ok(FeedbackAction::Archive),
            "unarchive" => Ok(FeedbackAction::Unarchive),
            other => Err(AppError::Validation(format!("Unknown action: {}", other))),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct FeedbackUpdateRequest {
    pub action: Option<String>,
}

impl FeedbackUpdateRequest {
    fn action(&self) -> Result<FeedbackAction, AppError> {
        match self.action.as_deref() {
            Some(action) => action.parse(),
            None => Ok(FeedbackAction::default()),
        }
    }
}

#[get("/?<query..>")]
pub async fn list_feedback(
    query: FeedbackQuery,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<FeedbackListResponse>, AppError> {
    let mut conn = connection(db).await?;

    let feedback = get_feedback(&mut conn, query.show_archived()).await?;
    let counts = get_feedback_counts(&mut conn).await?;

    Ok(Json(FeedbackListResponse { feedback, counts }))
}

/// A missing or unreadable body means the default action, `mark_read`.
#[put("/?<query..>", data = "<update>")]
pub async fn update_feedback(
    query: FeedbackQuery,
    update: Option<Json<FeedbackUpdateRequest>>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = query.required_id()?;
    let action = update
        .map(|Json(update)| update)
        .unwrap_or_default()
        .action()?;

    let mut conn = connection(db).await?;
    match action {
        FeedbackAction::MarkRead => mark_feedback_read(&mut conn, id).await?,
        FeedbackAction::Archive => set_feedback_archived(&mut conn, id, true).await?,
        FeedbackAction::Unarchive => set_feedback_archived(&mut conn, id, false).await?,
    }

    Ok(Json(MessageResponse {
        message: "Success".to_string(),
    }))
}

#[delete("/?<query..>")]
pub async fn remove_feedback(
    query: FeedbackQuery,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = query.required_id()?;

    let mut conn = connection(db).await?;
    delete_feedback(&mut conn, id).await?;

    Ok(Json(MessageResponse {
        message: "Deleted".to_string(),
    }))
}

#[options("/")]
pub fn preflight() -> Preflight {
    Preflight::new("GET, PUT, DELETE, OPTIONS")
}
