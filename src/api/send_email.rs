use rocket::http::Method;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use tracing::{info, warn};
use validator::Validate;

use crate::api::connection;
use crate::cors::{Preflight, method_not_allowed};
use crate::db::create_feedback;
use crate::env::Settings;
use crate::error::AppError;
use crate::mail::{FeedbackMail, send_feedback_mail};
use crate::validation::ValidateRequest;

const REQUIRED_MESSAGE: &str = "Name and email are required";

pub fn routes() -> Vec<Route> {
    let mut routes = routes![send_email, preflight];
    routes.extend(method_not_allowed(&[Method::Post]));
    routes
}

/// Contact form submission. The site form sends the contact value as
/// `phone`; `email` is read only when `phone` is absent or empty.
#[derive(Deserialize, Validate, Debug, Default)]
pub struct FeedbackSubmission {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name and email are required"))]
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub sport: Option<String>,
}

impl FeedbackSubmission {
    pub fn contact(&self) -> Option<&str> {
        non_empty(&self.phone).or_else(|| non_empty(&self.email))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SendEmailResponse {
    pub success: bool,
    pub message: String,
}

/// Stores the submission, then mails it. The stored row is kept even when
/// delivery fails afterwards; the caller still gets a 500 in that case.
#[post("/", data = "<submission>")]
pub async fn send_email(
    submission: Option<Json<FeedbackSubmission>>,
    db: &State<Pool<Sqlite>>,
    settings: &State<Settings>,
) -> Result<Json<SendEmailResponse>, AppError> {
    let submission = submission
        .map(|Json(submission)| submission)
        .unwrap_or_default()
        .validated()
        .map_err(|_| AppError::Validation(REQUIRED_MESSAGE.to_string()))?;
    let contact = submission
        .contact()
        .ok_or_else(|| AppError::Validation(REQUIRED_MESSAGE.to_string()))?;

    let mut conn = connection(db).await?;
    let feedback_id =
        create_feedback(&mut conn, &submission.name, contact, &submission.message).await?;
    drop(conn);
    info!(feedback_id, "Feedback stored");

    let Some(smtp) = settings.smtp.as_ref() else {
        warn!("SMTP is not configured, skipping delivery");
        return Ok(Json(SendEmailResponse {
            success: true,
            message: "Email queued (demo mode)".to_string(),
        }));
    };

    let mail = FeedbackMail {
        name: &submission.name,
        contact,
        message: &submission.message,
        sport: submission.sport.as_deref(),
    };
    send_feedback_mail(smtp, &mail).await?;

    Ok(Json(SendEmailResponse {
        success: true,
        message: "Email sent successfully".to_string(),
    }))
}

#[options("/")]
pub fn preflight() -> Preflight {
    Preflight::new("POST, OPTIONS")
}
