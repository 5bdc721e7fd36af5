use rocket::http::Method;
use rocket::serde::json::{self, Json};
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::cdn::CdnClient;
use crate::cors::{Preflight, method_not_allowed};
use crate::error::AppError;
use crate::payload::{decode_base64_payload, file_extension, image_mime_for_extension};
use crate::validation::json_body;

const DEFAULT_FILENAME: &str = "photo.jpg";

pub fn routes() -> Vec<Route> {
    let mut routes = routes![upload_photo, preflight];
    routes.extend(method_not_allowed(&[Method::Post]));
    routes
}

#[derive(Deserialize, Debug)]
pub struct PhotoUploadRequest {
    pub file: Option<String>,
    pub filename: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PhotoUploadResponse {
    pub url: String,
    pub filename: String,
}

/// Name the file is published under: a fresh uuid keeping the client's
/// extension.
pub fn cdn_filename(original: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), file_extension(original))
}

#[post("/", data = "<upload>")]
pub async fn upload_photo(
    upload: Result<Json<PhotoUploadRequest>, json::Error<'_>>,
    cdn: &State<CdnClient>,
) -> Result<Json<PhotoUploadResponse>, AppError> {
    let upload = json_body(upload)?;

    let file = upload
        .file
        .filter(|file| !file.is_empty())
        .ok_or_else(|| AppError::Validation("No file data provided".to_string()))?;
    let bytes = decode_base64_payload(&file)?;

    let original = upload
        .filename
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
    let filename = cdn_filename(&original);
    let mime_type = image_mime_for_extension(file_extension(&filename));

    let url = cdn.upload(&filename, bytes, mime_type).await?;
    info!(%filename, "Photo uploaded");

    Ok(Json(PhotoUploadResponse { url, filename }))
}

#[options("/")]
pub fn preflight() -> Preflight {
    Preflight::new("POST, OPTIONS")
}
