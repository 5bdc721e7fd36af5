use rocket::form::{self, Form};
use rocket::fs::TempFile;
use rocket::http::{ContentType, Method};
use rocket::serde::json::{self, Json};
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use tokio::io::AsyncReadExt;
use tracing::info;
use validator::Validate;

use crate::api::connection;
use crate::cors::{Preflight, method_not_allowed};
use crate::db::{get_latest_document, insert_document};
use crate::error::AppError;
use crate::models::DEFAULT_DOCUMENT_MIME;
use crate::payload::{data_url_mime, decode_base64_payload};
use crate::validation::{ValidateRequest, json_body};

pub fn routes() -> Vec<Route> {
    let mut routes = routes![get_document, upload_document_form, upload_document_json, preflight];
    routes.extend(method_not_allowed(&[Method::Get, Method::Post]));
    routes
}

#[derive(FromForm, Debug, Default)]
pub struct DocumentQuery {
    #[field(name = "type")]
    #[field(name = "doc_type")]
    pub doc_type: Option<String>,
}

#[derive(Deserialize, Validate, Debug)]
pub struct DocumentUploadRequest {
    #[serde(default, rename = "docType", alias = "doc_type")]
    #[validate(length(min = 1, message = "Document type required"))]
    pub doc_type: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "No file data provided"))]
    pub file: String,
    #[serde(default, rename = "mimeType", alias = "mime_type")]
    pub mime_type: Option<String>,
}

#[derive(FromForm)]
pub struct DocumentForm<'r> {
    #[field(name = uncased("docType"))]
    #[field(name = "doc_type")]
    pub doc_type: String,
    pub file: TempFile<'r>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct DocumentUploadResponse {
    pub success: bool,
    pub id: i64,
    pub doc_type: String,
    pub size: usize,
}

/// Newest stored version of a document, served with its own mime type.
#[get("/?<query..>")]
pub async fn get_document(
    query: DocumentQuery,
    db: &State<Pool<Sqlite>>,
) -> Result<(ContentType, Vec<u8>), AppError> {
    let doc_type = query
        .doc_type
        .filter(|doc_type| !doc_type.is_empty())
        .ok_or_else(|| AppError::Validation("Document type required".to_string()))?;

    let mut conn = connection(db).await?;
    let document = get_latest_document(&mut conn, &doc_type).await?;
    info!(
        id = document.id,
        doc_type = %document.doc_type,
        uploaded_at = ?document.uploaded_at,
        "Serving document"
    );

    let content_type = ContentType::parse_flexible(&document.mime_type).unwrap_or(ContentType::PDF);
    Ok((content_type, document.data))
}

#[post("/", format = "multipart/form-data", data = "<form>", rank = 1)]
pub async fn upload_document_form(
    form: Result<Form<DocumentForm<'_>>, form::Errors<'_>>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<DocumentUploadResponse>, AppError> {
    let form = form.map_err(|errors| AppError::Validation(format!("Invalid form: {}", errors)))?;
    if form.doc_type.is_empty() {
        return Err(AppError::Validation("Document type required".to_string()));
    }

    let mime_type = form
        .file
        .content_type()
        .map(|content_type| content_type.to_string())
        .filter(|mime| mime != "application/octet-stream")
        .unwrap_or_else(|| DEFAULT_DOCUMENT_MIME.to_string());

    let mut data = Vec::new();
    let reader = form.file.open().await?;
    tokio::pin!(reader);
    reader.read_to_end(&mut data).await?;

    store(db, &form.doc_type, &data, &mime_type).await
}

#[post("/", data = "<upload>", rank = 2)]
pub async fn upload_document_json(
    upload: Result<Json<DocumentUploadRequest>, json::Error<'_>>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<DocumentUploadResponse>, AppError> {
    let upload = json_body(upload)?.validated()?;

    let mime_type = upload
        .mime_type
        .clone()
        .filter(|mime| !mime.is_empty())
        .or_else(|| data_url_mime(&upload.file).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_DOCUMENT_MIME.to_string());
    let data = decode_base64_payload(&upload.file)?;

    store(db, &upload.doc_type, &data, &mime_type).await
}

async fn store(
    db: &State<Pool<Sqlite>>,
    doc_type: &str,
    data: &[u8],
    mime_type: &str,
) -> Result<Json<DocumentUploadResponse>, AppError> {
    if data.is_empty() {
        return Err(AppError::Validation("No file data provided".to_string()));
    }

    let mut conn = connection(db).await?;
    let id = insert_document(&mut conn, doc_type, data, mime_type).await?;

    Ok(Json(DocumentUploadResponse {
        success: true,
        id,
        doc_type: doc_type.to_string(),
        size: data.len(),
    }))
}

#[options("/")]
pub fn preflight() -> Preflight {
    Preflight::new("GET, POST, OPTIONS")
}
