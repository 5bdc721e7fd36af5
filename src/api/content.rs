use rocket::http::{Method, Status};
use rocket::response::status::Custom;
use rocket::serde::json::{self, Json};
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use tracing::info;
use validator::Validate;

use crate::api::{SuccessResponse, connection};
use crate::cors::{Preflight, method_not_allowed};
use crate::db::{
    create_gallery_photo, delete_gallery_photo, get_current_contact, get_gallery_photos,
    get_sports, sync_child_list, update_current_contact, update_gallery_photo,
    update_sport_fields,
};
use crate::env::Settings;
use crate::error::AppError;
use crate::models::{
    ChildList, Contact, GalleryPhoto, Sport, deserialize_numeric_id, deserialize_text_id,
};
use crate::validation::{ValidateRequest, envelope_data, json_body};

pub fn routes() -> Vec<Route> {
    let mut routes = routes![
        get_content,
        create_content,
        update_content,
        delete_content,
        preflight
    ];
    routes.extend(method_not_allowed(&[
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
    ]));
    routes
}

#[derive(FromForm, Debug, Default)]
pub struct ContentQuery {
    #[field(name = "type")]
    pub kind: Option<String>,
    pub id: Option<i64>,
}

impl ContentQuery {
    fn is_gallery(&self) -> bool {
        self.kind.as_deref() == Some("gallery")
    }
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum ContentResponse {
    Gallery(Vec<GalleryPhoto>),
    All {
        contacts: Option<Contact>,
        sports: Vec<Sport>,
    },
}

/// `{type, data}` body shared by POST and PUT; `data` is decoded once the
/// type is known.
#[derive(Deserialize, Debug)]
pub struct ContentEnvelope {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Deserialize, Validate, Debug)]
pub struct NewGalleryPhoto {
    #[serde(default)]
    #[validate(length(min = 1, message = "Photo URL is required"))]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreatedPhotoResponse {
    pub success: bool,
    pub id: String,
    pub url: String,
    pub title: String,
    pub description: String,
}

#[derive(Deserialize, Debug)]
pub struct GalleryPhotoUpdate {
    #[serde(deserialize_with = "deserialize_numeric_id")]
    pub id: i64,
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ContactUpdate {
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub hours: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct SportUpdate {
    #[serde(deserialize_with = "deserialize_text_id")]
    pub id: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub video: Option<String>,
    /// An absent list is left as stored; an empty one is reconciled.
    pub rules: Option<Vec<String>>,
    pub safety: Option<Vec<String>>,
}

#[get("/?<query..>")]
pub async fn get_content(
    query: ContentQuery,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ContentResponse>, AppError> {
    let mut conn = connection(db).await?;

    if query.is_gallery() {
        let photos = get_gallery_photos(&mut conn).await?;
        return Ok(Json(ContentResponse::Gallery(photos)));
    }

    let contacts = get_current_contact(&mut conn).await?;
    let sports = get_sports(&mut conn).await?;

    Ok(Json(ContentResponse::All { contacts, sports }))
}

#[post("/", data = "<body>")]
pub async fn create_content(
    body: Result<Json<ContentEnvelope>, json::Error<'_>>,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<CreatedPhotoResponse>>, AppError> {
    let envelope = json_body(body)?;

    match envelope.kind.as_deref() {
        Some("gallery") => {
            let photo = envelope_data::<NewGalleryPhoto>(envelope.data)?.validated()?;

            let mut conn = connection(db).await?;
            let id =
                create_gallery_photo(&mut conn, &photo.url, &photo.title, &photo.description)
                    .await?;

            Ok(Custom(
                Status::Created,
                Json(CreatedPhotoResponse {
                    success: true,
                    id: id.to_string(),
                    url: photo.url,
                    title: photo.title,
                    description: photo.description,
                }),
            ))
        }
        _ => Err(AppError::MethodNotAllowed),
    }
}

#[put("/", data = "<body>")]
pub async fn update_content(
    body: Result<Json<ContentEnvelope>, json::Error<'_>>,
    db: &State<Pool<Sqlite>>,
    settings: &State<Settings>,
) -> Result<Json<SuccessResponse>, AppError> {
    let envelope = json_body(body)?;

    match envelope.kind.as_deref() {
        Some("gallery") => {
            let photo: GalleryPhotoUpdate = envelope_data(envelope.data)?;

            let mut conn = connection(db).await?;
            update_gallery_photo(
                &mut conn,
                photo.id,
                photo.url.as_deref(),
                photo.title.as_deref(),
                photo.description.as_deref(),
            )
            .await?;

            Ok(Json(SuccessResponse::new("Photo updated")))
        }
        Some("contacts") => {
            let contact: ContactUpdate = envelope_data(envelope.data)?;

            let mut conn = connection(db).await?;
            update_current_contact(
                &mut conn,
                contact.address.as_deref(),
                contact.phone.as_deref(),
                contact.email.as_deref(),
                contact.hours.as_deref(),
            )
            .await?;

            Ok(Json(SuccessResponse::new("Contacts updated")))
        }
        Some("sports") => {
            let sports: Vec<SportUpdate> = envelope_data(envelope.data)?;
            info!(count = sports.len(), "Bulk sports update");

            let mut tx = db.begin().await?;
            for sport in &sports {
                update_sport_fields(
                    &mut tx,
                    &sport.id,
                    sport.name.as_deref(),
                    sport.image.as_deref(),
                    sport.video.as_deref(),
                )
                .await?;

                for (list, submitted) in [
                    (ChildList::Rules, &sport.rules),
                    (ChildList::Safety, &sport.safety),
                ] {
                    if let Some(submitted) = submitted {
                        sync_child_list(&mut tx, list, &sport.id, submitted, settings.trailing_rows)
                            .await?;
                    }
                }
            }
            tx.commit().await?;

            Ok(Json(SuccessResponse::new("Sports updated")))
        }
        _ => Err(AppError::MethodNotAllowed),
    }
}

#[delete("/?<query..>")]
pub async fn delete_content(
    query: ContentQuery,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !query.is_gallery() {
        return Err(AppError::MethodNotAllowed);
    }

    let id = query
        .id
        .ok_or_else(|| AppError::Validation("Photo ID required".to_string()))?;

    let mut conn = connection(db).await?;
    delete_gallery_photo(&mut conn, id).await?;

    Ok(Json(SuccessResponse::new("Photo deleted")))
}

#[options("/")]
pub fn preflight() -> Preflight {
    Preflight::with_headers("GET, POST, PUT, DELETE, OPTIONS", "Content-Type, X-Auth-Token")
}
