use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Columns that were never filled in serialize as `null`.
pub struct Contact {
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub hours: Option<String>,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbContact {
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub hours: Option<String>,
}

impl From<DbContact> for Contact {
    fn from(db: DbContact) -> Self {
        Self {
            address: db.address,
            phone: db.phone,
            email: db.email,
            hours: db.hours,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Sport {
    pub id: String,
    pub name: String,
    pub image: String,
    pub video: String,
    pub rules: Vec<String>,
    pub safety: Vec<String>,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbSport {
    pub id: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub video: Option<String>,
}

impl DbSport {
    pub fn into_sport(self, rules: Vec<String>, safety: Vec<String>) -> Sport {
        Sport {
            id: self.id,
            name: self.name.unwrap_or_default(),
            image: self.image.unwrap_or_default(),
            video: self.video.unwrap_or_default(),
            rules,
            safety,
        }
    }
}

/// The two ordered text lists a sport owns. Both live in their own table
/// with the same shape apart from the text column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildList {
    Rules,
    Safety,
}

impl ChildList {
    pub fn table(self) -> &'static str {
        match self {
            ChildList::Rules => "sport_rules",
            ChildList::Safety => "sport_safety",
        }
    }

    pub fn text_column(self) -> &'static str {
        match self {
            ChildList::Rules => "rule_text",
            ChildList::Safety => "safety_text",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GalleryPhoto {
    #[serde(
        serialize_with = "serialize_id_as_string",
        deserialize_with = "deserialize_numeric_id"
    )]
    pub id: i64,
    pub url: String,
    pub title: String,
    pub description: String,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbGalleryPhoto {
    pub id: i64,
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl From<DbGalleryPhoto> for GalleryPhoto {
    fn from(db: DbGalleryPhoto) -> Self {
        Self {
            id: db.id,
            url: db.url.unwrap_or_default(),
            title: db.title.unwrap_or_default(),
            description: db.description.unwrap_or_default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FeedbackMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: Option<NaiveDateTime>,
    pub is_read: bool,
    pub is_archived: bool,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbFeedbackMessage {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub is_read: Option<bool>,
    pub is_archived: Option<bool>,
}

impl From<DbFeedbackMessage> for FeedbackMessage {
    fn from(db: DbFeedbackMessage) -> Self {
        Self {
            id: db.id,
            name: db.name.unwrap_or_default(),
            email: db.email.unwrap_or_default(),
            message: db.message.unwrap_or_default(),
            created_at: db.created_at,
            is_read: db.is_read.unwrap_or(false),
            is_archived: db.is_archived.unwrap_or(false),
        }
    }
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackCounts {
    pub total_count: i64,
    pub unread_count: i64,
    pub archived_count: i64,
}

pub struct Document {
    pub id: i64,
    pub doc_type: String,
    pub data: Vec<u8>,
    pub mime_type: String,
    pub uploaded_at: Option<NaiveDateTime>,
}

#[derive(sqlx::FromRow)]
pub struct DbDocument {
    pub id: i64,
    pub doc_type: String,
    pub file_data: Vec<u8>,
    pub mime_type: Option<String>,
    pub uploaded_at: Option<NaiveDateTime>,
}

pub const DEFAULT_DOCUMENT_MIME: &str = "application/pdf";

impl From<DbDocument> for Document {
    fn from(db: DbDocument) -> Self {
        Self {
            id: db.id,
            doc_type: db.doc_type,
            data: db.file_data,
            mime_type: db
                .mime_type
                .filter(|mime| !mime.is_empty())
                .unwrap_or_else(|| DEFAULT_DOCUMENT_MIME.to_string()),
            uploaded_at: db.uploaded_at,
        }
    }
}

fn serialize_id_as_string<S: serde::Serializer>(id: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&id.to_string())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlexibleId {
    Number(i64),
    Text(String),
}

/// Accepts `12` or `"12"`; the admin panel sends gallery ids as strings.
pub fn deserialize_numeric_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match FlexibleId::deserialize(deserializer)? {
        FlexibleId::Number(id) => Ok(id),
        FlexibleId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid id: {}", text))),
    }
}

/// Accepts `"volleyball"` or `3`; sport ids are text keys.
pub fn deserialize_text_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match FlexibleId::deserialize(deserializer)? {
        FlexibleId::Number(id) => Ok(id.to_string()),
        FlexibleId::Text(text) => Ok(text),
    }
}
