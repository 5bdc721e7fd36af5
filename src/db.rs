use sqlx::SqliteConnection;
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{
    ChildList, Contact, DbContact, DbDocument, DbFeedbackMessage, DbGalleryPhoto, DbSport,
    Document, FeedbackCounts, FeedbackMessage, GalleryPhoto, Sport,
};
use crate::reconcile::{ListOp, TrailingRows, reconcile};

// Contacts

#[instrument(skip(conn))]
pub async fn get_current_contact(conn: &mut SqliteConnection) -> Result<Option<Contact>, AppError> {
    info!("Fetching current contact");
    let row = sqlx::query_as::<_, DbContact>(
        "SELECT address, phone, email, hours FROM contacts ORDER BY id DESC LIMIT 1",
    )
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(Contact::from))
}

/// Rewrites the newest contact row, creating it when the table is empty.
#[instrument(skip(conn))]
pub async fn update_current_contact(
    conn: &mut SqliteConnection,
    address: Option<&str>,
    phone: Option<&str>,
    email: Option<&str>,
    hours: Option<&str>,
) -> Result<(), AppError> {
    info!("Updating current contact");
    let result = sqlx::query(
        "UPDATE contacts
         SET address = COALESCE(?, address), phone = COALESCE(?, phone),
             email = COALESCE(?, email), hours = COALESCE(?, hours),
             updated_at = CURRENT_TIMESTAMP
         WHERE id = (SELECT id FROM contacts ORDER BY id DESC LIMIT 1)",
    )
    .bind(address)
    .bind(phone)
    .bind(email)
    .bind(hours)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        info!("No contact row yet, inserting one");
        sqlx::query("INSERT INTO contacts (address, phone, email, hours) VALUES (?, ?, ?, ?)")
            .bind(address)
            .bind(phone)
            .bind(email)
            .bind(hours)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

// Sports

#[instrument(skip(conn))]
pub async fn get_sports(conn: &mut SqliteConnection) -> Result<Vec<Sport>, AppError> {
    info!("Fetching sports with rules and safety");
    let rows = sqlx::query_as::<_, DbSport>(
        "SELECT id, name, image, video FROM sports ORDER BY display_order, id",
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut sports = Vec::with_capacity(rows.len());
    for row in rows {
        let rules = get_child_texts(conn, ChildList::Rules, &row.id).await?;
        let safety = get_child_texts(conn, ChildList::Safety, &row.id).await?;
        sports.push(row.into_sport(rules, safety));
    }

    Ok(sports)
}

#[instrument(skip(conn))]
pub async fn get_child_texts(
    conn: &mut SqliteConnection,
    list: ChildList,
    sport_id: &str,
) -> Result<Vec<String>, AppError> {
    let sql = format!(
        "SELECT {} FROM {} WHERE sport_id = ? ORDER BY display_order, id",
        list.text_column(),
        list.table()
    );

    let texts = sqlx::query_scalar::<_, String>(&sql)
        .bind(sport_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(texts)
}

#[instrument(skip(conn))]
pub async fn get_child_row_ids(
    conn: &mut SqliteConnection,
    list: ChildList,
    sport_id: &str,
) -> Result<Vec<i64>, AppError> {
    let sql = format!(
        "SELECT id FROM {} WHERE sport_id = ? ORDER BY display_order, id",
        list.table()
    );

    let ids = sqlx::query_scalar::<_, i64>(&sql)
        .bind(sport_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(ids)
}

#[instrument(skip(conn))]
pub async fn update_sport_fields(
    conn: &mut SqliteConnection,
    sport_id: &str,
    name: Option<&str>,
    image: Option<&str>,
    video: Option<&str>,
) -> Result<(), AppError> {
    info!("Updating sport");
    sqlx::query(
        "UPDATE sports
         SET name = COALESCE(?, name), image = COALESCE(?, image), video = COALESCE(?, video),
             updated_at = CURRENT_TIMESTAMP
         WHERE id = ?",
    )
    .bind(name)
    .bind(image)
    .bind(video)
    .bind(sport_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[instrument(skip(conn, ops), fields(op_count = ops.len()))]
pub async fn apply_list_ops(
    conn: &mut SqliteConnection,
    list: ChildList,
    sport_id: &str,
    ops: &[ListOp],
) -> Result<(), AppError> {
    let update_sql = format!("UPDATE {} SET {} = ? WHERE id = ?", list.table(), list.text_column());
    let insert_sql = format!(
        "INSERT INTO {} (sport_id, {}, display_order) VALUES (?, ?, ?)",
        list.table(),
        list.text_column()
    );
    let delete_sql = format!("DELETE FROM {} WHERE id = ?", list.table());

    for op in ops {
        match op {
            ListOp::Update { row_id, text } => {
                sqlx::query(&update_sql)
                    .bind(text)
                    .bind(row_id)
                    .execute(&mut *conn)
                    .await?;
            }
            ListOp::Insert {
                display_order,
                text,
            } => {
                sqlx::query(&insert_sql)
                    .bind(sport_id)
                    .bind(text)
                    .bind(display_order)
                    .execute(&mut *conn)
                    .await?;
            }
            ListOp::Delete { row_id } => {
                sqlx::query(&delete_sql)
                    .bind(row_id)
                    .execute(&mut *conn)
                    .await?;
            }
        }
    }

    Ok(())
}

/// Brings one child list of a sport in line with `submitted` by position.
#[instrument(skip(conn, submitted), fields(submitted_len = submitted.len()))]
pub async fn sync_child_list(
    conn: &mut SqliteConnection,
    list: ChildList,
    sport_id: &str,
    submitted: &[String],
    policy: TrailingRows,
) -> Result<(), AppError> {
    let existing = get_child_row_ids(conn, list, sport_id).await?;
    let ops = reconcile(&existing, submitted, policy);
    apply_list_ops(conn, list, sport_id, &ops).await
}

// Gallery

#[instrument(skip(conn))]
pub async fn get_gallery_photos(conn: &mut SqliteConnection) -> Result<Vec<GalleryPhoto>, AppError> {
    info!("Fetching gallery photos");
    let rows = sqlx::query_as::<_, DbGalleryPhoto>(
        "SELECT id, url, title, description FROM gallery_photos ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(GalleryPhoto::from).collect())
}

#[instrument(skip(conn))]
pub async fn create_gallery_photo(
    conn: &mut SqliteConnection,
    url: &str,
    title: &str,
    description: &str,
) -> Result<i64, AppError> {
    info!("Creating gallery photo");
    let res = sqlx::query("INSERT INTO gallery_photos (url, title, description) VALUES (?, ?, ?)")
        .bind(url)
        .bind(title)
        .bind(description)
        .execute(&mut *conn)
        .await?;

    Ok(res.last_insert_rowid())
}

#[instrument(skip(conn))]
pub async fn update_gallery_photo(
    conn: &mut SqliteConnection,
    id: i64,
    url: Option<&str>,
    title: Option<&str>,
    description: Option<&str>,
) -> Result<(), AppError> {
    info!("Updating gallery photo");
    sqlx::query(
        "UPDATE gallery_photos
         SET url = COALESCE(?, url), title = COALESCE(?, title),
             description = COALESCE(?, description), updated_at = CURRENT_TIMESTAMP
         WHERE id = ?",
    )
    .bind(url)
    .bind(title)
    .bind(description)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// No existence check: deleting an unknown id is a silent success.
#[instrument(skip(conn))]
pub async fn delete_gallery_photo(conn: &mut SqliteConnection, id: i64) -> Result<(), AppError> {
    info!("Deleting gallery photo");
    sqlx::query("DELETE FROM gallery_photos WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

// Feedback

#[instrument(skip(conn))]
pub async fn create_feedback(
    conn: &mut SqliteConnection,
    name: &str,
    email: &str,
    message: &str,
) -> Result<i64, AppError> {
    info!("Storing feedback message");
    let res = sqlx::query("INSERT INTO feedback_messages (name, email, message) VALUES (?, ?, ?)")
        .bind(name)
        .bind(email)
        .bind(message)
        .execute(&mut *conn)
        .await?;

    Ok(res.last_insert_rowid())
}

#[instrument(skip(conn))]
pub async fn get_feedback(
    conn: &mut SqliteConnection,
    archived: bool,
) -> Result<Vec<FeedbackMessage>, AppError> {
    info!("Fetching feedback list");
    let rows = sqlx::query_as::<_, DbFeedbackMessage>(
        "SELECT id, name, email, message, created_at, is_read, is_archived
         FROM feedback_messages
         WHERE is_archived = ?
         ORDER BY created_at DESC, id DESC",
    )
    .bind(archived)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(FeedbackMessage::from).collect())
}

#[instrument(skip(conn))]
pub async fn get_feedback_counts(conn: &mut SqliteConnection) -> Result<FeedbackCounts, AppError> {
    let counts = sqlx::query_as::<_, FeedbackCounts>(
        "SELECT
            COUNT(*) AS total_count,
            COUNT(*) FILTER (WHERE NOT is_read) AS unread_count,
            COUNT(*) FILTER (WHERE is_archived) AS archived_count
         FROM feedback_messages",
    )
    .fetch_one(&mut *conn)
    .await?;

    Ok(counts)
}

#[instrument(skip(conn))]
pub async fn count_feedback(conn: &mut SqliteConnection) -> Result<i64, AppError> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM feedback_messages")
        .fetch_one(&mut *conn)
        .await?;

    Ok(total)
}

#[instrument(skip(conn))]
pub async fn get_recent_feedback(
    conn: &mut SqliteConnection,
    limit: i64,
) -> Result<Vec<FeedbackMessage>, AppError> {
    info!("Fetching recent feedback");
    let rows = sqlx::query_as::<_, DbFeedbackMessage>(
        "SELECT id, name, email, message, created_at, is_read, is_archived
         FROM feedback_messages
         ORDER BY created_at DESC, id DESC
         LIMIT ?",
    )
    .bind(limit)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(FeedbackMessage::from).collect())
}

#[instrument(skip(conn))]
pub async fn mark_feedback_read(conn: &mut SqliteConnection, id: i64) -> Result<(), AppError> {
    info!("Marking feedback as read");
    sqlx::query("UPDATE feedback_messages SET is_read = TRUE WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

#[instrument(skip(conn))]
pub async fn set_feedback_archived(
    conn: &mut SqliteConnection,
    id: i64,
    archived: bool,
) -> Result<(), AppError> {
    info!("Setting feedback archived flag");
    sqlx::query("UPDATE feedback_messages SET is_archived = ? WHERE id = ?")
        .bind(archived)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

#[instrument(skip(conn))]
pub async fn delete_feedback(conn: &mut SqliteConnection, id: i64) -> Result<(), AppError> {
    info!("Deleting feedback");
    sqlx::query("DELETE FROM feedback_messages WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

// Documents

/// Always appends; older versions of the same type stay in the table.
#[instrument(skip(conn, data), fields(size = data.len()))]
pub async fn insert_document(
    conn: &mut SqliteConnection,
    doc_type: &str,
    data: &[u8],
    mime_type: &str,
) -> Result<i64, AppError> {
    info!("Storing document");
    let res = sqlx::query("INSERT INTO documents (doc_type, file_data, mime_type) VALUES (?, ?, ?)")
        .bind(doc_type)
        .bind(data)
        .bind(mime_type)
        .execute(&mut *conn)
        .await?;

    Ok(res.last_insert_rowid())
}

#[instrument(skip(conn))]
pub async fn get_latest_document(
    conn: &mut SqliteConnection,
    doc_type: &str,
) -> Result<Document, AppError> {
    info!("Fetching latest document");
    let row = sqlx::query_as::<_, DbDocument>(
        "SELECT id, doc_type, file_data, mime_type, uploaded_at
         FROM documents
         WHERE doc_type = ?
         ORDER BY uploaded_at DESC, id DESC
         LIMIT 1",
    )
    .bind(doc_type)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(document) => Ok(Document::from(document)),
        None => Err(AppError::NotFound("Document not found".to_string())),
    }
}
