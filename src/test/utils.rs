#[cfg(test)]
pub mod test_utils {
    use crate::db::{create_feedback, create_gallery_photo};
    use crate::env::{CdnSettings, Settings};
    use crate::error::AppError;
    use crate::init_rocket;
    use rocket::local::asynchronous::Client;
    use sqlx::{Pool, Sqlite, SqlitePool};
    use std::collections::HashMap;
    use std::sync::Once;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    static INIT: Once = Once::new();

    #[derive(Default)]
    pub struct TestDbBuilder {
        contacts: Vec<TestContact>,
        sports: Vec<TestSport>,
        photos: Vec<TestPhoto>,
        feedback: Vec<TestFeedback>,
        documents: Vec<TestDocument>,
    }

    pub struct TestContact {
        pub address: String,
        pub phone: String,
        pub email: String,
        pub hours: String,
    }

    pub struct TestSport {
        pub id: String,
        pub name: String,
        pub rules: Vec<String>,
        pub safety: Vec<String>,
    }

    pub struct TestPhoto {
        pub url: String,
        pub title: String,
    }

    pub struct TestFeedback {
        pub name: String,
        pub email: String,
        pub message: String,
        pub is_read: bool,
        pub is_archived: bool,
    }

    pub struct TestDocument {
        pub doc_type: String,
        pub data: Vec<u8>,
        pub mime_type: String,
        pub uploaded_at: String,
    }

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    impl TestDbBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn contact(mut self, address: &str, phone: &str, email: &str, hours: &str) -> Self {
            self.contacts.push(TestContact {
                address: address.to_string(),
                phone: phone.to_string(),
                email: email.to_string(),
                hours: hours.to_string(),
            });
            self
        }

        pub fn sport(mut self, id: &str, name: &str, rules: &[&str], safety: &[&str]) -> Self {
            self.sports.push(TestSport {
                id: id.to_string(),
                name: name.to_string(),
                rules: owned(rules),
                safety: owned(safety),
            });
            self
        }

        pub fn photo(mut self, url: &str, title: &str) -> Self {
            self.photos.push(TestPhoto {
                url: url.to_string(),
                title: title.to_string(),
            });
            self
        }

        /// Messages get increasing `created_at` values in insertion order.
        pub fn feedback(
            mut self,
            name: &str,
            email: &str,
            message: &str,
            is_read: bool,
            is_archived: bool,
        ) -> Self {
            self.feedback.push(TestFeedback {
                name: name.to_string(),
                email: email.to_string(),
                message: message.to_string(),
                is_read,
                is_archived,
            });
            self
        }

        pub fn document(
            mut self,
            doc_type: &str,
            data: &[u8],
            mime_type: &str,
            uploaded_at: &str,
        ) -> Self {
            self.documents.push(TestDocument {
                doc_type: doc_type.to_string(),
                data: data.to_vec(),
                mime_type: mime_type.to_string(),
                uploaded_at: uploaded_at.to_string(),
            });
            self
        }

        pub async fn build(self) -> Result<TestDb, AppError> {
            INIT.call_once(|| {
                let _ = env_logger::builder()
                    .parse_filters("debug")
                    .is_test(true)
                    .try_init();
            });

            let pool = SqlitePool::connect("sqlite::memory:").await?;

            sqlx::migrate!("./migrations").run(&pool).await?;

            let mut conn = pool.acquire().await?;
            let mut photo_ids: HashMap<String, i64> = HashMap::new();
            let mut feedback_ids: HashMap<String, i64> = HashMap::new();

            for contact in &self.contacts {
                sqlx::query("INSERT INTO contacts (address, phone, email, hours) VALUES (?, ?, ?, ?)")
                    .bind(&contact.address)
                    .bind(&contact.phone)
                    .bind(&contact.email)
                    .bind(&contact.hours)
                    .execute(&mut *conn)
                    .await?;
            }

            for (order, sport) in self.sports.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO sports (id, name, image, video, display_order) VALUES (?, ?, ?, ?, ?)",
                )
                .bind(&sport.id)
                .bind(&sport.name)
                .bind(format!("/img/{}.jpg", sport.id))
                .bind(format!("/video/{}.mp4", sport.id))
                .bind(order as i64 + 1)
                .execute(&mut *conn)
                .await?;

                for (idx, rule) in sport.rules.iter().enumerate() {
                    sqlx::query(
                        "INSERT INTO sport_rules (sport_id, rule_text, display_order) VALUES (?, ?, ?)",
                    )
                    .bind(&sport.id)
                    .bind(rule)
                    .bind(idx as i64 + 1)
                    .execute(&mut *conn)
                    .await?;
                }

                for (idx, line) in sport.safety.iter().enumerate() {
                    sqlx::query(
                        "INSERT INTO sport_safety (sport_id, safety_text, display_order) VALUES (?, ?, ?)",
                    )
                    .bind(&sport.id)
                    .bind(line)
                    .bind(idx as i64 + 1)
                    .execute(&mut *conn)
                    .await?;
                }
            }

            for photo in &self.photos {
                let id = create_gallery_photo(&mut conn, &photo.url, &photo.title, "").await?;
                photo_ids.insert(photo.title.clone(), id);
            }

            for (idx, feedback) in self.feedback.iter().enumerate() {
                let id =
                    create_feedback(&mut conn, &feedback.name, &feedback.email, &feedback.message)
                        .await?;

                sqlx::query(
                    "UPDATE feedback_messages
                     SET created_at = ?, is_read = ?, is_archived = ?
                     WHERE id = ?",
                )
                .bind(format!("2025-03-01 10:{:02}:00", idx))
                .bind(feedback.is_read)
                .bind(feedback.is_archived)
                .bind(id)
                .execute(&mut *conn)
                .await?;

                feedback_ids.insert(feedback.name.clone(), id);
            }

            for document in &self.documents {
                sqlx::query(
                    "INSERT INTO documents (doc_type, file_data, mime_type, uploaded_at) VALUES (?, ?, ?, ?)",
                )
                .bind(&document.doc_type)
                .bind(&document.data)
                .bind(&document.mime_type)
                .bind(&document.uploaded_at)
                .execute(&mut *conn)
                .await?;
            }

            drop(conn);

            Ok(TestDb {
                pool,
                photo_ids,
                feedback_ids,
            })
        }
    }

    pub struct TestDb {
        pub pool: Pool<Sqlite>,
        pub photo_ids: HashMap<String, i64>,
        pub feedback_ids: HashMap<String, i64>,
    }

    impl TestDb {
        pub fn photo_id(&self, title: &str) -> Option<i64> {
            self.photo_ids.get(title).copied()
        }

        pub fn feedback_id(&self, name: &str) -> Option<i64> {
            self.feedback_ids.get(name).copied()
        }

        pub async fn child_rows(&self, table: &str, sport_id: &str) -> Vec<(i64, String, i64)> {
            let text_column = if table == "sport_rules" {
                "rule_text"
            } else {
                "safety_text"
            };
            let sql = format!(
                "SELECT id, {} AS text, display_order FROM {} WHERE sport_id = ? ORDER BY display_order, id",
                text_column, table
            );

            sqlx::query_as::<_, (i64, String, i64)>(&sql)
                .bind(sport_id)
                .fetch_all(&self.pool)
                .await
                .expect("Failed to read child rows")
        }

        pub async fn feedback_count(&self) -> i64 {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM feedback_messages")
                .fetch_one(&self.pool)
                .await
                .expect("Failed to count feedback")
        }
    }

    /// Standard fixture: one contact, two sports with rules, two photos and a
    /// mix of read/unread/archived feedback.
    pub async fn create_standard_test_db() -> TestDb {
        TestDbBuilder::new()
            .contact("1 Stadium Road", "+7 391 000 00 00", "hall@example.org", "9-21")
            .sport(
                "volleyball",
                "Volleyball",
                &["Indoor shoes only", "Warm up first", "Respect the net"],
                &["No jewellery"],
            )
            .sport("basketball", "Basketball", &["Two teams of five"], &[])
            .photo("https://cdn.example.org/court.jpg", "Main court")
            .photo("https://cdn.example.org/gym.jpg", "Gym")
            .feedback("Anna", "anna@example.org", "Booking question", false, false)
            .feedback("Boris", "+7 900 111 22 33", "Thanks!", true, false)
            .feedback("Clara", "clara@example.org", "Old message", true, true)
            .build()
            .await
            .expect("Failed to build test database")
    }

    pub async fn setup_test_client(test_db: TestDb) -> (Client, TestDb) {
        setup_test_client_with(test_db, Settings::default()).await
    }

    pub async fn setup_test_client_with(test_db: TestDb, settings: Settings) -> (Client, TestDb) {
        let rocket = init_rocket(test_db.pool.clone(), settings);
        let client = Client::tracked(rocket)
            .await
            .expect("valid rocket instance");

        (client, test_db)
    }

    /// One-shot HTTP responder standing in for the image CDN. Answers the
    /// first request with a fixed status and body, then hands back the
    /// request head (lowercased) for header assertions.
    pub struct CdnStub {
        pub upload_url: String,
        request: JoinHandle<String>,
    }

    impl CdnStub {
        pub async fn spawn(status: &'static str, content_type: &'static str, body: &'static str) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind CDN stub");
            let addr = listener.local_addr().expect("CDN stub has no address");

            let request = tokio::spawn(async move {
                let (mut socket, _) = listener.accept().await.expect("CDN stub accept failed");

                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                let head_end = loop {
                    let n = socket.read(&mut chunk).await.expect("CDN stub read failed");
                    if n == 0 {
                        break buf.len();
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                        break pos + 4;
                    }
                };
                let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();

                let content_length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok());
                let chunked = head.contains("transfer-encoding: chunked");

                loop {
                    let done = match content_length {
                        Some(len) => buf.len() >= head_end + len,
                        None => !chunked || buf.ends_with(b"0\r\n\r\n"),
                    };
                    if done {
                        break;
                    }
                    let n = socket.read(&mut chunk).await.expect("CDN stub read failed");
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    content_type,
                    body.len(),
                    body
                );
                socket
                    .write_all(response.as_bytes())
                    .await
                    .expect("CDN stub write failed");
                let _ = socket.shutdown().await;

                head
            });

            Self {
                upload_url: format!("http://{}/upload", addr),
                request,
            }
        }

        pub fn settings(&self) -> CdnSettings {
            CdnSettings {
                api_key: "test-key".to_string(),
                project_id: "test-project".to_string(),
                upload_url: self.upload_url.clone(),
            }
        }

        pub async fn request_head(self) -> String {
            self.request.await.expect("CDN stub task panicked")
        }
    }
}
