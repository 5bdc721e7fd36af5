use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, instrument};

use crate::env::SmtpSettings;
use crate::error::AppError;

/// A visitor submission rendered as a plain-text notification mail.
#[derive(Debug)]
pub struct FeedbackMail<'a> {
    pub name: &'a str,
    pub contact: &'a str,
    pub message: &'a str,
    pub sport: Option<&'a str>,
}

impl FeedbackMail<'_> {
    pub fn subject(&self) -> String {
        format!("New website request from {}", self.name)
    }

    pub fn body(&self) -> String {
        let mut body = format!(
            "A new request was submitted on the website:\n\nName: {}\nContact: {}\n",
            self.name, self.contact
        );

        if let Some(sport) = self.sport.filter(|s| !s.is_empty()) {
            body.push_str(&format!("Sport: {}\n", sport));
        }

        let message = if self.message.is_empty() {
            "Not provided"
        } else {
            self.message
        };
        body.push_str(&format!("\nMessage:\n{}\n", message));

        body
    }

    pub fn to_message(&self, settings: &SmtpSettings) -> Result<Message, AppError> {
        let from: Mailbox = settings.user.parse()?;
        let to: Mailbox = settings.recipient.parse()?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(self.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(self.body())?;

        Ok(message)
    }
}

/// Port 465 gets implicit TLS, anything else negotiates STARTTLS.
#[instrument(skip_all, fields(host = %settings.host, port = settings.port))]
pub async fn send_feedback_mail(
    settings: &SmtpSettings,
    mail: &FeedbackMail<'_>,
) -> Result<(), AppError> {
    let message = mail.to_message(settings)?;

    let builder = if settings.implicit_tls() {
        AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
    };

    let transport = builder
        .port(settings.port)
        .credentials(Credentials::new(
            settings.user.clone(),
            settings.password.clone(),
        ))
        .build();

    transport.send(message).await?;
    info!("Feedback mail delivered");

    Ok(())
}
