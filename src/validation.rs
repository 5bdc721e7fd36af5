use rocket::serde::json::{self, Json};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;

pub trait ValidateRequest: Validate + Sized {
    /// Runs the derived checks and turns the first failure into a 400.
    fn validated(self) -> Result<Self, AppError> {
        self.validate().map_err(first_error)?;
        Ok(self)
    }
}

impl<T: Validate> ValidateRequest for T {}

fn first_error(errors: ValidationErrors) -> AppError {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    let message = fields
        .into_iter()
        .flat_map(|(field, errors)| errors.iter().map(move |error| (field, error)))
        .next()
        .map(|(field, error)| match &error.message {
            Some(message) => message.to_string(),
            None => format!("Invalid value for {}", field),
        })
        .unwrap_or_else(|| "Invalid request".to_string());

    AppError::Validation(message)
}

/// Rocket hands us the parse failure instead of routing to a catcher, so
/// malformed bodies come back as a 400 with the parser's message.
pub fn json_body<T>(body: Result<Json<T>, json::Error<'_>>) -> Result<T, AppError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(err) => Err(AppError::Validation(format!("Invalid request body: {}", err))),
    }
}

/// Decodes the `data` member of a `{type, data}` envelope.
pub fn envelope_data<T: DeserializeOwned>(data: serde_json::Value) -> Result<T, AppError> {
    serde_json::from_value(data).map_err(|err| AppError::Validation(format!("Invalid data: {}", err)))
}
