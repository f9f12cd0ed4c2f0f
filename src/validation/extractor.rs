use crate::error::{Result, TrackerError};
use axum::{Json, extract::Request};
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

/// JSON body that has been deserialized and validated
///
/// Malformed JSON and failed validation both reject with
/// [`TrackerError::BadRequest`], so clients always get the JSON error body.
pub struct ValidatedJson<T>(pub T);

impl<T, S> axum::extract::FromRequest<S> for ValidatedJson<T>
where
    T: for<'de> Deserialize<'de> + Validate + Send,
    S: Send + Sync,
{
    type Rejection = TrackerError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let json: Json<T> = Json::from_request(req, state)
            .await
            .map_err(|e| TrackerError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;

        validate_json(json)
    }
}

/// Validate an already extracted `Json<T>`
pub fn validate_json<T: Validate>(json: Json<T>) -> Result<ValidatedJson<T>> {
    json.0
        .validate()
        .map_err(|errors| TrackerError::bad_request(validation_message(&errors)))?;

    Ok(ValidatedJson(json.0))
}

/// Flatten field errors into one client-facing message.
///
/// Fields are sorted so the message is stable across runs.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let msg = error
                    .message
                    .as_ref()
                    .map(|m| m.as_ref())
                    .unwrap_or_else(|| error.code.as_ref());
                format!("{}: {}", field, msg)
            })
        })
        .collect();
    messages.sort();

    format!("Validation failed: {}", messages.join(", "))
}
