//! Request body validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::web::error::ApiError;

/// A JSON extractor that validates the request body.
///
/// Malformed JSON is a 400; a body that parses but fails validation is a
/// 422 with per-field messages.
///
/// ```ignore
/// async fn add_channel(
///     ValidatedJson(req): ValidatedJson<ChannelUrlRequest>,
/// ) -> Result<Json<ApiResponse<ChannelResponse>>, ApiError> {
///     // req.url is already validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

/// Channel URL input: not blank, single line once surrounding whitespace is trimmed.
pub fn channel_url_input(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::new("required").with_message("URL is required".into()));
    }
    if value.chars().any(char::is_control) {
        return Err(ValidationError::new("control_chars")
            .with_message("URL must not contain control characters".into()));
    }
    Ok(())
}

/// Video ids use the URL-safe base64 alphabet.
pub fn video_id_chars(value: &str) -> Result<(), ValidationError> {
    if value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(ValidationError::new("video_id")
            .with_message("Video id may only contain letters, digits, '-' and '_'".into()))
    }
}
