use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};

use crate::inference::InferenceError;
use crate::pages::render_upload_form;
use crate::storage::disk_service::StorageError;

/// Everything that can go wrong between submitting the form and being
/// redirected. The display text is the notice shown above the form.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No image file selected.")]
    NoFileSelected,
    #[error("Invalid file type.")]
    InvalidFileType,
    #[error("Uploaded file is too large.")]
    PayloadTooLarge,
    #[error("Could not save the uploaded file.")]
    StorageFailure(#[source] StorageError),
    #[error("Prediction failed or returned no result.")]
    InferenceUnavailable(#[source] InferenceError),
    #[error("Prediction failed or returned no result.")]
    InferenceCallFailure(#[source] InferenceError),
    #[error("Prediction failed or returned no result.")]
    InterpretationFailure,
}

impl From<StorageError> for UploadError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidFileType(_) | StorageError::InvalidName(_) => {
                UploadError::InvalidFileType
            }
            other => UploadError::StorageFailure(other),
        }
    }
}

impl From<InferenceError> for UploadError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Unavailable(_) => UploadError::InferenceUnavailable(err),
            InferenceError::NoLabel => UploadError::InterpretationFailure,
            other => UploadError::InferenceCallFailure(other),
        }
    }
}

impl ResponseError for UploadError {
    fn status_code(&self) -> StatusCode {
        match self {
            UploadError::NoFileSelected => StatusCode::BAD_REQUEST,
            UploadError::InvalidFileType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            UploadError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            UploadError::InferenceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            UploadError::InferenceCallFailure(_) => StatusCode::BAD_GATEWAY,
            UploadError::InterpretationFailure => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type(ContentType::html())
            .body(render_upload_form(Some(&self.to_string())))
    }
}
