use actix_multipart::Multipart;
use actix_web::http::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use actix_web::{HttpRequest, HttpResponse, web};
use futures::{StreamExt, TryStreamExt};
use log::{error, info, warn};

use crate::config::MAX_CONTENT_LENGTH;
use crate::error::UploadError;
use crate::inference::Classify;
use crate::pages::{PageError, RecipePages, html_ok, render_upload_form};
use crate::storage::disk_service::{DiskStorage, StorageError};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .route(web::get().to(upload_form))
            .route(web::post().to(handle_upload)),
    )
    .service(web::resource("/uploads/{filename}").route(web::get().to(uploaded_file)))
    .service(web::resource("/biskut/{biscuit}").route(web::get().to(show_recipe)));
}

struct UploadedImage {
    file_name: String,
    data: Vec<u8>,
}

fn declared_length(req: &HttpRequest) -> Option<u64> {
    req.headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
}

fn has_body(req: &HttpRequest) -> bool {
    req.headers().contains_key(CONTENT_TYPE) || declared_length(req).is_some_and(|len| len > 0)
}

pub fn recipe_location(biscuit: &str) -> String {
    format!("/biskut/{}", urlencoding::encode(biscuit))
}

/// Drains the multipart body and keeps the first `file` field that carries a
/// filename. Other fields are read and discarded.
async fn read_upload(mut payload: Multipart) -> Result<UploadedImage, UploadError> {
    let mut upload: Option<UploadedImage> = None;
    let mut received = 0usize;

    while let Some(mut field) = payload.try_next().await.map_err(|e| {
        warn!("Malformed multipart body: {}", e);
        UploadError::NoFileSelected
    })? {
        let disposition = field.content_disposition();
        let file_name = disposition
            .filter(|cd| upload.is_none() && cd.get_name() == Some("file"))
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned);

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| {
                warn!("Failed to read multipart field: {}", e);
                UploadError::NoFileSelected
            })?;
            received += chunk.len();
            if received > MAX_CONTENT_LENGTH {
                return Err(UploadError::PayloadTooLarge);
            }
            if file_name.is_some() {
                data.extend_from_slice(&chunk);
            }
        }

        if let Some(file_name) = file_name {
            upload = Some(UploadedImage { file_name, data });
        }
    }

    match upload {
        Some(upload) if !upload.file_name.is_empty() && !upload.data.is_empty() => Ok(upload),
        _ => Err(UploadError::NoFileSelected),
    }
}

async fn upload_form() -> HttpResponse {
    html_ok(render_upload_form(None))
}

async fn handle_upload(
    req: HttpRequest,
    payload: Multipart,
    storage: web::Data<DiskStorage>,
    classifier: web::Data<dyn Classify>,
) -> Result<HttpResponse, UploadError> {
    if declared_length(&req).is_some_and(|len| len > MAX_CONTENT_LENGTH as u64) {
        warn!("Rejected upload: declared body exceeds {} bytes", MAX_CONTENT_LENGTH);
        return Err(UploadError::PayloadTooLarge);
    }
    if !has_body(&req) {
        return Ok(upload_form().await);
    }

    let upload = read_upload(payload).await.inspect_err(|e| {
        warn!("Rejected upload: {}", e);
    })?;

    if !DiskStorage::is_allowed(&upload.file_name) {
        warn!("Rejected upload {:?}: invalid file type", upload.file_name);
        return Err(UploadError::InvalidFileType);
    }

    let path = storage
        .store(&upload.file_name, &upload.data)
        .await
        .map_err(|e| {
            error!("Failed to store upload {:?}: {}", upload.file_name, e);
            UploadError::from(e)
        })?;

    let biscuit = classifier.classify(&path).await.map_err(|e| {
        error!("Workflow error for {}: {}", path.display(), e);
        UploadError::from(e)
    })?;

    info!("Predicted {:?} for {}", biscuit, path.display());
    Ok(HttpResponse::Found()
        .append_header((LOCATION, recipe_location(&biscuit)))
        .finish())
}

async fn uploaded_file(
    req: HttpRequest,
    path: web::Path<String>,
    storage: web::Data<DiskStorage>,
) -> HttpResponse {
    let filename = path.into_inner();
    match storage.retrieve(&filename).await {
        Ok(file) => file.into_response(&req),
        Err(StorageError::NotFound(_)) => HttpResponse::NotFound().body("File not found"),
        Err(e) => {
            error!("Error serving upload {:?}: {}", filename, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn show_recipe(
    path: web::Path<String>,
    pages: web::Data<RecipePages>,
) -> Result<HttpResponse, PageError> {
    let biscuit = path.into_inner();
    let page = pages.render(&biscuit).await?;
    Ok(html_ok(page))
}
