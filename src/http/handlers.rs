use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::app::films::FilmService;
use crate::domain::film::{Film, FilmListing, ImageUpload};
use crate::http::{AppError, CallerId};
use crate::AppState;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
pub struct FilmResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub data: Film,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Default)]
struct FilmForm {
    name: Option<String>,
    image: Option<ImageUpload>,
}

impl FilmForm {
    fn required_name(&self) -> Result<&str, AppError> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::bad_request("name is required"))
    }
}

/// Bodies over the configured limit fail while streaming and surface here as 413.
fn field_error(err: MultipartError, message: &str) -> AppError {
    tracing::debug!(error = %err, "failed to read multipart body");
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large("request body too large")
    } else {
        AppError::bad_request(message)
    }
}

async fn read_film_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<FilmForm, AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected multipart body");
        AppError::bad_request("expected a multipart/form-data body")
    })?;

    let mut form = FilmForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| field_error(err, "invalid multipart body"))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => {
                let text = field
                    .text()
                    .await
                    .map_err(|err| field_error(err, "invalid name field"))?;
                form.name = Some(text);
            }
            "image" => {
                // A file input left empty still sends the part, with no filename.
                let Some(file_name) = field
                    .file_name()
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                else {
                    continue;
                };
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|err| field_error(err, "invalid image field"))?;

                form.image = Some(ImageUpload {
                    file_name,
                    content_type,
                    data,
                });
            }
            other => tracing::debug!(field = %other, "ignoring unknown multipart field"),
        }
    }

    Ok(form)
}

fn parse_film_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::not_found("film not found"))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.db.ping().await.is_ok() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse { status })
}

pub async fn list_films(
    caller: CallerId,
    State(state): State<AppState>,
) -> Result<Json<Vec<FilmListing>>, AppError> {
    let service = FilmService::new(state.db.clone(), state.storage.clone());
    let films = service.list(caller.as_str()).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %caller.as_str(), "failed to list films");
        AppError::internal()
    })?;

    Ok(Json(films))
}

pub async fn create_film(
    caller: Option<CallerId>,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<FilmResponse>), AppError> {
    let caller = caller.ok_or_else(|| AppError::bad_request("authorization required"))?;
    let form = read_film_form(multipart).await?;
    let name = form.required_name()?.to_string();
    let image = form
        .image
        .ok_or_else(|| AppError::bad_request("image is required"))?;

    let service = FilmService::new(state.db.clone(), state.storage.clone());
    let film = service
        .create(caller.as_str(), &name, image)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %caller.as_str(), "failed to create film");
            AppError::internal()
        })?;

    Ok((
        StatusCode::CREATED,
        Json(FilmResponse {
            status: "success",
            message: "Film created successfully",
            data: film,
        }),
    ))
}

pub async fn update_film(
    caller: CallerId,
    Path(id): Path<String>,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<FilmResponse>, AppError> {
    let form = read_film_form(multipart).await?;
    let name = form.required_name()?.to_string();
    let film_id = parse_film_id(&id)?;

    let service = FilmService::new(state.db.clone(), state.storage.clone());
    let film = service
        .update(film_id, caller.as_str(), &name, form.image)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, film_id = %film_id, user_id = %caller.as_str(), "failed to update film");
            AppError::internal()
        })?;

    match film {
        Some(film) => Ok(Json(FilmResponse {
            status: "success",
            message: "Film updated successfully",
            data: film,
        })),
        None => Err(AppError::not_found("film not found")),
    }
}

pub async fn delete_film(
    caller: CallerId,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    let film_id = parse_film_id(&id)?;

    let service = FilmService::new(state.db.clone(), state.storage.clone());
    let deleted = service
        .delete(film_id, caller.as_str())
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, film_id = %film_id, user_id = %caller.as_str(), "failed to delete film");
            AppError::internal()
        })?;

    if deleted {
        Ok(Json(MessageResponse {
            status: "success",
            message: "Film deleted successfully",
        }))
    } else {
        Err(AppError::not_found("film not found"))
    }
}
