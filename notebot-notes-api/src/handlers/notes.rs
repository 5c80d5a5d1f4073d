use super::current_user;
use crate::error::{AppError, AppResult};
use crate::AppState;
use actix_multipart::{Multipart, MultipartError};
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;
use notebot_auth::AuthenticatedUser;
use serde::Deserialize;
use shared_types::{NoteCreate, NoteResponse};

pub const MAX_PAGE_SIZE: i64 = 10;

/// Multipart field carrying the uploaded document
pub const UPLOAD_FIELD: &str = "file";
pub const NOT_MARKDOWN: &str = "Only markdown files are allowed. Please upload a valid .md file.";
pub const CORRUPT_UPLOAD: &str = "Empty or corrupt file.";

#[derive(Debug, Deserialize)]
pub struct NotesQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default)]
    pub search: String,
}

fn default_limit() -> i64 {
    MAX_PAGE_SIZE
}

fn default_page() -> i64 {
    1
}

impl NotesQuery {
    fn validated(&self) -> AppResult<(u32, u32)> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.limit) {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        let page = u32::try_from(self.page)
            .ok()
            .filter(|page| *page >= 1)
            .ok_or_else(|| AppError::Validation("page must be at least 1".to_string()))?;
        Ok((self.limit as u32, page))
    }
}

fn note_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Note with id: {id} was not found"))
}

/// `GET /notes/{id}`
pub async fn get_note(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let user = current_user(&state, &auth)?;
    let id = id.into_inner();
    let note = state
        .db
        .get_note(id, user.id)?
        .ok_or_else(|| note_not_found(id))?;
    Ok(HttpResponse::Ok().json(note))
}

/// `GET /notes/markdown/{id}`: the note body rendered as HTML
pub async fn get_markdown_note(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let user = current_user(&state, &auth)?;
    let id = id.into_inner();
    let note = state
        .db
        .get_note(id, user.id)?
        .ok_or_else(|| note_not_found(id))?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(markdown::to_html(&note.note)))
}

/// `GET /notes?limit&page&search`
pub async fn list_notes(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    query: web::Query<NotesQuery>,
) -> AppResult<HttpResponse> {
    let user = current_user(&state, &auth)?;
    let (limit, page) = query.validated()?;
    let result = state.db.list_notes(user.id, limit, page, &query.search)?;
    tracing::debug!(
        user_id = user.id,
        limit,
        page,
        total = result.total,
        "Listed notes"
    );
    Ok(HttpResponse::Ok().json(NoteResponse {
        data: result.notes,
        limit,
        page,
        total: result.total,
    }))
}

/// `POST /notes`
pub async fn create_note(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    body: web::Json<NoteCreate>,
) -> AppResult<HttpResponse> {
    let user = current_user(&state, &auth)?;
    let title = body.title.as_deref().unwrap_or_default();
    let note = state.db.create_note(user.id, title, &body.note)?;
    tracing::info!(user_id = user.id, note_id = note.id, "Note created");
    Ok(HttpResponse::Created().json(note))
}

/// `POST /notes/markdown`: store an uploaded `.md` file as a note titled after the file
pub async fn upload_markdown_note(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let user = current_user(&state, &auth)?;
    let corrupt = |_: MultipartError| AppError::BadRequest(CORRUPT_UPLOAD.to_string());

    while let Some(mut field) = payload.try_next().await.map_err(corrupt)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned);
        if filename.as_deref().is_some_and(|name| !name.ends_with(".md")) {
            return Err(AppError::BadRequest(NOT_MARKDOWN.to_string()));
        }

        let mut content = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(corrupt)? {
            content.extend_from_slice(&chunk);
        }
        let text = String::from_utf8(content)
            .map_err(|_| AppError::BadRequest(CORRUPT_UPLOAD.to_string()))?;

        let title = filename.unwrap_or_default();
        let note = state.db.create_note(user.id, &title, &text)?;
        tracing::info!(user_id = user.id, note_id = note.id, title = %title, "Markdown note uploaded");
        return Ok(HttpResponse::Ok().json(note));
    }

    Err(AppError::Validation(format!(
        "multipart field '{UPLOAD_FIELD}' is required"
    )))
}

/// `PUT /notes/{id}`
pub async fn update_note(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    id: web::Path<i64>,
    body: web::Json<NoteCreate>,
) -> AppResult<HttpResponse> {
    let user = current_user(&state, &auth)?;
    let title = body.title.as_deref().unwrap_or_default();
    let note = state
        .db
        .update_note(id.into_inner(), user.id, title, &body.note)?
        .ok_or_else(|| AppError::NotFound("Note not found".to_string()))?;
    Ok(HttpResponse::Ok().json(note))
}

/// `DELETE /notes/{id}`
pub async fn delete_note(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let user = current_user(&state, &auth)?;
    let id = id.into_inner();
    if !state.db.delete_note(id, user.id)? {
        return Err(AppError::NotFound("Note not found".to_string()));
    }
    tracing::info!(user_id = user.id, note_id = id, "Note deleted");
    Ok(HttpResponse::NoContent().finish())
}
