//! Handlers for spreadsheet imports into companies, employees, leads and
//! projects.
//!
//! Provides endpoints for the field contract, multipart preview (which opens
//! an import session), re-selecting a file, committing the cached valid rows,
//! cancelling, and a one-shot import that previews and commits in a single
//! request.

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use crm_core::error::FormatError;
use crm_core::import::{
    commit, validate_file, EntityKind, FieldSpec, ImportContext, ImportPhase, ImportResult,
    ImportSession, ImportSummary, UploadedFile, ValidatedRecord,
};
use crm_db::EntityWriter;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::response::{CommitResponse, DataResponse, PreviewResponse};
use crate::state::AppState;

/// Multipart field that carries the spreadsheet.
const FILE_FIELD: &str = "file";

/// Optional header naming the user performing the import.
const IMPORTED_BY_HEADER: &str = "x-imported-by";

// ── Field contract ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct EntityFields {
    pub entity: EntityKind,
    pub fields: &'static [FieldSpec],
}

/// GET /api/v1/imports/entities/{entity}/fields
///
/// The columns an upload for this entity may carry, so a client can render a
/// template or a column legend.
pub async fn list_fields(Path(entity): Path<String>) -> AppResult<Json<DataResponse<EntityFields>>> {
    let entity = parse_entity(&entity)?;
    Ok(Json(DataResponse {
        data: EntityFields {
            entity,
            fields: entity.field_specs(),
        },
    }))
}

// ── Preview ──────────────────────────────────────────────────────────

/// POST /api/v1/imports/entities/{entity}/preview
///
/// Decode and validate the uploaded `file`, open an import session holding
/// the validated rows, and return counts plus the first rows.
pub async fn preview_upload(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<PreviewResponse>> {
    let entity = parse_entity(&entity)?;
    let file = read_upload(multipart).await?;

    let mut session = ImportSession::new(entity);
    session.select_file(file)?;
    let file = session.begin_preview()?;
    let outcome = validate_in_background(file, entity).await?;
    let summary = session.finish_preview(outcome)?.clone();

    let session_id = state.sessions.create(session).await;
    tracing::info!(
        %session_id,
        entity = %entity,
        total = summary.total_rows,
        valid = summary.valid_rows,
        errors = summary.error_rows,
        "Import preview ready",
    );

    Ok(Json(PreviewResponse::new(session_id, &summary)))
}

/// POST /api/v1/imports/sessions/{id}/preview
///
/// Replace the file of an existing session. Allowed until a commit starts.
pub async fn repreview_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<PreviewResponse>> {
    let file = read_upload(multipart).await?;

    let (entity, file) = state
        .sessions
        .update(session_id, |session| {
            session.select_file(file)?;
            session.begin_preview().map(|file| (session.entity(), file))
        })
        .await
        .ok_or(AppError::SessionNotFound(session_id))??;

    let outcome = validate_in_background(file, entity).await?;
    let summary = state
        .sessions
        .update(session_id, |session| session.finish_preview(outcome).cloned())
        .await
        .ok_or(AppError::SessionNotFound(session_id))??;

    tracing::info!(
        %session_id,
        entity = %entity,
        total = summary.total_rows,
        valid = summary.valid_rows,
        errors = summary.error_rows,
        "Import preview replaced",
    );

    Ok(Json(PreviewResponse::new(session_id, &summary)))
}

// ── Session ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    pub entity: EntityKind,
    pub phase: ImportPhase,
    pub summary: Option<ImportSummary>,
    pub result: Option<ImportResult>,
}

/// GET /api/v1/imports/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<DataResponse<SessionView>>> {
    let view = state
        .sessions
        .view(session_id, |session| SessionView {
            session_id,
            entity: session.entity(),
            phase: session.phase(),
            summary: session.summary().cloned(),
            result: session.result().cloned(),
        })
        .await
        .ok_or(AppError::SessionNotFound(session_id))?;

    Ok(Json(DataResponse { data: view }))
}

// ── Commit ───────────────────────────────────────────────────────────

/// POST /api/v1/imports/sessions/{id}/commit
///
/// Write every valid cached row, one insert each. A second commit of the same
/// session, while running or after it finished, is rejected with 409.
///
/// The writes run in a spawned task that always closes the session, so a
/// request dropped by the timeout layer or a disconnecting client leaves the
/// commit running and its result readable from `GET /sessions/{id}`.
pub async fn commit_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    headers: HeaderMap,
) -> AppResult<Json<CommitResponse>> {
    let (entity, records) = state
        .sessions
        .update(session_id, |session| {
            session
                .begin_commit()
                .map(|records| (session.entity(), records))
        })
        .await
        .ok_or(AppError::SessionNotFound(session_id))??;

    tracing::info!(%session_id, entity = %entity, rows = records.len(), "Import commit started");
    let ctx = import_context(&headers);
    let task_state = state.clone();
    let task = tokio::spawn(async move {
        let result = write_records(&task_state, entity, &records, &ctx).await;
        match task_state
            .sessions
            .update(session_id, |session| session.finish_commit(result.clone()))
            .await
        {
            Some(Ok(())) => {}
            Some(Err(err)) => {
                tracing::warn!(%session_id, error = %err, "Could not close import session")
            }
            None => tracing::warn!(%session_id, "Import session vanished during commit"),
        }
        result
    });

    let result = task
        .await
        .map_err(|e| AppError::InternalError(format!("Import commit task failed: {e}")))?;
    Ok(Json(CommitResponse::from(&result)))
}

/// POST /api/v1/imports/entities/{entity}
///
/// Decode, validate and commit in one request. Rows with field errors are
/// skipped and counted neither as imported nor as failed.
pub async fn import_upload(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> AppResult<Json<CommitResponse>> {
    let entity = parse_entity(&entity)?;
    let file = read_upload(multipart).await?;
    let records = validate_in_background(file, entity).await??;

    let result = write_records(&state, entity, &records, &import_context(&headers)).await;
    Ok(Json(CommitResponse::from(&result)))
}

// ── Cancel ───────────────────────────────────────────────────────────

/// POST /api/v1/imports/sessions/{id}/cancel
///
/// Discard the selected file and preview. Refused once a commit has started.
pub async fn cancel_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .sessions
        .update(session_id, |session| session.cancel())
        .await
        .ok_or(AppError::SessionNotFound(session_id))??;

    tracing::info!(%session_id, "Import session cancelled");
    Ok(StatusCode::NO_CONTENT)
}

// ── Private helpers ──────────────────────────────────────────────────

fn parse_entity(raw: &str) -> AppResult<EntityKind> {
    Ok(raw.parse::<EntityKind>()?)
}

fn import_context(headers: &HeaderMap) -> ImportContext {
    let imported_by = headers
        .get(IMPORTED_BY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    ImportContext { imported_by }
}

/// Pull the `file` field out of a multipart body.
async fn read_upload(mut multipart: Multipart) -> AppResult<UploadedFile> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(UploadedFile::new(file_name, bytes.to_vec()));
    }
    Err(AppError::BadRequest(format!(
        "Multipart body must include a '{FILE_FIELD}' field"
    )))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// Decode and validate off the async runtime; workbook parsing is CPU-bound.
async fn validate_in_background(
    file: UploadedFile,
    entity: EntityKind,
) -> AppResult<Result<Vec<ValidatedRecord>, FormatError>> {
    tokio::task::spawn_blocking(move || validate_file(&file, entity.field_specs()))
        .await
        .map_err(|e| AppError::InternalError(format!("Import decode task failed: {e}")))
}

async fn write_records(
    state: &AppState,
    entity: EntityKind,
    records: &[ValidatedRecord],
    ctx: &ImportContext,
) -> ImportResult {
    let writer = EntityWriter::new(state.pool.clone(), entity);
    let result = commit(records, &writer, ctx).await;
    tracing::info!(
        entity = %entity,
        imported = result.imported_count,
        failed = result.failed_count,
        interrupted = result.interrupted,
        imported_by = ctx.imported_by.as_deref().unwrap_or("-"),
        "Import written",
    );
    result
}
