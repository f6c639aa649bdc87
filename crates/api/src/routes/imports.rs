//! Route definitions for spreadsheet imports, mounted at `/imports`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::imports;
use crate::state::AppState;

/// ```text
/// GET    /entities/{entity}/fields    -> list_fields
/// POST   /entities/{entity}/preview   -> preview_upload
/// POST   /entities/{entity}           -> import_upload
/// GET    /sessions/{id}               -> get_session
/// POST   /sessions/{id}/preview       -> repreview_session
/// POST   /sessions/{id}/commit        -> commit_session
/// POST   /sessions/{id}/cancel        -> cancel_session
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/entities/{entity}/fields", get(imports::list_fields))
        .route("/entities/{entity}/preview", post(imports::preview_upload))
        .route("/entities/{entity}", post(imports::import_upload))
        .route("/sessions/{id}", get(imports::get_session))
        .route("/sessions/{id}/preview", post(imports::repreview_session))
        .route("/sessions/{id}/commit", post(imports::commit_session))
        .route("/sessions/{id}/cancel", post(imports::cancel_session))
}
