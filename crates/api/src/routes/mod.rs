pub mod health;
pub mod imports;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /imports/entities/{entity}/fields                field contract (GET)
/// /imports/entities/{entity}/preview               upload and preview (POST, multipart)
/// /imports/entities/{entity}                       one-shot import (POST, multipart)
/// /imports/sessions/{id}                           session state (GET)
/// /imports/sessions/{id}/preview                   replace the file (POST, multipart)
/// /imports/sessions/{id}/commit                    commit valid rows (POST)
/// /imports/sessions/{id}/cancel                    cancel (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/imports", imports::router())
}
