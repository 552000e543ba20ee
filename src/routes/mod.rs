mod auth;
mod blog_categories;
mod blogs;
mod categories;
mod forms;
mod health;
mod items;
mod search;
mod subs;
mod tags;
mod uploads;
mod users;
mod zones;

use axum::Json;
use axum::Router;
use serde::Serialize;

use crate::state::AppState;

/// Build the complete application router.
///
/// Structure:
/// - `GET /health` — liveness probe
/// - `/api/...` — marketplace resources, one module per resource
pub fn router() -> Router<AppState> {
    let api = Router::new()
        .merge(health::api_router())
        .merge(auth::router())
        .merge(users::router())
        .merge(items::router())
        .merge(search::router())
        .merge(categories::router())
        .merge(subs::router())
        .merge(zones::router())
        .merge(blog_categories::router())
        .merge(tags::router())
        .merge(blogs::router())
        .merge(forms::router())
        .merge(uploads::router());

    Router::new()
        .merge(health::root_router())
        .nest("/api", api)
}

/// `{ "success": <bool> }` acknowledgement body.
#[derive(Debug, Serialize)]
struct Success {
    success: bool,
}

const fn success() -> Json<Success> {
    Json(Success { success: true })
}

/// Current time as stored in `created_at` / `updated_at`.
fn now() -> sea_orm::prelude::DateTimeWithTimeZone {
    chrono::Utc::now().fixed_offset()
}
