use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
};
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::blog_categories::NameRequest;
use super::{now, success};
use crate::{auth::middleware::AdminUser, entities::tag, error::AppError, state::AppState};

/// Blog tag router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/tag", post(create_tag))
        .route("/tags", get(list_tags))
        .route("/tag/{slug}", get(get_tag))
        .route("/admin/tag/{slug}", delete(delete_tag))
}

/// `POST /api/admin/tag`
async fn create_tag(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<NameRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (name, slug) = req.parse("Tag")?;

    let taken = tag::Entity::find()
        .filter(tag::Column::Slug.eq(&slug))
        .one(&state.db)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(format!("Tag '{slug}' already exists.")));
    }

    let ts = now();
    let created = tag::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        name: ActiveValue::Set(name),
        slug: ActiveValue::Set(slug),
        created_at: ActiveValue::Set(ts),
        updated_at: ActiveValue::Set(ts),
    }
    .insert(&state.db)
    .await
    .map_err(|e| AppError::from_db(e, "Tag"))?;

    Ok(Json(created))
}

/// `GET /api/tags`
async fn list_tags(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let tags = tag::Entity::find()
        .order_by_asc(tag::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(tags))
}

/// `GET /api/tag/{slug}`
async fn get_tag(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let found = tag::Entity::find()
        .filter(tag::Column::Slug.eq(slug.to_lowercase()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tag not found".to_string()))?;
    Ok(Json(found))
}

/// `DELETE /api/admin/tag/{slug}`
async fn delete_tag(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = tag::Entity::delete_many()
        .filter(tag::Column::Slug.eq(slug.to_lowercase()))
        .exec(&state.db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Tag not found".to_string()));
    }
    Ok(success())
}
