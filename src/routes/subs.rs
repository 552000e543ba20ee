use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder,
};
use serde::Deserialize;
use uuid::Uuid;

use super::now;
use crate::{
    auth::middleware::AdminUser,
    entities::{category, sub},
    error::AppError,
    state::AppState,
    utils::{Validator, slugify},
};

/// Sub-category router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/sub/create", post(create_sub))
        .route("/subs", get(list_subs))
        .route("/admin/sub/delete/{slug}", delete(delete_sub))
        .route("/admin/sub/update/{slug}", put(update_sub))
}

#[derive(Debug, Deserialize)]
struct SubRequest {
    #[serde(default)]
    name: String,
    parent: Option<Uuid>,
}

impl SubRequest {
    /// Validate fields and confirm the parent category exists.
    async fn parse(self, db: &DatabaseConnection) -> Result<(String, String, Uuid), AppError> {
        let name = self.name.trim().to_string();
        let slug = slugify(&name);

        let mut v = Validator::default();
        v.length("name", &name, 2, 32, "Sub name must be 2 to 32 characters")
            .check("name", name.is_empty() || !slug.is_empty(), "Sub name must contain letters or digits")
            .check("parent", self.parent.is_some(), "You must supply a parent category");
        v.finish()?;

        let parent = self
            .parent
            .ok_or_else(|| AppError::BadRequest("Missing parent".to_string()))?;
        if category::Entity::find_by_id(parent).one(db).await?.is_none() {
            return Err(AppError::NotFound("Parent category not found".to_string()));
        }

        Ok((name, slug, parent))
    }
}

async fn find_sub(db: &DatabaseConnection, slug: &str) -> Result<sub::Model, AppError> {
    sub::Entity::find()
        .filter(sub::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sub category not found".to_string()))
}

async fn ensure_slug_free(
    db: &DatabaseConnection,
    slug: &str,
    except: Option<Uuid>,
) -> Result<(), AppError> {
    let mut query = sub::Entity::find().filter(sub::Column::Slug.eq(slug));
    if let Some(id) = except {
        query = query.filter(sub::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(AppError::Conflict(format!("Sub '{slug}' already exists.")));
    }
    Ok(())
}

/// `POST /api/admin/sub/create`
async fn create_sub(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<SubRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (name, slug, parent) = req.parse(&state.db).await?;
    ensure_slug_free(&state.db, &slug, None).await?;

    let ts = now();
    let created = sub::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        name: ActiveValue::Set(name),
        slug: ActiveValue::Set(slug),
        parent_id: ActiveValue::Set(parent),
        created_at: ActiveValue::Set(ts),
        updated_at: ActiveValue::Set(ts),
    }
    .insert(&state.db)
    .await
    .map_err(|e| AppError::from_db(e, "Sub"))?;

    Ok(Json(created))
}

/// `GET /api/subs`
async fn list_subs(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let subs = sub::Entity::find()
        .order_by_desc(sub::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(subs))
}

/// `DELETE /api/admin/sub/delete/{slug}`
async fn delete_sub(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let existing = find_sub(&state.db, &slug).await?;
    existing
        .clone()
        .delete(&state.db)
        .await
        .map_err(|e| AppError::from_db(e, "Sub"))?;
    Ok(Json(existing))
}

/// `PUT /api/admin/sub/update/{slug}`
async fn update_sub(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(slug): Path<String>,
    Json(req): Json<SubRequest>,
) -> Result<impl IntoResponse, AppError> {
    let existing = find_sub(&state.db, &slug).await?;
    let (name, new_slug, parent) = req.parse(&state.db).await?;
    ensure_slug_free(&state.db, &new_slug, Some(existing.id)).await?;

    let mut active: sub::ActiveModel = existing.into();
    active.name = ActiveValue::Set(name);
    active.slug = ActiveValue::Set(new_slug);
    active.parent_id = ActiveValue::Set(parent);
    active.updated_at = ActiveValue::Set(now());

    let updated = active
        .update(&state.db)
        .await
        .map_err(|e| AppError::from_db(e, "Sub"))?;
    Ok(Json(updated))
}
