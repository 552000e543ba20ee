use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use serde::Deserialize;
use uuid::Uuid;

use super::now;
use crate::{
    auth::middleware::AdminUser,
    entities::{category, sub},
    error::AppError,
    services::image_host::UploadedImage,
    state::AppState,
    utils::{Validator, slugify},
};

/// Category router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/category/create", post(create_category))
        .route("/categories", get(list_categories))
        .route("/admin/category/delete/{slug}", delete(delete_category))
        .route("/admin/category/update/{slug}", put(update_category))
        .route("/category/{id}/subs", get(list_category_subs))
}

#[derive(Debug, Deserialize)]
struct CreateCategoryRequest {
    #[serde(default)]
    category_name: String,
    #[serde(default)]
    category_images: Vec<UploadedImage>,
}

#[derive(Debug, Deserialize)]
struct UpdateCategoryRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    images: Vec<UploadedImage>,
}

fn validate(name: &str, images: &[UploadedImage]) -> Result<String, AppError> {
    let slug = slugify(name);
    let mut v = Validator::default();
    v.length("name", name, 2, 32, "Category name must be 2 to 32 characters")
        .check("name", name.trim().is_empty() || !slug.is_empty(), "Category name must contain letters or digits")
        .not_empty("images", images, "You must supply at least one image");
    v.finish()?;
    Ok(slug)
}

async fn find_category(db: &DatabaseConnection, slug: &str) -> Result<category::Model, AppError> {
    category::Entity::find()
        .filter(category::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("No category found".to_string()))
}

async fn ensure_slug_free(
    db: &DatabaseConnection,
    slug: &str,
    except: Option<Uuid>,
) -> Result<(), AppError> {
    let mut query = category::Entity::find().filter(category::Column::Slug.eq(slug));
    if let Some(id) = except {
        query = query.filter(category::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Category '{slug}' already exists."
        )));
    }
    Ok(())
}

/// `POST /api/admin/category/create`
async fn create_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let slug = validate(&req.category_name, &req.category_images)?;
    ensure_slug_free(&state.db, &slug, None).await?;

    let ts = now();
    let created = category::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        name: ActiveValue::Set(req.category_name.trim().to_string()),
        slug: ActiveValue::Set(slug),
        images: ActiveValue::Set(serde_json::to_value(&req.category_images)?),
        created_at: ActiveValue::Set(ts),
        updated_at: ActiveValue::Set(ts),
    }
    .insert(&state.db)
    .await
    .map_err(|e| AppError::from_db(e, "Category"))?;

    tracing::info!(category = %created.slug, "Category created");
    Ok(Json(created))
}

/// `GET /api/categories`
async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let categories = category::Entity::find()
        .order_by_desc(category::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(categories))
}

/// `DELETE /api/admin/category/delete/{slug}` — removes the category and its subs together.
async fn delete_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let existing = find_category(&state.db, &slug).await?;

    let txn = state.db.begin().await?;

    let removed_subs = sub::Entity::delete_many()
        .filter(sub::Column::ParentId.eq(existing.id))
        .exec(&txn)
        .await
        .map_err(|e| AppError::from_db(e, "Category"))?;

    category::Entity::delete_by_id(existing.id)
        .exec(&txn)
        .await
        .map_err(|e| AppError::from_db(e, "Category"))?;

    txn.commit().await?;

    tracing::info!(
        category = %existing.slug,
        subs_removed = removed_subs.rows_affected,
        "Category deleted"
    );
    Ok(Json(existing))
}

/// `PUT /api/admin/category/update/{slug}`
async fn update_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(slug): Path<String>,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let existing = find_category(&state.db, &slug).await?;
    let new_slug = validate(&req.name, &req.images)?;
    ensure_slug_free(&state.db, &new_slug, Some(existing.id)).await?;

    let mut active: category::ActiveModel = existing.into();
    active.name = ActiveValue::Set(req.name.trim().to_string());
    active.slug = ActiveValue::Set(new_slug);
    active.images = ActiveValue::Set(serde_json::to_value(&req.images)?);
    active.updated_at = ActiveValue::Set(now());

    let updated = active
        .update(&state.db)
        .await
        .map_err(|e| AppError::from_db(e, "Category"))?;
    Ok(Json(updated))
}

/// `GET /api/category/{id}/subs`
async fn list_category_subs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let subs = sub::Entity::find()
        .filter(sub::Column::ParentId.eq(id))
        .order_by_desc(sub::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(subs))
}
