use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
};
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Deserialize;
use uuid::Uuid;

use super::{now, success};
use crate::{
    auth::middleware::AdminUser,
    entities::blog_category,
    error::AppError,
    state::AppState,
    utils::{Validator, slugify},
};

/// Blog category router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/blogcategory", post(create_blog_category))
        .route("/blogcategories", get(list_blog_categories))
        .route("/blogcategory/{slug}", get(get_blog_category))
        .route("/admin/blogcategory/{slug}", delete(delete_blog_category))
}

#[derive(Debug, Deserialize)]
pub(super) struct NameRequest {
    #[serde(default)]
    pub(super) name: String,
}

impl NameRequest {
    /// Validate the name and derive its slug.
    pub(super) fn parse(&self, what: &str) -> Result<(String, String), AppError> {
        let name = self.name.trim().to_string();
        let slug = slugify(&name);

        let mut v = Validator::default();
        v.length("name", &name, 1, 32, &format!("{what} name must be 1 to 32 characters"))
            .check(
                "name",
                name.is_empty() || !slug.is_empty(),
                &format!("{what} name must contain letters or digits"),
            );
        v.finish()?;

        Ok((name, slug))
    }
}

/// `POST /api/admin/blogcategory`
async fn create_blog_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<NameRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (name, slug) = req.parse("Blog category")?;

    let taken = blog_category::Entity::find()
        .filter(blog_category::Column::Slug.eq(&slug))
        .one(&state.db)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(format!(
            "Blog category '{slug}' already exists."
        )));
    }

    let ts = now();
    let created = blog_category::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        name: ActiveValue::Set(name),
        slug: ActiveValue::Set(slug),
        created_at: ActiveValue::Set(ts),
        updated_at: ActiveValue::Set(ts),
    }
    .insert(&state.db)
    .await
    .map_err(|e| AppError::from_db(e, "Blog category"))?;

    Ok(Json(created))
}

/// `GET /api/blogcategories`
async fn list_blog_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let categories = blog_category::Entity::find()
        .order_by_asc(blog_category::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(categories))
}

/// `GET /api/blogcategory/{slug}`
async fn get_blog_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let category = blog_category::Entity::find()
        .filter(blog_category::Column::Slug.eq(slug.to_lowercase()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog category not found".to_string()))?;
    Ok(Json(category))
}

/// `DELETE /api/admin/blogcategory/{slug}` — blog links go with it.
async fn delete_blog_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = blog_category::Entity::delete_many()
        .filter(blog_category::Column::Slug.eq(slug.to_lowercase()))
        .exec(&state.db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Blog category not found".to_string()));
    }
    Ok(success())
}
