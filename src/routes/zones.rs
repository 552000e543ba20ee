use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post, put},
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
    entities::{Island, zone},
    error::AppError,
    state::AppState,
    utils::{Validator, slugify},
};

/// Zone router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/zone/create", post(create_zone))
        .route("/zones/all", get(list_zones))
        .route("/zone/{slug}", put(update_zone).delete(delete_zone))
}

#[derive(Debug, Deserialize)]
struct ZoneRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    island: String,
}

impl ZoneRequest {
    /// Validate and normalise into `(name, slug, island)`.
    fn parse(self) -> Result<(String, String, Island), AppError> {
        let name = self.name.trim().to_lowercase();
        let island = Island::from_str(&self.island);
        let slug = slugify(&name);

        let mut v = Validator::default();
        v.length("name", &name, 2, 100, "Zone name must be 2 to 100 characters")
            .check("name", name.is_empty() || !slug.is_empty(), "Zone name must contain letters or digits")
            .check("island", island.is_some(), "Island must be ndzuwani, ngazidja or mwali");
        v.finish()?;

        island
            .map(|island| (name, slug, island))
            .ok_or_else(|| AppError::BadRequest("Invalid island".to_string()))
    }
}

async fn find_zone(db: &DatabaseConnection, slug: &str) -> Result<zone::Model, AppError> {
    zone::Entity::find()
        .filter(zone::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Zone not found".to_string()))
}

async fn ensure_slug_free(
    db: &DatabaseConnection,
    slug: &str,
    except: Option<Uuid>,
) -> Result<(), AppError> {
    let mut query = zone::Entity::find().filter(zone::Column::Slug.eq(slug));
    if let Some(id) = except {
        query = query.filter(zone::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(AppError::Conflict(format!("Zone '{slug}' already exists.")));
    }
    Ok(())
}

/// `POST /api/admin/zone/create`
async fn create_zone(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<ZoneRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (name, slug, island) = req.parse()?;
    ensure_slug_free(&state.db, &slug, None).await?;

    let ts = now();
    let created = zone::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        name: ActiveValue::Set(name),
        slug: ActiveValue::Set(slug),
        island: ActiveValue::Set(island.as_str().to_string()),
        created_at: ActiveValue::Set(ts),
        updated_at: ActiveValue::Set(ts),
    }
    .insert(&state.db)
    .await
    .map_err(|e| AppError::from_db(e, "Zone"))?;

    tracing::info!(zone = %created.slug, island = %created.island, "Zone created");
    Ok(Json(created))
}

/// `GET /api/zones/all`
async fn list_zones(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let zones = zone::Entity::find()
        .order_by_desc(zone::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(zones))
}

/// `PUT /api/zone/{slug}`
async fn update_zone(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(slug): Path<String>,
    Json(req): Json<ZoneRequest>,
) -> Result<impl IntoResponse, AppError> {
    let existing = find_zone(&state.db, &slug).await?;
    let (name, new_slug, island) = req.parse()?;
    ensure_slug_free(&state.db, &new_slug, Some(existing.id)).await?;

    let mut active: zone::ActiveModel = existing.into();
    active.name = ActiveValue::Set(name);
    active.slug = ActiveValue::Set(new_slug);
    active.island = ActiveValue::Set(island.as_str().to_string());
    active.updated_at = ActiveValue::Set(now());

    let updated = active
        .update(&state.db)
        .await
        .map_err(|e| AppError::from_db(e, "Zone"))?;
    Ok(Json(updated))
}

/// `DELETE /api/zone/{slug}` — refused with 409 while users or items still point at the zone.
async fn delete_zone(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let existing = find_zone(&state.db, &slug).await?;

    existing
        .clone()
        .delete(&state.db)
        .await
        .map_err(|e| AppError::from_db(e, "Zone"))?;

    tracing::info!(zone = %existing.slug, "Zone deleted");
    Ok(Json(existing))
}
