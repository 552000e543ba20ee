use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, QueryFilter};
use serde::Deserialize;
use uuid::Uuid;

use super::now;
use super::users::with_zone;
use crate::{
    auth::middleware::{AdminUser, AuthUser, CustomerUser, IdentityUser, ReferentUser},
    entities::{ApprovalStatus, Island, Role, user, zone},
    error::AppError,
    state::AppState,
    utils::Validator,
};

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Account bootstrap and session checks.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-or-update-user", post(create_or_update_user))
        .route("/current-user", post(current_user))
        .route("/current-admin", post(current_admin))
        .route("/current-referent", post(current_referent))
        .route("/current-customer", post(current_customer))
}

// ─────────────────────────────────────────────────────────────────────────────
// DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RegistrationRequest {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    phone_number: String,
    #[serde(default)]
    account_type: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    island: String,
    #[serde(default)]
    address: String,
    reference_zone: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `POST /api/create-or-update-user`
///
/// First call after sign-in. Returns the existing row untouched if the token
/// email is already known; otherwise creates the account. Referents that pick
/// a zone start out `on hold` until an admin approves them.
async fn create_or_update_user(
    State(state): State<AppState>,
    IdentityUser(claims): IdentityUser,
    Json(req): Json<RegistrationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = claims.email.trim().to_lowercase();

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?;
    if let Some(found) = existing {
        return Ok(Json(with_zone(&state.db, found).await?));
    }

    let role = Role::from_str(&req.account_type).filter(|r| *r != Role::Sysadmin);
    let island = Island::from_str(&req.island);

    let mut v = Validator::default();
    v.required("first_name", &req.first_name, "You must supply a first name")
        .required("last_name", &req.last_name, "You must supply a last name")
        .required("phone_number", &req.phone_number, "You must supply a phone number")
        .check("account_type", role.is_some(), "Account type must be customer or referent")
        .required("city", &req.city, "You must supply a city")
        .check("island", island.is_some(), "Island must be ndzuwani, ngazidja or mwali")
        .required("address", &req.address, "You must supply an address");
    v.finish()?;

    let (Some(role), Some(island)) = (role, island) else {
        return Err(AppError::BadRequest("Invalid registration".to_string()));
    };

    let zone_id = match req.reference_zone.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let id = Uuid::parse_str(raw)
                .map_err(|_| AppError::BadRequest("reference_zone must be a zone id".to_string()))?;
            zone::Entity::find_by_id(id)
                .one(&state.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Zone not found".to_string()))?;
            Some(id)
        }
    };

    let ts = now();
    let created = user::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        name: ActiveValue::Set(format!(
            "{} {}",
            req.first_name.trim(),
            req.last_name.trim()
        )),
        email: ActiveValue::Set(email),
        phone_number: ActiveValue::Set(req.phone_number.trim().to_string()),
        role: ActiveValue::Set(role.as_str().to_string()),
        island: ActiveValue::Set(island.as_str().to_string()),
        city: ActiveValue::Set(req.city.trim().to_string()),
        address: ActiveValue::Set(req.address.trim().to_string()),
        reference_zone_id: ActiveValue::Set(zone_id),
        referent_account_approval: ActiveValue::Set(
            zone_id.map(|_| ApprovalStatus::OnHold.as_str().to_string()),
        ),
        created_at: ActiveValue::Set(ts),
        updated_at: ActiveValue::Set(ts),
    }
    .insert(&state.db)
    .await
    .map_err(|e| AppError::from_db(e, "User"))?;

    tracing::info!(user_id = %created.id, role = %created.role, "Account created");
    Ok(Json(with_zone(&state.db, created).await?))
}

/// `POST /api/current-user`
async fn current_user(
    State(state): State<AppState>,
    AuthUser(found): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(with_zone(&state.db, found).await?))
}

/// `POST /api/current-admin`
async fn current_admin(
    State(state): State<AppState>,
    AdminUser(found): AdminUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(with_zone(&state.db, found).await?))
}

/// `POST /api/current-referent`
async fn current_referent(
    State(state): State<AppState>,
    ReferentUser(found): ReferentUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(with_zone(&state.db, found).await?))
}

/// `POST /api/current-customer`
async fn current_customer(
    State(state): State<AppState>,
    CustomerUser(found): CustomerUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(with_zone(&state.db, found).await?))
}
