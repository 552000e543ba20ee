use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post, put},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Select, TransactionTrait, sea_query::OnConflict,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::items::populate;
use super::{now, success};
use crate::{
    auth::middleware::{AdminUser, AuthUser, IdentityUser},
    entities::{ApprovalStatus, Island, ItemType, Role, item, user, wishlist, zone},
    error::AppError,
    state::AppState,
    utils::Validator,
};

/// User router: admin dashboards, referent moderation, wishlist.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get-counts", get(get_counts))
        .route("/admin/referents/requests", get(referent_requests))
        .route(
            "/admin/referent/update-account-approval-status",
            put(update_referent_approval_status),
        )
        .route("/referents/all-approved", get(approved_referents))
        .route("/admin/referent/{id}", put(delete_referent))
        .route("/admin/account-update", put(update_admin_account))
        .route("/admin/password-update", put(update_admin_password))
        .route("/referent/{email}", get(get_referent))
        .route("/customer/all", get(list_customers))
        .route("/wishlist/add", post(add_to_wishlist))
        .route("/user/wishlist/get", get(get_wishlist))
        .route("/user/wishlist/remove/{id}", put(remove_from_wishlist))
        .route("/user/wishlist/count", get(wishlist_count))
        .route("/referent/search/filters", post(search_referents))
}

// ============================================================================
// Request / Response Types
// ============================================================================

/// A user with their reference zone resolved.
#[derive(Debug, Serialize)]
pub(super) struct UserResponse {
    #[serde(flatten)]
    user: user::Model,
    reference_zone: Option<zone::Model>,
}

impl From<(user::Model, Option<zone::Model>)> for UserResponse {
    fn from((user, reference_zone): (user::Model, Option<zone::Model>)) -> Self {
        Self {
            user,
            reference_zone,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Counts {
    total_ref_count: u64,
    total_customer_count: u64,
    total_products_count: u64,
    total_services_count: u64,
}

#[derive(Debug, Deserialize)]
struct AccountApprovalRequest {
    #[serde(default)]
    referent_email: String,
    #[serde(default)]
    approval_status: String,
}

#[derive(Debug, Deserialize)]
struct ReferentEmailRequest {
    #[serde(default)]
    referent_email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountUpdateRequest {
    #[serde(default)]
    new_name: String,
    #[serde(default)]
    new_email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordUpdateRequest {
    #[serde(default)]
    new_password: String,
}

#[derive(Debug, Deserialize)]
struct WishlistRequest {
    item_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
struct WishlistResponse<T> {
    wishlist: T,
}

#[derive(Debug, Serialize)]
struct CountResponse {
    count: u64,
}

#[derive(Debug, Default, Deserialize)]
struct ReferentSearchRequest {
    island: Option<String>,
    zone_name: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /api/get-counts`
async fn get_counts(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let count_role = |role: Role| {
        user::Entity::find()
            .filter(user::Column::Role.eq(role.as_str()))
            .count(&state.db)
    };
    let count_type = |kind: ItemType| {
        item::Entity::find()
            .filter(item::Column::ItemType.eq(kind.as_str()))
            .filter(item::Column::ItemApprovalStatus.eq(ApprovalStatus::Approved.as_str()))
            .count(&state.db)
    };

    Ok(Json(Counts {
        total_ref_count: count_role(Role::Referent).await?,
        total_customer_count: count_role(Role::Customer).await?,
        total_products_count: count_type(ItemType::Product).await?,
        total_services_count: count_type(ItemType::Service).await?,
    }))
}

/// `GET /api/admin/referents/requests` — referents awaiting account approval.
async fn referent_requests(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let pending = referents_with_status(ApprovalStatus::OnHold)
        .find_also_related(zone::Entity)
        .all(&state.db)
        .await?;
    Ok(Json(into_responses(pending)))
}

/// `PUT /api/admin/referent/update-account-approval-status`
///
/// Rejection removes the identity account first, then the local row.
async fn update_referent_approval_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(req): Json<AccountApprovalRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut v = Validator::default();
    v.email("referent_email", &req.referent_email, "A valid referent email is required");
    v.finish()?;

    let status = ApprovalStatus::from_str(&req.approval_status)
        .filter(|s| *s != ApprovalStatus::OnHold)
        .ok_or_else(|| {
            AppError::BadRequest("approval_status must be approved or rejected".to_string())
        })?;

    let email = req.referent_email.trim().to_lowercase();
    let referent = find_user_by_email(&state.db, &email)
        .await
        .and_then(ensure_referent)?;

    match status {
        ApprovalStatus::Approved => {
            let mut active: user::ActiveModel = referent.into();
            active.referent_account_approval =
                ActiveValue::Set(Some(status.as_str().to_string()));
            active.updated_at = ActiveValue::Set(now());
            active.update(&state.db).await?;
        }
        ApprovalStatus::Rejected => {
            state
                .identity
                .delete_user_by_email(&email)
                .await
                .map_err(AppError::BadGateway)?;
            user::Entity::delete_by_id(referent.id)
                .exec(&state.db)
                .await
                .inspect_err(|e| {
                    tracing::error!(
                        email = %email,
                        "Identity account deleted but local user removal failed: {e}"
                    );
                })?;
        }
        ApprovalStatus::OnHold => {}
    }

    tracing::info!(referent = %email, %status, by = %admin.email, "Referent account moderated");
    Ok(success())
}

/// `GET /api/referents/all-approved`
async fn approved_referents(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let approved = referents_with_status(ApprovalStatus::Approved)
        .find_also_related(zone::Entity)
        .all(&state.db)
        .await?;
    Ok(Json(into_responses(approved)))
}

/// `PUT /api/admin/referent/{id}` — remove a referent everywhere, along with their items.
async fn delete_referent(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ReferentEmailRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut v = Validator::default();
    v.email("referent_email", &req.referent_email, "A valid referent email is required");
    v.finish()?;

    let referent = user::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
        .and_then(ensure_referent)?;

    if !referent.email.eq_ignore_ascii_case(req.referent_email.trim()) {
        return Err(AppError::BadRequest(
            "referent_email does not match this user".to_string(),
        ));
    }

    state
        .identity
        .delete_user_by_email(&referent.email)
        .await
        .map_err(AppError::BadGateway)?;

    let txn = state.db.begin().await?;
    let removed = async {
        let items = item::Entity::delete_many()
            .filter(item::Column::ReferentEmail.eq(&referent.email))
            .exec(&txn)
            .await?;
        user::Entity::delete_by_id(referent.id).exec(&txn).await?;
        Ok::<_, sea_orm::DbErr>(items.rows_affected)
    }
    .await;

    let items_removed = match removed {
        Ok(n) => {
            txn.commit().await?;
            n
        }
        Err(e) => {
            tracing::error!(
                email = %referent.email,
                "Identity account deleted but local referent removal failed: {e}"
            );
            return Err(e.into());
        }
    };

    tracing::info!(
        referent = %referent.email,
        items_removed,
        by = %admin.email,
        "Referent deleted"
    );
    Ok(Json(referent))
}

/// `PUT /api/admin/account-update` — change the caller's own name and login email.
async fn update_admin_account(
    State(state): State<AppState>,
    IdentityUser(claims): IdentityUser,
    AdminUser(admin): AdminUser,
    Json(req): Json<AccountUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut v = Validator::default();
    v.required("newName", &req.new_name, "You must supply a name")
        .email("newEmail", &req.new_email, "A valid email is required");
    v.finish()?;

    let new_email = req.new_email.trim().to_lowercase();
    let taken = user::Entity::find()
        .filter(user::Column::Email.eq(&new_email))
        .filter(user::Column::Id.ne(admin.id))
        .one(&state.db)
        .await?
        .is_some();
    if taken {
        return Err(AppError::Conflict("Email already in use.".to_string()));
    }

    state
        .identity
        .update_email(&claims.sub, &new_email)
        .await
        .map_err(AppError::BadGateway)?;

    let mut active: user::ActiveModel = admin.into();
    active.name = ActiveValue::Set(req.new_name.trim().to_string());
    active.email = ActiveValue::Set(new_email.clone());
    active.updated_at = ActiveValue::Set(now());
    active
        .update(&state.db)
        .await
        .map_err(|e| AppError::from_db(e, "User"))?;

    tracing::info!(email = %new_email, "Admin account updated");
    Ok(success())
}

/// `PUT /api/admin/password-update`
async fn update_admin_password(
    State(state): State<AppState>,
    IdentityUser(claims): IdentityUser,
    AdminUser(_admin): AdminUser,
    Json(req): Json<PasswordUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut v = Validator::default();
    v.check(
        "newPassword",
        !req.new_password.is_empty(),
        "You must supply a new password",
    );
    v.finish()?;

    state
        .identity
        .update_password(&claims.sub, &req.new_password)
        .await
        .map_err(AppError::BadGateway)?;

    tracing::info!(uid = %claims.sub, "Admin password updated");
    Ok(success())
}

/// `GET /api/referent/{email}`
async fn get_referent(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let found = user::Entity::find()
        .filter(user::Column::Email.eq(email.trim().to_lowercase()))
        .find_also_related(zone::Entity)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(UserResponse::from(found)))
}

/// `GET /api/customer/all`
async fn list_customers(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let customers = user::Entity::find()
        .filter(user::Column::Role.eq(Role::Customer.as_str()))
        .order_by_desc(user::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(customers))
}

/// `POST /api/wishlist/add` — adding an item twice keeps one entry.
async fn add_to_wishlist(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Json(req): Json<WishlistRequest>,
) -> Result<impl IntoResponse, AppError> {
    let item_id = req
        .item_id
        .ok_or_else(|| AppError::BadRequest("item_id is required".to_string()))?;

    if item::Entity::find_by_id(item_id).one(&state.db).await?.is_none() {
        return Err(AppError::NotFound("Item not found".to_string()));
    }

    let entry = wishlist::ActiveModel {
        user_id: ActiveValue::Set(owner.id),
        item_id: ActiveValue::Set(item_id),
        created_at: ActiveValue::Set(now()),
    };
    wishlist::Entity::insert(entry)
        .on_conflict(
            OnConflict::columns([wishlist::Column::UserId, wishlist::Column::ItemId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&state.db)
        .await?;

    Ok(success())
}

/// `GET /api/user/wishlist/get`
async fn get_wishlist(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let saved: Vec<item::Model> = wishlist::Entity::find()
        .filter(wishlist::Column::UserId.eq(owner.id))
        .order_by_desc(wishlist::Column::CreatedAt)
        .find_also_related(item::Entity)
        .all(&state.db)
        .await?
        .into_iter()
        .filter_map(|(_, saved)| saved)
        .collect();

    Ok(Json(WishlistResponse {
        wishlist: populate(&state.db, saved).await?,
    }))
}

/// `PUT /api/user/wishlist/remove/{id}`
async fn remove_from_wishlist(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    wishlist::Entity::delete_many()
        .filter(wishlist::Column::UserId.eq(owner.id))
        .filter(wishlist::Column::ItemId.eq(item_id))
        .exec(&state.db)
        .await?;
    Ok(success())
}

/// `GET /api/user/wishlist/count`
async fn wishlist_count(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let count = wishlist::Entity::find()
        .filter(wishlist::Column::UserId.eq(owner.id))
        .count(&state.db)
        .await?;
    Ok(Json(CountResponse { count }))
}

/// `POST /api/referent/search/filters`
///
/// `allIslands` / `allZones` return every approved referent.
async fn search_referents(
    State(state): State<AppState>,
    Json(req): Json<ReferentSearchRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut query = referents_with_status(ApprovalStatus::Approved).find_also_related(zone::Entity);

    if let Some(island) = req.island.as_deref().map(str::trim) {
        if island != "allIslands" {
            let island = Island::from_str(island)
                .map_or_else(|| island.to_lowercase(), |i| i.as_str().to_string());
            query = query.filter(zone::Column::Island.eq(island));
        }
    } else if let Some(zone_name) = req.zone_name.as_deref().map(str::trim) {
        if zone_name != "allZones" {
            query = query.filter(zone::Column::Name.eq(zone_name.to_lowercase()));
        }
    } else {
        return Err(AppError::BadRequest(
            "island or zone_name is required".to_string(),
        ));
    }

    Ok(Json(into_responses(query.all(&state.db).await?)))
}

// ============================================================================
// Helpers
// ============================================================================

fn referents_with_status(status: ApprovalStatus) -> Select<user::Entity> {
    user::Entity::find()
        .filter(user::Column::Role.eq(Role::Referent.as_str()))
        .filter(user::Column::ReferentAccountApproval.eq(status.as_str()))
        .order_by_desc(user::Column::CreatedAt)
}

fn into_responses(rows: Vec<(user::Model, Option<zone::Model>)>) -> Vec<UserResponse> {
    rows.into_iter().map(UserResponse::from).collect()
}

async fn find_user_by_email(db: &DatabaseConnection, email: &str) -> Result<user::Model, AppError> {
    user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Moderation only ever applies to referent accounts.
fn ensure_referent(found: user::Model) -> Result<user::Model, AppError> {
    if Role::from_str(&found.role) == Some(Role::Referent) {
        Ok(found)
    } else {
        Err(AppError::NotFound("Referent not found".to_string()))
    }
}

/// Attach the reference zone to a single user.
pub(super) async fn with_zone(
    db: &DatabaseConnection,
    found: user::Model,
) -> Result<UserResponse, AppError> {
    let reference_zone = match found.reference_zone_id {
        Some(id) => zone::Entity::find_by_id(id).one(db).await?,
        None => None,
    };
    Ok(UserResponse::from((found, reference_zone)))
}
