use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post, put},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
    sea_query::OnConflict,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{now, success};
use crate::{
    auth::middleware::{AdminOrReferentUser, AdminUser, AuthUser, ReferentUser},
    entities::{
        ApprovalStatus, ItemType, Role, category, item, item_rating, item_sub, sub, user, zone,
    },
    error::AppError,
    services::image_host::UploadedImage,
    state::AppState,
    utils::{Validator, slugify},
};

/// Item router: listing lifecycle, moderation, ratings.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/referent/item/create", post(create_item))
        .route("/referent/items/get-counts", get(referent_item_counts))
        .route("/referent/items/get-all", post(referent_items))
        .route(
            "/item/{slug}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/admin/items/requests", get(item_requests))
        .route(
            "/admin/item/{slug}/update-item-approval-status",
            put(update_item_approval_status),
        )
        .route("/items/get-all", get(list_approved_items))
        .route("/items/get-counts-by-referents", post(counts_by_referent))
        .route("/admin/items/{slug}/recommend/yes", put(recommend_item))
        .route("/admin/items/{slug}/recommend/no", put(unrecommend_item))
        .route("/items/get-all/recommended", get(recommended_items))
        .route("/items/related/{item_id}", get(related_items))
        .route("/items/products/{count}", get(products_by_count))
        .route("/items/services/{count}", get(services_by_count))
        .route("/item/star/{item_id}", put(rate_item))
}

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ItemRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    category: Option<Uuid>,
    #[serde(default)]
    subs: Vec<Uuid>,
    #[serde(default)]
    images: Vec<UploadedImage>,
    #[serde(default)]
    provider_name: String,
    #[serde(default)]
    provider_phone_number: String,
    #[serde(default)]
    provider_address: String,
    #[serde(default)]
    item_type: String,
}

/// An [`ItemRequest`] that passed validation and whose references exist.
struct ValidItem {
    title: String,
    slug: String,
    description: String,
    category_id: Uuid,
    sub_ids: Vec<Uuid>,
    images: serde_json::Value,
    provider_name: String,
    provider_phone_number: String,
    provider_address: String,
    item_type: ItemType,
}

#[derive(Debug, Default, Deserialize)]
struct ReferentItemsRequest {
    productslimit: Option<u64>,
    productskip: Option<u64>,
    serviceslimit: Option<u64>,
    serviceskip: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ReferentEmailRequest {
    #[serde(default)]
    referent_email: String,
}

#[derive(Debug, Deserialize)]
struct ApprovalRequest {
    #[serde(default)]
    item_approval_status: String,
}

#[derive(Debug, Deserialize)]
struct RatingRequest {
    star: Option<i32>,
    #[serde(default)]
    comment: String,
}

/// Item with its category, subs, zone and ratings resolved.
#[derive(Debug, Serialize)]
pub(super) struct ItemResponse {
    #[serde(flatten)]
    item: item::Model,
    category: Option<category::Model>,
    subs: Vec<sub::Model>,
    reference_zone: Option<zone::Model>,
    ratings: Vec<item_rating::Model>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReferentCounts {
    total_on_hold_items: u64,
    total_approved_products: u64,
    total_approved_services: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApprovedCounts {
    total_approved_products: u64,
    total_approved_services: u64,
}

#[derive(Debug, Serialize)]
struct ReferentItems {
    #[serde(rename = "allApprovedProducts")]
    all_approved_products: Vec<ItemResponse>,
    products_size: usize,
    #[serde(rename = "allApprovedServices")]
    all_approved_services: Vec<ItemResponse>,
    services_size: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApprovedItems {
    all_approved_products: Vec<ItemResponse>,
    all_approved_services: Vec<ItemResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecommendedItems {
    all_recommended_products: Vec<ItemResponse>,
    all_recommended_services: Vec<ItemResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApprovedProducts {
    all_approved_products: Vec<ItemResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApprovedServices {
    all_approved_services: Vec<ItemResponse>,
}

// ============================================================================
// Handlers
// ============================================================================

/// `POST /api/referent/item/create` — list a new item, pending moderation.
async fn create_item(
    State(state): State<AppState>,
    ReferentUser(referent): ReferentUser,
    Json(req): Json<ItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    let valid = validate_item(&state.db, req).await?;
    ensure_slug_free(&state.db, &valid.slug, None).await?;

    let zone_id = referent
        .reference_zone_id
        .ok_or_else(|| AppError::NotFound("Zone not found".to_string()))?;
    let zone = zone::Entity::find_by_id(zone_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Zone not found".to_string()))?;

    let ts = now();
    let id = Uuid::new_v4();
    let new_item = item::ActiveModel {
        id: ActiveValue::Set(id),
        title: ActiveValue::Set(valid.title),
        slug: ActiveValue::Set(valid.slug),
        referent_email: ActiveValue::Set(referent.email.clone()),
        description: ActiveValue::Set(valid.description),
        category_id: ActiveValue::Set(valid.category_id),
        images: ActiveValue::Set(valid.images),
        provider_name: ActiveValue::Set(valid.provider_name),
        provider_phone_number: ActiveValue::Set(valid.provider_phone_number),
        provider_address: ActiveValue::Set(valid.provider_address),
        zone_island: ActiveValue::Set(zone.island.clone()),
        zone_name: ActiveValue::Set(zone.name.clone()),
        reference_zone_id: ActiveValue::Set(zone.id),
        item_approval_status: ActiveValue::Set(ApprovalStatus::OnHold.as_str().to_string()),
        item_type: ActiveValue::Set(valid.item_type.as_str().to_string()),
        is_recommended: ActiveValue::Set(false),
        created_at: ActiveValue::Set(ts),
        updated_at: ActiveValue::Set(ts),
    };

    let txn = state.db.begin().await?;
    let created = new_item
        .insert(&txn)
        .await
        .map_err(|e| AppError::from_db(e, "Item"))?;
    replace_subs(&txn, id, &valid.sub_ids)
        .await
        .map_err(|e| AppError::from_db(e, "Item"))?;
    txn.commit().await?;

    tracing::info!(
        item = %created.slug,
        referent = %referent.email,
        "Item submitted for approval"
    );

    Ok(Json(populate_one(&state.db, created).await?))
}

/// `GET /api/referent/items/get-counts`
async fn referent_item_counts(
    State(state): State<AppState>,
    ReferentUser(referent): ReferentUser,
) -> Result<impl IntoResponse, AppError> {
    let total_on_hold_items = item::Entity::find()
        .filter(item::Column::ReferentEmail.eq(&referent.email))
        .filter(item::Column::ItemApprovalStatus.eq(ApprovalStatus::OnHold.as_str()))
        .count(&state.db)
        .await?;
    let total_approved_products = approved_of_type(ItemType::Product)
        .filter(item::Column::ReferentEmail.eq(&referent.email))
        .count(&state.db)
        .await?;
    let total_approved_services = approved_of_type(ItemType::Service)
        .filter(item::Column::ReferentEmail.eq(&referent.email))
        .count(&state.db)
        .await?;

    Ok(Json(ReferentCounts {
        total_on_hold_items,
        total_approved_products,
        total_approved_services,
    }))
}

/// `POST /api/referent/items/get-all` — caller's approved listings, paged per type.
async fn referent_items(
    State(state): State<AppState>,
    ReferentUser(referent): ReferentUser,
    body: Option<Json<ReferentItemsRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let page = body.map(|Json(p)| p).unwrap_or_default();

    let products = approved_of_type(ItemType::Product)
        .filter(item::Column::ReferentEmail.eq(&referent.email))
        .offset(page.productskip.unwrap_or(0))
        .limit(page.productslimit.unwrap_or(10))
        .all(&state.db)
        .await?;
    let services = approved_of_type(ItemType::Service)
        .filter(item::Column::ReferentEmail.eq(&referent.email))
        .offset(page.serviceskip.unwrap_or(0))
        .limit(page.serviceslimit.unwrap_or(10))
        .all(&state.db)
        .await?;

    let all_approved_products = populate(&state.db, products).await?;
    let all_approved_services = populate(&state.db, services).await?;

    Ok(Json(ReferentItems {
        products_size: all_approved_products.len(),
        services_size: all_approved_services.len(),
        all_approved_products,
        all_approved_services,
    }))
}

/// `GET /api/item/{slug}`
async fn get_item(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let found = find_item_by_slug(&state.db, &slug).await?;
    Ok(Json(populate_one(&state.db, found).await?))
}

/// `PUT /api/item/{slug}` — full edit; the slug follows the new title.
async fn update_item(
    State(state): State<AppState>,
    AdminOrReferentUser(caller): AdminOrReferentUser,
    Path(slug): Path<String>,
    Json(req): Json<ItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    let existing = find_item_by_slug(&state.db, &slug).await?;
    ensure_can_modify(&caller, &existing)?;

    let valid = validate_item(&state.db, req).await?;
    ensure_slug_free(&state.db, &valid.slug, Some(existing.id)).await?;

    let id = existing.id;
    let mut active: item::ActiveModel = existing.into();
    active.title = ActiveValue::Set(valid.title);
    active.slug = ActiveValue::Set(valid.slug);
    active.description = ActiveValue::Set(valid.description);
    active.category_id = ActiveValue::Set(valid.category_id);
    active.images = ActiveValue::Set(valid.images);
    active.provider_name = ActiveValue::Set(valid.provider_name);
    active.provider_phone_number = ActiveValue::Set(valid.provider_phone_number);
    active.provider_address = ActiveValue::Set(valid.provider_address);
    active.item_type = ActiveValue::Set(valid.item_type.as_str().to_string());
    active.updated_at = ActiveValue::Set(now());

    let txn = state.db.begin().await?;
    let updated = active
        .update(&txn)
        .await
        .map_err(|e| AppError::from_db(e, "Item"))?;
    replace_subs(&txn, id, &valid.sub_ids)
        .await
        .map_err(|e| AppError::from_db(e, "Item"))?;
    txn.commit().await?;

    Ok(Json(populate_one(&state.db, updated).await?))
}

/// `DELETE /api/item/{slug}` — returns the removed item.
async fn delete_item(
    State(state): State<AppState>,
    AdminOrReferentUser(caller): AdminOrReferentUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let existing = find_item_by_slug(&state.db, &slug).await?;
    ensure_can_modify(&caller, &existing)?;

    item::Entity::delete_by_id(existing.id)
        .exec(&state.db)
        .await?;

    tracing::info!(item = %existing.slug, by = %caller.email, "Item deleted");
    Ok(Json(existing))
}

/// `GET /api/admin/items/requests` — everything awaiting moderation.
async fn item_requests(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let pending = item::Entity::find()
        .filter(item::Column::ItemApprovalStatus.eq(ApprovalStatus::OnHold.as_str()))
        .order_by_desc(item::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(populate(&state.db, pending).await?))
}

/// `PUT /api/admin/item/{slug}/update-item-approval-status`
///
/// `approved` publishes the item; `rejected` deletes it outright.
async fn update_item_approval_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(slug): Path<String>,
    Json(req): Json<ApprovalRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status = ApprovalStatus::from_str(&req.item_approval_status)
        .filter(|s| *s != ApprovalStatus::OnHold)
        .ok_or_else(|| {
            AppError::BadRequest("item_approval_status must be approved or rejected".to_string())
        })?;

    let existing = find_item_by_slug(&state.db, &slug).await?;

    match status {
        ApprovalStatus::Approved => {
            let mut active: item::ActiveModel = existing.into();
            active.item_approval_status = ActiveValue::Set(status.as_str().to_string());
            active.updated_at = ActiveValue::Set(now());
            active.update(&state.db).await?;
        }
        ApprovalStatus::Rejected => {
            item::Entity::delete_by_id(existing.id)
                .exec(&state.db)
                .await?;
        }
        ApprovalStatus::OnHold => {}
    }

    tracing::info!(item = %slug, %status, by = %admin.email, "Item moderated");
    Ok(success())
}

/// `GET /api/items/get-all`
async fn list_approved_items(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let products = approved_of_type(ItemType::Product).all(&state.db).await?;
    let services = approved_of_type(ItemType::Service).all(&state.db).await?;

    Ok(Json(ApprovedItems {
        all_approved_products: populate(&state.db, products).await?,
        all_approved_services: populate(&state.db, services).await?,
    }))
}

/// `POST /api/items/get-counts-by-referents`
async fn counts_by_referent(
    State(state): State<AppState>,
    Json(req): Json<ReferentEmailRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut v = Validator::default();
    v.email("referent_email", &req.referent_email, "A valid referent email is required");
    v.finish()?;

    let email = req.referent_email.trim().to_lowercase();
    let total_approved_products = approved_of_type(ItemType::Product)
        .filter(item::Column::ReferentEmail.eq(&email))
        .count(&state.db)
        .await?;
    let total_approved_services = approved_of_type(ItemType::Service)
        .filter(item::Column::ReferentEmail.eq(&email))
        .count(&state.db)
        .await?;

    Ok(Json(ApprovedCounts {
        total_approved_products,
        total_approved_services,
    }))
}

/// `PUT /api/admin/items/{slug}/recommend/yes`
async fn recommend_item(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    set_recommended(&state.db, &slug, true).await.map(Json)
}

/// `PUT /api/admin/items/{slug}/recommend/no`
async fn unrecommend_item(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    set_recommended(&state.db, &slug, false).await.map(Json)
}

/// `GET /api/items/get-all/recommended` — at most four of each type.
async fn recommended_items(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let products = approved_of_type(ItemType::Product)
        .filter(item::Column::IsRecommended.eq(true))
        .limit(4)
        .all(&state.db)
        .await?;
    let services = approved_of_type(ItemType::Service)
        .filter(item::Column::IsRecommended.eq(true))
        .limit(4)
        .all(&state.db)
        .await?;

    Ok(Json(RecommendedItems {
        all_recommended_products: populate(&state.db, products).await?,
        all_recommended_services: populate(&state.db, services).await?,
    }))
}

/// `GET /api/items/related/{item_id}` — up to four others in the same category.
async fn related_items(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let anchor = item::Entity::find_by_id(item_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    let related = item::Entity::find()
        .filter(item::Column::CategoryId.eq(anchor.category_id))
        .filter(item::Column::Id.ne(anchor.id))
        .order_by_desc(item::Column::CreatedAt)
        .limit(4)
        .all(&state.db)
        .await?;

    Ok(Json(populate(&state.db, related).await?))
}

/// `GET /api/items/products/{count}`
async fn products_by_count(
    State(state): State<AppState>,
    Path(count): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    let products = approved_of_type(ItemType::Product)
        .limit(count)
        .all(&state.db)
        .await?;
    Ok(Json(ApprovedProducts {
        all_approved_products: populate(&state.db, products).await?,
    }))
}

/// `GET /api/items/services/{count}`
async fn services_by_count(
    State(state): State<AppState>,
    Path(count): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    let services = approved_of_type(ItemType::Service)
        .limit(count)
        .all(&state.db)
        .await?;
    Ok(Json(ApprovedServices {
        all_approved_services: populate(&state.db, services).await?,
    }))
}

/// `PUT /api/item/star/{item_id}` — one rating per user per item; re-rating overwrites.
async fn rate_item(
    State(state): State<AppState>,
    AuthUser(rater): AuthUser,
    Path(item_id): Path<Uuid>,
    Json(req): Json<RatingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut v = Validator::default();
    v.check(
        "star",
        req.star.is_some_and(|s| (1..=5).contains(&s)),
        "Star must be between 1 and 5",
    )
    .required("comment", &req.comment, "You must supply a comment");
    v.finish()?;

    let rated = item::Entity::find_by_id(item_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    let ts = now();
    let rating = item_rating::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        item_id: ActiveValue::Set(rated.id),
        posted_by: ActiveValue::Set(rater.id),
        star: ActiveValue::Set(req.star.unwrap_or_default()),
        comment: ActiveValue::Set(req.comment.trim().to_string()),
        created_at: ActiveValue::Set(ts),
        updated_at: ActiveValue::Set(ts),
    };

    item_rating::Entity::insert(rating)
        .on_conflict(
            OnConflict::columns([item_rating::Column::ItemId, item_rating::Column::PostedBy])
                .update_columns([
                    item_rating::Column::Star,
                    item_rating::Column::Comment,
                    item_rating::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(&state.db)
        .await?;

    tracing::debug!(item = %rated.slug, user = %rater.id, "Item rated");
    Ok(Json(populate_one(&state.db, rated).await?))
}

// ============================================================================
// Helpers
// ============================================================================

/// Approved items of one type, newest first.
fn approved_of_type(item_type: ItemType) -> Select<item::Entity> {
    item::Entity::find()
        .filter(item::Column::ItemApprovalStatus.eq(ApprovalStatus::Approved.as_str()))
        .filter(item::Column::ItemType.eq(item_type.as_str()))
        .order_by_desc(item::Column::CreatedAt)
}

async fn find_item_by_slug(db: &DatabaseConnection, slug: &str) -> Result<item::Model, AppError> {
    item::Entity::find()
        .filter(item::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
}

async fn ensure_slug_free(
    db: &DatabaseConnection,
    slug: &str,
    except: Option<Uuid>,
) -> Result<(), AppError> {
    let mut query = item::Entity::find().filter(item::Column::Slug.eq(slug));
    if let Some(id) = except {
        query = query.filter(item::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(AppError::Conflict(format!("Item '{slug}' already exists.")));
    }
    Ok(())
}

/// Referents may only touch their own listings; admins may touch any.
fn ensure_can_modify(caller: &user::Model, target: &item::Model) -> Result<(), AppError> {
    let is_referent = Role::from_str(&caller.role) == Some(Role::Referent);
    if is_referent && !caller.email.eq_ignore_ascii_case(&target.referent_email) {
        return Err(AppError::Forbidden(
            "Access denied. You can only modify your own items.".to_string(),
        ));
    }
    Ok(())
}

async fn set_recommended(
    db: &DatabaseConnection,
    slug: &str,
    recommended: bool,
) -> Result<item::Model, AppError> {
    let existing = find_item_by_slug(db, slug).await?;
    let mut active: item::ActiveModel = existing.into();
    active.is_recommended = ActiveValue::Set(recommended);
    active.updated_at = ActiveValue::Set(now());
    Ok(active.update(db).await?)
}

/// Check every field, then confirm the category and subs exist.
///
/// Nothing is written before this returns `Ok`.
async fn validate_item(db: &DatabaseConnection, req: ItemRequest) -> Result<ValidItem, AppError> {
    let title = req.title.trim().to_string();
    let slug = slugify(&title);
    let item_type = ItemType::from_str(&req.item_type);

    let mut v = Validator::default();
    v.required("title", &title, "You must supply a title")
        .length("title", &title, 0, 32, "Title must be at most 32 characters")
        .check("title", title.is_empty() || !slug.is_empty(), "Title must contain letters or digits")
        .required("description", &req.description, "You must supply a description")
        .length("description", &req.description, 0, 2000, "Description must be at most 2000 characters")
        .check("category", req.category.is_some(), "You must supply a category")
        .not_empty("subs", &req.subs, "You must supply at least one sub category")
        .not_empty("images", &req.images, "You must supply at least one image")
        .required("provider_name", &req.provider_name, "You must supply the provider name")
        .required(
            "provider_phone_number",
            &req.provider_phone_number,
            "You must supply the provider phone number",
        )
        .required("provider_address", &req.provider_address, "You must supply the provider address")
        .length(
            "provider_address",
            &req.provider_address,
            0,
            2000,
            "Provider address must be at most 2000 characters",
        )
        .check("item_type", item_type.is_some(), "Item type must be product or service");
    v.finish()?;

    let (Some(category_id), Some(item_type)) = (req.category, item_type) else {
        return Err(AppError::BadRequest("Invalid item".to_string()));
    };

    if category::Entity::find_by_id(category_id).one(db).await?.is_none() {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    let mut sub_ids = req.subs;
    sub_ids.sort_unstable();
    sub_ids.dedup();
    let known = sub::Entity::find()
        .filter(sub::Column::Id.is_in(sub_ids.clone()))
        .count(db)
        .await?;
    if usize::try_from(known).ok() != Some(sub_ids.len()) {
        return Err(AppError::NotFound("Sub category not found".to_string()));
    }

    Ok(ValidItem {
        title,
        slug,
        description: req.description.trim().to_string(),
        category_id,
        sub_ids,
        images: serde_json::to_value(&req.images)?,
        provider_name: req.provider_name.trim().to_string(),
        provider_phone_number: req.provider_phone_number.trim().to_string(),
        provider_address: req.provider_address.trim().to_lowercase(),
        item_type,
    })
}

/// Replace the item's sub links with `sub_ids`.
async fn replace_subs<C: ConnectionTrait>(
    conn: &C,
    item_id: Uuid,
    sub_ids: &[Uuid],
) -> Result<(), DbErr> {
    item_sub::Entity::delete_many()
        .filter(item_sub::Column::ItemId.eq(item_id))
        .exec(conn)
        .await?;

    if sub_ids.is_empty() {
        return Ok(());
    }

    let links = sub_ids.iter().map(|sub_id| item_sub::ActiveModel {
        item_id: ActiveValue::Set(item_id),
        sub_id: ActiveValue::Set(*sub_id),
    });
    item_sub::Entity::insert_many(links)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

async fn populate_one(db: &DatabaseConnection, one: item::Model) -> Result<ItemResponse, AppError> {
    populate(db, vec![one])
        .await?
        .pop()
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
}

/// Resolve category, subs, zone and ratings for a page of items in four queries.
///
/// Order of `items` is preserved.
pub(super) async fn populate(
    db: &DatabaseConnection,
    items: Vec<item::Model>,
) -> Result<Vec<ItemResponse>, DbErr> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
    let category_ids: Vec<Uuid> = items.iter().map(|i| i.category_id).collect();
    let zone_ids: Vec<Uuid> = items.iter().map(|i| i.reference_zone_id).collect();

    let categories: HashMap<Uuid, category::Model> = category::Entity::find()
        .filter(category::Column::Id.is_in(category_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let zones: HashMap<Uuid, zone::Model> = zone::Entity::find()
        .filter(zone::Column::Id.is_in(zone_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|z| (z.id, z))
        .collect();

    let mut subs: HashMap<Uuid, Vec<sub::Model>> = HashMap::new();
    for (link, linked) in item_sub::Entity::find()
        .filter(item_sub::Column::ItemId.is_in(ids.clone()))
        .find_also_related(sub::Entity)
        .all(db)
        .await?
    {
        if let Some(s) = linked {
            subs.entry(link.item_id).or_default().push(s);
        }
    }

    let mut ratings: HashMap<Uuid, Vec<item_rating::Model>> = HashMap::new();
    for r in item_rating::Entity::find()
        .filter(item_rating::Column::ItemId.is_in(ids))
        .order_by_asc(item_rating::Column::CreatedAt)
        .all(db)
        .await?
    {
        ratings.entry(r.item_id).or_default().push(r);
    }

    Ok(items
        .into_iter()
        .map(|i| ItemResponse {
            category: categories.get(&i.category_id).cloned(),
            subs: subs.remove(&i.id).unwrap_or_default(),
            reference_zone: zones.get(&i.reference_zone_id).cloned(),
            ratings: ratings.remove(&i.id).unwrap_or_default(),
            item: i,
        })
        .collect())
}
