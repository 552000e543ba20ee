mod common;

use axum::http::StatusCode;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{Value, json};

use common::{post_json, put_json, seed_catalog, seed_item, seed_user, seed_zone, token_for};
use massiwa_api::entities::{ApprovalStatus, ItemType, Role, item};

fn item_body(title: &str, category: &str, sub: &str) -> Value {
    json!({
        "title": title,
        "description": "Paniers tressés à la main",
        "category": category,
        "subs": [sub],
        "images": [{ "public_id": "p1", "url": "https://img.test/p1.jpg" }],
        "provider_name": "Coopérative",
        "provider_phone_number": "+269 333 33 33",
        "provider_address": "Mitsamiouli Centre",
        "item_type": "product"
    })
}

#[tokio::test]
async fn create_item_starts_on_hold_with_zone_copied() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let token = token_for(&c.referent.email);

    let body = item_body("Panier Vert", &c.category.id.to_string(), &c.sub.id.to_string());
    let (status, json) = post_json(&app.router, "/api/referent/item/create", Some(&token), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["slug"], "panier-vert");
    assert_eq!(json["item_approval_status"], "on hold");
    assert_eq!(json["zone_island"], "ngazidja");
    assert_eq!(json["zone_name"], "mitsamiouli");
    assert_eq!(json["referent_email"], c.referent.email);
    assert_eq!(json["provider_address"], "mitsamiouli centre");
    assert_eq!(json["subs"][0]["id"], c.sub.id.to_string());
    assert_eq!(json["category"]["slug"], "artisanat");
}

#[tokio::test]
async fn invalid_item_writes_nothing() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let token = token_for(&c.referent.email);

    let mut body = item_body("", &c.category.id.to_string(), &c.sub.id.to_string());
    body["images"] = json!([]);
    let (status, json) = post_json(&app.router, "/api/referent/item/create", Some(&token), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = json["error"]["fields"]
        .as_array()
        .map(|a| a.iter().filter_map(|f| f["field"].as_str()).collect())
        .unwrap_or_default();
    assert!(fields.contains(&"title"));
    assert!(fields.contains(&"images"));

    let count = item::Entity::find().count(&app.db).await.unwrap_or(u64::MAX);
    assert_eq!(count, 0);
}

#[tokio::test]
async fn unknown_category_is_not_found() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let token = token_for(&c.referent.email);

    let body = item_body("Panier", &uuid::Uuid::new_v4().to_string(), &c.sub.id.to_string());
    let (status, _) = post_json(&app.router, "/api/referent/item/create", Some(&token), body).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn referent_without_zone_cannot_list() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let drifter = seed_user(&app.db, "drifter@massiwa.test", Role::Referent, None, None).await;

    let body = item_body("Panier", &c.category.id.to_string(), &c.sub.id.to_string());
    let (status, _) = post_json(
        &app.router,
        "/api/referent/item/create",
        Some(&token_for(&drifter.email)),
        body,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_title_conflicts() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    seed_item(&app.db, "Panier Vert", &c.referent, &c.zone, &c.sub, ApprovalStatus::OnHold, ItemType::Product).await;

    let body = item_body("Panier vert", &c.category.id.to_string(), &c.sub.id.to_string());
    let (status, json) = post_json(
        &app.router,
        "/api/referent/item/create",
        Some(&token_for(&c.referent.email)),
        body,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn approval_publishes_and_rejection_deletes() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let admin = token_for(&c.admin.email);
    let keep = seed_item(&app.db, "Miel", &c.referent, &c.zone, &c.sub, ApprovalStatus::OnHold, ItemType::Product).await;
    let drop = seed_item(&app.db, "Savon", &c.referent, &c.zone, &c.sub, ApprovalStatus::OnHold, ItemType::Product).await;

    let (status, pending) = common::get(&app.router, "/api/admin/items/requests", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending.as_array().map(Vec::len), Some(2));

    let uri = format!("/api/admin/item/{}/update-item-approval-status", keep.slug);
    let (status, json) = put_json(&app.router, &uri, Some(&admin), json!({ "item_approval_status": "approved" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let uri = format!("/api/admin/item/{}/update-item-approval-status", drop.slug);
    let (status, _) = put_json(&app.router, &uri, Some(&admin), json!({ "item_approval_status": "rejected" })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = common::get(&app.router, &format!("/api/item/{}", drop.slug), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, all) = common::get(&app.router, "/api/items/get-all", None).await;
    assert_eq!(all["allApprovedProducts"][0]["slug"], "miel");
    assert_eq!(all["allApprovedServices"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn approval_rejects_unknown_status_and_missing_item() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let admin = token_for(&c.admin.email);
    let it = seed_item(&app.db, "Miel", &c.referent, &c.zone, &c.sub, ApprovalStatus::OnHold, ItemType::Product).await;

    let uri = format!("/api/admin/item/{}/update-item-approval-status", it.slug);
    let (status, _) = put_json(&app.router, &uri, Some(&admin), json!({ "item_approval_status": "maybe" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = put_json(
        &app.router,
        "/api/admin/item/nothing-here/update-item-approval-status",
        Some(&admin),
        json!({ "item_approval_status": "approved" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn referent_cannot_edit_another_referents_item() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let other = seed_user(
        &app.db,
        "other@massiwa.test",
        Role::Referent,
        Some(c.zone.id),
        Some(ApprovalStatus::Approved),
    )
    .await;
    let it = seed_item(&app.db, "Miel", &c.referent, &c.zone, &c.sub, ApprovalStatus::Approved, ItemType::Product).await;

    let (status, _) = common::delete(&app.router, &format!("/api/item/{}", it.slug), Some(&token_for(&other.email))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = common::delete(&app.router, &format!("/api/item/{}", it.slug), Some(&token_for(&c.admin.email))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["slug"], "miel");
}

#[tokio::test]
async fn update_reslugs_and_replaces_subs() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let other_sub = common::seed_sub(&app.db, "Poterie", c.category.id).await;
    let it = seed_item(&app.db, "Miel", &c.referent, &c.zone, &c.sub, ApprovalStatus::Approved, ItemType::Product).await;

    let body = item_body("Miel de Mohéli", &c.category.id.to_string(), &other_sub.id.to_string());
    let (status, json) = put_json(
        &app.router,
        &format!("/api/item/{}", it.slug),
        Some(&token_for(&c.referent.email)),
        body,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["slug"], "miel-de-moheli");
    assert_eq!(json["subs"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["subs"][0]["slug"], "poterie");
}

#[tokio::test]
async fn rating_twice_keeps_one_rating() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let it = seed_item(&app.db, "Miel", &c.referent, &c.zone, &c.sub, ApprovalStatus::Approved, ItemType::Product).await;
    let token = token_for(&c.customer.email);
    let uri = format!("/api/item/star/{}", it.id);

    let (status, _) = put_json(&app.router, &uri, Some(&token), json!({ "star": 2, "comment": "Bof" })).await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = put_json(&app.router, &uri, Some(&token), json!({ "star": 5, "comment": "Excellent" })).await;
    assert_eq!(status, StatusCode::OK);

    let ratings = json["ratings"].as_array().cloned().unwrap_or_default();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0]["star"], 5);
    assert_eq!(ratings[0]["comment"], "Excellent");
}

#[tokio::test]
async fn rating_out_of_range_is_rejected() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let it = seed_item(&app.db, "Miel", &c.referent, &c.zone, &c.sub, ApprovalStatus::Approved, ItemType::Product).await;

    let (status, _) = put_json(
        &app.router,
        &format!("/api/item/star/{}", it.id),
        Some(&token_for(&c.customer.email)),
        json!({ "star": 6, "comment": "Trop bien" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn recommended_and_counts() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let admin = token_for(&c.admin.email);
    let it = seed_item(&app.db, "Miel", &c.referent, &c.zone, &c.sub, ApprovalStatus::Approved, ItemType::Product).await;
    seed_item(&app.db, "Guide", &c.referent, &c.zone, &c.sub, ApprovalStatus::Approved, ItemType::Service).await;
    seed_item(&app.db, "Attente", &c.referent, &c.zone, &c.sub, ApprovalStatus::OnHold, ItemType::Service).await;

    let (status, json) = put_json(&app.router, &format!("/api/admin/items/{}/recommend/yes", it.slug), Some(&admin), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["is_recommended"], true);

    let (_, json) = common::get(&app.router, "/api/items/get-all/recommended", None).await;
    assert_eq!(json["allRecommendedProducts"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["allRecommendedServices"].as_array().map(Vec::len), Some(0));

    let (_, json) = common::get(&app.router, "/api/referent/items/get-counts", Some(&token_for(&c.referent.email))).await;
    assert_eq!(json["totalOnHoldItems"], 1);
    assert_eq!(json["totalApprovedProducts"], 1);
    assert_eq!(json["totalApprovedServices"], 1);

    let (_, json) = post_json(
        &app.router,
        "/api/items/get-counts-by-referents",
        None,
        json!({ "referent_email": c.referent.email }),
    )
    .await;
    assert_eq!(json["totalApprovedProducts"], 1);
    assert_eq!(json["totalApprovedServices"], 1);

    let (_, json) = common::get(&app.router, "/api/items/services/5", None).await;
    assert_eq!(json["allApprovedServices"][0]["slug"], "guide");
}

#[tokio::test]
async fn related_items_share_category_and_exclude_self() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let anchor = seed_item(&app.db, "Miel", &c.referent, &c.zone, &c.sub, ApprovalStatus::Approved, ItemType::Product).await;
    for title in ["Un", "Deux", "Trois", "Quatre", "Cinq"] {
        seed_item(&app.db, title, &c.referent, &c.zone, &c.sub, ApprovalStatus::Approved, ItemType::Product).await;
    }

    let (status, json) = common::get(&app.router, &format!("/api/items/related/{}", anchor.id), None).await;
    assert_eq!(status, StatusCode::OK);
    let related = json.as_array().cloned().unwrap_or_default();
    assert_eq!(related.len(), 4);
    assert!(related.iter().all(|r| r["id"] != anchor.id.to_string()));
}

#[tokio::test]
async fn search_island_choice_all_ignores_island() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let mwali = seed_zone(&app.db, "fomboni", "mwali").await;
    seed_item(&app.db, "Miel Blanc", &c.referent, &c.zone, &c.sub, ApprovalStatus::Approved, ItemType::Product).await;
    seed_item(&app.db, "Miel Noir", &c.referent, &mwali, &c.sub, ApprovalStatus::Approved, ItemType::Product).await;
    seed_item(&app.db, "Savon", &c.referent, &mwali, &c.sub, ApprovalStatus::Approved, ItemType::Product).await;

    let (status, all) = post_json(
        &app.router,
        "/api/search/filters",
        None,
        json!({ "query": { "text": "MIEL", "island_choice": "all" } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().map(Vec::len), Some(2));

    let (_, narrowed) = post_json(
        &app.router,
        "/api/search/filters",
        None,
        json!({ "query": { "text": "miel", "island_choice": "mwali" } }),
    )
    .await;
    let narrowed = narrowed.as_array().cloned().unwrap_or_default();
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed[0]["slug"], "miel-noir");
}

#[tokio::test]
async fn search_by_rating_bucket_uses_floored_average() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let other = seed_user(&app.db, "second@massiwa.test", Role::Customer, None, None).await;
    let four = seed_item(&app.db, "Quatre", &c.referent, &c.zone, &c.sub, ApprovalStatus::Approved, ItemType::Product).await;
    let two = seed_item(&app.db, "Deux", &c.referent, &c.zone, &c.sub, ApprovalStatus::Approved, ItemType::Product).await;

    for (email, item_id, star) in [
        (&c.customer.email, four.id, 4),
        (&other.email, four.id, 5),
        (&c.customer.email, two.id, 2),
    ] {
        let (status, _) = put_json(
            &app.router,
            &format!("/api/item/star/{item_id}"),
            Some(&token_for(email)),
            json!({ "star": star, "comment": "Noté" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, json) = post_json(&app.router, "/api/search/filters", None, json!({ "rating": "4" })).await;
    let found = json.as_array().cloned().unwrap_or_default();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["slug"], "quatre");

    let (_, json) = post_json(&app.router, "/api/search/filters", None, json!({ "rating": "0" })).await;
    assert_eq!(json.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn search_without_filter_is_bad_request() {
    let app = common::test_app().await;
    let (status, _) = post_json(&app.router, "/api/search/filters", None, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
