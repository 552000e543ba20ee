mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::{TestApp, get, post_json, seed_catalog, send_multipart, token_for};

const LONG_BODY: &str = "<p>La vanille des Comores est cultivée principalement sur l'île \
    d'Anjouan, où les planteurs la pollinisent à la main fleur après fleur. \
    Après la récolte, les gousses sont échaudées puis séchées au soleil pendant des semaines.</p>";

async fn seed_taxonomy(app: &TestApp, admin: &str) -> (String, String) {
    let (_, category) = post_json(&app.router, "/api/admin/blogcategory", Some(admin), json!({ "name": "Agriculture" })).await;
    let (_, tag) = post_json(&app.router, "/api/admin/tag", Some(admin), json!({ "name": "Vanille" })).await;
    (
        category["id"].as_str().unwrap_or_default().to_string(),
        tag["id"].as_str().unwrap_or_default().to_string(),
    )
}

async fn publish(app: &TestApp, admin: &str, title: &str, category: &str, tag: &str) -> (StatusCode, Value) {
    send_multipart(
        &app.router,
        "POST",
        "/api/admin/blog",
        admin,
        &[
            ("title", title),
            ("body", LONG_BODY),
            ("blogcategories", category),
            ("tags", tag),
            ("image", "https://img.test/vanille.jpg"),
        ],
    )
    .await
}

#[tokio::test]
async fn create_blog_derives_meta_fields() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let admin = token_for(&c.admin.email);
    let (category, tag) = seed_taxonomy(&app, &admin).await;

    let (status, json) = publish(&app, &admin, "La Vanille d'Anjouan", &category, &tag).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["slug"], "la-vanille-d-anjouan");
    assert_eq!(json["mtitle"], "La Vanille d'Anjouan | Massiwa");
    assert_eq!(json["posted_by"], "Administrateur");
    assert_eq!(json["blogcategories"][0]["slug"], "agriculture");
    assert_eq!(json["tags"][0]["slug"], "vanille");

    let mdesc = json["mdesc"].as_str().unwrap_or_default();
    assert!(!mdesc.contains('<'));
    assert!(mdesc.starts_with("La vanille des Comores"));

    let excerpt = json["excerpt"].as_str().unwrap_or_default();
    assert!(excerpt.chars().count() <= 320 + " ...".len());
}

#[tokio::test]
async fn short_body_is_rejected() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let admin = token_for(&c.admin.email);
    let (category, tag) = seed_taxonomy(&app, &admin).await;

    let (status, json) = send_multipart(
        &app.router,
        "POST",
        "/api/admin/blog",
        &admin,
        &[
            ("title", "Trop court"),
            ("body", "Bonjour"),
            ("blogcategories", &category),
            ("tags", &tag),
            ("image", "https://img.test/x.jpg"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["fields"][0]["field"], "body");

    let (_, total) = get(&app.router, "/api/blogs/total", None).await;
    assert_eq!(total, 0);
}

#[tokio::test]
async fn title_length_is_bounded() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let admin = token_for(&c.admin.email);
    let (category, tag) = seed_taxonomy(&app, &admin).await;

    let too_long = "v".repeat(161);
    for title in ["Ab", too_long.as_str()] {
        let (status, json) = publish(&app, &admin, title, &category, &tag).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["fields"][0]["field"], "title");
    }

    let (_, total) = get(&app.router, "/api/blogs/total", None).await;
    assert_eq!(total, 0);

    let (status, _) = publish(&app, &admin, &"v".repeat(160), &category, &tag).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_multipart(
        &app.router,
        "PUT",
        &format!("/api/admin/blog/{}", "v".repeat(160)),
        &admin,
        &[("title", "Ab")],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_and_lookup() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let admin = token_for(&c.admin.email);
    let (category, tag) = seed_taxonomy(&app, &admin).await;
    publish(&app, &admin, "Premier article", &category, &tag).await;
    publish(&app, &admin, "Second article", &category, &tag).await;

    let (_, blogs) = get(&app.router, "/api/blogs", None).await;
    let blogs = blogs.as_array().cloned().unwrap_or_default();
    assert_eq!(blogs.len(), 2);
    assert!(blogs[0].get("body").is_none());

    let (_, page) = post_json(&app.router, "/api/blogs-categories-tags", None, json!({ "limit": 1 })).await;
    assert_eq!(page["size"], 1);
    assert_eq!(page["blogcategories"].as_array().map(Vec::len), Some(1));
    assert_eq!(page["tags"].as_array().map(Vec::len), Some(1));

    let (status, one) = get(&app.router, "/api/blog/Premier-Article", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(one["body"].as_str().is_some_and(|b| b.contains("vanille")));

    let (status, _) = get(&app.router, "/api/blog/absent", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_keeps_slug_and_recomputes_excerpt() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let admin = token_for(&c.admin.email);
    let (category, tag) = seed_taxonomy(&app, &admin).await;
    publish(&app, &admin, "Premier article", &category, &tag).await;

    let new_body = format!("<h2>Mise à jour</h2>{LONG_BODY}");
    let (status, json) = send_multipart(
        &app.router,
        "PUT",
        "/api/admin/blog/premier-article",
        &admin,
        &[("title", "Titre révisé"), ("body", &new_body)],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["slug"], "premier-article");
    assert_eq!(json["title"], "Titre révisé");
    assert!(json["mdesc"].as_str().is_some_and(|m| m.starts_with("Mise à jour")));
    assert_eq!(json["tags"][0]["slug"], "vanille");
}

#[tokio::test]
async fn related_and_category_filter() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let admin = token_for(&c.admin.email);
    let (category, tag) = seed_taxonomy(&app, &admin).await;
    let (_, first) = publish(&app, &admin, "Premier article", &category, &tag).await;
    publish(&app, &admin, "Second article", &category, &tag).await;

    let (_, related) = post_json(
        &app.router,
        "/api/blog/related",
        None,
        json!({ "blog": { "id": first["id"], "blogcategories": [category] } }),
    )
    .await;
    let related = related.as_array().cloned().unwrap_or_default();
    assert_eq!(related.len(), 1);
    assert_eq!(related[0]["slug"], "second-article");

    let (_, filtered) = post_json(&app.router, "/api/blog/search/filters", None, json!({ "blogcategory": category })).await;
    assert_eq!(filtered.as_array().map(Vec::len), Some(2));

    let (_, all) = post_json(&app.router, "/api/blog/search/filters", None, json!({ "blogcategory": "all" })).await;
    assert_eq!(all.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn delete_blog() {
    let app = common::test_app().await;
    let c = seed_catalog(&app.db).await;
    let admin = token_for(&c.admin.email);
    let (category, tag) = seed_taxonomy(&app, &admin).await;
    publish(&app, &admin, "Premier article", &category, &tag).await;

    let (status, json) = common::delete(&app.router, "/api/admin/blog/premier-article", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let (status, _) = common::delete(&app.router, "/api/admin/blog/premier-article", Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
