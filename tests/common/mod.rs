#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use massiwa_api::auth::identity::{IdentityClaims, IdentityProvider};
use massiwa_api::config::{Config, Environment, IdentityConfig, ImageHostConfig, MailConfig};
use massiwa_api::entities::{ApprovalStatus, ItemType, Role, category, item, item_sub, sub, user, zone};
use massiwa_api::services::image_host::{ImageHost, UploadedImage};
use massiwa_api::services::mailer::{EmailMessage, Mailer};
use massiwa_api::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Fakes
// ─────────────────────────────────────────────────────────────────────────────

/// Accepts tokens of the form `token:<email>`; records every admin call.
#[derive(Debug, Default)]
pub struct FakeIdentity {
    pub deleted: Mutex<Vec<String>>,
    pub email_updates: Mutex<Vec<(String, String)>>,
    pub password_updates: Mutex<Vec<String>>,
}

impl FakeIdentity {
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn email_updates(&self) -> Vec<(String, String)> {
        self.email_updates.lock().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn password_updates(&self) -> Vec<String> {
        self.password_updates.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

pub fn token_for(email: &str) -> String {
    format!("token:{email}")
}

pub fn uid_for(email: &str) -> String {
    format!("uid-{email}")
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn verify_token(&self, token: &str) -> anyhow::Result<IdentityClaims> {
        let email = token
            .strip_prefix("token:")
            .ok_or_else(|| anyhow::anyhow!("bad token"))?;
        Ok(IdentityClaims {
            sub: uid_for(email),
            email: email.to_string(),
            exp: Utc::now().timestamp() + 3600,
        })
    }

    async fn delete_user_by_email(&self, email: &str) -> anyhow::Result<()> {
        if let Ok(mut g) = self.deleted.lock() {
            g.push(email.to_string());
        }
        Ok(())
    }

    async fn update_email(&self, uid: &str, new_email: &str) -> anyhow::Result<()> {
        if let Ok(mut g) = self.email_updates.lock() {
            g.push((uid.to_string(), new_email.to_string()));
        }
        Ok(())
    }

    async fn update_password(&self, uid: &str, _new_password: &str) -> anyhow::Result<()> {
        if let Ok(mut g) = self.password_updates.lock() {
            g.push(uid.to_string());
        }
        Ok(())
    }
}

/// Hands back predictable URLs; refuses to destroy `missing`.
#[derive(Debug, Default)]
pub struct FakeImageHost;

#[async_trait]
impl ImageHost for FakeImageHost {
    async fn upload(&self, data_uri: &str, public_id: &str) -> anyhow::Result<UploadedImage> {
        if !data_uri.starts_with("data:") {
            anyhow::bail!("not a data uri");
        }
        Ok(UploadedImage {
            public_id: public_id.to_string(),
            url: format!("https://img.test/{public_id}.jpg"),
        })
    }

    async fn destroy(&self, public_id: &str) -> anyhow::Result<()> {
        if public_id == "missing" {
            anyhow::bail!("not found");
        }
        Ok(())
    }
}

/// Records outbound mail; fails every send when `failing` is set.
#[derive(Debug, Default)]
pub struct FakeMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub failing: bool,
}

impl FakeMailer {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()> {
        if self.failing {
            anyhow::bail!("relay down");
        }
        if let Ok(mut g) = self.sent.lock() {
            g.push(message);
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// App
// ─────────────────────────────────────────────────────────────────────────────

pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        server_host: std::net::IpAddr::from([127, 0, 0, 1]),
        server_port: 0,
        environment: Environment::Development,
        log_level: "warn".to_string(),
        frontend_url: "http://localhost:3000".to_string(),
        app_name: "Massiwa".to_string(),
        http_timeout: Duration::from_secs(1),
        identity: IdentityConfig {
            jwt_secret: "test-secret-key-for-testing-only-32chars".to_string(),
            admin_url: String::new(),
            service_key: String::new(),
        },
        image_host: ImageHostConfig {
            base_url: String::new(),
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
        },
        mail: MailConfig {
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from: "noreply@massiwa.test".to_string(),
            contact_recipient: "contact@massiwa.test".to_string(),
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub identity: Arc<FakeIdentity>,
    pub mailer: Arc<FakeMailer>,
}

/// Build the app router backed by an in-memory `SQLite` database with migrations.
pub async fn test_app() -> TestApp {
    build(FakeMailer::default()).await
}

pub async fn test_app_with_failing_mailer() -> TestApp {
    build(FakeMailer {
        failing: true,
        ..FakeMailer::default()
    })
    .await
}

async fn build(mailer: FakeMailer) -> TestApp {
    let db = sea_orm::Database::connect("sqlite::memory:")
        .await
        .unwrap_or_default();

    Migrator::up(&db, None).await.unwrap_or_default();

    let identity = Arc::new(FakeIdentity::default());
    let mailer = Arc::new(mailer);

    let state = AppState {
        db: db.clone(),
        config: test_config(),
        identity: identity.clone(),
        images: Arc::new(FakeImageHost),
        mailer: mailer.clone(),
    };

    TestApp {
        router: massiwa_api::routes::router().with_state(state),
        db,
        identity,
        mailer,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

/// Send a request with an optional `authtoken` and JSON body; returns (status, json).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authtoken", token);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap_or_default();

    dispatch(app, request).await
}

pub async fn dispatch(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap_or_default();

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .unwrap_or_default();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);

    (status, json)
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, "GET", uri, token, None).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    send(app, "POST", uri, token, Some(body)).await
}

pub async fn put_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    send(app, "PUT", uri, token, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, "DELETE", uri, token, None).await
}

/// Send a `multipart/form-data` request built from text fields.
pub async fn send_multipart(
    app: &Router,
    method: &str,
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
) -> (StatusCode, Value) {
    let boundary = "massiwa-test-boundary";
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("authtoken", token)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap_or_default();

    dispatch(app, request).await
}

// ─────────────────────────────────────────────────────────────────────────────
// Seeds
// ─────────────────────────────────────────────────────────────────────────────

fn ts() -> sea_orm::prelude::DateTimeWithTimeZone {
    Utc::now().fixed_offset()
}

pub async fn seed_zone(db: &DatabaseConnection, name: &str, island: &str) -> zone::Model {
    zone::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        slug: Set(massiwa_api::utils::slugify(name)),
        island: Set(island.to_string()),
        created_at: Set(ts()),
        updated_at: Set(ts()),
    }
    .insert(db)
    .await
    .unwrap_or_else(|_| placeholder_zone())
}

fn placeholder_zone() -> zone::Model {
    zone::Model {
        id: Uuid::nil(),
        name: String::new(),
        slug: String::new(),
        island: String::new(),
        created_at: ts(),
        updated_at: ts(),
    }
}

pub async fn seed_user(
    db: &DatabaseConnection,
    email: &str,
    role: Role,
    zone_id: Option<Uuid>,
    approval: Option<ApprovalStatus>,
) -> user::Model {
    let id = Uuid::new_v4();
    let model = user::ActiveModel {
        id: Set(id),
        name: Set("Test User".to_string()),
        email: Set(email.to_string()),
        phone_number: Set("+269 000 00 00".to_string()),
        role: Set(role.as_str().to_string()),
        island: Set("ngazidja".to_string()),
        city: Set("Moroni".to_string()),
        address: Set("Rue du port".to_string()),
        reference_zone_id: Set(zone_id),
        referent_account_approval: Set(approval.map(|a| a.as_str().to_string())),
        created_at: Set(ts()),
        updated_at: Set(ts()),
    };
    model.insert(db).await.unwrap_or_else(|_| user::Model {
        id,
        name: String::new(),
        email: String::new(),
        phone_number: String::new(),
        role: String::new(),
        island: String::new(),
        city: String::new(),
        address: String::new(),
        reference_zone_id: None,
        referent_account_approval: None,
        created_at: ts(),
        updated_at: ts(),
    })
}

pub async fn seed_category(db: &DatabaseConnection, name: &str) -> category::Model {
    let model = category::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        slug: Set(massiwa_api::utils::slugify(name)),
        images: Set(json!([{ "public_id": "c1", "url": "https://img.test/c1.jpg" }])),
        created_at: Set(ts()),
        updated_at: Set(ts()),
    };
    model.insert(db).await.unwrap_or_else(|_| category::Model {
        id: Uuid::nil(),
        name: String::new(),
        slug: String::new(),
        images: Value::Null,
        created_at: ts(),
        updated_at: ts(),
    })
}

pub async fn seed_sub(db: &DatabaseConnection, name: &str, parent: Uuid) -> sub::Model {
    let model = sub::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        slug: Set(massiwa_api::utils::slugify(name)),
        parent_id: Set(parent),
        created_at: Set(ts()),
        updated_at: Set(ts()),
    };
    model.insert(db).await.unwrap_or_else(|_| sub::Model {
        id: Uuid::nil(),
        name: String::new(),
        slug: String::new(),
        parent_id: parent,
        created_at: ts(),
        updated_at: ts(),
    })
}

/// Insert an item owned by `referent` in `zone`, linked to `sub`.
pub async fn seed_item(
    db: &DatabaseConnection,
    title: &str,
    referent: &user::Model,
    zone: &zone::Model,
    sub: &sub::Model,
    status: ApprovalStatus,
    kind: ItemType,
) -> item::Model {
    let id = Uuid::new_v4();
    let model = item::ActiveModel {
        id: Set(id),
        title: Set(title.to_string()),
        slug: Set(massiwa_api::utils::slugify(title)),
        referent_email: Set(referent.email.clone()),
        description: Set(format!("{title} description")),
        category_id: Set(sub.parent_id),
        images: Set(json!([{ "public_id": "i1", "url": "https://img.test/i1.jpg" }])),
        provider_name: Set("Provider".to_string()),
        provider_phone_number: Set("+269 111 11 11".to_string()),
        provider_address: Set("moroni".to_string()),
        zone_island: Set(zone.island.clone()),
        zone_name: Set(zone.name.clone()),
        reference_zone_id: Set(zone.id),
        item_approval_status: Set(status.as_str().to_string()),
        item_type: Set(kind.as_str().to_string()),
        is_recommended: Set(false),
        created_at: Set(ts()),
        updated_at: Set(ts()),
    };
    let created = model.insert(db).await;

    item_sub::Entity::insert(item_sub::ActiveModel {
        item_id: Set(id),
        sub_id: Set(sub.id),
    })
    .exec_without_returning(db)
    .await
    .unwrap_or_default();

    match created {
        Ok(m) => m,
        Err(_) => item::Entity::find_by_id(id)
            .one(db)
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| item::Model {
                id,
                title: String::new(),
                slug: String::new(),
                referent_email: String::new(),
                description: String::new(),
                category_id: Uuid::nil(),
                images: Value::Null,
                provider_name: String::new(),
                provider_phone_number: String::new(),
                provider_address: String::new(),
                zone_island: String::new(),
                zone_name: String::new(),
                reference_zone_id: Uuid::nil(),
                item_approval_status: String::new(),
                item_type: String::new(),
                is_recommended: false,
                created_at: ts(),
                updated_at: ts(),
            }),
    }
}

/// A referent approved in a fresh zone, plus a category and sub to list under.
pub struct Catalog {
    pub zone: zone::Model,
    pub referent: user::Model,
    pub admin: user::Model,
    pub customer: user::Model,
    pub category: category::Model,
    pub sub: sub::Model,
}

pub async fn seed_catalog(db: &DatabaseConnection) -> Catalog {
    let zone = seed_zone(db, "mitsamiouli", "ngazidja").await;
    let referent = seed_user(
        db,
        "referent@massiwa.test",
        Role::Referent,
        Some(zone.id),
        Some(ApprovalStatus::Approved),
    )
    .await;
    let admin = seed_user(db, "admin@massiwa.test", Role::Sysadmin, None, None).await;
    let customer = seed_user(db, "customer@massiwa.test", Role::Customer, None, None).await;
    let category = seed_category(db, "Artisanat").await;
    let sub = seed_sub(db, "Vannerie", category.id).await;

    Catalog {
        zone,
        referent,
        admin,
        customer,
        category,
        sub,
    }
}
