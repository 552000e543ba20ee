use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    response::IntoResponse,
    routing::{get, post, put},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{now, success};
use crate::{
    auth::middleware::AdminUser,
    entities::{blog, blog_blog_category, blog_category, blog_tag, tag},
    error::AppError,
    state::AppState,
    utils::{Validator, slugify, smart_trim, strip_html, take_chars},
};

const AUTHOR: &str = "Administrateur";
const EXCERPT_LENGTH: usize = 320;
const MDESC_LENGTH: usize = 160;

/// Blog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/blog", post(create_blog))
        .route("/blogs", get(list_blogs))
        .route("/blogs/total", get(total_blogs))
        .route("/blogs-categories-tags", post(list_blogs_categories_tags))
        .route("/blog/{slug}", get(get_blog))
        .route("/admin/blog/{slug}", put(update_blog).delete(delete_blog))
        .route("/blog/related", post(related_blogs))
        .route("/blog/search/filters", post(search_blogs))
}

// ============================================================================
// Request / Response Types
// ============================================================================

/// Full article with its categories and tags.
#[derive(Debug, Serialize)]
struct BlogResponse {
    #[serde(flatten)]
    blog: blog::Model,
    blogcategories: Vec<blog_category::Model>,
    tags: Vec<tag::Model>,
}

/// Listing card: the article without body or meta fields.
#[derive(Debug, Serialize)]
struct BlogSummary {
    id: Uuid,
    title: String,
    slug: String,
    excerpt: String,
    image: String,
    posted_by: String,
    created_at: sea_orm::prelude::DateTimeWithTimeZone,
    updated_at: sea_orm::prelude::DateTimeWithTimeZone,
    blogcategories: Vec<blog_category::Model>,
    tags: Vec<tag::Model>,
}

impl From<BlogResponse> for BlogSummary {
    fn from(full: BlogResponse) -> Self {
        Self {
            id: full.blog.id,
            title: full.blog.title,
            slug: full.blog.slug,
            excerpt: full.blog.excerpt,
            image: full.blog.image,
            posted_by: full.blog.posted_by,
            created_at: full.blog.created_at,
            updated_at: full.blog.updated_at,
            blogcategories: full.blogcategories,
            tags: full.tags,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PageRequest {
    limit: Option<u64>,
    skip: Option<u64>,
}

#[derive(Debug, Serialize)]
struct BlogsCategoriesTags {
    blogs: Vec<BlogSummary>,
    blogcategories: Vec<blog_category::Model>,
    tags: Vec<tag::Model>,
    size: usize,
}

#[derive(Debug, Deserialize)]
struct RelatedAnchor {
    id: Uuid,
    #[serde(default)]
    blogcategories: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
struct RelatedRequest {
    blog: RelatedAnchor,
    limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct BlogSearchRequest {
    blogcategory: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// `POST /api/admin/blog` — multipart article creation.
///
/// The article row, its categories and its tags are written in that order
/// inside one transaction.
async fn create_blog(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = read_form(multipart).await?;

    let title = form.remove("title").unwrap_or_default().trim().to_string();
    let body = form.remove("body").unwrap_or_default();
    let image = form.remove("image").unwrap_or_default().trim().to_string();
    let category_ids = parse_ids("blogcategories", form.get("blogcategories"))?;
    let tag_ids = parse_ids("tags", form.get("tags"))?;
    let slug = slugify(&title);

    let mut v = Validator::default();
    v.required("title", &title, "A title is required")
        .length("title", &title, 3, 160, "Title must be between 3 and 160 characters")
        .check("title", title.is_empty() || !slug.is_empty(), "Title must contain letters or digits")
        .min_length("body", &body, 100, "The article body is too short")
        .not_empty("blogcategories", &category_ids, "At least one category is required")
        .not_empty("tags", &tag_ids, "At least one tag is required")
        .required("image", &image, "An image is required");
    v.finish()?;

    ensure_all_exist(&state.db, &category_ids, &tag_ids).await?;
    if blog::Entity::find()
        .filter(blog::Column::Slug.eq(&slug))
        .one(&state.db)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!("Blog '{slug}' already exists.")));
    }

    let ts = now();
    let new_blog = blog::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        mtitle: ActiveValue::Set(meta_title(&title, &state.config.app_name)),
        title: ActiveValue::Set(title),
        slug: ActiveValue::Set(slug),
        excerpt: ActiveValue::Set(smart_trim(&body, EXCERPT_LENGTH, " ", " ...")),
        mdesc: ActiveValue::Set(strip_html(&take_chars(&body, MDESC_LENGTH))),
        body: ActiveValue::Set(body),
        image: ActiveValue::Set(image),
        posted_by: ActiveValue::Set(AUTHOR.to_string()),
        created_at: ActiveValue::Set(ts),
        updated_at: ActiveValue::Set(ts),
    };

    let txn = state.db.begin().await?;
    let created = new_blog
        .insert(&txn)
        .await
        .map_err(|e| AppError::from_db(e, "Blog"))?;
    replace_categories(&txn, created.id, &category_ids).await?;
    replace_tags(&txn, created.id, &tag_ids).await?;
    txn.commit().await?;

    tracing::info!(blog = %created.slug, "Blog published");
    Ok(Json(populate_one(&state.db, created).await?))
}

/// `GET /api/blogs`
async fn list_blogs(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let blogs = blog::Entity::find()
        .order_by_desc(blog::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(summaries(&state.db, blogs).await?))
}

/// `GET /api/blogs/total`
async fn total_blogs(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(blog::Entity::find().count(&state.db).await?))
}

/// `POST /api/blogs-categories-tags` — one page of articles plus every category and tag.
async fn list_blogs_categories_tags(
    State(state): State<AppState>,
    body: Option<Json<PageRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let page = body.map(|Json(p)| p).unwrap_or_default();

    let blogs = blog::Entity::find()
        .order_by_desc(blog::Column::CreatedAt)
        .offset(page.skip.unwrap_or(0))
        .limit(page.limit.unwrap_or(10))
        .all(&state.db)
        .await?;
    let blogs = summaries(&state.db, blogs).await?;

    let blogcategories = blog_category::Entity::find()
        .order_by_asc(blog_category::Column::Name)
        .all(&state.db)
        .await?;
    let tags = tag::Entity::find()
        .order_by_asc(tag::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(BlogsCategoriesTags {
        size: blogs.len(),
        blogs,
        blogcategories,
        tags,
    }))
}

/// `GET /api/blog/{slug}`
async fn get_blog(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let found = find_blog(&state.db, &slug).await?;
    Ok(Json(populate_one(&state.db, found).await?))
}

/// `DELETE /api/admin/blog/{slug}`
async fn delete_blog(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let found = find_blog(&state.db, &slug).await?;
    blog::Entity::delete_by_id(found.id).exec(&state.db).await?;

    tracing::info!(blog = %found.slug, "Blog deleted");
    Ok(success())
}

/// `PUT /api/admin/blog/{slug}` — partial multipart update.
///
/// The slug is kept even when the title changes so published links stay valid.
async fn update_blog(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(slug): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let existing = find_blog(&state.db, &slug).await?;
    let mut form = read_form(multipart).await?;

    let title = form.remove("title").map(|t| t.trim().to_string());
    let body = form.remove("body");
    let image = form.remove("image").map(|i| i.trim().to_string());
    let category_ids = form
        .get("blogcategories")
        .map(|raw| parse_ids("blogcategories", Some(raw)))
        .transpose()?;
    let tag_ids = form
        .get("tags")
        .map(|raw| parse_ids("tags", Some(raw)))
        .transpose()?;

    let mut v = Validator::default();
    if let Some(title) = &title {
        v.required("title", title, "A title is required")
            .length("title", title, 3, 160, "Title must be between 3 and 160 characters");
    }
    if let Some(body) = &body {
        v.min_length("body", body, 100, "The article body is too short");
    }
    if let Some(image) = &image {
        v.required("image", image, "An image is required");
    }
    if let Some(ids) = &category_ids {
        v.not_empty("blogcategories", ids, "At least one category is required");
    }
    if let Some(ids) = &tag_ids {
        v.not_empty("tags", ids, "At least one tag is required");
    }
    v.finish()?;

    ensure_all_exist(
        &state.db,
        category_ids.as_deref().unwrap_or_default(),
        tag_ids.as_deref().unwrap_or_default(),
    )
    .await?;

    let id = existing.id;
    let mut active: blog::ActiveModel = existing.into();
    if let Some(title) = title {
        active.mtitle = ActiveValue::Set(meta_title(&title, &state.config.app_name));
        active.title = ActiveValue::Set(title);
    }
    if let Some(body) = body {
        active.excerpt = ActiveValue::Set(smart_trim(&body, EXCERPT_LENGTH, " ", " ..."));
        active.mdesc = ActiveValue::Set(strip_html(&take_chars(&body, MDESC_LENGTH)));
        active.body = ActiveValue::Set(body);
    }
    if let Some(image) = image {
        active.image = ActiveValue::Set(image);
    }
    active.updated_at = ActiveValue::Set(now());

    let txn = state.db.begin().await?;
    let updated = active.update(&txn).await?;
    if let Some(ids) = &category_ids {
        replace_categories(&txn, id, ids).await?;
    }
    if let Some(ids) = &tag_ids {
        replace_tags(&txn, id, ids).await?;
    }
    txn.commit().await?;

    Ok(Json(populate_one(&state.db, updated).await?))
}

/// `POST /api/blog/related` — other articles sharing at least one category.
async fn related_blogs(
    State(state): State<AppState>,
    Json(req): Json<RelatedRequest>,
) -> Result<impl IntoResponse, AppError> {
    let blog_ids: Vec<Uuid> = blog_blog_category::Entity::find()
        .filter(blog_blog_category::Column::BlogCategoryId.is_in(req.blog.blogcategories))
        .filter(blog_blog_category::Column::BlogId.ne(req.blog.id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|link| link.blog_id)
        .collect();

    let related = blog::Entity::find()
        .filter(blog::Column::Id.is_in(blog_ids))
        .order_by_desc(blog::Column::CreatedAt)
        .limit(req.limit.unwrap_or(4))
        .all(&state.db)
        .await?;

    Ok(Json(summaries(&state.db, related).await?))
}

/// `POST /api/blog/search/filters` — `all` or one blog category id.
async fn search_blogs(
    State(state): State<AppState>,
    Json(req): Json<BlogSearchRequest>,
) -> Result<impl IntoResponse, AppError> {
    let choice = req
        .blogcategory
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| AppError::BadRequest("blogcategory is required".to_string()))?;

    let mut query = blog::Entity::find().order_by_desc(blog::Column::CreatedAt);
    if choice != "all" {
        let category_id = Uuid::parse_str(choice)
            .map_err(|_| AppError::BadRequest("blogcategory must be a category id".to_string()))?;
        let blog_ids: Vec<Uuid> = blog_blog_category::Entity::find()
            .filter(blog_blog_category::Column::BlogCategoryId.eq(category_id))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|link| link.blog_id)
            .collect();
        query = query.filter(blog::Column::Id.is_in(blog_ids));
    }

    let found = query.all(&state.db).await?;
    Ok(Json(populate(&state.db, found).await?))
}

// ============================================================================
// Helpers
// ============================================================================

fn meta_title(title: &str, app_name: &str) -> String {
    format!("{title} | {app_name}")
}

/// Collect every text part of a multipart body by field name.
async fn read_form(mut multipart: Multipart) -> Result<HashMap<String, String>, AppError> {
    let mut fields = HashMap::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid form data: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid form field {name}: {e}")))?;
        fields.insert(name, value);
    }
    Ok(fields)
}

/// Parse a comma separated id list, ignoring blanks and duplicates.
fn parse_ids(field: &str, raw: Option<&String>) -> Result<Vec<Uuid>, AppError> {
    let mut ids = raw
        .map(String::as_str)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s)
                .map_err(|_| AppError::BadRequest(format!("{field} contains an invalid id: {s}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

async fn ensure_all_exist(
    db: &DatabaseConnection,
    category_ids: &[Uuid],
    tag_ids: &[Uuid],
) -> Result<(), AppError> {
    if !category_ids.is_empty() {
        let known = blog_category::Entity::find()
            .filter(blog_category::Column::Id.is_in(category_ids.to_vec()))
            .count(db)
            .await?;
        if usize::try_from(known).ok() != Some(category_ids.len()) {
            return Err(AppError::NotFound("Blog category not found".to_string()));
        }
    }
    if !tag_ids.is_empty() {
        let known = tag::Entity::find()
            .filter(tag::Column::Id.is_in(tag_ids.to_vec()))
            .count(db)
            .await?;
        if usize::try_from(known).ok() != Some(tag_ids.len()) {
            return Err(AppError::NotFound("Tag not found".to_string()));
        }
    }
    Ok(())
}

async fn find_blog(db: &DatabaseConnection, slug: &str) -> Result<blog::Model, AppError> {
    blog::Entity::find()
        .filter(blog::Column::Slug.eq(slug.to_lowercase()))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog not found".to_string()))
}

async fn replace_categories<C: ConnectionTrait>(
    conn: &C,
    blog_id: Uuid,
    ids: &[Uuid],
) -> Result<(), DbErr> {
    blog_blog_category::Entity::delete_many()
        .filter(blog_blog_category::Column::BlogId.eq(blog_id))
        .exec(conn)
        .await?;
    if ids.is_empty() {
        return Ok(());
    }
    let links = ids.iter().map(|id| blog_blog_category::ActiveModel {
        blog_id: ActiveValue::Set(blog_id),
        blog_category_id: ActiveValue::Set(*id),
    });
    blog_blog_category::Entity::insert_many(links)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

async fn replace_tags<C: ConnectionTrait>(
    conn: &C,
    blog_id: Uuid,
    ids: &[Uuid],
) -> Result<(), DbErr> {
    blog_tag::Entity::delete_many()
        .filter(blog_tag::Column::BlogId.eq(blog_id))
        .exec(conn)
        .await?;
    if ids.is_empty() {
        return Ok(());
    }
    let links = ids.iter().map(|id| blog_tag::ActiveModel {
        blog_id: ActiveValue::Set(blog_id),
        tag_id: ActiveValue::Set(*id),
    });
    blog_tag::Entity::insert_many(links)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

async fn populate_one(db: &DatabaseConnection, one: blog::Model) -> Result<BlogResponse, AppError> {
    populate(db, vec![one])
        .await?
        .pop()
        .ok_or_else(|| AppError::NotFound("Blog not found".to_string()))
}

async fn summaries(
    db: &DatabaseConnection,
    blogs: Vec<blog::Model>,
) -> Result<Vec<BlogSummary>, DbErr> {
    Ok(populate(db, blogs)
        .await?
        .into_iter()
        .map(BlogSummary::from)
        .collect())
}

/// Attach categories and tags to each blog, preserving order.
async fn populate(
    db: &DatabaseConnection,
    blogs: Vec<blog::Model>,
) -> Result<Vec<BlogResponse>, DbErr> {
    if blogs.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = blogs.iter().map(|b| b.id).collect();

    let mut categories: HashMap<Uuid, Vec<blog_category::Model>> = HashMap::new();
    for (link, found) in blog_blog_category::Entity::find()
        .filter(blog_blog_category::Column::BlogId.is_in(ids.clone()))
        .find_also_related(blog_category::Entity)
        .all(db)
        .await?
    {
        if let Some(c) = found {
            categories.entry(link.blog_id).or_default().push(c);
        }
    }

    let mut tags: HashMap<Uuid, Vec<tag::Model>> = HashMap::new();
    for (link, found) in blog_tag::Entity::find()
        .filter(blog_tag::Column::BlogId.is_in(ids))
        .find_also_related(tag::Entity)
        .all(db)
        .await?
    {
        if let Some(t) = found {
            tags.entry(link.blog_id).or_default().push(t);
        }
    }

    Ok(blogs
        .into_iter()
        .map(|b| BlogResponse {
            blogcategories: categories.remove(&b.id).unwrap_or_default(),
            tags: tags.remove(&b.id).unwrap_or_default(),
            blog: b,
        })
        .collect())
}
