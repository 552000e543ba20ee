use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect,
    sea_query::{Expr, Func},
};
use serde::{Deserialize, Deserializer, de};
use serde_json::Value;
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

use super::items::populate;
use crate::{
    entities::{Island, ItemType, item, item_rating, item_sub},
    error::AppError,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/search/filters", post(search_filters))
}

#[derive(Debug, Deserialize)]
struct TextQuery {
    #[serde(default)]
    text: String,
    #[serde(default)]
    island_choice: String,
}

/// Search body. Exactly one filter applies: the first one present in field order.
#[derive(Debug, Default, Deserialize)]
struct SearchRequest {
    query: Option<TextQuery>,
    #[serde(default, deserialize_with = "blank_as_none")]
    island: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    category: Option<Uuid>,
    rating: Option<Value>,
    #[serde(default, deserialize_with = "blank_as_none")]
    sub: Option<Uuid>,
    #[serde(default, rename = "type", deserialize_with = "blank_as_none")]
    item_type: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    zone: Option<String>,
}

/// Blank strings count as an absent filter field.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(de::Error::custom),
    }
}

/// The filter picked from a [`SearchRequest`].
#[derive(Debug, PartialEq, Eq)]
enum Filter {
    Text { words: Vec<String>, island: Option<String> },
    Island(Option<String>),
    Category(Uuid),
    Rating(Option<i64>),
    Sub(Uuid),
    Type(Option<ItemType>),
    Zone(Option<Uuid>),
}

#[derive(Debug, FromQueryResult)]
struct ItemAverage {
    item_id: Uuid,
    average: Option<f64>,
}

impl SearchRequest {
    fn into_filter(self) -> Result<Filter, AppError> {
        if let Some(q) = self.query {
            let words = q
                .text
                .split_whitespace()
                .map(|w| w.replace(['%', '_'], "").to_lowercase())
                .filter(|w| !w.is_empty())
                .collect();
            let choice = q.island_choice.trim();
            let island = (!choice.is_empty() && !choice.eq_ignore_ascii_case("all"))
                .then(|| canonical_island(choice));
            return Ok(Filter::Text { words, island });
        }
        if let Some(island) = self.island {
            let island = island.trim();
            return Ok(Filter::Island(
                (island != "allIslands").then(|| canonical_island(island)),
            ));
        }
        if let Some(category) = self.category {
            return Ok(Filter::Category(category));
        }
        let rating = self
            .rating
            .filter(|r| !r.as_str().is_some_and(|s| s.trim().is_empty()));
        if let Some(rating) = rating {
            let bucket = match &rating {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            }
            .ok_or_else(|| AppError::BadRequest("rating must be a number".to_string()))?;
            return Ok(Filter::Rating((bucket != 0).then_some(bucket)));
        }
        if let Some(sub) = self.sub {
            return Ok(Filter::Sub(sub));
        }
        if let Some(kind) = self.item_type {
            if kind.trim().eq_ignore_ascii_case("all") {
                return Ok(Filter::Type(None));
            }
            let kind = ItemType::from_str(&kind)
                .ok_or_else(|| AppError::BadRequest("type must be product or service".to_string()))?;
            return Ok(Filter::Type(Some(kind)));
        }
        if let Some(zone) = self.zone {
            if zone.trim().eq_ignore_ascii_case("allzones") {
                return Ok(Filter::Zone(None));
            }
            let id = Uuid::parse_str(zone.trim())
                .map_err(|_| AppError::BadRequest("zone must be a zone id".to_string()))?;
            return Ok(Filter::Zone(Some(id)));
        }
        Err(AppError::BadRequest("No search filter supplied".to_string()))
    }
}

/// `POST /api/search/filters`
async fn search_filters(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<impl IntoResponse, AppError> {
    let filter = req.into_filter()?;
    tracing::debug!(?filter, "Item search");

    let condition = match filter {
        Filter::Text { words, island } => {
            let mut any_word = Condition::any();
            for word in &words {
                let pattern = format!("%{word}%");
                any_word = any_word
                    .add(Expr::expr(Func::lower(Expr::col(item::Column::Title))).like(&pattern))
                    .add(
                        Expr::expr(Func::lower(Expr::col(item::Column::Description)))
                            .like(&pattern),
                    );
            }
            let mut cond = Condition::all().add(any_word);
            if let Some(island) = island {
                cond = cond.add(item::Column::ZoneIsland.eq(island));
            }
            cond
        }
        Filter::Island(island) => island.map_or_else(Condition::all, |island| {
            Condition::all().add(item::Column::ZoneIsland.eq(island))
        }),
        Filter::Category(id) => Condition::all().add(item::Column::CategoryId.eq(id)),
        Filter::Rating(None) | Filter::Type(None) | Filter::Zone(None) => Condition::all(),
        Filter::Rating(Some(bucket)) => {
            let ids = items_in_rating_bucket(&state.db, bucket).await?;
            Condition::all().add(item::Column::Id.is_in(ids))
        }
        Filter::Sub(id) => {
            let ids: Vec<Uuid> = item_sub::Entity::find()
                .filter(item_sub::Column::SubId.eq(id))
                .all(&state.db)
                .await?
                .into_iter()
                .map(|link| link.item_id)
                .collect();
            Condition::all().add(item::Column::Id.is_in(ids))
        }
        Filter::Type(Some(kind)) => Condition::all().add(item::Column::ItemType.eq(kind.as_str())),
        Filter::Zone(Some(id)) => Condition::all().add(item::Column::ReferenceZoneId.eq(id)),
    };

    let found = item::Entity::find()
        .filter(condition)
        .order_by_desc(item::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(populate(&state.db, found).await?))
}

/// Items whose floored average star equals `bucket`. The average is computed by the database.
async fn items_in_rating_bucket(
    db: &DatabaseConnection,
    bucket: i64,
) -> Result<Vec<Uuid>, AppError> {
    let averages = item_rating::Entity::find()
        .select_only()
        .column(item_rating::Column::ItemId)
        .column_as(Expr::cust("CAST(AVG(star) AS DOUBLE PRECISION)"), "average")
        .group_by(item_rating::Column::ItemId)
        .into_model::<ItemAverage>()
        .all(db)
        .await?;

    Ok(averages
        .into_iter()
        .filter(|a| a.average.is_some_and(|avg| floor_bucket(avg) == bucket))
        .map(|a| a.item_id)
        .collect())
}

/// Legacy spellings map to the stored name; anything else is matched as sent.
fn canonical_island(raw: &str) -> String {
    Island::from_str(raw).map_or_else(|| raw.to_lowercase(), |i| i.as_str().to_string())
}

#[allow(clippy::cast_possible_truncation)]
fn floor_bucket(average: f64) -> i64 {
    average.floor() as i64
}
