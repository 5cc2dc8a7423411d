use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{envelope, ApiJson};
use crate::{
    auth::{AuthenticatedUser, Role},
    error::{AppError, AppResult},
    models::{NewProperty, Property, PropertyImage},
    schema::{properties, property_images},
    state::AppState,
    utils::json::{classify_nullable, classify_required},
};

#[derive(Deserialize)]
pub struct CreatePropertyRequest {
    pub title: String,
    pub location: String,
    pub price: String,
    pub sqft: Option<String>,
    pub beds: Option<i32>,
    pub baths: Option<i32>,
    pub description: Option<String>,
    #[serde(alias = "image_url")]
    pub primary_image_url: Option<String>,
    pub virtual_tour_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

#[derive(AsChangeset)]
#[diesel(table_name = properties)]
struct UpdatePropertyChangeset {
    title: Option<String>,
    location: Option<String>,
    price: Option<String>,
    sqft: Option<Option<String>>,
    beds: Option<Option<i32>>,
    baths: Option<Option<i32>>,
    description: Option<Option<String>>,
    primary_image_url: Option<Option<String>>,
    virtual_tour_url: Option<Option<String>>,
    featured: Option<bool>,
    updated_at: NaiveDateTime,
}

#[derive(Serialize)]
pub struct PropertyDetail {
    #[serde(flatten)]
    pub property: Property,
    pub images: Vec<PropertyImage>,
}

fn require_text(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

pub async fn list_properties(State(state): State<AppState>) -> AppResult<ApiJson<Vec<Property>>> {
    let mut conn = state.db()?;
    let listings = properties::table
        .order((properties::featured.desc(), properties::created_at.desc()))
        .load::<Property>(&mut conn)?;
    Ok(envelope(listings))
}

pub async fn get_property(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
) -> AppResult<ApiJson<PropertyDetail>> {
    let mut conn = state.db()?;
    let property: Property = properties::table.find(property_id).first(&mut conn)?;
    let images = PropertyImage::belonging_to(&property)
        .order((property_images::display_order.asc(), property_images::created_at.asc()))
        .load::<PropertyImage>(&mut conn)?;
    Ok(envelope(PropertyDetail { property, images }))
}

pub async fn create_property(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreatePropertyRequest>,
) -> AppResult<ApiJson<Property>> {
    user.require(Role::Editor)?;

    let new_property = NewProperty {
        id: Uuid::new_v4(),
        title: require_text(&payload.title, "title")?,
        location: require_text(&payload.location, "location")?,
        price: require_text(&payload.price, "price")?,
        sqft: payload.sqft,
        beds: payload.beds,
        baths: payload.baths,
        description: payload.description,
        primary_image_url: payload.primary_image_url,
        virtual_tour_url: payload.virtual_tour_url,
        featured: payload.featured,
    };

    let mut conn = state.db()?;
    let saved: Property = diesel::insert_into(properties::table)
        .values(&new_property)
        .get_result(&mut conn)?;

    tracing::info!(property_id = %saved.id, title = %saved.title, "property created");
    Ok(envelope(saved))
}

pub async fn update_property(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(property_id): Path<Uuid>,
    Json(body): Json<Value>,
) -> AppResult<ApiJson<Property>> {
    user.require(Role::Editor)?;

    let text = |field: &str| -> AppResult<Option<String>> {
        classify_required::<String>(&body, field)
            .map_err(AppError::bad_request)?
            .map(|value| require_text(&value, field))
            .transpose()
    };
    let nullable_text = |field: &str| -> AppResult<Option<Option<String>>> {
        Ok(classify_nullable::<String>(&body, field)
            .map_err(AppError::bad_request)?
            .into_change())
    };
    let nullable_int = |field: &str| -> AppResult<Option<Option<i32>>> {
        Ok(classify_nullable::<i32>(&body, field)
            .map_err(AppError::bad_request)?
            .into_change())
    };

    let changeset = UpdatePropertyChangeset {
        title: text("title")?,
        location: text("location")?,
        price: text("price")?,
        sqft: nullable_text("sqft")?,
        beds: nullable_int("beds")?,
        baths: nullable_int("baths")?,
        description: nullable_text("description")?,
        primary_image_url: nullable_text("primary_image_url")?,
        virtual_tour_url: nullable_text("virtual_tour_url")?,
        featured: classify_required::<bool>(&body, "featured").map_err(AppError::bad_request)?,
        updated_at: Utc::now().naive_utc(),
    };

    let mut conn = state.db()?;
    let updated: Property = diesel::update(properties::table.find(property_id))
        .set(&changeset)
        .get_result(&mut conn)?;

    tracing::info!(property_id = %updated.id, "property updated");
    Ok(envelope(updated))
}

pub async fn delete_property(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(property_id): Path<Uuid>,
) -> AppResult<ApiJson<Value>> {
    user.require(Role::Editor)?;

    let mut conn = state.db()?;
    let deleted = diesel::delete(properties::table.find(property_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }

    tracing::info!(%property_id, "property deleted");
    Ok(envelope(serde_json::json!({ "id": property_id })))
}
