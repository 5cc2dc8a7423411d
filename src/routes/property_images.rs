use axum::{
    extract::{Path, Query, State},
    Json,
};
use diesel::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::{envelope, ApiJson};
use crate::{
    auth::{AuthenticatedUser, Role},
    error::{AppError, AppResult},
    models::{NewPropertyImage, PropertyImage},
    schema::property_images,
    state::AppState,
    utils::json::classify_required,
};

#[derive(Deserialize)]
pub struct ImageQuery {
    pub property_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct CreateImageRequest {
    pub property_id: Uuid,
    pub image_url: String,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(AsChangeset)]
#[diesel(table_name = property_images)]
struct UpdateImageChangeset {
    image_url: Option<String>,
    is_primary: Option<bool>,
    display_order: Option<i32>,
}

pub async fn list_images(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> AppResult<ApiJson<Vec<PropertyImage>>> {
    let mut conn = state.db()?;
    let mut select = property_images::table.into_boxed();
    if let Some(property_id) = query.property_id {
        select = select.filter(property_images::property_id.eq(property_id));
    }
    let images = select
        .order((property_images::display_order.asc(), property_images::created_at.asc()))
        .load::<PropertyImage>(&mut conn)?;
    Ok(envelope(images))
}

pub async fn create_image(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateImageRequest>,
) -> AppResult<ApiJson<PropertyImage>> {
    user.require(Role::Editor)?;

    let image_url = payload.image_url.trim();
    if image_url.is_empty() {
        return Err(AppError::bad_request("image_url must not be empty"));
    }

    let new_image = NewPropertyImage {
        id: Uuid::new_v4(),
        property_id: payload.property_id,
        image_url: image_url.to_string(),
        is_primary: payload.is_primary,
        display_order: payload.display_order,
    };

    let mut conn = state.db()?;
    let saved = match diesel::insert_into(property_images::table)
        .values(&new_image)
        .get_result::<PropertyImage>(&mut conn)
    {
        Ok(image) => image,
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::ForeignKeyViolation,
            _,
        )) => return Err(AppError::bad_request("property does not exist")),
        Err(err) => return Err(AppError::from(err)),
    };

    Ok(envelope(saved))
}

pub async fn update_image(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(image_id): Path<Uuid>,
    Json(body): Json<Value>,
) -> AppResult<ApiJson<PropertyImage>> {
    user.require(Role::Editor)?;

    let changeset = UpdateImageChangeset {
        image_url: classify_required(&body, "image_url").map_err(AppError::bad_request)?,
        is_primary: classify_required(&body, "is_primary").map_err(AppError::bad_request)?,
        display_order: classify_required(&body, "display_order").map_err(AppError::bad_request)?,
    };

    let mut conn = state.db()?;
    let unchanged = changeset.image_url.is_none()
        && changeset.is_primary.is_none()
        && changeset.display_order.is_none();
    let updated: PropertyImage = if unchanged {
        property_images::table.find(image_id).first(&mut conn)?
    } else {
        diesel::update(property_images::table.find(image_id))
            .set(&changeset)
            .get_result(&mut conn)?
    };

    Ok(envelope(updated))
}

pub async fn delete_image(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(image_id): Path<Uuid>,
) -> AppResult<ApiJson<Value>> {
    user.require(Role::Editor)?;

    let mut conn = state.db()?;
    let deleted = diesel::delete(property_images::table.find(image_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(envelope(serde_json::json!({ "id": image_id })))
}
