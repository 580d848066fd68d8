use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{
    database::foods,
    error::AppError,
    models::Food,
    state::AppState,
    utils::{delete_image, save_image, timestamped_filename},
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/list", get(list_food))
        .route("/add", post(add_food))
        .route("/remove", post(remove_food))
        .layer(DefaultBodyLimit::max(4 * 1024 * 1024))
        .with_state(state)
}

async fn list_food(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let all: Vec<Food> = foods(&state.db).find(doc! {}).await?.try_collect().await?;

    Ok(Json(json!({ "success": true, "data": all })))
}

async fn add_food(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut name = None;
    let mut description = None;
    let mut price = None;
    let mut category = None;
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name().unwrap_or_default() {
            "name" => name = Some(field.text().await?),
            "description" => description = Some(field.text().await?),
            "price" => {
                price = Some(
                    field
                        .text()
                        .await?
                        .parse::<f64>()
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                )
            }
            "category" => category = Some(field.text().await?),
            "image" => {
                let original = field.file_name().unwrap_or("image").to_string();
                image = Some((original, field.bytes().await?));
            }
            _ => {}
        }
    }

    let (original, bytes) = image.ok_or(AppError::MissingField("image"))?;

    // Field checks come before any write, a rejected food leaves no trace.
    let food = Food {
        id: ObjectId::new(),
        name: name.ok_or(AppError::MissingField("name"))?,
        description: description.ok_or(AppError::MissingField("description"))?,
        price: price.ok_or(AppError::MissingField("price"))?,
        image: timestamped_filename(&original),
        category: category.ok_or(AppError::MissingField("category"))?,
    };

    save_image(&state.config.upload_dir, &food.image, &bytes).await?;
    foods(&state.db).insert_one(&food).await?;
    info!("Added food {}", food.name);

    Ok(Json(json!({ "success": true, "message": "Food Added" })))
}

#[derive(Deserialize)]
struct RemovePayload {
    id: String,
}

async fn remove_food(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RemovePayload>,
) -> Result<Json<Value>, AppError> {
    let oid = ObjectId::parse_str(&payload.id)?;
    let collection = foods(&state.db);

    let food = collection
        .find_one(doc! { "_id": oid })
        .await?
        .ok_or(AppError::NotFound("food"))?;

    delete_image(&state.config.upload_dir, &food.image).await;
    collection.delete_one(doc! { "_id": oid }).await?;
    info!("Removed food {}", food.name);

    Ok(Json(json!({ "success": true, "message": "Food Removed" })))
}
