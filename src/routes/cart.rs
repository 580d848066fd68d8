use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension, Json, Router, extract::State, middleware::from_fn_with_state, routing::post,
};
use mongodb::bson::{doc, oid::ObjectId, to_bson};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    auth::{AuthUser, auth_middleware},
    database::users,
    error::AppError,
    models::User,
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/get", post(get_cart))
        .route("/add", post(add_to_cart))
        .route("/remove", post(remove_from_cart))
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartPayload {
    item_id: String,
}

fn increment_item(cart: &mut HashMap<String, u32>, item_id: String) {
    *cart.entry(item_id).or_insert(0) += 1;
}

fn decrement_item(cart: &mut HashMap<String, u32>, item_id: &str) {
    if let Some(quantity) = cart.get_mut(item_id) {
        if *quantity > 0 {
            *quantity -= 1;
        }
    }
}

async fn load_user(state: &AppState, user_id: &str) -> Result<(ObjectId, User), AppError> {
    let oid = ObjectId::parse_str(user_id)?;

    let user = users(&state.db)
        .find_one(doc! { "_id": oid })
        .await?
        .ok_or(AppError::NotFound("user"))?;

    Ok((oid, user))
}

/// Whole-map replace with no concurrency check, the last writer wins.
async fn store_cart(
    state: &AppState,
    oid: ObjectId,
    cart: &HashMap<String, u32>,
) -> Result<(), AppError> {
    users(&state.db)
        .update_one(
            doc! { "_id": oid },
            doc! { "$set": { "cart_data": to_bson(cart)? } },
        )
        .await?;

    Ok(())
}

async fn get_cart(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let (_, user) = load_user(&state, &user_id).await?;

    Ok(Json(json!({ "success": true, "cart_data": user.cart_data })))
}

async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(payload): Json<CartPayload>,
) -> Result<Json<Value>, AppError> {
    let (oid, mut user) = load_user(&state, &user_id).await?;

    increment_item(&mut user.cart_data, payload.item_id);
    store_cart(&state, oid, &user.cart_data).await?;

    Ok(Json(json!({ "success": true, "message": "Added To Cart" })))
}

async fn remove_from_cart(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(payload): Json<CartPayload>,
) -> Result<Json<Value>, AppError> {
    let (oid, mut user) = load_user(&state, &user_id).await?;

    decrement_item(&mut user.cart_data, &payload.item_id);
    store_cart(&state, oid, &user.cart_data).await?;

    Ok(Json(json!({ "success": true, "message": "Removed From Cart" })))
}

#[cfg(test)]
mod tests {
    use super::{decrement_item, increment_item};
    use std::collections::HashMap;

    #[test]
    fn add_creates_then_increments() {
        let mut cart = HashMap::new();

        increment_item(&mut cart, "f1".to_string());
        increment_item(&mut cart, "f1".to_string());

        assert_eq!(cart.get("f1"), Some(&2));
    }

    #[test]
    fn remove_stops_at_zero_and_keeps_the_entry() {
        let mut cart = HashMap::from([("f1".to_string(), 1)]);

        decrement_item(&mut cart, "f1");
        assert_eq!(cart.get("f1"), Some(&0));

        decrement_item(&mut cart, "f1");
        assert_eq!(cart.get("f1"), Some(&0));
    }

    #[test]
    fn remove_of_absent_item_is_a_no_op() {
        let mut cart: HashMap<String, u32> = HashMap::new();

        decrement_item(&mut cart, "ghost");
        assert!(cart.is_empty());
    }
}
