use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use futures::TryStreamExt;
use mongodb::bson::{DateTime, doc, oid::ObjectId, to_bson};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{
    auth::{AuthUser, auth_middleware},
    database::{orders, users},
    error::AppError,
    models::{INITIAL_STATUS, Order, OrderItem},
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/place", post(place_order))
        .route("/placecod", post(place_order_cod))
        .route("/userorders", post(user_orders))
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/list", get(list_orders))
        .route("/status", post(update_status))
        .route("/verify", post(verify_order))
        .merge(protected)
        .with_state(state)
}

#[derive(Deserialize)]
struct PlacePayload {
    items: Vec<OrderItem>,
    amount: f64,
    address: Value,
}

async fn create_order(
    state: &AppState,
    user_id: String,
    payload: PlacePayload,
    payment: bool,
) -> Result<Order, AppError> {
    let order = Order {
        id: ObjectId::new(),
        user_id: user_id.clone(),
        items: payload.items,
        amount: payload.amount,
        address: payload.address,
        status: INITIAL_STATUS.to_string(),
        date: DateTime::now(),
        payment,
    };

    orders(&state.db).insert_one(&order).await?;
    clear_cart(state, &user_id).await?;
    info!("Placed order {}", order.id.to_hex());

    Ok(order)
}

async fn clear_cart(state: &AppState, user_id: &str) -> Result<(), AppError> {
    let oid = ObjectId::parse_str(user_id)?;
    let empty: HashMap<String, u32> = HashMap::new();

    users(&state.db)
        .update_one(
            doc! { "_id": oid },
            doc! { "$set": { "cart_data": to_bson(&empty)? } },
        )
        .await?;

    Ok(())
}

async fn place_order(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(payload): Json<PlacePayload>,
) -> Result<Json<Value>, AppError> {
    let order = create_order(&state, user_id, payload, false).await?;

    // No gateway checkout: hand back the verification page the gateway
    // would have redirected to, the /verify callback settles payment.
    let session_url = format!(
        "{}/verify?success=true&orderId={}",
        state.config.frontend_url,
        order.id.to_hex()
    );

    Ok(Json(json!({ "success": true, "session_url": session_url })))
}

async fn place_order_cod(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(payload): Json<PlacePayload>,
) -> Result<Json<Value>, AppError> {
    create_order(&state, user_id, payload, true).await?;

    Ok(Json(json!({ "success": true, "message": "Order Placed" })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyPayload {
    order_id: String,
    success: String,
}

async fn verify_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyPayload>,
) -> Result<Json<Value>, AppError> {
    let oid = ObjectId::parse_str(&payload.order_id)?;
    let collection = orders(&state.db);

    if payload.success == "true" {
        collection
            .update_one(doc! { "_id": oid }, doc! { "$set": { "payment": true } })
            .await?;

        Ok(Json(json!({ "success": true, "message": "Paid" })))
    } else {
        collection.delete_one(doc! { "_id": oid }).await?;

        Ok(Json(json!({ "success": false, "message": "Not Paid" })))
    }
}

async fn user_orders(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let mine: Vec<Order> = orders(&state.db)
        .find(doc! { "user_id": &user_id })
        .await?
        .try_collect()
        .await?;

    Ok(Json(json!({ "success": true, "data": mine })))
}

async fn list_orders(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let all: Vec<Order> = orders(&state.db)
        .find(doc! {})
        .await?
        .try_collect()
        .await?;

    Ok(Json(json!({ "success": true, "data": all })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusPayload {
    order_id: String,
    status: String,
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<Value>, AppError> {
    let oid = ObjectId::parse_str(&payload.order_id)?;

    orders(&state.db)
        .update_one(
            doc! { "_id": oid },
            doc! { "$set": { "status": &payload.status } },
        )
        .await?;

    Ok(Json(json!({ "success": true, "message": "Status Updated" })))
}
