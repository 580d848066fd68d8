use std::{collections::HashMap, sync::Arc};

use axum::{Json, Router, extract::State, routing::post};
use mongodb::bson::{doc, oid::ObjectId};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{
    auth::{hash_password, issue_token, verify_password},
    database::users,
    error::AppError,
    models::User,
    state::AppState,
    utils::is_valid_email,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(state)
}

#[derive(Deserialize)]
struct RegisterPayload {
    name: String,
    email: String,
    password: String,
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Json<Value>, AppError> {
    let collection = users(&state.db);

    if collection
        .find_one(doc! { "email": &payload.email })
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest("User already exists".to_string()));
    }

    if !is_valid_email(&payload.email) {
        return Err(AppError::BadRequest(
            "Please enter a valid email".to_string(),
        ));
    }

    if payload.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Please enter a strong password".to_string(),
        ));
    }

    let user = User {
        id: ObjectId::new(),
        name: payload.name,
        email: payload.email,
        password: hash_password(&payload.password)?,
        cart_data: HashMap::new(),
    };

    collection.insert_one(&user).await?;
    info!("Registered {}", user.email);

    let token = issue_token(&user.id.to_hex(), &state.config.jwt_secret)?;

    Ok(Json(json!({ "success": true, "token": token })))
}

#[derive(Deserialize)]
struct LoginPayload {
    email: String,
    password: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<Value>, AppError> {
    let user = users(&state.db)
        .find_one(doc! { "email": &payload.email })
        .await?
        .ok_or_else(|| AppError::BadRequest("User does not exist".to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::BadRequest("Invalid credentials".to_string()));
    }

    let token = issue_token(&user.id.to_hex(), &state.config.jwt_secret)?;

    Ok(Json(json!({ "success": true, "token": token })))
}
