//! MongoDB connection and collection handles.
//!
//! One client for the process lifetime, shared through [`crate::state::AppState`].
//! The unique email index is created at startup so duplicate signups lose the
//! race even though handlers also pre-check.

use std::time::Duration;

use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::doc,
    options::{ClientOptions, IndexOptions},
};

use crate::models::{Food, Order, User};

pub async fn init_mongo(mongo_url: &str, db_name: &str) -> Result<Database, mongodb::error::Error> {
    let mut options = ClientOptions::parse(mongo_url).await?;
    options.connect_timeout = Some(Duration::from_secs(5));
    options.server_selection_timeout = Some(Duration::from_secs(5));

    let client = Client::with_options(options)?;
    let db = client.database(db_name);

    ensure_indexes(&db).await?;

    Ok(db)
}

async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let email_unique = IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();

    users(db).create_index(email_unique).await?;

    Ok(())
}

pub fn users(db: &Database) -> Collection<User> {
    db.collection("user")
}

pub fn foods(db: &Database) -> Collection<Food> {
    db.collection("food")
}

pub fn orders(db: &Database) -> Collection<Order> {
    db.collection("order")
}
