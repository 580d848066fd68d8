//! Document models for the three collections.
//!
//! Fields deliberately mirror what the frontend sends: loosely-typed ids,
//! a free-form delivery address, and a status that is just a string. The
//! store enforces nothing beyond the unique email index.

use std::collections::HashMap;

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Status every order starts in until an explicit status update.
pub const INITIAL_STATUS: &str = "Food Processing";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    /// Argon2id PHC string, never the plaintext.
    pub password: String,
    /// Food id to quantity. Decrements stop at 0 but keep the entry.
    #[serde(default)]
    pub cart_data: HashMap<String, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Food {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Filename under the upload directory, served at `/images/<name>`.
    pub image: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub amount: f64,
    pub address: serde_json::Value,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "DateTime::now")]
    pub date: DateTime,
    #[serde(default)]
    pub payment: bool,
}

fn default_status() -> String {
    INITIAL_STATUS.to_string()
}

#[cfg(test)]
mod tests {
    use super::{INITIAL_STATUS, Order, User};
    use mongodb::bson::oid::ObjectId;
    use serde_json::json;

    #[test]
    fn order_defaults_status_payment_and_date() {
        let order: Order = serde_json::from_value(json!({
            "_id": ObjectId::new(),
            "user_id": "abc",
            "items": [{ "id": "f1", "name": "Greek Salad", "price": 12.0, "quantity": 2 }],
            "amount": 24.0,
            "address": { "street": "101 Grant St" },
        }))
        .unwrap();

        assert_eq!(order.status, INITIAL_STATUS);
        assert!(!order.payment);
    }

    #[test]
    fn user_cart_defaults_to_empty() {
        let user: User = serde_json::from_value(json!({
            "_id": ObjectId::new(),
            "name": "Alice",
            "email": "alice@example.com",
            "password": "$argon2id$...",
        }))
        .unwrap();

        assert!(user.cart_data.is_empty());
    }

    #[test]
    fn user_keeps_zero_quantity_entries() {
        let user: User = serde_json::from_value(json!({
            "_id": ObjectId::new(),
            "name": "Bob",
            "email": "bob@example.com",
            "password": "$argon2id$...",
            "cart_data": { "f1": 0, "f2": 3 },
        }))
        .unwrap();

        assert_eq!(user.cart_data.get("f1"), Some(&0));
        assert_eq!(user.cart_data.get("f2"), Some(&3));
    }
}
