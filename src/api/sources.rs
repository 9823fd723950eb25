//! Order and user collaborators
//!
//! The store API exposes no order or user endpoints yet. Screens read these
//! collections through `OrderSource` / `UserSource` so a live backend can be
//! plugged in without touching the views.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::api::FetchError;
use crate::models::{Order, OrderLine, User};

#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn list_orders(&self) -> Result<Vec<Order>, FetchError>;
}

#[async_trait]
pub trait UserSource: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, FetchError>;
}

const PLACEHOLDER_IMAGE: &str = "/placeholder.svg?height=40&width=40";

/// Static reference orders
#[derive(Debug, Clone, Default)]
pub struct FixtureOrders;

/// Static reference users
#[derive(Debug, Clone, Default)]
pub struct FixtureUsers;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn line(name: &str, size: &str, quantity: u32) -> OrderLine {
    OrderLine {
        name: name.to_string(),
        size: size.to_string(),
        quantity,
        image: PLACEHOLDER_IMAGE.to_string(),
    }
}

impl FixtureOrders {
    pub fn orders() -> Vec<Order> {
        vec![
            Order {
                id: "ORD-001".to_string(),
                customer_name: "John Doe".to_string(),
                customer_email: "john.doe@example.com".to_string(),
                lines: vec![line("Air Jordan 1", "42", 1), line("Nike Air Max 90", "41", 1)],
                total: 329.98,
                created_at: date(2025, 4, 25),
            },
            Order {
                id: "ORD-002".to_string(),
                customer_name: "Jane Smith".to_string(),
                customer_email: "jane.smith@example.com".to_string(),
                lines: vec![line("Yeezy Boost 350", "39", 1)],
                total: 249.99,
                created_at: date(2025, 4, 26),
            },
            Order {
                id: "ORD-003".to_string(),
                customer_name: "Mike Johnson".to_string(),
                customer_email: "mike.johnson@example.com".to_string(),
                lines: vec![line("Air Jordan 1", "43", 1), line("Yeezy Boost 350", "41", 2)],
                total: 699.97,
                created_at: date(2025, 4, 27),
            },
        ]
    }
}

impl FixtureUsers {
    pub fn users() -> Vec<User> {
        [
            ("1", "John Doe", "john.doe@example.com", date(2025, 1, 15)),
            ("2", "Jane Smith", "jane.smith@example.com", date(2025, 2, 20)),
            ("3", "Mike Johnson", "mike.johnson@example.com", date(2025, 3, 10)),
            ("4", "Sarah Williams", "sarah.williams@example.com", date(2025, 4, 5)),
        ]
        .into_iter()
        .map(|(id, name, email, registered_at)| User {
            id: id.to_string(),
            avatar: PLACEHOLDER_IMAGE.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            registered_at,
        })
        .collect()
    }
}

#[async_trait]
impl OrderSource for FixtureOrders {
    async fn list_orders(&self) -> Result<Vec<Order>, FetchError> {
        Ok(Self::orders())
    }
}

#[async_trait]
impl UserSource for FixtureUsers {
    async fn list_users(&self) -> Result<Vec<User>, FetchError> {
        Ok(Self::users())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixture_sources() {
        let orders = FixtureOrders.list_orders().await.unwrap();
        assert_eq!(orders.len(), 3);
        assert_eq!(orders[2].item_count(), 3);

        let users = FixtureUsers.list_users().await.unwrap();
        assert_eq!(users.len(), 4);
        assert_eq!(users[3].name, "Sarah Williams");
    }

    #[test]
    fn test_fixture_orders_match_wire_shape() {
        let json = serde_json::to_value(FixtureOrders::orders()).unwrap();
        assert_eq!(json[0]["customerName"], "John Doe");
        assert_eq!(json[0]["createdAt"], "2025-04-25");
        assert_eq!(json[0]["products"][1]["size"], "41");
    }
}
