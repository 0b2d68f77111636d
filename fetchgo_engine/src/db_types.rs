use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use fg_common::{Centavos, Meters};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(pub String);

//--------------------------------------        Role        ---------------------------------------------------------
/// Authorization roles. `Customer` and `Rider` are implied by the account kind at login; `ReadAll` and
/// `SuperAdmin` are explicit grants stored in the `extra_roles` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Rider,
    ReadAll,
    SuperAdmin,
}

pub type Roles = Vec<Role>;

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Rider => write!(f, "rider"),
            Role::ReadAll => write!(f, "read_all"),
            Role::SuperAdmin => write!(f, "super_admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "rider" => Ok(Self::Rider),
            "read_all" => Ok(Self::ReadAll),
            "super_admin" => Ok(Self::SuperAdmin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------     AccountKind    ---------------------------------------------------------
/// Which of the two identity tables an account lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Customer,
    Rider,
}

impl Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountKind::Customer => write!(f, "customer"),
            AccountKind::Rider => write!(f, "rider"),
        }
    }
}

impl FromStr for AccountKind {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "rider" => Ok(Self::Rider),
            s => Err(ConversionError(format!("Invalid account kind: {s}"))),
        }
    }
}

impl AccountKind {
    pub fn implied_role(&self) -> Role {
        match self {
            AccountKind::Customer => Role::Customer,
            AccountKind::Rider => Role::Rider,
        }
    }
}

//--------------------------------------    OrderStatus     ---------------------------------------------------------
/// The order lifecycle. Stored and serialized in snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Newly placed. No rider has accepted it yet.
    Pending,
    /// A rider has claimed the order but has not picked it up.
    Accepted,
    /// The rider is on the way.
    InProgress,
    /// Dropped off. Terminal.
    Delivered,
    /// Cancelled by the customer, an admin, or the expiry worker. Terminal.
    Cancelled,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Accepted => write!(f, "accepted"),
            OrderStatus::InProgress => write!(f, "in_progress"),
            OrderStatus::Delivered => write!(f, "delivered"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "in_progress" => Ok(Self::InProgress),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl OrderStatus {
    /// True for states no transition can leave.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

//--------------------------------------       OrderId      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Generate a fresh public order id. 12 alphanumerics gives the same "opaque short id" feel as the
    /// original's document ids without leaking row counts.
    pub fn random() -> Self {
        let id: String = rand::thread_rng().sample_iter(&Alphanumeric).take(12).map(char::from).collect();
        Self(id)
    }
}

//--------------------------------------        Place       ---------------------------------------------------------
/// A coordinate with its reverse-geocoded label, as shown to users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

impl Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, {})", self.address, self.lat, self.lng)
    }
}

//--------------------------------------        Order       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub customer_id: i64,
    pub customer_name: String,
    pub rider_id: Option<i64>,
    pub rider_name: Option<String>,
    pub pickup: Place,
    pub destination: Place,
    pub delivery_details: String,
    pub distance: Meters,
    pub price: Centavos,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Whether the given account may take part in this order's chat.
    pub fn is_participant(&self, kind: AccountKind, account_id: i64) -> bool {
        match kind {
            AccountKind::Customer => self.customer_id == account_id,
            AccountKind::Rider => self.rider_id == Some(account_id),
        }
    }
}

// `Place` is flattened into `pickup_*` / `destination_*` columns, so the row mapping is spelled out by hand.
#[cfg(feature = "sqlite")]
impl sqlx::FromRow<'_, sqlx::sqlite::SqliteRow> for Order {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self {
            id: row.try_get("id")?,
            order_id: row.try_get("order_id")?,
            customer_id: row.try_get("customer_id")?,
            customer_name: row.try_get("customer_name")?,
            rider_id: row.try_get("rider_id")?,
            rider_name: row.try_get("rider_name")?,
            pickup: Place {
                lat: row.try_get("pickup_lat")?,
                lng: row.try_get("pickup_lng")?,
                address: row.try_get("pickup_address")?,
            },
            destination: Place {
                lat: row.try_get("destination_lat")?,
                lng: row.try_get("destination_lng")?,
                address: row.try_get("destination_address")?,
            },
            delivery_details: row.try_get("delivery_details")?,
            distance: row.try_get("distance")?,
            price: row.try_get("price")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            accepted_at: row.try_get("accepted_at")?,
            started_at: row.try_get("started_at")?,
            delivered_at: row.try_get("delivered_at")?,
        })
    }
}

//--------------------------------------      NewOrder      ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub customer_id: i64,
    pub customer_name: String,
    pub pickup: Place,
    pub destination: Place,
    pub delivery_details: String,
    pub distance: Meters,
    pub price: Centavos,
}

impl NewOrder {
    pub fn new(
        customer_id: i64,
        customer_name: String,
        pickup: Place,
        destination: Place,
        delivery_details: String,
        distance: Meters,
        price: Centavos,
    ) -> Self {
        Self {
            order_id: OrderId::random(),
            customer_id,
            customer_name,
            pickup,
            destination,
            delivery_details,
            distance,
            price,
        }
    }
}

//--------------------------------------      Customer      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub full_name: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub full_name: String,
    pub phone_number: String,
    pub password_hash: String,
}

//--------------------------------------        Rider       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Rider {
    pub id: i64,
    pub full_name: String,
    pub phone_number: String,
    pub plate_number: String,
    pub licence_number: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRider {
    pub full_name: String,
    pub phone_number: String,
    pub plate_number: String,
    pub licence_number: String,
    pub password_hash: String,
}

//--------------------------------------     ChatMessage    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub order_id: OrderId,
    pub sender_id: i64,
    pub sender_kind: AccountKind,
    pub sender_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub order_id: OrderId,
    pub sender_id: i64,
    pub sender_kind: AccountKind,
    pub sender_name: String,
    pub body: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn order_status_round_trips_in_snake_case() {
        for (status, s) in [
            (OrderStatus::Pending, "pending"),
            (OrderStatus::Accepted, "accepted"),
            (OrderStatus::InProgress, "in_progress"),
            (OrderStatus::Delivered, "delivered"),
            (OrderStatus::Cancelled, "cancelled"),
        ] {
            assert_eq!(status.to_string(), s);
            assert_eq!(s.parse::<OrderStatus>().unwrap(), status);
            assert_eq!(serde_json::to_string(&status).unwrap(), format!("\"{s}\""));
        }
        assert!("paid".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Accepted.is_terminal());
        assert!(!OrderStatus::InProgress.is_terminal());
    }

    #[test]
    fn random_order_ids_are_distinct() {
        let a = OrderId::random();
        let b = OrderId::random();
        assert_eq!(a.as_str().len(), 12);
        assert_ne!(a, b);
    }

    #[test]
    fn chat_participants() {
        let order = sample_order();
        assert!(order.is_participant(AccountKind::Customer, 7));
        assert!(!order.is_participant(AccountKind::Customer, 8));
        assert!(order.is_participant(AccountKind::Rider, 3));
        assert!(!order.is_participant(AccountKind::Rider, 7));
    }

    fn sample_order() -> Order {
        Order {
            id: 1,
            order_id: OrderId("o1".into()),
            customer_id: 7,
            customer_name: "Ana".into(),
            rider_id: Some(3),
            rider_name: Some("Ben".into()),
            pickup: Place { lat: 10.3779, lng: 123.6386, address: "Carcar".into() },
            destination: Place { lat: 10.3812, lng: 123.6401, address: "San Fernando".into() },
            delivery_details: "2 boxes".into(),
            distance: Meters::from(3460),
            price: Centavos::from(3806),
            status: OrderStatus::Accepted,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            accepted_at: Some(Utc::now()),
            started_at: None,
            delivered_at: None,
        }
    }
}
