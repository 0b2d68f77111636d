use fetchgo_engine::db_types::{AccountKind, Customer, Rider, Role, Roles};
use fg_common::{Centavos, Meters};
use osm_tools::{LatLng, Route};
use serde::{Deserialize, Serialize};

//----------------------------------------------  Auth DTOs  ---------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerSignupRequest {
    pub full_name: String,
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RiderSignupRequest {
    pub full_name: String,
    pub phone_number: String,
    pub plate_number: String,
    pub licence_number: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub phone_number: String,
    pub password: String,
    pub kind: AccountKind,
}

/// Issued on signup and login. The profile lets clients show "logged in as" without a second call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub profile: Profile,
}

// Rider first: a rider profile also looks like a customer plus extra fields, so untagged
// deserialization must try the wider shape before the narrower one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Profile {
    Rider(Rider),
    Customer(Customer),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdateRequest {
    pub kind: AccountKind,
    pub account_id: i64,
    #[serde(default)]
    pub apply: Roles,
    #[serde(default)]
    pub revoke: Roles,
}

impl RoleUpdateRequest {
    /// Only the elevated roles may be granted or revoked; the implied ones come from the account kind.
    pub fn grantable(&self) -> bool {
        self.apply.iter().chain(self.revoke.iter()).all(|r| matches!(r, Role::ReadAll | Role::SuperAdmin))
    }
}

//----------------------------------------------  Order DTOs  --------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    pub pickup: LatLng,
    pub destination: LatLng,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteResult {
    pub pickup_address: String,
    pub destination_address: String,
    pub distance: Meters,
    pub price: Centavos,
    pub route: Route,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderRequest {
    pub pickup: LatLng,
    pub destination: LatLng,
    pub delivery_details: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDetailsRequest {
    pub delivery_details: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryListQuery {
    pub status: Option<fetchgo_engine::db_types::OrderStatus>,
}

//----------------------------------------------  Chat DTOs  ---------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}
