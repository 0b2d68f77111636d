use thiserror::Error;

use crate::db_types::{AccountKind, Customer, NewCustomer, NewRider, Rider, Role};

/// Signup, credential lookup and role grants.
///
/// Backends store and return bcrypt password hashes; verifying them against a supplied password is
/// the API layer's job, so the trait never sees a plaintext password.
#[allow(async_fn_in_trait)]
pub trait AuthManagement {
    /// Create a customer account. The phone number must not already be registered as a customer.
    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, AuthApiError>;

    /// Create a rider account. The phone number must not already be registered as a rider.
    async fn insert_rider(&self, rider: NewRider) -> Result<Rider, AuthApiError>;

    /// Fetch the customer with the given phone number along with their password hash.
    async fn fetch_customer_credentials(&self, phone_number: &str)
        -> Result<Option<(Customer, String)>, AuthApiError>;

    /// Fetch the rider with the given phone number along with their password hash.
    async fn fetch_rider_credentials(&self, phone_number: &str) -> Result<Option<(Rider, String)>, AuthApiError>;

    /// Roles granted to the account beyond the one implied by its kind.
    async fn fetch_extra_roles(&self, kind: AccountKind, account_id: i64) -> Result<Vec<Role>, AuthApiError>;

    async fn assign_roles(&self, kind: AccountKind, account_id: i64, roles: &[Role]) -> Result<(), AuthApiError>;

    /// Returns the number of grants removed.
    async fn remove_roles(&self, kind: AccountKind, account_id: i64, roles: &[Role]) -> Result<u64, AuthApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Phone number already registered. Please login instead.")]
    PhoneAlreadyRegistered,
    #[error("Invalid phone number or password.")]
    InvalidCredentials,
    #[error("Could not hash the password: {0}")]
    HashError(String),
}

impl From<sqlx::Error> for AuthApiError {
    fn from(e: sqlx::Error) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}
