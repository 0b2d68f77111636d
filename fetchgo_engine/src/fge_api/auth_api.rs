use log::*;

use crate::{
    db_types::{AccountKind, Customer, NewCustomer, NewRider, Rider, Role, Roles},
    traits::{AuthApiError, AuthManagement},
};

/// Signup and login flows.
///
/// Passwords are bcrypt-hashed here, at the API boundary; the storage layer only ever sees hashes.
/// Login failures for unknown phone numbers and wrong passwords are deliberately indistinguishable.
pub struct AuthApi<B> {
    db: B,
}

impl<B> AuthApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AuthApi<B>
where B: AuthManagement
{
    pub async fn register_customer(
        &self,
        full_name: &str,
        phone_number: &str,
        password: &str,
    ) -> Result<Customer, AuthApiError> {
        let password_hash = hash_password(password)?;
        let customer = NewCustomer {
            full_name: full_name.trim().to_string(),
            phone_number: phone_number.trim().to_string(),
            password_hash,
        };
        let customer = self.db.insert_customer(customer).await?;
        info!("🔑️ New customer account #{} registered", customer.id);
        Ok(customer)
    }

    pub async fn register_rider(
        &self,
        full_name: &str,
        phone_number: &str,
        plate_number: &str,
        licence_number: &str,
        password: &str,
    ) -> Result<Rider, AuthApiError> {
        let password_hash = hash_password(password)?;
        let rider = NewRider {
            full_name: full_name.trim().to_string(),
            phone_number: phone_number.trim().to_string(),
            plate_number: plate_number.trim().to_string(),
            licence_number: licence_number.trim().to_string(),
            password_hash,
        };
        let rider = self.db.insert_rider(rider).await?;
        info!("🔑️ New rider account #{} registered", rider.id);
        Ok(rider)
    }

    /// Verify a customer's phone number and password. Returns the profile and the full role set
    /// (implied role plus any stored grants).
    pub async fn login_customer(&self, phone_number: &str, password: &str) -> Result<(Customer, Roles), AuthApiError> {
        let (customer, hash) = self
            .db
            .fetch_customer_credentials(phone_number.trim())
            .await?
            .ok_or(AuthApiError::InvalidCredentials)?;
        verify_password(password, &hash)?;
        let roles = self.roles_for(AccountKind::Customer, customer.id).await?;
        debug!("🔑️ Customer #{} logged in with roles {roles:?}", customer.id);
        Ok((customer, roles))
    }

    /// Verify a rider's phone number and password. Returns the profile and the full role set.
    pub async fn login_rider(&self, phone_number: &str, password: &str) -> Result<(Rider, Roles), AuthApiError> {
        let (rider, hash) =
            self.db.fetch_rider_credentials(phone_number.trim()).await?.ok_or(AuthApiError::InvalidCredentials)?;
        verify_password(password, &hash)?;
        let roles = self.roles_for(AccountKind::Rider, rider.id).await?;
        debug!("🔑️ Rider #{} logged in with roles {roles:?}", rider.id);
        Ok((rider, roles))
    }

    pub async fn assign_roles(&self, kind: AccountKind, account_id: i64, roles: &[Role]) -> Result<(), AuthApiError> {
        self.db.assign_roles(kind, account_id, roles).await
    }

    pub async fn remove_roles(&self, kind: AccountKind, account_id: i64, roles: &[Role]) -> Result<u64, AuthApiError> {
        self.db.remove_roles(kind, account_id, roles).await
    }

    async fn roles_for(&self, kind: AccountKind, account_id: i64) -> Result<Roles, AuthApiError> {
        let mut roles = vec![kind.implied_role()];
        let extra = self.db.fetch_extra_roles(kind, account_id).await?;
        roles.extend(extra);
        Ok(roles)
    }
}

fn hash_password(password: &str) -> Result<String, AuthApiError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| AuthApiError::HashError(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<(), AuthApiError> {
    match bcrypt::verify(password, hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(AuthApiError::InvalidCredentials),
        Err(e) => {
            warn!("🔑️ Stored password hash could not be parsed: {e}");
            Err(AuthApiError::InvalidCredentials)
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn password_hashing_round_trip() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash).is_ok());
        assert!(matches!(verify_password("hunter23", &hash), Err(AuthApiError::InvalidCredentials)));
    }

    #[test]
    fn garbage_hash_is_invalid_credentials() {
        assert!(matches!(verify_password("anything", "not-a-bcrypt-hash"), Err(AuthApiError::InvalidCredentials)));
    }
}
