//! Access-token issuing and verification.
//!
//! Tokens are HS256 JWTs carrying the account id, kind, display name and role set. They are issued
//! on signup and login, presented in the `Authorization: Bearer` header, and verified by the
//! [`crate::middleware::JwtMiddlewareFactory`] on every `/api` request.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use chrono::Utc;
use fetchgo_engine::db_types::{AccountKind, Role, Roles};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The account id inside the table named by `kind`.
    pub sub: i64,
    pub kind: AccountKind,
    pub name: String,
    pub roles: Roles,
    /// Expiry as a unix timestamp. Checked by `jsonwebtoken`'s default validation.
    pub exp: i64,
}

impl JwtClaims {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_read_all(&self) -> bool {
        self.has_role(Role::ReadAll) || self.has_role(Role::SuperAdmin)
    }
}

/// Handlers take a `JwtClaims` argument to get at the verified caller identity. The middleware has
/// already done the verification and stashed the claims in the request extensions.
impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req
            .extensions()
            .get::<JwtClaims>()
            .cloned()
            .ok_or(ServerError::AuthenticationError(AuthError::MissingToken));
        ready(claims)
    }
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    expiry: chrono::Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        Self { encoding_key, expiry: config.token_expiry }
    }

    /// Issue a new access token for the given account.
    pub fn issue_token(
        &self,
        account_id: i64,
        kind: AccountKind,
        name: &str,
        roles: Roles,
    ) -> Result<String, AuthError> {
        let claims = JwtClaims {
            sub: account_id,
            kind,
            name: name.to_string(),
            roles,
            exp: (Utc::now() + self.expiry).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::CouldNotSignToken(e.to_string()))?;
        debug!("🔐️ Issued access token for {kind} #{account_id}");
        Ok(token)
    }
}

/// Decode and validate an access token. Expired and tampered tokens are both validation errors.
pub fn decode_access_token(token: &str, config: &AuthConfig) -> Result<JwtClaims, AuthError> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
    let data = decode::<JwtClaims>(token, &decoding_key, &Validation::default())
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;
    Ok(data.claims)
}

#[cfg(test)]
mod test {
    use fg_common::Secret;

    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: Secret::new("test-secret-do-not-use-in-production!!".to_string()),
            token_expiry: chrono::Duration::hours(1),
        }
    }

    #[test]
    fn token_round_trip() {
        let config = test_config();
        let issuer = TokenIssuer::new(&config);
        let token =
            issuer.issue_token(42, AccountKind::Rider, "Ben Cruz", vec![Role::Rider]).expect("Could not issue token");
        let claims = decode_access_token(&token, &config).expect("Could not decode token");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.kind, AccountKind::Rider);
        assert_eq!(claims.name, "Ben Cruz");
        assert_eq!(claims.roles, vec![Role::Rider]);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let config = test_config();
        let issuer = TokenIssuer::new(&config);
        let mut token = issuer.issue_token(42, AccountKind::Customer, "Ana", vec![Role::Customer]).unwrap();
        token.replace_range(token.len() - 5.., "AAAAA");
        assert!(decode_access_token(&token, &config).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = test_config();
        let issuer = TokenIssuer::new(&config);
        let token = issuer.issue_token(42, AccountKind::Customer, "Ana", vec![Role::Customer]).unwrap();
        let other = AuthConfig {
            jwt_secret: Secret::new("a-completely-different-secret-value!!!".to_string()),
            token_expiry: chrono::Duration::hours(1),
        };
        assert!(decode_access_token(&token, &other).is_err());
    }

    #[test]
    fn admin_helper_accepts_either_admin_role() {
        let claims = JwtClaims {
            sub: 1,
            kind: AccountKind::Customer,
            name: "Ops".into(),
            roles: vec![Role::Customer, Role::ReadAll],
            exp: 0,
        };
        assert!(claims.is_read_all());
        assert!(!claims.has_role(Role::SuperAdmin));
    }
}
