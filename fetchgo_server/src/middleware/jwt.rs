//! Access-token verification middleware.
//!
//! Wraps the `/api` scope. Every request must carry `Authorization: Bearer <token>`; the token is
//! verified against the server's signing secret and the decoded [`JwtClaims`] are inserted into the
//! request extensions, where handlers (via `FromRequest`) and the ACL middleware pick them up.

use std::{future::Future, pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error,
    HttpMessage,
};
use futures::future::{ok, Ready};
use log::debug;

use crate::{auth::decode_access_token, config::AuthConfig, errors::AuthError, errors::ServerError};

pub struct JwtMiddlewareFactory {
    auth_config: Rc<AuthConfig>,
}

impl JwtMiddlewareFactory {
    pub fn new(auth_config: AuthConfig) -> Self {
        Self { auth_config: Rc::new(auth_config) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(JwtMiddlewareService { auth_config: Rc::clone(&self.auth_config), service: Rc::new(service) })
    }
}

pub struct JwtMiddlewareService<S> {
    auth_config: Rc<AuthConfig>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let auth_config = Rc::clone(&self.auth_config);
        Box::pin(async move {
            let token = bearer_token(&req).ok_or_else(|| {
                debug!("🔐️ No bearer token on {}", req.path());
                Error::from(ServerError::AuthenticationError(AuthError::MissingToken))
            })?;
            let claims = decode_access_token(&token, &auth_config).map_err(|e| {
                debug!("🔐️ Rejected access token on {}: {e}", req.path());
                Error::from(ServerError::AuthenticationError(e))
            })?;
            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").or_else(|| value.strip_prefix("bearer "))?;
    Some(token.trim().to_string())
}
