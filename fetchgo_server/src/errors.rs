use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use fetchgo_engine::{AccountApiError, AuthApiError, ChatApiError, OrderFlowError};
use osm_tools::OsmApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Order flow error. {0}")]
    OrderFlow(#[from] OrderFlowError),
    #[error("Chat error. {0}")]
    Chat(#[from] ChatApiError),
    #[error("The mapping service could not complete the request. {0}")]
    GeoError(#[from] OsmApiError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::PhoneAlreadyRegistered => StatusCode::CONFLICT,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
                AuthError::CouldNotSignToken(_) => StatusCode::INTERNAL_SERVER_ERROR,
                AuthError::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::OrderFlow(e) => match e {
                OrderFlowError::OrderNotFound(_) => StatusCode::NOT_FOUND,
                OrderFlowError::OrderAlreadyTaken(_) => StatusCode::CONFLICT,
                OrderFlowError::IllegalTransition { .. } => StatusCode::CONFLICT,
                OrderFlowError::NotAssignedRider(_) => StatusCode::FORBIDDEN,
                OrderFlowError::EmptyDeliveryDetails => StatusCode::BAD_REQUEST,
                OrderFlowError::OrderAlreadyExists(_) => StatusCode::CONFLICT,
                OrderFlowError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                OrderFlowError::AccountError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Chat(e) => match e {
                ChatApiError::OrderDoesNotExist(_) => StatusCode::NOT_FOUND,
                ChatApiError::ChatNotOpen(_) => StatusCode::CONFLICT,
                ChatApiError::NotAParticipant(_) => StatusCode::FORBIDDEN,
                ChatApiError::EmptyMessage => StatusCode::BAD_REQUEST,
                ChatApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::GeoError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token was provided.")]
    MissingToken,
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Invalid phone number or password.")]
    InvalidCredentials,
    #[error("Phone number already registered. Please login instead.")]
    PhoneAlreadyRegistered,
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Could not sign access token. {0}")]
    CouldNotSignToken(String),
    #[error("Authentication backend error. {0}")]
    BackendError(String),
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::InvalidCredentials => Self::AuthenticationError(AuthError::InvalidCredentials),
            AuthApiError::PhoneAlreadyRegistered => Self::AuthenticationError(AuthError::PhoneAlreadyRegistered),
            AuthApiError::HashError(e) => Self::AuthenticationError(AuthError::BackendError(e)),
            AuthApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<AccountApiError> for ServerError {
    fn from(e: AccountApiError) -> Self {
        match e {
            AccountApiError::CustomerNotFound(_) | AccountApiError::RiderNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
            AccountApiError::OrderDoesNotExist(_) => Self::NoRecordFound(e.to_string()),
            AccountApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}
