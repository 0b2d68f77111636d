use thiserror::Error;

#[derive(Debug, Error)]
pub enum OsmApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("The routing service returned \"{0}\" instead of Ok")]
    RoutingRejected(String),
    #[error("The routing service found no route between the given points")]
    NoRouteFound,
}
