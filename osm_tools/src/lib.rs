mod api;
mod config;
mod error;

mod data_objects;
pub mod helpers;

pub use api::OsmApi;
pub use config::OsmConfig;
pub use data_objects::{LatLng, ReverseGeocode, Route};
pub use error::OsmApiError;
