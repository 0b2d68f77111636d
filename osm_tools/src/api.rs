use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::de::DeserializeOwned;

use crate::{
    config::OsmConfig,
    data_objects::{LatLng, OsrmResponse, ReverseGeocode, Route},
    OsmApiError,
};

/// Thin client over the two public mapping APIs: Nominatim for reverse geocoding and OSRM for road routing.
///
/// Both APIs are unauthenticated REST endpoints. The client holds no state other than the connection pool,
/// so it is cheap to clone and share.
#[derive(Clone)]
pub struct OsmApi {
    config: OsmConfig,
    client: Arc<Client>,
}

impl OsmApi {
    pub fn new(config: OsmConfig) -> Result<Self, OsmApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        let val =
            HeaderValue::from_str(config.user_agent.as_str()).map_err(|e| OsmApiError::Initialization(e.to_string()))?;
        headers.insert("User-Agent", val);
        let client =
            Client::builder().default_headers(headers).build().map_err(|e| OsmApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, OsmApiError> {
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if !params.is_empty() {
            req = req.query(params);
        }
        let response = req.send().await.map_err(|e| OsmApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| OsmApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| OsmApiError::RestResponseError(e.to_string()))?;
            Err(OsmApiError::QueryError { status, message })
        }
    }

    /// Resolve a coordinate into a human-readable address.
    ///
    /// When the geocoder has no `display_name` for the point, a plain `Lat: .., Lng: ..` label is
    /// returned instead of an error.
    pub async fn reverse_geocode(&self, point: LatLng) -> Result<String, OsmApiError> {
        let url = format!("{}/reverse", self.config.nominatim_url);
        let lat = point.lat.to_string();
        let lng = point.lng.to_string();
        debug!("Reverse geocoding ({lat}, {lng})");
        let result: ReverseGeocode =
            self.rest_query(Method::GET, &url, &[("lat", lat.as_str()), ("lon", lng.as_str()), ("format", "json")]).await?;
        Ok(result.display_name.unwrap_or_else(|| format!("Lat: {}, Lng: {}", point.lat, point.lng)))
    }

    /// Fetch the driving route between two points.
    ///
    /// OSRM wants `lng,lat` pairs on the path and returns GeoJSON `lng,lat` geometry; the returned
    /// [`Route`] has both the distance and the geometry converted to `lat,lng` order.
    pub async fn route(&self, from: LatLng, to: LatLng) -> Result<Route, OsmApiError> {
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}",
            self.config.osrm_url, from.lng, from.lat, to.lng, to.lat
        );
        debug!("Routing ({}, {}) -> ({}, {})", from.lat, from.lng, to.lat, to.lng);
        let response: OsrmResponse =
            self.rest_query(Method::GET, &url, &[("overview", "full"), ("geometries", "geojson")]).await?;
        if response.code != "Ok" {
            return Err(OsmApiError::RoutingRejected(response.code));
        }
        let route = Route::from(response.routes.into_iter().next().ok_or(OsmApiError::NoRouteFound)?);
        info!("Found route of {}", route.distance);
        Ok(route)
    }
}
