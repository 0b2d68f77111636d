use fg_common::Meters;
use serde::{Deserialize, Serialize};

//--------------------------------------       LatLng       ---------------------------------------------------------
/// A WGS84 coordinate pair, latitude first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

//--------------------------------------   ReverseGeocode   ---------------------------------------------------------
/// The subset of the Nominatim `/reverse` response we care about.
#[derive(Debug, Clone, Deserialize)]
pub struct ReverseGeocode {
    pub display_name: Option<String>,
}

//--------------------------------------       Route        ---------------------------------------------------------
/// A driving route between two points, as returned by OSRM.
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    /// Road distance along the route.
    pub distance: Meters,
    /// The route line as (lat, lng) pairs, converted from the GeoJSON (lng, lat) order.
    pub geometry: Vec<LatLng>,
}

// -- wire types for the OSRM response --------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OsrmResponse {
    pub code: String,
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OsrmRoute {
    /// Meters, as a float.
    pub distance: f64,
    pub geometry: OsrmGeometry,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OsrmGeometry {
    /// GeoJSON LineString coordinates: [lng, lat] pairs.
    pub coordinates: Vec<[f64; 2]>,
}

impl From<OsrmRoute> for Route {
    fn from(route: OsrmRoute) -> Self {
        let geometry = route.geometry.coordinates.iter().map(|c| LatLng::new(c[1], c[0])).collect();
        Self { distance: Meters::from(route.distance.round() as i64), geometry }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn osrm_response_parses_and_converts() {
        let json = r#"{
            "code": "Ok",
            "routes": [{
                "distance": 3460.4,
                "duration": 420.0,
                "geometry": { "coordinates": [[123.6386, 10.3779], [123.6401, 10.3812]], "type": "LineString" }
            }]
        }"#;
        let response: OsrmResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.code, "Ok");
        let route = Route::from(response.routes.into_iter().next().unwrap());
        assert_eq!(route.distance, Meters::from(3460));
        assert_eq!(route.geometry[0], LatLng::new(10.3779, 123.6386));
    }

    #[test]
    fn error_response_has_no_routes() {
        let json = r#"{ "code": "NoRoute", "message": "Impossible route between points" }"#;
        let response: OsrmResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.code, "NoRoute");
        assert!(response.routes.is_empty());
    }

    #[test]
    fn reverse_geocode_tolerates_missing_display_name() {
        let with: ReverseGeocode = serde_json::from_str(r#"{"display_name": "Carcar City, Cebu"}"#).unwrap();
        assert_eq!(with.display_name.as_deref(), Some("Carcar City, Cebu"));
        let without: ReverseGeocode = serde_json::from_str(r#"{"error": "Unable to geocode"}"#).unwrap();
        assert!(without.display_name.is_none());
    }
}
