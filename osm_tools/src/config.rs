use log::*;

#[derive(Debug, Clone)]
pub struct OsmConfig {
    /// Base url of the Nominatim-compatible reverse geocoding service.
    pub nominatim_url: String,
    /// Base url of the OSRM-compatible routing service.
    pub osrm_url: String,
    /// Value sent in the `User-Agent` header. Nominatim's usage policy requires one.
    pub user_agent: String,
}

impl Default for OsmConfig {
    fn default() -> Self {
        Self {
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            osrm_url: "https://router.project-osrm.org".to_string(),
            user_agent: "fetchgo".to_string(),
        }
    }
}

impl OsmConfig {
    pub fn new_from_env_or_default() -> Self {
        let defaults = OsmConfig::default();
        let nominatim_url = std::env::var("FG_NOMINATIM_URL").unwrap_or_else(|_| {
            info!("FG_NOMINATIM_URL not set, using the public Nominatim instance");
            defaults.nominatim_url
        });
        let osrm_url = std::env::var("FG_OSRM_URL").unwrap_or_else(|_| {
            info!("FG_OSRM_URL not set, using the public OSRM instance");
            defaults.osrm_url
        });
        let user_agent = std::env::var("FG_OSM_USER_AGENT").unwrap_or_else(|_| defaults.user_agent);
        Self { nominatim_url, osrm_url, user_agent }
    }
}
