use std::env;

use chrono::Duration;
use fg_common::{parse_boolean_flag, Secret};
use log::*;
use osm_tools::OsmConfig;
use rand::{distributions::Alphanumeric, Rng};

use crate::errors::ServerError;

const DEFAULT_FG_HOST: &str = "127.0.0.1";
const DEFAULT_FG_PORT: u16 = 8360;
const DEFAULT_TOKEN_EXPIRY: Duration = Duration::hours(24);
const DEFAULT_STALE_ORDER_TIMEOUT: Duration = Duration::hours(48);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// The time before a pending order that nobody has touched is cancelled by the expiry worker.
    pub stale_order_timeout: Duration,
    /// If true, the expiry worker is not started and pending orders never time out.
    pub disable_expiry_worker: bool,
    /// Mapping API endpoints (reverse geocoding and routing).
    pub osm_config: OsmConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_FG_HOST.to_string(),
            port: DEFAULT_FG_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            stale_order_timeout: DEFAULT_STALE_ORDER_TIMEOUT,
            disable_expiry_worker: false,
            osm_config: OsmConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("FG_HOST").ok().unwrap_or_else(|| DEFAULT_FG_HOST.into());
        let port = env::var("FG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for FG_PORT. {e} Using the default, {DEFAULT_FG_PORT}, instead.");
                    DEFAULT_FG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_FG_PORT);
        let database_url = env::var("FG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ FG_DATABASE_URL is not set. Please set it to the URL for the FetchGo database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let stale_order_timeout = env::var("FG_STALE_ORDER_TIMEOUT")
            .map_err(|_| {
                info!(
                    "🪛️ FG_STALE_ORDER_TIMEOUT is not set. Using the default value of {} hrs.",
                    DEFAULT_STALE_ORDER_TIMEOUT.num_hours()
                )
            })
            .and_then(|s| {
                s.parse::<i64>()
                    .map(Duration::hours)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for FG_STALE_ORDER_TIMEOUT. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_STALE_ORDER_TIMEOUT);
        let disable_expiry_worker = parse_boolean_flag(env::var("FG_DISABLE_EXPIRY_WORKER").ok(), false);
        let osm_config = OsmConfig::new_from_env_or_default();
        Self { host, port, database_url, auth, stale_order_timeout, disable_expiry_worker, osm_config }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The secret used to sign and verify access tokens (HS256).
    pub jwt_secret: Secret<String>,
    /// How long an issued access token stays valid. Tokens do not refresh.
    pub token_expiry: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT signing secret has not been set. I'm using a random value for this session. Every restart \
             will invalidate all existing sessions. DO NOT operate on production like this. Set FG_JWT_SECRET instead. \
             🚨️🚨️🚨️"
        );
        let secret: String = rand::thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect();
        Self { jwt_secret: Secret::new(secret), token_expiry: DEFAULT_TOKEN_EXPIRY }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("FG_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [FG_JWT_SECRET]")))?;
        if secret.len() < 32 {
            return Err(ServerError::ConfigurationError(
                "FG_JWT_SECRET must be at least 32 characters long.".to_string(),
            ));
        }
        let token_expiry = env::var("FG_TOKEN_EXPIRY_HOURS")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for FG_TOKEN_EXPIRY_HOURS. {e}"))
                    .ok()
            })
            .map(Duration::hours)
            .unwrap_or(DEFAULT_TOKEN_EXPIRY);
        Ok(Self { jwt_secret: Secret::new(secret), token_expiry })
    }
}
