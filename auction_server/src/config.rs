use std::env;

use ah_common::Secret;
use jwt_compact::alg::Hs256Key;
use log::*;
use rand::RngCore;

use crate::errors::ServerError;

const DEFAULT_AH_HOST: &str = "127.0.0.1";
const DEFAULT_AH_PORT: u16 = 4740;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_AH_HOST.to_string(),
            port: DEFAULT_AH_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("AH_HOST").ok().unwrap_or_else(|| DEFAULT_AH_HOST.into());
        let port = env::var("AH_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for AH_PORT. {e} Using the default, {DEFAULT_AH_PORT}, instead.");
                    DEFAULT_AH_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_AH_PORT);
        let database_url = env::var("AH_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ AH_DATABASE_URL is not set. Please set it to the URL for the auction house database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        Self { host, port, database_url, auth }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
/// The secret used to sign and verify HS256 JWT access tokens.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT signing secret has not been set. I'm using a random value for this session. All issued \
             tokens become invalid when the server restarts. Set AH_JWT_SECRET for production use. 🚨️🚨️🚨️"
        );
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let secret = bytes.iter().fold(String::with_capacity(64), |mut s, b| {
            use std::fmt::Write;
            let _ = write!(s, "{b:02x}");
            s
        });
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn new(secret: &str) -> Self {
        Self { jwt_secret: Secret::new(secret.to_string()) }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("AH_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [AH_JWT_SECRET]")))?;
        if secret.len() < 32 {
            return Err(ServerError::ConfigurationError(
                "AH_JWT_SECRET must be at least 32 characters long".to_string(),
            ));
        }
        Ok(Self { jwt_secret: Secret::new(secret) })
    }

    /// The signing/verification key derived from the secret.
    pub fn hs256_key(&self) -> Hs256Key {
        Hs256Key::new(self.jwt_secret.as_bytes())
    }
}
