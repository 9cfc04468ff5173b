use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Environment variables use this prefix with `__` between sections,
/// e.g. `RETREATS__DATABASE__URL`.
pub const ENV_PREFIX: &str = "RETREATS";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub issuer: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    /// Adds `Secure` to the session cookie.
    #[serde(default)]
    pub secure_cookie: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    /// Maximum rows in the admin user and organiser dashboards.
    pub row_limit: i64,
}

impl Settings {
    /// Layers `config/default`, the optional `config/{RETREATS_PROFILE}` file,
    /// `config/local` and finally `RETREATS__*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let profile = std::env::var(format!("{ENV_PREFIX}_PROFILE")).ok();

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.cors_origins", Vec::<String>::new())?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "retreats")?
            .set_default("auth.jwt_secret", "change-me-in-production")?
            .set_default("auth.issuer", "retreats")?
            .set_default("auth.access_token_ttl_secs", 3600)?
            .set_default("auth.refresh_token_ttl_secs", 7 * 24 * 3600)?
            .set_default("auth.secure_cookie", false)?
            .set_default("dashboard.row_limit", 100)?
            .add_source(File::with_name("config/default").required(false));

        if let Some(profile) = profile {
            builder = builder.add_source(File::with_name(&format!("config/{profile}")).required(false));
        }

        let settings: Settings = builder
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        settings.check()?;
        Ok(settings)
    }

    /// Settings for an isolated database, with short-lived tokens and a fixed secret.
    pub fn for_database(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: Vec::new(),
            },
            database: DatabaseSettings {
                url: url.into(),
                name: name.into(),
                max_pool_size: Some(5),
                min_pool_size: None,
            },
            auth: AuthSettings {
                jwt_secret: "local-secret-for-isolated-databases-only".to_string(),
                issuer: "retreats".to_string(),
                access_token_ttl_secs: 900,
                refresh_token_ttl_secs: 3600,
                secure_cookie: false,
            },
            dashboard: DashboardSettings { row_limit: 100 },
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.dashboard.row_limit < 1 {
            return Err(ConfigError::Message(
                "dashboard.row_limit must be at least 1".to_string(),
            ));
        }
        if self.auth.access_token_ttl_secs == 0 || self.auth.refresh_token_ttl_secs == 0 {
            return Err(ConfigError::Message(
                "auth token lifetimes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
