use serde::Deserialize;
use tracing::warn;

const DEFAULT_JWT_SECRET: &str = "a_long_default_secret_replace_in_prod";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

/// Tuning for the in-memory driver status board.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusConfig {
    /// Entries older than this are hidden from reads.
    pub fresh_secs: u64,
    /// How often the background sweeper drops hidden entries.
    pub sweep_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_clients: u32,
    pub db_idle_ms: u64,
    /// Exact origins allowed by CORS; empty means allow any.
    pub cors_origins: Vec<String>,
    pub jwt: JwtConfig,
    pub status: StatusConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        // DATABASE_URL wins; otherwise compose from the split DB_* vars
        // the deployment scripts set.
        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            format!(
                "postgres://{}:{}@{}:{}/{}",
                std::env::var("DB_USER").unwrap_or_else(|_| "postgres".into()),
                std::env::var("DB_PASSWORD").unwrap_or_default(),
                std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".into()),
                std::env::var("DB_PORT").unwrap_or_else(|_| "5432".into()),
                std::env::var("DB_NAME").unwrap_or_else(|_| "lakbaydb".into()),
            )
        });

        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set; using the built-in default secret");
            DEFAULT_JWT_SECRET.into()
        });

        let jwt = JwtConfig {
            secret,
            ttl_hours: std::env::var("JWT_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(8),
        };

        let status = StatusConfig {
            fresh_secs: std::env::var("STATUS_FRESH_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(120),
            sweep_secs: std::env::var("STATUS_SWEEP_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60),
        };

        let cors_origins = std::env::var("CORS_ORIGIN")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(3000),
            db_max_clients: std::env::var("DB_MAX_CLIENTS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(20),
            db_idle_ms: std::env::var("DB_IDLE_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30_000),
            cors_origins,
            jwt,
            status,
        })
    }
}
