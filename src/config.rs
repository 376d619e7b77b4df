use anyhow::bail;
use serde::Deserialize;

/// Ten years; anything longer is treated as a misconfiguration.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365 * 10;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    /// `None` issues tokens without `exp`; they stay valid until the secret rotates.
    pub ttl_minutes: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "adult-education".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "adult-education-users".into()),
            ttl_minutes: parse_ttl_minutes(std::env::var("JWT_TTL_MINUTES").ok().as_deref())?,
        };
        Ok(Self {
            database_url,
            max_connections,
            jwt,
        })
    }
}

/// Unset or empty means no expiry; otherwise 1..=`MAX_TTL_MINUTES`.
pub fn parse_ttl_minutes(raw: Option<&str>) -> anyhow::Result<Option<i64>> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let minutes: i64 = match raw.parse() {
        Ok(m) => m,
        Err(_) => bail!("JWT_TTL_MINUTES must be an integer, got {raw:?}"),
    };
    if !(1..=MAX_TTL_MINUTES).contains(&minutes) {
        bail!("JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {minutes}");
    }
    Ok(Some(minutes))
}
