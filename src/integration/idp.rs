use std::env;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    access_secret: String,
    refresh_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_secret: String::from("local-access-secret"),
            refresh_secret: String::from("local-refresh-secret"),
            access_ttl: Duration::from_secs(30 * 60),
            refresh_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

impl Config {
    pub fn new(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn env() -> Option<Self> {
        let access_secret = env::var("JWT_SECRET").ok()?;
        let refresh_secret = env::var("JWT_REFRESH_SECRET").ok()?;
        let defaults = Self::default();

        let access_ttl = env::var("ACCESS_TOKEN_TTL")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.access_ttl);
        let refresh_ttl = env::var("REFRESH_TOKEN_TTL")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.refresh_ttl);

        Some(Self::new(access_secret, refresh_secret, access_ttl, refresh_ttl))
    }

    pub fn access_secret(&self) -> &[u8] {
        self.access_secret.as_bytes()
    }

    pub fn refresh_secret(&self) -> &[u8] {
        self.refresh_secret.as_bytes()
    }

    pub const fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub const fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}
