use std::env;
use std::str::FromStr;
use std::{fs::File, net::SocketAddr};

use axum::http::HeaderValue;
use dotenv::dotenv;
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode, WriteLogger};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin};

pub mod db;
pub mod idp;
pub mod storage;
pub mod ws;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Env {
    Local,
    Dev,
    Stage,
    Production,
}

impl Env {
    pub fn addr(&self) -> SocketAddr {
        match self {
            Env::Local => SocketAddr::from(([127, 0, 0, 1], 8000)),
            Env::Dev | Env::Stage | Env::Production => SocketAddr::from(([0, 0, 0, 0], 8000)),
        }
    }

    pub fn allow_origin(&self) -> AllowOrigin {
        match self {
            Env::Local | Env::Dev => AllowOrigin::any(),
            Env::Stage | Env::Production => {
                let origins = env::var("ALLOW_ORIGIN")
                    .expect("ALLOW_ORIGIN must be set")
                    .split(',')
                    .map(HeaderValue::from_str)
                    .map(|r| r.expect("invalid ALLOW_ORIGIN value"))
                    .collect::<Vec<HeaderValue>>();
                AllowOrigin::list(origins)
            }
        }
    }

    pub fn allow_methods(&self) -> AllowMethods {
        AllowMethods::any()
    }

    pub fn allow_headers(&self) -> AllowHeaders {
        AllowHeaders::any()
    }

    const fn requires_secrets(&self) -> bool {
        matches!(self, Env::Stage | Env::Production)
    }
}

impl FromStr for Env {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Env::Local),
            "dev" => Ok(Env::Dev),
            "stg" => Ok(Env::Stage),
            "prod" => Ok(Env::Production),
            other => Err(format!("Invalid environment: {other}")),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub env: Env,

    pub db: db::Config,
    pub idp: idp::Config,
    pub storage: storage::Config,
    pub ws: ws::Config,
}

impl Default for Config {
    fn default() -> Self {
        dotenv().ok();

        init_logger();

        let env = env::var("ENV")
            .map(|env| Env::from_str(&env).unwrap_or_else(|e| panic!("{e}")))
            .unwrap_or(Env::Local);

        let idp = match idp::Config::env() {
            Some(cfg) => cfg,
            None if env.requires_secrets() => panic!("JWT_SECRET and JWT_REFRESH_SECRET must be set"),
            None => idp::Config::default(),
        };

        Self {
            env,
            db: db::Config::env().unwrap_or_default(),
            idp,
            storage: storage::Config::env().unwrap_or_default(),
            ws: ws::Config::env(),
        }
    }
}

#[cfg(test)]
impl Config {
    /// Local config that skips the environment and the logger.
    pub fn test() -> Self {
        Self {
            env: Env::Local,
            db: db::Config::default(),
            idp: idp::Config::default(),
            storage: storage::Config::default(),
            ws: ws::Config::default(),
        }
    }
}

fn init_logger() {
    let rust_log = env::var("RUST_LOG").unwrap_or("info".into());
    let level = LevelFilter::from_str(&rust_log).unwrap_or(LevelFilter::Info);
    let log_file = env::var("SERVICE_NAME")
        .map(|pkg| format!("{pkg}.log"))
        .unwrap_or("service.log".into());

    CombinedLogger::init(vec![
        TermLogger::new(
            level,
            simplelog::Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(
            level,
            simplelog::Config::default(),
            File::create(log_file).expect("Failed to create log file"),
        ),
    ])
    .expect("Failed to initialize logger");
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_parse_env() {
        assert_eq!(Env::from_str("local"), Ok(Env::Local));
        assert_eq!(Env::from_str("stg"), Ok(Env::Stage));
        assert_eq!(Env::from_str("prod"), Ok(Env::Production));
        assert!(Env::from_str("qa").is_err());
    }

    #[test]
    fn should_bind_loopback_only_locally() {
        assert!(Env::Local.addr().ip().is_loopback());
        assert!(Env::Production.addr().ip().is_unspecified());
    }
}
