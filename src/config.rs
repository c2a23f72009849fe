//! Server configuration: environment variables, overridden by command-line flags.
//! Loaded once at startup and read-only afterwards.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_HTTP_PORT: u16 = 7878;

pub const USAGE: &str = "cohort Server\n\nUSAGE:\n  cohort_server [--http-port N] [--bind ADDR] [--users PATH]\n\nOPTIONS:\n  --http-port N   HTTP API port (env: COHORT_HTTP_PORT, default 7878)\n  --bind ADDR     Listen address (env: COHORT_BIND, default 0.0.0.0)\n  --users PATH    JSON array of {id, name} user profiles (env: COHORT_USERS_FILE)\n\nThe token signing secret is read from JWT_SECRET and is required.\n";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingSecret,
    #[error("invalid port '{0}'")]
    InvalidPort(String),
    #[error("invalid bind address '{0}'")]
    InvalidBind(String),
    #[error("flag {0} expects a value")]
    MissingValue(&'static str),
}

#[derive(Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    pub bind: IpAddr,
    pub users_file: Option<PathBuf>,
    jwt_secret: String,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("http_port", &self.http_port)
            .field("bind", &self.bind)
            .field("users_file", &self.users_file)
            .field("jwt_secret", &"<redacted>")
            .finish()
    }
}

fn parse_port(v: &str) -> Result<u16, ConfigError> {
    v.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort(v.to_string()))
}

fn parse_bind(v: &str) -> Result<IpAddr, ConfigError> {
    v.trim().parse::<IpAddr>().map_err(|_| ConfigError::InvalidBind(v.to_string()))
}

fn flag_value<'a>(args: &'a [String], flag: &'static str) -> Result<Option<&'a str>, ConfigError> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag {
            return match args.get(i + 1) {
                Some(v) if !v.starts_with("--") => Ok(Some(v.as_str())),
                _ => Err(ConfigError::MissingValue(flag)),
            };
        }
        i += 1;
    }
    Ok(None)
}

pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| a == "--help" || a == "-h")
}

impl ServerConfig {
    pub fn new<S: Into<String>>(jwt_secret: S) -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            users_file: None,
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Build from the process environment and `std::env::args()`.
    pub fn from_process() -> Result<Self, ConfigError> {
        let env: HashMap<String, String> = std::env::vars().collect();
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&env, &args)
    }

    /// CLI flags override environment variables, which override defaults.
    pub fn from_sources(env: &HashMap<String, String>, args: &[String]) -> Result<Self, ConfigError> {
        let secret = env.get("JWT_SECRET").map(|s| s.trim()).filter(|s| !s.is_empty()).ok_or(ConfigError::MissingSecret)?;
        let mut cfg = Self::new(secret);

        if let Some(v) = env.get("COHORT_HTTP_PORT") { cfg.http_port = parse_port(v)?; }
        if let Some(v) = env.get("COHORT_BIND") { cfg.bind = parse_bind(v)?; }
        if let Some(v) = env.get("COHORT_USERS_FILE").filter(|v| !v.trim().is_empty()) { cfg.users_file = Some(PathBuf::from(v)); }

        if let Some(v) = flag_value(args, "--http-port")? { cfg.http_port = parse_port(v)?; }
        if let Some(v) = flag_value(args, "--bind")? { cfg.bind = parse_bind(v)?; }
        if let Some(v) = flag_value(args, "--users")? { cfg.users_file = Some(PathBuf::from(v)); }
        Ok(cfg)
    }

    pub fn jwt_secret(&self) -> &str { &self.jwt_secret }

    pub fn socket_addr(&self) -> SocketAddr { SocketAddr::new(self.bind, self.http_port) }
}
