// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`Config`] struct loaded once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `5000` |
//! | `APP_ENV` | Deployment environment label | `development` |
//! | `DATA_DIR` | Directory holding the embedded database | `./data` |
//! | `JWT_SECRET` | HS256 session token secret | `change-me` |
//! | `JWT_EXPIRATION_SECS` | Session token lifetime | `604800` |
//! | `RPC_URL` | EVM JSON-RPC endpoint | unset (blockchain disabled) |
//! | `CHAIN_ID` | Expected chain id | `11155111` |
//! | `TIPJAR_FACTORY_ADDRESS` | Tip jar registry contract | unset (blockchain disabled) |
//! | `RPC_TIMEOUT_SECS` | Timeout applied to each contract read | `10` |
//! | `MAX_FILE_SIZE` | Media upload limit in bytes | `52428800` |
//! | `MAX_THUMBNAIL_SIZE` | Thumbnail upload limit in bytes | `10485760` |
//! | `UPLOAD_DIR` | Directory for uploaded files | `uploads` |
//! | `ALLOWED_ORIGINS` | Comma-separated CORS origins | `http://localhost:3000` |
//! | `NONCE_SWEEP_SECS` | Interval of the expired-nonce reaper | `300` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files enabling HTTPS | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const APP_ENV_ENV: &str = "APP_ENV";

/// Environment variable name for the data directory path.
///
/// The redb database file (`tipjar.redb`) is created inside this directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_EXPIRATION_ENV: &str = "JWT_EXPIRATION_SECS";
pub const RPC_URL_ENV: &str = "RPC_URL";
pub const CHAIN_ID_ENV: &str = "CHAIN_ID";
pub const FACTORY_ADDRESS_ENV: &str = "TIPJAR_FACTORY_ADDRESS";
pub const RPC_TIMEOUT_ENV: &str = "RPC_TIMEOUT_SECS";
pub const MAX_FILE_SIZE_ENV: &str = "MAX_FILE_SIZE";
pub const MAX_THUMBNAIL_SIZE_ENV: &str = "MAX_THUMBNAIL_SIZE";
pub const UPLOAD_DIR_ENV: &str = "UPLOAD_DIR";
pub const ALLOWED_ORIGINS_ENV: &str = "ALLOWED_ORIGINS";
pub const NONCE_SWEEP_ENV: &str = "NONCE_SWEEP_SECS";
pub const TLS_CERT_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Placeholder secret used when `JWT_SECRET` is not set.
pub const DEFAULT_JWT_SECRET: &str = "change-me";

/// Name of the database file inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "tipjar.redb";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("{0} must be set together with {1}")]
    Incomplete(&'static str, &'static str),
}

/// TLS material for serving HTTPS directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Chain access settings. Present only when both the RPC endpoint and the
/// registry address are configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub factory_address: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub environment: String,
    pub data_dir: PathBuf,
    pub jwt_secret: String,
    pub jwt_expiration: Duration,
    pub chain: Option<ChainConfig>,
    pub max_file_size: u64,
    pub max_thumbnail_size: u64,
    pub upload_dir: PathBuf,
    pub allowed_origins: Vec<String>,
    pub nonce_sweep_interval: Duration,
    pub tls: Option<TlsPaths>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 5000,
            environment: "development".to_string(),
            data_dir: PathBuf::from("./data"),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_expiration: Duration::from_secs(7 * 24 * 60 * 60),
            chain: None,
            max_file_size: 52_428_800,
            max_thumbnail_size: 10_485_760,
            upload_dir: PathBuf::from("uploads"),
            allowed_origins: vec!["http://localhost:3000".to_string()],
            nonce_sweep_interval: Duration::from_secs(300),
            tls: None,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let rpc_url = get(RPC_URL_ENV);
        let factory_address = get(FACTORY_ADDRESS_ENV);
        let chain_id = parse_or(&get, CHAIN_ID_ENV, 11_155_111u64)?;
        let rpc_timeout = parse_or(&get, RPC_TIMEOUT_ENV, 10u64)?;
        let chain = match (rpc_url, factory_address) {
            (Some(rpc_url), Some(factory_address)) => Some(ChainConfig {
                rpc_url,
                chain_id,
                factory_address,
                timeout: Duration::from_secs(rpc_timeout),
            }),
            _ => None,
        };

        let tls = match (get(TLS_CERT_ENV), get(TLS_KEY_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Incomplete(TLS_CERT_ENV, TLS_KEY_ENV)),
            (None, Some(_)) => return Err(ConfigError::Incomplete(TLS_KEY_ENV, TLS_CERT_ENV)),
        };

        let allowed_origins = get(ALLOWED_ORIGINS_ENV)
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.allowed_origins);

        Ok(Self {
            host: parse_or(&get, HOST_ENV, defaults.host)?,
            port: parse_or(&get, PORT_ENV, defaults.port)?,
            environment: get(APP_ENV_ENV).unwrap_or(defaults.environment),
            data_dir: get(DATA_DIR_ENV).map(PathBuf::from).unwrap_or(defaults.data_dir),
            jwt_secret: get(JWT_SECRET_ENV).unwrap_or(defaults.jwt_secret),
            jwt_expiration: Duration::from_secs(parse_or(
                &get,
                JWT_EXPIRATION_ENV,
                defaults.jwt_expiration.as_secs(),
            )?),
            chain,
            max_file_size: parse_or(&get, MAX_FILE_SIZE_ENV, defaults.max_file_size)?,
            max_thumbnail_size: parse_or(&get, MAX_THUMBNAIL_SIZE_ENV, defaults.max_thumbnail_size)?,
            upload_dir: get(UPLOAD_DIR_ENV).map(PathBuf::from).unwrap_or(defaults.upload_dir),
            allowed_origins,
            nonce_sweep_interval: Duration::from_secs(parse_or(
                &get,
                NONCE_SWEEP_ENV,
                defaults.nonce_sweep_interval.as_secs(),
            )?),
            tls,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw,
        }),
        None => Ok(default),
    }
}
