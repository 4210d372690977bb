use clap::{Parser, ValueEnum};
use snowlink_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "SNOWLINK_LISTEN_ADDR";
pub const BASE_URL_ENV: &str = "SNOWLINK_BASE_URL";
pub const NODE_ID_ENV: &str = "SNOWLINK_NODE_ID";
pub const EPOCH_MS_ENV: &str = "SNOWLINK_EPOCH_MS";
pub const TTL_SECS_ENV: &str = "SNOWLINK_TTL_SECS";
pub const STORAGE_BACKEND_ENV: &str = "SNOWLINK_STORAGE";
pub const MYSQL_DSN_ENV: &str = "SNOWLINK_MYSQL_DSN";
pub const CACHE_BACKEND_ENV: &str = "SNOWLINK_CACHE";
pub const REDIS_URL_ENV: &str = "SNOWLINK_REDIS_URL";
pub const CACHE_CAPACITY_ENV: &str = "SNOWLINK_CACHE_CAPACITY";
pub const LOG_FORMAT_ENV: &str = "SNOWLINK_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "SNOWLINK_OTLP_ENDPOINT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TTL_SECS: u64 = 7 * 24 * 60 * 60;
/// About a century; keeps `now + ttl` well inside the representable range.
pub const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackendArg {
    #[value(name = "moka")]
    Moka,
    #[value(name = "redis")]
    Redis,
}

impl Display for CacheBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendArg::Moka => write!(f, "moka"),
            CacheBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "snowlink-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Public origin that short URLs are built from.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Snowflake node id, unique per running instance.
    #[arg(
        long,
        env = NODE_ID_ENV,
        value_parser = clap::value_parser!(u16).range(0..=1023)
    )]
    pub node_id: u16,

    /// Snowflake epoch in Unix milliseconds.
    #[arg(long, env = EPOCH_MS_ENV, default_value_t = snowlink_flake::DEFAULT_EPOCH_MS)]
    pub epoch_ms: i64,

    /// Lifetime of new mappings, in seconds.
    #[arg(
        long,
        env = TTL_SECS_ENV,
        default_value_t = DEFAULT_TTL_SECS,
        value_parser = clap::value_parser!(u64).range(1..=MAX_TTL_SECS)
    )]
    pub ttl_secs: u64,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    #[arg(
        long,
        env = CACHE_BACKEND_ENV,
        value_enum,
        default_value_t = CacheBackendArg::Moka
    )]
    pub cache: CacheBackendArg,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("cache", "redis"))]
    pub redis_url: Option<String>,

    /// Maximum number of entries held by the moka cache.
    #[arg(long, env = CACHE_CAPACITY_ENV, default_value_t = DEFAULT_CACHE_CAPACITY)]
    pub cache_capacity: u64,

    #[arg(long, env = LOG_FORMAT_ENV, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// OTLP/gRPC collector endpoint; span export is off when unset.
    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}
