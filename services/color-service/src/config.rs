//! Command line and environment configuration

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;

use crate::store::{StoreConfig, REDIS_DEFAULT_DB, REDIS_DEFAULT_PORT};

pub const DEFAULT_PORT: u16 = 8000;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Color Service", long_about = None)]
pub struct Cli {
    /// Redis host
    #[arg(long, env = "REDIS_HOST", default_value = "localhost")]
    pub redis_host: String,

    /// Redis port
    #[arg(long, env = "REDIS_PORT", default_value_t = REDIS_DEFAULT_PORT)]
    pub redis_port: u16,

    /// Redis logical database
    #[arg(long, env = "REDIS_DB", default_value_t = REDIS_DEFAULT_DB)]
    pub redis_db: i64,

    /// HTTP port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Backing store
    #[arg(long, value_enum, default_value_t = StoreKind::Redis)]
    pub store: StoreKind,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Redis,
    /// In-process map, for running without Redis
    Memory,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl Cli {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.redis_host.clone())
            .port(self.redis_port)
            .db(self.redis_db)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
