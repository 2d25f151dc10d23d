use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::catalog::BulkInsertMode;
use crate::domain::order::TransitionPolicy;

pub const ENV_PREFIX: &str = "KITCHEN_ORDERS";
const CONFIG_FILE: &str = "kitchen-orders";

/// Main configuration structure for the ordering service
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub metrics: MetricsConfig,
    pub log: LogConfig,
    pub store: StoreConfig,
    pub orders: OrdersConfig,
    pub menu: MenuConfig,
    pub sessions: SessionsConfig,
    /// The `.env` file that was applied before reading the environment
    #[serde(skip)]
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 9090,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Used when RUST_LOG is not set
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info,kitchen_orders=debug".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Scylla,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub scylla: ScyllaConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            scylla: ScyllaConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScyllaConfig {
    pub known_nodes: Vec<String>,
    pub keyspace: String,
    pub replication_factor: u32,
    /// Attempts before startup gives up on the cluster
    pub connect_attempts: u32,
}

impl Default for ScyllaConfig {
    fn default() -> Self {
        Self {
            known_nodes: vec!["127.0.0.1:9042".to_string()],
            keyspace: "kitchen_orders".to_string(),
            replication_factor: 1,
            connect_attempts: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OrdersConfig {
    pub transition_policy: TransitionPolicy,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MenuConfig {
    pub bulk_insert_mode: BulkInsertMode,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionsConfig {
    pub ttl_minutes: i64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self { ttl_minutes: 12 * 60 }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. kitchen-orders.toml in the working directory
    /// 3. Environment variables (KITCHEN_ORDERS__SECTION__KEY)
    pub fn load() -> Result<Self> {
        let env_file = load_env_file(Path::new(".env"))?;

        let mut builder = Config::builder();
        if Path::new(&format!("{}.toml", CONFIG_FILE)).exists() {
            builder = builder.add_source(File::with_name(CONFIG_FILE));
        }

        builder = builder.add_source(environment());

        let mut config: AppConfig = builder.build()?.try_deserialize()?;
        config.env_file = env_file;
        Ok(config)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("store.scylla.known_nodes")
        .try_parsing(true)
}

/// Apply an env file if it exists; runs before logging is set up, so the
/// caller reports the result
fn load_env_file(path: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }
    dotenvy::from_path(path)?;
    Ok(Some(path.to_path_buf()))
}
