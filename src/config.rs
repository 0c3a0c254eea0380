use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub tunnel: Option<TunnelConfig>,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Connection descriptor for the category database. Always passed
/// explicitly to the connection provider — never read from ambient state.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
}

impl DatabaseConfig {
    /// The same descriptor pointed at a different endpoint. Used to probe
    /// the database through a freshly opened tunnel.
    pub fn with_endpoint(&self, host: &str, port: u16) -> Self {
        DatabaseConfig {
            host: host.to_string(),
            port,
            ..self.clone()
        }
    }
}

fn default_db_port() -> u16 {
    5432
}

/// SSH port-forward settings for reaching the database via a jump host.
#[derive(Debug, Deserialize, Clone)]
pub struct TunnelConfig {
    pub ssh_host: String,
    pub ssh_user: String,
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,
    #[serde(default = "default_local_port")]
    pub local_port: u16,
    pub remote_host: String,
    #[serde(default = "default_db_port")]
    pub remote_port: u16,
}

fn default_ssh_port() -> u16 {
    22
}
fn default_local_port() -> u16 {
    5433
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_sample_output")]
    pub sample_output: PathBuf,
    #[serde(default = "default_sample_limit")]
    pub sample_limit: i64,
    #[serde(default = "default_description")]
    pub description: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            sample_output: default_sample_output(),
            sample_limit: default_sample_limit(),
            description: default_description(),
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("categories_export.json")
}
fn default_sample_output() -> PathBuf {
    PathBuf::from("categories_simple_export.json")
}
fn default_sample_limit() -> i64 {
    50
}
fn default_description() -> String {
    "Complete export of all categories and related data".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.database.host.is_empty() {
        anyhow::bail!("database.host must not be empty");
    }
    if config.database.dbname.is_empty() {
        anyhow::bail!("database.dbname must not be empty");
    }
    if config.export.sample_limit < 1 {
        anyhow::bail!("export.sample_limit must be >= 1");
    }
    if let Some(tunnel) = &config.tunnel {
        if tunnel.local_port == 0 {
            anyhow::bail!("tunnel.local_port must be > 0");
        }
        if tunnel.ssh_host.is_empty() || tunnel.ssh_user.is_empty() {
            anyhow::bail!("tunnel.ssh_host and tunnel.ssh_user must be set");
        }
    }

    Ok(config)
}

/// Rewrite the `[database]` endpoint in a config file to point at a
/// forwarded local port. Used after a tunnel is established so subsequent
/// runs reach the database through it.
pub fn rewrite_database_endpoint(path: &Path, host: &str, port: u16) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut doc: toml::Value =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    let database = doc
        .get_mut("database")
        .and_then(|v| v.as_table_mut())
        .context("config file has no [database] table")?;
    database.insert("host".to_string(), toml::Value::String(host.to_string()));
    database.insert("port".to_string(), toml::Value::Integer(port as i64));

    let rewritten = toml::to_string_pretty(&doc)?;
    std::fs::write(path, rewritten)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    Ok(())
}
