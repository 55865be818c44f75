use anyhow::Context;
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub name: String,
    pub password: String,
}

/// Where the pool connects to. A full `DATABASE_URL` wins over the split
/// `DB_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub enum DatabaseTarget {
    Url(String),
    Parts(DbConfig),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseTarget,
    pub max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(&get, "APP_PORT", 8080u16)?;
        let max_connections = parse_or(&get, "DB_MAX_CONNECTIONS", 10u32)?;

        let database = match get("DATABASE_URL").filter(|v| !v.is_empty()) {
            Some(url) => DatabaseTarget::Url(url),
            None => DatabaseTarget::Parts(DbConfig {
                host: get("DB_HOST").unwrap_or_else(|| "localhost".into()),
                port: parse_or(&get, "DB_PORT", 5432u16)?,
                user: get("DB_USER").unwrap_or_default(),
                name: get("DB_NAME").unwrap_or_default(),
                password: get("DB_PASSWORD").unwrap_or_default(),
            }),
        };

        Ok(Self {
            host,
            port,
            database,
            max_connections,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        match &self.database {
            DatabaseTarget::Url(url) => url.parse().context("parse DATABASE_URL"),
            DatabaseTarget::Parts(db) => Ok(PgConnectOptions::new()
                .host(&db.host)
                .port(db.port)
                .username(&db.user)
                .password(&db.password)
                .database(&db.name)),
        }
    }
}

fn parse_or<F, T>(get: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(v) if !v.is_empty() => v.parse::<T>().with_context(|| format!("invalid {key}: {v}")),
        _ => Ok(default),
    }
}
