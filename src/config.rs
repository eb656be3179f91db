// src/config.rs

use std::{env, str::FromStr, time::Duration};

use anyhow::{bail, Context};
use sqlx::postgres::PgConnectOptions;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LATEST_YEAR: i32 = 2023;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 4000;

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    /// Fiscal year served when a request omits `year`.
    pub latest_year: i32,
    pub database: DatabaseConfig,
}

#[derive(Clone)]
pub enum DatabaseTarget {
    Url(String),
    Parts {
        host: String,
        port: u16,
        user: String,
        password: Option<String>,
        name: String,
    },
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub target: DatabaseTarget,
    pub max_connections: u32,
    pub connect_timeout: Duration,
}

impl Config {
    /// Reads `.env.local` / `.env` (if present) and then the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::from_filename(".env.local").ok();
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let latest_year = parse_or(&lookup, "LATEST_YEAR", DEFAULT_LATEST_YEAR)?;

        let target = match lookup("DATABASE_URL").filter(|s| !s.trim().is_empty()) {
            Some(url) => DatabaseTarget::Url(url),
            None => {
                let (Some(user), Some(name)) = (lookup("SQL_USER"), lookup("SQL_NAME")) else {
                    bail!("set DATABASE_URL, or SQL_USER and SQL_NAME (with optional SQL_HOST/SQL_PORT/SQL_PASSWORD)");
                };
                DatabaseTarget::Parts {
                    host: lookup("SQL_HOST").unwrap_or_else(|| "localhost".into()),
                    port: parse_or(&lookup, "SQL_PORT", 5432)?,
                    user,
                    password: lookup("SQL_PASSWORD"),
                    name,
                }
            }
        };

        let database = DatabaseConfig {
            target,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            connect_timeout: Duration::from_millis(parse_or(
                &lookup,
                "DB_CONNECT_TIMEOUT_MS",
                DEFAULT_CONNECT_TIMEOUT_MS,
            )?),
        };

        Ok(Self { port, latest_year, database })
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        let options = match &self.target {
            DatabaseTarget::Url(url) => {
                PgConnectOptions::from_str(url).context("DATABASE_URL is not a valid postgres url")?
            }
            DatabaseTarget::Parts { host, port, user, password, name } => {
                let options = PgConnectOptions::new()
                    .host(host)
                    .port(*port)
                    .username(user)
                    .database(name);
                match password {
                    Some(pw) => options.password(pw),
                    None => options,
                }
            }
        };
        Ok(options)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_url_is_set() {
        let cfg = config_from(&[("DATABASE_URL", "postgres://u:p@db:5432/budget")]).unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.latest_year, DEFAULT_LATEST_YEAR);
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.database.connect_timeout, Duration::from_millis(4000));
        assert!(matches!(cfg.database.target, DatabaseTarget::Url(_)));
    }

    #[test]
    fn url_wins_over_parts() {
        let cfg = config_from(&[
            ("DATABASE_URL", "postgres://u@db/budget"),
            ("SQL_USER", "other"),
            ("SQL_NAME", "other"),
        ])
        .unwrap();
        assert!(matches!(cfg.database.target, DatabaseTarget::Url(ref u) if u.ends_with("/budget")));
    }

    #[test]
    fn parts_are_composed_with_defaults() {
        let cfg = config_from(&[
            ("SQL_USER", "reporter"),
            ("SQL_NAME", "ousd"),
            ("SQL_PASSWORD", "secret"),
            ("LATEST_YEAR", "2022"),
            ("PORT", "3000"),
        ])
        .unwrap();
        assert_eq!(cfg.latest_year, 2022);
        assert_eq!(cfg.port, 3000);
        match &cfg.database.target {
            DatabaseTarget::Parts { host, port, user, password, name } => {
                assert_eq!(host, "localhost");
                assert_eq!(*port, 5432);
                assert_eq!(user, "reporter");
                assert_eq!(password.as_deref(), Some("secret"));
                assert_eq!(name, "ousd");
            }
            DatabaseTarget::Url(_) => panic!("expected composed target"),
        }
        assert!(cfg.database.connect_options().is_ok());
    }

    #[test]
    fn missing_database_settings_is_an_error() {
        assert!(config_from(&[("SQL_USER", "reporter")]).is_err());
        assert!(config_from(&[("DATABASE_URL", "  ")]).is_err());
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = config_from(&[("DATABASE_URL", "postgres://db/x"), ("PORT", "eighty")])
            .err()
            .unwrap();
        assert!(err.to_string().contains("PORT"));
        assert!(config_from(&[("DATABASE_URL", "postgres://db/x"), ("LATEST_YEAR", "20x3")]).is_err());
    }

    #[test]
    fn malformed_url_fails_at_connect_options() {
        let cfg = config_from(&[("DATABASE_URL", "::not-a-url::")]).unwrap();
        assert!(cfg.database.connect_options().is_err());
    }
}
