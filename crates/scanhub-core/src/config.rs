//! Configuration resolution for scanhub.
//!
//! Implements layered config resolution:
//! 1. Built-in defaults
//! 2. TOML config file (`server.config.toml`)
//! 3. Environment variables (`SCANHUB_*`, highest priority)

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Config file name looked up when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "server.config.toml";

/// Directories searched, in order, for [`CONFIG_FILE_NAME`].
const CONFIG_SEARCH_DIRS: &[&str] = &[".", "app"];

/// Complete scanhub configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub is_production: bool,
    pub database: DatabaseKind,
    /// Overrides the default log filter when `RUST_LOG` is unset.
    pub log_level: Option<String>,
    pub server: ServerConfig,
    pub db_postgres: PostgresConfig,
    pub db_mongo: MongoConfig,
}

/// Persistence backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum DatabaseKind {
    #[default]
    Postgres,
    Mongo,
    MockDb,
}

impl DatabaseKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mongo => "mongo",
            Self::MockDb => "mockdb",
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "mongo" => Ok(Self::Mongo),
            "mockdb" => Ok(Self::MockDb),
            other => Err(Error::Config(format!(
                "unknown database '{other}' (expected postgres, mongo or mockdb)"
            ))),
        }
    }
}

impl TryFrom<String> for DatabaseKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// PEM certificate chain. TLS is enabled only when both files are set.
    pub certs_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            certs_file: None,
            key_file: None,
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database_name: String,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            database_name: "scanhub".to_string(),
        }
    }
}

impl PostgresConfig {
    pub fn to_dsn(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode=disable",
            self.user, self.password, self.host, self.port, self.database_name
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database_name: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 27017,
            user: "root".to_string(),
            password: String::new(),
            database_name: "scanhub".to_string(),
        }
    }
}

impl MongoConfig {
    pub fn to_dsn(&self) -> String {
        format!(
            "mongodb://{}:{}@{}:{}/?authSource=admin",
            self.user, self.password, self.host, self.port
        )
    }
}

/// Resolve the config file to load.
///
/// An explicit path is returned as is. Otherwise the search directories are
/// probed for [`CONFIG_FILE_NAME`] and `None` means "defaults only".
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    CONFIG_SEARCH_DIRS
        .iter()
        .map(|dir| Path::new(dir).join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Load configuration with layered resolution from the process environment.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Load configuration reading environment overrides through `lookup`.
pub fn load_config_with(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_config_file(path)?,
        None => Config::default(),
    };
    apply_env_overrides(&mut config, lookup)?;
    Ok(config)
}

pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply `SCANHUB_*` overrides on top of `config`.
///
/// Values that fail to parse are reported instead of being ignored.
pub fn apply_env_overrides(
    config: &mut Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(val) = lookup("SCANHUB_IS_PRODUCTION") {
        config.is_production = parse_env("SCANHUB_IS_PRODUCTION", &val)?;
    }
    if let Some(val) = lookup("SCANHUB_DATABASE") {
        config.database = val.parse()?;
    }
    if let Some(val) = lookup("SCANHUB_LOG_LEVEL") {
        config.log_level = Some(val);
    }

    let server = &mut config.server;
    if let Some(val) = lookup("SCANHUB_SERVER_HOST") {
        server.host = val;
    }
    if let Some(val) = lookup("SCANHUB_SERVER_PORT") {
        server.port = parse_env("SCANHUB_SERVER_PORT", &val)?;
    }
    if let Some(val) = lookup("SCANHUB_SERVER_CERTS_FILE") {
        server.certs_file = Some(PathBuf::from(val));
    }
    if let Some(val) = lookup("SCANHUB_SERVER_KEY_FILE") {
        server.key_file = Some(PathBuf::from(val));
    }
    if let Some(val) = lookup("SCANHUB_SERVER_REQUEST_TIMEOUT_SECS") {
        server.request_timeout_secs = Some(parse_env("SCANHUB_SERVER_REQUEST_TIMEOUT_SECS", &val)?);
    }

    let pg = &mut config.db_postgres;
    apply_db_overrides(
        "SCANHUB_POSTGRES",
        &lookup,
        (&mut pg.host, &mut pg.port, &mut pg.user, &mut pg.password, &mut pg.database_name),
    )?;
    let mongo = &mut config.db_mongo;
    apply_db_overrides(
        "SCANHUB_MONGO",
        &lookup,
        (
            &mut mongo.host,
            &mut mongo.port,
            &mut mongo.user,
            &mut mongo.password,
            &mut mongo.database_name,
        ),
    )?;
    Ok(())
}

type DbFields<'a> = (
    &'a mut String,
    &'a mut u16,
    &'a mut String,
    &'a mut String,
    &'a mut String,
);

fn apply_db_overrides(
    prefix: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    (host, port, user, password, database_name): DbFields<'_>,
) -> Result<()> {
    if let Some(val) = lookup(&format!("{prefix}_HOST")) {
        *host = val;
    }
    if let Some(val) = lookup(&format!("{prefix}_PORT")) {
        *port = parse_env(&format!("{prefix}_PORT"), &val)?;
    }
    if let Some(val) = lookup(&format!("{prefix}_USER")) {
        *user = val;
    }
    if let Some(val) = lookup(&format!("{prefix}_PASSWORD")) {
        *password = val;
    }
    if let Some(val) = lookup(&format!("{prefix}_DATABASE_NAME")) {
        *database_name = val;
    }
    Ok(())
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("invalid value '{value}' for {key}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_listen_locally_on_8080_with_postgres() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database, DatabaseKind::Postgres);
        assert!(!config.is_production);
    }

    #[test]
    fn database_kind_parses_case_insensitively() {
        assert_eq!("MockDB".parse::<DatabaseKind>().unwrap(), DatabaseKind::MockDb);
        assert_eq!(" mongo ".parse::<DatabaseKind>().unwrap(), DatabaseKind::Mongo);
        assert!("mysql".parse::<DatabaseKind>().is_err());
        assert_eq!(DatabaseKind::MockDb.to_string(), "mockdb");
    }

    #[test]
    fn file_values_override_defaults() {
        let file = write_config(
            r#"
            is_production = true
            database = "Mongo"

            [server]
            port = 9090

            [db_mongo]
            host = "mongo.internal"
            password = "secret"
            "#,
        );
        let config = load_config_with(Some(file.path()), no_env).unwrap();
        assert!(config.is_production);
        assert_eq!(config.database, DatabaseKind::Mongo);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.db_mongo.host, "mongo.internal");
        assert_eq!(config.db_mongo.port, 27017);
    }

    #[test]
    fn unknown_database_in_file_is_rejected() {
        let file = write_config(r#"database = "sqlite""#);
        let err = load_config_with(Some(file.path()), no_env).unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
        assert!(err.to_string().contains("unknown database 'sqlite'"));
    }

    #[test]
    fn malformed_file_is_a_toml_error() {
        let file = write_config("[server\nport = 9090\n");
        let err = load_config_with(Some(file.path()), no_env).unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = load_config_with(Some(&path), no_env).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn env_overrides_beat_file_values() {
        let file = write_config("[server]\nport = 9090\n");
        let env = env_of(&[
            ("SCANHUB_SERVER_PORT", "7070"),
            ("SCANHUB_DATABASE", "mockdb"),
            ("SCANHUB_POSTGRES_PASSWORD", "hunter2"),
            ("SCANHUB_IS_PRODUCTION", "true"),
        ]);
        let config = load_config_with(Some(file.path()), env).unwrap();
        assert_eq!(config.server.port, 7070);
        assert_eq!(config.database, DatabaseKind::MockDb);
        assert_eq!(config.db_postgres.password, "hunter2");
        assert!(config.is_production);
    }

    #[test]
    fn invalid_env_value_is_reported() {
        let err = load_config_with(None, env_of(&[("SCANHUB_SERVER_PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("SCANHUB_SERVER_PORT"));
    }

    #[test]
    fn dsns_follow_backend_formats() {
        let pg = PostgresConfig {
            host: "db".to_string(),
            port: 5433,
            user: "scan".to_string(),
            password: "pw".to_string(),
            database_name: "scans".to_string(),
        };
        assert_eq!(pg.to_dsn(), "postgres://scan:pw@db:5433/scans?sslmode=disable");

        let mongo = MongoConfig {
            host: "mongo".to_string(),
            ..MongoConfig::default()
        };
        assert_eq!(mongo.to_dsn(), "mongodb://root:@mongo:27017/?authSource=admin");
    }

    #[test]
    fn explicit_path_wins_resolution() {
        let path = Path::new("/etc/scanhub/server.config.toml");
        assert_eq!(resolve_config_path(Some(path)), Some(path.to_path_buf()));
    }
}
