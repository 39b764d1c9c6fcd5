//! Application settings, read from an optional `settings.toml` and from
//! `TALLY__*` environment variables (e.g. `TALLY__SERVER__PORT=8080`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    /// `tracing` level applied to the workspace crates.
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub database: Database,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            database: Database::Sqlite("tally.db".to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder().add_source(File::with_name("settings").required(false)),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder
            .add_source(
                Environment::with_prefix("TALLY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Settings {
        Settings::from_builder(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
            .unwrap()
    }

    #[test]
    fn empty_file_uses_defaults() {
        let settings = parse("");
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.bind, "127.0.0.1");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(
            settings.server.database,
            Database::Sqlite("tally.db".to_string())
        );
    }

    #[test]
    fn reads_memory_and_sqlite_databases() {
        let settings = parse(
            r#"
            [server]
            port = 8080
            database = "memory"
            "#,
        );
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.database, Database::Memory);

        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            database = { sqlite = "/tmp/ledger.db" }
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        assert_eq!(
            settings.server.database,
            Database::Sqlite("/tmp/ledger.db".to_string())
        );
    }
}
