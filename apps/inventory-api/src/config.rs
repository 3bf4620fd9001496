//! Configuration for the Inventory API

use core_config::{AppInfo, FromEnv, app_info, env_parse, server::ServerConfig};
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Application configuration, composed from the shared config pieces
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Apply pending migrations before serving (`RUN_MIGRATIONS`, default true)
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?; // DATABASE_URL is required
        let server = ServerConfig::from_env()?;
        let run_migrations = env_parse("RUN_MIGRATIONS", "true")?;

        Ok(Self {
            app: app_info!(),
            database,
            server,
            environment,
            run_migrations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/inventory")),
                ("RUN_MIGRATIONS", None),
                ("PORT", None),
                ("APP_ENV", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.app.name, "inventory_api");
                assert_eq!(config.database.url(), "postgresql://localhost/inventory");
                assert_eq!(config.server.port, 8080);
                assert!(config.run_migrations);
                assert!(config.environment.is_development());
            },
        );
    }

    #[test]
    fn test_from_env_requires_database_url() {
        temp_env::with_var("DATABASE_URL", None::<&str>, || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("DATABASE_URL"));
        });
    }

    #[test]
    fn test_run_migrations_can_be_disabled() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/inventory")),
                ("RUN_MIGRATIONS", Some("false")),
            ],
            || {
                assert!(!Config::from_env().unwrap().run_migrations);
            },
        );
    }

    #[test]
    fn test_run_migrations_rejects_garbage() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/inventory")),
                ("RUN_MIGRATIONS", Some("sometimes")),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }
}
