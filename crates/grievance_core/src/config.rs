//! Runtime configuration read from the environment.

use crate::logging::default_log_level;
use log::info;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "GRIEVANCE_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "GRIEVANCE_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "GRIEVANCE_LOG_DIR";
pub const DEFAULT_DB_FILE_NAME: &str = "grievance_core.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(DB_PATH_ENV).map(PathBuf::from).unwrap_or_else(|| {
            info!("event=config_load module=config status=ok key={DB_PATH_ENV} source=default");
            std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
        });

        Self {
            db_path,
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DB_PATH_ENV, DEFAULT_DB_FILE_NAME, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::path::PathBuf;

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = CoreConfig::from_lookup(|key| match key {
            DB_PATH_ENV => Some("   ".to_string()),
            _ => None,
        });
        assert!(config.db_path.ends_with(DEFAULT_DB_FILE_NAME));
        assert!(config.log_dir.is_none());
        assert!(!config.log_level.is_empty());
    }

    #[test]
    fn explicit_values_win() {
        let config = CoreConfig::from_lookup(|key| match key {
            DB_PATH_ENV => Some("/var/lib/grievance/app.db".to_string()),
            LOG_LEVEL_ENV => Some("warn".to_string()),
            LOG_DIR_ENV => Some("/var/log/grievance".to_string()),
            _ => None,
        });
        assert_eq!(config.db_path, PathBuf::from("/var/lib/grievance/app.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/grievance")));
    }
}
