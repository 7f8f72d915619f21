use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub report_path: PathBuf,
    pub mark_concurrency: usize,
    pub persist_failure_policy: PersistFailurePolicy,
    pub seed: Option<SeedPaths>,
}

/// What a report run does when some first-order flags fail to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistFailurePolicy {
    /// Finish the report and return the failures alongside the rows.
    Continue,
    /// Fail the report run.
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPaths {
    pub customers_csv: PathBuf,
    pub orders_csv: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let report_path = env_map
            .get("REPORT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/cohort_report.csv"));

        let mark_concurrency = env_map
            .get("MARK_CONCURRENCY")
            .map(|s| s.as_str())
            .unwrap_or("16")
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "MARK_CONCURRENCY".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?;

        let persist_failure_policy = match env_map
            .get("PERSIST_FAILURE_POLICY")
            .map(|s| s.as_str())
            .unwrap_or("continue")
        {
            "continue" => PersistFailurePolicy::Continue,
            "abort" => PersistFailurePolicy::Abort,
            other => {
                return Err(ConfigError::InvalidValue(
                    "PERSIST_FAILURE_POLICY".to_string(),
                    format!("must be continue or abort, got {}", other),
                ))
            }
        };

        let seed = parse_seed_paths_from_map(&env_map)?;

        Ok(Config {
            port,
            database_path,
            report_path,
            mark_concurrency,
            persist_failure_policy,
            seed,
        })
    }
}

/// Seeding needs both files; one without the other is a configuration error.
fn parse_seed_paths_from_map(
    env_map: &HashMap<String, String>,
) -> Result<Option<SeedPaths>, ConfigError> {
    match (
        env_map.get("SEED_CUSTOMERS_CSV"),
        env_map.get("SEED_ORDERS_CSV"),
    ) {
        (Some(customers), Some(orders)) => Ok(Some(SeedPaths {
            customers_csv: PathBuf::from(customers),
            orders_csv: PathBuf::from(orders),
        })),
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::MissingEnv("SEED_ORDERS_CSV".to_string())),
        (None, Some(_)) => Err(ConfigError::MissingEnv("SEED_CUSTOMERS_CSV".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("DATABASE_PATH".to_string(), "/tmp/cohorts.db".to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.report_path, PathBuf::from("data/cohort_report.csv"));
        assert_eq!(config.mark_concurrency, 16);
        assert_eq!(config.persist_failure_policy, PersistFailurePolicy::Continue);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_missing_database_path() {
        let mut env_map = setup_required_env();
        env_map.remove("DATABASE_PATH");
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "DATABASE_PATH"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_zero_mark_concurrency_rejected() {
        let mut env_map = setup_required_env();
        env_map.insert("MARK_CONCURRENCY".to_string(), "0".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "MARK_CONCURRENCY"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_persist_failure_policy() {
        let mut env_map = setup_required_env();
        env_map.insert("PERSIST_FAILURE_POLICY".to_string(), "abort".to_string());
        let config = Config::from_env_map(env_map.clone()).unwrap();
        assert_eq!(config.persist_failure_policy, PersistFailurePolicy::Abort);

        env_map.insert("PERSIST_FAILURE_POLICY".to_string(), "retry".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PERSIST_FAILURE_POLICY"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_seed_paths_require_both_files() {
        let mut env_map = setup_required_env();
        env_map.insert("SEED_CUSTOMERS_CSV".to_string(), "data/customers.csv".to_string());
        match Config::from_env_map(env_map.clone()) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "SEED_ORDERS_CSV"),
            _ => panic!("Expected MissingEnv error"),
        }

        env_map.insert("SEED_ORDERS_CSV".to_string(), "data/orders.csv".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(
            config.seed,
            Some(SeedPaths {
                customers_csv: PathBuf::from("data/customers.csv"),
                orders_csv: PathBuf::from("data/orders.csv"),
            })
        );
    }
}
