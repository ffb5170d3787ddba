use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use crate::eval::DEFAULT_K;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "RANKMETRICS_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub eval: EvalConfig,
}

/// Evaluation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EvalConfig {
    /// Cutoff applied to every instance.
    #[serde(default = "default_k")]
    pub k: usize,
    /// Minimum MAPK for the eval run to pass.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            threshold: default_threshold(),
            log_level: default_log_level(),
        }
    }
}

fn default_k() -> usize {
    DEFAULT_K
}

fn default_threshold() -> f64 {
    0.5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in RANKMETRICS_CONFIG environment variable (must exist)
    /// 2. ./config.toml in current directory (built-in defaults if absent)
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(PathBuf::from(path))?,
            Err(_) => {
                let path = PathBuf::from("config.toml");
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    log::debug!("No config.toml found, using defaults");
                    Config::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: PathBuf) -> Result<Self> {
        let config_str = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Apply command-line overrides and re-validate the result.
    pub fn with_overrides(mut self, k: Option<usize>, threshold: Option<f64>) -> Result<Self> {
        if let Some(k) = k {
            self.eval.k = k;
        }
        if let Some(threshold) = threshold {
            self.eval.threshold = threshold;
        }
        self.validate()?;
        Ok(self)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.eval.k == 0 {
            anyhow::bail!("eval.k must be greater than 0");
        }

        if !(0.0..=1.0).contains(&self.eval.threshold) {
            anyhow::bail!("eval.threshold must be between 0.0 and 1.0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn with_config_env(config_path: &str, f: impl FnOnce()) {
        let original = std::env::var(CONFIG_ENV).ok();
        std::env::set_var(CONFIG_ENV, config_path);
        f();
        std::env::remove_var(CONFIG_ENV);
        if let Some(val) = original {
            std::env::set_var(CONFIG_ENV, val);
        }
    }

    #[test]
    fn test_config_load_success() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            "[eval]\nk = 5\nthreshold = 0.8\nlog_level = \"debug\"\n",
        )
        .unwrap();
        with_config_env(config_path.to_str().unwrap(), || {
            let config = Config::load();
            assert!(config.is_ok(), "Config::load() failed: {:?}", config.err());
            let config = config.unwrap();
            assert_eq!(config.eval.k, 5);
            assert_eq!(config.eval.threshold, 0.8);
            assert_eq!(config.eval.log_level, "debug");
        });
    }

    #[test]
    fn test_config_partial_section_uses_defaults() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[eval]\nk = 3\n").unwrap();
        with_config_env(config_path.to_str().unwrap(), || {
            let config = Config::load().unwrap();
            assert_eq!(config.eval.k, 3);
            assert_eq!(config.eval.threshold, 0.5);
            assert_eq!(config.eval.log_level, "info");
        });
    }

    #[test]
    fn test_config_zero_k_rejected() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[eval]\nk = 0\n").unwrap();
        with_config_env(config_path.to_str().unwrap(), || {
            let err = Config::load().unwrap_err();
            assert!(err.to_string().contains("eval.k"));
        });
    }

    #[test]
    fn test_config_threshold_out_of_range() {
        let config = Config {
            eval: EvalConfig {
                threshold: 1.5,
                ..EvalConfig::default()
            },
        };
        assert!(config.validate().is_err());
    }

    /// Restores cwd when dropped (e.g. on panic).
    struct CwdGuard(std::path::PathBuf);
    impl Drop for CwdGuard {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.0);
        }
    }

    fn without_config_env(f: impl FnOnce()) {
        let original = std::env::var(CONFIG_ENV).ok();
        std::env::remove_var(CONFIG_ENV);
        f();
        std::env::remove_var(CONFIG_ENV);
        if let Some(val) = original {
            std::env::set_var(CONFIG_ENV, val);
        }
    }

    #[test]
    fn test_config_missing_default_file_uses_defaults() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let _cwd = CwdGuard(std::env::current_dir().unwrap());
        std::env::set_current_dir(temp_dir.path()).unwrap();
        without_config_env(|| {
            let config = Config::load();
            assert!(config.is_ok(), "Config::load() failed: {:?}", config.err());
            let config = config.unwrap();
            assert_eq!(config.eval.k, DEFAULT_K);
            assert_eq!(config.eval.threshold, 0.5);
            assert_eq!(config.eval.log_level, "info");
        });
    }

    #[test]
    fn test_config_reads_default_file_in_cwd() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("config.toml"), "[eval]\nk = 4\n").unwrap();
        let _cwd = CwdGuard(std::env::current_dir().unwrap());
        std::env::set_current_dir(temp_dir.path()).unwrap();
        without_config_env(|| {
            let config = Config::load().unwrap();
            assert_eq!(config.eval.k, 4);
        });
    }

    #[test]
    fn test_config_loads_from_env_file() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let alt_path = temp_dir.path().join("alt.toml");
        fs::write(&alt_path, "[eval]\nk = 7\nthreshold = 0.9\n").unwrap();
        fs::write(
            temp_dir.path().join(".env"),
            format!("{}={}\n", CONFIG_ENV, alt_path.to_str().unwrap()),
        )
        .unwrap();
        let _cwd = CwdGuard(std::env::current_dir().unwrap());
        std::env::set_current_dir(temp_dir.path()).unwrap();
        without_config_env(|| {
            let config = Config::load();
            assert!(config.is_ok(), "Config should load via .env: {:?}", config.err());
            let config = config.unwrap();
            assert_eq!(config.eval.k, 7);
            assert_eq!(config.eval.threshold, 0.9);
        });
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let config = Config::default().with_overrides(Some(3), Some(0.25)).unwrap();
        assert_eq!(config.eval.k, 3);
        assert_eq!(config.eval.threshold, 0.25);

        let untouched = Config::default().with_overrides(None, None).unwrap();
        assert_eq!(untouched.eval.k, DEFAULT_K);
    }

    #[test]
    fn test_overrides_are_validated() {
        assert!(Config::default().with_overrides(Some(0), None).is_err());
        assert!(Config::default().with_overrides(None, Some(7.0)).is_err());
        assert!(Config::default().with_overrides(None, Some(-0.1)).is_err());
        let err = Config::default()
            .with_overrides(None, Some(f64::NAN))
            .unwrap_err();
        assert!(err.to_string().contains("eval.threshold"));
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        with_config_env("nonexistent.toml", || {
            let config = Config::load();
            assert!(config.is_err());
        });
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.eval.k, DEFAULT_K);
        assert!(config.validate().is_ok());
    }
}
