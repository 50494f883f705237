use super::{get_config_dir, WrappedConfig};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Loads a [`WrappedConfig`] from an optional TOML file plus the environment.
pub struct ConfigLoader {
    path: Option<PathBuf>,
    use_env: bool,
}

impl ConfigLoader {
    /// Use the platform default config file, if it exists.
    pub fn new() -> Self {
        Self {
            path: None,
            use_env: true,
        }
    }

    /// Use an explicit config file; a missing file is an error.
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            use_env: true,
        }
    }

    /// Skip environment overrides.
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    pub async fn load(&self) -> Result<WrappedConfig> {
        let mut config = match &self.path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Self::read_file(path).await?
            }
            None => {
                let default_path = get_config_dir()
                    .map(|dir| dir.join("config.toml"))
                    .ok()
                    .filter(|path| path.exists());
                match default_path {
                    Some(path) => Self::read_file(&path).await?,
                    None => WrappedConfig::default(),
                }
            }
        };

        if self.use_env {
            config.merge_env_vars();
        }

        config.validate()?;
        Ok(config)
    }

    async fn read_file(path: &Path) -> Result<WrappedConfig> {
        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path).await?;
        let config: WrappedConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::FailurePolicy;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
base_url = "http://localhost:8080/api/v3"
per_page = 2
cutoff_year = 2022
min_request_interval = "50ms"
failure_policy = "abort_all"

[retry]
attempts = 3
delay = "10ms"

[headers]
"Bank-Wrapped" = "true"
"X-Client" = "cli"
"#,
        )
        .unwrap();

        let config = ConfigLoader::with_path(&path)
            .without_env()
            .load()
            .await
            .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080/api/v3");
        assert_eq!(config.per_page, 2);
        assert_eq!(config.concurrency_level, 5);
        assert_eq!(config.cutoff_year, Some(2022));
        assert_eq!(config.min_request_interval, Some(Duration::from_millis(50)));
        assert_eq!(config.failure_policy, FailurePolicy::AbortAll);
        assert_eq!(config.retry.attempts, 3);
        assert_eq!(config.retry.delay, Duration::from_millis(10));
        assert_eq!(config.headers.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_explicit_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = ConfigLoader::with_path(temp_dir.path().join("nope.toml"))
            .without_env()
            .load()
            .await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_invalid_values_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "concurrency_level = 0\n").unwrap();

        let result = ConfigLoader::with_path(&path).without_env().load().await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
