use bank_wrapped::aggregate::FailurePolicy;
use bank_wrapped::config::{ConfigLoader, WrappedConfig};
use std::fs;
use std::process::Command;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_load_full_config_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
base_url = "https://bank.example.org/api/v3"
per_page = 50
concurrency_level = 3
cutoff_year = 2023
min_request_interval = "100ms"
failure_policy = "abort_all"
webhook_url = "https://hooks.example.org/wrapped"

[retry]
attempts = 1
delay = "1s"

[headers]
Bank-Wrapped = "true"
X-Client = "cli"
"#,
    )?;

    let config = ConfigLoader::with_path(&path).without_env().load().await?;

    assert_eq!(config.base_url, "https://bank.example.org/api/v3");
    assert_eq!(config.per_page, 50);
    assert_eq!(config.concurrency_level, 3);
    assert_eq!(config.effective_cutoff_year(), 2023);
    assert_eq!(config.min_request_interval, Some(Duration::from_millis(100)));
    assert_eq!(config.failure_policy, FailurePolicy::AbortAll);
    assert_eq!(config.retry.attempts, 1);
    assert_eq!(config.retry.delay, Duration::from_secs(1));
    assert_eq!(config.headers.get("X-Client").map(String::as_str), Some("cli"));
    assert_eq!(config.share_base_url, "https://hack.af/wrapped");

    Ok(())
}

#[tokio::test]
async fn test_invalid_values_rejected_together() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "per_page = 0\nconcurrency_level = 0\n")?;

    let err = ConfigLoader::with_path(&path)
        .without_env()
        .load()
        .await
        .unwrap_err()
        .to_string();

    assert!(err.contains("per_page"), "{err}");
    assert!(err.contains("concurrency_level"), "{err}");
    Ok(())
}

#[tokio::test]
async fn test_missing_explicit_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = ConfigLoader::with_path(temp_dir.path().join("nope.toml"))
        .without_env()
        .load()
        .await;
    assert!(result.is_err());
}

#[test]
fn test_cli_prints_effective_config() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("custom.toml");
    fs::write(&path, "per_page = 25\n")?;

    let output = Command::new(env!("CARGO_BIN_EXE_bank-wrapped"))
        .args(["--config", path.to_str().unwrap(), "config"])
        .env_remove("WRAPPED_PER_PAGE")
        .output()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "STDERR: {stderr}");

    let printed: WrappedConfig = toml::from_str(&stdout)?;
    assert_eq!(printed.per_page, 25);
    assert_eq!(printed.base_url, "https://bank.hackclub.com/api/v3");
    Ok(())
}

#[test]
fn test_cli_run_requires_org() -> anyhow::Result<()> {
    let output = Command::new(env!("CARGO_BIN_EXE_bank-wrapped"))
        .args(["run", "--user-id", "usr_abc"])
        .output()?;

    assert!(!output.status.success());
    Ok(())
}
