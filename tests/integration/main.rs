//! Integration tests for awsbastion

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    /// Binary isolated from the user's config and environment
    fn awsbastion(temp: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("awsbastion");
        cmd.arg("--config")
            .arg(temp.join("config.toml"))
            .env_remove("AWSBASTION_CACHE_FILE")
            .env_remove("AWSBASTION_PROFILE")
            .env_remove("AWSBASTION_ROLE_ARN")
            .env_remove("RUST_LOG");
        cmd
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        awsbastion(temp.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("bastion account"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        awsbastion(temp.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("awsbastion"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        awsbastion(temp.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_init_then_show() {
        let temp = TempDir::new().unwrap();
        awsbastion(temp.path())
            .args(["config", "init"])
            .assert()
            .success();
        assert!(temp.path().join("config.toml").exists());

        awsbastion(temp.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[bastion]"));
    }

    #[test]
    fn invalid_config_fails() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.toml"), "[bastion\n").unwrap();

        awsbastion(temp.path())
            .arg("status")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn status_without_cache() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("session.json");

        awsbastion(temp.path())
            .arg("status")
            .arg("--cache-file")
            .arg(&cache)
            .assert()
            .success()
            .stderr(predicate::str::contains("none"));
    }

    #[test]
    fn status_reports_corrupt_cache() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("session.json");
        std::fs::write(&cache, "not json").unwrap();

        awsbastion(temp.path())
            .arg("status")
            .arg("--cache-file")
            .arg(&cache)
            .assert()
            .success()
            .stderr(predicate::str::contains("corrupt"));
    }

    #[test]
    fn status_reads_cache_from_env() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("env-session.json");
        std::fs::write(
            &cache,
            r#"{"AccessKeyId":"ASIAFROMENV","SecretAccessKey":"s","SessionToken":"t"}"#,
        )
        .unwrap();

        awsbastion(temp.path())
            .env("AWSBASTION_CACHE_FILE", &cache)
            .arg("status")
            .assert()
            .success()
            .stderr(predicate::str::contains("ASIAFROMENV"));
    }

    #[test]
    fn purge_removes_cache() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("session.json");
        std::fs::write(&cache, "{}").unwrap();

        awsbastion(temp.path())
            .arg("purge")
            .arg("--cache-file")
            .arg(&cache)
            .assert()
            .success();
        assert!(!cache.exists());

        // Second purge is a no-op
        awsbastion(temp.path())
            .arg("purge")
            .arg("--cache-file")
            .arg(&cache)
            .assert()
            .success();
    }

    #[test]
    fn session_requires_role() {
        let temp = TempDir::new().unwrap();
        awsbastion(temp.path())
            .arg("session")
            .arg("--cache-file")
            .arg(temp.path().join("session.json"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("bastion.role_arn"));
    }
}
