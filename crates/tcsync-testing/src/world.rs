//! TestWorld pattern for CLI integration tests.
//!
//! Every world owns a temp directory used as the working directory (so the
//! report lands there) and as the home of its config file. Setting
//! variables inherited from the host are stripped so runs are isolated.

use anyhow::Result;
use assert_cmd::Command;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tcsync_core::Setting;
use tcsync_runtime::REPORT_FILE_NAME;
use tempfile::TempDir;

pub struct TestWorld {
    temp_dir: TempDir,
    config_path: PathBuf,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated test environment with no config file yet.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");

        Self {
            temp_dir,
            config_path,
            env_vars: HashMap::new(),
        }
    }

    /// Write `content` as the config file.
    pub fn with_config(self, content: &str) -> Self {
        std::fs::write(&self.config_path, content).expect("Failed to write config");
        self
    }

    /// Point `--config` at a path that does not exist.
    pub fn with_missing_config(mut self) -> Self {
        self.config_path = self.temp_dir.path().join("missing").join("config.toml");
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    pub fn cwd(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn report_path(&self) -> PathBuf {
        self.cwd().join(REPORT_FILE_NAME)
    }

    pub fn read_report(&self) -> Result<String> {
        Ok(std::fs::read_to_string(self.report_path())?)
    }

    /// Configure a CLI command with this world's directory, config and env.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("--config").arg(&self.config_path);
        cmd.current_dir(self.cwd());

        cmd.env_remove("TCSYNC_CONFIG").env_remove("TIMEZONE_NAME");
        for setting in Setting::REQUIRED {
            cmd.env_remove(setting.name());
        }
        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        cmd
    }

    /// Run the `tcsync` binary with `args` in this world.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("tcsync")
            .map_err(|e| anyhow::anyhow!("Failed to find tcsync binary: {}", e))?;

        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;

        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }
}
