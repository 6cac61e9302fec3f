//! Common test utilities for scriptpack integration tests.
//!
//! Provides `TestEnv`: an isolated site root in a temp directory with
//! helpers to write configs, source scripts, and asset manifests, plus a
//! fake packer and CLI command execution.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Result of running a scriptpack CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

impl From<Output> for TestResult {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// Isolated site root for one test.
///
/// The CLI runs with the temp directory as its working directory, so the
/// default `site.root = "."` resolves against it and the cache lands under
/// `uploads/obfuscated_scripts`.
pub struct TestEnv {
    site_root: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            site_root: TempDir::new().expect("create temp site root"),
        }
    }

    /// Path relative to the site root
    pub fn path(&self, relative: &str) -> PathBuf {
        self.site_root.path().join(relative)
    }

    /// The cache root the default config resolves to
    pub fn cache_root(&self) -> PathBuf {
        self.path("uploads/obfuscated_scripts")
    }

    /// Write a file under the site root, creating parent directories
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Write `scriptpack.toml` in the site root
    pub fn write_config(&self, body: &str) -> PathBuf {
        self.write_file("scriptpack.toml", body)
    }

    /// Write the asset manifest in the site root
    pub fn write_manifest(&self, json: &str) -> PathBuf {
        self.write_file("assets.json", json)
    }

    /// A config body wired to the fake packer
    #[cfg(unix)]
    pub fn standard_config(&self, enable: bool, include: &str) -> String {
        format!(
            r#"
enable = {enable}
include = "{include}"
mode = "62"

[site]
url = "https://example.com"

[packer]
command = "{packer}"
"#,
            packer = self.path("bin/packer.sh").display()
        )
    }

    /// Install a fake packer that wraps stdin in a comment carrying the
    /// encoding level and logs each invocation so tests can count calls.
    #[cfg(unix)]
    pub fn install_packer(&self) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let log = self.path("packer-calls.log");
        let script = format!(
            "#!/bin/sh\necho run >> \"{}\"\nprintf '/*packed:%s*/' \"$1\"\ncat -\n",
            log.display()
        );
        let path = self.write_file("bin/packer.sh", &script);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// How many times the fake packer has run
    pub fn packer_calls(&self) -> usize {
        std::fs::read_to_string(self.path("packer-calls.log"))
            .map(|log| log.lines().count())
            .unwrap_or(0)
    }

    /// Run scriptpack in this environment from the site root
    pub fn run(&self, args: &[&str]) -> TestResult {
        let output = Command::new(env!("CARGO_BIN_EXE_scriptpack"))
            .args(args)
            .current_dir(self.site_root.path())
            .env_remove("SCRIPTPACK_ENABLE")
            .env_remove("SCRIPTPACK_INCLUDE")
            .env_remove("SCRIPTPACK_MODE")
            .env_remove("SCRIPTPACK_SITE_URL")
            .env_remove("SCRIPTPACK_SITE_ROOT")
            .env_remove("SCRIPTPACK_PACKER_COMMAND")
            .output()
            .expect("failed to run scriptpack");

        TestResult::from(output)
    }

    /// Run scriptpack with extra environment variables
    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut command = Command::new(env!("CARGO_BIN_EXE_scriptpack"));
        command.args(args).current_dir(self.site_root.path());
        for (key, value) in env_vars {
            command.env(key, value);
        }

        TestResult::from(command.output().expect("failed to run scriptpack"))
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
