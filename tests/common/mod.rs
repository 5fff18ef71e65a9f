//! Common test utilities for devshelf integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't read the
//! user's `~/.config/devshelf/config.toml` or `DEVSHELF_*` variables.

#![allow(dead_code)]

use assert_cmd::Command;
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::process::{Child, Stdio};
use std::time::{Duration, Instant};
pub use tempfile::TempDir;

const ENV_VARS: &[&str] = &[
    "DEVSHELF_DATABASE_URL",
    "DEVSHELF_HOST",
    "DEVSHELF_PORT",
    "DEVSHELF_SERVER",
    "DEVSHELF_LOG_FORMAT",
];

/// A test environment with an isolated config file location and data directory.
///
/// `devshelf()` sets `DEVSHELF_CONFIG` per-invocation (to a file that does
/// not exist unless a test writes it), making tests parallel-safe.
pub struct TestEnv {
    pub data_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// Path of the (optional) config file for this environment.
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.path().join("config.toml")
    }

    /// Connection string for a database file inside the data directory.
    pub fn database_url(&self) -> String {
        format!("sqlite://{}", self.data_dir.path().join("shelf.db").display())
    }

    pub fn data_path(&self) -> &Path {
        self.data_dir.path()
    }

    /// Get a Command for the devshelf binary with isolated configuration.
    pub fn devshelf(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_devshelf"));
        for var in ENV_VARS {
            cmd.env_remove(var);
        }
        cmd.env("DEVSHELF_CONFIG", self.config_path());
        cmd
    }

    /// Get a Command already pointed at `server`.
    pub fn client(&self, server: &Server) -> Command {
        let mut cmd = self.devshelf();
        cmd.args(["--server", &server.url]);
        cmd
    }

    /// Start `devshelf serve` on a free port against this environment's database.
    pub fn serve(&self) -> Server {
        let port = free_port();
        let mut cmd = std::process::Command::new(env!("CARGO_BIN_EXE_devshelf"));
        for var in ENV_VARS {
            cmd.env_remove(var);
        }
        let child = cmd
            .env("DEVSHELF_CONFIG", self.config_path())
            .env("DEVSHELF_DATABASE_URL", self.database_url())
            .args(["serve", "--port", &port.to_string()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();

        let server = Server {
            child,
            url: format!("http://127.0.0.1:{}", port),
        };
        wait_for_port(port);
        server
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// A running `devshelf serve` process, killed on drop.
pub struct Server {
    child: Child,
    pub url: String,
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// A port that was free a moment ago.
pub fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn wait_for_port(port: u16) {
    let deadline = Instant::now() + Duration::from_secs(15);
    while Instant::now() < deadline {
        if TcpStream::connect(("127.0.0.1", port)).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    panic!("devshelf serve did not start listening on port {}", port);
}

/// Parse a command's stdout as JSON.
pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}
