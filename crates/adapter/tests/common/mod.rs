#![allow(dead_code)]

use anyhow::Context as _;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

pub use petstore_test_support::{KillOnDrop, MockPetstore};

pub fn pick_unused_port() -> anyhow::Result<u16> {
    petstore_test_support::pick_unused_port()
}

pub async fn wait_http_ok(url: &str, timeout_dur: Duration) -> anyhow::Result<()> {
    petstore_test_support::wait_http_ok(url, timeout_dur).await
}

/// Spawn the adapter binary in `mode`, pointed at `base_url`, listening on `port`.
pub fn spawn_adapter(mode: &str, base_url: &str, port: u16) -> anyhow::Result<Child> {
    let bin = env!("CARGO_BIN_EXE_petstore-mcp-adapter");
    let bind = format!("127.0.0.1:{port}");
    Command::new(bin)
        .arg("--mode")
        .arg(mode)
        .arg("--base-url")
        .arg(base_url)
        .arg("--bind")
        .arg(&bind)
        .arg("--console-bind")
        .arg(&bind)
        .arg("--log-level")
        .arg("info")
        .env_remove("API_KEY")
        .env_remove("TEST_UI_PORT")
        .stdin(Stdio::null())
        .spawn()
        .context("spawn adapter")
}
