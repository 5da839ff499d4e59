//! Signal handling of the built `whois-mcp` binary.
#![cfg(unix)]

use std::process::Stdio;
use std::time::Duration;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

const SHUTDOWN_BANNER: &str = "\x1b[33m\nShutting down MCP server...\x1b[0m";

async fn assert_clean_exit_on(sig: Signal) {
    // Empty cwd and config dirs, so only built-in defaults apply.
    let home = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_whois-mcp"))
        .current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env("CLICOLOR_FORCE", "1")
        .env_remove("NO_COLOR")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .expect("spawn whois-mcp");

    // Held open so the session only ends through the signal.
    let _stdin = child.stdin.take().unwrap();
    let mut stdout = child.stdout.take().unwrap();
    let mut stderr = BufReader::new(child.stderr.take().unwrap());

    let mut captured = String::new();
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let mut line = String::new();
            let n = stderr.read_line(&mut line).await.unwrap();
            assert!(n > 0, "stderr closed before startup: {captured}");
            captured.push_str(&line);
            if line.contains("tools: ") {
                break;
            }
        }
    })
    .await
    .expect("startup banner");
    assert!(captured.contains("Whois MCP Server 'whois' running on stdio"));

    let pid = Pid::from_raw(child.id().expect("child pid") as i32);
    signal::kill(pid, sig).unwrap();

    let status = tokio::time::timeout(Duration::from_secs(10), child.wait())
        .await
        .expect("exits after signal")
        .unwrap();
    assert_eq!(status.code(), Some(0), "{sig:?} should exit with status 0");

    stderr.read_to_string(&mut captured).await.unwrap();
    assert!(
        captured.contains(SHUTDOWN_BANNER),
        "missing yellow shutdown banner in: {captured:?}"
    );

    let mut out = Vec::new();
    stdout.read_to_end(&mut out).await.unwrap();
    assert!(out.is_empty(), "stdout is protocol-only: {:?}", String::from_utf8_lossy(&out));
}

#[tokio::test]
async fn test_sigterm_exits_zero_with_banner() {
    assert_clean_exit_on(Signal::SIGTERM).await;
}

#[tokio::test]
async fn test_sigint_exits_zero_with_banner() {
    assert_clean_exit_on(Signal::SIGINT).await;
}
