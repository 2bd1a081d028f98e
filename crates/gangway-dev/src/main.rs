//! Development bootstrap.
//!
//! Starts the UI dev server, forwards its output with a `[server]` prefix,
//! waits for it to answer on its port, then launches the shell against it.
//! The server is torn down when the shell exits, and the whole thing exits
//! non-zero if the server never comes up.

use anyhow::Context;
use clap::Parser;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gangway-dev", version, about = "Gangway development bootstrap")]
struct Args {
    /// Command that starts the UI dev server.
    #[arg(long, default_value = "npm start")]
    server_command: String,

    /// Command that starts the shell once the server is ready.
    #[arg(long, default_value = "cargo run -p gangway-shell")]
    shell_command: String,

    /// URL that signals readiness once it answers.
    #[arg(long, default_value = "http://localhost:4200")]
    url: String,

    /// Seconds to wait for the dev server before giving up.
    #[arg(long, default_value_t = 300)]
    timeout: u64,

    /// Seconds between readiness polls.
    #[arg(long, default_value_t = 1)]
    poll_interval: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let code = run(&args).await?;
    std::process::exit(code);
}

/// Spawn the server, wait for readiness, run the shell, tear the server
/// down. Returns the process exit code: 1 when the server never came up,
/// 0 once the shell exits.
async fn run(args: &Args) -> anyhow::Result<i32> {
    info!("starting dev server: {}", args.server_command);
    let mut server = spawn_prefixed(&args.server_command, "server")?;

    let client = reqwest::Client::new();
    let ready = wait_for_ready(
        &client,
        &args.url,
        Duration::from_secs(args.timeout),
        Duration::from_secs(args.poll_interval),
    )
    .await;

    if !ready {
        error!(
            "dev server did not answer on {} within {}s",
            args.url, args.timeout
        );
        let _ = server.kill().await;
        return Ok(1);
    }
    info!("dev server is up on {}", args.url);

    info!("launching shell: {}", args.shell_command);
    let mut shell = spawn_prefixed(&args.shell_command, "shell")?;

    tokio::select! {
        status = shell.wait() => {
            let status = status.context("waiting for shell")?;
            info!("shell exited with {}", status);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
            let _ = shell.kill().await;
        }
    }

    let _ = server.kill().await;
    Ok(0)
}

/// Spawn `command` with both pipes forwarded line by line under a
/// `[prefix]` tag.
fn spawn_prefixed(command: &str, prefix: &'static str) -> anyhow::Result<Child> {
    let mut parts = command.split_whitespace();
    let program = parts.next().context("command must not be empty")?;
    let mut child = Command::new(program)
        .args(parts)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("spawning {}", command))?;

    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(forward_lines(stdout, prefix));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(forward_lines(stderr, prefix));
    }
    Ok(child)
}

async fn forward_lines(pipe: impl AsyncRead + Unpin, prefix: &'static str) {
    let mut lines = BufReader::new(pipe).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        println!("[{}] {}", prefix, line);
    }
}

/// Poll `url` until it answers or `timeout` elapses. Any HTTP response
/// counts as ready; connection errors do not.
async fn wait_for_ready(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
    interval: Duration,
) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if client.get(url).send().await.is_ok() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_wait_for_ready_gives_up_on_closed_port() {
        let client = reqwest::Client::new();
        let ready = wait_for_ready(
            &client,
            "http://127.0.0.1:1",
            Duration::from_millis(300),
            Duration::from_millis(100),
        )
        .await;
        assert!(!ready);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_readiness_timeout_kills_server_and_returns_one() {
        let args = Args {
            server_command: "sleep 30".to_string(),
            shell_command: "true".to_string(),
            url: "http://127.0.0.1:1".to_string(),
            timeout: 1,
            poll_interval: 1,
        };

        let started = Instant::now();
        let code = run(&args).await.unwrap();
        assert_eq!(code, 1);
        // The server child was killed and reaped, not waited out.
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_exit_yields_zero_regardless_of_its_status() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
                    .await;
            }
        });

        let args = Args {
            server_command: "sleep 30".to_string(),
            shell_command: "false".to_string(),
            url: format!("http://{}", addr),
            timeout: 5,
            poll_interval: 1,
        };

        let code = run(&args).await.unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_wait_for_ready_sees_a_live_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
                    .await;
            }
        });

        let client = reqwest::Client::new();
        let ready = wait_for_ready(
            &client,
            &format!("http://{}", addr),
            Duration::from_secs(5),
            Duration::from_millis(100),
        )
        .await;
        assert!(ready);
    }
}
