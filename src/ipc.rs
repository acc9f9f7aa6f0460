use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::matrix::Pattern;
use crate::session::Session;

/// Commands sent from IPC server to render loop
#[derive(Debug)]
pub enum IpcCommand {
    Zero { reply: oneshot::Sender<String> },
    StyleNext { reply: oneshot::Sender<String> },
    ColorNext { reply: oneshot::Sender<String> },
    Nudge { degrees: f64, reply: oneshot::Sender<String> },
    Pause { reply: oneshot::Sender<String> },
    Pattern { pattern: Pattern, reply: oneshot::Sender<String> },
    Status { reply: oneshot::Sender<String> },
    Ping { reply: oneshot::Sender<String> },
}

/// Get the socket path for IPC
pub fn socket_path() -> PathBuf {
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        PathBuf::from(dir).join("senseline.sock")
    } else {
        PathBuf::from("/tmp/senseline.sock")
    }
}

/// Parse a protocol line into an IpcCommand
fn parse_command(line: &str, reply: oneshot::Sender<String>) -> Result<IpcCommand> {
    // the pattern payload is JSON and may contain spaces
    if let Some(json) = line.strip_prefix("pattern ") {
        let pattern = Pattern::parse(json.trim())?;
        return Ok(IpcCommand::Pattern { pattern, reply });
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        ["zero"] => Ok(IpcCommand::Zero { reply }),
        ["style", "next"] => Ok(IpcCommand::StyleNext { reply }),
        ["color", "next"] => Ok(IpcCommand::ColorNext { reply }),
        ["nudge", val] => {
            let degrees: f64 = val.parse().context("Invalid nudge value")?;
            if !degrees.is_finite() {
                anyhow::bail!("Nudge must be a finite number of degrees");
            }
            Ok(IpcCommand::Nudge { degrees, reply })
        }
        ["pause"] => Ok(IpcCommand::Pause { reply }),
        ["status"] => Ok(IpcCommand::Status { reply }),
        ["ping"] => Ok(IpcCommand::Ping { reply }),
        _ => Err(anyhow::anyhow!("Unknown command: {}", line)),
    }
}

fn respond<T: std::fmt::Display, E: std::fmt::Display>(result: Result<T, E>) -> String {
    match result {
        Ok(value) => format!("ok: {}", value),
        Err(e) => format!("err: {}", e),
    }
}

/// Process an IPC command by mutating render loop state
pub fn process_ipc_command(cmd: IpcCommand, session: &mut Session) {
    match cmd {
        IpcCommand::Zero { reply } => {
            let response = match session.zero() {
                Ok(Some(offset)) => format!("ok: {:.1}", offset),
                Ok(None) => "err: no reading yet".to_string(),
                Err(e) => format!("err: {}", e),
            };
            let _ = reply.send(response);
        }
        IpcCommand::StyleNext { reply } => {
            let _ = reply.send(respond(session.next_style()));
        }
        IpcCommand::ColorNext { reply } => {
            let _ = reply.send(respond(session.next_color_scheme()));
        }
        IpcCommand::Nudge { degrees, reply } => {
            let _ = reply.send(respond(session.nudge(degrees).map(|_| degrees)));
        }
        IpcCommand::Pause { reply } => {
            let response = session
                .toggle_pause()
                .map(|paused| if paused { "paused" } else { "running" });
            let _ = reply.send(respond(response));
        }
        IpcCommand::Pattern { pattern, reply } => {
            let response = session
                .show_pattern(&pattern, Instant::now())
                .map(|_| "pattern shown");
            let _ = reply.send(respond(response));
        }
        IpcCommand::Status { reply } => {
            let _ = reply.send(format!("ok: {}", session.status()));
        }
        IpcCommand::Ping { reply } => {
            let _ = reply.send("ok: pong".to_string());
        }
    }
}

/// Handle a single client connection
async fn handle_client(stream: UnixStream, cmd_tx: mpsc::Sender<IpcCommand>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut buf_reader = BufReader::new(reader);
    let mut line = String::new();
    buf_reader.read_line(&mut line).await?;
    let line = line.trim();

    if line.is_empty() {
        return Ok(());
    }

    let (reply_tx, reply_rx) = oneshot::channel();

    let command = match parse_command(line, reply_tx) {
        Ok(cmd) => cmd,
        Err(e) => {
            writer
                .write_all(format!("err: {:#}\n", e).as_bytes())
                .await?;
            return Ok(());
        }
    };

    cmd_tx
        .send(command)
        .await
        .map_err(|_| anyhow::anyhow!("Render loop has shut down"))?;

    let response = reply_rx
        .await
        .unwrap_or_else(|_| "err: internal error".to_string());

    writer
        .write_all(format!("{}\n", response).as_bytes())
        .await?;
    Ok(())
}

/// Start the IPC server, listening for commands on a Unix socket
pub async fn start_server(cmd_tx: mpsc::Sender<IpcCommand>) -> Result<()> {
    serve(socket_path(), cmd_tx).await
}

async fn serve(path: PathBuf, cmd_tx: mpsc::Sender<IpcCommand>) -> Result<()> {
    // Remove stale socket from previous run
    let _ = std::fs::remove_file(&path);

    let listener = UnixListener::bind(&path).context("Failed to bind IPC socket")?;

    info!("IPC server listening on {}", path.display());

    loop {
        let (stream, _) = listener.accept().await?;
        let cmd_tx = cmd_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, cmd_tx).await {
                debug!("IPC client error: {}", e);
            }
        });
    }
}

/// Send a command to a running senseline instance (client mode)
pub async fn send_command(line: &str) -> Result<String> {
    send_to(&socket_path(), line).await
}

async fn send_to(path: &std::path::Path, line: &str) -> Result<String> {
    let stream = tokio::time::timeout(
        std::time::Duration::from_secs(2),
        UnixStream::connect(path),
    )
    .await
    .context("Connection timed out")?
    .context("Could not connect to senseline. Is it running?")?;

    let (reader, mut writer) = stream.into_split();

    writer.write_all(format!("{}\n", line).as_bytes()).await?;
    writer.shutdown().await?;

    let mut buf_reader = BufReader::new(reader);
    let mut response = String::new();

    tokio::time::timeout(
        std::time::Duration::from_secs(2),
        buf_reader.read_line(&mut response),
    )
    .await
    .context("Response timed out")?
    .context("Failed to read response")?;

    Ok(response.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sensor::SimulatedSensor;

    fn parse(line: &str) -> Result<IpcCommand> {
        let (reply, _rx) = oneshot::channel();
        parse_command(line, reply)
    }

    fn run(session: &mut Session, line: &str) -> String {
        let (reply, mut rx) = oneshot::channel();
        let cmd = parse_command(line, reply).unwrap();
        process_ipc_command(cmd, session);
        rx.try_recv().unwrap()
    }

    #[test]
    fn parses_known_commands() {
        assert!(matches!(parse("zero"), Ok(IpcCommand::Zero { .. })));
        assert!(matches!(parse("style next"), Ok(IpcCommand::StyleNext { .. })));
        assert!(matches!(parse("color   next"), Ok(IpcCommand::ColorNext { .. })));
        assert!(matches!(parse("pause"), Ok(IpcCommand::Pause { .. })));
        assert!(matches!(
            parse("nudge -12.5"),
            Ok(IpcCommand::Nudge { degrees, .. }) if degrees == -12.5
        ));
    }

    #[test]
    fn rejects_bad_commands() {
        assert!(parse("dance").is_err());
        assert!(parse("nudge left").is_err());
        assert!(parse("nudge NaN").is_err());
        assert!(parse("pattern {not json}").is_err());
    }

    #[test]
    fn pattern_payload_may_contain_spaces() {
        let row = vec!["[1, 2, 3]"; 8].join(", ");
        let rows = vec![format!("[{}]", row); 8].join(", ");
        let line = format!("pattern {{\"matrix\": [{}]}}", rows);
        match parse(&line) {
            Ok(IpcCommand::Pattern { pattern, .. }) => assert_eq!(pattern.matrix[7][7], [1, 2, 3]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn commands_drive_the_session() {
        let mut session = Session::new(&Config::default(), None, SimulatedSensor::still()).unwrap();
        assert_eq!(run(&mut session, "ping"), "ok: pong");
        assert_eq!(run(&mut session, "zero"), "err: no reading yet");
        assert_eq!(run(&mut session, "style next"), "ok: horizon");
        assert_eq!(run(&mut session, "color next"), "ok: rainbow");
        assert_eq!(run(&mut session, "nudge 5"), "ok: 5");
        assert_eq!(run(&mut session, "pause"), "ok: paused");
        assert!(run(&mut session, "status").starts_with("ok: axis=pitch"));

        let small = r#"pattern {"matrix": [[[1, 1, 1]]]}"#;
        assert_eq!(
            run(&mut session, small),
            "err: pattern has 1 rows, matrix has 8"
        );
    }

    #[tokio::test]
    async fn round_trip_over_a_socket() {
        let path = std::env::temp_dir().join(format!("senseline-ipc-{}.sock", std::process::id()));
        let (cmd_tx, mut cmd_rx) = mpsc::channel(4);
        let server_path = path.clone();
        tokio::spawn(async move {
            let _ = serve(server_path, cmd_tx).await;
        });

        let mut session = Session::new(&Config::default(), None, SimulatedSensor::still()).unwrap();
        tokio::spawn(async move {
            while let Some(cmd) = cmd_rx.recv().await {
                process_ipc_command(cmd, &mut session);
            }
        });

        // the listener may not be bound yet
        let mut response = None;
        for _ in 0..50 {
            match send_to(&path, "ping").await {
                Ok(r) => {
                    response = Some(r);
                    break;
                }
                Err(_) => tokio::time::sleep(std::time::Duration::from_millis(20)).await,
            }
        }
        assert_eq!(response.as_deref(), Some("ok: pong"));
        assert_eq!(send_to(&path, "dance").await.unwrap(), "err: Unknown command: dance");
        let _ = std::fs::remove_file(&path);
    }
}
