//! One-shot commands: `relive send` and `relive screen`.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::config::{ConfigHandle, SessionConfig};
use crate::live::{Command, CommandDispatcher, CommandTransport, LiveError, Response};

/// Send a raw command and print the response.
pub fn send(config: SessionConfig, kind: &str, payload: Option<&str>) -> Result<()> {
    let payload = parse_payload(payload)?;
    let command = Command::new(kind, payload);

    let response = block_on(config, |dispatcher| async move {
        dispatcher.raw(&command).await
    })?;

    println!("{}", format_response(&response)?);
    if !response.succeeded {
        bail!(
            "{} was rejected: {}",
            kind,
            response.message.as_deref().unwrap_or("no message given")
        );
    }
    Ok(())
}

/// Print the current screen and camera position.
pub fn screen(config: SessionConfig) -> Result<()> {
    let (screen, camera) = block_on(config, |dispatcher| async move {
        let screen = dispatcher.current_screen().await?;
        let camera = dispatcher.camera_position().await?;
        Ok::<_, LiveError>((screen, camera))
    })?;

    println!("{screen}");
    println!("camera: {}, {}, {}", camera.x, camera.y, camera.z);
    Ok(())
}

fn parse_payload(payload: Option<&str>) -> Result<Value> {
    match payload {
        Some(text) => serde_json::from_str(text).context("Payload is not valid JSON"),
        None => Ok(Value::Null),
    }
}

fn format_response(response: &Response) -> Result<String> {
    serde_json::to_string_pretty(response).context("Failed to format response")
}

/// Run one exchange with the game on a throwaway runtime.
fn block_on<T, F, Fut>(config: SessionConfig, exchange: F) -> Result<T>
where
    F: FnOnce(Arc<CommandDispatcher>) -> Fut,
    Fut: Future<Output = Result<T, LiveError>>,
{
    let addr = config.live.addr();
    let transport = Arc::new(CommandTransport::new(addr, config.live.connect_timeout()));
    let dispatcher = Arc::new(CommandDispatcher::new(
        transport,
        Arc::new(ConfigHandle::new(config)),
    ));

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    rt.block_on(exchange(dispatcher))
        .with_context(|| format!("No answer from the game at {addr}"))
}
