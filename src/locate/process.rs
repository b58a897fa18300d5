//! Locator process invocation.
//!
//! One invocation = one spawned process = one [`LocatorResult`]. Standard
//! output is consumed as it streams; stderr is only logged in verbose mode.

use std::process::Stdio;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{ChildStderr, Command};

use super::output::{LocatorResult, conclude};
use super::{LocateError, LocatorQuery};
use crate::config::LocatorConfig;
use crate::host::NavigationRequest;

const READ_CHUNK: usize = 4096;

/// Handle to the configured locator executable.
///
/// Cheap to clone. The configuration can be swapped while invocations are
/// running; each invocation reads it once when it starts.
#[derive(Clone)]
pub struct Locator {
    config: Arc<ArcSwap<LocatorConfig>>,
}

impl Locator {
    pub fn new(config: LocatorConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// Replace the configuration used by future invocations.
    pub fn set_config(&self, config: LocatorConfig) {
        self.config.store(Arc::new(config));
    }

    pub fn config(&self) -> Arc<LocatorConfig> {
        self.config.load_full()
    }

    /// Run one reverse search and wait for the process to exit.
    pub async fn run(&self, query: &LocatorQuery) -> Result<NavigationRequest, LocateError> {
        let config = self.config();
        match config.timeout() {
            Some(limit) => tokio::time::timeout(limit, invoke(&config, query))
                .await
                .map_err(|_| LocateError::Timeout { after: limit })?,
            None => invoke(&config, query).await,
        }
    }
}

impl Default for Locator {
    fn default() -> Self {
        Self::new(LocatorConfig::default())
    }
}

/// Build the argument list: extra args, then `edit -o <page>:<x>:<y>:<pdf>`.
pub fn locator_args(config: &LocatorConfig, query: &LocatorQuery) -> Vec<String> {
    let mut args = config.args.clone();
    args.push("edit".into());
    args.push("-o".into());
    args.push(query.token());
    args
}

async fn invoke(
    config: &LocatorConfig,
    query: &LocatorQuery,
) -> Result<NavigationRequest, LocateError> {
    let program = which::which(config.program()).map_err(|source| LocateError::NotFound {
        command: config.command.clone(),
        source,
    })?;

    let args = locator_args(config, query);
    crate::debug!("synctex"; "`{}` {}", program.display(), args.join(" "));

    // The child is killed if this future is dropped (timeout).
    let mut child = Command::new(&program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| LocateError::Spawn {
            command: config.command.clone(),
            source,
        })?;

    let stderr_task = child.stderr.take().map(|stderr| tokio::spawn(log_stderr(stderr)));

    let mut result = LocatorResult::new();
    if let Some(mut stdout) = child.stdout.take() {
        let mut buf = vec![0u8; READ_CHUNK];
        // Bytes of a UTF-8 sequence cut off at the chunk boundary.
        let mut pending: Vec<u8> = Vec::new();
        loop {
            let n = stdout.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            pending.extend_from_slice(&buf[..n]);
            let valid = match std::str::from_utf8(&pending) {
                Ok(text) => text.len(),
                Err(e) if e.error_len().is_none() => e.valid_up_to(),
                Err(_) => pending.len(),
            };
            let text = String::from_utf8_lossy(&pending[..valid]).into_owned();
            result.feed(&text);
            pending.drain(..valid);
        }
        if !pending.is_empty() {
            result.feed(&String::from_utf8_lossy(&pending));
        }
    }

    let status = child.wait().await?;
    if let Some(task) = stderr_task {
        let _ = task.await;
    }

    conclude(status.code(), result)
}

async fn log_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if !line.is_empty() {
            crate::debug!("synctex"; "{}", line);
        }
    }
}
