//! Forwarding of triggers to a peer pilight.
//!
//! Two lights can mirror each other: every motion event and every halloween
//! command seen here is replayed on the peer's command API. Forwarding is
//! best effort. It never delays the local light, failures are logged and
//! nothing is retried.

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::constants::*;

/// Address of the peer's command API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub host: String,
    pub port: u16,
}

impl RemoteTarget {
    pub fn command_url(&self, command: &str) -> String {
        // Bare IPv6 literals need brackets in a URL
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        format!("http://{host}:{}{COMMAND_PATH_PREFIX}/{command}", self.port)
    }
}

/// A command to replay on the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerCommand {
    LightOn,
    Halloween { divider: u32, cycles: u32 },
}

impl PeerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            PeerCommand::LightOn => COMMAND_LIGHT_ON,
            PeerCommand::Halloween { .. } => COMMAND_HALLOWEEN,
        }
    }
}

#[derive(Serialize)]
struct HalloweenBody {
    divider: u32,
    #[serde(rename = "loop")]
    cycles: u32,
}

#[derive(Debug, Error)]
pub enum ForwardingError {
    #[error("Peer did not answer within {timeout_secs}s: {url}")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("Could not reach peer at {url}: {cause}")]
    Unreachable { url: String, cause: String },

    #[error("Peer answered HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Request to peer failed: {0}")]
    Request(String),
}

impl ForwardingError {
    fn from_reqwest(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            ForwardingError::Timeout {
                url: url.to_string(),
                timeout_secs: FORWARD_TIMEOUT_SECS,
            }
        } else if err.is_connect() {
            ForwardingError::Unreachable {
                url: url.to_string(),
                cause: err.to_string(),
            }
        } else {
            ForwardingError::Request(err.to_string())
        }
    }
}

/// Fire-and-forget relay of commands to the configured peer.
#[derive(Clone)]
pub struct RemoteForwarder {
    target: Option<RemoteTarget>,
    client: Client,
}

impl RemoteForwarder {
    pub fn new(target: Option<RemoteTarget>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(FORWARD_TIMEOUT_SECS))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;
        Ok(Self { target, client })
    }

    /// Forwarding that never sends anything.
    pub fn disabled() -> anyhow::Result<Self> {
        Self::new(None)
    }

    pub fn target(&self) -> Option<&RemoteTarget> {
        self.target.as_ref()
    }

    /// Replay `command` on the peer in the background.
    ///
    /// Returns the task handle, or `None` when no peer is configured (no
    /// request is made at all). Callers are free to drop the handle.
    pub fn forward(&self, command: PeerCommand) -> Option<JoinHandle<()>> {
        let target = self.target.clone()?;
        let client = self.client.clone();

        Some(tokio::spawn(async move {
            match send(&client, &target, command).await {
                Ok(()) => log_debug!("Forwarded {} to {}", command.name(), target.host),
                Err(e) => log_warning!("Forwarding {} failed: {e}", command.name()),
            }
        }))
    }

    /// Send `command` and wait for the peer's answer.
    ///
    /// With no peer configured this is a successful no-op.
    pub async fn send(&self, command: PeerCommand) -> Result<(), ForwardingError> {
        match &self.target {
            Some(target) => send(&self.client, target, command).await,
            None => Ok(()),
        }
    }
}

async fn send(
    client: &Client,
    target: &RemoteTarget,
    command: PeerCommand,
) -> Result<(), ForwardingError> {
    let url = target.command_url(command.name());

    let request = match command {
        PeerCommand::LightOn => client.get(&url),
        PeerCommand::Halloween { divider, cycles } => {
            client.post(&url).json(&HalloweenBody { divider, cycles })
        }
    };

    let response = request
        .send()
        .await
        .map_err(|e| ForwardingError::from_reqwest(e, &url))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ForwardingError::Status {
            status: status.as_u16(),
            url,
        });
    }
    Ok(())
}
