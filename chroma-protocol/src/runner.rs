//! Command execution
//!
//! [`CommandRunner`] turns a descriptor plus arguments into one report
//! frame, pushes it through the transport, and (for result-bearing
//! commands) validates and unwraps the response. All exchanges on one
//! runner are serialized behind an async lock: interleaved reads would
//! pair responses with the wrong request, since the echoed transaction id
//! is the only correlation the firmware provides.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::args::{Argument, ByteArgs, PackFormat};
use crate::command::Command;
use crate::error::{CommandError, EncodeError, ProtocolError, TransportError};
use crate::frame::{build_report, FrameConfig, ResponseFrame};
use crate::timing;
use crate::Transport;

/// Per-device behavior knobs, derived from the hardware model's quirk set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Transaction code the firmware expects echoed back. Most hardware
    /// uses 0xFF; some families require 0x3F.
    pub default_tx_id: u8,
    /// Minimum gap between transmissions, for hardware that drops
    /// back-to-back reports. Enforced inside the serialization lock.
    pub min_command_gap: Option<Duration>,
    /// How long to wait for a response frame.
    pub response_timeout: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            default_tx_id: timing::DEFAULT_TX_ID,
            min_command_gap: None,
            response_timeout: Duration::from_millis(timing::RESPONSE_TIMEOUT_MS),
        }
    }
}

/// Pacing state, guarded by the same lock that serializes exchanges.
#[derive(Debug, Default)]
struct PacingClock {
    last_send: Option<Instant>,
}

/// Stateless-per-call command executor over a shared transport.
pub struct CommandRunner {
    transport: Arc<dyn Transport>,
    config: FrameConfig,
    options: RunnerOptions,
    io_lock: Mutex<PacingClock>,
}

impl CommandRunner {
    pub fn new(transport: Arc<dyn Transport>, config: FrameConfig, options: RunnerOptions) -> Self {
        Self {
            transport,
            config,
            options,
            io_lock: Mutex::new(PacingClock::default()),
        }
    }

    /// Frame parameters this runner was configured with.
    pub fn frame_config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Fire a command that produces no result.
    pub async fn run_command(
        &self,
        command: &Command,
        args: &[Argument],
    ) -> Result<(), CommandError> {
        self.run_command_with(command, args, PackFormat::BYTE, None)
            .await
    }

    /// Fire-and-forget with explicit packing format and transaction id.
    pub async fn run_command_with(
        &self,
        command: &Command,
        args: &[Argument],
        format: PackFormat,
        tx_id: Option<u8>,
    ) -> Result<(), CommandError> {
        let payload = self.pack(command, args, format)?;
        self.exchange(command, &payload, tx_id, false).await?;
        Ok(())
    }

    /// Run a command and return the validated response's argument bytes.
    pub async fn run_with_result(
        &self,
        command: &Command,
        args: &[Argument],
    ) -> Result<Vec<u8>, CommandError> {
        self.run_with_result_with(command, args, PackFormat::BYTE, None)
            .await
    }

    /// Result-bearing variant with explicit packing format and transaction id.
    pub async fn run_with_result_with(
        &self,
        command: &Command,
        args: &[Argument],
        format: PackFormat,
        tx_id: Option<u8>,
    ) -> Result<Vec<u8>, CommandError> {
        let payload = self.pack(command, args, format)?;
        let resp = self.exchange(command, &payload, tx_id, true).await?;
        Ok(resp.unwrap_or_default())
    }

    fn pack(
        &self,
        command: &Command,
        args: &[Argument],
        format: PackFormat,
    ) -> Result<Vec<u8>, CommandError> {
        let mut packer = ByteArgs::bounded(self.config.arg_capacity());
        packer
            .put_all(args.iter().cloned(), format)
            .map_err(|source| self.encode_err(command, source))?;
        Ok(packer.as_bytes().to_vec())
    }

    /// One serialized request(/response) exchange.
    ///
    /// The lock is held across both the send and the read so no other
    /// caller can slip a frame in between.
    async fn exchange(
        &self,
        command: &Command,
        payload: &[u8],
        tx_id: Option<u8>,
        want_response: bool,
    ) -> Result<Option<Vec<u8>>, CommandError> {
        let tx = tx_id.unwrap_or(self.options.default_tx_id);
        let frame = build_report(tx, command, payload, &self.config)
            .map_err(|source| self.encode_err(command, source))?;

        let mut clock = self.io_lock.lock().await;

        if let Some(gap) = self.options.min_command_gap {
            if let Some(last) = clock.last_send {
                let elapsed = last.elapsed();
                if elapsed < gap {
                    tokio::time::sleep(gap - elapsed).await;
                }
            }
        }

        debug!(
            "sending {} tx=0x{:02X} data_size={}",
            command,
            tx,
            payload.len()
        );
        self.transport
            .send(&frame)
            .await
            .map_err(|source| self.transport_err(command, source))?;
        clock.last_send = Some(Instant::now());

        if !want_response {
            return Ok(None);
        }

        let raw = self
            .transport
            .receive(self.options.response_timeout)
            .await
            .map_err(|source| self.transport_err(command, source))?;

        let resp = ResponseFrame::parse(&raw, &self.config)
            .map_err(|source| self.protocol_err(command, source))?;
        resp.matches(command, tx)
            .map_err(|source| self.protocol_err(command, source))?;

        debug!("response for {}: {} arg bytes", command, resp.args().len());
        Ok(Some(resp.args().to_vec()))
    }

    fn encode_err(&self, command: &Command, source: EncodeError) -> CommandError {
        CommandError::Encode {
            command: *command,
            source,
        }
    }

    fn transport_err(&self, command: &Command, source: TransportError) -> CommandError {
        warn!("{} failed on transport: {}", command, source);
        CommandError::Transport {
            command: *command,
            source,
        }
    }

    fn protocol_err(&self, command: &Command, source: ProtocolError) -> CommandError {
        warn!("{} response rejected: {}", command, source);
        CommandError::Protocol {
            command: *command,
            source,
        }
    }
}
