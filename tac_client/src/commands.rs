//! Client → server command channel.
//!
//! Fire-and-forget: a command is serialized, framed and written, and the
//! local table is not touched. State changes only when a later server
//! update confirms the effect; the client never applies a command
//! optimistically.

use std::io::{self, Write};
use std::net::{SocketAddr, TcpStream};

use serde::{Deserialize, Serialize};

use tac_schema::{ReactionToThreat, RulesOfEngagement};

/// Command wrapper carrying an optional correlation id for log matching on
/// the server side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub payload: CommandPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<u64>,
}

/// Supported command payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CommandPayload {
    Follow { unit: u32, leader: u32 },
    SetSpeed { unit: u32, speed: f64 },
    SetAltitude { unit: u32, altitude: f64 },
    SetRulesOfEngagement { unit: u32, roe: RulesOfEngagement },
    SetReactionToThreat { unit: u32, reaction: ReactionToThreat },
    ClearTask { unit: u32 },
    DeleteUnit { unit: u32 },
}

impl CommandEnvelope {
    pub fn new(payload: CommandPayload) -> Self {
        Self {
            payload,
            correlation_id: None,
        }
    }

    pub fn with_correlation_id(payload: CommandPayload, correlation_id: u64) -> Self {
        Self {
            payload,
            correlation_id: Some(correlation_id),
        }
    }
}

/// Serialize a command as one length-prefixed JSON frame.
pub fn encode_command(envelope: &CommandEnvelope) -> serde_json::Result<Vec<u8>> {
    let body = serde_json::to_vec(envelope)?;
    let mut frame = Vec::with_capacity(4 + body.len());
    frame.extend_from_slice(&(body.len() as u32).to_le_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Writing half of the command channel.
pub struct CommandSender {
    stream: TcpStream,
}

impl CommandSender {
    pub fn connect(addr: SocketAddr) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        if let Err(err) = stream.set_nodelay(true) {
            log::warn!("failed to set TCP_NODELAY on command channel: {}", err);
        }
        log::info!("command channel connected to {}", addr);
        Ok(Self { stream })
    }

    /// Send one command. No acknowledgment is awaited.
    pub fn send(&mut self, envelope: &CommandEnvelope) -> io::Result<()> {
        let frame = encode_command(envelope)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        self.stream.write_all(&frame)
    }
}
