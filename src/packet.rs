//! Message shapes reserved for a future node transport.
//!
//! Nothing in the kernel sends or receives these yet; the scheduler drives
//! nodes in-process. They exist so a transport can be added without
//! changing the vocabulary.

use serde::{Deserialize, Serialize};

use crate::core::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketType {
    TaskDispatch,
    TaskResult,
    HeartbeatRequest,
    HeartbeatResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    pub source_id: NodeId,
    pub destination_id: NodeId,
    pub payload: String,
    pub flags: u8,
    pub packet_type: PacketType,
}

impl Packet {
    pub fn new(
        packet_type: PacketType,
        source_id: NodeId,
        destination_id: NodeId,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            source_id,
            destination_id,
            payload: payload.into(),
            flags: 0,
            packet_type,
        }
    }
}
