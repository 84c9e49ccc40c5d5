//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Binary CAN frame form of a VSCP event
//!
//! The 29 bit extended identifier packs the event header:
//!
//! ```text
//!  28    25 24        16 15      8 7       0
//! +--------+------------+---------+---------+
//! |  head  |   class    |  type   |  node   |
//! +--------+------------+---------+---------+
//! ```
//!
//! `head` is the upper nibble of the event head byte, `node` is the nickname
//! of the originating node.

use crate::consts::{
    CAN_EFF_FLAG, CAN_EFF_MASK, CAN_ERR_FLAG, CAN_MAX_DLEN, CAN_RTR_FLAG, ID_CLASS_MASK,
    ID_CLASS_SHIFT, ID_HEAD_SHIFT, ID_TYPE_SHIFT,
};
use crate::{Guid, VscpError, VscpMessage, VscpResult};
use chrono::Utc;
use tracing::trace;

/// A classic CAN frame in SocketCAN layout
///
/// `can_id` is the full identifier word including the EFF/RTR/ERR flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CanFrame {
    can_id: u32,
    dlc: u8,
    data: [u8; CAN_MAX_DLEN],
}

impl CanFrame {
    /// Create a data frame, returning `None` if the payload exceeds eight bytes
    pub fn new(can_id: u32, payload: &[u8]) -> Option<Self> {
        if payload.len() > CAN_MAX_DLEN {
            return None;
        }
        let mut data = [0u8; CAN_MAX_DLEN];
        data[..payload.len()].copy_from_slice(payload);
        Some(Self {
            can_id,
            dlc: payload.len() as u8,
            data,
        })
    }

    /// Create a frame from its raw parts without any validation
    pub fn from_raw(can_id: u32, dlc: u8, data: [u8; CAN_MAX_DLEN]) -> Self {
        Self { can_id, dlc, data }
    }

    /// Identifier word including flags
    pub fn can_id(&self) -> u32 {
        self.can_id
    }

    /// Identifier bits without flags
    pub fn raw_id(&self) -> u32 {
        self.can_id & CAN_EFF_MASK
    }

    /// Data length code as received
    pub fn dlc(&self) -> u8 {
        self.dlc
    }

    /// Payload bytes, bounded by the frame capacity
    pub fn data(&self) -> &[u8] {
        &self.data[..(self.dlc as usize).min(CAN_MAX_DLEN)]
    }

    /// Check for the extended frame format flag
    pub fn is_extended(&self) -> bool {
        self.can_id & CAN_EFF_FLAG != 0
    }

    /// Check for the remote transmission request flag
    pub fn is_remote(&self) -> bool {
        self.can_id & CAN_RTR_FLAG != 0
    }

    /// Check for the error frame flag
    pub fn is_error(&self) -> bool {
        self.can_id & CAN_ERR_FLAG != 0
    }
}

/// Pack event header fields into a 29 bit identifier
pub fn pack_id(head: u8, class: u16, vscp_type: u8, node_id: u8) -> u32 {
    (((head >> 4) as u32) << ID_HEAD_SHIFT)
        | (((class as u32) & ID_CLASS_MASK) << ID_CLASS_SHIFT)
        | ((vscp_type as u32) << ID_TYPE_SHIFT)
        | node_id as u32
}

/// Split a 29 bit identifier into `(head, class, type, node)`
pub fn unpack_id(id: u32) -> (u8, u16, u8, u8) {
    let head = (((id >> ID_HEAD_SHIFT) & 0x0F) as u8) << 4;
    let class = ((id >> ID_CLASS_SHIFT) & ID_CLASS_MASK) as u16;
    let vscp_type = (id >> ID_TYPE_SHIFT) as u8;
    let node_id = id as u8;
    (head, class, vscp_type, node_id)
}

/// Encode an event into an extended CAN frame
///
/// The node byte of the identifier is the last byte of the event GUID.
pub fn encode_frame(msg: &VscpMessage) -> CanFrame {
    let id = pack_id(msg.head, msg.class, msg.vscp_type, msg.guid.node_id());
    let mut data = [0u8; CAN_MAX_DLEN];
    data[..msg.data().len()].copy_from_slice(msg.data());
    CanFrame::from_raw(CAN_EFF_FLAG | id, msg.data_len(), data)
}

/// Decode an event from a received CAN frame
///
/// Frames without the extended flag, remote or error frames and frames with a
/// data length code of eight or more are rejected. The event GUID is
/// `node_guid` with its node byte replaced by the sender's nickname.
pub fn decode_frame(frame: &CanFrame, timestamp: u64, node_guid: &Guid) -> VscpResult<VscpMessage> {
    if !frame.is_extended() {
        return Err(VscpError::NotExtended);
    }
    if frame.is_remote() || frame.is_error() {
        return Err(VscpError::RemoteOrError);
    }
    if frame.dlc() as usize >= CAN_MAX_DLEN {
        return Err(VscpError::InvalidDlc(frame.dlc()));
    }

    let (head, class, vscp_type, node_id) = unpack_id(frame.raw_id());
    trace!(
        can_id = frame.can_id(),
        class,
        vscp_type,
        node_id,
        "Decoded frame header"
    );

    let msg = VscpMessage::new(head, class, vscp_type, node_guid.with_node_id(node_id))?
        .with_data(frame.data())?
        .with_timestamp(timestamp)
        .with_datetime(Utc::now());
    Ok(msg)
}
