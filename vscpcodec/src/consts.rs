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

//! Protocol constants shared by the CAN frame and text codecs

/// Extended frame format flag (bit 31 of the SocketCAN identifier word)
pub const CAN_EFF_FLAG: u32 = 0x8000_0000;

/// Remote transmission request flag
pub const CAN_RTR_FLAG: u32 = 0x4000_0000;

/// Error frame flag
pub const CAN_ERR_FLAG: u32 = 0x2000_0000;

/// Mask covering the 29 identifier bits of an extended frame
pub const CAN_EFF_MASK: u32 = 0x1FFF_FFFF;

/// Maximum payload of a classic CAN frame
pub const CAN_MAX_DLEN: usize = 8;

/// Maximum number of data bytes in a Level I VSCP event
pub const VSCP_MAX_DATA: usize = 8;

/// First class value of the Level II range that collapses onto Level I
pub const VSCP_LEVEL2_CLASS_OFFSET: u16 = 512;

/// Exclusive upper bound for event classes accepted by the gateway
pub const VSCP_CLASS_LIMIT: u16 = 1024;

/// Length in bytes of a VSCP GUID
pub const GUID_LEN: usize = 16;

/// Line terminator used for every line written to a client
pub const LINE_TERMINATOR: &str = "\r\n";

// Identifier bit layout
pub(crate) const ID_HEAD_SHIFT: u32 = 25;
pub(crate) const ID_CLASS_SHIFT: u32 = 16;
pub(crate) const ID_TYPE_SHIFT: u32 = 8;
pub(crate) const ID_CLASS_MASK: u32 = 0x1FF;
