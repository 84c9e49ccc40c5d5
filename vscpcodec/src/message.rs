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

//! The VSCP event carried over both the bus and the text protocol

use crate::consts::{VSCP_CLASS_LIMIT, VSCP_MAX_DATA};
use crate::{Guid, VscpError, VscpResult};
use chrono::{DateTime, Utc};

/// A single VSCP event
///
/// `class` is always below 1024. Events parsed from the Level II range
/// (512..1024) are stored with their collapsed Level I class. The payload is
/// kept private so its length can never exceed eight bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VscpMessage {
    /// Priority and flag bits; only the upper nibble travels on the bus
    pub head: u8,
    /// Event class
    pub class: u16,
    /// Event type within the class
    pub vscp_type: u8,
    /// Originating (or, for addressed events, destination) node
    pub guid: Guid,
    /// Capture time in microseconds, as reported by the bus layer
    pub timestamp: u64,
    /// Wall clock time at reception
    pub datetime: DateTime<Utc>,
    data: Vec<u8>,
}

impl VscpMessage {
    /// Create an event without data, stamped with the current wall clock time
    pub fn new(head: u8, class: u16, vscp_type: u8, guid: Guid) -> VscpResult<Self> {
        if class >= VSCP_CLASS_LIMIT {
            return Err(VscpError::OutOfRange {
                field: "class",
                value: class as u64,
            });
        }
        Ok(Self {
            head,
            class,
            vscp_type,
            guid,
            timestamp: 0,
            datetime: Utc::now(),
            data: Vec::new(),
        })
    }

    /// Replace the payload
    pub fn with_data(mut self, data: &[u8]) -> VscpResult<Self> {
        self.set_data(data)?;
        Ok(self)
    }

    /// Replace the capture timestamp
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Replace the wall clock time
    pub fn with_datetime(mut self, datetime: DateTime<Utc>) -> Self {
        self.datetime = datetime;
        self
    }

    /// Payload bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of payload bytes
    pub fn data_len(&self) -> u8 {
        self.data.len() as u8
    }

    /// Replace the payload, rejecting more than eight bytes
    pub fn set_data(&mut self, data: &[u8]) -> VscpResult<()> {
        if data.len() > VSCP_MAX_DATA {
            return Err(VscpError::TooMuchData(data.len()));
        }
        self.data.clear();
        self.data.extend_from_slice(data);
        Ok(())
    }

    /// Priority encoded in the top three bits of `head`
    pub fn priority(&self) -> u8 {
        self.head >> 5
    }
}
