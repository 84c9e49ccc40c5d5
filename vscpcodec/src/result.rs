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

//! Error types for the VSCP codecs

use thiserror::Error;

/// Result type for codec operations
pub type VscpResult<T> = Result<T, VscpError>;

/// Errors raised while parsing, formatting or converting VSCP events
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VscpError {
    /// The text event does not contain the mandatory leading fields
    #[error("Too few fields ({0}), at least 7 are required")]
    MissingFields(usize),

    /// A numeric field is neither decimal nor `0x` prefixed hexadecimal
    #[error("Invalid number in field {field}: '{value}'")]
    InvalidNumber {
        /// Name of the offending field
        field: &'static str,
        /// Raw text of the field
        value: String,
    },

    /// A numeric field parsed but does not fit its range
    #[error("Field {field} out of range: {value}")]
    OutOfRange {
        /// Name of the offending field
        field: &'static str,
        /// Parsed value
        value: u64,
    },

    /// The datetime field is not an ISO 8601 date and time
    #[error("Invalid datetime '{0}'")]
    InvalidDateTime(String),

    /// More data bytes than an event can carry
    #[error("Too many data bytes ({0}), at most 8 are allowed")]
    TooMuchData(usize),

    /// Malformed GUID string
    #[error("Invalid GUID '{0}'")]
    InvalidGuid(String),

    /// A Level II event is addressed to a different node
    #[error("Destination GUID does not match this node")]
    GuidMismatch,

    /// A Level II event is missing the destination GUID in its data
    #[error("Level II event requires a 16 byte destination GUID")]
    MissingDestination,

    /// The frame does not carry an extended identifier
    #[error("Frame is not in extended format")]
    NotExtended,

    /// Remote request and error frames never carry events
    #[error("Remote or error frame")]
    RemoteOrError,

    /// The data length code is not acceptable for an event frame
    #[error("Invalid data length code {0}")]
    InvalidDlc(u8),
}

impl VscpError {
    /// Check if the error originated from a bus frame rather than text input
    pub fn is_frame_error(&self) -> bool {
        matches!(
            self,
            VscpError::NotExtended | VscpError::RemoteOrError | VscpError::InvalidDlc(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            VscpError::MissingFields(3).to_string(),
            "Too few fields (3), at least 7 are required"
        );
        assert_eq!(
            VscpError::OutOfRange {
                field: "head",
                value: 300
            }
            .to_string(),
            "Field head out of range: 300"
        );
    }

    #[test]
    fn test_frame_errors() {
        assert!(VscpError::InvalidDlc(8).is_frame_error());
        assert!(VscpError::NotExtended.is_frame_error());
        assert!(!VscpError::GuidMismatch.is_frame_error());
    }
}
