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

//! Error types for the gateway

use std::net::SocketAddr;
use thiserror::Error;
use uvscp_vscpcodec::VscpError;

/// Result type for gateway lifecycle operations
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Result type for command handlers
pub type CommandResult<T = ()> = std::result::Result<T, CommandError>;

/// Failure of a single client command
///
/// The `Display` text is what the client sees after `-OK - `.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A privileged command was issued before logging in
    #[error("Access denied")]
    AccessDenied,

    /// The command was given too few or too many arguments
    #[error("Wrong number of arguments")]
    WrongArgumentCount,

    /// An argument could not be interpreted
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An event or GUID failed to parse
    #[error("{0}")]
    Vscp(#[from] VscpError),

    /// The receive queue is empty
    #[error("No event(s) available")]
    NoData,

    /// The bus rejected a write or filter change
    #[error("Bus error: {0}")]
    Bus(#[from] std::io::Error),

    /// The username does not match the configured one
    #[error("Invalid username")]
    InvalidUsername,

    /// The password does not match the configured one
    #[error("Invalid password")]
    InvalidPassword,
}

impl CommandError {
    /// Check if the error is an authentication failure
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            CommandError::AccessDenied | CommandError::InvalidUsername | CommandError::InvalidPassword
        )
    }
}

/// Gateway lifecycle errors
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The listening socket could not be created
    #[error("Failed to bind {address}: {source}")]
    Bind {
        /// Requested bind address
        address: SocketAddr,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// `start` was called on a running gateway
    #[error("Gateway already running")]
    AlreadyRunning,

    /// `stop` was called on a stopped gateway
    #[error("Gateway not running")]
    NotRunning,

    /// The configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error outside of binding
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Check if the error prevents the gateway from starting
    pub fn is_startup_error(&self) -> bool {
        matches!(
            self,
            GatewayError::Bind { .. } | GatewayError::InvalidConfig(_) | GatewayError::AlreadyRunning
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_display() {
        assert_eq!(CommandError::AccessDenied.to_string(), "Access denied");
        assert_eq!(CommandError::NoData.to_string(), "No event(s) available");
        assert_eq!(
            CommandError::from(VscpError::GuidMismatch).to_string(),
            VscpError::GuidMismatch.to_string()
        );
    }

    #[test]
    fn test_auth_error() {
        assert!(CommandError::AccessDenied.is_auth_error());
        assert!(CommandError::InvalidPassword.is_auth_error());
        assert!(!CommandError::NoData.is_auth_error());
    }

    #[test]
    fn test_gateway_error() {
        let err = GatewayError::Bind {
            address: "127.0.0.1:8598".parse().unwrap(),
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        };
        assert!(err.is_startup_error());
        assert!(err.to_string().starts_with("Failed to bind 127.0.0.1:8598"));
        assert!(!GatewayError::NotRunning.is_startup_error());
    }
}
