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

//! Gateway configuration
//!
//! ```
//! use uvscp_gateway::GatewayConfig;
//! use std::time::Duration;
//!
//! let config = GatewayConfig::default()
//!     .with_credentials("admin", "secret")
//!     .with_workers(8)
//!     .with_poll_interval(Duration::from_millis(100));
//! assert!(config.validate().is_ok());
//! assert!(config.requires_authentication());
//! ```

use std::time::Duration;
use uvscp_cmdinterp::InterpreterConfig;
use uvscp_vscpcodec::Guid;

/// Default TCP port of the VSCP text protocol
pub const DEFAULT_PORT: u16 = 8598;

/// Configuration shared by every session of a gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Username required by `user`, if any
    pub username: Option<String>,

    /// Password required by `pass`, if any
    pub password: Option<String>,

    /// Node GUID each session starts with
    pub guid: Guid,

    /// Number of worker tasks, and so of concurrent sessions
    pub workers: usize,

    /// Capacity of each session's receive queue, one slot is kept free
    pub queue_capacity: usize,

    /// Longest accepted command line
    pub max_line_length: usize,

    /// Maximum number of arguments passed to a command
    pub max_arguments: usize,

    /// Upper bound on one wait of the session loop
    pub poll_interval: Duration,

    /// Minimum spacing of keepalive lines in receive loop mode
    pub keepalive_interval: Duration,

    /// How long a reply may take to reach the client before the session ends
    pub write_timeout: Duration,

    /// How long `stop` waits for workers to finish
    pub shutdown_timeout: Duration,

    /// Greeting line written when a session starts
    pub banner: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            guid: Guid::default(),
            workers: 5,
            queue_capacity: 256,
            max_line_length: 128,
            max_arguments: 10,
            poll_interval: Duration::from_millis(200),
            keepalive_interval: Duration::from_secs(1),
            write_timeout: Duration::from_secs(5),
            shutdown_timeout: Duration::from_secs(5),
            banner: format!("uvscpd {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl GatewayConfig {
    /// Require a username and password
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set or clear the required username
    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    /// Set or clear the required password
    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password;
        self
    }

    /// Set the default node GUID
    pub fn with_guid(mut self, guid: Guid) -> Self {
        self.guid = guid;
        self
    }

    /// Set the number of workers
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the receive queue capacity
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the maximum command line length
    pub fn with_max_line_length(mut self, length: usize) -> Self {
        self.max_line_length = length;
        self
    }

    /// Set the maximum argument count
    pub fn with_max_arguments(mut self, count: usize) -> Self {
        self.max_arguments = count;
        self
    }

    /// Set the session poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the keepalive interval
    pub fn with_keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval = interval;
        self
    }

    /// Set the client write timeout
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set the shutdown timeout
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Set the greeting banner
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    /// Check if any credential has to be presented
    pub fn requires_authentication(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }

    /// Interpreter settings derived from this configuration
    pub fn interpreter_config(&self) -> InterpreterConfig {
        InterpreterConfig::default()
            .with_max_line_length(self.max_line_length)
            .with_max_arguments(self.max_arguments)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("workers must be greater than 0".to_string());
        }
        if self.queue_capacity < 2 {
            return Err("queue_capacity must be at least 2".to_string());
        }
        if self.poll_interval.is_zero() {
            return Err("poll_interval must be greater than 0".to_string());
        }
        if self.write_timeout.is_zero() {
            return Err("write_timeout must be greater than 0".to_string());
        }
        self.interpreter_config().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.workers, 5);
        assert_eq!(config.queue_capacity, 256);
        assert_eq!(config.poll_interval, Duration::from_millis(200));
        assert_eq!(config.write_timeout, Duration::from_secs(5));
        assert!(!config.requires_authentication());
        assert!(config.banner.starts_with("uvscpd "));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_interpreter_config() {
        let config = GatewayConfig::default()
            .with_max_line_length(64)
            .with_max_arguments(3);
        let interp = config.interpreter_config();
        assert_eq!(interp.max_line_length, 64);
        assert_eq!(interp.max_arguments, 3);
        assert!(interp.fold_case);
    }

    #[test]
    fn test_password_only() {
        let config = GatewayConfig::default().with_password(Some("pw".to_string()));
        assert!(config.requires_authentication());
    }

    #[test]
    fn test_validation() {
        assert!(GatewayConfig::default().with_workers(0).validate().is_err());
        assert!(GatewayConfig::default().with_queue_capacity(1).validate().is_err());
        assert!(GatewayConfig::default().with_max_line_length(0).validate().is_err());
        assert!(
            GatewayConfig::default()
                .with_poll_interval(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(
            GatewayConfig::default()
                .with_write_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
    }
}
