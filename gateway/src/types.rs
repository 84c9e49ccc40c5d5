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

//! Core types for the gateway

use std::fmt;

/// Unique identifier for a session (monotonically increasing, never reused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Create a new session ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying u64 value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// How received bus events reach the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// Events are queued until the client asks for them
    #[default]
    Normal,
    /// Events are written to the client as they arrive
    Loop,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Loop => write!(f, "loop"),
        }
    }
}

/// Per-session traffic counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStatistics {
    /// Events received from the bus
    pub rx_frames: u64,
    /// Payload bytes received from the bus
    pub rx_bytes: u64,
    /// Events sent to the bus
    pub tx_frames: u64,
    /// Payload bytes sent to the bus
    pub tx_bytes: u64,
    /// Bus frames that failed to decode
    pub dropped_frames: u64,
    /// Events lost because the receive queue was full
    pub overruns: u64,
}

impl SessionStatistics {
    /// Record a received event carrying `bytes` of payload
    pub fn record_rx(&mut self, bytes: usize) {
        self.rx_frames += 1;
        self.rx_bytes += bytes as u64;
    }

    /// Record a transmitted event carrying `bytes` of payload
    pub fn record_tx(&mut self, bytes: usize) {
        self.tx_frames += 1;
        self.tx_bytes += bytes as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_display() {
        assert_eq!(SessionId::new(7).to_string(), "session-7");
        assert_eq!(SessionId::new(7).as_u64(), 7);
    }

    #[test]
    fn test_mode_default() {
        assert_eq!(SessionMode::default(), SessionMode::Normal);
        assert_eq!(SessionMode::Loop.to_string(), "loop");
    }

    #[test]
    fn test_statistics() {
        let mut stats = SessionStatistics::default();
        stats.record_rx(3);
        stats.record_rx(0);
        stats.record_tx(8);
        assert_eq!(stats.rx_frames, 2);
        assert_eq!(stats.rx_bytes, 3);
        assert_eq!(stats.tx_frames, 1);
        assert_eq!(stats.tx_bytes, 8);
    }
}
