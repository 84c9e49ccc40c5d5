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

//! Lock-free gateway metrics
//!
//! Counters are kept locally as atomics for [`GatewayMetrics::snapshot`] and
//! mirrored to the `metrics` facade under the `uvscp.` prefix.

use metrics::{counter, gauge};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Gateway wide counters
#[derive(Debug)]
pub struct GatewayMetrics {
    total_sessions: AtomicU64,
    active_sessions: AtomicU64,
    rejected_connections: AtomicU64,

    frames_received: AtomicU64,
    frames_transmitted: AtomicU64,
    frames_dropped: AtomicU64,

    protocol_errors: AtomicU64,

    started_at: Instant,
}

impl Default for GatewayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayMetrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            total_sessions: AtomicU64::new(0),
            active_sessions: AtomicU64::new(0),
            rejected_connections: AtomicU64::new(0),
            frames_received: AtomicU64::new(0),
            frames_transmitted: AtomicU64::new(0),
            frames_dropped: AtomicU64::new(0),
            protocol_errors: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    /// Record a session starting
    pub fn session_opened(&self) {
        self.total_sessions.fetch_add(1, Ordering::Relaxed);
        self.active_sessions.fetch_add(1, Ordering::Relaxed);
        counter!("uvscp.sessions.total").increment(1);
        gauge!("uvscp.sessions.active").increment(1.0);
    }

    /// Record a session ending
    pub fn session_closed(&self) {
        self.active_sessions.fetch_sub(1, Ordering::Relaxed);
        gauge!("uvscp.sessions.active").decrement(1.0);
    }

    /// Record a connection turned away for lack of a free worker
    pub fn connection_rejected(&self) {
        self.rejected_connections.fetch_add(1, Ordering::Relaxed);
        counter!("uvscp.connections.rejected").increment(1);
    }

    /// Record an event received from the bus
    pub fn frame_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
        counter!("uvscp.frames.received").increment(1);
    }

    /// Record an event written to the bus
    pub fn frame_transmitted(&self) {
        self.frames_transmitted.fetch_add(1, Ordering::Relaxed);
        counter!("uvscp.frames.transmitted").increment(1);
    }

    /// Record a bus frame that failed to decode
    pub fn frame_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
        counter!("uvscp.frames.dropped").increment(1);
    }

    /// Record a command answered with a negative status
    pub fn protocol_error(&self) {
        self.protocol_errors.fetch_add(1, Ordering::Relaxed);
        counter!("uvscp.errors.protocol").increment(1);
    }

    /// Current number of sessions
    pub fn active_sessions(&self) -> u64 {
        self.active_sessions.load(Ordering::Relaxed)
    }

    /// Sessions started since the gateway was created
    pub fn total_sessions(&self) -> u64 {
        self.total_sessions.load(Ordering::Relaxed)
    }

    /// Point-in-time view of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_sessions: self.total_sessions.load(Ordering::Relaxed),
            active_sessions: self.active_sessions.load(Ordering::Relaxed),
            rejected_connections: self.rejected_connections.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_transmitted: self.frames_transmitted.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            protocol_errors: self.protocol_errors.load(Ordering::Relaxed),
            uptime: self.started_at.elapsed(),
        }
    }
}

/// A snapshot of gateway metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    /// Sessions started
    pub total_sessions: u64,
    /// Sessions currently running
    pub active_sessions: u64,
    /// Connections rejected by the dispatcher
    pub rejected_connections: u64,
    /// Events received from the bus
    pub frames_received: u64,
    /// Events written to the bus
    pub frames_transmitted: u64,
    /// Malformed bus frames
    pub frames_dropped: u64,
    /// Negative status lines sent
    pub protocol_errors: u64,
    /// Time since the metrics were created
    pub uptime: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_tracking() {
        let metrics = GatewayMetrics::new();
        metrics.session_opened();
        metrics.session_opened();
        metrics.session_closed();

        assert_eq!(metrics.active_sessions(), 1);
        assert_eq!(metrics.total_sessions(), 2);
    }

    #[test]
    fn test_snapshot() {
        let metrics = GatewayMetrics::new();
        metrics.frame_received();
        metrics.frame_transmitted();
        metrics.frame_dropped();
        metrics.frame_dropped();
        metrics.connection_rejected();
        metrics.protocol_error();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.frames_received, 1);
        assert_eq!(snapshot.frames_transmitted, 1);
        assert_eq!(snapshot.frames_dropped, 2);
        assert_eq!(snapshot.rejected_connections, 1);
        assert_eq!(snapshot.protocol_errors, 1);
    }
}
