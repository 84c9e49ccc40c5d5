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

//! In-process software bus

use super::{BusConnector, BusFilter, BusSocket, ReceivedFrame};
use async_trait::async_trait;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};
use uvscp_vscpcodec::CanFrame;

const DEFAULT_BACKLOG: usize = 1024;
const INJECTOR: u64 = 0;

/// A named software bus shared by any number of sockets
///
/// Every frame written by one socket is delivered to all other sockets whose
/// filter accepts it. A socket never sees its own frames. Cloning yields
/// another handle on the same bus.
///
/// ```
/// use uvscp_gateway::bus::{BusConnector, LoopbackBus};
///
/// let bus = LoopbackBus::new("vcan0");
/// assert!(bus.open("vcan0").is_ok());
/// assert!(bus.open("can1").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct LoopbackBus {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    name: String,
    sender: broadcast::Sender<(u64, CanFrame)>,
    next_socket: AtomicU64,
    epoch: Instant,
    closed: CancellationToken,
}

impl LoopbackBus {
    /// Create a bus with the default backlog
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_backlog(name, DEFAULT_BACKLOG)
    }

    /// Create a bus where each socket buffers up to `backlog` frames
    pub fn with_backlog(name: impl Into<String>, backlog: usize) -> Self {
        let (sender, _) = broadcast::channel(backlog.max(1));
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                sender,
                next_socket: AtomicU64::new(INJECTOR + 1),
                epoch: Instant::now(),
                closed: CancellationToken::new(),
            }),
        }
    }

    /// Interface name of the bus
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Open a new socket accepting every extended frame
    pub fn socket(&self) -> LoopbackSocket {
        LoopbackSocket {
            id: self.inner.next_socket.fetch_add(1, Ordering::Relaxed),
            bus: self.inner.clone(),
            receiver: self.inner.sender.subscribe(),
            filter: BusFilter::accept_all(),
        }
    }

    /// Put a frame on the bus from outside any socket
    ///
    /// Returns the number of sockets the frame was offered to.
    pub fn inject(&self, frame: CanFrame) -> usize {
        self.inner.sender.send((INJECTOR, frame)).unwrap_or(0)
    }

    /// Number of sockets currently open
    pub fn sockets(&self) -> usize {
        self.inner.sender.receiver_count()
    }

    /// Take the bus down; pending and future receives fail
    pub fn close(&self) {
        self.inner.closed.cancel();
    }
}

impl BusConnector for LoopbackBus {
    fn open(&self, interface: &str) -> io::Result<Box<dyn BusSocket>> {
        if interface != self.inner.name {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such interface '{}'", interface),
            ));
        }
        if self.inner.closed.is_cancelled() {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "bus is down"));
        }
        Ok(Box::new(self.socket()))
    }
}

/// A socket on a [`LoopbackBus`]
#[derive(Debug)]
pub struct LoopbackSocket {
    id: u64,
    bus: Arc<Inner>,
    receiver: broadcast::Receiver<(u64, CanFrame)>,
    filter: BusFilter,
}

impl LoopbackSocket {
    fn timestamp(&self) -> u64 {
        self.bus.epoch.elapsed().as_micros() as u64
    }
}

#[async_trait]
impl BusSocket for LoopbackSocket {
    async fn recv(&mut self) -> io::Result<ReceivedFrame> {
        loop {
            let received = tokio::select! {
                received = self.receiver.recv() => received,
                _ = self.bus.closed.cancelled() => {
                    return Err(io::Error::new(io::ErrorKind::ConnectionAborted, "bus is down"));
                }
            };
            match received {
                Ok((sender, frame)) => {
                    if sender == self.id || !self.filter.matches(&frame) {
                        continue;
                    }
                    trace!(bus = %self.bus.name, can_id = frame.can_id(), "Loopback frame");
                    return Ok(ReceivedFrame {
                        frame,
                        timestamp: self.timestamp(),
                    });
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(bus = %self.bus.name, skipped, "Loopback socket lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(io::Error::new(io::ErrorKind::ConnectionAborted, "bus is down"));
                }
            }
        }
    }

    fn send(&self, frame: &CanFrame) -> io::Result<()> {
        if self.bus.closed.is_cancelled() {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "bus is down"));
        }
        // A send with no other listener is not an error on a real bus either.
        let _ = self.bus.sender.send((self.id, *frame));
        Ok(())
    }

    fn set_filter(&mut self, filter: BusFilter) -> io::Result<()> {
        self.filter = filter;
        Ok(())
    }

    fn interface(&self) -> &str {
        &self.bus.name
    }
}
