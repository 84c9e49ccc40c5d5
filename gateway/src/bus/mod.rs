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

//! Bus socket abstraction
//!
//! A session talks to the bus through one [`BusSocket`], opened by name from
//! the gateway's [`BusConnector`]. Two implementations are provided:
//!
//! - [`LoopbackBus`], an in-process software bus
//! - `SocketCanConnector`, a Linux SocketCAN raw socket (`socketcan` feature)

use async_trait::async_trait;
use std::io;
use uvscp_vscpcodec::CanFrame;
use uvscp_vscpcodec::consts::{CAN_EFF_FLAG, CAN_EFF_MASK};

mod loopback;
#[cfg(all(target_os = "linux", feature = "socketcan"))]
mod socketcan;

pub use self::loopback::{LoopbackBus, LoopbackSocket};
#[cfg(all(target_os = "linux", feature = "socketcan"))]
pub use self::socketcan::{SocketCanConnector, SocketCanSocket};

/// A frame together with its capture time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceivedFrame {
    /// The frame as read from the bus
    pub frame: CanFrame,
    /// Capture time in microseconds, monotonic per socket
    pub timestamp: u64,
}

/// Identifier acceptance filter for extended frames
///
/// A frame passes when its identifier bits selected by `mask` equal those of
/// `id`. Frames without the extended format flag never pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BusFilter {
    /// Identifier to compare against
    pub id: u32,
    /// Identifier bits that take part in the comparison
    pub mask: u32,
}

impl BusFilter {
    /// Create a filter, keeping only the 29 identifier bits
    pub fn new(id: u32, mask: u32) -> Self {
        Self {
            id: id & CAN_EFF_MASK,
            mask: mask & CAN_EFF_MASK,
        }
    }

    /// Filter that passes every extended frame
    pub fn accept_all() -> Self {
        Self::default()
    }

    /// Same filter with another identifier
    pub fn with_id(self, id: u32) -> Self {
        Self::new(id, self.mask)
    }

    /// Same filter with another mask
    pub fn with_mask(self, mask: u32) -> Self {
        Self::new(self.id, mask)
    }

    /// Identifier word with the extended format flag, as the kernel expects it
    pub fn raw_id(&self) -> u32 {
        self.id | CAN_EFF_FLAG
    }

    /// Mask word with the extended format flag, as the kernel expects it
    pub fn raw_mask(&self) -> u32 {
        self.mask | CAN_EFF_FLAG
    }

    /// Check if `frame` passes the filter
    pub fn matches(&self, frame: &CanFrame) -> bool {
        (frame.can_id() & self.raw_mask()) == (self.raw_id() & self.raw_mask())
    }
}

/// One session's handle on a bus
#[async_trait]
pub trait BusSocket: Send {
    /// Wait for the next frame that passes the filter
    ///
    /// Must be cancel safe; the session loop races it against other events.
    async fn recv(&mut self) -> io::Result<ReceivedFrame>;

    /// Write a frame to the bus
    fn send(&self, frame: &CanFrame) -> io::Result<()>;

    /// Replace the acceptance filter
    fn set_filter(&mut self, filter: BusFilter) -> io::Result<()>;

    /// Name of the interface this socket is bound to
    fn interface(&self) -> &str;
}

/// Opens bus sockets by interface name
pub trait BusConnector: Send + Sync {
    /// Open a socket bound to `interface`
    fn open(&self, interface: &str) -> io::Result<Box<dyn BusSocket>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use uvscp_vscpcodec::pack_id;

    fn frame(id: u32) -> CanFrame {
        CanFrame::new(id | CAN_EFF_FLAG, &[]).unwrap()
    }

    #[test]
    fn test_accept_all() {
        let filter = BusFilter::accept_all();
        assert!(filter.matches(&frame(0)));
        assert!(filter.matches(&frame(CAN_EFF_MASK)));
        assert!(!filter.matches(&CanFrame::new(0x123, &[]).unwrap()));
    }

    #[test]
    fn test_class_filter() {
        let class_mask = 0x1FF << 16;
        let filter = BusFilter::accept_all()
            .with_id(pack_id(0, 20, 0, 0))
            .with_mask(class_mask);
        assert!(filter.matches(&frame(pack_id(0, 20, 3, 9))));
        assert!(filter.matches(&frame(pack_id(0xE0, 20, 7, 1))));
        assert!(!filter.matches(&frame(pack_id(0, 21, 3, 9))));
    }

    #[test]
    fn test_new_truncates() {
        let filter = BusFilter::new(0xFFFF_FFFF, 0xFFFF_FFFF);
        assert_eq!(filter.id, CAN_EFF_MASK);
        assert_eq!(filter.raw_id(), CAN_EFF_MASK | CAN_EFF_FLAG);
    }
}
