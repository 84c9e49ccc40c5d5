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

//! Linux SocketCAN raw sockets

use super::{BusConnector, BusFilter, BusSocket, ReceivedFrame};
use ::socketcan::{
    CanDataFrame, CanFilter, CanSocket, EmbeddedFrame, ExtendedId, Frame, Socket, SocketOptions,
};
use async_trait::async_trait;
use std::io;
use std::time::Instant;
use tokio::io::unix::AsyncFd;
use tracing::{debug, trace};
use uvscp_vscpcodec::CanFrame;
use uvscp_vscpcodec::consts::CAN_MAX_DLEN;

/// Opens SocketCAN raw sockets by interface name, e.g. `can0`
#[derive(Debug, Clone, Copy, Default)]
pub struct SocketCanConnector;

impl SocketCanConnector {
    /// Create a new connector
    pub fn new() -> Self {
        Self
    }
}

impl BusConnector for SocketCanConnector {
    fn open(&self, interface: &str) -> io::Result<Box<dyn BusSocket>> {
        let socket = CanSocket::open(interface)?;
        socket.set_nonblocking(true)?;
        let mut socket = SocketCanSocket {
            interface: interface.to_string(),
            inner: AsyncFd::new(socket)?,
            epoch: Instant::now(),
        };
        socket.set_filter(BusFilter::accept_all())?;
        debug!(interface, "Opened CAN socket");
        Ok(Box::new(socket))
    }
}

/// A raw CAN socket registered with the tokio reactor
#[derive(Debug)]
pub struct SocketCanSocket {
    interface: String,
    inner: AsyncFd<CanSocket>,
    epoch: Instant,
}

fn to_frame(frame: &::socketcan::CanFrame) -> CanFrame {
    let payload = EmbeddedFrame::data(frame);
    let mut data = [0u8; CAN_MAX_DLEN];
    let len = payload.len().min(CAN_MAX_DLEN);
    data[..len].copy_from_slice(&payload[..len]);
    CanFrame::from_raw(Frame::id_word(frame), payload.len() as u8, data)
}

#[async_trait]
impl BusSocket for SocketCanSocket {
    async fn recv(&mut self) -> io::Result<ReceivedFrame> {
        loop {
            let mut guard = self.inner.readable().await?;
            match guard.try_io(|inner| inner.get_ref().read_frame()) {
                Ok(result) => {
                    let frame = to_frame(&result?);
                    trace!(interface = %self.interface, can_id = frame.can_id(), "CAN frame");
                    return Ok(ReceivedFrame {
                        frame,
                        timestamp: self.epoch.elapsed().as_micros() as u64,
                    });
                }
                Err(_would_block) => continue,
            }
        }
    }

    fn send(&self, frame: &CanFrame) -> io::Result<()> {
        let id = ExtendedId::new(frame.raw_id())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "identifier out of range"))?;
        let data = CanDataFrame::new(id, frame.data())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "payload too long"))?;
        self.inner.get_ref().write_frame(&data)
    }

    fn set_filter(&mut self, filter: BusFilter) -> io::Result<()> {
        self.inner
            .get_ref()
            .set_filters(&[CanFilter::new(filter.raw_id(), filter.raw_mask())])
    }

    fn interface(&self) -> &str {
        &self.interface
    }
}
