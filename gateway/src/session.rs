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

//! Per-connection session engine
//!
//! A session owns everything tied to one client: its bus socket, receive
//! queue, command interpreter, authentication state and counters. Its loop
//! waits on the client, the bus, a poll timer and the gateway's cancellation
//! token, whichever comes first:
//!
//! - client bytes are fed to the interpreter and answered
//! - bus frames are decoded, then queued (normal mode) or written straight
//!   to the client (loop mode); frames that fail to decode are counted and
//!   dropped
//! - in loop mode a bare `+OK` keepalive is written when the poll timer
//!   fires and the keepalive interval has passed
//!
//! The session ends on `quit`, client hang-up, a bus error (reported to the
//! client first) or gateway shutdown.

use crate::bus::{BusConnector, BusFilter, BusSocket, ReceivedFrame};
use crate::commands::{GatewayCommandTable, command_table};
use crate::config::GatewayConfig;
use crate::error::{CommandError, CommandResult};
use crate::metrics::GatewayMetrics;
use crate::queue::EventQueue;
use crate::types::{SessionId, SessionMode, SessionStatistics};
use bytes::BytesMut;
use futures::SinkExt;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tokio_util::codec::FramedWrite;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace, warn};
use uvscp_cmdinterp::CommandInterpreter;
use uvscp_vscpcodec::{Guid, Response, ResponseCodec, VscpMessage, decode_frame};

const READ_BUFFER_SIZE: usize = 512;

/// State of one session that command handlers operate on
pub struct SessionState {
    id: SessionId,
    config: Arc<GatewayConfig>,
    metrics: Arc<GatewayMetrics>,
    pub(crate) bus: Box<dyn BusSocket>,
    pub(crate) queue: EventQueue<VscpMessage>,
    pub(crate) user_ok: bool,
    pub(crate) password_ok: bool,
    mode: SessionMode,
    pub(crate) filter: BusFilter,
    pub(crate) guid: Guid,
    pub(crate) stats: SessionStatistics,
    last_keepalive: Instant,
    output: Vec<Response>,
    stopped: bool,
}

impl SessionState {
    /// Create the state for a session bound to `bus`
    ///
    /// Each credential that is not configured counts as already presented.
    pub fn new(
        id: SessionId,
        config: Arc<GatewayConfig>,
        metrics: Arc<GatewayMetrics>,
        bus: Box<dyn BusSocket>,
    ) -> Self {
        Self {
            id,
            queue: EventQueue::new(config.queue_capacity),
            user_ok: config.username.is_none(),
            password_ok: config.password.is_none(),
            mode: SessionMode::Normal,
            filter: BusFilter::accept_all(),
            guid: config.guid,
            stats: SessionStatistics::default(),
            last_keepalive: Instant::now(),
            output: Vec::new(),
            stopped: false,
            config,
            metrics,
            bus,
        }
    }

    /// Session identifier
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Gateway configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Gateway metrics
    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }

    /// Check if the client may issue privileged commands
    pub fn is_authenticated(&self) -> bool {
        self.user_ok && self.password_ok
    }

    /// Current mode
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Switch mode
    pub fn set_mode(&mut self, mode: SessionMode) {
        if self.mode != mode {
            debug!(session = %self.id, %mode, "Session mode changed");
            self.mode = mode;
            self.last_keepalive = Instant::now();
        }
    }

    /// Node GUID of the session
    pub fn guid(&self) -> Guid {
        self.guid
    }

    /// Active acceptance filter
    pub fn filter(&self) -> BusFilter {
        self.filter
    }

    /// Install a new acceptance filter on the bus socket
    pub fn apply_filter(&mut self, filter: BusFilter) -> CommandResult {
        self.bus.set_filter(filter)?;
        self.filter = filter;
        Ok(())
    }

    /// Traffic counters
    pub fn statistics(&self) -> SessionStatistics {
        self.stats
    }

    /// Events waiting for retrieval
    pub fn queued(&self) -> usize {
        self.queue.used()
    }

    /// Queue a line for the client
    pub fn reply(&mut self, response: Response) {
        self.output.push(response);
    }

    /// Remove and return all lines queued for the client
    pub fn take_output(&mut self) -> Vec<Response> {
        std::mem::take(&mut self.output)
    }

    /// Ask the session loop to finish
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Check if the session loop will finish
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Handle one frame read from the bus
    pub fn on_frame(&mut self, received: ReceivedFrame) {
        let msg = match decode_frame(&received.frame, received.timestamp, &self.guid) {
            Ok(msg) => msg,
            Err(error) => {
                self.stats.dropped_frames += 1;
                self.metrics.frame_dropped();
                trace!(session = %self.id, %error, "Dropping malformed frame");
                return;
            }
        };
        self.stats.record_rx(msg.data().len());
        self.metrics.frame_received();
        match self.mode {
            SessionMode::Loop => self.reply(Response::Event(msg)),
            SessionMode::Normal => {
                if self.queue.push(msg) {
                    self.stats.overruns += 1;
                }
            }
        }
    }

    /// Queue a keepalive if in loop mode and one is due
    pub fn on_idle(&mut self) {
        if self.mode == SessionMode::Loop
            && self.last_keepalive.elapsed() >= self.config.keepalive_interval
        {
            self.reply(Response::ok());
            self.last_keepalive = Instant::now();
        }
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("id", &self.id)
            .field("interface", &self.bus.interface())
            .field("mode", &self.mode)
            .field("authenticated", &self.is_authenticated())
            .field("guid", &self.guid)
            .field("filter", &self.filter)
            .field("queued", &self.queue.used())
            .field("stats", &self.stats)
            .finish()
    }
}

/// A client session ready to run
pub struct Session {
    peer: SocketAddr,
    interpreter: CommandInterpreter<SessionState, CommandError>,
    state: SessionState,
}

impl Session {
    /// Create a session for `peer`
    pub fn new(
        peer: SocketAddr,
        table: Arc<GatewayCommandTable>,
        state: SessionState,
    ) -> Self {
        let interpreter = CommandInterpreter::new(table, state.config().interpreter_config());
        Self {
            peer,
            interpreter,
            state,
        }
    }

    /// Session state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Run the session until it stops, the client leaves or `cancel` fires
    ///
    /// Client I/O errors end the session and are returned; there is no one
    /// left to report them to.
    #[instrument(skip_all, fields(session = %self.state.id, peer = %self.peer))]
    pub async fn run<R, W>(mut self, mut reader: R, writer: W, cancel: CancellationToken) -> io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut writer = FramedWrite::new(writer, ResponseCodec::new());
        let banner = self.state.config().banner.clone();
        self.state.reply(Response::text(banner));
        self.state.reply(Response::success("Success."));
        self.flush(&mut writer, &cancel).await?;

        let poll_interval = self.state.config().poll_interval;
        let mut buffer = BytesMut::with_capacity(READ_BUFFER_SIZE);

        while !self.state.is_stopped() {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Session cancelled");
                    break;
                }
                read = reader.read_buf(&mut buffer) => match read {
                    Ok(0) => {
                        debug!("Client closed connection");
                        break;
                    }
                    Ok(_) => self.process_input(&mut buffer),
                    Err(error) => {
                        debug!(%error, "Client read failed");
                        return Err(error);
                    }
                },
                received = self.state.bus.recv() => match received {
                    Ok(frame) => self.state.on_frame(frame),
                    Err(error) => {
                        warn!(%error, "Bus failure, closing session");
                        self.state.reply(Response::failure(CommandError::Bus(error)));
                        self.state.stop();
                    }
                },
                _ = sleep(poll_interval) => self.state.on_idle(),
            }
            self.flush(&mut writer, &cancel).await?;
        }

        debug!(stats = ?self.state.statistics(), "Session finished");
        Ok(())
    }

    fn process_input(&mut self, buffer: &mut BytesMut) {
        while let Some(result) = self.interpreter.feed(buffer, &mut self.state) {
            if let Err(error) = result {
                debug!(%error, "Command failed");
                self.state.metrics().protocol_error();
                self.state.reply(Response::failure(error));
            }
            if self.state.is_stopped() {
                buffer.clear();
                break;
            }
        }
    }

    /// Write pending replies, giving up on cancellation or a stalled client
    async fn flush<W>(
        &mut self,
        writer: &mut FramedWrite<W, ResponseCodec>,
        cancel: &CancellationToken,
    ) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let output = self.state.take_output();
        if output.is_empty() {
            return Ok(());
        }
        let write = async {
            for response in output {
                writer.feed(response).await?;
            }
            writer.flush().await
        };
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Session cancelled while writing");
                Err(io::Error::new(io::ErrorKind::Interrupted, "session cancelled"))
            }
            written = timeout(self.state.config().write_timeout, write) => match written {
                Ok(result) => result,
                Err(_) => {
                    warn!("Client stopped reading, closing session");
                    Err(io::Error::new(io::ErrorKind::TimedOut, "client write timed out"))
                }
            },
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("peer", &self.peer)
            .field("state", &self.state)
            .finish()
    }
}

/// Everything a worker needs to turn a connection into a session
#[derive(Clone)]
pub struct SessionContext {
    config: Arc<GatewayConfig>,
    metrics: Arc<GatewayMetrics>,
    connector: Arc<dyn BusConnector>,
    table: Arc<GatewayCommandTable>,
    interface: Arc<str>,
    next_id: Arc<AtomicU64>,
}

impl SessionContext {
    /// Create a context for sessions on `interface`
    pub fn new(
        config: Arc<GatewayConfig>,
        metrics: Arc<GatewayMetrics>,
        connector: Arc<dyn BusConnector>,
        interface: &str,
    ) -> Self {
        Self {
            config,
            metrics,
            connector,
            table: command_table(),
            interface: Arc::from(interface),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Gateway metrics
    pub fn metrics(&self) -> &Arc<GatewayMetrics> {
        &self.metrics
    }

    /// Serve one client connection to completion
    pub async fn serve(&self, stream: TcpStream, peer: SocketAddr, cancel: CancellationToken) {
        let id = SessionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (reader, writer) = stream.into_split();

        let bus = match self.connector.open(&self.interface) {
            Ok(bus) => bus,
            Err(error) => {
                warn!(%id, %peer, interface = %self.interface, %error, "Bus unavailable");
                let mut writer = FramedWrite::new(writer, ResponseCodec::new());
                let notice = Response::failure(format!("Bus unavailable: {}", error));
                if let Err(error) = writer.send(notice).await {
                    debug!(%id, %error, "Failed to notify client");
                }
                return;
            }
        };

        self.metrics.session_opened();
        let state = SessionState::new(id, self.config.clone(), self.metrics.clone(), bus);
        let session = Session::new(peer, self.table.clone(), state);
        if let Err(error) = session.run(reader, writer, cancel).await {
            debug!(%id, %peer, %error, "Session ended with client error");
        }
        self.metrics.session_closed();
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("interface", &self.interface)
            .field("table", &self.table)
            .finish()
    }
}
