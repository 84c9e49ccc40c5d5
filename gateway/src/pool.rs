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

//! Fixed-size worker pool and connection dispatcher
//!
//! Every worker owns a capacity-one hand-off channel and serves one session
//! at a time. Idle workers announce themselves on a shared idle channel. The
//! dispatcher accepts a connection and takes the next idle worker without
//! waiting; when there is none the connection is told so and closed.

use crate::session::SessionContext;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uvscp_vscpcodec::Response;
use uvscp_vscpcodec::consts::LINE_TERMINATOR;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Reply sent to a connection that found no free worker
pub const BUSY_MESSAGE: &str = "Server busy, no free worker";

type Assignment = (TcpStream, SocketAddr);

/// Peer currently served by a worker, `None` while idle
#[derive(Debug, Clone, Default)]
pub struct WorkerPeer(Arc<Mutex<Option<SocketAddr>>>);

impl WorkerPeer {
    fn lock(&self) -> MutexGuard<'_, Option<SocketAddr>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set(&self, peer: Option<SocketAddr>) {
        *self.lock() = peer;
    }

    /// The peer being served
    pub fn get(&self) -> Option<SocketAddr> {
        *self.lock()
    }
}

#[derive(Debug)]
struct WorkerSlot {
    peer: WorkerPeer,
    handle: JoinHandle<()>,
}

/// A running pool: its workers and the dispatcher feeding them
#[derive(Debug)]
pub(crate) struct WorkerPool {
    slots: Vec<WorkerSlot>,
    dispatcher: JoinHandle<()>,
}

impl WorkerPool {
    /// Spawn `workers` workers and a dispatcher accepting on `listener`
    pub(crate) fn spawn(
        listener: TcpListener,
        workers: usize,
        context: SessionContext,
        cancel: CancellationToken,
    ) -> Self {
        let (idle_tx, idle_rx) = mpsc::channel(workers);
        let mut senders = Vec::with_capacity(workers);
        let mut slots = Vec::with_capacity(workers);

        for id in 0..workers {
            let (sender, receiver) = mpsc::channel(1);
            let peer = WorkerPeer::default();
            // Idle from the start, before the worker task first runs.
            if idle_tx.try_send(id).is_err() {
                error!(worker = id, "Idle channel full at startup");
            }
            let handle = tokio::spawn(run_worker(
                id,
                receiver,
                idle_tx.clone(),
                peer.clone(),
                context.clone(),
                cancel.clone(),
            ));
            senders.push(sender);
            slots.push(WorkerSlot { peer, handle });
        }

        let dispatcher = Dispatcher {
            listener,
            senders,
            idle: idle_rx,
            context,
        };
        let dispatcher = tokio::spawn(dispatcher.run(cancel));

        Self { slots, dispatcher }
    }

    /// Peers currently being served
    pub(crate) fn peers(&self) -> Vec<SocketAddr> {
        self.slots.iter().filter_map(|slot| slot.peer.get()).collect()
    }

    /// Number of workers
    pub(crate) fn size(&self) -> usize {
        self.slots.len()
    }

    /// Wait for the dispatcher and all workers after cancellation
    ///
    /// Tasks still running after `grace` are aborted.
    pub(crate) async fn join(self, grace: Duration) {
        let handles = std::iter::once(self.dispatcher)
            .chain(self.slots.into_iter().map(|slot| slot.handle));
        for mut handle in handles {
            match timeout(grace, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => warn!(%error, "Pool task failed"),
                Err(_) => {
                    warn!("Pool task did not stop in time, aborting");
                    handle.abort();
                }
            }
        }
    }
}

struct Dispatcher {
    listener: TcpListener,
    senders: Vec<mpsc::Sender<Assignment>>,
    idle: mpsc::Receiver<usize>,
    context: SessionContext,
}

impl Dispatcher {
    async fn run(mut self, cancel: CancellationToken) {
        loop {
            let accepted = tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = self.listener.accept() => accepted,
            };
            match accepted {
                Ok((stream, peer)) => self.assign(stream, peer).await,
                Err(error) => {
                    // Accept failures are not fatal to the pool.
                    error!(%error, "Failed to accept connection");
                    sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
        info!("Dispatcher stopped");
    }

    async fn assign(&mut self, stream: TcpStream, peer: SocketAddr) {
        let Ok(worker) = self.idle.try_recv() else {
            self.reject(stream, peer);
            return;
        };
        debug!(%peer, worker, "Assigning connection");
        if let Err(mpsc::error::SendError((stream, peer))) =
            self.senders[worker].send((stream, peer)).await
        {
            warn!(%peer, worker, "Worker gone");
            self.reject(stream, peer);
        }
    }

    fn reject(&self, stream: TcpStream, peer: SocketAddr) {
        warn!(%peer, "No free worker, rejecting connection");
        self.context.metrics().connection_rejected();
        let notice = format!("{}{}", Response::failure(BUSY_MESSAGE), LINE_TERMINATOR);
        if let Err(error) = stream.try_write(notice.as_bytes()) {
            debug!(%peer, %error, "Failed to send busy notice");
        }
    }
}

async fn run_worker(
    id: usize,
    mut assignments: mpsc::Receiver<Assignment>,
    idle: mpsc::Sender<usize>,
    peer_slot: WorkerPeer,
    context: SessionContext,
    cancel: CancellationToken,
) {
    debug!(worker = id, "Worker started");
    loop {
        let (stream, peer) = tokio::select! {
            _ = cancel.cancelled() => break,
            assignment = assignments.recv() => match assignment {
                Some(assignment) => assignment,
                None => break,
            },
        };

        peer_slot.set(Some(peer));
        info!(worker = id, %peer, "Session started");
        let session = {
            let context = context.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { context.serve(stream, peer, cancel).await })
        };
        match session.await {
            Ok(()) => info!(worker = id, %peer, "Session ended"),
            Err(error) => error!(worker = id, %peer, %error, "Session aborted"),
        }
        peer_slot.set(None);

        if cancel.is_cancelled() || idle.send(id).await.is_err() {
            break;
        }
    }
    debug!(worker = id, "Worker stopped");
}
