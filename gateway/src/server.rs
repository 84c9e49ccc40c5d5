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

//! Gateway lifecycle
//!
//! The [`Gateway`] is the entry point for the bootstrap code: it binds the
//! listening socket, spawns the worker pool and tears everything down again.

use crate::bus::BusConnector;
use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::metrics::GatewayMetrics;
use crate::pool::WorkerPool;
use crate::session::SessionContext;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// VSCP CAN-bus to TCP gateway
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use uvscp_gateway::{Gateway, GatewayConfig, DEFAULT_PORT};
/// use uvscp_gateway::bus::LoopbackBus;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let bus = LoopbackBus::new("vcan0");
///     let gateway = Gateway::new(GatewayConfig::default(), Arc::new(bus));
///
///     gateway.start("vcan0", "0.0.0.0".parse()?, DEFAULT_PORT).await?;
///     tokio::signal::ctrl_c().await?;
///     gateway.stop().await?;
///     Ok(())
/// }
/// ```
pub struct Gateway {
    config: Arc<GatewayConfig>,
    connector: Arc<dyn BusConnector>,
    metrics: Arc<GatewayMetrics>,
    running: Mutex<Option<Running>>,
}

struct Running {
    local_addr: SocketAddr,
    interface: String,
    cancel: CancellationToken,
    pool: WorkerPool,
}

impl Gateway {
    /// Create a stopped gateway
    pub fn new(config: GatewayConfig, connector: Arc<dyn BusConnector>) -> Self {
        Self {
            config: Arc::new(config),
            connector,
            metrics: Arc::new(GatewayMetrics::new()),
            running: Mutex::new(None),
        }
    }

    /// Start serving clients on `address:port`, bridging to bus `interface`
    ///
    /// Returns the bound address, which differs from the requested one when
    /// `port` is 0.
    pub async fn start(&self, interface: &str, address: IpAddr, port: u16) -> GatewayResult<SocketAddr> {
        self.config.validate().map_err(GatewayError::InvalidConfig)?;

        let mut running = self.running.lock().await;
        if running.is_some() {
            return Err(GatewayError::AlreadyRunning);
        }

        let requested = SocketAddr::new(address, port);
        let listener = TcpListener::bind(requested)
            .await
            .map_err(|source| GatewayError::Bind {
                address: requested,
                source,
            })?;
        let local_addr = listener.local_addr()?;

        let cancel = CancellationToken::new();
        let context = SessionContext::new(
            self.config.clone(),
            self.metrics.clone(),
            self.connector.clone(),
            interface,
        );
        let pool = WorkerPool::spawn(listener, self.config.workers, context, cancel.clone());

        info!(%local_addr, interface, workers = pool.size(), "Gateway started");
        *running = Some(Running {
            local_addr,
            interface: interface.to_string(),
            cancel,
            pool,
        });
        Ok(local_addr)
    }

    /// Stop accepting clients and end every session
    pub async fn stop(&self) -> GatewayResult<()> {
        let running = self.running.lock().await.take().ok_or(GatewayError::NotRunning)?;

        info!(local_addr = %running.local_addr, "Stopping gateway");
        running.cancel.cancel();
        running.pool.join(self.config.shutdown_timeout).await;
        info!("Gateway stopped");
        Ok(())
    }

    /// Check if the gateway is serving
    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// Address the gateway listens on, while running
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().await.as_ref().map(|running| running.local_addr)
    }

    /// Bus interface sessions are bound to, while running
    pub async fn interface(&self) -> Option<String> {
        self.running
            .lock()
            .await
            .as_ref()
            .map(|running| running.interface.clone())
    }

    /// Peers of the sessions currently being served
    pub async fn peers(&self) -> Vec<SocketAddr> {
        self.running
            .lock()
            .await
            .as_ref()
            .map(|running| running.pool.peers())
            .unwrap_or_default()
    }

    /// Gateway metrics
    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        self.metrics.clone()
    }

    /// Gateway configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("config", &self.config)
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        if let Some(running) = self.running.get_mut().take() {
            warn!("Gateway dropped while still running");
            running.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::LoopbackBus;
    use std::net::Ipv4Addr;

    fn gateway() -> Gateway {
        Gateway::new(GatewayConfig::default(), Arc::new(LoopbackBus::new("vcan0")))
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let gateway = gateway();
        assert!(!gateway.is_running().await);

        let addr = gateway.start("vcan0", Ipv4Addr::LOCALHOST.into(), 0).await.unwrap();
        assert_ne!(addr.port(), 0);
        assert!(gateway.is_running().await);
        assert_eq!(gateway.local_addr().await, Some(addr));
        assert_eq!(gateway.interface().await.as_deref(), Some("vcan0"));

        gateway.stop().await.unwrap();
        assert!(!gateway.is_running().await);
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_double_start() {
        let gateway = gateway();
        gateway.start("vcan0", Ipv4Addr::LOCALHOST.into(), 0).await.unwrap();
        assert!(matches!(
            gateway.start("vcan0", Ipv4Addr::LOCALHOST.into(), 0).await,
            Err(GatewayError::AlreadyRunning)
        ));
        gateway.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_when_stopped() {
        assert!(matches!(gateway().stop().await, Err(GatewayError::NotRunning)));
    }

    #[tokio::test]
    async fn test_invalid_config() {
        let gateway = Gateway::new(
            GatewayConfig::default().with_workers(0),
            Arc::new(LoopbackBus::new("vcan0")),
        );
        assert!(matches!(
            gateway.start("vcan0", Ipv4Addr::LOCALHOST.into(), 0).await,
            Err(GatewayError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_bind_failure() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let result = gateway().start("vcan0", Ipv4Addr::LOCALHOST.into(), port).await;
        assert!(matches!(result, Err(GatewayError::Bind { .. })));
    }
}
