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

//! VSCP Gateway Service
//!
//! Bridges a CAN bus carrying VSCP events to TCP clients speaking the VSCP
//! text protocol. Each client connection becomes a session with its own bus
//! socket, receive queue, filter and command interpreter.
//!
//! # Architecture
//!
//! ```text
//! Gateway
//!     ↓
//! WorkerPool (dispatcher + N workers)
//!     ↓
//! Session → CommandInterpreter → command handlers
//!     ↓
//! BusSocket (LoopbackBus, SocketCAN)
//! ```
//!
//! A connection that arrives while every worker is busy is rejected with
//! `-OK - Server busy, no free worker`, never queued.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use uvscp_gateway::{Gateway, GatewayConfig};
//! use uvscp_gateway::bus::LoopbackBus;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GatewayConfig::default().with_credentials("admin", "secret");
//!     let gateway = Gateway::new(config, Arc::new(LoopbackBus::new("vcan0")));
//!     let addr = gateway.start("vcan0", "127.0.0.1".parse()?, 0).await?;
//!     println!("listening on {}", addr);
//!     gateway.stop().await?;
//!     Ok(())
//! }
//! ```

pub mod bus;
mod commands;
mod config;
mod error;
mod metrics;
mod pool;
mod queue;
mod server;
mod session;
mod types;

pub use commands::{GatewayCommandTable, command_table};
pub use config::{DEFAULT_PORT, GatewayConfig};
pub use error::{CommandError, CommandResult, GatewayError, GatewayResult};
pub use metrics::{GatewayMetrics, MetricsSnapshot};
pub use pool::BUSY_MESSAGE;
pub use queue::EventQueue;
pub use server::Gateway;
pub use session::{Session, SessionContext, SessionState};
pub use types::{SessionId, SessionMode, SessionStatistics};
