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

//! VSCP gateway daemon
//!
//! Bridges a CAN interface to VSCP text protocol clients.
//!
//! ## Usage
//!
//! ```bash
//! # Software bus, useful without CAN hardware
//! cargo run --example uvscpd -- --interface vcan0
//!
//! # SocketCAN (Linux)
//! cargo run --example uvscpd --features socketcan -- --interface can0 --socketcan
//! ```
//!
//! Then connect with:
//! ```bash
//! telnet localhost 8598
//! ```

use clap::Parser;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::info;
use uvscp_gateway::bus::{BusConnector, LoopbackBus};
use uvscp_gateway::{DEFAULT_PORT, Gateway, GatewayConfig};
use uvscp_vscpcodec::Guid;

#[derive(Parser, Debug)]
#[command(version, about = "VSCP CAN-bus to TCP gateway")]
struct Args {
    /// Bus interface to bridge
    #[arg(short, long, default_value = "can0")]
    interface: String,

    /// Address to listen on
    #[arg(short, long, default_value = "0.0.0.0")]
    address: IpAddr,

    /// TCP port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Username clients must present
    #[arg(short, long)]
    user: Option<String>,

    /// Password clients must present
    #[arg(long)]
    password: Option<String>,

    /// Node GUID, 16 colon separated hex octets
    #[arg(short, long)]
    guid: Option<Guid>,

    /// Number of concurrent sessions
    #[arg(short, long, default_value_t = 5)]
    workers: usize,

    /// Use a SocketCAN raw socket instead of the software bus
    #[arg(long)]
    socketcan: bool,
}

fn connector(args: &Args) -> Result<Arc<dyn BusConnector>, Box<dyn std::error::Error>> {
    if args.socketcan {
        #[cfg(all(target_os = "linux", feature = "socketcan"))]
        return Ok(Arc::new(uvscp_gateway::bus::SocketCanConnector::new()));
        #[cfg(not(all(target_os = "linux", feature = "socketcan")))]
        return Err("built without the socketcan feature".into());
    }
    Ok(Arc::new(LoopbackBus::new(args.interface.clone())))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let mut config = GatewayConfig::default()
        .with_username(args.user.clone())
        .with_password(args.password.clone())
        .with_workers(args.workers);
    if let Some(guid) = args.guid {
        config = config.with_guid(guid);
    }

    let gateway = Gateway::new(config, connector(&args)?);
    let addr = gateway.start(&args.interface, args.address, args.port).await?;
    info!(%addr, interface = %args.interface, "uvscpd running, press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;

    gateway.stop().await?;
    Ok(())
}
