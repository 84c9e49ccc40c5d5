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

//! Client command handlers
//!
//! Each handler answers with its own lines, ending in exactly one status
//! line, by pushing onto the session's output. A handler that fails pushes
//! nothing; the session turns the error into a `-OK - <error>` line.

use crate::error::{CommandError, CommandResult};
use crate::session::SessionState;
use crate::types::SessionMode;
use std::sync::Arc;
use tracing::{debug, info};
use uvscp_cmdinterp::{CommandHandler, CommandTable, Invocation};
use uvscp_vscpcodec::consts::CAN_EFF_MASK;
use uvscp_vscpcodec::{Guid, Response, encode_frame, parse_message, parse_number};

/// Command table type shared by all sessions
pub type GatewayCommandTable = CommandTable<SessionState, CommandError>;

type Handler = CommandHandler<SessionState, CommandError>;

const COMMANDS: &[(&str, Handler)] = &[
    ("noop", noop),
    ("quit", quit),
    ("user", user),
    ("pass", pass),
    ("send", send),
    ("retr", retr),
    ("rcvloop", rcvloop),
    ("quitloop", quitloop),
    ("checkdata", checkdata),
    ("clra", clra),
    ("getguid", getguid),
    ("setguid", setguid),
    ("setfilter", setfilter),
    ("setmask", setmask),
    ("stat", stat),
    ("version", version),
    ("interface", interface),
    ("help", help),
];

const SUCCESS: &str = "Success.";

/// Build the command table
pub fn command_table() -> Arc<GatewayCommandTable> {
    let table = COMMANDS
        .iter()
        .fold(CommandTable::new(), |table, &(name, handler)| table.with(name, handler));
    Arc::new(table)
}

fn arity(inv: &Invocation<'_>, min: usize, max: usize) -> CommandResult {
    if (min..=max).contains(&inv.argc()) {
        Ok(())
    } else {
        Err(CommandError::WrongArgumentCount)
    }
}

fn privileged(state: &SessionState, inv: &Invocation<'_>, min: usize, max: usize) -> CommandResult {
    if !state.is_authenticated() {
        return Err(CommandError::AccessDenied);
    }
    arity(inv, min, max)
}

fn identifier_arg(field: &'static str, value: &str) -> CommandResult<u32> {
    let number = parse_number(field, value)?;
    u32::try_from(number)
        .ok()
        .filter(|id| *id <= CAN_EFF_MASK)
        .ok_or_else(|| CommandError::InvalidArgument(format!("{} exceeds 29 bits", field)))
}

fn noop(state: &mut SessionState, inv: &mut Invocation<'_>) -> CommandResult {
    arity(inv, 0, 0)?;
    state.reply(Response::success(SUCCESS));
    Ok(())
}

fn quit(state: &mut SessionState, inv: &mut Invocation<'_>) -> CommandResult {
    arity(inv, 0, 0)?;
    state.reply(Response::success("Goodbye."));
    state.stop();
    Ok(())
}

fn user(state: &mut SessionState, inv: &mut Invocation<'_>) -> CommandResult {
    arity(inv, 1, 1)?;
    let name = inv.args()[0];
    state.user_ok = state
        .config()
        .username
        .as_deref()
        .is_none_or(|expected| expected == name);
    if !state.user_ok {
        return Err(CommandError::InvalidUsername);
    }
    debug!(user = name, "User accepted");
    state.reply(Response::success("User name accepted, password please"));
    Ok(())
}

fn pass(state: &mut SessionState, inv: &mut Invocation<'_>) -> CommandResult {
    inv.skip_history();
    arity(inv, 1, 1)?;
    let secret = inv.args()[0];
    state.password_ok = state
        .config()
        .password
        .as_deref()
        .is_none_or(|expected| expected == secret);
    if !state.password_ok {
        return Err(CommandError::InvalidPassword);
    }
    if state.is_authenticated() {
        info!("Client logged in");
    }
    state.reply(Response::success("Ready to work."));
    Ok(())
}

fn send(state: &mut SessionState, inv: &mut Invocation<'_>) -> CommandResult {
    privileged(state, inv, 1, 1)?;
    let msg = parse_message(inv.args()[0], &state.guid)?;
    let frame = encode_frame(&msg);
    state.bus.send(&frame)?;
    state.stats.record_tx(msg.data().len());
    state.metrics().frame_transmitted();
    state.reply(Response::success(SUCCESS));
    Ok(())
}

fn retr(state: &mut SessionState, inv: &mut Invocation<'_>) -> CommandResult {
    privileged(state, inv, 0, 1)?;
    let count = match inv.arg(0) {
        Some(value) => parse_number("count", value)?,
        None => 1,
    };
    if count == 0 {
        return Err(CommandError::InvalidArgument("count must be at least 1".to_string()));
    }

    let mut retrieved = 0u64;
    while retrieved < count {
        match state.queue.pop() {
            Some(msg) => {
                state.reply(Response::Event(msg));
                retrieved += 1;
            }
            None => break,
        }
    }
    if retrieved == 0 {
        return Err(CommandError::NoData);
    }
    state.reply(Response::success(format!("{} event(s) retrieved.", retrieved)));
    Ok(())
}

fn rcvloop(state: &mut SessionState, inv: &mut Invocation<'_>) -> CommandResult {
    privileged(state, inv, 0, 0)?;
    state.reply(Response::success("Receive loop entered."));
    while let Some(msg) = state.queue.pop() {
        state.reply(Response::Event(msg));
    }
    state.set_mode(SessionMode::Loop);
    Ok(())
}

fn quitloop(state: &mut SessionState, inv: &mut Invocation<'_>) -> CommandResult {
    privileged(state, inv, 0, 0)?;
    state.set_mode(SessionMode::Normal);
    state.reply(Response::success("Quit receive loop."));
    Ok(())
}

fn checkdata(state: &mut SessionState, inv: &mut Invocation<'_>) -> CommandResult {
    privileged(state, inv, 0, 0)?;
    let used = state.queue.used();
    state.reply(Response::text(used.to_string()));
    state.reply(Response::success(SUCCESS));
    Ok(())
}

fn clra(state: &mut SessionState, inv: &mut Invocation<'_>) -> CommandResult {
    privileged(state, inv, 0, 0)?;
    state.queue.flush();
    state.reply(Response::success("All events cleared."));
    Ok(())
}

fn getguid(state: &mut SessionState, inv: &mut Invocation<'_>) -> CommandResult {
    privileged(state, inv, 0, 0)?;
    let guid = state.guid.to_string();
    state.reply(Response::text(guid));
    state.reply(Response::success(SUCCESS));
    Ok(())
}

fn setguid(state: &mut SessionState, inv: &mut Invocation<'_>) -> CommandResult {
    privileged(state, inv, 1, 1)?;
    state.guid = inv.args()[0].parse::<Guid>()?;
    state.reply(Response::success(SUCCESS));
    Ok(())
}

fn setfilter(state: &mut SessionState, inv: &mut Invocation<'_>) -> CommandResult {
    privileged(state, inv, 1, 1)?;
    let id = identifier_arg("filter", inv.args()[0])?;
    state.apply_filter(state.filter.with_id(id))?;
    state.reply(Response::success(SUCCESS));
    Ok(())
}

fn setmask(state: &mut SessionState, inv: &mut Invocation<'_>) -> CommandResult {
    privileged(state, inv, 1, 1)?;
    let mask = identifier_arg("mask", inv.args()[0])?;
    state.apply_filter(state.filter.with_mask(mask))?;
    state.reply(Response::success(SUCCESS));
    Ok(())
}

fn stat(state: &mut SessionState, inv: &mut Invocation<'_>) -> CommandResult {
    privileged(state, inv, 0, 0)?;
    let stats = state.stats;
    for (name, value) in [
        ("rx-frames", stats.rx_frames),
        ("rx-bytes", stats.rx_bytes),
        ("tx-frames", stats.tx_frames),
        ("tx-bytes", stats.tx_bytes),
        ("dropped", stats.dropped_frames),
        ("overruns", stats.overruns),
    ] {
        state.reply(Response::text(format!("{}: {}", name, value)));
    }
    state.reply(Response::success(SUCCESS));
    Ok(())
}

fn version(state: &mut SessionState, inv: &mut Invocation<'_>) -> CommandResult {
    arity(inv, 0, 0)?;
    state.reply(Response::text(env!("CARGO_PKG_VERSION")));
    state.reply(Response::success(SUCCESS));
    Ok(())
}

fn interface(state: &mut SessionState, inv: &mut Invocation<'_>) -> CommandResult {
    privileged(state, inv, 1, 1)?;
    let subcommand = inv.args()[0];
    if !subcommand.eq_ignore_ascii_case("list") {
        return Err(CommandError::InvalidArgument(subcommand.to_string()));
    }
    let name = state.bus.interface().to_string();
    state.reply(Response::text(name));
    state.reply(Response::success(SUCCESS));
    Ok(())
}

fn help(state: &mut SessionState, inv: &mut Invocation<'_>) -> CommandResult {
    arity(inv, 0, 0)?;
    let mut names: Vec<&str> = COMMANDS.iter().map(|(name, _)| *name).collect();
    names.push("+");
    state.reply(Response::success(names.join(" ")));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::LoopbackBus;
    use crate::config::GatewayConfig;
    use crate::metrics::GatewayMetrics;
    use crate::types::SessionId;
    use uvscp_cmdinterp::{CommandInterpreter, InterpreterError};

    struct Harness {
        interp: CommandInterpreter<SessionState, CommandError>,
        state: SessionState,
    }

    impl Harness {
        fn new(config: GatewayConfig) -> Self {
            let config = Arc::new(config);
            let bus = LoopbackBus::new("vcan0");
            let state = SessionState::new(
                SessionId::new(1),
                config.clone(),
                Arc::new(GatewayMetrics::new()),
                Box::new(bus.socket()),
            );
            Self {
                interp: CommandInterpreter::new(command_table(), config.interpreter_config()),
                state,
            }
        }

        fn run(&mut self, line: &str) -> Result<Vec<String>, String> {
            let result = self.interp.execute(line, &mut self.state);
            let output = self
                .state
                .take_output()
                .into_iter()
                .map(|r| r.to_string())
                .collect();
            result.map(|_| output).map_err(|e: InterpreterError<_>| e.to_string())
        }
    }

    #[test]
    fn test_noop_and_arity() {
        let mut h = Harness::new(GatewayConfig::default());
        assert_eq!(h.run("noop").unwrap(), vec!["+OK - Success."]);
        assert_eq!(h.run("noop extra").unwrap_err(), "Wrong number of arguments");
    }

    #[test]
    fn test_quit_stops() {
        let mut h = Harness::new(GatewayConfig::default());
        assert_eq!(h.run("QUIT").unwrap(), vec!["+OK - Goodbye."]);
        assert!(h.state.is_stopped());
    }

    #[test]
    fn test_access_gating() {
        let mut h = Harness::new(GatewayConfig::default().with_credentials("admin", "secret"));
        assert_eq!(h.run("checkdata").unwrap_err(), "Access denied");
        assert_eq!(h.run("user root").unwrap_err(), "Invalid username");
        h.run("user admin").unwrap();
        assert_eq!(h.run("checkdata").unwrap_err(), "Access denied");
        assert_eq!(h.run("pass wrong").unwrap_err(), "Invalid password");
        h.run("pass secret").unwrap();
        assert_eq!(h.run("checkdata").unwrap(), vec!["0", "+OK - Success."]);
    }

    #[test]
    fn test_pass_not_repeatable() {
        let mut h = Harness::new(GatewayConfig::default().with_credentials("admin", "secret"));
        h.run("noop").unwrap();
        h.run("pass secret").unwrap();
        assert_eq!(h.interp.history(), Some("noop"));
    }

    #[test]
    fn test_retr_empty_and_count() {
        let mut h = Harness::new(GatewayConfig::default());
        assert_eq!(h.run("retr").unwrap_err(), "No event(s) available");
        assert!(h.run("retr 0").is_err());
        assert!(h.run("retr x").is_err());
        assert_eq!(h.run("retr 1 2").unwrap_err(), "Wrong number of arguments");
    }

    #[test]
    fn test_guid_commands() {
        let mut h = Harness::new(GatewayConfig::default());
        let guid = "FF:EE:DD:CC:BB:AA:99:88:77:66:55:44:33:22:11:00";
        h.run(&format!("setguid {}", guid)).unwrap();
        assert_eq!(h.run("getguid").unwrap(), vec![guid, "+OK - Success."]);
        assert!(h.run("setguid 1:2:3").is_err());
        assert_eq!(h.state.guid().to_string(), guid);
    }

    #[test]
    fn test_filter_commands() {
        let mut h = Harness::new(GatewayConfig::default());
        h.run("setfilter 0x140000").unwrap();
        h.run("setmask 0x1FF0000").unwrap();
        assert_eq!(h.state.filter().id, 0x140000);
        assert_eq!(h.state.filter().mask, 0x1FF0000);
        assert!(h.run("setmask 0x20000000").is_err());
    }

    #[test]
    fn test_send_rejects_bad_event() {
        let mut h = Harness::new(GatewayConfig::default());
        assert!(h.run("send 0,20").is_err());
        assert_eq!(h.state.statistics().tx_frames, 0);
        h.run("send 0,20,3,0,,0,-,1,2").unwrap();
        assert_eq!(h.state.statistics().tx_frames, 1);
        assert_eq!(h.state.statistics().tx_bytes, 2);
    }

    #[test]
    fn test_loop_mode_commands() {
        let mut h = Harness::new(GatewayConfig::default());
        assert_eq!(h.run("rcvloop").unwrap(), vec!["+OK - Receive loop entered."]);
        assert_eq!(h.state.mode(), SessionMode::Loop);
        h.run("quitloop").unwrap();
        assert_eq!(h.state.mode(), SessionMode::Normal);
    }

    #[test]
    fn test_informational_commands() {
        let mut h = Harness::new(GatewayConfig::default());
        assert_eq!(
            h.run("version").unwrap(),
            vec![env!("CARGO_PKG_VERSION"), "+OK - Success."]
        );
        assert_eq!(
            h.run("interface list").unwrap(),
            vec!["vcan0", "+OK - Success."]
        );
        assert!(h.run("interface show").is_err());
        assert_eq!(h.run("stat").unwrap().len(), 7);

        let help = h.run("help").unwrap();
        assert_eq!(help.len(), 1);
        assert!(help[0].starts_with("+OK - noop quit user pass send"));
        assert!(help[0].ends_with(" +"));
    }
}
