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

//! Resumable line accumulator and command dispatcher

use crate::config::InterpreterConfig;
use crate::result::{InterpreterError, InterpreterResult};
use crate::table::{CommandTable, Invocation};
use bytes::Buf;
use std::sync::Arc;
use tracing::{debug, trace};

const LINE_FEED: u8 = b'\n';

/// Per-session command interpreter
///
/// Bytes are accumulated across calls to [`feed`](Self::feed) until a line
/// feed arrives. Only printable ASCII is kept; carriage returns and other
/// control bytes are dropped. A complete line is tokenized, matched against
/// the shared [`CommandTable`] and handed to the matching handler together
/// with the caller's session state.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use uvscp_cmdinterp::{CommandInterpreter, CommandTable, InterpreterConfig, Invocation};
///
/// fn count(state: &mut usize, _inv: &mut Invocation<'_>) -> Result<(), String> {
///     *state += 1;
///     Ok(())
/// }
///
/// let table = Arc::new(CommandTable::new().with("count", count));
/// let mut interp = CommandInterpreter::new(table, InterpreterConfig::default());
/// let mut state = 0usize;
///
/// let mut input: &[u8] = b"COUNT\r\n+\r\n";
/// assert_eq!(interp.feed(&mut input, &mut state), Some(Ok(())));
/// assert_eq!(interp.feed(&mut input, &mut state), Some(Ok(())));
/// assert_eq!(interp.feed(&mut input, &mut state), None);
/// assert_eq!(state, 2);
/// ```
pub struct CommandInterpreter<S, E> {
    table: Arc<CommandTable<S, E>>,
    config: InterpreterConfig,
    line: String,
    overflow: bool,
    history: Option<String>,
}

impl<S, E> CommandInterpreter<S, E> {
    /// Create an interpreter over a shared command table
    pub fn new(table: Arc<CommandTable<S, E>>, config: InterpreterConfig) -> Self {
        let capacity = config.max_line_length;
        Self {
            table,
            config,
            line: String::with_capacity(capacity),
            overflow: false,
            history: None,
        }
    }

    /// Interpreter configuration
    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Shared command table
    pub fn table(&self) -> &Arc<CommandTable<S, E>> {
        &self.table
    }

    /// Last recorded line, if any
    pub fn history(&self) -> Option<&str> {
        self.history.as_deref()
    }

    /// Printable characters accumulated towards the next line
    pub fn pending(&self) -> &str {
        &self.line
    }

    /// Drop any partial line and the history slot
    pub fn reset(&mut self) {
        self.line.clear();
        self.overflow = false;
        self.history = None;
    }

    /// Consume bytes up to and including the next line feed
    ///
    /// Returns `None` when `input` ran out before a line feed was seen; the
    /// consumed bytes are kept and the next call continues the same line.
    /// Otherwise returns the outcome of the completed line, leaving any
    /// bytes after the line feed in `input`.
    pub fn feed<B: Buf>(
        &mut self,
        input: &mut B,
        session: &mut S,
    ) -> Option<InterpreterResult<(), E>> {
        while input.has_remaining() {
            let byte = input.get_u8();
            if byte == LINE_FEED {
                let line = std::mem::take(&mut self.line);
                let overflow = std::mem::replace(&mut self.overflow, false);
                let result = if overflow {
                    debug!(length = self.config.max_line_length, "Discarding overlong line");
                    Err(InterpreterError::LineTooLong)
                } else {
                    self.execute(&line, session)
                };
                self.line = line;
                self.line.clear();
                return Some(result);
            }
            if byte == b' ' || byte.is_ascii_graphic() {
                if self.line.len() < self.config.max_line_length {
                    self.line.push(char::from(byte));
                } else {
                    self.overflow = true;
                }
            }
        }
        None
    }

    /// Execute one complete line
    ///
    /// A line whose first token is the repeat token replays the recorded
    /// line without changing the history.
    pub fn execute(&mut self, line: &str, session: &mut S) -> InterpreterResult<(), E> {
        let is_repeat = match (&self.config.repeat_token, self.tokens(line).next()) {
            (Some(repeat), Some(first)) => first == repeat.as_str(),
            _ => false,
        };
        if is_repeat {
            let previous = self.history.clone().ok_or(InterpreterError::NoHistory)?;
            trace!(line = %previous, "Repeating last command");
            return self.dispatch(&previous, session, false);
        }
        self.dispatch(line, session, true)
    }

    fn dispatch(&mut self, line: &str, session: &mut S, record: bool) -> InterpreterResult<(), E> {
        let mut tokens = self.tokens(line);
        let token = tokens.next().ok_or(InterpreterError::EmptyInput)?;
        let (name, handler) = match self.table.lookup(token, self.config.fold_case) {
            Some(descriptor) => (descriptor.name(), descriptor.handler()),
            None => return Err(InterpreterError::InvalidCommand(token.to_string())),
        };
        let args: Vec<&str> = tokens.take(self.config.max_arguments).collect();
        debug!(command = name, argc = args.len(), "Dispatching command");

        let mut invocation = Invocation::new(name, &args);
        handler(session, &mut invocation).map_err(InterpreterError::Command)?;

        if record && invocation.records_history() {
            self.history = Some(line.to_string());
        }
        Ok(())
    }

    fn tokens<'l>(&self, line: &'l str) -> impl Iterator<Item = &'l str> + use<'l, S, E> {
        let delimiters = self.config.delimiters.clone();
        line.split(move |c: char| delimiters.contains(c))
            .filter(|token| !token.is_empty())
    }
}

impl<S, E> std::fmt::Debug for CommandInterpreter<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandInterpreter")
            .field("table", &self.table)
            .field("config", &self.config)
            .field("pending", &self.line.len())
            .field("overflow", &self.overflow)
            .field("history", &self.history)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[derive(Default)]
    struct Calls(Vec<(String, Vec<String>)>);

    fn record(state: &mut Calls, inv: &mut Invocation<'_>) -> Result<(), String> {
        state.0.push((
            inv.command().to_string(),
            inv.args().iter().map(|arg| arg.to_string()).collect(),
        ));
        Ok(())
    }

    fn fail(_state: &mut Calls, _inv: &mut Invocation<'_>) -> Result<(), String> {
        Err("refused".to_string())
    }

    fn secret(state: &mut Calls, inv: &mut Invocation<'_>) -> Result<(), String> {
        inv.skip_history();
        record(state, inv)
    }

    fn interpreter(config: InterpreterConfig) -> CommandInterpreter<Calls, String> {
        let table = CommandTable::new()
            .with("send", record)
            .with("noop", record)
            .with("fail", fail)
            .with("pass", secret);
        CommandInterpreter::new(Arc::new(table), config)
    }

    #[test]
    fn test_control_bytes_dropped() {
        let mut interp = interpreter(InterpreterConfig::default());
        let mut calls = Calls::default();
        let mut input: &[u8] = b"no\x07op\r\n";
        assert_eq!(interp.feed(&mut input, &mut calls), Some(Ok(())));
        assert_eq!(calls.0[0].0, "noop");
    }

    #[test]
    fn test_remaining_bytes_left_in_cursor() {
        let mut interp = interpreter(InterpreterConfig::default());
        let mut calls = Calls::default();
        let mut input: &[u8] = b"noop\nsend x";
        assert_eq!(interp.feed(&mut input, &mut calls), Some(Ok(())));
        assert_eq!(input, b"send x");
        assert_eq!(interp.feed(&mut input, &mut calls), None);
        assert_eq!(interp.pending(), "send x");
        assert!(input.is_empty());
    }

    #[test]
    #[traced_test]
    fn test_exact_max_length_accepted() {
        let config = InterpreterConfig::default().with_max_line_length(6);
        let mut interp = interpreter(config);
        let mut calls = Calls::default();

        let mut input: &[u8] = b"send x\n";
        assert_eq!(interp.feed(&mut input, &mut calls), Some(Ok(())));

        let mut input: &[u8] = b"send xy\n";
        assert_eq!(
            interp.feed(&mut input, &mut calls),
            Some(Err(InterpreterError::LineTooLong))
        );
        assert_eq!(calls.0.len(), 1);
        assert!(logs_contain("Discarding overlong line"));
    }

    #[test]
    fn test_case_sensitive_matching() {
        let config = InterpreterConfig::default().with_fold_case(false);
        let mut interp = interpreter(config);
        let mut calls = Calls::default();
        assert_eq!(
            interp.execute("NOOP", &mut calls),
            Err(InterpreterError::InvalidCommand("NOOP".to_string()))
        );
        assert_eq!(interp.execute("noop", &mut calls), Ok(()));
    }

    #[test]
    fn test_argument_limit() {
        let config = InterpreterConfig::default().with_max_arguments(2);
        let mut interp = interpreter(config);
        let mut calls = Calls::default();
        interp.execute("send a  b c d", &mut calls).unwrap();
        assert_eq!(calls.0[0].1, vec!["a", "b"]);
    }

    #[test]
    fn test_failed_command_not_recorded() {
        let mut interp = interpreter(InterpreterConfig::default());
        let mut calls = Calls::default();
        interp.execute("noop", &mut calls).unwrap();
        assert_eq!(
            interp.execute("fail", &mut calls),
            Err(InterpreterError::Command("refused".to_string()))
        );
        assert_eq!(interp.history(), Some("noop"));
    }

    #[test]
    fn test_skip_history() {
        let mut interp = interpreter(InterpreterConfig::default());
        let mut calls = Calls::default();
        interp.execute("send 1", &mut calls).unwrap();
        interp.execute("pass hunter2", &mut calls).unwrap();
        assert_eq!(interp.history(), Some("send 1"));

        interp.execute("+", &mut calls).unwrap();
        assert_eq!(calls.0.len(), 3);
        assert_eq!(calls.0[2], ("send".to_string(), vec!["1".to_string()]));
    }

    #[test]
    fn test_repeat_disabled() {
        let config = InterpreterConfig::default().with_repeat_token(None);
        let mut interp = interpreter(config);
        let mut calls = Calls::default();
        interp.execute("noop", &mut calls).unwrap();
        assert_eq!(
            interp.execute("+", &mut calls),
            Err(InterpreterError::InvalidCommand("+".to_string()))
        );
    }

    #[test]
    fn test_reset() {
        let mut interp = interpreter(InterpreterConfig::default());
        let mut calls = Calls::default();
        interp.execute("noop", &mut calls).unwrap();
        let mut input: &[u8] = b"sen";
        assert_eq!(interp.feed(&mut input, &mut calls), None);

        interp.reset();
        assert_eq!(interp.history(), None);
        assert_eq!(interp.pending(), "");
    }
}
