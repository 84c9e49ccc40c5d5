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

use bytes::{Buf, BytesMut};
use std::sync::Arc;
use uvscp_cmdinterp::{
    CommandInterpreter, CommandTable, InterpreterConfig, InterpreterError, Invocation,
};

#[derive(Debug, Default)]
struct Recorder {
    calls: Vec<(&'static str, Vec<String>)>,
}

fn record(state: &mut Recorder, inv: &mut Invocation<'_>) -> Result<(), String> {
    state
        .calls
        .push((inv.command(), inv.args().iter().map(|a| a.to_string()).collect()));
    Ok(())
}

fn arity_one(state: &mut Recorder, inv: &mut Invocation<'_>) -> Result<(), String> {
    if inv.argc() != 1 {
        return Err("Wrong number of arguments".to_string());
    }
    record(state, inv)
}

fn table() -> Arc<CommandTable<Recorder, String>> {
    Arc::new(
        CommandTable::new()
            .with("noop", record)
            .with("send", arity_one)
            .with("retr", record),
    )
}

fn interpreter() -> CommandInterpreter<Recorder, String> {
    CommandInterpreter::new(table(), InterpreterConfig::default())
}

#[test]
fn test_case_insensitive_dispatch() {
    let mut interp = interpreter();
    let mut state = Recorder::default();
    let mut input: &[u8] = b"SEND 1,2,3\n";

    assert_eq!(interp.feed(&mut input, &mut state), Some(Ok(())));
    assert_eq!(state.calls, vec![("send", vec!["1,2,3".to_string()])]);
}

#[test]
fn test_arguments_keep_case() {
    let mut interp = interpreter();
    let mut state = Recorder::default();
    let mut input: &[u8] = b"Send AbC\r\n";

    assert_eq!(interp.feed(&mut input, &mut state), Some(Ok(())));
    assert_eq!(state.calls[0].1, vec!["AbC".to_string()]);
}

#[test]
fn test_line_too_long_then_recovery() {
    let config = InterpreterConfig::default().with_max_line_length(16);
    let mut interp = CommandInterpreter::new(table(), config);
    let mut state = Recorder::default();

    let mut long = b"send ".to_vec();
    long.extend(std::iter::repeat_n(b'x', 64));
    long.extend_from_slice(b"\r\nnoop\r\n");
    let mut input = long.as_slice();

    assert_eq!(
        interp.feed(&mut input, &mut state),
        Some(Err(InterpreterError::LineTooLong))
    );
    assert!(state.calls.is_empty());
    assert_eq!(interp.feed(&mut input, &mut state), Some(Ok(())));
    assert_eq!(state.calls, vec![("noop", vec![])]);
}

#[test]
fn test_empty_line() {
    let mut interp = interpreter();
    let mut state = Recorder::default();

    let mut input: &[u8] = b"\n";
    assert_eq!(
        interp.feed(&mut input, &mut state),
        Some(Err(InterpreterError::EmptyInput))
    );

    let mut input: &[u8] = b"   \r\n";
    assert_eq!(
        interp.feed(&mut input, &mut state),
        Some(Err(InterpreterError::EmptyInput))
    );
}

#[test]
fn test_unknown_command() {
    let mut interp = interpreter();
    let mut state = Recorder::default();
    let mut input: &[u8] = b"frobnicate now\n";
    assert_eq!(
        interp.feed(&mut input, &mut state),
        Some(Err(InterpreterError::InvalidCommand("frobnicate".to_string())))
    );
}

#[test]
fn test_handler_error_surfaced() {
    let mut interp = interpreter();
    let mut state = Recorder::default();
    let mut input: &[u8] = b"send\n";
    let result = interp.feed(&mut input, &mut state).unwrap();
    assert_eq!(
        result.unwrap_err().into_command_error(),
        Some("Wrong number of arguments".to_string())
    );
}

#[test]
fn test_repeat_dispatches_twice() {
    let mut interp = interpreter();
    let mut state = Recorder::default();
    let mut input: &[u8] = b"noop\n+\n";

    assert_eq!(interp.feed(&mut input, &mut state), Some(Ok(())));
    assert_eq!(interp.feed(&mut input, &mut state), Some(Ok(())));
    assert_eq!(state.calls, vec![("noop", vec![]), ("noop", vec![])]);
    assert_eq!(interp.history(), Some("noop"));
}

#[test]
fn test_repeat_without_history() {
    let mut interp = interpreter();
    let mut state = Recorder::default();
    let mut input: &[u8] = b"+\n";

    assert_eq!(
        interp.feed(&mut input, &mut state),
        Some(Err(InterpreterError::NoHistory))
    );
    assert!(state.calls.is_empty());
}

#[test]
fn test_split_feeding() {
    let mut interp = interpreter();
    let mut state = Recorder::default();
    let mut buffer = BytesMut::new();

    for chunk in [&b"re"[..], b"tr 1", b"0\r", b"\nnoop\r\n"] {
        buffer.extend_from_slice(chunk);
        while buffer.has_remaining() {
            match interp.feed(&mut buffer, &mut state) {
                Some(result) => assert_eq!(result, Ok(())),
                None => break,
            }
        }
    }

    assert_eq!(
        state.calls,
        vec![("retr", vec!["10".to_string()]), ("noop", vec![])]
    );
}
